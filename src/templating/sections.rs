//! Splitting template sources into named sub-templates.
//!
//! Tera has no way to declare several named templates inside one file, so
//! chart template sources use a small block syntax on top of it:
//!
//! ```text
//! {% define "chart.header" %}
//! # {{ chart.name }}
//! {% enddefine %}
//!
//! {% include "chart.header" %}
//! ```
//!
//! Everything between `define` and `enddefine` becomes the body of the named
//! template; everything outside define blocks is the body of the main template.
//! The `-` whitespace-control markers behave as they do on Tera tags: `{%-`
//! trims whitespace before the tag and `-%}` trims whitespace after it.

use std::sync::LazyLock;

use regex::Regex;

use super::error::TemplateError;

static DEFINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%(-?)\s*(?:define\s+"([^"]+)"|(enddefine))\s*(-?)%\}"#)
        .expect("define tag pattern is valid")
});

/// A template source split into its main body and named definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSections {
    /// Text outside of any define block
    pub main: String,
    /// Named definitions in source order (later duplicates override earlier ones)
    pub definitions: Vec<(String, String)>,
}

impl TemplateSections {
    /// Whether the main body holds anything other than whitespace.
    pub fn has_main_body(&self) -> bool {
        !self.main.trim().is_empty()
    }
}

/// Split `text` into main body and named definitions.
///
/// `source_name` is only used for error messages.
pub fn split_sections(text: &str, source_name: &str) -> Result<TemplateSections, TemplateError> {
    let mut sections = TemplateSections::default();
    // Name and body start of the define block being read
    let mut open: Option<(String, usize)> = None;
    let mut cursor = 0;
    let mut trim_next = false;

    for captures in DEFINE_TAG.captures_iter(text) {
        let Some(tag) = captures.get(0) else {
            continue;
        };
        let trim_before = captures.get(1).is_some_and(|m| !m.as_str().is_empty());
        let trim_after = captures.get(4).is_some_and(|m| !m.as_str().is_empty());

        if let Some(name) = captures.get(2) {
            if let Some((outer, _)) = &open {
                return Err(parse_error(
                    source_name,
                    name.as_str(),
                    format!(
                        "define blocks cannot be nested (found inside \"{outer}\") at line {}",
                        line_of(text, tag.start())
                    ),
                ));
            }
            push_segment(&mut sections.main, &text[cursor..tag.start()], trim_next, trim_before);
            open = Some((name.as_str().to_string(), tag.end()));
        } else {
            let Some((name, body_start)) = open.take() else {
                return Err(parse_error(
                    source_name,
                    "enddefine",
                    format!("unexpected enddefine at line {}", line_of(text, tag.start())),
                ));
            };
            let mut body = String::new();
            push_segment(&mut body, &text[body_start..tag.start()], trim_next, trim_before);
            sections.definitions.push((name, body));
        }

        cursor = tag.end();
        trim_next = trim_after;
    }

    if let Some((name, body_start)) = open {
        return Err(parse_error(
            source_name,
            &name,
            format!("define block starting at line {} is never closed", line_of(text, body_start)),
        ));
    }

    push_segment(&mut sections.main, &text[cursor..], trim_next, false);
    Ok(sections)
}

fn push_segment(target: &mut String, segment: &str, trim_start: bool, trim_end: bool) {
    let segment = if trim_start {
        segment.trim_start()
    } else {
        segment
    };
    let segment = if trim_end {
        segment.trim_end()
    } else {
        segment
    };
    target.push_str(segment);
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn parse_error(source_name: &str, template: &str, message: String) -> TemplateError {
    TemplateError::Parse {
        source_name: source_name.to_string(),
        template: template.to_string(),
        message,
    }
}
