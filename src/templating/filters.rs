//! Conversion functions exposed to chart templates.
//!
//! These are the pure converters templates call to move between structured
//! data and text:
//!
//! - `toYaml`: serialize any value to YAML (one trailing newline stripped)
//! - `fromYaml`: parse YAML text into a string-keyed mapping
//! - `toHTML`: render markdown to HTML
//!
//! Each converter is available both as a filter and as a function:
//!
//! ```text
//! {{ values | toYaml }}
//! {{ toYaml(value=values) }}
//! {% set parsed = valuesYaml | fromYaml %}
//! {{ chart.description | toHTML }}
//! ```
//!
//! # Error policy
//!
//! The YAML converters never fail the render. A value that cannot be
//! serialized becomes an empty string, and unparseable text becomes a mapping
//! with a single `Error` key holding the parser message, so a template can show
//! the problem inline instead of aborting the whole document.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::{escape_href, escape_html};
use serde::Serialize;
use serde_json::{Map, Value};

/// Key under which [`from_yaml`] reports a parse failure.
pub const ERROR_KEY: &str = "Error";

/// Serialize a value to YAML for inline use.
///
/// Returns an empty string if serialization fails.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_yaml::to_string(value) {
        Ok(text) => text.strip_suffix('\n').map(str::to_string).unwrap_or(text),
        Err(e) => {
            tracing::debug!("toYaml swallowed serialization error: {}", e);
            String::new()
        }
    }
}

/// Parse YAML text into a string-keyed mapping.
///
/// This is not a general-purpose YAML parser: only documents whose top level
/// is a mapping with string keys are accepted. A blank document yields an empty
/// mapping. Any other input yields a mapping containing exactly one entry,
/// [`ERROR_KEY`], with the error message.
pub fn from_yaml(text: &str) -> Map<String, Value> {
    match parse_yaml_mapping(text) {
        Ok(map) => map,
        Err(message) => {
            let mut map = Map::new();
            map.insert(ERROR_KEY.to_string(), Value::String(message));
            map
        }
    }
}

fn parse_yaml_mapping(text: &str) -> Result<Map<String, Value>, String> {
    let document: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    match document {
        serde_yaml::Value::Null => Ok(Map::new()),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(&document) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("yaml: document is not a mapping".to_string()),
            Err(e) => Err(format!("yaml: {e}")),
        },
        other => Err(format!(
            "yaml: cannot unmarshal {} into a mapping with string keys",
            yaml_kind(&other)
        )),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Render markdown text to HTML.
///
/// Extensions: tables, strikethrough, footnotes, task lists, and explicit
/// `{#id}` heading attributes. Headings without an explicit id receive a
/// GitHub-style slug id (repeated slugs get `-1`, `-2`, ... suffixes), and links
/// other than in-page anchors and site-relative paths open in a new browsing
/// context (`target="_blank"`). Block elements do
/// not need a preceding blank line wherever CommonMark lets them interrupt a
/// paragraph.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let events = add_link_targets(add_heading_ids(Parser::new_ext(markdown, options).collect()));

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Assign slug ids to headings that have none.
fn add_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut output = Vec::with_capacity(events.len());
    // Explicit ids are reserved up front so no generated slug can take one
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading {
                id: Some(id),
                ..
            }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut pending: Option<(HeadingLevel, Vec<CowStr<'_>>, Vec<(CowStr<'_>, Option<CowStr<'_>>)>)> =
        None;
    let mut heading_events: Vec<Event<'_>> = Vec::new();
    let mut heading_text = String::new();

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) => {
                pending = Some((level, classes, attrs));
                heading_events.clear();
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(end_level)) if pending.is_some() => {
                if let Some((level, classes, attrs)) = pending.take() {
                    let id = unique_slug(&heading_text, &mut used);
                    output.push(Event::Start(Tag::Heading {
                        level,
                        id: Some(CowStr::from(id)),
                        classes,
                        attrs,
                    }));
                    output.append(&mut heading_events);
                }
                output.push(Event::End(TagEnd::Heading(end_level)));
            }
            other if pending.is_some() => {
                if let Event::Text(text) | Event::Code(text) = &other {
                    heading_text.push_str(text);
                }
                heading_events.push(other);
            }
            other => output.push(other),
        }
    }

    output
}

fn unique_slug(text: &str, used: &mut HashSet<String>) -> String {
    let base = match slugify(text) {
        slug if slug.is_empty() => "section".to_string(),
        slug => slug,
    };

    let mut candidate = base.clone();
    let mut counter = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// GitHub-style slug: lowercase alphanumerics joined by single hyphens.
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c.to_lowercase().next().unwrap_or(c))
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Replace link tags with raw anchors; links that leave the document open in a
/// new browsing context.
fn add_link_targets(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) => Event::InlineHtml(CowStr::from(link_open_tag(link_type, &dest_url, &title))),
            Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::from("</a>")),
            other => other,
        })
        .collect()
}

fn link_open_tag(link_type: LinkType, dest_url: &str, title: &str) -> String {
    // Writing into a String cannot fail
    let mut tag = String::from(r#"<a href=""#);
    if link_type == LinkType::Email {
        tag.push_str("mailto:");
    }
    let _ = escape_href(&mut tag, dest_url);
    tag.push('"');

    if !title.is_empty() {
        tag.push_str(r#" title=""#);
        let _ = escape_html(&mut tag, title);
        tag.push('"');
    }
    if !is_relative_link(dest_url) {
        tag.push_str(r#" target="_blank""#);
    }
    tag.push('>');
    tag
}

/// In-page anchors and paths on the same site.
fn is_relative_link(url: &str) -> bool {
    url.starts_with('#')
        || (url.starts_with('/') && !url.starts_with("//"))
        || url.starts_with("./")
        || url.starts_with("../")
}

/// Pick the input value for a converter called as a function.
///
/// Functions take named arguments only; the converters accept `value` or `text`.
fn function_input<'a>(function: &str, args: &'a HashMap<String, Value>) -> tera::Result<&'a Value> {
    args.get("value").or_else(|| args.get("text")).ok_or_else(|| {
        tera::Error::msg(format!("Function `{function}` requires a `value` or `text` argument"))
    })
}

/// Text view of a template value: strings as-is, everything else as JSON.
fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `toYaml` filter.
pub fn to_yaml_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(to_yaml(value)))
}

/// `fromYaml` filter.
pub fn from_yaml_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::Object(from_yaml(&value_as_text(value))))
}

/// `toHTML` filter.
pub fn to_html_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(to_html(&value_as_text(value))))
}

/// `toYaml(value=...)` function.
pub fn to_yaml_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    to_yaml_filter(function_input("toYaml", args)?, args)
}

/// `fromYaml(text=...)` function.
pub fn from_yaml_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    from_yaml_filter(function_input("fromYaml", args)?, args)
}

/// `toHTML(text=...)` function.
pub fn to_html_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    to_html_filter(function_input("toHTML", args)?, args)
}
