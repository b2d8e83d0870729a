//! Depth-bounded execution of named templates.
//!
//! [`InclusionGuard`] backs the `include` template function. It tracks how many
//! invocations of each named template are currently on the stack and refuses to
//! start a new one once that count reaches the configured bound. The bound is a
//! tolerance, not cycle detection: a template that includes itself (directly or
//! through another template) runs up to the bound before the next include fails.
//!
//! One guard is created per composed chart template, so renders of different
//! charts never see each other's counters.

use dashmap::DashMap;
use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use super::error::{RECURSION_MARKER, TemplateError, format_tera_error};

/// Key under which the value passed to `include` is visible to the included template.
pub const INCLUDE_DATA_KEY: &str = "data";

/// Per-render nesting counters for named templates.
#[derive(Debug)]
pub struct InclusionGuard {
    depths: DashMap<String, usize>,
    max_depth: usize,
}

impl InclusionGuard {
    /// Create a guard that allows `max_depth` nested invocations per template name.
    pub fn new(max_depth: usize) -> Self {
        Self {
            depths: DashMap::new(),
            max_depth,
        }
    }

    /// Maximum nesting depth per template name.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Current nesting depth of `name` (0 when it is not being rendered).
    pub fn depth(&self, name: &str) -> usize {
        self.depths.get(name).map(|depth| *depth).unwrap_or(0)
    }

    /// Render the template `name` from `tera` with `data` into a private buffer.
    ///
    /// Fails with [`TemplateError::RecursionLimitExceeded`] without rendering when
    /// `name` is already nested `max_depth` times. Otherwise the depth of `name` is
    /// raised for the duration of the render and restored afterwards, whether the
    /// render succeeded or not. A failed render yields
    /// [`TemplateError::IncludeFailed`] carrying whatever output was produced.
    pub fn include(&self, tera: &Tera, name: &str, data: &Value) -> Result<String, TemplateError> {
        let _depth = self.enter(name)?;

        let context = include_context(data);
        let mut buffer: Vec<u8> = Vec::new();
        let result = tera.render_to(name, &context, &mut buffer);
        let output = String::from_utf8_lossy(&buffer).into_owned();

        match result {
            Ok(()) => Ok(output),
            Err(e) => {
                let message = format_tera_error(&e);
                // Collapse nested limit failures so the message does not grow with depth
                if message.contains(RECURSION_MARKER) {
                    return Err(TemplateError::RecursionLimitExceeded {
                        name: name.to_string(),
                        max_depth: self.max_depth,
                    });
                }
                Err(TemplateError::IncludeFailed {
                    name: name.to_string(),
                    partial_output: output,
                    message,
                })
            }
        }
    }

    fn enter(&self, name: &str) -> Result<DepthToken<'_>, TemplateError> {
        let mut depth = self.depths.entry(name.to_string()).or_insert(0);
        if *depth >= self.max_depth {
            tracing::debug!("Refusing to include '{}' at depth {}", name, *depth);
            return Err(TemplateError::RecursionLimitExceeded {
                name: name.to_string(),
                max_depth: self.max_depth,
            });
        }
        *depth += 1;

        Ok(DepthToken {
            guard: self,
            name: name.to_string(),
        })
    }

    fn leave(&self, name: &str) {
        if let Some(mut depth) = self.depths.get_mut(name) {
            *depth = depth.saturating_sub(1);
        }
        self.depths.remove_if(name, |_, depth| *depth == 0);
    }
}

/// Restores a template's depth when dropped.
struct DepthToken<'a> {
    guard: &'a InclusionGuard,
    name: String,
}

impl Drop for DepthToken<'_> {
    fn drop(&mut self) {
        self.guard.leave(&self.name);
    }
}

/// Build the context for an included template.
///
/// Object keys become top-level variables; the value itself is always
/// available as `data` unless the object defines its own `data` key.
fn include_context(data: &Value) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert(INCLUDE_DATA_KEY, data);
    if let Value::Object(map) = data {
        for (key, value) in map {
            context.insert(key.as_str(), value);
        }
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn tera_with(templates: &[(&str, &str)]) -> Tera {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.to_vec()).unwrap();
        tera
    }

    #[test]
    fn test_include_renders_with_object_data() {
        let tera = tera_with(&[("greeting", "Hello {{ name }} ({{ data.name }})")]);
        let guard = InclusionGuard::new(5);

        let output = guard.include(&tera, "greeting", &json!({"name": "chart"})).unwrap();
        assert_eq!(output, "Hello chart (chart)");
    }

    #[test]
    fn test_include_renders_with_scalar_data() {
        let tera = tera_with(&[("echo", "[{{ data }}]")]);
        let guard = InclusionGuard::new(5);

        assert_eq!(guard.include(&tera, "echo", &json!(7)).unwrap(), "[7]");
    }

    #[test]
    fn test_depth_restored_after_success_and_failure() {
        let tera = tera_with(&[("ok", "fine"), ("broken", "{{ missing.value }}")]);
        let guard = InclusionGuard::new(5);

        guard.include(&tera, "ok", &Value::Null).unwrap();
        assert_eq!(guard.depth("ok"), 0);

        let err = guard.include(&tera, "broken", &Value::Null).unwrap_err();
        assert!(matches!(err, TemplateError::IncludeFailed { .. }));
        assert_eq!(guard.depth("broken"), 0);

        let err = guard.include(&tera, "not-defined", &Value::Null).unwrap_err();
        assert!(matches!(err, TemplateError::IncludeFailed { .. }));
        assert_eq!(guard.depth("not-defined"), 0);
    }

    #[test]
    fn test_failed_include_keeps_partial_output() {
        let tera = tera_with(&[("partial", "before {{ missing.value }} after")]);
        let guard = InclusionGuard::new(5);

        match guard.include(&tera, "partial", &Value::Null) {
            Err(TemplateError::IncludeFailed {
                partial_output,
                ..
            }) => assert!(partial_output.starts_with("before") || partial_output.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_limit_reached_does_not_execute() {
        let tera = tera_with(&[("any", "rendered")]);
        let guard = InclusionGuard::new(0);

        let err = guard.include(&tera, "any", &Value::Null).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::RecursionLimitExceeded { ref name, max_depth: 0 } if name == "any"
        ));
        assert_eq!(guard.depth("any"), 0);
    }

    #[test]
    fn test_depth_is_tracked_per_name() {
        let guard = InclusionGuard::new(2);
        let first = guard.enter("a").unwrap();
        let second = guard.enter("a").unwrap();
        assert_eq!(guard.depth("a"), 2);
        assert_eq!(guard.depth("b"), 0);

        assert!(guard.enter("a").is_err());
        assert_eq!(guard.depth("a"), 2);

        let other = guard.enter("b").unwrap();
        assert_eq!(guard.depth("b"), 1);

        drop(second);
        drop(first);
        drop(other);
        assert_eq!(guard.depth("a"), 0);
        assert_eq!(guard.depth("b"), 0);
    }

    #[test]
    fn test_guards_are_independent() {
        let first = Arc::new(InclusionGuard::new(1));
        let second = Arc::new(InclusionGuard::new(1));

        let _held = first.enter("shared").unwrap();
        assert!(first.enter("shared").is_err());
        assert!(second.enter("shared").is_ok());
    }
}
