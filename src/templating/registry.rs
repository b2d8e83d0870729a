//! Registration of chartdoc's template functions on a Tera instance.
//!
//! The `include` function needs the very template scope it is registered on,
//! which does not exist yet while functions are being attached. The registry
//! therefore holds a [`ScopeHandle`]: a weak reference to the cell the
//! finished Tera instance is published into once parsing completes. Holding
//! the handle weakly keeps the scope from owning itself through its own
//! function table.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use serde_json::Value;
use tera::Tera;

use super::error::TemplateError;
use super::filters;
use super::guard::InclusionGuard;

/// Cell a composed Tera instance is published into.
pub type ScopeCell = Arc<OnceLock<Tera>>;

/// Stable, non-owning reference to a template scope that may not be ready yet.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    name: String,
    cell: Weak<OnceLock<Tera>>,
}

impl ScopeHandle {
    /// Create a handle to `cell` for the scope called `name`.
    pub fn new(name: impl Into<String>, cell: &ScopeCell) -> Self {
        Self {
            name: name.into(),
            cell: Arc::downgrade(cell),
        }
    }

    /// Run `f` against the published Tera instance.
    pub fn with_tera<T>(
        &self,
        f: impl FnOnce(&Tera) -> Result<T, TemplateError>,
    ) -> Result<T, TemplateError> {
        let cell = self.cell.upgrade().ok_or_else(|| self.unavailable())?;
        let tera = cell.get().ok_or_else(|| self.unavailable())?;
        f(tera)
    }

    fn unavailable(&self) -> TemplateError {
        TemplateError::ScopeUnavailable {
            scope: self.name.clone(),
        }
    }
}

/// The functions and filters attached to every chart template scope.
pub struct FunctionRegistry {
    scope: ScopeHandle,
    guard: Arc<InclusionGuard>,
}

impl FunctionRegistry {
    /// Bind a registry to one scope and one inclusion guard.
    pub fn new(scope: ScopeHandle, guard: Arc<InclusionGuard>) -> Self {
        Self {
            scope,
            guard,
        }
    }

    /// Register the converters and `include` on `tera`.
    ///
    /// | Name       | Filter | Function                   |
    /// |------------|--------|----------------------------|
    /// | `toYaml`   | yes    | `toYaml(value=...)`        |
    /// | `fromYaml` | yes    | `fromYaml(text=...)`       |
    /// | `toHTML`   | yes    | `toHTML(text=...)`         |
    /// | `include`  | no     | `include(name=..., data=...)` |
    pub fn register(self, tera: &mut Tera) {
        tera.register_filter("toYaml", filters::to_yaml_filter);
        tera.register_filter("fromYaml", filters::from_yaml_filter);
        tera.register_filter("toHTML", filters::to_html_filter);

        tera.register_function("toYaml", filters::to_yaml_function);
        tera.register_function("fromYaml", filters::from_yaml_function);
        tera.register_function("toHTML", filters::to_html_function);

        let FunctionRegistry {
            scope,
            guard,
        } = self;
        tera.register_function("include", move |args: &HashMap<String, Value>| {
            let name = args.get("name").and_then(Value::as_str).ok_or_else(|| {
                tera::Error::msg("Function `include` requires a string `name` argument")
            })?;
            let data = args.get("data").cloned().unwrap_or(Value::Null);

            scope
                .with_tera(|tera| guard.include(tera, name, &data))
                .map(Value::String)
                .map_err(|e| tera::Error::msg(e.to_string()))
        });
    }
}
