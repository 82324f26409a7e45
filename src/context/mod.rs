//! Interpolation context shared by every source of one resolution.

mod env;

use crate::value::{Mapping, Value};

/// Immutable set of variables available to `%{name}` interpolation.
///
/// Built once per resolution and never mutated afterwards. Values are usually
/// strings but may be any [`Value`]; nested values are reachable with
/// `%{name.key}` and `%{name[0]}` paths.
///
/// ## Example
///
/// ```
/// use hiera::Context;
///
/// let ctx = Context::builder()
///     .with_var("environment", "production")
///     .build();
///
/// assert_eq!(ctx.get("environment").and_then(|v| v.as_str()), Some("production"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Mapping,
}

impl Context {
    /// Creates a new builder for constructing a `Context`.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Context with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn vars(&self) -> &Mapping {
        &self.vars
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builder for constructing a [`Context`].
///
/// Variables are applied in registration order, so a later registration of
/// the same name overrides an earlier one.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ContextBuilder {
    vars: Mapping,
}

impl ContextBuilder {
    /// Sets a single variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Imports process environment variables named `<prefix>_<NAME>`.
    ///
    /// Each one becomes the string variable `<name>` (lower-cased), so with
    /// `HIERA_ENVIRONMENT=staging` and prefix `HIERA` the context gains
    /// `environment: staging`.
    pub fn with_env(mut self, prefix: &str) -> Self {
        for (name, value) in env::prefixed_vars(std::env::vars(), prefix) {
            self.vars.insert(name, Value::String(value));
        }
        self
    }

    /// Builds the `Context`.
    pub fn build(self) -> Context {
        Context { vars: self.vars }
    }
}
