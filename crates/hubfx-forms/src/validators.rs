//! # Validators
//!
//! Sync validators map a value to error flags. Async validators map a stream
//! of values to a stream of error flags and choose their own timing and
//! cancellation strategy (see `hubfx_core::switch_map` / `merge_map`).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

/// Error key → flag. A key mapped to `true` is an active error.
pub type FormErrors = BTreeMap<String, bool>;

/// Stream of control values fed to an async validator.
pub type ValueStream = BoxStream<'static, Value>;

/// Stream of error mappings produced by an async validator.
pub type ErrorStream = BoxStream<'static, FormErrors>;

/// True when any flag is set.
pub fn has_error(errors: &FormErrors) -> bool {
    errors.values().any(|flag| *flag)
}

/// Synchronous validator: pure and total.
#[derive(Clone)]
pub struct Validator {
    name: String,
    func: Arc<dyn Fn(&Value) -> FormErrors + Send + Sync>,
}

impl Validator {
    /// Wrap a validation function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> FormErrors + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Validator name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the validator.
    pub fn validate(&self, value: &Value) -> FormErrors {
        (self.func)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.name)
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.func).cast::<()>() == Arc::as_ptr(&other.func).cast::<()>()
    }
}

/// Asynchronous validator: `(valueStream) -> errorsStream`.
#[derive(Clone)]
pub struct AsyncValidator {
    name: String,
    func: Arc<dyn Fn(ValueStream) -> ErrorStream + Send + Sync>,
}

impl AsyncValidator {
    /// Wrap a stream transform.
    pub fn new<F, S>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ValueStream) -> S + Send + Sync + 'static,
        S: Stream<Item = FormErrors> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |values| func(values).boxed()),
        }
    }

    /// Validator name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach the validator to a value stream.
    pub fn validate(&self, values: ValueStream) -> ErrorStream {
        (self.func)(values)
    }
}

impl fmt::Debug for AsyncValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AsyncValidator({})", self.name)
    }
}

impl PartialEq for AsyncValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.func).cast::<()>() == Arc::as_ptr(&other.func).cast::<()>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    fn required() -> Validator {
        Validator::new("required", |value| {
            let missing = value.is_null() || value.as_str().is_some_and(str::is_empty);
            FormErrors::from([("required".to_string(), missing)])
        })
    }

    #[test]
    fn test_sync_validator_runs() {
        let validator = required();
        assert_eq!(validator.validate(&json!(""))["required"], true);
        assert_eq!(validator.validate(&json!("Homer"))["required"], false);
        assert_eq!(format!("{validator:?}"), "Validator(required)");
    }

    #[test]
    fn test_validators_compare_by_identity() {
        let a = required();
        assert_eq!(a, a.clone());
        assert_ne!(a, required());
    }

    #[test]
    fn test_has_error() {
        assert!(!has_error(&FormErrors::new()));
        assert!(!has_error(&FormErrors::from([("email".to_string(), false)])));
        assert!(has_error(&FormErrors::from([
            ("email".to_string(), false),
            ("required".to_string(), true),
        ])));
    }

    #[tokio::test]
    async fn test_async_validator_maps_stream() {
        let validator = AsyncValidator::new("taken", |values: ValueStream| {
            values.map(|value| FormErrors::from([("taken".to_string(), value == json!("homer"))]))
        });
        let results: Vec<FormErrors> = validator
            .validate(stream::iter(vec![json!("homer"), json!("marge")]).boxed())
            .collect()
            .await;
        assert_eq!(results[0]["taken"], true);
        assert_eq!(results[1]["taken"], false);
    }
}
