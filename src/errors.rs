//! Validation error type
//!
//! Every failure in this crate is a `ValidationError`: scalar coercion
//! failure, no matching candidate type, non-iterable list input,
//! per-element list failure, and malformed model definitions. There is
//! no error-code taxonomy; callers get a field path and a message.

use thiserror::Error;

/// Result type for construction, population, and resolution.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A validation failure at a specific point in the input tree.
///
/// `path` is dotted with bracketed list indices, e.g. `car.brand` or
/// `vehicles[2].seats`. An empty path means the failure concerns the
/// input as a whole (or a model definition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed at '{path}': {message}")]
pub struct ValidationError {
    path: String,
    message: String,
}

impl ValidationError {
    /// Create an error with an explicit path and message.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Value could not be coerced to the declared kind.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            format!("expected {}, got {}", expected.into(), actual.into()),
        )
    }

    /// A mapping matched none of the declared candidate types.
    pub fn no_matching_type(path: impl Into<String>) -> Self {
        Self::new(path, "no candidate type matches the given fields")
    }

    /// List input was not a sequence.
    pub fn not_iterable(path: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(path, format!("expected a sequence, got {}", actual.into()))
    }

    /// A model was defined with the same field name twice.
    pub fn duplicate_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            "",
            format!(
                "model '{}' declares field '{}' more than once",
                model.into(),
                field.into()
            ),
        )
    }

    /// A field name was used that the model does not declare.
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            field.into(),
            format!("model '{}' has no such field", model.into()),
        )
    }

    /// Returns the field path the failure occurred at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the human-readable failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Creates a field path from a prefix and a field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Creates an element path from a field path and a list index.
pub(crate) fn index_path(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}
