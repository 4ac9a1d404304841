//! Field declarations and record types
//!
//! A record type is built once, explicitly, from an ordered list of
//! named field declarations. After `build()` the field table is
//! immutable and shared by every instance of the type.
//!
//! Supported field kinds:
//! - scalar: string, int, float, bool, time, date, datetime
//! - embedded: one or more candidate record types
//! - list: one or more candidate element kinds (scalar or record)

use std::fmt;
use std::sync::Arc;

use crate::errors::{ValidationError, ValidationResult};
use crate::value::Value;

/// Scalar field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// Time of day
    Time,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
}

impl ScalarKind {
    /// Returns the kind name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Time => "time",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
        }
    }
}

/// A candidate element kind for a list field
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Scalar element, coerced per kind
    Scalar(ScalarKind),
    /// Record element, resolved against the candidate type
    Model(Model),
}

impl From<ScalarKind> for ItemKind {
    fn from(kind: ScalarKind) -> Self {
        ItemKind::Scalar(kind)
    }
}

impl From<Model> for ItemKind {
    fn from(model: Model) -> Self {
        ItemKind::Model(model)
    }
}

impl From<&Model> for ItemKind {
    fn from(model: &Model) -> Self {
        ItemKind::Model(model.clone())
    }
}

/// The value kind of one declared field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Primitive value, coerced on input
    Scalar(ScalarKind),
    /// Nested record; multiple candidates resolve polymorphically
    Embedded(Vec<Model>),
    /// Ordered sequence of candidate element kinds
    List(Vec<ItemKind>),
}

/// A field default: a concrete value, or a producer invoked fresh for
/// each instance so no two instances share a mutable default.
#[derive(Clone)]
pub enum FieldDefault {
    /// Static value, deep-cloned per instance
    Value(Value),
    /// Zero-argument producer, called per instance
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl FieldDefault {
    /// Produces a fresh default value.
    pub fn produce(&self) -> Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldDefault::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Declaration of one named attribute: its value kind and optional
/// default. A field with no default is simply allowed to stay null.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    kind: FieldKind,
    default: Option<FieldDefault>,
}

impl FieldDecl {
    fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    /// Declare a string field
    pub fn string() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::String))
    }

    /// Declare an integer field
    pub fn int() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::Int))
    }

    /// Declare a float field
    pub fn float() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::Float))
    }

    /// Declare a boolean field
    pub fn bool() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::Bool))
    }

    /// Declare a time-of-day field
    pub fn time() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::Time))
    }

    /// Declare a calendar-date field
    pub fn date() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::Date))
    }

    /// Declare a date-and-time field
    pub fn datetime() -> Self {
        Self::new(FieldKind::Scalar(ScalarKind::DateTime))
    }

    /// Declare an embedded field with a single target type
    pub fn embedded(model: Model) -> Self {
        Self::new(FieldKind::Embedded(vec![model]))
    }

    /// Declare an embedded field resolved against candidate types in
    /// the given order
    pub fn embedded_one_of(candidates: impl IntoIterator<Item = Model>) -> Self {
        Self::new(FieldKind::Embedded(candidates.into_iter().collect()))
    }

    /// Declare a list field with a single element kind
    pub fn list_of(item: impl Into<ItemKind>) -> Self {
        Self::new(FieldKind::List(vec![item.into()]))
    }

    /// Declare a list field whose elements resolve against candidate
    /// kinds in the given order
    pub fn list_one_of<I, K>(candidates: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ItemKind>,
    {
        Self::new(FieldKind::List(
            candidates.into_iter().map(Into::into).collect(),
        ))
    }

    /// Attach a static default value, applied when the input omits the
    /// field. The value is deep-cloned for every instance.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    /// Attach a default producer, invoked fresh for every instance.
    pub fn with_default_fn<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(FieldDefault::Producer(Arc::new(producer)));
        self
    }

    /// Returns the declared value kind
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the declared default, if any
    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    /// Returns true when the declaration carries a default
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

struct ModelInner {
    name: String,
    fields: Vec<(String, FieldDecl)>,
}

/// A record type: a named, ordered, immutable field table.
///
/// `Model` is a cheap handle; clones share the same table. Identity is
/// handle identity, so two separately built types are distinct even if
/// their definitions coincide, mirroring nominal typing.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    /// Starts building a record type with the given name.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Returns the type name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDecl)> {
        self.inner
            .fields
            .iter()
            .map(|(name, decl)| (name.as_str(), decl))
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    /// Returns true when the type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Looks up a field by name, returning its declaration index.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDecl)> {
        self.inner
            .fields
            .iter()
            .position(|(field_name, _)| field_name == name)
            .map(|index| (index, &self.inner.fields[index].1))
    }

    /// Returns true when the type declares a field with this name.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns true when both handles refer to the same registered type.
    pub fn same_type(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field(
                "fields",
                &self
                    .inner
                    .fields
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for a record type. Fields keep their registration order;
/// duplicate names are rejected at `build()`.
pub struct ModelBuilder {
    name: String,
    fields: Vec<(String, FieldDecl)>,
}

impl ModelBuilder {
    /// Registers a field. Declaration order is the registration order.
    pub fn field(mut self, name: impl Into<String>, decl: FieldDecl) -> Self {
        self.fields.push((name.into(), decl));
        self
    }

    /// Finishes the type, checking field-name uniqueness.
    pub fn build(self) -> ValidationResult<Model> {
        for (index, (name, _)) in self.fields.iter().enumerate() {
            if self.fields[..index].iter().any(|(seen, _)| seen == name) {
                return Err(ValidationError::duplicate_field(&self.name, name));
            }
        }
        Ok(Model {
            inner: Arc::new(ModelInner {
                name: self.name,
                fields: self.fields,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Model {
        Model::builder("Person")
            .field("name", FieldDecl::string())
            .field("age", FieldDecl::int())
            .build()
            .unwrap()
    }

    #[test]
    fn test_declaration_order_preserved() {
        let model = person();
        let names: Vec<_> = model.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn test_field_lookup() {
        let model = person();
        let (index, decl) = model.field("age").unwrap();
        assert_eq!(index, 1);
        assert!(matches!(decl.kind(), FieldKind::Scalar(ScalarKind::Int)));
        assert!(model.field("unknown").is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Model::builder("Person")
            .field("name", FieldDecl::string())
            .field("name", FieldDecl::string())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().message().contains("more than once"));
    }

    #[test]
    fn test_type_identity_is_nominal() {
        let a = person();
        let b = person();
        assert!(a.same_type(&a.clone()));
        assert!(!a.same_type(&b));
    }

    #[test]
    fn test_default_producer_invoked_per_produce_call() {
        use std::sync::atomic::{AtomicI64, Ordering};

        let calls = Arc::new(AtomicI64::new(0));
        let seen = calls.clone();
        let decl = FieldDecl::int()
            .with_default_fn(move || Value::Int(seen.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(decl.default().unwrap().produce(), Value::Int(0));
        assert_eq!(decl.default().unwrap().produce(), Value::Int(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
