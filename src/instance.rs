//! Model instances
//!
//! An instance holds one resolved value per declared field of its
//! record type, in declaration order. Instances are created with
//! [`Model::construct`] or mutated in place with
//! [`Instance::populate`]; both apply the identical per-field
//! resolution, so the two paths cannot disagree.

use std::fmt;

use crate::errors::{ValidationError, ValidationResult};
use crate::resolver;
use crate::types::Model;
use crate::value::{Map, Value};

impl Model {
    /// Constructs a new instance from raw keyword input.
    ///
    /// Keys that match declared fields are resolved per their
    /// declarations; unknown keys are ignored; absent keys fall back
    /// to declared defaults or null. The first field failure aborts
    /// the call, and no instance is returned.
    pub fn construct(&self, input: &Map) -> ValidationResult<Instance> {
        resolver::construct_at(self, input, "")
    }

    /// Constructs a new instance from a JSON object.
    pub fn construct_json(&self, raw: serde_json::Value) -> ValidationResult<Instance> {
        self.construct(&json_to_map(raw)?)
    }
}

/// A concrete record: one resolved value per declared field.
///
/// Cloning is a deep copy of the whole value graph. The field table
/// itself is shared with the type (it is immutable), so a clone
/// compares equal to and is fully independent of the original.
#[derive(Clone)]
pub struct Instance {
    model: Model,
    values: Vec<Value>,
}

impl Instance {
    /// Creates an instance with every field null. Resolution fills it
    /// in; defaults apply through `populate`, not here.
    pub(crate) fn empty(model: Model) -> Self {
        let values = vec![Value::Null; model.len()];
        Self { model, values }
    }

    /// Returns the record type of this instance.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns true when this instance is of the given record type.
    pub fn is_of(&self, model: &Model) -> bool {
        self.model.same_type(model)
    }

    /// Returns the value of a declared field, or `None` for a name the
    /// type does not declare. Unknown input keys are never stored, so
    /// this is `None` for them too.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.model.field(name).map(|(index, _)| &self.values[index])
    }

    /// Returns declared field names and their current values, in
    /// declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.model
            .fields()
            .map(|(name, _)| name)
            .zip(self.values.iter())
    }

    /// Applies raw keyword input to this instance in place.
    ///
    /// Same per-field algorithm as [`Model::construct`]. On failure
    /// the instance may be left partially updated; callers should not
    /// keep using it after an error.
    pub fn populate(&mut self, input: &Map) -> ValidationResult<()> {
        resolver::populate_at(self, input, "")
    }

    /// Applies a JSON object to this instance in place.
    pub fn populate_json(&mut self, raw: serde_json::Value) -> ValidationResult<()> {
        self.populate(&json_to_map(raw)?)
    }

    /// Resolves and assigns a single field.
    pub fn set(&mut self, name: &str, raw: impl Into<Value>) -> ValidationResult<()> {
        let (index, decl) = self
            .model
            .field(name)
            .ok_or_else(|| ValidationError::unknown_field(self.model.name(), name))?;
        let value = resolver::resolve_field(decl, &raw.into(), name)?;
        self.values[index] = value;
        Ok(())
    }

    pub(crate) fn set_index(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }
}

/// Two instances are equal when they share a record type and every
/// declared field's value is recursively equal.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.model.same_type(&other.model) && self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.model.name());
        for (name, value) in self.fields() {
            debug.field(name, value);
        }
        debug.finish()
    }
}

fn json_to_map(raw: serde_json::Value) -> ValidationResult<Map> {
    match Value::from(raw) {
        Value::Map(map) => Ok(map),
        other => Err(ValidationError::type_mismatch(
            "",
            "object",
            other.type_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDecl;
    use serde_json::json;

    fn person() -> Model {
        Model::builder("Person")
            .field("name", FieldDecl::string())
            .field("age", FieldDecl::int())
            .build()
            .unwrap()
    }

    #[test]
    fn test_construct_resolves_fields() {
        let instance = person()
            .construct_json(json!({"name": "Alan", "age": "24"}))
            .unwrap();
        assert_eq!(instance.get("name").unwrap().as_str(), Some("Alan"));
        assert_eq!(instance.get("age").unwrap().as_int(), Some(24));
    }

    #[test]
    fn test_unknown_keys_not_stored() {
        let instance = person()
            .construct_json(json!({"name": "Alan", "trash": "123qwe"}))
            .unwrap();
        assert!(instance.get("trash").is_none());
    }

    #[test]
    fn test_construct_json_requires_object() {
        assert!(person().construct_json(json!([1, 2])).is_err());
        assert!(person().construct_json(json!("nope")).is_err());
    }

    #[test]
    fn test_set_validates_one_field() {
        let mut instance = person().construct(&Map::new()).unwrap();
        instance.set("age", Value::from("30")).unwrap();
        assert_eq!(instance.get("age").unwrap().as_int(), Some(30));

        assert!(instance.set("age", Value::from("old")).is_err());
        assert!(instance.set("shoe_size", Value::Int(44)).is_err());
    }

    #[test]
    fn test_equality_requires_same_type() {
        let ty = person();
        let a = ty.construct_json(json!({"name": "Alan"})).unwrap();
        let b = ty.construct_json(json!({"name": "Alan"})).unwrap();
        let c = ty.construct_json(json!({"name": "Wake"})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Structurally identical but separately built type
        let other = person().construct_json(json!({"name": "Alan"})).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_debug_shows_declared_fields() {
        let instance = person().construct_json(json!({"name": "Alan"})).unwrap();
        let rendered = format!("{:?}", instance);
        assert!(rendered.contains("Person"));
        assert!(rendered.contains("name"));
        assert!(rendered.contains("Alan"));
    }
}
