//! Field resolution engine
//!
//! Turns raw values into resolved field values: scalar coercion,
//! polymorphic candidate selection for embedded mappings, and
//! per-element list resolution. Construction and population both
//! funnel through [`populate_at`], so the two entry points cannot
//! drift apart.
//!
//! Resolution is deterministic and fail-fast: the first failing field
//! aborts the whole call with the offending path.

use crate::errors::{index_path, make_path, ValidationError, ValidationResult};
use crate::instance::Instance;
use crate::types::{FieldDecl, FieldKind, ItemKind, Model, ScalarKind};
use crate::value::{Map, Value};

/// Constructs a fresh instance of `model` from raw keyword input.
///
/// Never returns a half-built instance; any field failure discards the
/// partial result.
pub(crate) fn construct_at(model: &Model, input: &Map, prefix: &str) -> ValidationResult<Instance> {
    let mut instance = Instance::empty(model.clone());
    populate_at(&mut instance, input, prefix)?;
    Ok(instance)
}

/// Applies raw keyword input to an existing instance, field by field
/// in declaration order.
///
/// A key present in the input is resolved per the field's declaration
/// (an explicit null stays null). An absent key falls back to the
/// field's default, produced fresh and resolved through the same
/// pipeline, or null. Unknown keys are ignored. On failure the
/// instance may be left partially updated.
pub(crate) fn populate_at(
    instance: &mut Instance,
    input: &Map,
    prefix: &str,
) -> ValidationResult<()> {
    let model = instance.model().clone();
    for (index, (name, decl)) in model.fields().enumerate() {
        let field_path = make_path(prefix, name);
        let value = match input.get(name) {
            Some(raw) => resolve_field(decl, raw, &field_path)?,
            None => match decl.default() {
                Some(default) => resolve_field(decl, &default.produce(), &field_path)?,
                None => Value::Null,
            },
        };
        instance.set_index(index, value);
    }
    Ok(())
}

/// Resolves one raw value against one field declaration.
pub(crate) fn resolve_field(
    decl: &FieldDecl,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match decl.kind() {
        FieldKind::Scalar(kind) => coerce_scalar(*kind, raw, path),
        FieldKind::Embedded(candidates) => resolve_embedded(candidates, raw, path),
        FieldKind::List(items) => resolve_list(items, raw, path),
    }
}

/// Best-effort scalar coercion. Conversions that would lose precision
/// for the target kind are rejected.
fn coerce_scalar(kind: ScalarKind, raw: &Value, path: &str) -> ValidationResult<Value> {
    let coerced = match (kind, raw) {
        (ScalarKind::String, Value::String(s)) => Some(Value::String(s.clone())),
        (ScalarKind::Int, Value::Int(n)) => Some(Value::Int(*n)),
        (ScalarKind::Int, Value::Float(f)) => int_from_float(*f),
        (ScalarKind::Int, Value::String(s)) => int_from_str(s),
        (ScalarKind::Float, Value::Float(f)) => Some(Value::Float(*f)),
        (ScalarKind::Float, Value::Int(n)) => Some(Value::Float(*n as f64)),
        (ScalarKind::Float, Value::String(s)) => s.parse::<f64>().ok().map(Value::Float),
        (ScalarKind::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
        (ScalarKind::Time, Value::Time(t)) => Some(Value::Time(*t)),
        (ScalarKind::Time, Value::String(s)) => s.parse().ok().map(Value::Time),
        (ScalarKind::Date, Value::Date(d)) => Some(Value::Date(*d)),
        (ScalarKind::Date, Value::String(s)) => s.parse().ok().map(Value::Date),
        (ScalarKind::DateTime, Value::DateTime(dt)) => Some(Value::DateTime(*dt)),
        (ScalarKind::DateTime, Value::String(s)) => s.parse().ok().map(Value::DateTime),
        _ => None,
    };
    coerced.ok_or_else(|| ValidationError::type_mismatch(path, kind.name(), describe(raw)))
}

fn int_from_float(f: f64) -> Option<Value> {
    // Exactly 2^63; `i64::MAX as f64` rounds up to this, so the upper
    // bound must be exclusive or the cast would saturate and shift the
    // value by one.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    // Reject fractional values instead of truncating
    if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        Some(Value::Int(f as i64))
    } else {
        None
    }
}

fn int_from_str(s: &str) -> Option<Value> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(Value::Int(n));
    }
    s.parse::<f64>().ok().and_then(int_from_float)
}

/// Resolves a raw value into exactly one instance of one candidate
/// record type.
fn resolve_embedded(candidates: &[Model], raw: &Value, path: &str) -> ValidationResult<Value> {
    match raw {
        // An already-built instance of a candidate type is accepted
        // unchanged, without re-validation.
        Value::Model(instance) => {
            if candidates.iter().any(|c| instance.is_of(c)) {
                Ok(raw.clone())
            } else {
                Err(ValidationError::type_mismatch(
                    path,
                    candidate_names(candidates),
                    instance.model().name(),
                ))
            }
        }
        Value::Map(map) => resolve_mapping(candidates, map, path),
        other => Err(ValidationError::type_mismatch(
            path,
            candidate_names(candidates),
            describe(other),
        )),
    }
}

/// Constructs a mapping against the candidate list.
///
/// With a single candidate the mapping is constructed directly and any
/// nested failure is fatal. With several, the candidate whose declared
/// fields overlap the most input keys wins; ties go to the first
/// declared, and zero overlap matches nothing.
fn resolve_mapping(candidates: &[Model], map: &Map, path: &str) -> ValidationResult<Value> {
    let winner = match candidates {
        [] => return Err(ValidationError::no_matching_type(path)),
        [only] => only,
        _ => select_candidate(candidates, map)
            .ok_or_else(|| ValidationError::no_matching_type(path))?,
    };
    construct_at(winner, map, path).map(Value::Model)
}

/// Picks the candidate with the highest key overlap, first declared on
/// ties. Zero overlap never matches.
fn select_candidate<'a>(candidates: &'a [Model], map: &Map) -> Option<&'a Model> {
    let mut best: Option<(&Model, usize)> = None;
    for candidate in candidates {
        let score = map.keys().filter(|key| candidate.declares(key)).count();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Resolves a raw value into an ordered sequence, each element matched
/// independently against the declared candidate kinds.
fn resolve_list(candidates: &[ItemKind], raw: &Value, path: &str) -> ValidationResult<Value> {
    // Shape check comes first, before any element is touched
    let elements = match raw {
        Value::List(elements) => elements,
        other => return Err(ValidationError::not_iterable(path, describe(other))),
    };
    let mut resolved = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        resolved.push(resolve_element(candidates, element, &index_path(path, index))?);
    }
    Ok(Value::List(resolved))
}

fn resolve_element(candidates: &[ItemKind], raw: &Value, path: &str) -> ValidationResult<Value> {
    match raw {
        Value::Map(map) => {
            let models: Vec<Model> = candidates
                .iter()
                .filter_map(|item| match item {
                    ItemKind::Model(model) => Some(model.clone()),
                    ItemKind::Scalar(_) => None,
                })
                .collect();
            if models.is_empty() {
                return Err(ValidationError::type_mismatch(
                    path,
                    item_names(candidates),
                    "map",
                ));
            }
            resolve_mapping(&models, map, path)
        }
        Value::Model(instance) => {
            let accepted = candidates.iter().any(|item| match item {
                ItemKind::Model(model) => instance.is_of(model),
                ItemKind::Scalar(_) => false,
            });
            if accepted {
                Ok(raw.clone())
            } else {
                Err(ValidationError::type_mismatch(
                    path,
                    item_names(candidates),
                    instance.model().name(),
                ))
            }
        }
        Value::Null => Err(ValidationError::type_mismatch(
            path,
            item_names(candidates),
            "null",
        )),
        scalar => {
            for item in candidates {
                if let ItemKind::Scalar(kind) = item {
                    if let Ok(value) = coerce_scalar(*kind, scalar, path) {
                        return Ok(value);
                    }
                }
            }
            Err(ValidationError::type_mismatch(
                path,
                item_names(candidates),
                describe(scalar),
            ))
        }
    }
}

/// Describes a raw value for error messages.
fn describe(raw: &Value) -> String {
    match raw {
        Value::Model(instance) => format!("instance of '{}'", instance.model().name()),
        other => other.type_name().to_string(),
    }
}

fn candidate_names(candidates: &[Model]) -> String {
    let names: Vec<&str> = candidates.iter().map(Model::name).collect();
    format!("one of [{}]", names.join(", "))
}

fn item_names(candidates: &[ItemKind]) -> String {
    let names: Vec<&str> = candidates
        .iter()
        .map(|item| match item {
            ItemKind::Scalar(kind) => kind.name(),
            ItemKind::Model(model) => model.name(),
        })
        .collect();
    format!("one of [{}]", names.join(", "))
}
