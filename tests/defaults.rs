//! Default value tests
//!
//! Absent input keys fall back to the declared default (a static value
//! or a producer), defaults are materialized fresh per instance, and
//! an explicitly-null input key suppresses the default.

use chrono::{NaiveDate, NaiveTime};
use modelcast::{FieldDecl, Map, Model, ScalarKind, Value};
use serde_json::json;

// =============================================================================
// Static Defaults
// =============================================================================

#[test]
fn test_defaults_apply_when_keys_absent() {
    let job = Model::builder("Job")
        .field("title", FieldDecl::string())
        .field("company", FieldDecl::string())
        .build()
        .unwrap();
    let default_job = job
        .construct_json(json!({"title": "Unemployed", "company": "N/A"}))
        .unwrap();
    let default_hobbies = Value::List(vec![Value::from("eating"), Value::from("reading")]);
    let default_last_ate = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
    let default_birthday = NaiveDate::from_ymd_opt(1990, 4, 1).unwrap();
    let default_time_of_death = default_birthday.and_hms_opt(23, 59, 59).unwrap();

    let person = Model::builder("Person")
        .field("name", FieldDecl::string().with_default("John Doe"))
        .field("age", FieldDecl::int().with_default(18))
        .field("height", FieldDecl::float().with_default(1.70))
        .field(
            "job",
            FieldDecl::embedded(job.clone()).with_default(default_job.clone()),
        )
        .field(
            "hobbies",
            FieldDecl::list_of(ScalarKind::String).with_default(default_hobbies.clone()),
        )
        .field(
            "last_ate",
            FieldDecl::time().with_default(Value::Time(default_last_ate)),
        )
        .field(
            "birthday",
            FieldDecl::date().with_default(Value::Date(default_birthday)),
        )
        .field(
            "time_of_death",
            FieldDecl::datetime().with_default(Value::DateTime(default_time_of_death)),
        )
        .build()
        .unwrap();

    let p = person.construct(&Map::new()).unwrap();
    assert_eq!(p.get("name").unwrap().as_str(), Some("John Doe"));
    assert_eq!(p.get("age").unwrap().as_int(), Some(18));
    assert_eq!(p.get("height").unwrap().as_float(), Some(1.70));
    assert_eq!(p.get("job").unwrap().as_model().unwrap(), &default_job);
    assert_eq!(p.get("hobbies").unwrap(), &default_hobbies);
    assert_eq!(p.get("last_ate").unwrap(), &Value::Time(default_last_ate));
    assert_eq!(p.get("birthday").unwrap(), &Value::Date(default_birthday));
    assert_eq!(
        p.get("time_of_death").unwrap(),
        &Value::DateTime(default_time_of_death)
    );
}

#[test]
fn test_input_overrides_default() {
    let person = Model::builder("Person")
        .field("name", FieldDecl::string().with_default("John Doe"))
        .build()
        .unwrap();

    let p = person.construct_json(json!({"name": "Alan"})).unwrap();
    assert_eq!(p.get("name").unwrap().as_str(), Some("Alan"));
}

#[test]
fn test_explicit_null_suppresses_default() {
    let person = Model::builder("Person")
        .field("age", FieldDecl::int().with_default(18))
        .build()
        .unwrap();

    let p = person.construct_json(json!({"age": null})).unwrap();
    assert!(p.get("age").unwrap().is_null());
}

#[test]
fn test_default_goes_through_coercion() {
    let person = Model::builder("Person")
        .field("age", FieldDecl::int().with_default("30"))
        .build()
        .unwrap();
    let p = person.construct(&Map::new()).unwrap();
    assert_eq!(p.get("age").unwrap().as_int(), Some(30));

    // An ill-typed default fails at construction, not silently later
    let broken = Model::builder("Person")
        .field("age", FieldDecl::int().with_default("thirty"))
        .build()
        .unwrap();
    let err = broken.construct(&Map::new()).unwrap_err();
    assert_eq!(err.path(), "age");
}

// =============================================================================
// Per-Instance Independence
// =============================================================================

#[test]
fn test_default_lists_are_independent_per_instance() {
    let person = Model::builder("Person")
        .field(
            "hobbies",
            FieldDecl::list_of(ScalarKind::String)
                .with_default(Value::List(vec![Value::from("eating")])),
        )
        .build()
        .unwrap();

    let mut first = person.construct(&Map::new()).unwrap();
    let second = person.construct(&Map::new()).unwrap();
    assert_eq!(first, second);

    first
        .set(
            "hobbies",
            Value::List(vec![Value::from("eating"), Value::from("skydiving")]),
        )
        .unwrap();

    // Neither the sibling nor a fresh instance sees the mutation
    assert_eq!(
        second.get("hobbies").unwrap(),
        &Value::List(vec![Value::from("eating")])
    );
    let third = person.construct(&Map::new()).unwrap();
    assert_eq!(
        third.get("hobbies").unwrap(),
        &Value::List(vec![Value::from("eating")])
    );
}

#[test]
fn test_producer_default_runs_fresh_per_instance() {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    let counter = Arc::new(AtomicI64::new(0));
    let producer_counter = counter.clone();
    let ticket = Model::builder("Ticket")
        .field(
            "serial",
            FieldDecl::int()
                .with_default_fn(move || Value::Int(producer_counter.fetch_add(1, Ordering::SeqCst))),
        )
        .build()
        .unwrap();

    let a = ticket.construct(&Map::new()).unwrap();
    let b = ticket.construct(&Map::new()).unwrap();
    assert_eq!(a.get("serial").unwrap().as_int(), Some(0));
    assert_eq!(b.get("serial").unwrap().as_int(), Some(1));
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    // A supplied value skips the producer entirely
    let c = ticket.construct_json(json!({"serial": 99})).unwrap();
    assert_eq!(c.get("serial").unwrap().as_int(), Some(99));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}
