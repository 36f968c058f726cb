use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tetra_model::{entity, Blob, Entity, Field, FieldKind, ModelError, Record, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
    city: String,
    zip: Option<String>,
}

entity!(Address { city: String, zip: Option<String> });

#[derive(Debug, Clone, Default, PartialEq)]
struct User {
    id: String,
    name: String,
    age: i32,
    tags: Vec<String>,
    address: Address,
    avatar: Option<Blob>,
    session: Option<String>,
}

entity!(User {
    id: String,
    name as "full_name": String,
    age: i32,
    tags: Vec<String>,
    address: Address,
    avatar: Option<Blob>,
} transient { session });

#[derive(Debug, Default, PartialEq)]
struct Empty {}

entity!(Empty {});

fn make_user() -> User {
    User {
        id: "u1".into(),
        name: "Ann".into(),
        age: 30,
        tags: vec!["admin".into(), "ops".into()],
        address: Address {
            city: "Oslo".into(),
            zip: None,
        },
        avatar: Some(Blob(vec![1, 2, 3])),
        session: Some("token".into()),
    }
}

// ── Record mapping ───────────────────────────────────────────────

#[test]
fn to_record_follows_declaration_order() {
    let record = make_user().to_record();
    let columns: Vec<&str> = record.columns().collect();
    assert_eq!(columns, vec!["id", "full_name", "age", "tags", "address", "avatar"]);
}

#[test]
fn to_record_values() {
    let record = make_user().to_record();
    assert_eq!(record.get("full_name"), Some(&Value::from("Ann")));
    assert_eq!(record.get("age"), Some(&Value::Int(30)));
    assert_eq!(
        record.get("tags"),
        Some(&Value::List(vec![Value::from("admin"), Value::from("ops")]))
    );
    assert_eq!(record.get("session"), None);
}

#[test]
fn nested_entity_becomes_map() {
    let record = make_user().to_record();
    let mut expected = BTreeMap::new();
    expected.insert("city".to_string(), Value::from("Oslo"));
    expected.insert("zip".to_string(), Value::Null);
    assert_eq!(record.get("address"), Some(&Value::Map(expected)));
}

#[test]
fn from_record_roundtrip_drops_transient() {
    let user = make_user();
    let back = User::from_record(user.to_record()).unwrap();
    assert_eq!(back, User { session: None, ..user });
}

#[test]
fn from_document_roundtrip() {
    let user = make_user();
    let document = user.to_record().into_document();
    let back = User::from_record(Record::from_document(document)).unwrap();
    assert_eq!(back.address, user.address);
    assert_eq!(back.tags, user.tags);
}

#[test]
fn missing_collection_decodes_empty() {
    let mut record = make_user().to_record();
    record.take("tags");
    let back = User::from_record(record).unwrap();
    assert!(back.tags.is_empty());
}

#[test]
fn missing_required_scalar_names_column() {
    let mut record = make_user().to_record();
    record.take("age");
    let err = User::from_record(record).unwrap_err();
    match err {
        ModelError::Field { column, .. } => assert_eq!(column, "age"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn out_of_range_integer_fails() {
    let mut record = make_user().to_record();
    record.push("age", Value::Int(i64::from(i32::MAX) + 1));
    let err = User::from_record(record).unwrap_err();
    assert!(err.to_string().contains("age"));
}

#[test]
fn nested_decode_error_is_wrapped() {
    let mut record = make_user().to_record();
    record.push("address", Value::from("not a map"));
    assert!(matches!(
        User::from_record(record),
        Err(ModelError::Field { .. })
    ));
}

// ── Empty entity ─────────────────────────────────────────────────

#[test]
fn empty_entity_maps_to_empty_record() {
    assert!(Empty::descriptor().is_empty());
    assert!(Empty {}.to_record().is_empty());
    assert_eq!(Empty::from_record(Record::new()).unwrap(), Empty {});
}

// ── Field impls ──────────────────────────────────────────────────

#[test]
fn scalar_field_kinds() {
    assert_eq!(<i64 as Field>::KIND, FieldKind::Scalar);
    assert_eq!(<chrono::DateTime<Utc> as Field>::KIND, FieldKind::Scalar);
    assert_eq!(<Uuid as Field>::KIND, FieldKind::Scalar);
    assert_eq!(<Option<Address> as Field>::KIND, FieldKind::Nested);
    assert_eq!(<Box<Address> as Field>::KIND, FieldKind::Nested);
    assert_eq!(<Vec<Address> as Field>::KIND, FieldKind::Collection);
    assert_eq!(<BTreeMap<String, i64> as Field>::KIND, FieldKind::Nested);
}

#[test]
fn timestamp_field_accepts_text() {
    let ts = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
    let decoded = <chrono::DateTime<Utc>>::from_value(Value::from(ts.to_rfc3339())).unwrap();
    assert_eq!(decoded, ts);
}

#[test]
fn bool_field_accepts_integers() {
    assert!(bool::from_value(Value::Int(1)).unwrap());
}

#[test]
fn f32_field_roundtrip() {
    let v = 2.5f32.to_value();
    assert_eq!(v, Value::Float(2.5));
    assert_eq!(f32::from_value(v).unwrap(), 2.5);
}

#[test]
fn json_field_maps_structurally() {
    let json = serde_json::json!({"a": [1, 2.5, "x"], "b": null});
    let value = json.to_value();
    let Value::Map(fields) = &value else {
        panic!("expected map, got {value:?}");
    };
    assert_eq!(
        fields.get("a"),
        Some(&Value::List(vec![Value::Int(1), Value::Float(2.5), Value::from("x")]))
    );
    assert_eq!(serde_json::Value::from_value(value).unwrap(), json);
}

#[test]
fn map_field_roundtrip() {
    let mut scores = BTreeMap::new();
    scores.insert("math".to_string(), 90i64);
    let back = BTreeMap::<String, i64>::from_value(scores.to_value()).unwrap();
    assert_eq!(back, scores);
}
