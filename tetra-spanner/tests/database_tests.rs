use std::sync::Arc;
use std::time::Instant;

use pretty_assertions::assert_eq;
use tetra_core::{Code, Context, RepositoryError, Status};
use tetra_spanner::{
    Database, Key, KeySet, MemorySpanner, Mutation, MutationOp, SpannerClient,
};
use tetra_types::Value;

fn db() -> MemorySpanner {
    let db = MemorySpanner::new("projects/p/instances/i/databases/d");
    db.create_table("users", &["id"], &["id", "name", "age"]).unwrap();
    db.create_table("events", &["tenant", "seq"], &["tenant", "seq", "body"])
        .unwrap();
    db
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| (*c).to_string()).collect()
}

fn user(id: &str, name: &str, age: i64) -> Mutation {
    Mutation::insert(
        "users",
        cols(&["id", "name", "age"]),
        vec![id.into(), name.into(), age.into()],
    )
}

fn code_of(err: &RepositoryError) -> Code {
    err.backend_source::<Status>().unwrap().code()
}

// ── Mutations ────────────────────────────────────────────────────

#[test]
fn constructors_record_their_operation() {
    assert_eq!(user("u1", "Ann", 30).op(), MutationOp::Insert);
    let delete = Mutation::delete("users", Key::from(Value::from("u1")));
    assert_eq!(delete.op(), MutationOp::Delete);
    assert_eq!(
        delete.key_set(),
        &KeySet::keys([Key::new(vec![Value::from("u1")])])
    );
    assert_eq!(Key::new(vec![Value::from("t"), Value::Int(2)]).to_string(), "('t', 2)");
}

#[test]
fn record_constructors_keep_column_order() {
    let record: tetra_model::Record = vec![
        ("id".to_string(), Value::from("u1")),
        ("age".to_string(), Value::Int(3)),
    ]
    .into_iter()
    .collect();
    let m = Mutation::replace_record("users", record);
    assert_eq!(m.op(), MutationOp::Replace);
    assert_eq!(m.columns(), cols(&["id", "age"]).as_slice());
    assert_eq!(m.values(), [Value::from("u1"), Value::Int(3)].as_slice());
}

// ── Apply ────────────────────────────────────────────────────────

#[test]
fn insert_then_read_row() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    let row = db
        .read_row(&cx, "users", &Key::from(Value::from("u1")), &cols(&["name", "age"]))
        .unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("Ann")));
    assert_eq!(row.get("age"), Some(&Value::Int(30)));
}

#[test]
fn insert_existing_row_already_exists() {
    let client = SpannerClient::new(Arc::new(db()));
    let cx = Context::background();
    client.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    let err = client.apply(&cx, vec![user("u1", "Bea", 31)]).unwrap_err();
    assert_eq!(code_of(&err), Code::AlreadyExists);
}

#[test]
fn update_missing_row_is_not_found() {
    let client = SpannerClient::new(Arc::new(db()));
    let update = Mutation::update("users", cols(&["id", "age"]), vec!["u1".into(), 1.into()]);
    let err = client.apply(&Context::background(), vec![update]).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn insert_or_update_keeps_unlisted_columns() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    db.apply(
        &cx,
        vec![Mutation::insert_or_update(
            "users",
            cols(&["id", "age"]),
            vec!["u1".into(), 31.into()],
        )],
    )
    .unwrap();
    let row = db
        .read_row(&cx, "users", &Key::from(Value::from("u1")), &cols(&["name", "age"]))
        .unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("Ann")));
    assert_eq!(row.get("age"), Some(&Value::Int(31)));
}

#[test]
fn replace_nulls_unlisted_columns() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    db.apply(
        &cx,
        vec![Mutation::replace("users", cols(&["id", "age"]), vec!["u1".into(), 31.into()])],
    )
    .unwrap();
    let row = db
        .read_row(&cx, "users", &Key::from(Value::from("u1")), &cols(&["name"]))
        .unwrap();
    assert_eq!(row.get("name"), Some(&Value::Null));
}

#[test]
fn apply_is_atomic() {
    let db = db();
    let cx = Context::background();
    let err = db
        .apply(&cx, vec![user("u1", "Ann", 30), user("u1", "Ann again", 30)])
        .unwrap_err();
    assert_eq!(err.code(), Code::AlreadyExists);
    assert_eq!(db.row_count("users"), 0);
}

#[test]
fn commit_timestamps_increase() {
    let db = db();
    let cx = Context::background();
    let a = db.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    let b = db.apply(&cx, vec![user("u2", "Bea", 31)]).unwrap();
    assert!(b > a);
}

#[test]
fn unknown_column_or_table_is_invalid() {
    let db = db();
    let cx = Context::background();
    let bad_column = Mutation::insert("users", cols(&["id", "email"]), vec!["u1".into(), "x".into()]);
    assert_eq!(db.apply(&cx, vec![bad_column]).unwrap_err().code(), Code::InvalidArgument);
    let bad_table = Mutation::insert("ghosts", cols(&["id"]), vec!["g".into()]);
    assert_eq!(db.apply(&cx, vec![bad_table]).unwrap_err().code(), Code::InvalidArgument);
}

#[test]
fn write_without_key_is_invalid() {
    let db = db();
    let m = Mutation::insert("users", cols(&["name"]), vec!["Ann".into()]);
    assert_eq!(
        db.apply(&Context::background(), vec![m]).unwrap_err().code(),
        Code::InvalidArgument
    );
}

#[test]
fn mismatched_values_are_invalid() {
    let db = db();
    let m = Mutation::insert("users", cols(&["id", "name"]), vec!["u1".into()]);
    assert_eq!(
        db.apply(&Context::background(), vec![m]).unwrap_err().code(),
        Code::InvalidArgument
    );
}

#[test]
fn failed_apply_leaves_every_touched_table() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u0", "Zed", 40)]).unwrap();
    let event = Mutation::insert("events", cols(&["tenant", "seq"]), vec!["a".into(), 1.into()]);
    let err = db
        .apply(&cx, vec![event, user("u1", "Ann", 30), user("u0", "Zed again", 41)])
        .unwrap_err();
    assert_eq!(err.code(), Code::AlreadyExists);
    assert_eq!(db.row_count("events"), 0);
    assert_eq!(db.row_count("users"), 1);
}

#[test]
fn later_mutations_see_earlier_ones_in_the_same_apply() {
    let db = db();
    let cx = Context::background();
    let update = Mutation::update("users", cols(&["id", "age"]), vec!["u1".into(), 31.into()]);
    db.apply(&cx, vec![user("u1", "Ann", 30), update]).unwrap();
    let row = db
        .read_row(&cx, "users", &Key::from(Value::from("u1")), &cols(&["age"]))
        .unwrap();
    assert_eq!(row.get("age"), Some(&Value::Int(31)));
}

// ── Reads and deletes ────────────────────────────────────────────

#[test]
fn read_all_in_key_order() {
    let db = db();
    let cx = Context::background();
    let event = |tenant: &str, seq: i64| {
        Mutation::insert(
            "events",
            cols(&["tenant", "seq"]),
            vec![tenant.into(), seq.into()],
        )
    };
    db.apply(&cx, vec![event("b", 1), event("a", 10), event("a", 2)]).unwrap();
    let rows = db
        .read(&cx, "events", &KeySet::all(), &cols(&["tenant", "seq"]))
        .unwrap();
    let keys: Vec<(Value, Value)> = rows
        .into_iter()
        .map(|mut r| (r.take("tenant"), r.take("seq")))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("a".into(), Value::Int(2)),
            ("a".into(), Value::Int(10)),
            ("b".into(), Value::Int(1)),
        ]
    );
}

#[test]
fn read_keys_skips_missing_rows() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30)]).unwrap();
    let keys = KeySet::keys([Key::from(Value::from("u0")), Key::from(Value::from("u1"))]);
    let rows = SpannerClient::new(Arc::new(db))
        .single()
        .read(&cx, "users", &keys, &cols(&["id"]))
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn read_keys_in_key_order() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30), user("u2", "Bea", 31), user("u3", "Cy", 32)])
        .unwrap();
    let keys = KeySet::keys(
        ["u3", "u1", "u3"]
            .into_iter()
            .map(|id| Key::from(Value::from(id))),
    );
    let ids: Vec<Value> = db
        .read(&cx, "users", &keys, &cols(&["id"]))
        .unwrap()
        .into_iter()
        .map(|mut r| r.take("id"))
        .collect();
    assert_eq!(ids, vec![Value::from("u1"), Value::from("u3")]);
}

#[test]
fn key_columns_follow_the_declared_key() {
    let db = db();
    let cx = Context::background();
    assert_eq!(db.key_columns(&cx, "events").unwrap(), cols(&["tenant", "seq"]));
    assert_eq!(
        db.key_columns(&cx, "ghosts").unwrap_err().code(),
        Code::InvalidArgument
    );
}

#[test]
fn read_row_with_short_key_is_invalid() {
    let db = db();
    let err = db
        .read_row(&Context::background(), "events", &Key::from(Value::from("a")), &cols(&["body"]))
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[test]
fn delete_key_set_and_all() {
    let db = db();
    let cx = Context::background();
    db.apply(&cx, vec![user("u1", "Ann", 30), user("u2", "Bea", 31)]).unwrap();
    db.apply(&cx, vec![Mutation::delete("users", Key::from(Value::from("u1")))])
        .unwrap();
    assert_eq!(db.row_count("users"), 1);
    db.apply(&cx, vec![Mutation::delete("users", Key::from(Value::from("u1")))])
        .unwrap();
    db.apply(&cx, vec![Mutation::delete("users", KeySet::all())]).unwrap();
    assert_eq!(db.row_count("users"), 0);
}

// ── Lifecycle ────────────────────────────────────────────────────

#[test]
fn duplicate_table_is_rejected() {
    let db = db();
    assert_eq!(
        db.create_table("users", &["id"], &["id"]).unwrap_err().code(),
        Code::AlreadyExists
    );
    assert_eq!(
        db.create_table("t", &["id"], &["name"]).unwrap_err().code(),
        Code::InvalidArgument
    );
}

#[test]
fn expired_deadline_and_closed_handle() {
    let db = db();
    let expired = Context::background().with_deadline(Instant::now());
    assert_eq!(
        db.apply(&expired, vec![user("u1", "Ann", 30)]).unwrap_err().code(),
        Code::DeadlineExceeded
    );
    db.close();
    assert_eq!(
        db.apply(&Context::background(), vec![user("u1", "Ann", 30)])
            .unwrap_err()
            .code(),
        Code::FailedPrecondition
    );
}
