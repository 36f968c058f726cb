use std::collections::BTreeMap;
use std::time::Instant;

use pretty_assertions::assert_eq;
use tetra_core::{Code, Context, RepositoryError, Status};
use tetra_firestore::{
    Direction, Document, DocumentStore, FirestoreClient, MemoryFirestore, Op, SetOption,
    StructuredQuery,
};
use tetra_types::Value;

fn client() -> (MemoryFirestore, FirestoreClient) {
    let store = MemoryFirestore::new("demo");
    let client = FirestoreClient::new(std::sync::Arc::new(store.clone()));
    (store, client)
}

fn doc(fields: &[(&str, Value)]) -> Document {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn status_of(err: &RepositoryError) -> &Status {
    err.backend_source::<Status>().unwrap()
}

// ── Documents ────────────────────────────────────────────────────

#[test]
fn set_then_get() {
    let (_, client) = client();
    let cx = Context::background();
    let ann = doc(&[("name", "Ann".into()), ("age", 30.into())]);
    client.doc("users/u1").set(&cx, ann.clone()).unwrap();

    let snapshot = client.doc("users/u1").get(&cx).unwrap();
    assert!(snapshot.exists());
    assert_eq!(snapshot.id(), "u1");
    assert_eq!(snapshot.data(), Some(&ann));
    assert!(snapshot.update_time().is_some());
}

#[test]
fn missing_document_is_not_found() {
    let (_, client) = client();
    let err = client.doc("users/ghost").get(&Context::background()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_missing_document_succeeds() {
    let (_, client) = client();
    client.doc("users/ghost").delete(&Context::background()).unwrap();
}

#[test]
fn overwrite_drops_unlisted_fields() {
    let (_, client) = client();
    let cx = Context::background();
    let r = client.doc("users/u1");
    r.set(&cx, doc(&[("name", "Ann".into()), ("age", 30.into())])).unwrap();
    r.set(&cx, doc(&[("name", "Bea".into())])).unwrap();
    assert_eq!(r.get(&cx).unwrap().data(), Some(&doc(&[("name", "Bea".into())])));
}

#[test]
fn merge_all_recurses_into_maps() {
    let (_, client) = client();
    let cx = Context::background();
    let r = client.doc("users/u1");
    let mut address = BTreeMap::new();
    address.insert("street".to_string(), Value::from("Main"));
    address.insert("number".to_string(), Value::Int(7));
    r.set(&cx, doc(&[("name", "Ann".into()), ("address", Value::Map(address))]))
        .unwrap();

    let mut moved = BTreeMap::new();
    moved.insert("number".to_string(), Value::Int(9));
    r.set_with(&cx, doc(&[("address", Value::Map(moved))]), &SetOption::MergeAll)
        .unwrap();

    let data = r.get(&cx).unwrap().data().cloned().unwrap();
    let Value::Map(address) = &data["address"] else {
        panic!("address is not a map");
    };
    assert_eq!(address["street"], Value::from("Main"));
    assert_eq!(address["number"], Value::Int(9));
    assert_eq!(data["name"], Value::from("Ann"));
}

#[test]
fn merge_fields_touches_only_listed_paths() {
    let (_, client) = client();
    let cx = Context::background();
    let r = client.doc("users/u1");
    r.set(&cx, doc(&[("name", "Ann".into()), ("age", 30.into())])).unwrap();
    r.set_with(
        &cx,
        doc(&[("name", "Bea".into()), ("age", 31.into())]),
        &SetOption::Merge(vec!["age".into()]),
    )
    .unwrap();
    assert_eq!(
        r.get(&cx).unwrap().data(),
        Some(&doc(&[("name", "Ann".into()), ("age", 31.into())]))
    );
}

#[test]
fn merge_field_missing_from_data_is_invalid() {
    let (_, client) = client();
    let err = client
        .doc("users/u1")
        .set_with(
            &Context::background(),
            doc(&[("name", "Ann".into())]),
            &SetOption::Merge(vec!["age".into()]),
        )
        .unwrap_err();
    assert_eq!(status_of(&err).code(), Code::InvalidArgument);
}

#[test]
fn malformed_paths_are_invalid() {
    let (_, client) = client();
    let cx = Context::background();
    for path in ["users", "users//u1", "users/u1/posts"] {
        let err = client.doc(path).get(&cx).unwrap_err();
        assert_eq!(status_of(&err).code(), Code::InvalidArgument, "{path}");
    }
}

#[test]
fn subcollections_are_separate() {
    let (_, client) = client();
    let cx = Context::background();
    let user = client.doc("users/u1");
    user.set(&cx, doc(&[("name", "Ann".into())])).unwrap();
    user.collection("posts")
        .doc("p1")
        .set(&cx, doc(&[("title", "Hi".into())]))
        .unwrap();

    assert_eq!(client.collection("users").documents(&cx).unwrap().len(), 1);
    let posts = client.collection("users/u1/posts").documents(&cx).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path(), "users/u1/posts/p1");
    assert_eq!(user.collection("posts").doc("p1").parent().path(), "users/u1/posts");
}

#[test]
fn write_times_increase() {
    let (_, client) = client();
    let cx = Context::background();
    let a = client.doc("users/a").set(&cx, Document::new()).unwrap();
    let b = client.doc("users/b").set(&cx, Document::new()).unwrap();
    assert!(b > a);
}

// ── Batches ──────────────────────────────────────────────────────

#[test]
fn get_all_keeps_request_order() {
    let (_, client) = client();
    let cx = Context::background();
    client.doc("users/b").set(&cx, Document::new()).unwrap();
    let refs = [client.doc("users/a"), client.doc("users/b")];
    let snapshots = client.get_all(&cx, &refs).unwrap();
    assert_eq!(
        snapshots.iter().map(|s| s.exists()).collect::<Vec<_>>(),
        vec![false, true]
    );
}

#[test]
fn batch_commits_all_writes_at_one_time() {
    let (store, client) = client();
    let cx = Context::background();
    client.doc("users/old").set(&cx, Document::new()).unwrap();

    let time = client
        .batch()
        .set(&client.doc("users/a"), doc(&[("n", 1.into())]))
        .set(&client.doc("users/b"), doc(&[("n", 2.into())]))
        .delete(&client.doc("users/old"))
        .commit(&cx)
        .unwrap();

    assert_eq!(store.document_count(), 2);
    let a = client.doc("users/a").get(&cx).unwrap();
    assert_eq!(a.update_time(), Some(time));
}

#[test]
fn invalid_write_aborts_the_whole_batch() {
    let (store, client) = client();
    let err = client
        .batch()
        .set(&client.doc("users/a"), Document::new())
        .set(&client.doc("users"), Document::new())
        .commit(&Context::background())
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Backend { .. }));
    assert_eq!(store.document_count(), 0);
}

#[test]
fn empty_batch_is_rejected() {
    let (_, client) = client();
    let batch = client.batch();
    assert!(batch.is_empty());
    assert!(matches!(
        batch.commit(&Context::background()),
        Err(RepositoryError::InvalidStatement(_))
    ));
}

// ── Queries ──────────────────────────────────────────────────────

fn seeded() -> FirestoreClient {
    let (_, client) = client();
    let cx = Context::background();
    for (id, age, tags) in [("a", 30, vec!["x"]), ("b", 25, vec!["y"]), ("c", 41, vec!["x", "y"])] {
        client
            .doc(format!("users/{id}"))
            .set(&cx, doc(&[("age", age.into()), ("tags", tags.into())]))
            .unwrap();
    }
    client
        .doc("users/d")
        .set(&cx, doc(&[("name", "no age".into())]))
        .unwrap();
    client
}

fn ids(snapshots: &[tetra_firestore::Snapshot]) -> Vec<&str> {
    snapshots.iter().map(|s| s.id()).collect()
}

#[test]
fn where_and_order() {
    let client = seeded();
    let found = client
        .collection("users")
        .where_field("age", Op::Ge, 30)
        .order_by("age", Direction::Desc)
        .documents(&Context::background())
        .unwrap();
    assert_eq!(ids(&found), vec!["c", "a"]);
}

#[test]
fn order_by_skips_documents_without_the_field() {
    let client = seeded();
    let found = client
        .collection("users")
        .order_by("age", Direction::Asc)
        .documents(&Context::background())
        .unwrap();
    assert_eq!(ids(&found), vec!["b", "a", "c"]);
}

#[test]
fn array_contains_and_in() {
    let client = seeded();
    let cx = Context::background();
    let users = client.collection("users");
    let tagged = users.where_field("tags", Op::ArrayContains, "y").documents(&cx).unwrap();
    assert_eq!(ids(&tagged), vec!["b", "c"]);
    let picked = users
        .where_field("age", Op::In, vec![25, 41])
        .documents(&cx)
        .unwrap();
    assert_eq!(ids(&picked), vec!["b", "c"]);
}

#[test]
fn in_without_list_is_invalid() {
    let client = seeded();
    let err = client
        .collection("users")
        .where_field("age", Op::In, 25)
        .documents(&Context::background())
        .unwrap_err();
    assert_eq!(status_of(&err).code(), Code::InvalidArgument);
}

#[test]
fn offset_and_limit_page_results() {
    let client = seeded();
    let page = client
        .collection("users")
        .order_by("age", Direction::Asc)
        .offset(1)
        .limit(1)
        .documents(&Context::background())
        .unwrap();
    assert_eq!(ids(&page), vec!["a"]);
}

#[test]
fn operators_parse_from_text() {
    assert_eq!("array-contains".parse::<Op>().unwrap(), Op::ArrayContains);
    assert_eq!(Op::Le.to_string(), "<=");
    assert!("~".parse::<Op>().is_err());
}

// ── Lifecycle ────────────────────────────────────────────────────

#[test]
fn expired_deadline_is_deadline_exceeded() {
    let (store, _) = client();
    let cx = Context::background().with_deadline(Instant::now());
    let err = store.get(&cx, "users/u1").unwrap_err();
    assert_eq!(err.code(), Code::DeadlineExceeded);
}

#[test]
fn closed_store_cancels_calls() {
    let (store, client) = client();
    store.close().unwrap();
    assert!(store.is_closed());
    let err = client.doc("users/u1").get(&Context::background()).unwrap_err();
    assert_eq!(status_of(&err).code(), Code::Cancelled);
}

#[test]
fn raw_query_on_document_path_is_invalid() {
    let (store, _) = client();
    let query = StructuredQuery {
        collection: "users/u1".into(),
        ..StructuredQuery::default()
    };
    assert_eq!(
        store.run_query(&Context::background(), &query).unwrap_err().code(),
        Code::InvalidArgument
    );
}
