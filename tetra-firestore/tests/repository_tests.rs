use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tetra_core::{
    Client, ClientPool, Code, Context, Persistence, Repository, RepositoryError, Status,
};
use tetra_firestore::{
    FirestoreClient, FirestoreConfig, FirestorePool, FirestoreRepository, MemoryFirestore,
    SetOption,
};
use tetra_model::entity;
use tetra_types::{EntityKey, Value};

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
    street: String,
    number: i32,
}

entity!(Address { street: String, number: i32 });

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: String,
    name: String,
    age: i32,
    created_at: DateTime<Utc>,
    tags: Vec<String>,
    address: Option<Address>,
    scores: BTreeMap<String, i64>,
}

entity!(User {
    id: String,
    name as "displayName": String,
    age: i32,
    created_at as "createdAt": DateTime<Utc>,
    tags: Vec<String>,
    address: Option<Address>,
    scores: BTreeMap<String, i64>,
});

fn ann() -> User {
    let mut scores = BTreeMap::new();
    scores.insert("math".to_string(), 90);
    User {
        id: "u1".into(),
        name: "Ann".into(),
        age: 30,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        tags: vec!["admin".into()],
        address: Some(Address {
            street: "Main".into(),
            number: 7,
        }),
        scores,
    }
}

fn key(id: &str) -> EntityKey {
    EntityKey::new("users", "id", id)
}

fn setup() -> (MemoryFirestore, Arc<FirestoreClient>) {
    let store = MemoryFirestore::new("demo");
    let client = Arc::new(FirestoreClient::new(Arc::new(store.clone())));
    (store, client)
}

fn config() -> FirestoreConfig {
    FirestoreConfig {
        project_id: "demo".into(),
        ..FirestoreConfig::default()
    }
}

// ── CRUD ─────────────────────────────────────────────────────────

#[test]
fn set_then_get_preserves_every_field() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    let cx = Context::background();
    repo.set(&cx, &key("u1"), &ann()).unwrap();
    assert_eq!(repo.get(&cx, &key("u1")).unwrap(), ann());
}

#[test]
fn document_lives_at_entity_name_and_value() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(Arc::clone(&client));
    let cx = Context::background();
    repo.set(&cx, &key("u1"), &ann()).unwrap();

    let snapshot = client.doc("users/u1").get(&cx).unwrap();
    let data = snapshot.data().unwrap();
    assert_eq!(data["displayName"], Value::from("Ann"));
    assert!(data.contains_key("createdAt"));
}

#[test]
fn integer_and_uuid_keys_render_as_ids() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(Arc::clone(&client));
    let cx = Context::background();
    repo.set(&cx, &EntityKey::new("users", "id", 42), &ann()).unwrap();
    assert!(client.doc("users/42").get(&cx).is_ok());
}

#[test]
fn get_missing_is_not_found() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    assert!(repo
        .get(&Context::background(), &key("ghost"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn delete_then_get_is_not_found() {
    let (store, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    let cx = Context::background();
    repo.set(&cx, &key("u1"), &ann()).unwrap();
    repo.delete(&cx, &key("u1")).unwrap();
    assert!(repo.get(&cx, &key("u1")).unwrap_err().is_not_found());
    assert_eq!(store.document_count(), 0);
}

#[test]
fn slash_in_key_value_is_invalid_key() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    let err = repo
        .get(&Context::background(), &key("a/b"))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidKey(_)));
}

// ── Set options ──────────────────────────────────────────────────

#[test]
fn set_replaces_the_whole_document() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(Arc::clone(&client));
    let cx = Context::background();
    let mut extra = tetra_firestore::Document::new();
    extra.insert("legacy".into(), Value::Bool(true));
    client.doc("users/u1").set(&cx, extra).unwrap();

    repo.set(&cx, &key("u1"), &ann()).unwrap();
    let data = client.doc("users/u1").get(&cx).unwrap().data().cloned().unwrap();
    assert!(!data.contains_key("legacy"));
}

#[test]
fn merge_option_keeps_other_fields() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> =
        FirestoreRepository::new(Arc::clone(&client)).with_set_option(SetOption::MergeAll);
    let cx = Context::background();
    let mut extra = tetra_firestore::Document::new();
    extra.insert("legacy".into(), Value::Bool(true));
    client.doc("users/u1").set(&cx, extra).unwrap();

    repo.set(&cx, &key("u1"), &ann()).unwrap();
    let data = client.doc("users/u1").get(&cx).unwrap().data().cloned().unwrap();
    assert_eq!(data["legacy"], Value::Bool(true));
    assert_eq!(repo.get(&cx, &key("u1")).unwrap(), ann());
}

#[test]
fn caller_supplied_merge_fields() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    let cx = Context::background();
    repo.set(&cx, &key("u1"), &ann()).unwrap();

    let older = User { age: 31, name: "Changed".into(), ..ann() };
    let first = repo
        .set_with_option(&cx, &key("u1"), &older, &SetOption::Merge(vec!["age".into()]))
        .unwrap();
    let got = repo.get(&cx, &key("u1")).unwrap();
    assert_eq!(got.age, 31);
    assert_eq!(got.name, "Ann");

    let second = repo
        .set_with_option(&cx, &key("u1"), &older, &SetOption::Overwrite)
        .unwrap();
    assert!(second > first);
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn deadline_reaches_the_store() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
    let cx = Context::background().with_deadline(Instant::now());
    let err = repo.set(&cx, &key("u1"), &ann()).unwrap_err();
    let status = err.backend_source::<Status>().unwrap();
    assert_eq!(status.code(), Code::DeadlineExceeded);
}

#[test]
fn undecodable_document_is_a_mapping_error() {
    let (_, client) = setup();
    let repo: FirestoreRepository<User> = FirestoreRepository::new(Arc::clone(&client));
    let cx = Context::background();
    let mut bad = tetra_firestore::Document::new();
    bad.insert("age".into(), Value::from("thirty"));
    client.doc("users/u1").set(&cx, bad).unwrap();
    assert!(matches!(
        repo.get(&cx, &key("u1")),
        Err(RepositoryError::Mapping(_))
    ));
}

// ── Pool and scoped clients ──────────────────────────────────────

#[test]
fn setup_for_unknown_project_is_connect_error() {
    let store = MemoryFirestore::new("demo");
    let config = FirestoreConfig {
        project_id: "other".into(),
        ..config()
    };
    assert!(matches!(
        FirestorePool::setup(config, &store),
        Err(RepositoryError::Connect(_))
    ));
    assert!(matches!(
        FirestorePool::setup(FirestoreConfig::default(), &store),
        Err(RepositoryError::Connect(_))
    ));
}

#[test]
fn pool_clients_share_the_store() {
    let store = MemoryFirestore::new("demo");
    let pool = FirestorePool::setup(config(), &store).unwrap();
    let a = pool.get().unwrap();
    let b = pool.get().unwrap();
    assert!(Arc::ptr_eq(a.store(), b.store()));
    a.close().unwrap();
    assert!(!pool.is_closed());
}

#[test]
fn closed_pool_refuses_clients() {
    let store = MemoryFirestore::new("demo");
    let pool = FirestorePool::setup(config(), &store).unwrap();
    pool.close().unwrap();
    assert!(matches!(pool.get(), Err(RepositoryError::InvalidState(_))));
}

#[test]
fn scoped_repository_in_unit_of_work() {
    let store = MemoryFirestore::new("demo");
    let persistence = Persistence::new();
    persistence
        .setup(Arc::new(FirestorePool::setup(config(), &store).unwrap()))
        .unwrap();

    let repo: FirestoreRepository<User> = FirestoreRepository::scoped();
    persistence.execute(|cx| repo.set(cx, &key("u1"), &ann())).unwrap();
    let got = persistence.execute(|cx| repo.get(cx, &key("u1"))).unwrap();
    assert_eq!(got, ann());
    persistence.execute(|cx| repo.close(cx)).unwrap();
    assert!(persistence.client().is_ok());
}

#[test]
fn registry_slot_configured_as_empty() {
    let mut roots = tetra_registry::Roots::default();
    tetra_firestore::register(&mut roots, None);
    let tree = roots.new_tree_default();
    assert!(tetra_firestore::reference(&tree).unwrap().is_none());

    let repo: FirestoreRepository<User> = FirestoreRepository::scoped();
    let err = repo.get(&Context::new(tree), &key("u1")).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidState(_)));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_property(
        id in "[a-zA-Z0-9_-]{1,16}",
        name in ".{0,24}",
        age in any::<i32>(),
        scores in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..4),
    ) {
        let (_, client) = setup();
        let repo: FirestoreRepository<User> = FirestoreRepository::new(client);
        let cx = Context::background();
        let user = User { id: id.clone(), name, age, scores, ..ann() };
        repo.set(&cx, &key(&id), &user).unwrap();
        prop_assert_eq!(repo.get(&cx, &key(&id)).unwrap(), user);
    }
}
