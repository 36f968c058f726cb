use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use tetra_registry::{Path, RegistryError, Roots, Token, Tree};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

#[derive(Debug, PartialEq)]
struct Counter(u32);

const GREETER: Token<dyn Greeter> = Token::new("/test/greeter");
const COUNTER: Token<Counter> = Token::new("/test/counter");

// ── Lookup outcomes ──────────────────────────────────────────────

#[test]
fn unregistered_path_is_not_found() {
    let tree = Roots::new().new_tree_default();
    assert_eq!(
        tree.reference(&COUNTER).unwrap_err(),
        RegistryError::PathNotFound(Path::new("/test/counter"))
    );
}

#[test]
fn empty_binding_returns_none() {
    let mut roots = Roots::new();
    roots.register(&COUNTER, None);
    let tree = roots.new_tree_default();
    assert!(tree.reference(&COUNTER).unwrap().is_none());
}

#[test]
fn trait_object_binding_resolves() {
    let mut roots = Roots::new();
    roots.register(&GREETER, Some(Arc::new(English) as Arc<dyn Greeter>));
    let tree = roots.new_tree_default();
    let greeter = tree.reference(&GREETER).unwrap().unwrap();
    assert_eq!(greeter.greet(), "hello");
}

#[test]
fn mismatched_type_is_invalid_reference() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(1));
    let tree = roots.new_tree_default();

    let wrong: Token<String> = Token::new("/test/counter");
    match tree.reference(&wrong) {
        Err(RegistryError::InvalidReference { path, expected, found }) => {
            assert_eq!(path.as_str(), "/test/counter");
            assert!(expected.contains("String"));
            assert!(found.contains("Counter"));
        }
        other => panic!("expected invalid reference, got {other:?}"),
    }
}

#[test]
fn invalid_reference_differs_from_not_found() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(1));
    let tree = roots.new_tree_default();
    let wrong: Token<u64> = Token::new("/test/counter");
    assert!(!matches!(
        tree.reference(&wrong),
        Err(RegistryError::PathNotFound(_))
    ));
}

// ── Root semantics ───────────────────────────────────────────────

#[test]
fn last_registration_wins() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(1));
    roots.register_value(&COUNTER, Counter(2));
    assert_eq!(roots.len(), 1);
    let tree = roots.new_tree_default();
    assert_eq!(*tree.reference(&COUNTER).unwrap().unwrap(), Counter(2));
}

#[test]
fn tree_is_isolated_from_later_registrations() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(1));
    let tree = roots.new_tree_default();
    roots.register_value(&COUNTER, Counter(9));
    roots.register(&GREETER, None);

    assert_eq!(*tree.reference(&COUNTER).unwrap().unwrap(), Counter(1));
    assert!(!tree.contains(GREETER.path()));
    assert_eq!(roots.len(), 2);
}

#[test]
fn tree_shares_values_with_roots() {
    let shared = Arc::new(Counter(5));
    let mut roots = Roots::new();
    roots.register(&COUNTER, Some(Arc::clone(&shared)));
    let tree = roots.new_tree_default();
    let got = tree.reference(&COUNTER).unwrap().unwrap();
    assert!(Arc::ptr_eq(&got, &shared));
}

#[test]
fn tree_lists_paths_sorted() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(0));
    roots.register(&GREETER, None);
    let tree = roots.new_tree_default();
    assert_eq!(
        tree.paths(),
        vec![Path::new("/test/counter"), Path::new("/test/greeter")]
    );
    assert_eq!(tree.len(), 2);
}

#[test]
fn default_tree_is_empty() {
    let tree = Tree::default();
    assert!(tree.is_empty());
    assert!(tree.reference(&COUNTER).is_err());
}

#[test]
fn runtime_path_tokens() {
    let token: Token<Counter> = Token::with_path(format!("/dyn/{}", 7));
    let mut roots = Roots::new();
    roots.register_value(&token, Counter(7));
    let tree = roots.new_tree_default();
    assert!(tree.contains(&Path::from("/dyn/7".to_string())));
}

// ── Must variants ────────────────────────────────────────────────

#[test]
fn must_reference_returns_value() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(3));
    let tree = roots.new_tree_default();
    assert_eq!(*tree.must_reference(&COUNTER).unwrap(), Counter(3));
}

#[test]
#[should_panic(expected = "path not found")]
fn must_reference_panics_on_missing_path() {
    let _ = Tree::default().must_reference(&COUNTER);
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn tree_reads_across_threads() {
    let mut roots = Roots::new();
    roots.register_value(&COUNTER, Counter(11));
    let tree = roots.new_tree_default();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tree = tree.clone();
            thread::spawn(move || tree.reference(&COUNTER).unwrap().map(|c| c.0))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(11));
    }
}
