use std::io::Write;

use pretty_assertions::assert_eq;
use serde::Deserialize;
use tetra_core::config::{ConfigError, Configuration, Provider, from_json_str, load_json};

#[test]
fn provider_from_str() {
    assert_eq!("cassandra".parse::<Provider>().unwrap(), Provider::Cassandra);
    assert_eq!("CQL".parse::<Provider>().unwrap(), Provider::Cassandra);
    assert_eq!(" Spanner ".parse::<Provider>().unwrap(), Provider::Spanner);
    assert!(matches!(
        "mongo".parse::<Provider>(),
        Err(ConfigError::UnknownProvider(_))
    ));
}

#[test]
fn provider_display_roundtrip() {
    for p in [Provider::Cassandra, Provider::Firestore, Provider::Spanner, Provider::Sql] {
        assert_eq!(p.to_string().parse::<Provider>().unwrap(), p);
    }
}

#[test]
fn configuration_defaults() {
    let config: Configuration = from_json_str("{}").unwrap();
    assert_eq!(config.provider, Provider::Sql);
    assert_eq!(config.to_string(), "persistence.Configuration provider=sql");
}

#[test]
fn configuration_from_json() {
    let config: Configuration = from_json_str(r#"{"provider":"firestore"}"#).unwrap();
    assert_eq!(config.provider, Provider::Firestore);
}

#[test]
fn load_json_from_file() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Custom {
        hosts: Vec<String>,
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"hosts":["10.0.0.1","10.0.0.2"]}}"#).unwrap();
    let custom: Custom = load_json(file.path()).unwrap();
    assert_eq!(custom.hosts, vec!["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn load_json_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result: Result<Configuration, _> = load_json(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn load_json_bad_syntax() {
    assert!(matches!(
        from_json_str::<Configuration>("{provider"),
        Err(ConfigError::Parse(_))
    ));
}
