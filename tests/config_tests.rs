use std::fs;
use std::time::Duration;

use validocu_engine::{load_config, ConfigError, EngineConfig, OverflowPolicy};

#[test]
fn empty_file_gives_defaults() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("engine.yaml");
    fs::write(&path, "").unwrap();
    let cfg = load_config(&path).expect("config");
    assert_eq!(cfg.aliases.ttl(), Duration::from_secs(300));
    assert!(cfg.aliases.path.is_none());
    assert_eq!(cfg.normalizer.overflow, OverflowPolicy::Discard);
    assert_eq!(cfg.scoring.identity_fields, EngineConfig::default().scoring.identity_fields);
    assert!(cfg.scoring.identity_fields.iter().any(|f| f == "RUT_DEUDOR"));
}

#[test]
fn relative_paths_resolve_against_config_dir() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("engine.yaml");
    fs::write(
        &path,
        r#"
aliases:
  path: catalogs/aliases.yaml
  ttl_secs: 30
specs:
  path: /etc/validocu/specs.yaml
documents:
  path: catalogs/documents.yaml
normalizer:
  overflow: indexed
scoring:
  identity_fields: [issuer_id, RUT_AVAL]
"#,
    )
    .unwrap();
    let cfg = load_config(&path).expect("config");
    assert_eq!(cfg.aliases.path, Some(td.path().join("catalogs/aliases.yaml")));
    assert_eq!(cfg.aliases.ttl(), Duration::from_secs(30));
    assert_eq!(cfg.specs.path.as_deref(), Some(std::path::Path::new("/etc/validocu/specs.yaml")));
    assert_eq!(cfg.documents.path, Some(td.path().join("catalogs/documents.yaml")));
    assert_eq!(cfg.normalizer.overflow, OverflowPolicy::Indexed);
    assert_eq!(cfg.scoring.identity_fields, vec!["issuer_id".to_string(), "RUT_AVAL".to_string()]);
}

#[test]
fn errors_are_classified() {
    let td = tempfile::tempdir().unwrap();

    let missing = load_config(&td.path().join("nope.yaml")).err().expect("read error");
    assert!(matches!(missing, ConfigError::Read(_)));

    let bad = td.path().join("bad.yaml");
    fs::write(&bad, "aliases: [unclosed").unwrap();
    assert!(matches!(load_config(&bad), Err(ConfigError::Parse(_))));

    let wrong_policy = td.path().join("policy.yaml");
    fs::write(&wrong_policy, "normalizer:\n  overflow: sometimes\n").unwrap();
    assert!(matches!(load_config(&wrong_policy), Err(ConfigError::Parse(_))));

    let blank_identity = td.path().join("identity.yaml");
    fs::write(&blank_identity, "scoring:\n  identity_fields: [issuer_id, \"  \"]\n").unwrap();
    assert!(matches!(load_config(&blank_identity), Err(ConfigError::Invalid(_))));

    let blank_path = td.path().join("path.yaml");
    fs::write(&blank_path, "specs:\n  path: \"\"\n").unwrap();
    assert!(matches!(load_config(&blank_path), Err(ConfigError::Invalid(_))));
}
