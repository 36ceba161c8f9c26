//! Config save/load roundtrip and the config subcommands.

use clap::Parser;
use ragmind_cli::{run, Cli};
use ragmind_core::config::{Config, IndexProvider};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragmind.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.index.memory_namespace, "memory_store");
    assert_eq!(loaded.index.profile_namespace, "user_profiles");
    assert_eq!(loaded.memory.short_term_limit, config.memory.short_term_limit);
    assert_eq!(loaded.memory.max_facts, config.memory.max_facts);
    assert_eq!(loaded.embeddings.dimension, config.embeddings.dimension);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragmind.json5");

    let mut config = Config::default();
    config.index.provider = IndexProvider::Pinecone;
    config.index.host = Some("memories-abc123.svc.pinecone.io".to_string());
    config.memory.score_threshold = 0.5;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.index.provider, IndexProvider::Pinecone);
    assert_eq!(loaded.index.host.as_deref(), Some("memories-abc123.svc.pinecone.io"));
    assert_eq!(loaded.memory.score_threshold, 0.5);
}

#[test]
fn test_config_load_nonexistent() {
    assert!(Config::load(Path::new("/nonexistent/ragmind.json5")).is_err());
}

#[test]
fn test_config_parse_json5_with_comments() {
    let config = Config::parse(
        r#"{
            // local file index, smaller vectors
            index: { provider: "file" },
            embeddings: { dimension: 256 },
        }"#,
    )
    .unwrap();
    assert_eq!(config.index.provider, IndexProvider::File);
    assert_eq!(config.embeddings.dimension, 256);
    assert_eq!(config.memory.retrieval_limit, 5);
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}

#[tokio::test]
async fn test_config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragmind.json5");
    let path_arg = path.to_str().unwrap();

    run(Cli::try_parse_from(["ragmind", "--config", path_arg, "config", "init"]).unwrap())
        .await
        .unwrap();
    assert!(path.exists());

    run(Cli::try_parse_from(["ragmind", "--config", path_arg, "config", "validate"]).unwrap())
        .await
        .unwrap();

    let again = run(Cli::try_parse_from(["ragmind", "--config", path_arg, "config", "init"]).unwrap()).await;
    assert!(again.is_err());
}

#[tokio::test]
async fn test_config_validate_reports_bad_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragmind.json5");
    std::fs::write(&path, r#"{ embeddings: { dimension: 0 } }"#).unwrap();

    let result = run(
        Cli::try_parse_from(["ragmind", "--config", path.to_str().unwrap(), "config", "validate"]).unwrap(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_config_validate_rejects_fact_cap_above_fetch_limit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragmind.json5");
    std::fs::write(&path, r#"{ memory: { max_facts: 10, consolidation_fetch_limit: 3 } }"#).unwrap();

    let result = run(
        Cli::try_parse_from(["ragmind", "--config", path.to_str().unwrap(), "config", "validate"]).unwrap(),
    )
    .await;
    assert!(result.is_err());
}
