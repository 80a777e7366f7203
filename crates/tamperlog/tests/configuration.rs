//! Configuration loading end to end.
//!
//! Environment variables are process-wide, so every test here uses its own
//! prefix.

use std::fs;

use tamperlog::{Chain, ConfigLoader, Environment, Payload, DEVELOPMENT_SALT};

#[test]
fn environment_overrides_project_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tamperlog.toml"),
        r#"
salt = "file-salt"

[database]
table = "from_file"
"#,
    )
    .unwrap();

    std::env::set_var("TLCFGA_ENVIRONMENT", "production");
    std::env::set_var("TLCFGA_DATABASE__TABLE", "from_env");

    let config = ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_env_prefix("TLCFGA")
        .load()
        .unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.database.table, "from_env");
    assert!(config.salt().unwrap().matches("file-salt"));
}

#[tokio::test]
async fn configured_chain_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tamperlog.toml"),
        r#"
environment = "production"
salt = "deploy-salt"

[database]
path = "chain.db"
table = "messages"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_env_prefix("TLCFGB")
        .load()
        .unwrap();

    {
        let chain = Chain::open_sqlite(&config).await.unwrap();
        chain.append(Payload::message("A")).await.unwrap();
        assert_eq!(chain.store().table(), "messages");
    }

    assert!(dir.path().join("chain.db").exists());
    let chain = Chain::open_sqlite(&config).await.unwrap();
    assert_eq!(chain.validate().await.unwrap().records, 1);
}

#[tokio::test]
async fn changing_salt_compromises_existing_chain() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tamperlog.toml"),
        "[database]\npath = \"chain.db\"\n",
    )
    .unwrap();

    let dev = ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_env_prefix("TLCFGC")
        .load()
        .unwrap();
    assert!(dev.salt().unwrap().matches(DEVELOPMENT_SALT));

    let chain = Chain::open_sqlite(&dev).await.unwrap();
    chain.append(Payload::message("A")).await.unwrap();
    drop(chain);

    let mut rotated = dev.clone();
    rotated.salt = Some("rotated".to_string());
    let chain = Chain::open_sqlite(&rotated).await.unwrap();
    assert!(!chain.status().await.unwrap().is_intact());
}
