//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use bloodbank::db::factory::{RepositoryFactory, RepositoryType};
use bloodbank::db::repo_config::{RepositoryConfig, CONFIG_PATH_ENV};
use bloodbank::db::repository::InventoryRepository;
use bloodbank::db::RepositoryError;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(f)
}

fn local_config_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();
    file
}

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("postgresql").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("MEMORY").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("invalid").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/bloodbank")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_from_env_explicit_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/bloodbank")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_invalid_falls_back() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("mongo"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_from_env_builds_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let repo = block_on(RepositoryFactory::from_env()).unwrap();
            assert!(block_on(repo.health_check()).unwrap());
        },
    );
}

#[tokio::test]
async fn test_from_config_file_local() {
    let file = local_config_file();
    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_default_location_follows_env_override() {
    let file = local_config_file();
    let path = file.path().to_string_lossy().to_string();

    support::with_scoped_env(&[(CONFIG_PATH_ENV, Some(path.as_str()))], || {
        assert_eq!(RepositoryConfig::locate().unwrap(), file.path());
        let repo = block_on(RepositoryFactory::from_default_config_or_env()).unwrap();
        assert!(block_on(repo.list_inventory(&Default::default()))
            .unwrap()
            .is_empty());
    });
}

#[test]
fn test_missing_explicit_config_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("repository.toml");
    let path = missing.to_string_lossy().to_string();

    support::with_scoped_env(&[(CONFIG_PATH_ENV, Some(path.as_str()))], || {
        let err = block_on(RepositoryFactory::from_default_config_or_env())
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    });
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_postgres_config_without_feature() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[repository]\ntype = \"postgres\"\n\n[postgres]\ndatabase_url = \"postgres://localhost/bloodbank\""
    )
    .unwrap();

    let err = RepositoryFactory::from_config_file(file.path())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("not enabled"));
}
