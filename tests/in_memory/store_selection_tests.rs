//! Store selection from process configuration.

use crate::test_helpers::EnvVarGuard;
use std::sync::Arc;

use mockable::DefaultClock;
use taskhub::{
    config::{AppConfig, ConfigError},
    task::{adapters::store_from_config, services::TaskRepository},
};

use super::helpers::details;

#[tokio::test(flavor = "multi_thread")]
async fn memory_store_selected_from_environment() {
    let config = {
        let _guard = EnvVarGuard::set_many(&[
            ("TASKS_STORE", Some("memory")),
            ("DATABASE_URL", None),
        ]);
        AppConfig::from_env().expect("configuration should load")
    };
    let store = store_from_config(&config.store).expect("store should build");
    let repository = TaskRepository::new(store, Arc::new(DefaultClock));

    let created = repository
        .create(details("Buy milk"))
        .await
        .expect("create should succeed");

    assert_eq!(
        repository.list_all().await.expect("list should succeed"),
        vec![created]
    );
}

#[test]
fn postgres_store_requires_database_url() {
    let _guard = EnvVarGuard::set_many(&[
        ("TASKS_STORE", Some("postgres")),
        ("DATABASE_URL", None),
    ]);

    let result = AppConfig::from_env();

    assert_eq!(result, Err(ConfigError::MissingVar("DATABASE_URL")));
}
