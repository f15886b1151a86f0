//! Connection manager against the embedded engine.

use charter_core::models::yacht::CreateYacht;
use charter_core::repository::YachtRepository;
use charter_db::repository::SurrealYachtRepository;
use charter_db::{DbConfig, DbManager};

#[tokio::test]
async fn in_memory_connection_is_ready_for_repositories() {
    let manager = DbManager::connect(&DbConfig::in_memory()).await.unwrap();
    charter_db::run_migrations(manager.client()).await.unwrap();

    let yachts = SurrealYachtRepository::new(manager.client().clone());
    let yacht = yachts
        .create(CreateYacht {
            name: "Morning Star".into(),
            hourly_price: 90_000,
        })
        .await
        .unwrap();
    assert_eq!(yachts.get_by_id(yacht.id).await.unwrap().name, "Morning Star");
}

#[test]
fn default_config_targets_a_local_server() {
    let config = DbConfig::default();
    assert!(config.url.starts_with("ws://"));
    assert_eq!(config.namespace, "charter");
    assert!(config.username.is_some());
}
