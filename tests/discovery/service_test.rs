use std::sync::Arc;

use schemalens::config::DbKind;
use schemalens::discovery::{
    Discovery, DiscoveryDefaults, DiscoveryRequest, DiscoveryService, MemoryConnector,
};
use schemalens::export::Exporter;
use schemalens::graph::SchemaGraph;
use schemalens::metadata::{MemoryCatalog, MemoryTable};
use schemalens::store::ProfileStore;

fn service(export_dir: impl Into<std::path::PathBuf>) -> DiscoveryService {
    let catalog = MemoryCatalog::new("shop").with_table(
        MemoryTable::new("orders")
            .column("order_id", "INT")
            .primary_key(["order_id"]),
    );
    let discovery = Discovery::new(
        DiscoveryDefaults {
            mysql_url: Some("mysql://localhost/shop".into()),
            ..Default::default()
        },
        Arc::new(MemoryConnector::new().with_catalog(catalog)),
        Arc::new(ProfileStore::open_in_memory().unwrap()),
    );
    DiscoveryService::new(discovery, Exporter::new(export_dir))
}

#[tokio::test]
async fn test_save_exports_schema() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let response = service
        .run(DbKind::Relational, &DiscoveryRequest::new())
        .await
        .unwrap();

    assert_eq!(response.status, "ok");
    let export_path = response.export_path.clone().unwrap();
    assert!(export_path.starts_with("/exports/mysql_shop_"));
    assert!(export_path.ends_with(".json"));

    let file_name = export_path.trim_start_matches("/exports/");
    let written = std::fs::read_to_string(dir.path().join(file_name)).unwrap();
    let exported: SchemaGraph = serde_json::from_str(&written).unwrap();
    assert_eq!(exported, response.schema);
}

#[tokio::test]
async fn test_no_save_skips_export() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path().join("exports"));

    let response = service
        .run(DbKind::Relational, &DiscoveryRequest::new().save(false))
        .await
        .unwrap();

    assert!(response.export_path.is_none());
    assert!(!dir.path().join("exports").exists());
}

#[tokio::test]
async fn test_response_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let response = service
        .run(DbKind::Relational, &DiscoveryRequest::new().save(false))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["schema"]["db_kind"], "mysql");
    assert_eq!(json["schema"]["nodes"][0]["columns"][0], "order_id (PK) [INT]");
    assert!(json["export_path"].is_null());
}

#[tokio::test]
async fn test_export_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "occupied").unwrap();
    let service = service(&blocker);

    let err = service
        .run(DbKind::Relational, &DiscoveryRequest::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "export");
}
