use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use schemalens::config::DbKind;
use schemalens::discovery::{
    Discovery, DiscoveryDefaults, DiscoveryError, DiscoveryRequest, MemoryConnector,
};
use schemalens::graph::Edge;
use schemalens::metadata::{
    doc, CatalogError, Document, MemoryCatalog, MemoryDocumentStore, MemoryTable,
};
use schemalens::store::{NewProfile, ProfileStore};

fn shop() -> MemoryCatalog {
    MemoryCatalog::new("shop")
        .with_table(
            MemoryTable::new("customers")
                .column("customer_id", "INT")
                .primary_key(["customer_id"]),
        )
        .with_table(
            MemoryTable::new("orders")
                .column("order_id", "INT")
                .column("customer_id", "INT")
                .primary_key(["order_id"])
                .foreign_key(["customer_id"], "customers"),
        )
}

fn blog() -> MemoryDocumentStore {
    let posts: Vec<Document> = (0..4)
        .map(|_| doc! { "_id": ObjectId::new(), "author_id": ObjectId::new() })
        .collect();
    MemoryDocumentStore::new("blog").with_collection("posts", posts)
}

fn profiles() -> Arc<ProfileStore> {
    Arc::new(ProfileStore::open_in_memory().unwrap())
}

fn save_profile(store: &ProfileStore, kind: DbKind, url: &str) -> i64 {
    store
        .create(NewProfile {
            name: "saved".into(),
            db_kind: kind,
            connection_string: url.into(),
        })
        .unwrap()
        .id
}

fn discovery(connector: &MemoryConnector, profiles: Arc<ProfileStore>) -> Discovery {
    Discovery::new(
        DiscoveryDefaults::default(),
        Arc::new(connector.clone()),
        profiles,
    )
}

#[tokio::test]
async fn test_relational_discovery() {
    let catalog = shop();
    let connector = MemoryConnector::new().with_catalog(catalog.clone());
    let d = discovery(&connector, profiles());

    let request = DiscoveryRequest::new().connection_string("mysql+pymysql://root:pw@db/shop");
    let graph = d.discover(DbKind::Relational, &request).await.unwrap();

    assert_eq!(graph.database, "shop");
    assert_eq!(graph.db_kind, DbKind::Relational);
    assert_eq!(graph.edges, vec![Edge::new("orders", "customers")]);
    assert_eq!(connector.attempts(), vec!["mysql://root:***@db/shop"]);
    assert!(catalog.is_closed());
}

#[tokio::test]
async fn test_document_discovery() {
    let store = blog();
    let connector = MemoryConnector::new().with_store(store.clone());
    let d = discovery(&connector, profiles());

    let request = DiscoveryRequest::new()
        .connection_string("mongodb://localhost:27017")
        .database("blog");
    let graph = d.discover(DbKind::Document, &request).await.unwrap();

    assert_eq!(graph.db_kind, DbKind::Document);
    assert_eq!(graph.node("posts").unwrap().sample_count, Some(4));
    assert_eq!(graph.edges, vec![Edge::new("posts", "author")]);
    assert_eq!(graph.dangling_edges().count(), 1);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_profile_kind_mismatch_never_connects() {
    let catalog = shop();
    let connector = MemoryConnector::new().with_catalog(catalog.clone());
    let store = profiles();
    let id = save_profile(&store, DbKind::Document, "mongodb://localhost:27017");
    let d = discovery(&connector, store);

    let request = DiscoveryRequest::new().profile(id);
    let err = d.discover(DbKind::Relational, &request).await.unwrap_err();

    assert_eq!(
        err,
        DiscoveryError::KindMismatch {
            profile_id: id,
            expected: DbKind::Relational,
            actual: DbKind::Document,
        }
    );
    assert!(connector.attempts().is_empty());
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn test_profile_overrides_inline_connection() {
    let connector = MemoryConnector::new().with_catalog(shop());
    let store = profiles();
    let id = save_profile(&store, DbKind::Relational, "mysql://saved-host/shop");
    let d = discovery(&connector, store);

    let request = DiscoveryRequest::new()
        .profile(id)
        .connection_string("mysql://inline-host/shop");
    d.discover(DbKind::Relational, &request).await.unwrap();

    assert_eq!(connector.attempts(), vec!["mysql://saved-host/shop"]);
}

#[tokio::test]
async fn test_unknown_profile() {
    let connector = MemoryConnector::new().with_catalog(shop());
    let d = discovery(&connector, profiles());

    let err = d
        .discover(DbKind::Relational, &DiscoveryRequest::new().profile(42))
        .await
        .unwrap_err();

    assert_eq!(err, DiscoveryError::ProfileNotFound(42));
    assert!(connector.attempts().is_empty());
}

#[tokio::test]
async fn test_configured_default_connection() {
    let connector = MemoryConnector::new().with_store(blog());
    let defaults = DiscoveryDefaults {
        mongo_uri: Some("mongodb://default-host".into()),
        ..Default::default()
    };
    let d = Discovery::new(defaults, Arc::new(connector.clone()), profiles());

    let graph = d
        .discover(DbKind::Document, &DiscoveryRequest::new().database("blog"))
        .await
        .unwrap();

    assert_eq!(graph.database, "blog");
    assert_eq!(connector.attempts(), vec!["mongodb://default-host"]);
}

#[tokio::test]
async fn test_missing_connection_string() {
    let connector = MemoryConnector::new();
    let d = discovery(&connector, profiles());

    let err = d
        .discover(DbKind::Relational, &DiscoveryRequest::new())
        .await
        .unwrap_err();

    assert_eq!(err, DiscoveryError::MissingConnectionString(DbKind::Relational));
}

#[tokio::test]
async fn test_document_discovery_requires_database_name() {
    let connector = MemoryConnector::new().with_store(blog());
    let d = discovery(&connector, profiles());

    let request = DiscoveryRequest::new()
        .connection_string("mongodb://localhost")
        .database("   ");
    let err = d.discover(DbKind::Document, &request).await.unwrap_err();

    assert_eq!(err, DiscoveryError::MissingDatabaseName(DbKind::Document));
    assert!(connector.attempts().is_empty());
}

#[tokio::test]
async fn test_malformed_connection_strings() {
    let connector = MemoryConnector::new().with_catalog(shop()).with_store(blog());
    let d = discovery(&connector, profiles());

    let err = d
        .discover(
            DbKind::Relational,
            &DiscoveryRequest::new().connection_string("localhost:3306/shop"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "connection_format");

    let err = d
        .discover(
            DbKind::Document,
            &DiscoveryRequest::new()
                .connection_string("mysql://localhost/blog")
                .database("blog"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "connection_format");
    assert!(connector.attempts().is_empty());
}

#[tokio::test]
async fn test_unreachable_server() {
    let connector = MemoryConnector::new()
        .with_catalog(shop())
        .refusing(CatalogError::ConnectionFailed("connection refused".into()));
    let d = discovery(&connector, profiles());

    let err = d
        .discover(
            DbKind::Relational,
            &DiscoveryRequest::new().connection_string("mysql://db/shop"),
        )
        .await
        .unwrap_err();

    assert_eq!(err, DiscoveryError::Connection("connection refused".into()));
}

#[tokio::test]
async fn test_sample_cap_zero_uses_default() {
    let posts: Vec<Document> = (0..250).map(|i| doc! { "n": i }).collect();
    let connector = MemoryConnector::new()
        .with_store(MemoryDocumentStore::new("metrics").with_collection("points", posts));
    let d = discovery(&connector, profiles());

    let base = DiscoveryRequest::new()
        .connection_string("mongodb://localhost")
        .database("metrics");

    let graph = d
        .discover(DbKind::Document, &base.clone().sample_cap(0))
        .await
        .unwrap();
    assert_eq!(graph.nodes[0].sample_count, Some(200));

    let graph = d
        .discover(DbKind::Document, &base.sample_cap(25))
        .await
        .unwrap();
    assert_eq!(graph.nodes[0].sample_count, Some(25));
}

#[tokio::test]
async fn test_failed_extraction_closes_catalog() {
    let catalog = shop().fail_on_table("orders");
    let connector = MemoryConnector::new().with_catalog(catalog.clone());
    let d = discovery(&connector, profiles());

    let err = d
        .discover(
            DbKind::Relational,
            &DiscoveryRequest::new().connection_string("mysql://db/shop"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "catalog_read");
    assert!(catalog.is_closed());
}

#[tokio::test]
async fn test_failure_mid_collections_returns_no_graph() {
    let mut store = MemoryDocumentStore::new("blog");
    for name in ["a", "b", "c", "d", "e"] {
        store = store.with_collection(name, vec![doc! { "_id": 1 }]);
    }
    let store = store.fail_on_collection("c");
    let connector = MemoryConnector::new().with_store(store.clone());
    let d = discovery(&connector, profiles());

    let result = d
        .discover(
            DbKind::Document,
            &DiscoveryRequest::new()
                .connection_string("mongodb://localhost")
                .database("blog"),
        )
        .await;

    let err = result.unwrap_err();
    assert_eq!(
        err,
        DiscoveryError::CatalogRead {
            object: Some("c".into()),
            message: "query failed: injected failure sampling 'c'".into(),
        }
    );
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_duplicate_table_names_are_rejected() {
    let catalog = MemoryCatalog::new("shop")
        .with_table(MemoryTable::new("orders"))
        .with_table(MemoryTable::new("orders"));
    let connector = MemoryConnector::new().with_catalog(catalog);
    let d = discovery(&connector, profiles());

    let err = d
        .discover(
            DbKind::Relational,
            &DiscoveryRequest::new().connection_string("mysql://db/shop"),
        )
        .await
        .unwrap_err();

    assert_eq!(err, DiscoveryError::DuplicateNode("orders".into()));
}
