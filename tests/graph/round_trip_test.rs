use insta::assert_snapshot;
use schemalens::graph::{
    ColumnDescriptor, DbKind, Edge, GraphAssembler, Node, RawGraph, SchemaGraph, TypeTag,
};
use schemalens::inference::DocumentExtractor;
use schemalens::metadata::{doc, MemoryDocumentStore};

fn blog() -> SchemaGraph {
    let raw = RawGraph {
        database: "blog".into(),
        nodes: vec![
            Node::new(
                "posts",
                vec![
                    ColumnDescriptor::new("_id")
                        .primary_key()
                        .with_observed_types([TypeTag::ObjectId]),
                    ColumnDescriptor::new("author_id")
                        .foreign_key(Some("author".into()))
                        .with_observed_types([TypeTag::ObjectId]),
                    ColumnDescriptor::new("rating")
                        .with_observed_types([TypeTag::Integer, TypeTag::Float]),
                ],
            )
            .with_sample_count(2),
            Node::new("user_profiles", vec![ColumnDescriptor::new("_id").primary_key()])
                .with_sample_count(0),
        ],
        edges: vec![Edge::new("posts", "author"), Edge::new("posts", "author")],
    };
    GraphAssembler::new(DbKind::Document).assemble(raw).unwrap()
}

#[test]
fn test_json_shape() {
    let json = serde_json::to_string_pretty(&blog()).unwrap();

    assert_snapshot!(json, @r#"
    {
      "database": "blog",
      "db_kind": "mongodb",
      "nodes": [
        {
          "id": "posts",
          "label": "Posts",
          "columns": [
            "_id (PK)",
            "author_id (FK:author)",
            "rating (float|int)"
          ],
          "sample_count": 2
        },
        {
          "id": "user_profiles",
          "label": "User Profiles",
          "columns": [
            "_id (PK)"
          ],
          "sample_count": 0
        }
      ],
      "edges": [
        {
          "source": "posts",
          "target": "author"
        },
        {
          "source": "posts",
          "target": "author"
        }
      ]
    }
    "#);
}

#[test]
fn test_round_trip_preserves_structure() {
    let original = blog();
    let json = serde_json::to_string(&original).unwrap();
    let back: SchemaGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(back.database, original.database);
    assert_eq!(back.db_kind, original.db_kind);

    let ids = |g: &SchemaGraph| g.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&back), ids(&original));
    assert_eq!(back.edges, original.edges);

    // Rendered columns survive even though single observed tags do not print.
    let rendered = |g: &SchemaGraph| {
        g.nodes
            .iter()
            .flat_map(|n| n.columns.iter().map(|c| c.to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(rendered(&back), rendered(&original));
}

#[test]
fn test_relational_round_trip_is_exact() {
    let raw = RawGraph {
        database: "shop".into(),
        nodes: vec![Node::new(
            "orders",
            vec![
                ColumnDescriptor::new("order_id")
                    .primary_key()
                    .with_declared_type("INT"),
                ColumnDescriptor::new("customer_id")
                    .foreign_key(Some("customers".into()))
                    .with_declared_type("INT"),
            ],
        )],
        edges: vec![Edge::new("orders", "customers")],
    };
    let graph = GraphAssembler::new(DbKind::Relational).assemble(raw).unwrap();

    let back: SchemaGraph =
        serde_json::from_str(&serde_json::to_string(&graph).unwrap()).unwrap();

    assert_eq!(back, graph);
}

#[test]
fn test_assembler_rejects_duplicate_ids() {
    let raw = RawGraph {
        database: "shop".into(),
        nodes: vec![Node::new("orders", vec![]), Node::new("orders", vec![])],
        edges: vec![],
    };

    let err = GraphAssembler::new(DbKind::Relational).assemble(raw).unwrap_err();
    assert_eq!(err.to_string(), "duplicate node id 'orders'");
}

#[tokio::test]
async fn test_awkward_field_names_survive_export() {
    let store = MemoryDocumentStore::new("notes").with_collection(
        "entries",
        vec![doc! { "_id": 1, "": "blank", "note (PK)": "x", "total [net]": 2 }],
    );
    let raw = DocumentExtractor::default().extract(&store).await.unwrap();
    let graph = GraphAssembler::new(DbKind::Document).assemble(raw).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let back: SchemaGraph = serde_json::from_str(&json).unwrap();

    let summary = |g: &SchemaGraph| {
        g.nodes[0]
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.role, c.referenced_node.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&back), summary(&graph));

    let note = back.node("entries").unwrap().column("note (PK)").unwrap();
    assert!(!note.role.primary_key);
    assert!(back.node("entries").unwrap().column("").is_some());
}
