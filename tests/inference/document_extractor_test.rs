use insta::assert_snapshot;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use schemalens::discovery::DiscoveryError;
use schemalens::graph::{Edge, RawGraph, TypeInfo, TypeTag};
use schemalens::inference::{classify, DocumentExtractor};
use schemalens::metadata::{doc, Bson, Document, MemoryDocumentStore};

fn render(raw: &RawGraph) -> String {
    raw.nodes
        .iter()
        .map(|node| {
            let columns: Vec<String> = node.columns.iter().map(|c| c.to_string()).collect();
            format!("{}: {}", node.id, columns.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn posts(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let title = format!("post {}", i);
            doc! {
                "_id": ObjectId::new(),
                "author_id": ObjectId::new(),
                "title": title,
            }
        })
        .collect()
}

#[tokio::test]
async fn test_posts_reference_author_once() {
    let store = MemoryDocumentStore::new("blog").with_collection("posts", posts(3));

    let raw = DocumentExtractor::default().extract(&store).await.unwrap();
    let node = &raw.nodes[0];

    assert_eq!(node.id, "posts");
    assert_eq!(node.sample_count, Some(3));
    assert!(node.column("_id").unwrap().role.primary_key);

    let author = node.column("author_id").unwrap();
    assert!(author.role.foreign_key);
    assert_eq!(author.referenced_node.as_deref(), Some("author"));

    // Three documents carry author_id; the collection still yields one edge.
    assert_eq!(raw.edges, vec![Edge::new("posts", "author")]);
}

#[tokio::test]
async fn test_rendered_columns() {
    let store = MemoryDocumentStore::new("blog")
        .with_collection("posts", posts(2))
        .with_collection(
            "reviews",
            vec![
                doc! { "_id": 1, "rating": 4, "profileId": "p1", "reviewer": ObjectId::new() },
                doc! { "_id": 2, "rating": 4.5, "profileId": "p2", "reviewer": ObjectId::new() },
                doc! { "_id": 3, "rating": "n/a", "published": true },
            ],
        );

    let raw = DocumentExtractor::default().extract(&store).await.unwrap();

    assert_snapshot!(render(&raw), @r"
    posts: _id (PK), author_id (FK:author), title
    reviews: _id (PK), profileId (FK:profile), published, rating (float|int|string), reviewer (FK:reviewer)
    ");
    assert_eq!(
        raw.edges,
        vec![
            Edge::new("posts", "author"),
            Edge::new("reviews", "profile"),
            Edge::new("reviews", "reviewer"),
        ]
    );
}

#[tokio::test]
async fn test_multi_type_union_is_stable() {
    let docs = vec![
        doc! { "value": "x" },
        doc! { "value": 1_i64 },
        doc! { "value": Bson::Null },
        doc! { "value": 2.0 },
        doc! { "value": 3 },
    ];
    let store = MemoryDocumentStore::new("m").with_collection("readings", docs);
    let extractor = DocumentExtractor::default();

    let first = extractor.extract(&store).await.unwrap();
    let second = extractor.extract(&store).await.unwrap();

    let value = first.nodes[0].column("value").unwrap();
    assert_eq!(
        value.type_info,
        TypeInfo::Observed(vec![
            TypeTag::Float,
            TypeTag::Integer,
            TypeTag::Null,
            TypeTag::String
        ])
    );
    assert_eq!(value.to_string(), "value (float|int|null|string)");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_booleans_never_classify_as_integers() {
    let docs: Vec<Document> = (0..20)
        .map(|i| {
            let active = i % 2 == 0;
            doc! { "active": active }
        })
        .collect();
    for document in &docs {
        for (_, value) in document {
            assert_eq!(classify(value), TypeTag::Boolean);
        }
    }

    let store = MemoryDocumentStore::new("m").with_collection("flags", docs);
    let raw = DocumentExtractor::default().extract(&store).await.unwrap();

    let active = raw.nodes[0].column("active").unwrap();
    assert_eq!(active.type_info, TypeInfo::Observed(vec![TypeTag::Boolean]));
    assert_eq!(active.to_string(), "active");
}

#[tokio::test]
async fn test_other_types_render_by_name() {
    let docs = vec![
        doc! { "created": DateTime::from_millis(0) },
        doc! { "created": "2024-01-01" },
    ];
    let store = MemoryDocumentStore::new("m").with_collection("events", docs);

    let raw = DocumentExtractor::default().extract(&store).await.unwrap();

    assert_eq!(
        raw.nodes[0].column("created").unwrap().to_string(),
        "created (datetime|string)"
    );
}

#[tokio::test]
async fn test_guessed_targets_may_dangle() {
    let store = MemoryDocumentStore::new("crm")
        .with_collection("users", vec![doc! { "_id": ObjectId::new() }])
        .with_collection("tickets", vec![doc! { "_id": 1, "user_id": 5, "ownerId": 9 }]);

    let raw = DocumentExtractor::default().extract(&store).await.unwrap();

    // "user" and "owner" are guesses; neither collection exists.
    assert_eq!(
        raw.edges,
        vec![Edge::new("tickets", "owner"), Edge::new("tickets", "user")]
    );
}

#[tokio::test]
async fn test_sample_cap_limits_documents() {
    let store = MemoryDocumentStore::new("blog").with_collection("posts", posts(50));

    let raw = DocumentExtractor::new(10).extract(&store).await.unwrap();

    assert_eq!(raw.nodes[0].sample_count, Some(10));
}

#[tokio::test]
async fn test_failure_on_third_of_five_collections() {
    let mut store = MemoryDocumentStore::new("blog");
    for name in ["a", "b", "c", "d", "e"] {
        store = store.with_collection(name, posts(2));
    }
    let store = store.fail_on_collection("c");

    let err = DocumentExtractor::default().extract(&store).await.unwrap_err();

    match err {
        DiscoveryError::CatalogRead { object, .. } => assert_eq!(object.as_deref(), Some("c")),
        other => panic!("unexpected error: {other:?}"),
    }
    // Sampling stopped at the failing collection.
    assert_eq!(
        store.calls(),
        vec![
            "list_collections",
            "sample_documents:a",
            "sample_documents:b",
            "sample_documents:c",
        ]
    );
}

#[tokio::test]
async fn test_listing_failure() {
    let store = MemoryDocumentStore::new("blog")
        .with_collection("posts", posts(1))
        .fail_listing();

    let err = DocumentExtractor::default().extract(&store).await.unwrap_err();

    assert!(matches!(err, DiscoveryError::CatalogRead { object: None, .. }));
}
