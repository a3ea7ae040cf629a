//! Tests against a running RediSearch server.
//!
//! Disabled by default, run with: cargo test -- --ignored
//! The server address is read from `REDISEARCH_TEST_HOST` (default `localhost:6379`).

use armature_redisearch::*;
use tracing_subscriber::EnvFilter;

async fn create_client(index: &str) -> SearchClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let host = std::env::var("REDISEARCH_TEST_HOST")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost:6379".to_string());
    let config = SearchConfig::new(format!("redis://{}", host));
    SearchClient::connect(config, index).await.unwrap()
}

async fn recreate(client: &SearchClient, schema: &Schema) {
    let _ = client.drop_index().await;
    client.create_index(schema).await.unwrap();
}

fn text<'a>(doc: &'a Document, name: &str) -> Option<&'a str> {
    doc.get(name).and_then(FieldValue::as_str)
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_client() {
    let c = create_client("testung").await;
    recreate(&c, &Schema::new(IndexOptions::default()).add_field(Field::text("foo"))).await;

    let docs: Vec<Document> = (0..100)
        .map(|i| Document::new(format!("doc{}", i), i as f64 / 100.0).set("foo", "hello world"))
        .collect();

    c.index_options(&IndexingOptions::default(), &docs).await.unwrap();

    let err = c
        .index_options(&IndexingOptions::default(), &docs)
        .await
        .expect_err("expected error for duplicate documents");
    let merr = err.as_multi_error().expect("error not a multi error");
    assert_eq!(merr.len(), 100);
    assert_eq!(merr.failed_count(), 100);

    let result = c.search(&Query::new("hello world")).await.unwrap();
    assert_eq!(result.total, 100);
    assert_eq!(result.len(), 10);
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_info() {
    let c = create_client("testung").await;
    let schema = Schema::new(IndexOptions::default())
        .add_field(Field::text("foo"))
        .add_field(Field::sortable_numeric("bar"));
    recreate(&c, &schema).await;

    let info = c.info().await.unwrap();
    assert_eq!(info.name, "testung");
    assert_eq!(info.schema.fields.len(), 2);
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_numeric() {
    let c = create_client("testung").await;
    let schema = Schema::new(IndexOptions::default())
        .add_field(Field::text("foo"))
        .add_field(Field::sortable_numeric("bar"));
    recreate(&c, &schema).await;

    let docs: Vec<Document> = (0..100)
        .map(|i| {
            Document::new(format!("doc{}", i), 1.0)
                .set("foo", "hello world")
                .set("bar", i)
        })
        .collect();
    c.index(&docs).await.unwrap();

    let result = c
        .search(
            &Query::new("hello world @bar:[50 100]")
                .set_flags(QueryFlags::NO_CONTENT | QueryFlags::WITH_SCORES),
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(result.total, 50);

    let result = c
        .search(&Query::new("hello world @bar:[40 90]").set_sort_by("bar", false))
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(result.total, 51);
    assert_eq!(result.documents[0].id, "doc90");
    assert_eq!(result.documents[1].id, "doc89");
    assert_eq!(result.documents[9].id, "doc81");

    let result = c
        .search(
            &Query::new("hello world @bar:[40 90]")
                .set_sort_by("bar", true)
                .set_return_fields(["foo"]),
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(result.total, 51);
    assert_eq!(result.documents[0].id, "doc40");
    assert_eq!(text(&result.documents[0], "foo"), Some("hello world"));
    assert!(result.documents[0].get("bar").is_none());
    assert_eq!(result.documents[1].id, "doc41");
    assert_eq!(result.documents[9].id, "doc49");

    let plan = c
        .explain(&Query::new("hello world @bar:[40 90]"))
        .await
        .unwrap();
    assert!(!plan.is_empty());
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_no_index() {
    let c = create_client("testung").await;
    let schema = Schema::new(IndexOptions::default())
        .add_field(Field::text_with_options(
            "f1",
            TextFieldOptions {
                weight: 1.0,
                sortable: true,
                no_index: true,
            },
        ))
        .add_field(Field::text("f2"));
    recreate(&c, &schema).await;

    c.index(&[Document::new("doc1", 1.0)
        .set("f1", "MarkZZ")
        .set("f2", "MarkZZ")])
        .await
        .unwrap();
    c.index(&[Document::new("doc2", 1.0)
        .set("f1", "MarkAA")
        .set("f2", "MarkAA")])
        .await
        .unwrap();

    let result = c.search(&Query::new("@f1:Mark*")).await.unwrap();
    assert_eq!(result.total, 0);

    let result = c.search(&Query::new("@f2:Mark*")).await.unwrap();
    assert_eq!(result.total, 2);

    let result = c
        .search(&Query::new("@f2:Mark*").set_sort_by("f1", false))
        .await
        .unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.documents[0].id, "doc1");

    let result = c
        .search(&Query::new("@f2:Mark*").set_sort_by("f2", true))
        .await
        .unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.documents[0].id, "doc2");
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_highlight() {
    let c = create_client("testung").await;
    let schema = Schema::new(IndexOptions::default())
        .add_field(Field::text("foo"))
        .add_field(Field::text("bar"));
    recreate(&c, &schema).await;

    let docs: Vec<Document> = (0..100)
        .map(|i| {
            Document::new(format!("doc{}", i), 1.0)
                .set("foo", "hello world")
                .set("bar", "hello world foo bar baz")
        })
        .collect();
    c.index(&docs).await.unwrap();

    let result = c
        .search(&Query::new("hello").highlight(["foo"], "[", "]"))
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    for d in &result.documents {
        assert_eq!(text(d, "foo"), Some("[hello] world"));
        assert_eq!(text(d, "bar"), Some("hello world foo bar baz"));
    }

    let result = c
        .search(&Query::new("hello world baz").highlight(["foo", "bar"], "{", "}"))
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    for d in &result.documents {
        assert_eq!(text(d, "foo"), Some("{hello} {world}"));
        assert_eq!(text(d, "bar"), Some("{hello} {world} foo bar {baz}"));
    }

    // RETURN contradicting HIGHLIGHT
    let result = c
        .search(
            &Query::new("hello")
                .highlight(["foo"], "[", "]")
                .set_return_fields(["bar"]),
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    for d in &result.documents {
        assert!(d.get("foo").is_none());
        assert_eq!(text(d, "bar"), Some("hello world foo bar baz"));
    }

    c.drop_index().await.unwrap();
}

#[tokio::test]
#[ignore = "requires RediSearch"]
async fn test_summarize() {
    let c = create_client("testung").await;
    let schema = Schema::new(IndexOptions::default())
        .add_field(Field::text("foo"))
        .add_field(Field::text("bar"));
    recreate(&c, &schema).await;

    let body = "There are two sub-commands commands used for highlighting. One is HIGHLIGHT \
                which surrounds matching text with an open and/or close tag; and the other is \
                SUMMARIZE which splits a field into contextual fragments surrounding the found \
                terms. It is possible to summarize a field, highlight a field, or perform both \
                actions in the same query.";
    let docs: Vec<Document> = (0..10)
        .map(|i| {
            Document::new(format!("doc{}", i), 1.0)
                .set("foo", body)
                .set("bar", "hello world foo bar baz")
        })
        .collect();
    c.index(&docs).await.unwrap();

    let result = c
        .search(&Query::new("commands fragments fields").summarize(["foo"]))
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    for d in &result.documents {
        assert_eq!(
            text(d, "foo"),
            Some(
                "sub-commands commands used... field into contextual fragments surrounding the \
                 found terms. It is possible to summarize a field, highlight a field... "
            )
        );
        assert_eq!(text(d, "bar"), Some("hello world foo bar baz"));
    }

    let result = c
        .search(
            &Query::new("commands fragments fields")
                .highlight(["foo"], "[", "]")
                .summarize_options(SummaryOptions {
                    fields: vec!["foo".to_string()],
                    separator: "\r\n".to_string(),
                    fragment_len: 10,
                    num_fragments: 5,
                }),
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    for d in &result.documents {
        assert_eq!(
            text(d, "foo"),
            Some(
                "are two sub-[commands] [commands] used for highlighting. One is\r\na [field] \
                 into contextual [fragments] surrounding the found terms. It is possible to \
                 summarize a [field], highlight a [field], or\r\n"
            )
        );
        assert_eq!(text(d, "bar"), Some("hello world foo bar baz"));
    }
}
