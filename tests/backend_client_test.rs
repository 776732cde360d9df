//! Integration tests for the backend client against a mock HTTP server

mod common;

use hubsearch::config::SearchConfig;
use hubsearch::search::{
    get_mapping, ElasticClient, FieldType, MappingField, ParsedQuery, SearchError,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

async fn connected_client(server: &mut ServerGuard) -> ElasticClient {
    common::init_tracing();
    server
        .mock("GET", "/_cluster/health")
        .with_status(200)
        .with_body(r#"{"status":"green"}"#)
        .create_async()
        .await;

    let config = SearchConfig {
        backend_url: server.url(),
        timeout_secs: 2,
        ..Default::default()
    };
    ElasticClient::connect(&config).await
}

#[tokio::test]
async fn test_connect_succeeds_when_backend_is_healthy() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;
    assert!(client.is_enabled());
}

#[tokio::test]
async fn test_connect_disables_on_failed_health_check() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/_cluster/health")
        .with_status(503)
        .with_body(r#"{"error":"unavailable"}"#)
        .create_async()
        .await;

    let config = SearchConfig {
        backend_url: server.url(),
        timeout_secs: 2,
        ..Default::default()
    };
    let client = ElasticClient::connect(&config).await;
    assert!(!client.is_enabled());

    // Disabled handles degrade instead of erroring
    let request = ParsedQuery::parse("anything").search_request(0, 10);
    assert!(client.search(&request, "hub", None).await.unwrap().hits.hits.is_empty());
}

#[tokio::test]
async fn test_search_returns_hits() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("POST", "/hub/_search")
        .match_body(Matcher::PartialJson(json!({"from": 0, "size": 10})))
        .with_status(200)
        .with_body(
            common::search_response(vec![common::node_source("abc12", "Climate", &["arctic"])])
                .to_string(),
        )
        .create_async()
        .await;

    let request = ParsedQuery::parse("climate").search_request(0, 10);
    let response = client.search(&request, "hub", None).await.unwrap();
    assert_eq!(response.hits.total, 1);
    assert_eq!(response.hits.hits[0].source["id"], "abc12");
}

#[tokio::test]
async fn test_count_parses_count_field() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("POST", "/hub/project/_count")
        .with_status(200)
        .with_body(r#"{"count": 7}"#)
        .create_async()
        .await;

    let request = ParsedQuery::parse("climate").count_request(hubsearch::search::DocType::Project);
    let count = client.count(&request, "hub", Some("project")).await.unwrap();
    assert_eq!(count, 7);
}

#[tokio::test]
async fn test_backend_error_carries_message() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("POST", "/hub/_search")
        .with_status(400)
        .with_body(r#"{"error": "SearchPhaseExecutionException[failed to parse]", "status": 400}"#)
        .create_async()
        .await;

    let request = ParsedQuery::parse("climate").search_request(0, 10);
    match client.search(&request, "hub", None).await {
        Err(SearchError::Backend(message)) => {
            assert!(message.contains("SearchPhaseExecutionException"));
        }
        other => panic!("expected backend error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_update_missing_document_is_not_found() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("POST", "/hub/project/abc12/_update")
        .match_query(Matcher::UrlEncoded("refresh".into(), "true".into()))
        .with_status(404)
        .with_body(r#"{"error": "DocumentMissingException", "status": 404}"#)
        .create_async()
        .await;

    let doc = json!({"id": "abc12"});
    match client.update("hub", "project", "abc12", &doc).await {
        Err(SearchError::NotFound(_)) => {}
        other => panic!("expected not-found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_missing_document_is_satisfied() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("DELETE", "/hub/project/gone1")
        .match_query(Matcher::UrlEncoded("refresh".into(), "true".into()))
        .with_status(404)
        .with_body(r#"{"error": "not found", "status": 404}"#)
        .create_async()
        .await;

    client.delete("hub", "project", "gone1").await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_index_is_logged_not_raised() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("DELETE", "/metadata")
        .with_status(404)
        .with_body(r#"{"error": "IndexMissingException[metadata]", "status": 404}"#)
        .create_async()
        .await;

    client.delete_index("metadata").await.unwrap();
}

#[tokio::test]
async fn test_get_mapping_translates_field_types() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("GET", "/hub/project/_mapping")
        .with_status(200)
        .with_body(
            json!({
                "hub": {
                    "mappings": {
                        "project": {
                            "properties": {
                                "public": {"type": "boolean"},
                                "boost": {"type": "long"},
                                "title": {"type": "string"},
                                "exotic": {"type": "geo_shape"},
                            }
                        }
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mapping = get_mapping(&client, "hub", "project").await.unwrap().unwrap();
    assert_eq!(
        mapping.get("public"),
        Some(&MappingField::Leaf(Some(FieldType::Bool)))
    );
    assert_eq!(
        mapping.get("boost"),
        Some(&MappingField::Leaf(Some(FieldType::Integer)))
    );
    assert_eq!(
        mapping.get("title"),
        Some(&MappingField::Leaf(Some(FieldType::Text)))
    );
    assert_eq!(mapping.get("exotic"), Some(&MappingField::Leaf(None)));
}

#[tokio::test]
async fn test_get_mapping_missing_yields_none() {
    let mut server = Server::new_async().await;
    let client = connected_client(&mut server).await;

    server
        .mock("GET", "/hub/nosuch/_mapping")
        .with_status(404)
        .with_body(r#"{"error": "TypeMissingException[nosuch]", "status": 404}"#)
        .create_async()
        .await;

    assert_eq!(get_mapping(&client, "hub", "nosuch").await.unwrap(), None);
}
