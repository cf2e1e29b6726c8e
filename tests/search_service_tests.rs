//! Integration tests for the semantic search client against a mock service.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reconfort::config::{RequestConfig, SearchConfig};
use reconfort::error::SearchError;
use reconfort::search::{SearchRequest, SemanticSearchClient};

fn client_for(server: &MockServer) -> SemanticSearchClient {
    let config = SearchConfig {
        base_url: server.uri(),
    };
    SemanticSearchClient::new(&config, RequestConfig::default()).unwrap()
}

#[tokio::test]
async fn test_health_probe_up_and_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    assert!(client_for(&server).check_health().await);

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    assert!(!client_for(&broken).check_health().await);
}

#[tokio::test]
async fn test_search_success_with_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"query": "I need calm.", "top_k": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "q42",
                    "text": "One breath at a time.",
                    "score": 0.91,
                    "metadata": {"author": "Anonymous", "need": "calm"}
                },
                {
                    "id": "q7",
                    "text": "Still water runs deep.",
                    "score": 0.74,
                    "metadata": {}
                }
            ]
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .search(SearchRequest::new("I need calm.", 3))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].id, "q42");
    assert_eq!(response.results[0].metadata.author.as_deref(), Some("Anonymous"));
    assert!(response.results[0].score > response.results[1].score);
}

#[tokio::test]
async fn test_search_sends_exclude_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"exclude_ids": ["q1", "q2"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchRequest::new("anything", 3)
        .with_exclude_ids(vec!["q1".to_string(), "q2".to_string()]);
    let response = client_for(&server).search(request).await.unwrap();
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_search_surfaces_upstream_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "index not built"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search(SearchRequest::new("calm", 3))
        .await
        .unwrap_err();

    match err {
        SearchError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "index not built");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_rejects_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search(SearchRequest::new("calm", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_unreachable_service_maps_to_unreachable() {
    // Bind an ephemeral port and release it so nothing is listening there.
    // (Dropping a wiremock `MockServer` is not enough: its socket goes back
    // to a shared pool and keeps listening.)
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = SearchConfig { base_url: uri };
    let client = SemanticSearchClient::new(&config, RequestConfig::default()).unwrap();

    let err = client
        .search(SearchRequest::new("calm", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Unreachable { .. }));
}
