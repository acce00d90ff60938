mod common;

use coda_alfred::{CodaClient, CodaError, Config};
use common::{TEST_TOKEN, api_path, listing_page, mock_client, mock_config, sample_docs};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_pagination_concatenates_three_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .and(query_param("pageToken", "t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page(json!([{"name": "c"}, {"name": "d"}]), Some("t2"))),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .and(query_param("pageToken", "t2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page(json!([{"name": "e"}]), None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page(json!([{"name": "a"}, {"name": "b"}]), Some("t1"))),
        )
        .with_priority(5)
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let items = client.list_docs().await.unwrap();

    let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_follow_up_requests_keep_original_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs/AbC/pages/")))
        .and(query_param("limit", "1000"))
        .and(query_param("pageToken", "next"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_page(json!([{"name": "p2"}]), None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs/AbC/pages/")))
        .and(query_param("limit", "1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page(json!([{"name": "p1"}]), Some("next"))),
        )
        .with_priority(5)
        .expect(1)
        .mount(&mock_server)
        .await;

    let items = mock_client(&mock_server).list_pages("AbC").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "p1");
    assert_eq!(items[1]["name"], "p2");
}

#[tokio::test]
async fn test_pagination_is_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_page(json!([{"name": "loop"}]), Some("forever"))),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        max_pages: 3,
        ..mock_config(&mock_server)
    };
    let client = CodaClient::new(TEST_TOKEN, &config).unwrap();

    let result = client.list_docs().await;
    assert!(matches!(result, Err(CodaError::PaginationExceeded { limit: 3 })));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_list_docs_sends_empty_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .and(query_param("query", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_page(sample_docs(), None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items = mock_client(&mock_server).list_docs().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "AbCDeFGH");
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let cases: [(u16, fn(&CodaError) -> bool); 4] = [
        (401, |e| matches!(e, CodaError::Unauthorized)),
        (404, |e| matches!(e, CodaError::NotFound(_))),
        (429, |e| matches!(e, CodaError::RateLimited(_))),
        (500, |e| matches!(e, CodaError::Http { status: 500, .. })),
    ];

    for (status, is_expected) in cases {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(api_path("/docs")))
            .respond_with(ResponseTemplate::new(status).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let err = mock_client(&mock_server).list_docs().await.unwrap_err();
        assert!(is_expected(&err), "status {status} produced {err:?}");
    }
}

#[tokio::test]
async fn test_missing_items_is_payload_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"href": "x"})))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server).list_docs().await.unwrap_err();
    assert!(matches!(err, CodaError::Payload(_)));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/docs")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server).list_docs().await.unwrap_err();
    assert!(matches!(err, CodaError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let config = Config {
        api_base: "http://127.0.0.1:9/apis/v1".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let client = CodaClient::new(TEST_TOKEN, &config).unwrap();

    let err = client.list_docs().await.unwrap_err();
    assert!(matches!(err, CodaError::Network(_)));
}
