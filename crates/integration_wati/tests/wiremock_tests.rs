//! Integration tests for the Wati client using WireMock
//!
//! These tests mock the Wati REST API to verify request shaping, status
//! mapping and response normalization without making real API calls.

use domain::{InteractiveMessage, MediaCategory, MediaUpload, PageRequest};
use integration_wati::{WatiClient, WatiClientConfig, WatiError};
use reqwest::Method;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

const TENANT: &str = "123456";

#[allow(clippy::expect_used)]
fn create_client(mock_server: &MockServer) -> WatiClient {
    WatiClient::new(WatiClientConfig::for_testing(mock_server.uri()))
        .expect("Failed to create client")
}

fn tenant_path(endpoint: &str) -> String {
    format!("/{TENANT}/{endpoint}")
}

fn upload(name: &str, mime: &str, category: MediaCategory) -> MediaUpload {
    MediaUpload {
        file_name: name.to_string(),
        mime_type: mime.to_string(),
        category,
        data: b"file-bytes".to_vec(),
    }
}

// =============================================================================
// Transport Tests
// =============================================================================

#[tokio::test]
async fn call_attaches_bearer_token_and_tenant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(tenant_path("api/v1/ping")))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("a", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let (status, body) = client
        .call(Method::GET, "api/v1/ping", &[("a", "1".to_string())], None)
        .await
        .unwrap();

    assert_eq!(status.as_u16(), 200);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn empty_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let (_, body) = client.call(Method::POST, "x", &[], None).await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "api/v1/getContacts", &[], None).await;

    assert!(matches!(
        result,
        Err(WatiError::AuthenticationFailed { status: 401, ref message }) if message == "Invalid token"
    ));
}

#[tokio::test]
async fn forbidden_maps_to_authentication_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "x", &[], None).await;
    assert!(matches!(
        result,
        Err(WatiError::AuthenticationFailed { status: 403, .. })
    ));
}

#[tokio::test]
async fn rate_limit_preserves_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "x", &[], None).await;

    assert!(matches!(
        result,
        Err(WatiError::RateLimitExceeded {
            retry_after_secs: Some(60)
        })
    ));
}

#[tokio::test]
async fn rate_limit_without_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "x", &[], None).await;
    assert!(matches!(
        result,
        Err(WatiError::RateLimitExceeded {
            retry_after_secs: None
        })
    ));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "x", &[], None).await;

    match result {
        Err(WatiError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        },
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_schema_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.call(Method::GET, "x", &[], None).await;
    assert!(matches!(result, Err(WatiError::Schema(_))));
}

#[tokio::test]
async fn slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = WatiClientConfig::for_testing(mock_server.uri());
    config.timeout_secs = 1;
    let client = WatiClient::new(config).unwrap();

    let result = client.call(Method::GET, "x", &[], None).await;
    assert!(matches!(result, Err(WatiError::Timeout { timeout_secs: 1 })));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = WatiClient::new(WatiClientConfig::for_testing("http://127.0.0.1:1")).unwrap();
    let err = client.call(Method::GET, "x", &[], None).await.unwrap_err();
    assert!(err.is_retryable(), "{err:?}");
}

// =============================================================================
// Endpoint Tests
// =============================================================================

#[tokio::test]
async fn get_contacts_sends_paging_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(tenant_path("api/v1/getContacts")))
        .and(query_param("pageSize", "100"))
        .and(query_param("pageNumber", "2"))
        .and(query_param("name", "john"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "contact_list": [
                {"wAid": "491701111111", "phone": "491701111111", "fullName": "John Doe"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let page = client
        .get_contacts(
            PageRequest {
                page_number: 2,
                page_size: 100,
            },
            Some("john"),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name.as_deref(), Some("John Doe"));
}

#[tokio::test]
async fn get_messages_normalizes_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(tenant_path("api/v1/getMessages/491701234567")))
        .and(query_param("pageSize", "3"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "messages": {
                "items": [
                    {"id": "m2", "text": "Hi back", "owner": true, "created": "2024-05-01T09:31:00Z"},
                    {"id": "m1", "text": "Hi", "owner": false, "created": "2024-05-01T09:30:00Z"}
                ],
                "total": 2
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let page = client
        .get_messages("491701234567", PageRequest::first(3))
        .await
        .unwrap();

    assert_eq!(page.total, Some(2));
    assert_eq!(page.items[0].id, "m2");
    assert!(page.items[0].is_outbound());
    assert_eq!(page.items[1].sender, "491701234567");

    let requests = mock_server.received_requests().await.unwrap();
    let keys: Vec<String> = requests[0]
        .url
        .query_pairs()
        .map(|(k, _)| k.into_owned())
        .collect();
    assert_eq!(keys, ["pageSize", "pageNumber"]);
}

#[tokio::test]
async fn send_session_message_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(tenant_path("api/v1/sendSessionMessage/491701234567")))
        .and(query_param("messageText", "Hello there"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "message": "Message sent"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let receipt = client
        .send_session_message("491701234567", "Hello there")
        .await
        .unwrap();

    assert!(receipt.accepted);
    assert_eq!(receipt.message.as_deref(), Some("Message sent"));
}

#[tokio::test]
async fn send_session_message_rejected_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": false,
            "info": "Ticket has been expired"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let receipt = client.send_session_message("491701234567", "Hi").await.unwrap();

    assert!(!receipt.accepted);
    assert_eq!(receipt.message.as_deref(), Some("Ticket has been expired"));
}

#[tokio::test]
async fn send_session_file_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(tenant_path("api/v1/sendSessionFile/491701234567")))
        .and(query_param("caption", "The report"))
        .and(body_string_contains("name=\"file\"; filename=\"report.pdf\""))
        .and(body_string_contains("file-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let receipt = client
        .send_session_file(
            "491701234567",
            upload("report.pdf", "application/pdf", MediaCategory::Document),
            Some("The report"),
        )
        .await
        .unwrap();

    assert!(receipt.accepted);
}

#[tokio::test]
async fn send_interactive_buttons_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(tenant_path("api/v1/sendInteractiveButtonsMessage")))
        .and(query_param("whatsappNumber", "491701234567"))
        .and(body_json(json!({
            "body": "Confirm?",
            "buttons": [{"text": "Yes", "id": "yes"}, {"text": "No", "id": "no"}],
            "header": {"type": "Text", "text": "Order"},
            "footer": "Thanks"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let message = InteractiveMessage::builder("Confirm?")
        .button("yes", "Yes")
        .button("no", "No")
        .header_text("Order")
        .footer("Thanks")
        .build()
        .unwrap();

    let client = create_client(&mock_server);
    let receipt = client
        .send_interactive_buttons("491701234567", &message, None)
        .await
        .unwrap();
    assert!(receipt.accepted);
}

#[tokio::test]
async fn send_interactive_buttons_with_local_header_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(tenant_path("api/v1/sendInteractiveButtonsMessage")))
        .and(body_string_contains("name=\"messageData\""))
        .and(body_string_contains("\"fileName\":\"menu.png\""))
        .and(body_string_contains("name=\"file\"; filename=\"menu.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let message = InteractiveMessage::builder("Today's menu")
        .button("order", "Order")
        .header_image("/tmp/menu.png")
        .build()
        .unwrap();

    let client = create_client(&mock_server);
    let receipt = client
        .send_interactive_buttons(
            "491701234567",
            &message,
            Some(upload("menu.png", "image/png", MediaCategory::Image)),
        )
        .await
        .unwrap();
    assert!(receipt.accepted);
}

#[tokio::test]
async fn get_media_overwrites_same_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(tenant_path("api/v1/getMedia")))
        .and(query_param("fileName", "data/images/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let client = create_client(&mock_server);

    let first = client
        .get_media("data/images/photo.jpg", scratch.path())
        .await
        .unwrap();
    let second = client
        .get_media("data/images/photo.jpg", scratch.path())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, scratch.path().join("photo.jpg"));
    assert_eq!(std::fs::read(&first).unwrap(), b"jpeg-bytes");
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn get_media_missing_upstream_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(tenant_path("api/v1/getMedia")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "File not found"})))
        .mount(&mock_server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let client = create_client(&mock_server);
    let err = client
        .get_media("gone.jpg", scratch.path())
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err:?}");
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn get_media_without_usable_name_is_invalid_input() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scratch = tempfile::tempdir().unwrap();
    let err = create_client(&mock_server)
        .get_media("..", scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, WatiError::InvalidInput(_)), "{err:?}");
}

// =============================================================================
// Remote Files
// =============================================================================

#[tokio::test]
async fn fetch_url_returns_body_without_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let bytes = client
        .fetch_url(&format!("{}/files/photo.png", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, b"png-bytes");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn fetch_url_missing_file_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = create_client(&mock_server)
        .fetch_url(&format!("{}/files/gone.png", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
}
