//! Integration tests for signed Content API requests made on behalf of webhooks

mod common;

use camayak_content_sdk::Credentials;
use common::{TestService, API_KEY};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

/// Verify resource fetches carry the api key and a hex HMAC-SHA1 signature
#[tokio::test]
async fn test_resource_fetch_is_signed() {
    // Arrange
    let service = TestService::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/content/abc/"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&service.content_api)
        .await;

    // Act
    let response = service.post_event("publish", "abc").await;

    // Assert
    assert_eq!(response.status(), 200);
    let requests = service.content_api.received_requests().await.unwrap();
    let api_sig = requests[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "api_sig")
        .map(|(_, value)| value.into_owned())
        .expect("api_sig missing");
    assert_eq!(api_sig.len(), 40);
    assert!(hex::decode(&api_sig).is_ok());
}

/// Verify unsigned credentials omit api_sig entirely
#[tokio::test]
async fn test_resource_fetch_without_secret_omits_signature() {
    // Arrange
    let service = TestService::start_with_credentials(Credentials::new(API_KEY)).await;
    Mock::given(method("GET"))
        .and(path("/v1/content/abc/"))
        .and(query_param("api_key", API_KEY))
        .and(query_param_is_missing("api_sig"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&service.content_api)
        .await;

    // Act
    let response = service.post_event("publish", "abc").await;

    // Assert
    assert_eq!(response.status(), 200);
}

/// Verify an existing query on the resource URI is preserved
#[tokio::test]
async fn test_resource_query_is_preserved() {
    // Arrange
    let service = TestService::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/content/abc/"))
        .and(query_param("format", "full"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&service.content_api)
        .await;
    let resource_uri = format!("{}?format=full", service.resource_uri("abc"));

    // Act
    let response = service
        .post_webhook(common::event_payload("publish", &resource_uri))
        .await;

    // Assert
    assert_eq!(response.status(), 200);
}
