use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;

use super::{LinkIssuer, LinkKind};
use crate::clients::ClientRegistry;
use crate::config::Environment;
use crate::core::GatewayError;
use crate::testing;

fn issuer_for(server: &MockServer) -> LinkIssuer {
    let config = testing::config(&server.url("/token"), &server.url("/oob"));
    let registry = Arc::new(ClientRegistry::new(Arc::new(config)));
    LinkIssuer::new(registry, server.url("/oob"))
}

fn mock_token_endpoint(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200)
            .json_body(json!({"access_token": "issued-token", "expires_in": 3600}));
    })
}

#[tokio::test]
async fn password_reset_link_is_issued_for_tenant() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    let email = "user@example.com";
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/oob")
            .query_param("tenantId", "beta-health-test-tenant")
            .header("authorization", "Bearer issued-token")
            .header("content-type", "application/json")
            .json_body(json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
                "returnOobLink": true
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "email": email,
                "oobLink": "https://example.com/action?mode=resetPassword&oobCode=code"
            }));
    });

    let link = issuer
        .password_reset_link(email, "beta-health-test-tenant", Environment::Test)
        .await
        .unwrap();
    assert_eq!(
        link,
        "https://example.com/action?mode=resetPassword&oobCode=code"
    );

    mock.assert();
}

#[tokio::test]
async fn verification_link_omits_empty_tenant_id() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    let with_tenant = server.mock(|when, then| {
        when.method(POST).path("/oob").query_param_exists("tenantId");
        then.status(500);
    });
    let without_tenant = server.mock(|when, then| {
        when.method(POST).path("/oob").json_body(json!({
            "requestType": "VERIFY_EMAIL",
            "email": "user@example.com",
            "returnOobLink": true
        }));
        then.status(200).json_body(json!({
            "oobLink": "https://example.com/action?mode=verifyEmail&oobCode=code"
        }));
    });

    let link = issuer
        .email_verification_link("user@example.com", "", Environment::Test)
        .await
        .unwrap();
    assert_eq!(link, "https://example.com/action?mode=verifyEmail&oobCode=code");

    with_tenant.assert_hits(0);
    without_tenant.assert();
}

#[tokio::test]
async fn missing_account_maps_to_user_not_found() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(400)
            .json_body(json!({"error": {"message": "EMAIL_NOT_FOUND"}}));
    });

    let err = issuer
        .issue_link(
            LinkKind::PasswordReset,
            "nouser@example.com",
            "tenant-a",
            Environment::Test,
        )
        .await
        .unwrap_err();
    match err {
        GatewayError::UserNotFound { email } => assert_eq!(email, "nouser@example.com"),
        other => panic!("expected UserNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_rejection_carries_parsed_message() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(500)
            .json_body(json!({"error": {"message": "QUOTA_EXCEEDED", "code": 500}}));
    });

    let err = issuer
        .issue_link(
            LinkKind::EmailVerification,
            "user@example.com",
            "tenant-a",
            Environment::Prod,
        )
        .await
        .unwrap_err();
    match err {
        GatewayError::ProviderApi(message) => assert_eq!(message, "QUOTA_EXCEEDED"),
        other => panic!("expected ProviderApi, got {other:?}"),
    }
}

#[tokio::test]
async fn success_body_without_oob_link_is_protocol_error() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(200).json_body(json!({"email": "user@example.com"}));
    });

    let err = issuer
        .issue_link(
            LinkKind::PasswordReset,
            "user@example.com",
            "tenant-a",
            Environment::Test,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ProviderProtocol(_)), "got {err:?}");
}

#[tokio::test]
async fn non_json_success_body_is_protocol_error() {
    let server = MockServer::start();
    let issuer = issuer_for(&server);
    mock_token_endpoint(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(200).body("ok");
    });

    let err = issuer
        .issue_link(
            LinkKind::PasswordReset,
            "user@example.com",
            "tenant-a",
            Environment::Test,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ProviderProtocol(_)), "got {err:?}");
}

#[tokio::test]
async fn timeout_maps_to_transport_and_client_stays_usable() {
    let server = MockServer::start();
    let mut config = testing::config(&server.url("/token"), &server.url("/oob"));
    config.http_timeout = Duration::from_millis(250);
    let registry = Arc::new(ClientRegistry::new(Arc::new(config)));
    let issuer = LinkIssuer::new(registry, server.url("/oob"));
    mock_token_endpoint(&server);

    let mut slow = server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(200)
            .json_body(json!({"oobLink": "https://example.com/late"}))
            .delay(Duration::from_secs(2));
    });

    let err = issuer
        .issue_link(
            LinkKind::PasswordReset,
            "user@example.com",
            "tenant-a",
            Environment::Test,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");

    // Same environment client, next call succeeds: nothing was poisoned.
    slow.delete();
    server.mock(|when, then| {
        when.method(POST).path("/oob");
        then.status(200)
            .json_body(json!({"oobLink": "https://example.com/prompt"}));
    });

    let link = issuer
        .issue_link(
            LinkKind::PasswordReset,
            "user@example.com",
            "tenant-a",
            Environment::Test,
        )
        .await
        .unwrap();
    assert_eq!(link, "https://example.com/prompt");
}
