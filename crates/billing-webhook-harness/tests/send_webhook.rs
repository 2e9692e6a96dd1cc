//! Sending signed webhooks to a mock endpoint.

use std::time::Duration;

use billing_webhook_auth::{Signer, Verifier, WebhookSecret};
use billing_webhook_harness::{subscription_created, HarnessError, TestRequest};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const SECRET: &str = "whsec_test";
const WEBHOOK_PATH: &str = "/functions/v1/lemonsqueezy-webhook";

/// Endpoint that verifies the signature the way the webhook function does.
struct VerifyingEndpoint {
    verifier: Verifier,
}

impl Respond for VerifyingEndpoint {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let signature = request
            .headers
            .get("x-signature")
            .and_then(|v| v.to_str().ok());

        match self.verifier.verify_header(&request.body, signature).into_result() {
            Ok(()) => ResponseTemplate::new(200).set_body_json(json!({"received": true})),
            Err(rejection) => ResponseTemplate::new(401)
                .set_body_json(json!({"error": rejection.to_string()})),
        }
    }
}

fn secret(value: &str) -> WebhookSecret {
    WebhookSecret::new(value).unwrap()
}

async fn verifying_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(VerifyingEndpoint {
            verifier: Verifier::new(secret(SECRET)),
        })
        .mount(&server)
        .await;
    server
}

fn request_for(server: &MockServer, signing_secret: &str) -> TestRequest {
    let signed = Signer::new(secret(signing_secret))
        .sign_payload(&subscription_created())
        .unwrap();
    TestRequest::new(
        format!("{}{WEBHOOK_PATH}", server.uri()),
        "x-signature",
        signed,
    )
}

#[tokio::test]
async fn endpoint_accepts_correctly_signed_webhook() {
    let server = verifying_server().await;
    let request = request_for(&server, SECRET);

    assert_eq!(
        request.signature,
        "0bed0947cc8f392f9e5dbb519cf180f0a654d14a3d4db04f37d02a1998d4119d"
    );

    let outcome = request.send(Duration::from_secs(5)).await.unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, r#"{"received":true}"#);
}

#[tokio::test]
async fn endpoint_rejects_webhook_signed_with_wrong_secret() {
    let server = verifying_server().await;
    let request = request_for(&server, "wrong_secret");

    let err = request.send(Duration::from_secs(5)).await.unwrap_err();
    match err {
        HarnessError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, r#"{"error":"signature mismatch"}"#);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn sends_exact_canonical_body_and_header() {
    let server = MockServer::start().await;
    let request = request_for(&server, SECRET);

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(header("x-signature", request.signature.as_str()))
        .and(wiremock::matchers::body_string(request.body.clone()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = request.send(Duration::from_secs(5)).await.unwrap();
    assert_eq!(outcome.status, 204);
    assert!(outcome.body.is_empty());
}

#[tokio::test]
async fn custom_signature_header_is_used() {
    let server = MockServer::start().await;
    let signed = Signer::new(secret(SECRET))
        .sign_payload(&json!({"a": 1, "b": "x"}))
        .unwrap();
    let request = TestRequest::new(
        format!("{}{WEBHOOK_PATH}", server.uri()),
        "x-custom-signature",
        signed,
    );

    Mock::given(method("POST"))
        .and(header(
            "x-custom-signature",
            "980dcbe85c0ab7ac06da63a247de0c108573533b5de0f5187ea647735ca5146a",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    request.send(Duration::from_secs(5)).await.unwrap();
}
