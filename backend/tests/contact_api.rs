use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use site_backend::{
    build_router,
    repositories::contact_repository::{SkippedContactStore, LOCAL_SENTINEL_ID},
    utils::email_utils::{LogMailer, MailError, Mailer, OutgoingEmail},
    AppState,
};

struct DownMailer;

impl Mailer for DownMailer {
    fn send(&self, _email: OutgoingEmail) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async { Err(MailError::Send("connection refused".to_string())) })
    }
}

fn app(mailer: Arc<dyn Mailer>) -> Router {
    let state = Arc::new(AppState {
        contact_store: Arc::new(SkippedContactStore),
        mailer,
        contact_recipient: "inbox@example.com".to_string(),
    });
    build_router(state, vec![HeaderValue::from_static("https://site.example")])
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn valid_payload() -> Value {
    json!({
        "name": "Jane <b>Doe</b>",
        "email": "jane@example.com",
        "message": "Hello\n<script>",
        "consent": true,
        "newsletter": false,
    })
}

#[tokio::test]
async fn local_mode_returns_sentinel_id() {
    let (status, body) = send(
        app(Arc::new(LogMailer)),
        Method::POST,
        "/contactFormSubmit",
        Some(valid_payload()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["id"], json!(LOCAL_SENTINEL_ID));
    assert_eq!(
        body["message"],
        json!("Vielen Dank für Ihre Nachricht! Wir melden uns bald bei Ihnen.")
    );
}

#[tokio::test]
async fn english_submission_gets_english_thanks() {
    let mut payload = valid_payload();
    payload["language"] = json!("en");
    let (status, body) = send(
        app(Arc::new(LogMailer)),
        Method::POST,
        "/contactFormSubmit",
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        json!("Thank you for your message! We will get back to you soon.")
    );
}

#[tokio::test]
async fn broken_mail_transport_still_answers_200() {
    let (status, body) = send(
        app(Arc::new(DownMailer)),
        Method::POST,
        "/contactFormSubmit",
        Some(valid_payload()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn non_post_is_405() {
    let (status, body) = send(app(Arc::new(LogMailer)), Method::GET, "/contactFormSubmit", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"success": false, "error": "Method not allowed. Use POST."}));

    let (status, _) = send(app(Arc::new(LogMailer)), Method::PUT, "/contactFormSubmit", Some(valid_payload())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn validation_errors_are_400_with_reason() {
    let (status, body) = send(
        app(Arc::new(LogMailer)),
        Method::POST,
        "/contactFormSubmit",
        Some(json!({"name": "Jane", "email": "jane@example.com", "message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Missing required fields: name, email, message, consent"})
    );

    let (status, body) = send(
        app(Arc::new(LogMailer)),
        Method::POST,
        "/contactFormSubmit",
        Some(json!({"name": "Jane", "email": "jane.example.com", "message": "hi", "consent": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Invalid email format"}));
}

#[tokio::test]
async fn health_check_is_static() {
    let (status, body) = send(app(Arc::new(LogMailer)), Method::GET, "/apiHealthCheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["version"], json!("1.0.0"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn cors_preflight_allows_listed_origin_only() {
    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/contactFormSubmit")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app(Arc::new(LogMailer))
        .oneshot(preflight("https://site.example"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("https://site.example"))
    );

    let denied = app(Arc::new(LogMailer))
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
