//! HTTP receiver for producer webhooks.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use relay_core::{buffer_to_message_with, TracingDiagnostics};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::notify::Notifier;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/healthz", get(hello))
        .route("/hook", post(hook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello() -> &'static str {
    "hi."
}

/// POST /hook
///
/// Formats the body and forwards the message. Payloads that end up as an
/// empty message (`{}`) are accepted without sending anything.
async fn hook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, (StatusCode, String)> {
    let message = buffer_to_message_with(&body, &mut TracingDiagnostics).map_err(|e| {
        tracing::warn!(error = %e, bytes = body.len(), "could not format payload");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    if message.is_empty() {
        tracing::debug!("payload produced an empty message");
        return Ok(".");
    }

    state.notifier.send(&message).await.map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "could not send message");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
    })?;

    Ok(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use std::sync::Mutex;
    use tower::util::ServiceExt;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &str) -> Result<()> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _message: &str) -> Result<()> {
            anyhow::bail!("chat is down")
        }
    }

    fn post_hook(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/hook")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(body: Body) -> String {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let app = build_router(AppState::new(Arc::new(RecordingNotifier::default())));
        for uri in ["/", "/healthz"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response.into_body()).await, "hi.");
        }
    }

    #[tokio::test]
    async fn hook_forwards_formatted_message() {
        let notifier = Arc::new(RecordingNotifier::default());
        let app = build_router(AppState::new(notifier.clone()));

        let response = app
            .oneshot(post_hook(
                r#"{"eventType":"Grab","series":{"title":"Foo"},"episodes":[{"seasonNumber":1,"episodeNumber":2}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response.into_body()).await, ".");
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["Sonarr: Foo 1x02 - \"Grab\"\n".to_string()]
        );
    }

    #[tokio::test]
    async fn hook_rejects_unrenderable_payload() {
        let notifier = Arc::new(RecordingNotifier::default());
        let app = build_router(AppState::new(notifier.clone()));

        let response = app.oneshot(post_hook(r#"{"a":1}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response.into_body()).await.starts_with("decoding json to map"));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hook_skips_empty_message() {
        let notifier = Arc::new(RecordingNotifier::default());
        let app = build_router(AppState::new(notifier.clone()));

        let response = app.oneshot(post_hook("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hook_reports_delivery_failure() {
        let app = build_router(AppState::new(Arc::new(FailingNotifier)));

        let response = app.oneshot(post_hook(r#"{"b":"2","a":"1"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response.into_body()).await, "chat is down");
    }

    #[tokio::test]
    async fn hook_only_accepts_post() {
        let app = build_router(AppState::new(Arc::new(RecordingNotifier::default())));
        let request = Request::builder().uri("/hook").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
