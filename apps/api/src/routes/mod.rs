pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::builder::handlers as builder;
use crate::state::AppState;
use crate::tools::handlers as tools;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Builder API
        .route("/api/v1/builder/sessions", post(builder::handle_create_session))
        .route("/api/v1/builder/sessions/:id", get(builder::handle_get_session))
        .route(
            "/api/v1/builder/sessions/:id/answer",
            post(builder::handle_answer),
        )
        .route(
            "/api/v1/builder/sessions/:id/option",
            post(builder::handle_option),
        )
        .route(
            "/api/v1/builder/sessions/:id/upload",
            post(builder::handle_upload),
        )
        .route(
            "/api/v1/builder/sessions/:id/photo",
            post(builder::handle_photo),
        )
        .route("/api/v1/portfolio/:id", get(builder::handle_get_portfolio))
        // Career tools
        .route("/api/v1/tools/cover-letter", post(tools::handle_cover_letter))
        .route("/api/v1/tools/optimize", post(tools::handle_optimize))
        .route(
            "/api/v1/tools/interview/questions",
            post(tools::handle_interview_questions),
        )
        .route(
            "/api/v1/tools/interview/evaluate",
            post(tools::handle_interview_evaluate),
        )
        .route("/api/v1/tools/coach", post(tools::handle_coach))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::builder::parser::{DocumentKind, ParseFailure, ResumeParser, UploadedFile};
    use crate::builder::session::SessionLock;
    use crate::config::Config;
    use crate::kv::MemoryStore;
    use crate::llm_client::LlmClient;

    struct FixedParser;

    #[async_trait]
    impl ResumeParser for FixedParser {
        async fn parse(&self, _file: &UploadedFile, _kind: DocumentKind) -> Result<Value, ParseFailure> {
            Ok(json!({
                "personalInfo": {"name": "Ava Lee", "title": "Data Engineer", "email": "ava@example.org"},
                "skills": ["Python", "SQL", "Docker"]
            }))
        }
    }

    fn app() -> Router {
        app_with_store(Arc::new(MemoryStore::new()))
    }

    fn app_with_store(store: Arc<MemoryStore>) -> Router {
        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            redis_url: None,
            port: 0,
            rust_log: "info".to_string(),
            parse_timeout: Duration::from_secs(5),
            llm_timeout: Duration::from_secs(1),
            max_upload_bytes: 1024 * 1024,
        };
        let state = AppState {
            llm: LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout).unwrap(),
            config,
            store,
            parser: Arc::new(FixedParser),
        };
        build_router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(uri: &str, file_name: &str, media_type: &str, content: &[u8]) -> Request<Body> {
        let boundary = "folio-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {media_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Request::post(uri)
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/builder/sessions", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/builder/sessions/{id}/option"),
                json!({"option": "Enter Data Manually"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "awaiting_answer");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["path"], "personalInfo.profilePhoto");
        assert_eq!(messages[1]["inputKind"], "file");

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/builder/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_action_on_busy_session_is_conflict() {
        let store = Arc::new(MemoryStore::new());
        let app = app_with_store(store.clone());
        let id = create_session(&app).await;
        let uri = format!("/api/v1/builder/sessions/{id}/option");
        let manual = json!({"option": "Enter Data Manually"});

        let session_id = id.parse::<uuid::Uuid>().unwrap();
        let held = SessionLock::acquire(store.as_ref(), session_id, Duration::from_secs(60))
            .await
            .unwrap();
        let response = app.clone().oneshot(post_json(&uri, manual.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The rejected action left the session untouched.
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/builder/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "idle");

        held.release().await;
        let response = app.oneshot(post_json(&uri, manual)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_answer_for_wrong_path_is_conflict() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .oneshot(post_json(
                &format!("/api/v1/builder/sessions/{id}/answer"),
                json!({"path": "personalInfo.name", "value": "Ava"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let response = app()
            .oneshot(
                Request::get(format!("/api/v1/builder/sessions/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_then_approve_publishes_portfolio() {
        let app = app();
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(multipart(
                &format!("/api/v1/builder/sessions/{id}/upload"),
                "ava.pdf",
                "application/pdf",
                b"%PDF-1.4",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "awaiting_answer");

        // Answer or skip until the review appears.
        let mut status = body["status"].as_str().unwrap().to_string();
        let mut last = body["messages"].as_array().unwrap().last().unwrap().clone();
        while status == "awaiting_answer" {
            let response = app
                .clone()
                .oneshot(post_json(
                    &format!("/api/v1/builder/sessions/{id}/option"),
                    json!({"option": "Skip this field"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "skipping {}", last["path"]);
            let body = json_body(response).await;
            status = body["status"].as_str().unwrap().to_string();
            last = body["messages"].as_array().unwrap().last().unwrap().clone();
        }
        assert_eq!(status, "reviewing");

        let portfolio_uri = format!("/api/v1/portfolio/{id}");
        let response = app
            .clone()
            .oneshot(Request::get(&portfolio_uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/builder/sessions/{id}/option"),
                json!({"option": "Looks good"}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "complete");
        assert_eq!(body["record"]["personalInfo"]["name"], "Ava Lee");

        let response = app
            .oneshot(Request::get(&portfolio_uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = json_body(response).await;
        assert_eq!(record["fileName"], "ava.pdf");
        assert_eq!(record["skills"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_upload_type_is_rejected() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .oneshot(multipart(
                &format!("/api/v1/builder/sessions/{id}/upload"),
                "notes.txt",
                "text/plain",
                b"hello",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tool_input_is_validated_before_calling_out() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/tools/cover-letter",
                json!({"job_description": "Data Engineer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(post_json("/api/v1/tools/interview/questions", json!({"role": " "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(post_json("/api/v1/tools/coach", json!({"messages": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
