pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::coaching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Coaching API
        .route(
            "/api/v1/coaching-sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/coaching-sessions/health",
            get(handlers::handle_coaching_health),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::coaching::parser::replies::{learning_reply, questions_reply};
    use crate::coaching::service::testing::{is_question_prompt, service_for};
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedBackend;

    fn app(backend: ScriptedBackend) -> Router {
        build_router(AppState {
            coach: Arc::new(service_for(Arc::new(backend))),
            config: Config::for_tests(),
        })
    }

    fn working_oracle() -> ScriptedBackend {
        ScriptedBackend::new(|request, _| {
            if is_question_prompt(request) {
                Ok(questions_reply())
            } else {
                Ok(learning_reply())
            }
        })
    }

    fn resume_body() -> Value {
        json!({
            "career_summary": "3년차 백엔드 개발자, Spring Boot/MSA/Python 기반 커머스 서비스 개발",
            "job_duties": "주문 및 결제 시스템 MSA 전환 프로젝트 리딩, Python 기반 데이터 배치 처리 시스템 구축",
            "technical_skills": ["Spring Boot", "MSA", "Python", "AWS EC2", "MySQL"]
        })
    }

    fn post_session(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = app(working_oracle()).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_root_banner() {
        let response = app(working_oracle()).oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Career Coach API is running!");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["health"], "/health");
    }

    #[tokio::test]
    async fn test_create_session_returns_201_with_session() {
        let response = app(working_oracle())
            .oneshot(post_session("/api/v1/coaching-sessions?optimize=false", &resume_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(body["session_id"].is_string());
        assert_eq!(body["interview_questions"].as_array().unwrap().len(), 5);
        assert!(!body["learning_path"]["steps"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_session_defaults_to_optimized_mode() {
        let backend = Arc::new(working_oracle());
        let app = build_router(AppState {
            coach: Arc::new(service_for(backend.clone())),
            config: Config::for_tests(),
        });

        let response = app
            .oneshot(post_session("/api/v1/coaching-sessions", &resume_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(backend.call_count(), 18);
    }

    #[tokio::test]
    async fn test_invalid_resume_is_422() {
        let mut body = resume_body();
        body["career_summary"] = json!("short");

        let response = app(working_oracle())
            .oneshot(post_session("/api/v1/coaching-sessions", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("career_summary"));
    }

    #[tokio::test]
    async fn test_empty_skill_list_is_422() {
        let mut body = resume_body();
        body["technical_skills"] = json!([]);

        let response = app(working_oracle())
            .oneshot(post_session("/api/v1/coaching-sessions", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_body_missing_fields_is_422_envelope() {
        let response = app(working_oracle())
            .oneshot(post_raw(
                "/api/v1/coaching-sessions",
                r#"{"career_summary": "3년차 개발자"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("job_duties"));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_422_envelope() {
        let response = app(working_oracle())
            .oneshot(post_raw(
                "/api/v1/coaching-sessions",
                r#"{"career_summary": "#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_oracle_is_503() {
        let backend =
            ScriptedBackend::new(|_, _| Ok(questions_reply())).with_latency(Duration::from_secs(600));

        let response = app(backend)
            .oneshot(post_session("/api/v1/coaching-sessions?optimize=false", &resume_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"]["code"], "LLM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_coaching_health_reflects_oracle() {
        let healthy = ScriptedBackend::new(|_, _| Ok("HEALTHY".to_string()));
        let response = app(healthy)
            .oneshot(get_request("/api/v1/coaching-sessions/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");

        let silent = ScriptedBackend::new(|_, _| Ok("hello".to_string()));
        let response = app(silent)
            .oneshot(get_request("/api/v1/coaching-sessions/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "unhealthy");
    }
}
