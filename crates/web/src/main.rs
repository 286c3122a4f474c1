use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chess_strategist_core::{LlmConfig, StrategyService};

mod config;
mod error;
mod routes;

use config::ServerConfig;

pub struct AppState {
    pub service: StrategyService,
}

fn app(state: Arc<AppState>, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!("CORS_ORIGIN '{cors_origin}' is not a valid header; allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods(Any)
    .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/analyze", post(routes::strategy::analyze))
        .route("/analyze-strategy", post(routes::strategy::analyze_strategy))
        .route(
            "/analyze-single-strategy",
            post(routes::strategy::analyze_single_strategy),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    let llm = LlmConfig::from_env().expect("Failed to load language model configuration");
    tracing::info!(
        "Drafting with {}, verifying with {}",
        llm.narrator.model,
        llm.verifier.model
    );

    let service = StrategyService::from_config(llm).expect("Failed to build strategy service");
    let state = Arc::new(AppState { service });

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Server running at http://{addr}");

    axum::serve(listener, app(state, &config.cors_origin))
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chess_strategist_core::{Services, TextGenerator};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct Canned(Mutex<VecDeque<String>>);

    impl Canned {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self(Mutex::new(
                replies.iter().map(|r| r.to_string()).collect(),
            )))
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn complete(&self, _system: &str, _user: &str) -> chess_strategist_core::Result<String> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| chess_strategist_core::Error::Llm("no reply left".to_string()))
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    const DRAFT: &str = "Strategic Goal\nWin the d-file.\n- Double rooks on d1";
    const VALID: &str = r#"{"verdict": "valid", "issues": []}"#;

    fn test_app(narrator: &[&str], verifier: &[&str]) -> Router {
        let services = Services::new(Canned::new(narrator), Canned::new(verifier));
        let service = StrategyService::new(services).unwrap();
        app(Arc::new(AppState { service }), "http://localhost:5173")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(&[], &[])
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_single_strategy() {
        let response = test_app(&[DRAFT], &[VALID])
            .oneshot(post_json(
                "/analyze-single-strategy",
                r#"{"gameId": "ui-analysis", "fen": "", "moves": "1. d4 d5 2. c4", "side": "white"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["summary"],
            "**Strategic Goal:**\nWin the d-file.\n\n**Roadmap of Specific Ideas:**\n- Double rooks on d1"
        );
    }

    #[tokio::test]
    async fn test_illegal_move_is_bad_request() {
        let response = test_app(&[DRAFT], &[VALID])
            .oneshot(post_json(
                "/analyze-single-strategy",
                r#"{"moves": "1. e4 e5 2. Qh9", "side": "white"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().starts_with("Illegal move 'Qh9'"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_server_error() {
        let response = test_app(&[], &[])
            .oneshot(post_json("/analyze", r#"{"moves": "1. e4", "side": "black"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("no reply left"));
    }

    #[tokio::test]
    async fn test_full_analysis_fields() {
        let response = test_app(&[DRAFT], &[VALID])
            .oneshot(post_json("/analyze", r#"{"moves": "1. e4 e5", "side": "black"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["structureInsights"].as_array().unwrap().len(), 2);
        assert_eq!(body["finalNarrative"], DRAFT);
        assert_eq!(body["verification"]["verdict"], "valid");
        assert!(body["positionFeatures"].is_null());
    }

    #[tokio::test]
    async fn test_batch_strategy() {
        let response = test_app(&[DRAFT, "Recurring: the d-file."], &[VALID])
            .oneshot(post_json(
                "/analyze-strategy",
                r#"{"positions": [{"gameId": "g1", "fen": "", "moves": "1. d4", "side": "white"}]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["aggregated_summary"], "Recurring: the d-file.");
        assert_eq!(body["per_game_summaries"][0]["game_id"], "g1");
    }
}
