//! End-to-end idea generation against a local OpenAI-compatible stub

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use idea_agent::{ErrorKind, IdeaAgent, IdeaConfig};
use idea_llm::Credential;
use idea_llm::providers::OpenAIConfig;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type SeenAuth = Arc<Mutex<Vec<Option<String>>>>;

async fn chat_completions(State(seen): State<SeenAuth>, headers: HeaderMap) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = authorization.as_deref() == Some("Bearer sk-explicit");
    seen.lock().unwrap().push(authorization);

    let (status, body) = if authorized {
        (
            StatusCode::OK,
            json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "\n  Train a sparse mixture of tiny experts.  \n"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 30, "completion_tokens": 9}
            }),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Incorrect API key provided"}}),
        )
    };

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

async fn spawn_stub() -> (String, SeenAuth) {
    let seen = SeenAuth::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(Arc::clone(&seen));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), seen)
}

fn agent(api_base: &str, key: Option<&str>) -> IdeaAgent {
    let openai = OpenAIConfig::default()
        .with_api_base(api_base)
        .with_optional_api_key(key.map(Credential::new))
        .with_timeout(5);
    IdeaAgent::with_openai(openai, IdeaConfig::default()).unwrap()
}

#[tokio::test]
async fn returns_trimmed_idea_with_explicit_key() {
    let (base, seen) = spawn_stub().await;

    let idea = agent(&base, Some("sk-explicit"))
        .generate_idea("Beat the Long Range Arena average")
        .await
        .unwrap();

    assert_eq!(idea, "Train a sparse mixture of tiny experts.");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Some("Bearer sk-explicit".to_string())]
    );
}

#[tokio::test]
async fn rejected_key_degrades_to_error_string() {
    let (base, _) = spawn_stub().await;

    let text = agent(&base, Some("sk-wrong"))
        .generate_idea_text("Beat the Long Range Arena average")
        .await;

    assert_eq!(
        text,
        "[ERROR] Failed to generate idea: Incorrect API key provided"
    );
}

#[tokio::test]
async fn missing_key_fails_at_call_time_not_construction() {
    let (base, seen) = spawn_stub().await;

    let agent = agent(&base, None);
    let err = agent.generate_idea("anything").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(seen.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_error_string() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let agent = agent(&format!("http://{addr}/v1"), Some("sk-explicit"));
    let text = agent.generate_idea_text("anything").await;

    assert!(text.starts_with("[ERROR] Failed to generate idea: "));
    let err = agent.generate_idea("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
