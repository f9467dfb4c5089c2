//! In-process webhook server shared by the integration tests.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use webhook_submit::config::{AppConfig, FALLBACK_SUBMIT_ENDPOINT, GENERATE_ENDPOINT};

/// Body served by `/elsewhere`, the target of any redirect
const REDIRECTED_GENERATE_BODY: &str = r#"{"webhook":"{base}/submit","accessToken":"t"}"#;

/// A request as seen by the fake webhook server
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    generate: (StatusCode, String),
    submit: (StatusCode, String),
    elsewhere: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn record(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, HeaderMap, String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.captured.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let (status, body) = match uri.path() {
        "/generate" => state.generate.clone(),
        "/elsewhere" => (StatusCode::OK, state.elsewhere.clone()),
        _ => state.submit.clone(),
    };

    let mut response_headers = HeaderMap::new();
    if status.is_redirection() {
        response_headers.insert(header::LOCATION, HeaderValue::from_static("/elsewhere"));
    }

    (status, response_headers, body)
}

pub struct FakeServer {
    pub base: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl FakeServer {
    /// `{base}` in the generate body is replaced with the server's own URL.
    /// A 3xx status on any route redirects to `/elsewhere`.
    pub async fn start(generate: (StatusCode, &str), submit: (StatusCode, &str)) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let captured = Arc::new(Mutex::new(Vec::new()));

        let state = ServerState {
            generate: (generate.0, generate.1.replace("{base}", &base)),
            submit: (submit.0, submit.1.to_string()),
            elsewhere: REDIRECTED_GENERATE_BODY.replace("{base}", &base),
            captured: captured.clone(),
        };

        let app = Router::new()
            .route("/generate", post(record))
            .route("/submit", post(record))
            .route("/fallback", post(record))
            .route("/elsewhere", post(record))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base, captured }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn config(&self, reg_no: &str) -> AppConfig {
        let mut config = AppConfig {
            name: "John Doe".to_string(),
            reg_no: reg_no.to_string(),
            email: "john@example.com".to_string(),
            ..AppConfig::default()
        };
        config
            .endpoints
            .insert(GENERATE_ENDPOINT.to_string(), self.url("/generate"));
        config
            .endpoints
            .insert(FALLBACK_SUBMIT_ENDPOINT.to_string(), self.url("/fallback"));
        config
    }
}
