// Allow module inception - this is a common Rust pattern for protocol clients
#![allow(clippy::module_name_repetitions)]

use crate::config::AppConfig;
use crate::error::{SubmitError, SubmitResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of the generate webhook call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub name: String,
    pub reg_no: String,
    pub email: String,
}

impl From<&AppConfig> for GenerateRequest {
    fn from(config: &AppConfig) -> Self {
        Self {
            name: config.name.clone(),
            reg_no: config.reg_no.clone(),
            email: config.email.clone(),
        }
    }
}

/// Webhook and token issued by the generate call
///
/// Unknown fields are ignored; missing fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub webhook: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,
}

impl GenerateResponse {
    /// Webhook URL, if present and not blank
    #[must_use]
    pub fn webhook(&self) -> Option<&str> {
        non_blank(self.webhook.as_deref())
    }

    /// Access token, if present and not blank
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        non_blank(self.access_token.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Body of the submit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub final_query: String,
}

/// A JSON POST as handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPost {
    pub url: String,
    pub body: serde_json::Value,
    /// Raw `Authorization` header value, sent verbatim
    pub authorization: Option<String>,
}

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

/// Sends JSON POST requests
///
/// Implementations return any HTTP status as a reply; only failures to get
/// a response at all are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, request: JsonPost) -> SubmitResult<HttpReply>;
}

/// `reqwest` backed transport using the client's default timeouts
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised
    pub fn new() -> SubmitResult<Self> {
        // A 3xx must surface as a failed status, never re-POST elsewhere
        let client = reqwest::Client::builder()
            .user_agent(concat!("webhook-submit/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SubmitError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(&self, request: JsonPost) -> SubmitResult<HttpReply> {
        let transport_error = |e: reqwest::Error| SubmitError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(token) = &request.authorization {
            builder = builder.header(AUTHORIZATION, token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        debug!("POST {} -> {}", request.url, status);
        Ok(HttpReply { status, body })
    }
}

/// Client for the generate and submit webhooks
pub struct WebhookClient<T> {
    transport: T,
}

impl<T: WebhookTransport> WebhookClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Request a webhook URL and access token
    ///
    /// # Errors
    ///
    /// Returns `GenerateFailure` on a non-2xx status or an empty body,
    /// `MalformedResponse` if the body is not the expected JSON object, and
    /// `Transport` if no response was received
    pub async fn generate(
        &self,
        url: &str,
        request: &GenerateRequest,
    ) -> SubmitResult<GenerateResponse> {
        debug!("Requesting webhook from {}", url);

        let reply = self
            .transport
            .post_json(JsonPost {
                url: url.to_string(),
                body: serde_json::to_value(request)?,
                authorization: None,
            })
            .await?;

        if !reply.status.is_success() || reply.body.trim().is_empty() {
            return Err(SubmitError::GenerateFailure {
                status: reply.status,
                body: reply.body,
            });
        }

        // A literal `null` body is as good as an empty one
        let parsed: Option<GenerateResponse> = serde_json::from_str(&reply.body)
            .map_err(|e| SubmitError::MalformedResponse(format!("{e}: {}", reply.body)))?;

        parsed.ok_or(SubmitError::GenerateFailure {
            status: reply.status,
            body: reply.body,
        })
    }

    /// Post the final query to the submit URL
    ///
    /// The token, when present, is sent as the raw `Authorization` value.
    ///
    /// # Errors
    ///
    /// Returns `SubmitFailure` on a non-2xx status and `Transport` if no
    /// response was received
    pub async fn submit(
        &self,
        url: &str,
        access_token: Option<&str>,
        request: &SubmitRequest,
    ) -> SubmitResult<HttpReply> {
        debug!(
            "Submitting final query to {} (authorization: {})",
            url,
            access_token.is_some()
        );

        let reply = self
            .transport
            .post_json(JsonPost {
                url: url.to_string(),
                body: serde_json::to_value(request)?,
                authorization: access_token.map(str::to_string),
            })
            .await?;

        if !reply.status.is_success() {
            return Err(SubmitError::SubmitFailure {
                status: reply.status,
                body: reply.body,
            });
        }

        Ok(reply)
    }
}
