//! Run dispatch: submit a scenario to an AI-model backend
//!
//! One outbound request per invocation, a fixed model→endpoint map, and a
//! closed outcome taxonomy. The dispatcher never propagates a fault: every
//! failure path resolves to exactly one [`RunOutcome`] variant.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::scenario::Step;

#[cfg(test)]
mod tests;

/// Default request timeout, matching the backend's expected worst case.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The AI-model backends a scenario can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelId {
    Gpt4,
    Gwen3,
    Gemini,
    Llama32,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [
        ModelId::Gpt4,
        ModelId::Gwen3,
        ModelId::Gemini,
        ModelId::Llama32,
    ];

    /// Parse a model identifier as it appears in the UI and request body.
    pub fn parse(identifier: &str) -> Option<Self> {
        match identifier {
            "gpt_4" => Some(Self::Gpt4),
            "gwen_3" => Some(Self::Gwen3),
            "gemini" => Some(Self::Gemini),
            "llama_3_2" => Some(Self::Llama32),
            _ => None,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt_4",
            Self::Gwen3 => "gwen_3",
            Self::Gemini => "gemini",
            Self::Llama32 => "llama_3_2",
        }
    }

    /// Endpoint path for this model. The map is exhaustive; an unrecognized
    /// identifier never gets this far.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Self::Gpt4 => "/api/openRouter/gpt_4",
            Self::Gwen3 => "/api/ollama/gwen_3_06B",
            Self::Gemini => "/api/gemini_2_0Flash",
            Self::Llama32 => "/api/ollama/llama_3_2_3B",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Synchronously-detected precondition failures. Checked in order; the first
/// failure wins and no request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingGoal,
    MissingSteps,
    InvalidModel,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGoal => f.write_str("Please enter a test goal"),
            Self::MissingSteps => f.write_str("Please add at least one test step"),
            Self::InvalidModel => f.write_str("Invalid model selected"),
        }
    }
}

/// Classified result of a dispatch. Exhaustive and mutually exclusive: the
/// caller receives exactly one of these per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Backend returned 2xx
    Success(Value),
    /// A precondition failed; no request was issued
    Validation(ValidationError),
    /// No response within the timeout window
    Timeout,
    /// The connection could not be established
    NetworkUnreachable,
    /// Backend returned non-2xx
    ServerError { status: u16, message: String },
    /// The request was sent but the transport closed before any response
    /// arrived (no deadline fired)
    NoResponse,
    /// Anything else, including client-side request construction failures
    Unknown(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Human-readable description suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Success(_) => "Test executed successfully!".to_string(),
            Self::Validation(v) => v.to_string(),
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::NetworkUnreachable => {
                "Network error. Please check if the backend server is running.".to_string()
            }
            Self::ServerError { status, message } => {
                format!("Server error ({status}): {message}")
            }
            Self::NoResponse => "No response from server.".to_string(),
            Self::Unknown(description) => description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    model: &'a str,
    goal: &'a str,
    steps: Vec<&'a str>,
}

/// Dispatches scenarios to the configured backend.
///
/// Allows at most one concurrent dispatch per instance; there is no
/// cancellation primitive — once sent, a request runs to completion or
/// timeout.
pub struct RunDispatcher {
    client: Client,
    base_url: String,
    timeout: Duration,
    in_flight: Mutex<()>,
}

impl RunDispatcher {
    /// Create a dispatcher targeting `base_url` with the default timeout.
    /// No cookies or ambient credentials are ever attached.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            timeout,
            in_flight: Mutex::new(()),
        }
    }

    /// Whether a dispatch is currently outstanding. The presentation layer
    /// is expected to disable its trigger while this is true.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Submit a scenario for execution and classify the result.
    pub async fn dispatch(&self, model: &str, goal: &str, steps: &[Step]) -> RunOutcome {
        if goal.trim().is_empty() {
            return RunOutcome::Validation(ValidationError::MissingGoal);
        }
        if steps.is_empty() {
            return RunOutcome::Validation(ValidationError::MissingSteps);
        }
        let Some(model) = ModelId::parse(model) else {
            return RunOutcome::Validation(ValidationError::InvalidModel);
        };

        let _guard = self.in_flight.lock().await;

        let url = format!("{}{}", self.base_url, model.endpoint_path());
        let request = RunRequest {
            model: model.identifier(),
            goal,
            steps: steps.iter().map(|s| s.description.as_str()).collect(),
        };
        debug!(%model, %url, steps = steps.len(), "dispatching test run");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await;

        let outcome = match response {
            Ok(response) => classify_response(response).await,
            Err(e) => classify_transport_error(&e),
        };
        if !outcome.is_success() {
            warn!(%model, outcome = %outcome.user_message(), "test run failed");
        }
        outcome
    }
}

fn classify_transport_error(e: &reqwest::Error) -> RunOutcome {
    if e.is_timeout() {
        RunOutcome::Timeout
    } else if e.is_connect() {
        RunOutcome::NetworkUnreachable
    } else if e.is_builder() {
        RunOutcome::Unknown(format!("failed to build request: {e}"))
    } else if e.is_request() || e.is_body() {
        // Sent, connection established, transport closed without a response.
        RunOutcome::NoResponse
    } else {
        RunOutcome::Unknown(e.to_string())
    }
}

async fn classify_response(response: reqwest::Response) -> RunOutcome {
    let status = response.status();
    if status.is_success() {
        return match response.text().await {
            Ok(text) => {
                let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
                RunOutcome::Success(body)
            }
            Err(e) => RunOutcome::Unknown(format!("failed to read response body: {e}")),
        };
    }

    let status_text = status
        .canonical_reason()
        .unwrap_or("server error")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status_text
    } else {
        extract_error_message(&body)
    };
    RunOutcome::ServerError {
        status: status.as_u16(),
        message,
    }
}

/// Extract a display message from an error body, in priority order: a string
/// body, a `message` field, an `error` field, else the raw serialized body.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| value.get("error").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        // Plain text counts as a string body.
        Err(_) => body.to_string(),
    }
}
