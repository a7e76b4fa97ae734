use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const SEPARATOR: &str = "-------------------";
/// Typed at the prompt to expand the context of the last answer.
pub const SHOW_CONTEXT_COMMAND: &str = ":context";

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub context: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    kind: String,
    message: String,
}

#[derive(Error, Debug)]
pub enum AskError {
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Service error ({status}, {kind}): {message}")]
    Service {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("Could not reach the service: {0}")]
    Transport(String),
}

pub struct AskClient {
    client: Client,
    base_url: String,
}

impl AskClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AskError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AskError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, question: &str) -> Result<AskResponse, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        let response = self
            .client
            .post(format!("{}/ask", self.base_url))
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(service_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| AskError::Service {
            status: status.as_u16(),
            kind: "malformed_response".to_string(),
            message: e.to_string(),
        })
    }
}

/// Structured `{kind, message}` bodies are surfaced as-is; anything else
/// keeps the raw body as the message.
fn service_error(status: u16, body: &str) -> AskError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => AskError::Service {
            status,
            kind: error.kind,
            message: error.message,
        },
        Err(_) => AskError::Service {
            status,
            kind: "unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}

/// The answer with its context collapsed to a one-line summary.
pub fn render_answer(response: &AskResponse) -> String {
    let mut out = String::new();
    let answer = if response.answer.trim().is_empty() {
        "No answer found."
    } else {
        response.answer.as_str()
    };
    let _ = writeln!(out, "Answer:\n{}\n", answer);

    match response.context.len() {
        0 => {
            let _ = writeln!(out, "Relevant Context: none");
        }
        n => {
            let _ = writeln!(
                out,
                "Relevant Context: {} chunk{} (enter {} to show)",
                n,
                if n == 1 { "" } else { "s" },
                SHOW_CONTEXT_COMMAND
            );
        }
    }
    out
}

/// The expanded context, each chunk followed by a separator line.
pub fn render_context(response: &AskResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Relevant Context:");
    for context in &response.context {
        let _ = writeln!(out, "{}\n{}", context, SEPARATOR);
    }
    out
}

pub fn render_error(error: &AskError) -> String {
    match error {
        AskError::EmptyQuestion => error.to_string(),
        AskError::Service { kind, message, .. } if kind == "not_ready" => {
            format!("The service is not ready yet: {}", message)
        }
        AskError::Service { kind, message, .. } if kind == "invalid_input" => {
            format!("The question was rejected: {}", message)
        }
        AskError::Service { kind, message, .. } if kind == "upstream_provider_error" => {
            format!("The language model provider failed: {}", message)
        }
        AskError::Service { .. } => error.to_string(),
        AskError::Transport(_) => error.to_string(),
    }
}
