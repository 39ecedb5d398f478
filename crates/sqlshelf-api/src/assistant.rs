//! Stateless proxy to a generative-language API that explains, fixes or
//! writes SQL. Nothing it does touches the store.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sqlshelf_types::api::{AssistRequest, AssistResponse, Claims};

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::state::AppState;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro",
    "gemini-pro",
    "gemini-1.0-pro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistAction {
    Explain,
    Fix,
    Generate,
}

impl FromStr for AssistAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "explain" => Ok(Self::Explain),
            "fix" => Ok(Self::Fix),
            "generate" => Ok(Self::Generate),
            _ => Err(AppError::NotFound),
        }
    }
}

/// Builds the upstream prompt. `explain` and `fix` need `query`; `generate` needs `text`.
pub fn build_prompt(action: AssistAction, req: &AssistRequest) -> Result<String> {
    let field = |name: &str, value: &Option<String>| -> Result<String> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(AppError::validation(format!("{} is required", name))),
        }
    };

    Ok(match action {
        AssistAction::Explain => format!(
            "Explain this SQL query in plain, concise English:\n\n{}",
            field("query", &req.query)?
        ),
        AssistAction::Fix => format!(
            "Fix any syntax errors in this SQL query and return ONLY the corrected SQL code. \
             Do not include any explanation or markdown formatting:\n\n{}",
            field("query", &req.query)?
        ),
        AssistAction::Generate => format!(
            "Generate a valid SQL query based on this description. Return ONLY the SQL code. \
             Do not include any explanation or markdown formatting:\n\n{}",
            field("text", &req.text)?
        ),
    })
}

/// Trims the model output and unwraps a surrounding ```sql / ``` fence.
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.strip_prefix("sql").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.strip_suffix('\n').unwrap_or(rest).trim().to_string()
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    /// Tried in order until one answers.
    pub models: Vec<String>,
    pub timeout: Duration,
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct Assistant {
    http: reqwest::Client,
    config: Arc<AssistantConfig>,
}

// -- Upstream wire format --

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl Assistant {
    pub fn new(config: AssistantConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub async fn run(&self, action: AssistAction, req: &AssistRequest) -> Result<String> {
        let prompt = build_prompt(action, req)?;
        self.complete(&prompt).await
    }

    /// Sends `prompt` to each configured model in turn; the first usable answer wins.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut last_error = String::from("no models configured");

        for model in &self.config.models {
            match self.call_model(model, prompt).await {
                Ok(text) => {
                    debug!("AI answer from {}", model);
                    return Ok(strip_code_fence(&text));
                }
                Err(e) => {
                    warn!("AI model {} failed: {:#}", model, e);
                    last_error = format!("{}: {:#}", model, e);
                }
            }
        }

        Err(AppError::Upstream(last_error))
    }

    async fn call_model(&self, model: &str, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.trim())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("status {}", status);
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("response had no candidate text"))
    }
}

/// POST /api/ai/{action}
pub async fn assist(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Extension(_claims): Extension<Claims>,
    AppJson(req): AppJson<AssistRequest>,
) -> Result<Json<AssistResponse>> {
    let action: AssistAction = action.parse()?;
    let assistant = state.assistant.as_ref().ok_or(AppError::AssistantDisabled)?;

    let result = assistant.run(action, &req).await?;
    Ok(Json(AssistResponse { result }))
}
