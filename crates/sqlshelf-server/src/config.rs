use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use sqlshelf_api::assistant::{AssistantConfig, DEFAULT_BASE_URL, DEFAULT_MODELS};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-super-secret-key-that-should-be-in-an-env-file",
];

#[derive(Debug)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl: chrono::Duration,
    pub public_url: Option<String>,
    pub assistant: Option<AssistantConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` so tests can supply their own variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("SQLSHELF_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SQLSHELF_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = lookup("SQLSHELF_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("SQLSHELF_PORT must be a port number")?;

        let ttl_minutes: i64 = match lookup("SQLSHELF_TOKEN_TTL_MINUTES") {
            Some(v) => v.parse().context("SQLSHELF_TOKEN_TTL_MINUTES must be an integer")?,
            None => 60,
        };
        if ttl_minutes <= 0 {
            bail!("SQLSHELF_TOKEN_TTL_MINUTES must be positive");
        }

        let assistant = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| {
                let models = lookup("SQLSHELF_AI_MODELS")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|m| !m.is_empty())
                            .map(String::from)
                            .collect::<Vec<_>>()
                    })
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

                AssistantConfig {
                    api_key,
                    base_url: lookup("SQLSHELF_AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
                    models,
                    timeout: Duration::from_secs(30),
                }
            });

        Ok(Self {
            jwt_secret,
            db_path: lookup("SQLSHELF_DB_PATH").unwrap_or_else(|| "sqlshelf.db".into()).into(),
            host: lookup("SQLSHELF_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            token_ttl: chrono::Duration::minutes(ttl_minutes),
            public_url: lookup("SQLSHELF_PUBLIC_URL").filter(|u| !u.trim().is_empty()),
            assistant,
        })
    }
}
