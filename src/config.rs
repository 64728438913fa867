use anyhow::{bail, Context};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub seed_on_startup: bool,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_format: LogFormat,
    pub log_request_body: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8081".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            database_url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret,
            jwt_expiration_hours: get("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|| "24".to_string())
                .parse()
                .context("JWT_EXPIRATION_HOURS must be an integer")?,
            seed_on_startup: parse_bool(get("SEED_ON_STARTUP"), true)
                .context("SEED_ON_STARTUP must be true or false")?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS").and_then(|raw| parse_origins(&raw)),
            log_format,
            log_request_body: parse_bool(get("LOG_REQUEST_BODY"), false)
                .context("LOG_REQUEST_BODY must be true or false")?,
        })
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => bail!("invalid boolean '{}'", other),
        },
    }
}

fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let value = raw.trim();
    if value.is_empty() || value == "*" {
        return None;
    }

    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    (!origins.is_empty()).then_some(origins)
}
