//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Public origin used in absolute API links (default: http://localhost:{port}).
    pub site_url: String,

    /// Path prefix the REST routes are served under (default: /wp-json).
    ///
    /// Normalized to one leading slash and no trailing slash; empty serves
    /// routes at the root.
    pub api_prefix: String,

    /// Localization domain of the demo definitions (default: "default").
    pub text_domain: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let api_prefix = env::var("API_PREFIX").unwrap_or_else(|_| "/wp-json".to_string());

        let text_domain = env::var("TEXT_DOMAIN").unwrap_or_else(|_| "default".to_string());
        if text_domain.trim().is_empty() {
            anyhow::bail!("TEXT_DOMAIN must not be blank");
        }

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            site_url: site_url.trim_end_matches('/').to_string(),
            api_prefix: normalize_prefix(&api_prefix),
            text_domain: text_domain.trim().to_string(),
            cors_allowed_origins,
        })
    }

    /// Absolute URL of the API root.
    pub fn api_root(&self) -> String {
        format!("{}{}", self.site_url, self.api_prefix)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            site_url: "http://localhost:3000".to_string(),
            api_prefix: "/wp-json".to_string(),
            text_domain: "default".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
