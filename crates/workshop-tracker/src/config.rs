//! Configuration for the workshop tracker

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml (every section is optional)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub functions: Option<FunctionsSection>,
    #[serde(default)]
    pub app: AppSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreSection {
    /// SQLite database path
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub bind: Option<String>,
    /// Allowed CORS origin (defaults to the frontend origin)
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Serverless functions endpoint (email trigger)
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionsSection {
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub frontend_origin: Option<String>,
    /// When set, profile emails must use this domain
    #[serde(default)]
    pub email_domain: Option<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (strings vs numbers)\n\
             - [functions] needs both base_url and api_key\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Email trigger endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Main configuration struct with resolved values
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub bind: String,
    pub cors_origin: String,
    /// None when no functions endpoint is configured (invites disabled)
    pub functions: Option<FunctionsConfig>,
    /// Used for links in outgoing emails
    pub frontend_origin: String,
    pub email_domain: Option<String>,
}

impl Config {
    /// Resolve file values, applying environment overrides via `lookup`
    pub fn resolve(file: &FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let frontend_origin = lookup("WORKSHOP_FRONTEND_ORIGIN")
            .or_else(|| file.app.frontend_origin.clone())
            .unwrap_or_else(|| constants::DEFAULT_FRONTEND_ORIGIN.to_string());

        let timeout = Duration::from_secs(
            file.functions
                .as_ref()
                .and_then(|f| f.timeout_secs)
                .unwrap_or(constants::DEFAULT_FUNCTIONS_TIMEOUT_SECS),
        );
        let base_url = lookup("WORKSHOP_FUNCTIONS_URL")
            .or_else(|| file.functions.as_ref().map(|f| f.base_url.clone()));
        let api_key = lookup("WORKSHOP_FUNCTIONS_KEY")
            .or_else(|| file.functions.as_ref().map(|f| f.api_key.clone()));
        let functions = match (base_url, api_key) {
            (Some(base_url), Some(api_key)) => Some(FunctionsConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
                timeout,
            }),
            _ => None,
        };

        Self {
            store_path: lookup("WORKSHOP_STORE_PATH")
                .or_else(|| file.store.path.clone())
                .unwrap_or_else(|| constants::DEFAULT_STORE_PATH.to_string())
                .into(),
            bind: lookup("WORKSHOP_BIND")
                .or_else(|| file.server.bind.clone())
                .unwrap_or_else(|| constants::DEFAULT_BIND.to_string()),
            cors_origin: file
                .server
                .cors_origin
                .clone()
                .unwrap_or_else(|| frontend_origin.clone()),
            functions,
            frontend_origin,
            email_domain: file.app.email_domain.clone(),
        }
    }

    /// Load `.env`, the config file (if present) and the process environment
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();
        let file = FileConfig::load_or_default(path)?;
        Ok(Self::resolve(&file, |key| std::env::var(key).ok()))
    }
}
