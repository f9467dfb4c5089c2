use crate::error::{SubmitError, SubmitResult};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Endpoint key for the webhook generation call (required)
pub const GENERATE_ENDPOINT: &str = "generate";
/// Endpoint key used when the generate response carries no webhook
pub const FALLBACK_SUBMIT_ENDPOINT: &str = "fallbackSubmit";

/// Webhook submit - obtains a webhook and posts the selected SQL answer to it
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file with an [app] table
    #[arg(short = 'c', long, env = "WEBHOOK_SUBMIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Candidate name
    #[arg(long, env = "APP_NAME")]
    pub name: Option<String>,

    /// Registration number (its trailing digits pick the query)
    #[arg(long, env = "APP_REG_NO")]
    pub reg_no: Option<String>,

    /// Candidate email
    #[arg(long, env = "APP_EMAIL")]
    pub email: Option<String>,

    /// URL of the generate webhook endpoint
    #[arg(long, env = "APP_ENDPOINTS_GENERATE")]
    pub generate_url: Option<String>,

    /// Submit URL used when the generate response has no webhook
    #[arg(long, env = "APP_ENDPOINTS_FALLBACK_SUBMIT")]
    pub fallback_submit_url: Option<String>,

    /// Generate and select the query, but skip the submission
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    app: AppConfig,
}

/// Identity and endpoints for a run. Loaded once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub reg_no: String,

    #[serde(default)]
    pub email: String,

    /// Named endpoint URLs (`generate`, optionally `fallbackSubmit`)
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

impl AppConfig {
    /// Build the configuration from an optional file plus CLI/env overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration fails validation
    pub fn load(cli: &Cli) -> SubmitResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read an `[app]` table from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or not valid config TOML
    pub fn from_path(path: &Path) -> SubmitResult<Self> {
        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SubmitError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse an `[app]` table from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has unknown keys under `[app]`
    pub fn from_toml_str(contents: &str) -> SubmitResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.app)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(name) = &cli.name {
            self.name.clone_from(name);
        }
        if let Some(reg_no) = &cli.reg_no {
            self.reg_no.clone_from(reg_no);
        }
        if let Some(email) = &cli.email {
            self.email.clone_from(email);
        }
        if let Some(url) = &cli.generate_url {
            self.endpoints
                .insert(GENERATE_ENDPOINT.to_string(), url.clone());
        }
        if let Some(url) = &cli.fallback_submit_url {
            self.endpoints
                .insert(FALLBACK_SUBMIT_ENDPOINT.to_string(), url.clone());
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationMissing` without a generate endpoint and
    /// `InvalidConfig` for any endpoint that is not an http(s) URL
    pub fn validate(&self) -> SubmitResult<()> {
        self.generate_url()?;

        for (key, url) in &self.endpoints {
            validate_endpoint_url(url)
                .map_err(|reason| SubmitError::InvalidConfig(format!("endpoints.{key}: {reason}")))?;
        }

        for (field, value) in [
            ("name", &self.name),
            ("regNo", &self.reg_no),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                warn!("Identity field '{field}' is empty");
            }
        }

        Ok(())
    }

    /// URL of the generate endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationMissing` if the key is absent or blank
    pub fn generate_url(&self) -> SubmitResult<&str> {
        self.endpoint(GENERATE_ENDPOINT)
            .ok_or_else(|| SubmitError::ConfigurationMissing(GENERATE_ENDPOINT.to_string()))
    }

    #[must_use]
    pub fn fallback_submit_url(&self) -> Option<&str> {
        self.endpoint(FALLBACK_SUBMIT_ENDPOINT)
    }

    fn endpoint(&self, key: &str) -> Option<&str> {
        self.endpoints
            .get(key)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }
}

/// Check that an endpoint is an absolute http or https URL
///
/// # Errors
///
/// Returns a human-readable reason when the URL is rejected
pub fn validate_endpoint_url(url: &str) -> Result<(), String> {
    let parsed = Url::parse(url).map_err(|e| format!("'{url}' is not a valid URL: {e}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!(
            "'{url}' must use http or https, not {}",
            parsed.scheme()
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(format!("'{url}' has no host"));
    }

    Ok(())
}
