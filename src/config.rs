//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.statsnap.toml` files, and resolving credentials from the process
//! environment.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Query client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// GitHub provider settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Cloudflare provider settings.
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory snapshot files are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Query client settings, shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Maximum concurrent in-flight requests per provider.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Total attempts per query before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_connections() -> usize {
    crate::client::DEFAULT_MAX_CONNECTIONS
}

fn default_max_attempts() -> usize {
    crate::client::DEFAULT_MAX_ATTEMPTS
}

/// GitHub provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// GraphQL endpoint URL.
    #[serde(default = "default_github_endpoint")]
    pub endpoint: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_github_endpoint(),
        }
    }
}

fn default_github_endpoint() -> String {
    "https://api.github.com/graphql".to_string()
}

/// Cloudflare provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// GraphQL endpoint URL.
    #[serde(default = "default_cloudflare_endpoint")]
    pub endpoint: String,

    /// How many recent days of analytics to sum.
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cloudflare_endpoint(),
            days: default_days(),
        }
    }
}

fn default_cloudflare_endpoint() -> String {
    "https://api.cloudflare.com/client/v4/graphql".to_string()
}

fn default_days() -> u32 {
    crate::providers::cloudflare::DEFAULT_DAYS
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".statsnap.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; optional
    /// arguments only override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.display().to_string();
        }
        if let Some(ref endpoint) = args.github_endpoint {
            self.github.endpoint = endpoint.clone();
        }
        if let Some(ref endpoint) = args.cloudflare_endpoint {
            self.cloudflare.endpoint = endpoint.clone();
        }
        if let Some(max_connections) = args.max_connections {
            self.client.max_connections = max_connections;
        }
        if let Some(max_attempts) = args.max_attempts {
            self.client.max_attempts = max_attempts;
        }
        if let Some(days) = args.days {
            self.cloudflare.days = days;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Credentials resolved from the process environment at startup and passed
/// explicitly into each provider's query client.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub cloudflare_token: Option<String>,
    pub cloudflare_account: Option<String>,
}

impl Credentials {
    /// Read `GH_TOKEN`, `CF_TOKEN`, and `CF_ACCOUNT`. Empty values count
    /// as unset.
    pub fn from_env() -> Self {
        fn non_empty(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        Self {
            github_token: non_empty("GH_TOKEN"),
            cloudflare_token: non_empty("CF_TOKEN"),
            cloudflare_account: non_empty("CF_ACCOUNT"),
        }
    }

    /// The GitHub token; missing is a fatal configuration error.
    pub fn github_token(&self) -> Result<&str> {
        match self.github_token.as_deref() {
            Some(token) => Ok(token),
            None => bail!("GH_TOKEN is not set (required for the github provider)"),
        }
    }

    /// The Cloudflare token and account tag; either missing is a fatal
    /// configuration error.
    pub fn cloudflare(&self) -> Result<(&str, &str)> {
        match (
            self.cloudflare_token.as_deref(),
            self.cloudflare_account.as_deref(),
        ) {
            (Some(token), Some(account)) => Ok((token, account)),
            (None, _) => bail!("CF_TOKEN is not set (required for the cloudflare provider)"),
            (_, None) => bail!("CF_ACCOUNT is not set (required for the cloudflare provider)"),
        }
    }
}
