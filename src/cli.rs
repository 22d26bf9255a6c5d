//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Statsnap - GitHub and Cloudflare statistics snapshots
///
/// Fetch account statistics from GraphQL APIs and write them as flat JSON
/// snapshot files. Providers run concurrently; one provider failing never
/// stops the others.
///
/// Credentials come from the environment: GH_TOKEN for GitHub, CF_TOKEN and
/// CF_ACCOUNT for Cloudflare.
///
/// Examples:
///   statsnap
///   statsnap --providers github,cloudflare --output-dir ./snapshots
///   statsnap --providers cloudflare --days 7
///   statsnap --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Providers to run (comma-separated)
    ///
    /// Values: github, cloudflare
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "github",
        value_name = "NAMES"
    )]
    pub providers: Vec<ProviderKind>,

    /// Directory to write snapshot files into
    ///
    /// Defaults to the working directory (or the config file setting).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// GitHub GraphQL endpoint URL
    #[arg(long, value_name = "URL", env = "GITHUB_GRAPHQL_URL")]
    pub github_endpoint: Option<String>,

    /// Cloudflare GraphQL endpoint URL
    #[arg(long, value_name = "URL", env = "CLOUDFLARE_GRAPHQL_URL")]
    pub cloudflare_endpoint: Option<String>,

    /// Maximum concurrent in-flight requests per provider
    #[arg(long, value_name = "COUNT")]
    pub max_connections: Option<usize>,

    /// Total attempts per query before giving up
    #[arg(long, value_name = "COUNT")]
    pub max_attempts: Option<usize>,

    /// How many recent days of Cloudflare analytics to sum
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .statsnap.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .statsnap.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// One external data source with its own queries, credential, and
/// output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    Github,
    Cloudflare,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Github => write!(f, "github"),
            ProviderKind::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.providers.is_empty() {
            return Err("At least one provider must be selected".to_string());
        }

        for endpoint in [&self.github_endpoint, &self.cloudflare_endpoint]
            .into_iter()
            .flatten()
        {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Endpoint URL must start with 'http://' or 'https://': {}",
                    endpoint
                ));
            }
        }

        if self.max_connections == Some(0) {
            return Err("Max connections must be at least 1".to_string());
        }

        if self.max_attempts == Some(0) {
            return Err("Max attempts must be at least 1".to_string());
        }

        if self.days == Some(0) {
            return Err("Days must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
