//! Statsnap - GitHub and Cloudflare statistics snapshots
//!
//! A CLI tool that fetches account statistics from GraphQL APIs,
//! aggregates them, and writes flat JSON snapshot files.
//!
//! Exit codes:
//!   0 - All selected providers succeeded
//!   1 - Argument/config error, or at least one provider failed

mod cli;
mod client;
mod config;
mod models;
mod providers;
mod snapshot;

use anyhow::{anyhow, Context, Result};
use cli::{Args, ProviderKind};
use config::{Config, Credentials};
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Statsnap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the providers
    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .statsnap.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".statsnap.toml");

    if path.exists() {
        eprintln!("⚠️  .statsnap.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .statsnap.toml")?;

    println!("✅ Created .statsnap.toml with default settings.");
    println!("   Edit it to customize endpoints, limits, and the daily window.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run all selected providers concurrently. Returns exit code (0 or 1).
async fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Resolve credentials up front so a missing one fails before any fetch.
    let credentials = Credentials::from_env();

    let output_dir = PathBuf::from(&config.general.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let selected = dedupe_providers(args.providers.clone());
    println!(
        "📡 Running {} provider(s): {}",
        selected.len(),
        selected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Launch each provider as an independent task; a failure in one,
    // including a missing credential, never aborts a sibling.
    let mut tasks: Vec<(ProviderKind, JoinHandle<Result<()>>)> = Vec::new();
    let mut failures: Vec<(ProviderKind, anyhow::Error)> = Vec::new();
    for provider in selected {
        match spawn_provider(provider, &config, &credentials, output_dir.clone()) {
            Ok(handle) => tasks.push((provider, handle)),
            Err(e) => failures.push((provider, e)),
        }
    }

    failures.extend(join_providers(tasks).await);

    for (provider, e) in &failures {
        error!("{} provider failed: {:#}", provider, e);
        eprintln!("❌ {}: {:#}", provider, e);
    }

    if failures.is_empty() {
        println!("\n✅ All providers completed.");
        Ok(0)
    } else {
        Ok(1)
    }
}

/// Build one provider's query client and spawn its aggregation task.
///
/// A missing credential or bad client configuration errors here, before
/// any task has started fetching.
fn spawn_provider(
    provider: ProviderKind,
    config: &Config,
    credentials: &Credentials,
    output_dir: PathBuf,
) -> Result<JoinHandle<Result<()>>> {
    let max_connections = config.client.max_connections;
    let max_attempts = config.client.max_attempts;

    match provider {
        ProviderKind::Github => {
            let token = credentials.github_token()?;
            let client = client::QueryClient::new(
                config.github.endpoint.clone(),
                token,
                max_connections,
                max_attempts,
            )?;
            Ok(tokio::spawn(async move {
                providers::github::run(client, &output_dir).await
            }))
        }
        ProviderKind::Cloudflare => {
            let (token, account) = credentials.cloudflare()?;
            let client = client::QueryClient::new(
                config.cloudflare.endpoint.clone(),
                token,
                max_connections,
                max_attempts,
            )?;
            let account = account.to_string();
            let days = config.cloudflare.days;
            Ok(tokio::spawn(async move {
                providers::cloudflare::run(client, account, days, &output_dir).await
            }))
        }
    }
}

/// Wait for every provider task and collect the failures.
///
/// All tasks run to a terminal state; nothing is cancelled on the first
/// error. A panicked task is reported as a failure like any other.
async fn join_providers(
    tasks: Vec<(ProviderKind, JoinHandle<Result<()>>)>,
) -> Vec<(ProviderKind, anyhow::Error)> {
    let (names, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
    let outcomes = futures::future::join_all(handles).await;

    names
        .into_iter()
        .zip(outcomes)
        .filter_map(|(provider, outcome)| match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some((provider, e)),
            Err(join_error) => Some((provider, anyhow!("provider task panicked: {}", join_error))),
        })
        .collect()
}

/// Drop repeated provider selections, preserving first-seen order.
fn dedupe_providers(providers: Vec<ProviderKind>) -> Vec<ProviderKind> {
    let mut seen = Vec::new();
    for provider in providers {
        if !seen.contains(&provider) {
            seen.push(provider);
        }
    }
    seen
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .statsnap.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CloudflareStats;

    #[test]
    fn test_dedupe_providers_preserves_order() {
        let deduped = dedupe_providers(vec![
            ProviderKind::Cloudflare,
            ProviderKind::Github,
            ProviderKind::Cloudflare,
        ]);
        assert_eq!(deduped, vec![ProviderKind::Cloudflare, ProviderKind::Github]);
    }

    #[tokio::test]
    async fn test_join_providers_collects_each_outcome() {
        let tasks = vec![
            (
                ProviderKind::Github,
                tokio::spawn(async { Ok::<(), anyhow::Error>(()) }),
            ),
            (
                ProviderKind::Cloudflare,
                tokio::spawn(async { Err(anyhow!("no usage data")) }),
            ),
        ];

        let failures = join_providers(tasks).await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, ProviderKind::Cloudflare);
        assert!(failures[0].1.to_string().contains("no usage data"));
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_abort_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().to_path_buf();

        let tasks = vec![
            (
                ProviderKind::Github,
                tokio::spawn(async move {
                    snapshot::write(&output_dir, "github-stats.json", &CloudflareStats::default())?;
                    Ok(())
                }),
            ),
            (
                ProviderKind::Cloudflare,
                tokio::spawn(async { Err(anyhow!("boom")) }),
            ),
        ];

        let failures = join_providers(tasks).await;

        // The successful provider's snapshot landed even though its sibling failed.
        assert!(dir.path().join("github-stats.json").exists());
        assert_eq!(failures.len(), 1);
    }

    #[tokio::test]
    async fn test_join_providers_reports_panics() {
        let handle: JoinHandle<Result<()>> = tokio::spawn(async { panic!("unexpected") });
        let failures = join_providers(vec![(ProviderKind::Github, handle)]).await;
        assert_eq!(failures.len(), 1);
        assert!(failures[0].1.to_string().contains("panicked"));
    }
}
