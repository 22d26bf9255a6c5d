//! GitHub statistics provider.
//!
//! Issues one non-paginated profile query plus four paginated queries
//! (owned repositories, contributed repositories, pull requests, gists),
//! run concurrently, and folds the node lists into a [`GithubStats`]
//! record. Every field read is default-safe: a missing counter folds as
//! zero and a missing list folds as empty.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::client::path::{count, list, string};
use crate::client::QueryClient;
use crate::models::GithubStats;
use crate::snapshot;

/// Snapshot file name, overwritten on every run.
pub const OUTPUT_FILE: &str = "github-stats.json";

/// Fetch, aggregate, and persist GitHub statistics.
pub async fn run(client: QueryClient, output_dir: &Path) -> Result<()> {
    println!("🐙 Fetching GitHub statistics...");

    let stats = collect(&client).await?;
    let path = snapshot::write(output_dir, OUTPUT_FILE, &stats)
        .context("Failed to persist GitHub snapshot")?;

    info!("GitHub snapshot written to {}", path.display());
    println!(
        "   {} repos, {} pull requests, {} languages → {}",
        stats.repos.count,
        stats.prs.total,
        stats.languages.len(),
        path.display()
    );
    Ok(())
}

/// Run the query sequence and build the statistics record.
pub async fn collect(client: &QueryClient) -> Result<GithubStats> {
    let basic = client
        .execute("github/basic", &[])
        .await
        .context("Failed to fetch basic profile")?;

    let (owned, contributed, prs, gists) = tokio::try_join!(
        client.paginated("github/owner-repos", "data>viewer>repositories", &[]),
        client.paginated(
            "github/contributed-repos",
            "data>viewer>repositoriesContributedTo",
            &[],
        ),
        client.paginated("github/prs", "data>viewer>pullRequests", &[]),
        client.paginated("github/gists", "data>viewer>gists", &[]),
    )
    .context("Failed to paginate GitHub resources")?;

    let mut repos = owned;
    repos.extend(contributed);

    Ok(build_stats(
        &basic,
        &repos,
        &prs,
        &gists,
        Utc::now().timestamp(),
    ))
}

/// Fold the fetched node lists into one record.
fn build_stats(
    basic: &Value,
    repos: &[Value],
    prs: &[Value],
    gists: &[Value],
    captured_at: i64,
) -> GithubStats {
    let mut stats = GithubStats {
        followers: count(basic, "data>viewer>followers>totalCount"),
        issues: count(basic, "data>viewer>issues>totalCount"),
        organizations: count(basic, "data>viewer>organizations>totalCount"),
        comments: count(basic, "data>viewer>commitComments>totalCount")
            + count(basic, "data>viewer>gistComments>totalCount")
            + count(basic, "data>viewer>issueComments>totalCount")
            + count(basic, "data>viewer>repositoryDiscussionComments>totalCount"),
        pull_request_reviews: count(
            basic,
            "data>viewer>contributionsCollection>totalPullRequestReviewContributions",
        ),
        commits: count(
            basic,
            "data>viewer>contributionsCollection>totalCommitContributions",
        ),
        captured_at,
        ..GithubStats::default()
    };

    for repo in repos {
        fold_repo(&mut stats, repo);
    }
    for pr in prs {
        fold_pr(&mut stats, pr);
    }
    for gist in gists {
        fold_gist(&mut stats, gist);
    }

    stats
}

/// Fold one repository into the record.
///
/// Only directly-owned (viewer permission ADMIN), non-fork repositories
/// contribute to the repo counters and the language map.
fn fold_repo(stats: &mut GithubStats, repo: &Value) {
    let is_admin = string(repo, "viewerPermission") == Some("ADMIN");
    let is_fork = repo
        .get("isFork")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !is_admin || is_fork {
        return;
    }

    stats.repos.count += 1;
    stats.repos.issues += count(repo, "issues>totalCount");
    stats.repos.stars += count(repo, "stargazers>totalCount");
    stats.repos.forks += count(repo, "forks>totalCount");
    stats.repos.watches += count(repo, "watchers>totalCount");
    stats.repos.pull_requests += count(repo, "pullRequests>totalCount");
    stats.repos.releases += count(repo, "releases>totalCount");
    stats.repos.disk_usage += count(repo, "diskUsage");

    for edge in list(repo, "languages>edges") {
        if let Some(name) = string(edge, "node>name") {
            *stats.languages.entry(name.to_string()).or_insert(0) += count(edge, "size");
        }
    }
}

/// Fold one pull request into the record.
///
/// Every PR counts toward the total; OPEN and MERGED states get their own
/// counters, and merged PRs additionally accumulate commit and line counts.
fn fold_pr(stats: &mut GithubStats, pr: &Value) {
    stats.prs.total += 1;

    match string(pr, "state") {
        Some("OPEN") => stats.prs.open += 1,
        Some("MERGED") => {
            stats.prs.merged += 1;
            stats.prs.commits += count(pr, "commits>totalCount");
            stats.prs.additions += count(pr, "additions");
            stats.prs.deletions += count(pr, "deletions");
        }
        _ => {}
    }
}

/// Fold one gist into the record.
///
/// Gists share the repos bucket: their stars and forks add to the repo
/// counters, and each file's byte size adds to disk usage and, when the
/// file has a detected language, to the language map.
fn fold_gist(stats: &mut GithubStats, gist: &Value) {
    stats.repos.stars += count(gist, "stargazers>totalCount");
    stats.repos.forks += count(gist, "forks>totalCount");

    for file in list(gist, "files") {
        let size = count(file, "size");
        stats.repos.disk_usage += size;

        if let Some(name) = string(file, "language>name") {
            *stats.languages.entry(name.to_string()).or_insert(0) += size;
        }
    }
}
