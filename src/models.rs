//! Statistics records written to snapshot files.
//!
//! Each record is built once per run by a provider, then serialized and
//! never mutated. Wire names are camelCase; the language map is a
//! `BTreeMap` so its keys serialize in sorted order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregated GitHub account statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    /// Follower count.
    pub followers: u64,
    /// Issues opened by the account.
    pub issues: u64,
    /// Organization memberships.
    pub organizations: u64,
    /// Sum of commit, gist, issue, and discussion comments.
    pub comments: u64,
    /// Pull request review contributions.
    pub pull_request_reviews: u64,
    /// Commit contributions.
    pub commits: u64,
    /// Counters over directly-owned, non-fork repositories (gists fold
    /// their stars, forks, and file sizes into this group as well).
    pub repos: RepoStats,
    /// Pull request counters.
    pub prs: PrStats,
    /// Language name to byte size, summed across qualifying repositories
    /// and gist files.
    pub languages: BTreeMap<String, u64>,
    /// Capture time, integer seconds since the Unix epoch.
    pub captured_at: i64,
}

/// Repository counter group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub count: u64,
    pub issues: u64,
    pub stars: u64,
    pub forks: u64,
    pub watches: u64,
    pub pull_requests: u64,
    pub releases: u64,
    pub disk_usage: u64,
}

/// Pull request counter group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStats {
    pub total: u64,
    pub merged: u64,
    pub open: u64,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

/// Aggregated Cloudflare HTTP analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudflareStats {
    /// Unique visitors summed over the collected days.
    pub uniques: u64,
    /// HTTP requests summed over the collected days.
    pub requests: u64,
    /// Capture time, integer seconds since the Unix epoch.
    pub captured_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_stats_wire_names() {
        let mut stats = GithubStats::default();
        stats.pull_request_reviews = 3;
        stats.repos.disk_usage = 7;
        stats.prs.merged = 1;
        stats.languages.insert("Rust".to_string(), 100);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pullRequestReviews"], 3);
        assert_eq!(json["repos"]["diskUsage"], 7);
        assert_eq!(json["prs"]["merged"], 1);
        assert_eq!(json["languages"]["Rust"], 100);
        assert!(json.get("capturedAt").is_some());
    }

    #[test]
    fn test_language_map_sorted() {
        let mut stats = GithubStats::default();
        stats.languages.insert("Zig".to_string(), 1);
        stats.languages.insert("Ada".to_string(), 2);

        let keys: Vec<_> = stats.languages.keys().cloned().collect();
        assert_eq!(keys, vec!["Ada", "Zig"]);
    }
}
