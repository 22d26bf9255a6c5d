//! Snapshot file writing.
//!
//! Each provider persists its record as a single flat JSON document with
//! deterministically sorted keys, overwriting any prior file at the same
//! path on every run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize `record` and write it to `file_name` under `output_dir`.
///
/// The record is routed through `serde_json::Value`, whose object type is
/// backed by a `BTreeMap`, so keys come out sorted regardless of struct
/// field order. Returns the written path.
pub fn write<T: Serialize>(output_dir: &Path, file_name: &str, record: &T) -> Result<PathBuf> {
    let value = serde_json::to_value(record).context("Failed to serialize snapshot record")?;
    let body = serde_json::to_string(&value).context("Failed to encode snapshot JSON")?;

    let path = output_dir.join(file_name);
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GithubStats;

    #[test]
    fn test_write_sorted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = GithubStats::default();
        stats.followers = 5;

        let path = write(dir.path(), "github-stats.json", &stats).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();

        // capturedAt < comments < commits < followers: sorted, not field order.
        let captured = body.find("capturedAt").unwrap();
        let comments = body.find("comments").unwrap();
        let followers = body.find("followers").unwrap();
        assert!(captured < comments && comments < followers);

        let parsed: GithubStats = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, stats);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github-stats.json");
        std::fs::write(&path, "stale").unwrap();

        write(dir.path(), "github-stats.json", &GithubStats::default()).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with('{'));
        assert!(!body.contains("stale"));
    }
}
