//! Cloudflare analytics provider.
//!
//! Walks the most recent calendar days newest-first, issuing one query per
//! day, and sums unique visitors and request counts across every returned
//! usage group. The first day that comes back with no groups marks the end
//! of the available data and stops the walk; it is not an error.

use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::path::{count, list};
use crate::client::{QueryClient, QueryError};
use crate::models::CloudflareStats;
use crate::snapshot;

/// Snapshot file name, overwritten on every run.
pub const OUTPUT_FILE: &str = "cloudflare-stats.json";

/// Default size of the daily window.
pub const DEFAULT_DAYS: u32 = 30;

/// Path to the daily usage groups inside one query result.
const GROUPS_PATH: &str = "data>viewer>accounts>0>httpRequests1dGroups";

/// Fetch, aggregate, and persist Cloudflare statistics.
pub async fn run(client: QueryClient, account: String, days: u32, output_dir: &Path) -> Result<()> {
    println!("☁️  Fetching Cloudflare statistics...");

    let stats = collect(&client, &account, days).await?;
    let path = snapshot::write(output_dir, OUTPUT_FILE, &stats)
        .context("Failed to persist Cloudflare snapshot")?;

    info!("Cloudflare snapshot written to {}", path.display());
    println!(
        "   {} uniques, {} requests → {}",
        stats.uniques,
        stats.requests,
        path.display()
    );
    Ok(())
}

/// Query up to `days` recent days for `account` and sum the usage groups.
pub async fn collect(client: &QueryClient, account: &str, days: u32) -> Result<CloudflareStats> {
    let today = Utc::now().date_naive();

    let stats = accumulate_days(today, days, |date| {
        let date = date.format("%Y-%m-%d").to_string();
        async move {
            let result = client
                .execute(
                    "cloudflare/http",
                    &[("date", date.as_str()), ("account", account)],
                )
                .await?;
            Ok(list(&result, GROUPS_PATH).to_vec())
        }
    })
    .await
    .context("Failed to fetch Cloudflare analytics")?;

    Ok(stats)
}

/// Walk days newest-first from `start`, accumulating each day's groups.
///
/// Stops after `days` days or at the first day whose fetch returns no
/// groups, whichever comes first. Fetch errors abort the walk.
async fn accumulate_days<F, Fut>(
    start: NaiveDate,
    days: u32,
    mut fetch_day: F,
) -> Result<CloudflareStats, QueryError>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<Vec<Value>, QueryError>>,
{
    let mut stats = CloudflareStats::default();

    for offset in 0..days {
        let date = start - Duration::days(i64::from(offset));
        let groups = fetch_day(date).await?;

        if groups.is_empty() {
            debug!("no usage groups for {}, stopping", date);
            break;
        }

        for group in &groups {
            stats.uniques += count(group, "uniq>uniques");
            stats.requests += count(group, "sum>requests");
        }
    }

    stats.captured_at = Utc::now().timestamp();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn day_group(uniques: u64, requests: u64) -> Value {
        json!({ "uniq": { "uniques": uniques }, "sum": { "requests": requests } })
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_stops_at_first_empty_day() {
        let calls = Cell::new(0u32);

        let stats = tokio_test::block_on(accumulate_days(start(), 30, |_| {
            calls.set(calls.get() + 1);
            let day = calls.get();
            async move {
                if day <= 5 {
                    Ok(vec![day_group(10, 100)])
                } else {
                    Ok(vec![])
                }
            }
        }))
        .unwrap();

        // Five days summed; the sixth query returned empty and ended the
        // walk with no queries for days 7-30.
        assert_eq!(calls.get(), 6);
        assert_eq!(stats.uniques, 50);
        assert_eq!(stats.requests, 500);
    }

    #[test]
    fn test_walks_newest_first() {
        let dates = std::cell::RefCell::new(Vec::new());

        tokio_test::block_on(accumulate_days(start(), 3, |date| {
            dates.borrow_mut().push(date);
            async { Ok(vec![day_group(1, 1)]) }
        }))
        .unwrap();

        let expected: Vec<NaiveDate> = (0..3).map(|d| start() - Duration::days(d)).collect();
        assert_eq!(*dates.borrow(), expected);
    }

    #[test]
    fn test_window_caps_day_count() {
        let calls = Cell::new(0u32);

        let stats = tokio_test::block_on(accumulate_days(start(), 30, |_| {
            calls.set(calls.get() + 1);
            async { Ok(vec![day_group(2, 20)]) }
        }))
        .unwrap();

        assert_eq!(calls.get(), 30);
        assert_eq!(stats.uniques, 60);
        assert_eq!(stats.requests, 600);
    }

    #[test]
    fn test_multiple_groups_per_day_all_summed() {
        let stats = tokio_test::block_on(accumulate_days(start(), 1, |_| async {
            Ok(vec![day_group(3, 30), day_group(4, 40)])
        }))
        .unwrap();

        assert_eq!(stats.uniques, 7);
        assert_eq!(stats.requests, 70);
    }

    #[test]
    fn test_fetch_error_aborts_walk() {
        let result = tokio_test::block_on(accumulate_days(start(), 30, |_| async {
            Err(QueryError::RetriesExhausted {
                name: "cloudflare/http".to_string(),
                attempts: 25,
            })
        }));
        assert!(result.is_err());
    }
}
