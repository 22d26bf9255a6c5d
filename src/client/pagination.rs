//! Cursor-based pagination over node-returning queries.
//!
//! GraphQL connections come back as
//! `{nodes: [...], pageInfo: {hasNextPage, endCursor}}`. This module
//! normalizes one query result into a [`Page`] and drives the
//! fetch-next-page loop over a caller-supplied closure, so the loop itself
//! can be exercised without any HTTP transport.

use std::future::Future;

use serde_json::Value;

use super::path;
use super::QueryError;

/// One page of a paginated result.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Nodes returned by this page, in API order.
    pub nodes: Vec<Value>,
    /// Cursor for the next page, if the API reported one.
    pub next_cursor: Option<String>,
}

/// Extract a [`Page`] from a query result.
///
/// `connection_path` addresses the connection object inside the result
/// (e.g. `data>viewer>repositories`). Extraction is lenient: a missing
/// connection or missing `nodes` yields an empty page, and a missing or
/// false `hasNextPage` ends pagination.
pub fn extract_page(result: &Value, connection_path: &str) -> Page {
    let connection = path::lookup(result, connection_path);

    let nodes = connection
        .and_then(|c| c.get("nodes"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let page_info = connection.and_then(|c| c.get("pageInfo"));
    let has_next = page_info
        .and_then(|info| info.get("hasNextPage"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let next_cursor = if has_next {
        page_info
            .and_then(|info| info.get("endCursor"))
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };

    Page { nodes, next_cursor }
}

/// Follow a cursor chain, collecting every node in page arrival order.
///
/// `fetch_page` is called with `None` for the first page, then with the
/// cursor from the previous page until a page reports no continuation.
/// Pages are fetched strictly sequentially; there is no page cap, so an
/// endpoint that never clears its cursor paginates forever.
pub async fn follow_cursor<F, Fut>(mut fetch_page: F) -> Result<Vec<Value>, QueryError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page, QueryError>>,
{
    let mut nodes = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch_page(cursor.take()).await?;
        nodes.extend(page.nodes);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(nodes)
}
