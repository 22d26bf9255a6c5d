//! GraphQL query client.
//!
//! Executes named, parameterized queries against one endpoint with bounded
//! concurrency and automatic retry on accepted-but-not-ready responses, and
//! provides cursor-based pagination over node-returning queries.
//!
//! One client owns one HTTP session (connection pool) and one concurrency
//! limiter; both are shared across every call made through that client.

pub mod pagination;
pub mod path;
pub mod templates;

use std::future::Future;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default cap on simultaneous in-flight requests per client.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Default total attempts per query before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 25;

/// Errors surfaced by the query client.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The named template is not in the registry. Fatal, never retried.
    #[error("unknown query template: {0}")]
    UnknownTemplate(String),

    /// The credential cannot be encoded into a request header.
    #[error("credential contains characters not valid in a request header")]
    InvalidCredential,

    /// The HTTP transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was present but not valid JSON.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint never produced a usable response within the retry budget.
    ///
    /// This is a hard error rather than a silent null, so downstream
    /// aggregation can never mistake an unavailable result for zeros.
    #[error("query '{name}' still not ready after {attempts} attempts")]
    RetriesExhausted { name: String, attempts: usize },
}

/// Client for one GraphQL endpoint.
pub struct QueryClient {
    endpoint: String,
    http: reqwest::Client,
    limiter: Arc<Semaphore>,
    max_attempts: usize,
}

impl QueryClient {
    /// Create a client for `endpoint` authenticated with a bearer token.
    ///
    /// `max_connections` bounds simultaneous in-flight requests;
    /// `max_attempts` is the total retry budget per query.
    pub fn new(
        endpoint: impl Into<String>,
        token: &str,
        max_connections: usize,
        max_attempts: usize,
    ) -> Result<Self, QueryError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| QueryError::InvalidCredential)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
            limiter: Arc::new(Semaphore::new(max_connections.max(1))),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Execute a named query with `$name` placeholder substitution.
    ///
    /// Retries the whole request while the endpoint answers with HTTP
    /// 202/204 or a null/empty body; any other decoded JSON body is the
    /// result. A missing template fails immediately.
    pub async fn execute(
        &self,
        template_name: &str,
        variables: &[(&str, &str)],
    ) -> Result<Value, QueryError> {
        let template = templates::lookup(template_name)
            .ok_or_else(|| QueryError::UnknownTemplate(template_name.to_string()))?;
        let query = templates::render(template, variables);

        with_retries(self.max_attempts, template_name, || self.send_once(&query)).await
    }

    /// Run a paginated query, following the connection's cursor chain and
    /// returning every node in page arrival order.
    ///
    /// `connection_path` addresses the connection object inside each result
    /// (e.g. `data>viewer>repositories`). The `$cursor` placeholder is
    /// substituted with `after: "<cursor>"` on continuation pages and with
    /// an empty string on the first page. `extra` variables are substituted
    /// on every page.
    pub async fn paginated(
        &self,
        template_name: &str,
        connection_path: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<Value>, QueryError> {
        pagination::follow_cursor(|cursor| {
            let cursor_arg = match cursor {
                Some(c) => format!("after: \"{}\"", c),
                None => String::new(),
            };
            async move {
                let mut variables: Vec<(&str, &str)> = vec![("cursor", cursor_arg.as_str())];
                variables.extend(extra.iter().copied());

                let result = self.execute(template_name, &variables).await?;
                Ok(pagination::extract_page(&result, connection_path))
            }
        })
        .await
    }

    /// One attempt: acquire a limiter slot, POST the query, classify the
    /// response. `Ok(None)` marks a transient not-ready outcome.
    async fn send_once(&self, query: &str) -> Result<Option<Value>, QueryError> {
        let response = {
            // The semaphore lives as long as the client and is never closed.
            let _permit = self
                .limiter
                .acquire()
                .await
                .expect("request limiter closed");

            self.http
                .post(&self.endpoint)
                .json(&serde_json::json!({ "query": query }))
                .send()
                .await?
        };

        let status = response.status().as_u16();
        if status == 202 || status == 204 {
            debug!("endpoint answered {} (still processing)", status);
            return Ok(None);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&body)?;
        if value.is_null() {
            return Ok(None);
        }

        Ok(Some(value))
    }
}

/// Drive `attempt` until it yields a value, a fatal error, or the budget
/// runs out. `Ok(None)` from an attempt marks a transient outcome worth
/// retrying; there is no backoff delay between attempts.
pub(crate) async fn with_retries<T, F, Fut>(
    max_attempts: usize,
    name: &str,
    mut attempt: F,
) -> Result<T, QueryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, QueryError>>,
{
    for attempt_number in 1..=max_attempts {
        match attempt().await? {
            Some(value) => return Ok(value),
            None if attempt_number < max_attempts => {
                warn!(
                    "[{}] not ready, retrying ({}/{})",
                    name, attempt_number, max_attempts
                );
            }
            None => {}
        }
    }

    Err(QueryError::RetriesExhausted {
        name: name.to_string(),
        attempts: max_attempts,
    })
}
