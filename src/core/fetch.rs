//! Paginated fetch loop: follow `next` cursors until the collection is exhausted.

use reqwest::header::HeaderMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::session::Session;
use crate::api::client::Transport;
use crate::api::models::Record;
use crate::error::{ApiError, ConfigError};

/// What to do when one page of a collection cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageErrorPolicy {
    /// Count the page as failed, keep following cursors.
    #[default]
    Continue,
    /// Stop and return the error.
    Abort,
}

impl fmt::Display for PageErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageErrorPolicy::Continue => f.write_str("continue"),
            PageErrorPolicy::Abort => f.write_str("abort"),
        }
    }
}

impl FromStr for PageErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(PageErrorPolicy::Continue),
            "abort" => Ok(PageErrorPolicy::Abort),
            other => Err(ConfigError::InvalidValue {
                field: "on_page_error".to_string(),
                value: other.to_string(),
                reason: "expected 'continue' or 'abort'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub pages: u32,
    pub failed_pages: u32,
}

impl FetchOutcome {
    /// Every page that was requested contributed its records.
    pub fn is_complete(&self) -> bool {
        self.failed_pages == 0
    }
}

/// Commit listings are reduced to their embedded `commit` object.
fn is_commit_endpoint(endpoint: &str) -> bool {
    let path = endpoint.split('?').next().unwrap_or(endpoint);
    path.trim_end_matches('/').ends_with("/commits")
}

fn minimize_commit(record: Record) -> Record {
    match record.get("commit") {
        Some(Value::Object(commit)) => commit.clone(),
        _ => record,
    }
}

/// Fetch every page of `endpoint`, in order.
///
/// Under `PageErrorPolicy::Continue` a non-2xx or unreadable page adds no
/// records but its cursor is still followed; a call with no response at all
/// ends the loop since there is nothing to follow.
pub async fn fetch_all<T: Transport + ?Sized>(
    transport: &T,
    session: &mut Session,
    endpoint: &str,
    headers: &HeaderMap,
    policy: PageErrorPolicy,
) -> Result<FetchOutcome, ApiError> {
    let minimize = is_commit_endpoint(endpoint);
    let mut outcome = FetchOutcome::default();
    let mut next = Some(endpoint.to_string());

    while let Some(current) = next.take() {
        outcome.pages += 1;

        let response = match transport.call(session, &current, headers).await {
            Ok(response) => response,
            Err(e) => {
                outcome.failed_pages += 1;
                if policy == PageErrorPolicy::Abort {
                    return Err(e);
                }
                warn!(endpoint = %current, error = %e, "request failed, stopping pagination");
                break;
            }
        };

        let links = response.links();

        if response.is_success() {
            match response.records() {
                Ok(records) if minimize => {
                    outcome
                        .records
                        .extend(records.into_iter().map(minimize_commit));
                }
                Ok(records) => outcome.records.extend(records),
                Err(e) => {
                    outcome.failed_pages += 1;
                    if policy == PageErrorPolicy::Abort {
                        return Err(e);
                    }
                    warn!(endpoint = %current, error = %e, "page body skipped");
                }
            }
        } else {
            outcome.failed_pages += 1;
            warn!(
                endpoint = %current,
                status = response.status,
                message = %response.error_message().unwrap_or_default(),
                "page request returned an error status"
            );
            if policy == PageErrorPolicy::Abort {
                return Err(response.into_error());
            }
        }

        debug!(
            page = outcome.pages,
            last_page = links.last_page(),
            total = outcome.records.len(),
            "page processed"
        );
        if links.is_exhausted() {
            break;
        }
        next = links.next_url().map(str::to_string);
    }

    Ok(outcome)
}
