//! Per-run context threaded through the transport, fetch loop and projector.

use indexmap::IndexSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Value stored when the rate-limit headers are missing from a response.
pub const MISSING_RATE_LIMIT: u64 = 999_999;

/// Cache-file prefix used when no credentials are attached.
pub const ANONYMOUS_CACHE_NAME: &str = "_anon";

/// The principal requests are made as.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User { name: String, token: String },
}

impl Identity {
    pub fn user(name: impl Into<String>, token: impl Into<String>) -> Self {
        Identity::User {
            name: name.into(),
            token: token.into(),
        }
    }

    /// Name used to scope cache files.
    pub fn cache_name(&self) -> &str {
        match self {
            Identity::Anonymous => ANONYMOUS_CACHE_NAME,
            Identity::User { name, .. } => name,
        }
    }

    /// Basic-auth pair for the transport, if authenticated.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match self {
            Identity::Anonymous => None,
            Identity::User { name, token } => Some((name.as_str(), token.as_str())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Identity::Anonymous => "anonymous".to_string(),
            Identity::User { name, .. } => name.clone(),
        }
    }
}

// Tokens never reach logs through Debug.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => write!(f, "Anonymous"),
            Identity::User { name, .. } => f
                .debug_struct("User")
                .field("name", name)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Cumulative transport counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub api_calls: u64,
    pub api_bytes: u64,
    pub rate_limit: u64,
    pub rate_remaining: u64,
}

impl SessionStats {
    /// Account for one response. Missing rate-limit headers store the sentinel.
    pub fn record_response(&mut self, bytes: usize, limit: Option<u64>, remaining: Option<u64>) {
        self.api_calls += 1;
        self.api_bytes += bytes as u64;
        self.rate_limit = limit.unwrap_or(MISSING_RATE_LIMIT);
        self.rate_remaining = remaining.unwrap_or(MISSING_RATE_LIMIT);
    }

    /// Account for a call that produced no response at all.
    pub fn record_failed_call(&mut self) {
        self.api_calls += 1;
    }

    pub fn rate_used(&self) -> u64 {
        self.rate_limit.saturating_sub(self.rate_remaining)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} API calls, {} bytes, rate limit {} used of {}",
            self.api_calls,
            self.api_bytes,
            self.rate_used(),
            self.rate_limit
        )
    }
}

/// Field names requested in exact mode that some record did not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields(IndexSet<String>);

impl UnknownFields {
    pub fn insert(&mut self, name: &str) {
        if !self.0.contains(name) {
            self.0.insert(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[derive(Debug)]
pub struct Session {
    pub identity: Identity,
    pub stats: SessionStats,
    pub unknown_fields: UnknownFields,
    pub started: Instant,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            stats: SessionStats::default(),
            unknown_fields: UnknownFields::default(),
            started: Instant::now(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Identity::Anonymous)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
