//! GitHub REST API transport layer
//!
//! `client` issues single calls and keeps session counters current,
//! `links` turns the `Link` response header into page cursors and
//! `models` holds the response and record types shared by the core.

pub mod client;
pub mod links;
pub mod models;

pub use client::{GitHubClient, Transport};
pub use links::{PageLink, PageLinks};
pub use models::{ApiResponse, Constants, Record, Row};
