//! Chooses between a live fetch and the cache for one query.

use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

use super::cache::{ResponseCache, enrich};
use super::entity::Query;
use super::fetch::{PageErrorPolicy, fetch_all};
use super::session::Session;
use crate::AppError;
use crate::api::client::Transport;
use crate::api::models::Record;
use crate::error::CliError;

/// Where records should come from, as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    Api,
    Cache,
    #[default]
    Prompt,
}

impl DataSource {
    pub fn as_code(&self) -> &'static str {
        match self {
            DataSource::Api => "a",
            DataSource::Cache => "c",
            DataSource::Prompt => "p",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Accepts `a`/`api`, `c`/`cache`, `p`/`prompt`: only the first letter counts.
impl FromStr for DataSource {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('a') => Ok(DataSource::Api),
            Some('c') => Ok(DataSource::Cache),
            Some('p') => Ok(DataSource::Prompt),
            _ => Err(CliError::InvalidArguments(format!(
                "Data source must be a (API), c (cache) or p (prompt), got '{}'",
                s
            ))),
        }
    }
}

/// The operator's answer to an interactive source prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChoice {
    Api,
    Cache,
    Abort,
}

/// Asks the operator where to read from.
///
/// `cached_at` is the cache entry's timestamp, or `None` when there is no
/// entry, in which case `Cache` must not be offered.
pub trait SourcePrompt {
    fn choose(&mut self, cached_at: Option<&str>) -> Result<SourceChoice, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    Live {
        pages: u32,
        failed_pages: u32,
        cached: bool,
    },
    Cache,
    /// Cache-only read with no entry on disk.
    CacheMissing,
}

#[derive(Debug, Clone)]
pub struct SourceResult {
    pub records: Vec<Record>,
    pub origin: RecordOrigin,
}

pub struct SourceSelector<'a> {
    transport: &'a dyn Transport,
    cache: &'a ResponseCache,
    policy: PageErrorPolicy,
    per_page: Option<u32>,
}

impl<'a> SourceSelector<'a> {
    pub fn new(transport: &'a dyn Transport, cache: &'a ResponseCache) -> Self {
        Self {
            transport,
            cache,
            policy: PageErrorPolicy::default(),
            per_page: None,
        }
    }

    pub fn with_policy(mut self, policy: PageErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_per_page(mut self, per_page: Option<u32>) -> Self {
        self.per_page = per_page;
        self
    }

    pub async fn get(
        &self,
        session: &mut Session,
        query: &Query,
        mode: DataSource,
        prompt: &mut dyn SourcePrompt,
    ) -> Result<SourceResult, AppError> {
        let identity = session.identity.cache_name().to_string();
        let cached = self.cache.exists(&identity, &query.endpoint);

        let choice = match mode {
            DataSource::Api => SourceChoice::Api,
            DataSource::Cache => SourceChoice::Cache,
            DataSource::Prompt => {
                let cached_at = if cached {
                    self.cache.timestamp(&identity, &query.endpoint)
                } else {
                    None
                };
                prompt.choose(cached_at.as_deref())?
            }
        };

        match choice {
            SourceChoice::Abort => Err(AppError::Aborted),
            SourceChoice::Cache if !cached => {
                error!(endpoint = %query.endpoint, identity = %identity, "cached data requested, but none found");
                Ok(SourceResult {
                    records: Vec::new(),
                    origin: RecordOrigin::CacheMissing,
                })
            }
            SourceChoice::Cache => {
                let records = self.cache.read(&identity, &query.endpoint)?;
                info!(endpoint = %query.endpoint, records = records.len(), "read from cache");
                Ok(SourceResult {
                    records,
                    origin: RecordOrigin::Cache,
                })
            }
            SourceChoice::Api => self.fetch_live(session, query, &identity).await,
        }
    }

    async fn fetch_live(
        &self,
        session: &mut Session,
        query: &Query,
        identity: &str,
    ) -> Result<SourceResult, AppError> {
        let endpoint = self.first_page_endpoint(&query.endpoint);
        let mut outcome =
            fetch_all(self.transport, session, &endpoint, &query.headers, self.policy).await?;
        enrich(&mut outcome.records, &query.constants);

        let mut written = false;
        if outcome.is_complete() {
            match self
                .cache
                .write(identity, &query.endpoint, &outcome.records, &query.constants)
            {
                Ok(_) => written = true,
                Err(e) => warn!(error = %e, "cache not updated"),
            }
        } else {
            warn!(
                endpoint = %query.endpoint,
                failed_pages = outcome.failed_pages,
                "incomplete result set, cache left unchanged"
            );
        }

        Ok(SourceResult {
            origin: RecordOrigin::Live {
                pages: outcome.pages,
                failed_pages: outcome.failed_pages,
                cached: written,
            },
            records: outcome.records,
        })
    }

    fn first_page_endpoint(&self, endpoint: &str) -> String {
        match self.per_page {
            Some(per_page) => {
                let separator = if endpoint.contains('?') { '&' } else { '?' };
                format!("{}{}per_page={}", endpoint, separator, per_page)
            }
            None => endpoint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::tests::{ScriptedTransport, page};
    use crate::core::session::Identity;
    use serde_json::json;
    use tempfile::tempdir;

    /// Answers with a fixed choice and records what it was shown.
    struct FixedPrompt {
        answer: SourceChoice,
        shown: Vec<Option<String>>,
    }

    impl FixedPrompt {
        fn new(answer: SourceChoice) -> Self {
            Self {
                answer,
                shown: Vec::new(),
            }
        }
    }

    impl SourcePrompt for FixedPrompt {
        fn choose(&mut self, cached_at: Option<&str>) -> Result<SourceChoice, AppError> {
            self.shown.push(cached_at.map(str::to_string));
            Ok(self.answer)
        }
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!("a".parse::<DataSource>().unwrap(), DataSource::Api);
        assert_eq!("API".parse::<DataSource>().unwrap(), DataSource::Api);
        assert_eq!("cache".parse::<DataSource>().unwrap(), DataSource::Cache);
        assert_eq!("P".parse::<DataSource>().unwrap(), DataSource::Prompt);
        assert!("x".parse::<DataSource>().is_err());
        assert!("".parse::<DataSource>().is_err());
        assert_eq!(DataSource::default(), DataSource::Prompt);
    }

    #[tokio::test]
    async fn test_live_fetch_writes_cache_then_cache_mode_reads_it() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![
            page(200, r#"[{"login":"ann"}]"#, Some("https://api.test/orgs/acme/members?page=2")),
            page(200, r#"[{"login":"bob"}]"#, None),
        ]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Abort);
        let query = Query::members_for_org("acme", false);

        let live = selector
            .get(&mut session, &query, DataSource::Api, &mut prompt)
            .await
            .unwrap();
        assert_eq!(
            live.origin,
            RecordOrigin::Live {
                pages: 2,
                failed_pages: 0,
                cached: true
            }
        );
        assert_eq!(live.records.len(), 2);
        assert_eq!(live.records[0]["org"], json!("acme"));
        assert!(cache.exists("_anon", "/orgs/acme/members"));

        let cached = selector
            .get(&mut session, &query, DataSource::Cache, &mut prompt)
            .await
            .unwrap();
        assert_eq!(cached.origin, RecordOrigin::Cache);
        assert_eq!(cached.records, live.records);
        assert_eq!(transport.requested().len(), 2);
        assert!(prompt.shown.is_empty());
    }

    #[tokio::test]
    async fn test_cache_mode_without_entry() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Api);

        let result = selector
            .get(&mut session, &Query::teams("acme"), DataSource::Cache, &mut prompt)
            .await
            .unwrap();

        assert_eq!(result.origin, RecordOrigin::CacheMissing);
        assert!(result.records.is_empty());
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_shows_timestamp_and_reads_cache() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let query = Query::teams("acme");
        cache
            .write("octocat", &query.endpoint, &[], &query.constants)
            .unwrap();

        let transport = ScriptedTransport::new(vec![]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::new(Identity::user("octocat", "tok"));
        let mut prompt = FixedPrompt::new(SourceChoice::Cache);

        let result = selector
            .get(&mut session, &query, DataSource::Prompt, &mut prompt)
            .await
            .unwrap();

        assert_eq!(result.origin, RecordOrigin::Cache);
        assert_eq!(prompt.shown.len(), 1);
        assert!(prompt.shown[0].is_some());
    }

    #[tokio::test]
    async fn test_prompt_without_cache_gets_none() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![page(200, "[]", None)]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Api);

        selector
            .get(&mut session, &Query::teams("acme"), DataSource::Prompt, &mut prompt)
            .await
            .unwrap();

        assert_eq!(prompt.shown, vec![None]);
        assert!(cache.exists("_anon", "/orgs/acme/teams"));
    }

    #[tokio::test]
    async fn test_prompt_abort() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Abort);

        let result = selector
            .get(&mut session, &Query::teams("acme"), DataSource::Prompt, &mut prompt)
            .await;

        assert!(matches!(result, Err(AppError::Aborted)));
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_fetch_leaves_cache_alone() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![
            page(200, r#"[{"name":"r1"}]"#, Some("https://api.test/orgs/acme/repos?page=2")),
            page(500, "", None),
        ]);
        let selector = SourceSelector::new(&transport, &cache);
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Api);

        let result = selector
            .get(&mut session, &Query::repos_for_org("acme"), DataSource::Api, &mut prompt)
            .await
            .unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.origin,
            RecordOrigin::Live {
                pages: 2,
                failed_pages: 1,
                cached: false
            }
        );
        assert!(!cache.exists("_anon", "/orgs/acme/repos"));
    }

    #[tokio::test]
    async fn test_per_page_on_first_request_only() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let transport = ScriptedTransport::new(vec![
            page(200, "[]", Some("https://api.test/orgs/acme/members?filter=2fa_disabled&per_page=50&page=2")),
            page(200, "[]", None),
        ]);
        let selector = SourceSelector::new(&transport, &cache).with_per_page(Some(50));
        let mut session = Session::anonymous();
        let mut prompt = FixedPrompt::new(SourceChoice::Api);
        let query = Query::members_for_org("acme", true);

        selector
            .get(&mut session, &query, DataSource::Api, &mut prompt)
            .await
            .unwrap();

        let requested = transport.requested();
        assert_eq!(requested[0], "/orgs/acme/members?filter=2fa_disabled&per_page=50");
        assert!(cache.exists("_anon", "/orgs/acme/members?filter=2fa_disabled"));
    }
}
