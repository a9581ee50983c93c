//! On-disk cache of complete result sets, one JSON file per identity and endpoint.
//!
//! Entries never expire; a later write for the same key replaces the file.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use crate::api::models::{Constants, Record};
use crate::error::CacheError;

/// Query parameters that vary between pages of one logical collection.
const PAGING_PARAMS: &[&str] = &["page", "per_page"];

pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<user cache dir>/gitdata`
    pub fn default_dir() -> Result<PathBuf, CacheError> {
        dirs::cache_dir()
            .map(|dir| dir.join("gitdata"))
            .ok_or(CacheError::DirNotFound)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `identity@endpoint`. Inside each part `/` becomes `-`, letters, digits,
    /// `.` and `_` are kept, and every other byte is written as `%XX`, so two
    /// distinct endpoints never share a key. Paging parameters and the API
    /// origin are ignored so every page of a collection shares one key.
    pub fn cache_key(identity: &str, endpoint: &str) -> String {
        let normalized = normalize_endpoint(endpoint);
        format!(
            "{}@{}",
            escape_key_part(identity),
            escape_key_part(normalized.trim_matches('/'))
        )
    }

    pub fn path_for(&self, identity: &str, endpoint: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", Self::cache_key(identity, endpoint)))
    }

    pub fn exists(&self, identity: &str, endpoint: &str) -> bool {
        self.path_for(identity, endpoint).is_file()
    }

    pub fn read(&self, identity: &str, endpoint: &str) -> Result<Vec<Record>, CacheError> {
        let path = self.path_for(identity, endpoint);
        if !path.is_file() {
            return Err(CacheError::NotFound {
                key: Self::cache_key(identity, endpoint),
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|e| CacheError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Replace the entry with `records`, each enriched with `constants`.
    ///
    /// The file is written beside its final name and renamed into place, so a
    /// reader never sees a half-written entry.
    pub fn write(
        &self,
        identity: &str,
        endpoint: &str,
        records: &[Record],
        constants: &Constants,
    ) -> Result<PathBuf, CacheError> {
        let path = self.path_for(identity, endpoint);
        let io_error = |source| CacheError::Io {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut enriched = records.to_vec();
        enrich(&mut enriched, constants);
        let content = serde_json::to_string_pretty(&enriched).map_err(|e| CacheError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)?;

        info!(
            file = %path.display(),
            records = records.len(),
            "cache updated"
        );
        Ok(path)
    }

    /// Last write time of the entry, if it exists.
    pub fn modified(&self, identity: &str, endpoint: &str) -> Option<DateTime<Local>> {
        let modified = fs::metadata(self.path_for(identity, endpoint))
            .and_then(|meta| meta.modified())
            .ok()?;
        Some(DateTime::<Local>::from(modified))
    }

    /// Entry timestamp formatted for the operator, e.g. `03/14/2024 09:26:53`.
    pub fn timestamp(&self, identity: &str, endpoint: &str) -> Option<String> {
        self.modified(identity, endpoint)
            .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
    }
}

fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for byte in part.bytes() {
        match byte {
            b'/' => escaped.push('-'),
            b if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' => escaped.push(b as char),
            b => escaped.push_str(&format!("%{:02X}", b)),
        }
    }
    escaped
}

/// Add each constant to every record, overwriting same-named keys.
pub fn enrich(records: &mut [Record], constants: &Constants) {
    if constants.is_empty() {
        return;
    }
    for record in records.iter_mut() {
        for (key, value) in constants {
            record.insert(key.clone(), value.clone());
        }
    }
}

/// Path plus non-paging query of an endpoint, origin stripped.
fn normalize_endpoint(endpoint: &str) -> String {
    let parsed = Url::parse(endpoint).or_else(|_| {
        Url::parse("http://localhost/").and_then(|base| base.join(endpoint))
    });

    let Ok(url) = parsed else {
        return endpoint.to_string();
    };

    let query: Vec<String> = url
        .query_pairs()
        .filter(|(key, _)| !PAGING_PARAMS.iter().any(|param| key == param))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if query.is_empty() {
        url.path().to_string()
    } else {
        format!("{}?{}", url.path(), query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(
            ResponseCache::cache_key("_anon", "/orgs/acme/repos"),
            "_anon@orgs-acme-repos"
        );
        assert_eq!(
            ResponseCache::cache_key("octocat", "/orgs/acme/members?filter=2fa_disabled"),
            "octocat@orgs-acme-members%3Ffilter%3D2fa_disabled"
        );
        assert_eq!(
            ResponseCache::cache_key("mona-lisa", "/repos/acme/my-repo/commits"),
            "mona%2Dlisa@repos-acme-my%2Drepo-commits"
        );
    }

    #[test]
    fn test_cache_key_keeps_hyphenated_names_apart() {
        assert_ne!(
            ResponseCache::cache_key("_anon", "/repos/a-b/c/collaborators"),
            ResponseCache::cache_key("_anon", "/repos/a/b-c/collaborators")
        );
        assert_ne!(
            ResponseCache::cache_key("a_b", "/orgs/c/repos"),
            ResponseCache::cache_key("a", "/b_orgs/c/repos")
        );
    }

    #[test]
    fn test_hyphenated_repos_use_separate_entries() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let written = records(json!([{"login": "only-in-a-b/c"}]));

        cache
            .write("_anon", "/repos/a-b/c/collaborators", &written, &Constants::new())
            .unwrap();

        assert!(cache.exists("_anon", "/repos/a-b/c/collaborators"));
        assert!(!cache.exists("_anon", "/repos/a/b-c/collaborators"));
        assert!(matches!(
            cache.read("_anon", "/repos/a/b-c/collaborators"),
            Err(CacheError::NotFound { .. })
        ));
        assert_eq!(
            cache.read("_anon", "/repos/a-b/c/collaborators").unwrap(),
            written
        );
    }

    #[test]
    fn test_cache_key_ignores_origin_and_paging() {
        let relative = ResponseCache::cache_key("_anon", "/orgs/acme/repos");
        assert_eq!(
            ResponseCache::cache_key("_anon", "https://api.github.com/orgs/acme/repos?page=3"),
            relative
        );
        assert_eq!(
            ResponseCache::cache_key("_anon", "/orgs/acme/repos?per_page=100"),
            relative
        );
        assert_ne!(ResponseCache::cache_key("octocat", "/orgs/acme/repos"), relative);
    }

    #[test]
    fn test_read_missing_entry() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());

        assert!(!cache.exists("_anon", "/orgs/acme/repos"));
        assert!(cache.modified("_anon", "/orgs/acme/repos").is_none());
        let result = cache.read("_anon", "/orgs/acme/repos");
        assert!(matches!(result, Err(CacheError::NotFound { .. })));
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("nested"));
        let data = records(json!([
            {"name": "zeta", "private": true},
            {"name": "alpha", "private": false},
            {"name": "mid", "owner": {"login": "acme"}}
        ]));

        let path = cache
            .write("_anon", "/orgs/acme/repos", &data, &Constants::new())
            .unwrap();
        assert!(path.ends_with("_anon@orgs-acme-repos.json"));
        assert!(cache.exists("_anon", "/orgs/acme/repos"));
        assert!(!path.with_extension("json.tmp").exists());

        let read_back = cache.read("_anon", "/orgs/acme/repos").unwrap();
        assert_eq!(read_back, data);
        assert!(cache.timestamp("_anon", "/orgs/acme/repos").is_some());
    }

    #[test]
    fn test_write_merges_constants() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        let data = records(json!([{"login": "ann", "org": "stale"}, {"login": "bob"}]));
        let mut constants = Constants::new();
        constants.insert("org".to_string(), json!("acme"));

        cache
            .write("_anon", "/orgs/acme/members", &data, &constants)
            .unwrap();
        let read_back = cache.read("_anon", "/orgs/acme/members").unwrap();

        assert_eq!(read_back[0]["org"], "acme");
        assert_eq!(read_back[1]["org"], "acme");
        assert_eq!(read_back[1]["login"], "bob");
    }

    #[test]
    fn test_write_replaces_existing_entry() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());

        cache
            .write("_anon", "/x", &records(json!([{"n": 1}, {"n": 2}])), &Constants::new())
            .unwrap();
        cache
            .write("_anon", "/x", &records(json!([{"n": 3}])), &Constants::new())
            .unwrap();

        assert_eq!(cache.read("_anon", "/x").unwrap().len(), 1);
    }

    #[test]
    fn test_read_corrupt_entry() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        fs::write(cache.path_for("_anon", "/x"), "not json").unwrap();

        let result = cache.read("_anon", "/x");
        assert!(matches!(result, Err(CacheError::Parse { .. })));
    }
}
