//! Entity types and the canned queries the CLI issues for them.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use std::fmt;

use crate::api::client::ACCEPT_LICENSE_PREVIEW;
use crate::api::models::Constants;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Repo,
    Member,
    Team,
    Org,
    Collab,
    Commit,
}

const USER_FIELDS: &[&str] = &[
    "avatar_url",
    "events_url",
    "followers_url",
    "following_url",
    "gists_url",
    "gravatar_id",
    "html_url",
    "id",
    "login",
    "organizations_url",
    "received_events_url",
    "repos_url",
    "site_admin",
    "starred_url",
    "subscriptions_url",
    "type",
    "url",
];

const REPO_FIELDS: &[&str] = &[
    "archive_url",
    "assignees_url",
    "blobs_url",
    "branches_url",
    "clone_url",
    "collaborators_url",
    "commits_url",
    "compare_url",
    "contents_url",
    "contributors_url",
    "created_at",
    "default_branch",
    "deployments_url",
    "description",
    "downloads_url",
    "events_url",
    "fork",
    "forks",
    "forks_count",
    "forks_url",
    "full_name",
    "git_commits_url",
    "git_refs_url",
    "git_tags_url",
    "git_url",
    "has_downloads",
    "has_issues",
    "has_pages",
    "has_wiki",
    "homepage",
    "hooks_url",
    "html_url",
    "id",
    "issue_comment_url",
    "issue_events_url",
    "issues_url",
    "keys_url",
    "labels_url",
    "language",
    "languages_url",
    "master_branch",
    "merges_url",
    "milestones_url",
    "mirror_url",
    "name",
    "notifications_url",
    "open_issues",
    "open_issues_count",
    "private",
    "pulls_url",
    "pushed_at",
    "releases_url",
    "size",
    "ssh_url",
    "stargazers_count",
    "stargazers_url",
    "statuses_url",
    "subscribers_url",
    "subscription_url",
    "svn_url",
    "tags_url",
    "teams_url",
    "trees_url",
    "updated_at",
    "url",
    "watchers",
    "watchers_count",
    "license.featured",
    "license.key",
    "license.name",
    "license.url",
    "owner.avatar_url",
    "owner.events_url",
    "owner.followers_url",
    "owner.following_url",
    "owner.gists_url",
    "owner.gravatar_id",
    "owner.html_url",
    "owner.id",
    "owner.login",
    "owner.organizations_url",
    "owner.received_events_url",
    "owner.repos_url",
    "owner.site_admin",
    "owner.starred_url",
    "owner.subscriptions_url",
    "owner.type",
    "owner.url",
    "permissions.admin",
    "permissions.pull",
    "permissions.push",
];

const ORG_FIELDS: &[&str] = &[
    "avatar_url",
    "description",
    "events_url",
    "hooks_url",
    "id",
    "issues_url",
    "login",
    "members_url",
    "public_members_url",
    "repos_url",
    "url",
    "user",
];

const TEAM_FIELDS: &[&str] = &[
    "description",
    "id",
    "members_url",
    "name",
    "org",
    "permission",
    "privacy",
    "repositories_url",
    "slug",
    "url",
];

const COMMIT_FIELDS: &[&str] = &[
    "author.date",
    "author.email",
    "author.name",
    "comment_count",
    "committer.date",
    "committer.email",
    "committer.name",
    "message",
    "tree.sha",
    "tree.url",
    "url",
];

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Repo => "repo",
            EntityType::Member => "member",
            EntityType::Team => "team",
            EntityType::Org => "org",
            EntityType::Collab => "collab",
            EntityType::Commit => "commit",
        }
    }

    /// Fields projected when the caller asks for none.
    pub fn default_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Repo => &["owner.login", "name"],
            EntityType::Member => &["login", "id", "type", "site_admin"],
            EntityType::Team => &["name", "id", "privacy", "permission"],
            EntityType::Org => &["login", "user"],
            EntityType::Collab => &["login", "owner", "repo", "id"],
            EntityType::Commit => &["author.date", "author.name", "message"],
        }
    }

    /// Field names a record of this type is known to carry, constants included.
    pub fn known_fields(&self) -> Vec<&'static str> {
        match self {
            EntityType::Repo => REPO_FIELDS.to_vec(),
            EntityType::Member => {
                let mut fields = USER_FIELDS.to_vec();
                fields.push("org");
                fields.sort_unstable();
                fields
            }
            EntityType::Collab => {
                let mut fields = USER_FIELDS.to_vec();
                fields.extend(["owner", "repo"]);
                fields.sort_unstable();
                fields
            }
            EntityType::Team => TEAM_FIELDS.to_vec(),
            EntityType::Org => ORG_FIELDS.to_vec(),
            EntityType::Commit => COMMIT_FIELDS.to_vec(),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to fetch and shape one collection.
#[derive(Debug, Clone)]
pub struct Query {
    pub endpoint: String,
    pub entity: EntityType,
    pub constants: Constants,
    pub headers: HeaderMap,
}

impl Query {
    pub fn new(endpoint: impl Into<String>, entity: EntityType) -> Self {
        Self {
            endpoint: endpoint.into(),
            entity,
            constants: Constants::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_constant(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.constants.insert(key.to_string(), value.into());
        self
    }

    fn with_license_preview(mut self) -> Self {
        self.headers
            .insert(ACCEPT, HeaderValue::from_static(ACCEPT_LICENSE_PREVIEW));
        self
    }

    pub fn repos_for_org(org: &str) -> Self {
        Self::new(format!("/orgs/{}/repos", org), EntityType::Repo).with_license_preview()
    }

    pub fn repos_for_user(user: &str) -> Self {
        Self::new(format!("/users/{}/repos", user), EntityType::Repo).with_license_preview()
    }

    pub fn members_for_org(org: &str, audit2fa: bool) -> Self {
        let endpoint = if audit2fa {
            format!("/orgs/{}/members?filter=2fa_disabled", org)
        } else {
            format!("/orgs/{}/members", org)
        };
        Self::new(endpoint, EntityType::Member).with_constant("org", org)
    }

    pub fn members_for_team(team: &str) -> Self {
        Self::new(format!("/teams/{}/members", team), EntityType::Member)
            .with_constant("team", team)
    }

    pub fn teams(org: &str) -> Self {
        Self::new(format!("/orgs/{}/teams", org), EntityType::Team).with_constant("org", org)
    }

    pub fn orgs(user: &str) -> Self {
        Self::new("/user/orgs", EntityType::Org).with_constant("user", user)
    }

    pub fn collaborators(owner: &str, repo: &str) -> Self {
        Self::new(
            format!("/repos/{}/{}/collaborators", owner, repo),
            EntityType::Collab,
        )
        .with_constant("owner", owner)
        .with_constant("repo", repo)
    }

    pub fn commits(owner: &str, repo: &str) -> Self {
        Self::new(format!("/repos/{}/{}/commits", owner, repo), EntityType::Commit)
            .with_constant("owner", owner)
            .with_constant("repo", repo)
    }
}
