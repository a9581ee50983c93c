use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gitdata")]
#[command(about = "Query GitHub organization data: repos, members, teams and collaborators")]
#[command(version)]
pub struct Cli {
    /// Display verbose status info
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Authentication username (token looked up in the credential store)
    #[arg(short, long, global = true, env = "GITDATA_AUTHUSER")]
    pub authuser: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every data query
#[derive(Args, Debug, Clone, Default)]
pub struct QueryOptions {
    /// Data source: a (API), c (cache) or p (prompt)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Fields to include, separated by '/' (or *, urls, nourls)
    #[arg(short, long)]
    pub fields: Option<String>,

    /// Field to sort by (defaults to the first field)
    #[arg(long)]
    pub sort: Option<String>,

    /// Output filename (.CSV or .JSON)
    #[arg(short = 'n', long)]
    pub filename: Option<String>,

    /// Don't display retrieved data
    #[arg(long)]
    pub no_display: bool,

    /// List available fields and exit
    #[arg(short, long)]
    pub listfields: bool,

    /// Stop at the first page that fails
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get repo information by org or user/owner
    Repos {
        /// GitHub organization (repeatable)
        #[arg(short, long)]
        org: Vec<String>,
        /// GitHub user (repeatable, ignored when --org is given)
        #[arg(short, long)]
        user: Vec<String>,
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Get member information by org or team ID
    Members {
        /// Organization name (repeatable)
        #[arg(short, long)]
        org: Vec<String>,
        /// Team ID
        #[arg(short, long)]
        team: Option<String>,
        /// Include only members without two-factor authentication
        #[arg(long)]
        audit2fa: bool,
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Get team information for an organization
    Teams {
        /// Organization name (repeatable)
        #[arg(short, long)]
        org: Vec<String>,
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Get organizations the authenticated user belongs to
    Orgs {
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Get collaborator information for a repo
    Collabs {
        /// Repo owner (user or organization)
        #[arg(short, long)]
        owner: Option<String>,
        /// Repo name
        #[arg(short, long)]
        repo: Option<String>,
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Get commit history for a repo
    Commits {
        /// Repo owner (user or organization)
        #[arg(short, long)]
        owner: Option<String>,
        /// Repo name
        #[arg(short, long)]
        repo: Option<String>,
        #[command(flatten)]
        options: QueryOptions,
    },
    /// Access token management
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Local response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Show the stored token for an identity
    Status {
        /// Identity name (defaults to --authuser or default_identity)
        identity: Option<String>,
    },
    /// Store an access token for an identity
    Set {
        identity: String,
        /// Token value; prompted for without echo when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the stored token for an identity
    Delete { identity: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value (empty to reset)
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Print the cache directory
    Path,
}
