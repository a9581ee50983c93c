use crate::api::client::GitHubClient;
use crate::cli::command_handlers::{AuthHandler, CacheHandler, ConfigHandler, QueryHandler};
use crate::cli::main_types::{AuthCommands, Commands, ConfigCommands, QueryOptions};
use crate::cli::prompt::StdinPrompt;
use crate::core::assemble::SortKey;
use crate::core::cache::ResponseCache;
use crate::core::entity::{EntityType, Query};
use crate::core::fetch::PageErrorPolicy;
use crate::core::fields::FieldSpec;
use crate::core::services::auth_service::AuthService;
use crate::core::services::config_service::ConfigService;
use crate::core::services::query_service::QueryService;
use crate::core::services::types::QueryRequest;
use crate::core::session::{Identity, Session};
use crate::core::source::{DataSource, SourceSelector};
use crate::display::TableDisplay;
use crate::error::{AppError, CliError};
use crate::storage::config::Config;
use crate::storage::credentials::CredentialStore;
use crate::utils::logging::print_verbose;
use crate::utils::validation::{validate_name, validate_output_filename};
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    app_dir: PathBuf,
    authuser: Option<String>,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(config: Config, app_dir: PathBuf, authuser: Option<String>, verbose: bool) -> Self {
        Self {
            config,
            app_dir,
            authuser,
            verbose,
        }
    }

    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    /// `--authuser` first, then the configured default identity.
    fn identity_name(&self) -> Option<&str> {
        self.authuser
            .as_deref()
            .or(self.config.default_identity.as_deref())
    }

    fn auth_service(&self) -> Result<AuthService, AppError> {
        let store = CredentialStore::load(CredentialStore::file_in(&self.app_dir))?;
        Ok(AuthService::new(store))
    }

    fn config_service(&self) -> ConfigService {
        ConfigService::new(self.config.clone())
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Repos { org, user, options } => {
                self.run_query(EntityType::Repo, options, |_| repo_queries(&org, &user))
                    .await
            }
            Commands::Members {
                org,
                team,
                audit2fa,
                options,
            } => {
                self.run_query(EntityType::Member, options, |_| {
                    member_queries(&org, team.as_deref(), audit2fa)
                })
                .await
            }
            Commands::Teams { org, options } => {
                self.run_query(EntityType::Team, options, |_| team_queries(&org))
                    .await
            }
            Commands::Orgs { options } => {
                self.run_query(EntityType::Org, options, org_queries).await
            }
            Commands::Collabs {
                owner,
                repo,
                options,
            } => {
                self.run_query(EntityType::Collab, options, |_| {
                    let (owner, repo) = repo_coordinates(owner.as_deref(), repo.as_deref())?;
                    Ok(vec![Query::collaborators(owner, repo)])
                })
                .await
            }
            Commands::Commits {
                owner,
                repo,
                options,
            } => {
                self.run_query(EntityType::Commit, options, |_| {
                    let (owner, repo) = repo_coordinates(owner.as_deref(), repo.as_deref())?;
                    Ok(vec![Query::commits(owner, repo)])
                })
                .await
            }
            Commands::Auth { command } => self.handle_auth_command(command),
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Cache { command } => {
                let cache = ResponseCache::new(self.config_service().cache_dir()?);
                CacheHandler::new().handle(command, &cache)
            }
        }
    }

    async fn run_query<F>(
        &self,
        entity: EntityType,
        options: QueryOptions,
        build_queries: F,
    ) -> Result<(), AppError>
    where
        F: FnOnce(&Identity) -> Result<Vec<Query>, AppError>,
    {
        if options.listfields {
            println!("{}", TableDisplay::new().render_field_list(entity));
            return Ok(());
        }

        // Reject a bad output name before any network call.
        if let Some(filename) = &options.filename {
            validate_output_filename(filename)?;
        }

        let config_service = self.config_service();
        let source = match options.source.as_deref() {
            Some(code) => code.parse::<DataSource>()?,
            None => config_service.default_source()?,
        };
        let policy = if options.fail_fast {
            PageErrorPolicy::Abort
        } else {
            config_service.page_error_policy()?
        };

        let identity = self.auth_service()?.resolve_identity(self.identity_name());
        if !identity.is_authenticated() {
            self.log_verbose("No credentials attached, using the unauthenticated rate limit");
        }
        let queries = build_queries(&identity)?;

        let fields = FieldSpec::parse(options.fields.as_deref(), entity);
        let sort = SortKey::from_option(options.sort.as_deref());
        let requests: Vec<QueryRequest> = queries
            .into_iter()
            .map(|query| QueryRequest {
                query,
                fields: fields.clone(),
                sort: sort.clone(),
                source,
            })
            .collect();

        self.log_verbose(&format!(
            "{} query, source {}, on page error {}",
            entity, source, policy
        ));

        let client = GitHubClient::with_timeout(self.config.api_url(), config_service.timeout())?;
        let cache = ResponseCache::new(config_service.cache_dir()?);
        let selector = SourceSelector::new(&client, &cache)
            .with_policy(policy)
            .with_per_page(self.config.per_page);
        let service = QueryService::new(selector);

        let mut session = Session::new(identity);
        let mut prompt = StdinPrompt::stdin();

        QueryHandler::new()
            .handle(
                &service,
                &mut session,
                requests,
                &options,
                &mut prompt,
                self.verbose,
            )
            .await
    }

    fn handle_auth_command(&self, command: AuthCommands) -> Result<(), AppError> {
        self.log_verbose("Running auth command");
        let mut auth_service = self.auth_service()?;
        AuthHandler::new().handle(
            command,
            &mut auth_service,
            self.identity_name(),
            self.verbose,
        )
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<(), AppError> {
        self.log_verbose("Running config command");
        let mut config_service = self.config_service();
        ConfigHandler::new().handle(
            command,
            &mut config_service,
            Config::file_in(&self.app_dir),
            self.verbose,
        )
    }
}

fn repo_queries(orgs: &[String], users: &[String]) -> Result<Vec<Query>, AppError> {
    if !orgs.is_empty() {
        if !users.is_empty() {
            tracing::warn!("--user ignored because --org was given");
        }
        return orgs
            .iter()
            .map(|org| {
                validate_name("organization", org)?;
                Ok(Query::repos_for_org(org))
            })
            .collect();
    }

    if users.is_empty() {
        return Err(
            CliError::InvalidArguments("repos requires --org or --user".to_string()).into(),
        );
    }
    users
        .iter()
        .map(|user| {
            validate_name("user", user)?;
            Ok(Query::repos_for_user(user))
        })
        .collect()
}

fn member_queries(
    orgs: &[String],
    team: Option<&str>,
    audit2fa: bool,
) -> Result<Vec<Query>, AppError> {
    if !orgs.is_empty() {
        return orgs
            .iter()
            .map(|org| {
                validate_name("organization", org)?;
                Ok(Query::members_for_org(org, audit2fa))
            })
            .collect();
    }

    match team {
        Some(team) => {
            validate_name("team", team)?;
            if audit2fa {
                tracing::warn!("--audit2fa only applies to organization members");
            }
            Ok(vec![Query::members_for_team(team)])
        }
        None => Err(
            CliError::InvalidArguments("members requires --org or --team".to_string()).into(),
        ),
    }
}

fn team_queries(orgs: &[String]) -> Result<Vec<Query>, AppError> {
    if orgs.is_empty() {
        return Err(CliError::InvalidArguments("teams requires --org".to_string()).into());
    }
    orgs.iter()
        .map(|org| {
            validate_name("organization", org)?;
            Ok(Query::teams(org))
        })
        .collect()
}

fn org_queries(identity: &Identity) -> Result<Vec<Query>, AppError> {
    match identity {
        Identity::User { name, .. } => Ok(vec![Query::orgs(name)]),
        Identity::Anonymous => Err(CliError::InvalidArguments(
            "orgs requires an authenticated user (--authuser with a stored token)".to_string(),
        )
        .into()),
    }
}

fn repo_coordinates<'a>(
    owner: Option<&'a str>,
    repo: Option<&'a str>,
) -> Result<(&'a str, &'a str), AppError> {
    match (owner, repo) {
        (Some(owner), Some(repo)) => {
            validate_name("owner", owner)?;
            validate_name("repository", repo)?;
            Ok((owner, repo))
        }
        _ => Err(CliError::InvalidArguments("--owner and --repo are both required".to_string()).into()),
    }
}
