use crate::api::models::Row;
use crate::cli::main_types::{AuthCommands, CacheCommands, ConfigCommands, QueryOptions};
use crate::cli::prompt::read_token;
use crate::core::assemble::{SortKey, sort_rows};
use crate::core::cache::ResponseCache;
use crate::core::services::auth_service::AuthService;
use crate::core::services::config_service::ConfigService;
use crate::core::services::query_service::QueryService;
use crate::core::services::types::QueryRequest;
use crate::core::session::Session;
use crate::core::source::{RecordOrigin, SourcePrompt};
use crate::display::TableDisplay;
use crate::error::AppError;
use crate::output::write_rows;
use crate::utils::logging::{print_verbose, print_verbose_with_prefix};
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct QueryHandler;

impl QueryHandler {
    pub fn new() -> Self {
        Self
    }

    /// Run every request, merge their rows and report them.
    pub async fn handle(
        &self,
        service: &QueryService<'_>,
        session: &mut Session,
        requests: Vec<QueryRequest>,
        options: &QueryOptions,
        prompt: &mut dyn SourcePrompt,
        verbose: bool,
    ) -> Result<(), AppError> {
        let merge = requests.len() > 1;
        let sort: SortKey = requests
            .first()
            .map(|request| request.sort.clone())
            .unwrap_or_default();

        let mut rows: Vec<Row> = Vec::new();
        for request in &requests {
            print_verbose(verbose, &format!("Querying {}", request.query.endpoint));
            let output = service.run(session, request, prompt).await?;
            report_origin(&output.origin, verbose);
            rows.extend(output.rows);
        }

        if merge {
            sort_rows(&mut rows, &sort);
        }

        if !options.no_display {
            println!("{}", TableDisplay::new().render_rows(&rows));
        }

        if let Some(filename) = &options.filename {
            write_output(&rows, Path::new(filename))?;
        }

        if !session.unknown_fields.is_empty() {
            let names: Vec<&str> = session.unknown_fields.names().collect();
            println!("Unknown field name(s): {}", names.join(", "));
        }

        print_verbose_with_prefix(verbose, "Identity", &session.identity.describe());
        print_verbose_with_prefix(verbose, "API usage", &session.stats.summary());
        print_verbose_with_prefix(
            verbose,
            "Elapsed time",
            &format!("{:.2} seconds", session.elapsed().as_secs_f64()),
        );

        Ok(())
    }
}

fn report_origin(origin: &RecordOrigin, verbose: bool) {
    match origin {
        RecordOrigin::CacheMissing => {
            println!("ERROR: cached data requested, but none found.");
        }
        RecordOrigin::Cache => print_verbose_with_prefix(verbose, "Data source", "cache"),
        RecordOrigin::Live {
            pages,
            failed_pages,
            cached,
        } => {
            print_verbose_with_prefix(
                verbose,
                "Data source",
                &format!(
                    "API ({} page(s), {} failed{})",
                    pages,
                    failed_pages,
                    if *cached { ", cache updated" } else { "" }
                ),
            );
            if *failed_pages > 0 {
                println!(
                    "Warning: {} page(s) could not be retrieved; results are incomplete",
                    failed_pages
                );
            }
        }
    }
}

fn write_output(rows: &[Row], path: &Path) -> Result<(), AppError> {
    write_rows(rows, path)?;
    println!("Output file written: {}", path.display());
    Ok(())
}

#[derive(Default)]
pub struct AuthHandler;

impl AuthHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: AuthCommands,
        auth_service: &mut AuthService,
        default_identity: Option<&str>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            AuthCommands::Status { identity } => {
                let Some(name) = identity.as_deref().or(default_identity) else {
                    let known = auth_service.identities();
                    if known.is_empty() {
                        println!("No stored access tokens.");
                    } else {
                        println!("Stored identities: {}", known.join(", "));
                    }
                    return Ok(());
                };

                let status = auth_service.status(name);
                println!("Identity: {}", status.identity);
                println!("Access token: {}", status.token_abbrev);
                print_verbose(verbose, &format!("Credential store: {}", status.store_path));
                Ok(())
            }
            AuthCommands::Set { identity, token } => {
                let token = match token {
                    Some(token) => token,
                    None => read_token()?,
                };
                auth_service.set_token(&identity, &token)?;
                println!("Access token stored for {}", identity.to_lowercase());
                Ok(())
            }
            AuthCommands::Delete { identity } => {
                if auth_service.delete(&identity)? {
                    println!("Access token removed for {}", identity.to_lowercase());
                } else {
                    println!("No access token stored for {}", identity.to_lowercase());
                }
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        config_path: PathBuf,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, &format!("Config file: {}", config_path.display()));
                for (key, value) in config_service.entries() {
                    println!("{:<18} {}", key, value);
                }
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                config_service.set_field(&key, &value)?;
                config_service.save_config(Some(config_path.clone()))?;
                print_verbose(verbose, &format!("Saved {}", config_path.display()));
                if value.trim().is_empty() {
                    println!("{} reset to default", key);
                } else {
                    println!("{} = {}", key, value.trim());
                }
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct CacheHandler;

impl CacheHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, command: CacheCommands, cache: &ResponseCache) -> Result<(), AppError> {
        match command {
            CacheCommands::Path => {
                println!("{}", cache.dir().display());
                Ok(())
            }
        }
    }
}
