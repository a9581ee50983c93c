use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("CacheError: {0}")]
    Cache(#[from] CacheError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("ExportError: {0}")]
    Export(#[from] ExportError),
    #[error("Aborted by operator")]
    Aborted,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Input error: {0}")]
    Input(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),
    #[error("Request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Unreadable response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached data for {key}")]
    NotFound { key: String },
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Cache file {path} is not a JSON record list: {message}")]
    Parse { path: String, message: String },
    #[error("Cache directory not found")]
    DirNotFound,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("Failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },
    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Output file must be .CSV or .JSON: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

impl AppError {
    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::Http { status: 401, .. }) => {
                Some("'gitdata auth set <user>' to store a valid access token".to_string())
            }
            AppError::Api(ApiError::Network { .. }) => {
                Some("Check your network connection or the configured api_url".to_string())
            }
            AppError::Cache(CacheError::NotFound { .. }) => {
                Some("Run once with '--source a' to populate the cache".to_string())
            }
            AppError::Config(ConfigError::UnknownKey { .. }) => Some(
                "Valid keys: api_url, cache_dir, default_identity, default_source, \
                 timeout_seconds, on_page_error, per_page"
                    .to_string(),
            ),
            AppError::Storage(StorageError::Parse { path, .. }) => {
                Some(format!("Fix or remove {} and try again", path))
            }
            _ => None,
        }
    }
}
