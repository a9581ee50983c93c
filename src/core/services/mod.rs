pub mod auth_service;
pub mod config_service;
pub mod query_service;
pub mod types;

pub use auth_service::AuthService;
pub use config_service::ConfigService;
pub use query_service::QueryService;
pub use types::{AuthStatus, QueryOutput, QueryRequest};
