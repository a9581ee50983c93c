pub use error::AppError;

/// Main architecture layers (dependency flow: CLI → Core → Storage)
pub mod cli; // Command-line interface
pub mod core; // Fetch, projection, caching and source selection
pub mod storage; // Configuration and credential files

/// Support modules (used across layers)
pub mod api; // GitHub REST transport
pub mod display; // Console rendering
pub mod error; // Error handling
pub mod output; // CSV/JSON export
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, AppError>;
