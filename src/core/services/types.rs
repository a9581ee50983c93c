use crate::api::models::Row;
use crate::core::assemble::SortKey;
use crate::core::entity::Query;
use crate::core::fields::FieldSpec;
use crate::core::source::{DataSource, RecordOrigin};

/// Credential status for one identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub identity: String,
    pub has_token: bool,
    /// Token shortened for display, `*none*` when absent.
    pub token_abbrev: String,
    pub store_path: String,
}

/// One entity query as requested by the operator
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub query: Query,
    pub fields: FieldSpec,
    pub sort: SortKey,
    pub source: DataSource,
}

#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub origin: RecordOrigin,
}
