use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Failures raised while declaring or executing a criteria query.
///
/// Every variant is caller-facing: the query declaration is wrong and must be
/// fixed before retrying. The engine never retries internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("alias '{0}' is already declared in this query")]
    DuplicateAlias(String),

    #[error("can't find table '{0}'")]
    UnknownTable(String),

    #[error("can't find column '{column}' in {entity}")]
    UnknownColumn { entity: String, column: String },

    #[error("can't find a field to join {from} and {to}")]
    JoinResolution { from: String, to: String },

    #[error("operator '{0}' is not supported here")]
    UnsupportedOperator(String),

    #[error("pagination is undefined; call with_page before to_page")]
    PaginationMissing,

    #[error("schema error: {0}")]
    Schema(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("mapping error: {0}")]
    Mapping(String),
}
