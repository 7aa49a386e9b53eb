//! Error taxonomy for the filter, planning and pagination pipeline.
//!
//! Every error is returned to the caller immediately; nothing in the query
//! path retries or recovers locally. Transport layers map these to status
//! codes themselves, with one exception surfaced here:
//! [`QueryError::is_not_implemented`].

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// What a stored value was being cast to when the cast failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Boolean,
    Integer,
}

impl std::fmt::Display for CastTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CastTarget::Boolean => write!(f, "boolean"),
            CastTarget::Integer => write!(f, "integer"),
        }
    }
}

/// Errors raised while evaluating filters, planning reports or paginating.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Criterion is missing `field`/`operator`, or the filter document is malformed.
    #[error("Invalid criterion: {0}")]
    InvalidCriterion(String),

    #[error("Operator `{0}` not in accepted operators: [==, !=, >=, <=, >, <]")]
    InvalidOperator(String),

    #[error("Aggregator `{0}` not in accepted aggregators: [all, any]")]
    InvalidAggregator(String),

    /// A referenced schema element or report does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// The report asks for calculated fields but nothing can compute them.
    #[error("Calculated {category} fields are defined on this report, but no field calculator was provided")]
    NoCustomCalculator { category: &'static str },

    #[error("Cannot cast value {value:?} of field `{field}` to {target}")]
    InvalidCast {
        field: String,
        value: String,
        target: CastTarget,
    },

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Schema invariant violated: {0}")]
    Schema(String),

    #[error("SQLite error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        QueryError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// True for errors that mark an intentionally unimplemented extension
    /// point rather than a caller mistake (a 501, not a 4xx/5xx).
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, QueryError::NoCustomCalculator { .. })
    }
}
