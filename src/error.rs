use thiserror::Error;

/// Result alias for dispatch and table operations.
pub type HandlerResult<T> = std::result::Result<T, HandlerError>;

/// Failures raised while parsing a call expression string.
///
/// The parser fails on the first offending construct and never recovers
/// partially: a caller receiving any of these must treat the whole parse
/// as failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// The input does not lex, or is not syntactically a single call
    /// expression with keyword arguments.
    #[error("Malformed call expression: {0}")]
    Malformed(String),

    /// A syntactically valid construct outside the literal value domain,
    /// such as a nested call or a bare identifier.
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A mapping key that is not a string, number, or boolean literal.
    #[error("Unsupported mapping key: {0}")]
    UnsupportedKey(String),
}

/// Failures raised while routing a statement to a virtual table, or by the
/// table operation itself.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No table is registered under the requested name.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The statement kind or shape cannot be routed to a table operation.
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// The resolved table does not implement the requested operation.
    #[error("Table does not implement {0}")]
    NotImplemented(&'static str),

    /// A table returned records that violate the tabular shape contract.
    /// Raised by the dispatcher, never by tables; signals a bug in the
    /// table implementation.
    #[error("Invalid table result: {0}")]
    InvalidResult(String),

    /// A call expression embedded in the request failed to parse.
    #[error(transparent)]
    Call(#[from] CallError),

    /// Implementation-specific failure inside a table operation.
    #[error(transparent)]
    Table(#[from] anyhow::Error),
}
