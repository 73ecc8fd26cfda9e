/// Behavior contract for a virtual table backed by an external API.
///
/// Every statement-shaped method takes the full parsed statement so an
/// implementation can inspect projections, filters, and assignments as it
/// sees fit. The defaults reject each operation with
/// `HandlerError::NotImplemented`, so a table only overrides what it
/// actually supports.
use sqlparser::ast::Statement;

use crate::error::HandlerError;
use crate::response::Records;
use crate::value::Value;

pub trait VirtualTable: Send + Sync {
    /// Handle a SELECT against this table.
    ///
    /// `Ok(None)` means the operation succeeded without producing rows.
    fn select(&self, _statement: &Statement) -> Result<Option<Records>, HandlerError> {
        Err(HandlerError::NotImplemented("select"))
    }

    /// Handle an INSERT into this table.
    fn insert(&self, _statement: &Statement) -> Result<Option<Records>, HandlerError> {
        Err(HandlerError::NotImplemented("insert"))
    }

    /// Handle an UPDATE of this table.
    fn update(&self, _statement: &Statement) -> Result<Option<Records>, HandlerError> {
        Err(HandlerError::NotImplemented("update"))
    }

    /// Handle a DELETE from this table.
    fn delete(&self, _statement: &Statement) -> Result<Option<Records>, HandlerError> {
        Err(HandlerError::NotImplemented("delete"))
    }

    /// Column names exposed by this table, used for introspection.
    fn list_columns(&self) -> Result<Vec<String>, HandlerError> {
        Err(HandlerError::NotImplemented("list_columns"))
    }
}

/// Extension contract for handlers backing conversational APIs.
///
/// No default implementations: a chat-capable handler must supply both the
/// platform configuration and the identity it connects as.
pub trait ChatHandler {
    /// Platform-specific chat configuration as a structured value.
    fn chat_config(&self) -> Result<Value, HandlerError>;

    /// The username the handler is connected as.
    fn my_user_name(&self) -> Result<String, HandlerError>;
}
