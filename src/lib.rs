pub mod callexpr;
pub mod error;
pub mod handler;
pub mod registry;
pub mod response;
pub mod statement;
pub mod table;
pub mod value;

// Re-export key types for convenience
pub use callexpr::{parse_call, ParsedCall};
pub use error::{CallError, HandlerError, HandlerResult};
pub use handler::ApiHandler;
pub use registry::TableRegistry;
pub use response::{Records, Response};
pub use sqlparser::ast::Statement;
pub use statement::{parse_single, parse_sql};
pub use table::{ChatHandler, VirtualTable};
pub use value::Value;
