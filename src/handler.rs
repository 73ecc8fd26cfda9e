//! Statement dispatch: route a parsed SQL statement to the virtual table it
//! names and normalize whatever the table returns.
//!
//! Routing only inspects statement shape. SELECT follows the first FROM
//! relation, INSERT/UPDATE/DELETE follow their target table, and the last
//! segment of a dotted name picks the registered table, so
//! `api.archive.messages` and `messages` land on the same registration.

use sqlparser::ast::{Delete, FromTable, ObjectName, Query, SetExpr, Statement, TableFactor};

use crate::error::HandlerError;
use crate::registry::TableRegistry;
use crate::response::{Records, Response};
use crate::table::VirtualTable;
use crate::value::Value;

/// Marker reported as the type of every introspected column.
const COLUMN_TYPE_MARKER: &str = "str";

/// Marker reported as the kind of every registered table.
const TABLE_TYPE_MARKER: &str = "BASE TABLE";

/// A named handler owning a set of virtual tables.
pub struct ApiHandler {
    name: String,
    tables: TableRegistry,
}

impl ApiHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: TableRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_table(&mut self, name: impl Into<String>, table: Box<dyn VirtualTable>) {
        self.tables.register(name, table);
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.tables
    }

    /// Route a statement to its target table and run it.
    pub fn execute(&self, statement: &Statement) -> Result<Response, HandlerError> {
        let (operation, target) = route(statement)?;
        tracing::debug!(
            handler = %self.name,
            table = %target,
            operation = operation.label(),
            "dispatching statement"
        );
        let table = self.tables.lookup(&target)?;
        let outcome = match operation {
            Operation::Select => table.select(statement)?,
            Operation::Insert => table.insert(statement)?,
            Operation::Update => table.update(statement)?,
            Operation::Delete => table.delete(statement)?,
        };
        self.normalize(&target, outcome)
    }

    /// `None` becomes `Response::Ok`; rows are checked against the column
    /// count before they are passed along.
    fn normalize(&self, target: &str, outcome: Option<Records>) -> Result<Response, HandlerError> {
        let records = match outcome {
            None => return Ok(Response::Ok),
            Some(records) => records,
        };

        if let Some(row) = records
            .rows
            .iter()
            .position(|row| row.len() != records.columns.len())
        {
            tracing::error!(handler = %self.name, table = %target, "table returned a malformed row");
            return Err(HandlerError::InvalidResult(format!(
                "Row {} has {} values for {} columns",
                row,
                records.rows[row].len(),
                records.columns.len()
            )));
        }

        Ok(Response::Table(records))
    }

    /// Introspect one table: a `Field`/`Type` listing of its columns. The
    /// name resolves by its last `.`-separated segment, the same rule
    /// dispatch applies to statement targets.
    pub fn columns(&self, table_name: &str) -> Result<Response, HandlerError> {
        let table = self.tables.lookup(name_tail(table_name))?;
        let mut records = Records::new(["Field", "Type"]);
        for column in table.list_columns()? {
            records.push_row(vec![
                Value::String(column),
                Value::String(COLUMN_TYPE_MARKER.to_string()),
            ]);
        }
        Ok(Response::Table(records))
    }

    /// List every registered table in registration order.
    pub fn tables(&self) -> Response {
        let mut records = Records::new(["table_name", "table_type"]);
        for name in self.tables.names() {
            records.push_row(vec![
                Value::String(name.to_string()),
                Value::String(TABLE_TYPE_MARKER.to_string()),
            ]);
        }
        Response::Table(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

fn route(statement: &Statement) -> Result<(Operation, String), HandlerError> {
    match statement {
        Statement::Query(query) => Ok((Operation::Select, select_target(query)?)),
        Statement::Insert(insert) => {
            Ok((Operation::Insert, object_name_tail(&insert.table_name)?))
        }
        Statement::Update { table, .. } => {
            Ok((Operation::Update, relation_target(&table.relation)?))
        }
        Statement::Delete(delete) => Ok((Operation::Delete, delete_target(delete)?)),
        other => Err(HandlerError::UnsupportedStatement(other.to_string())),
    }
}

fn select_target(query: &Query) -> Result<String, HandlerError> {
    match query.body.as_ref() {
        SetExpr::Select(select) => {
            let first = select.from.first().ok_or_else(|| {
                HandlerError::UnsupportedStatement("SELECT without a FROM clause".to_string())
            })?;
            relation_target(&first.relation)
        }
        other => Err(HandlerError::UnsupportedStatement(other.to_string())),
    }
}

fn delete_target(delete: &Delete) -> Result<String, HandlerError> {
    let tables = match &delete.from {
        FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
    };
    let first = tables.first().ok_or_else(|| {
        HandlerError::UnsupportedStatement("DELETE without table reference".to_string())
    })?;
    relation_target(&first.relation)
}

fn relation_target(relation: &TableFactor) -> Result<String, HandlerError> {
    match relation {
        TableFactor::Table { name, .. } => object_name_tail(name),
        other => Err(HandlerError::UnsupportedStatement(format!("FROM {}", other))),
    }
}

/// The last segment of a possibly-qualified name is the table name.
fn object_name_tail(name: &ObjectName) -> Result<String, HandlerError> {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .ok_or_else(|| {
            HandlerError::UnsupportedStatement("statement with an empty table name".to_string())
        })
}

fn name_tail(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
