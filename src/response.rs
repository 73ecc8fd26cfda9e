//! Tabular results and the response envelope returned by handler dispatch.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A rectangular block of rows with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Records {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Records {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when every row has exactly one value per column.
    pub fn is_well_formed(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.columns.len())
    }
}

/// Outcome of dispatching a statement to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    /// The operation succeeded without producing rows.
    Ok,
    /// The operation produced a result set.
    Table(Records),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok)
    }

    pub fn records(&self) -> Option<&Records> {
        match self {
            Response::Table(records) => Some(records),
            Response::Ok => None,
        }
    }

    pub fn into_records(self) -> Option<Records> {
        match self {
            Response::Table(records) => Some(records),
            Response::Ok => None,
        }
    }
}
