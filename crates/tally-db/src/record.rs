//! Generic record and table-definition types

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single field value stored in a record table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// UTF-8 text
    Text(String),
    /// 64-bit signed integer
    Integer(i64),
    /// UTC timestamp with microsecond precision
    Timestamp(DateTime<Utc>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

/// A row, keyed by column name
pub type Record = BTreeMap<String, Value>;

/// Equality filter, keyed by column name. An empty filter matches every row.
pub type Filter = BTreeMap<String, Value>;

/// Storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Timestamp,
}

impl ColumnKind {
    /// SQL type name used in `CREATE TABLE`
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text => "VARCHAR",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Timestamp => "TIMESTAMP",
        }
    }
}

/// Column definition for a record table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
    /// Reject a second row carrying the same value
    pub unique: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unique: false,
        }
    }

    /// Mark the column unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Options for [`crate::Database::establish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Drop and recreate the table when it already exists
    pub purge: bool,
    /// Columns, in declaration order
    pub columns: Vec<ColumnDef>,
}

impl TableOptions {
    /// Non-destructive options: create the table only if it is absent
    pub fn keep(columns: Vec<ColumnDef>) -> Self {
        Self {
            purge: false,
            columns,
        }
    }
}
