//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::record::{ColumnDef, ColumnKind, Filter, Record, TableOptions, Value};
use crate::traits::{Database, Driver};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params_from_iter, AccessMode, Config, Connection};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

/// DuckDB connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSettings {
    /// Directory holding `<name>.duckdb`. In-memory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Open the database file read-only
    #[serde(default)]
    pub read_only: bool,

    /// Worker thread count handed to DuckDB
    #[serde(default)]
    pub threads: Option<u32>,
}

impl ConnectionSettings {
    /// Settings for a private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Settings for a file-backed database under `dir`
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// Driver producing [`DuckDbBackend`] handles
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDriver;

impl Driver for DuckDbDriver {
    type Settings = ConnectionSettings;
    type Db = DuckDbBackend;

    fn database(&self, name: &str, settings: ConnectionSettings) -> DuckDbBackend {
        DuckDbBackend::new(name, settings)
    }
}

/// DuckDB database backend
pub struct DuckDbBackend {
    name: String,
    settings: ConnectionSettings,
    conn: Option<Mutex<Connection>>,
    visible: Option<HashSet<String>>,
    tables: HashMap<String, Vec<ColumnDef>>,
}

impl DuckDbBackend {
    /// Create an unconnected handle for database `name`
    pub fn new(name: &str, settings: ConnectionSettings) -> Self {
        Self {
            name: name.to_string(),
            settings,
            conn: None,
            visible: None,
            tables: HashMap::new(),
        }
    }

    /// Database identity this handle was built for
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the database file, or `None` for in-memory databases
    pub fn file_path(&self) -> Option<PathBuf> {
        self.settings
            .path
            .as_ref()
            .map(|dir| dir.join(format!("{}.duckdb", self.name)))
    }

    /// Whether `connect` has succeeded and `close` has not been called
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn config(&self) -> DbResult<Config> {
        let mut config = Config::default();
        if self.settings.read_only {
            config = config
                .access_mode(AccessMode::ReadOnly)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        }
        if let Some(threads) = self.settings.threads {
            config = config
                .threads(i64::from(threads))
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        }
        Ok(config)
    }

    /// Run `f` against the open connection
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| DbError::NotConnected(self.name.clone()))?;
        let guard = conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        f(&guard)
    }

    /// Resolve the column layout of a visible, established table
    fn columns(&self, table: &str) -> DbResult<&[ColumnDef]> {
        if self.conn.is_none() {
            return Err(DbError::NotConnected(self.name.clone()));
        }
        if let Some(visible) = &self.visible {
            if !visible.contains(table) {
                return Err(DbError::TableNotVisible(table.to_string()));
            }
        }
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))
    }

    /// Whether `table` exists in the current schema of the open database
    fn table_exists(&self, table: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT count(*) FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = ?",
                duckdb::params![table],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    fn establish_sync(&self, table: &str, options: &TableOptions) -> DbResult<()> {
        if options.columns.is_empty() {
            return Err(DbError::ExecutionError(format!(
                "table '{table}' must declare at least one column"
            )));
        }

        // A read-only attach rejects any CREATE, even IF NOT EXISTS
        if self.settings.read_only {
            if options.purge {
                return Err(DbError::ExecutionError(format!(
                    "cannot purge '{table}': database '{}' is read-only",
                    self.name
                )));
            }
            if self.table_exists(table)? {
                return Ok(());
            }
            return Err(DbError::TableNotFound(format!(
                "{table} (database '{}' is read-only, so it cannot be created)",
                self.name
            )));
        }

        let columns = options
            .columns
            .iter()
            .map(|col| {
                let unique = if col.unique { " UNIQUE" } else { "" };
                format!("{} {}{}", quote_ident(&col.name), col.kind.sql_type(), unique)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = String::new();
        if options.purge {
            sql.push_str(&format!("DROP TABLE IF EXISTS {};\n", quote_ident(table)));
        }
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote_ident(table),
            columns
        ));

        self.with_conn(|conn| conn.execute_batch(&sql).map_err(DbError::from))
    }

    fn query_sync(&self, table: &str, filter: &Filter) -> DbResult<Vec<Record>> {
        let columns = self.columns(table)?;
        let (clause, params) = where_clause(columns, filter)?;

        let select = columns
            .iter()
            .map(|col| match col.kind {
                ColumnKind::Timestamp => format!("epoch_us({})", quote_ident(&col.name)),
                _ => quote_ident(&col.name),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}{}", select, quote_ident(table), clause);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params), |row| {
                let mut record = Record::new();
                for (idx, col) in columns.iter().enumerate() {
                    let value = match col.kind {
                        ColumnKind::Text => row
                            .get::<_, Option<String>>(idx)?
                            .map_or(Value::Null, Value::Text),
                        ColumnKind::Integer => row
                            .get::<_, Option<i64>>(idx)?
                            .map_or(Value::Null, Value::Integer),
                        ColumnKind::Timestamp => row
                            .get::<_, Option<i64>>(idx)?
                            .and_then(DateTime::<Utc>::from_timestamp_micros)
                            .map_or(Value::Null, Value::Timestamp),
                    };
                    record.insert(col.name.clone(), value);
                }
                Ok(record)
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
        })
    }

    fn insert_sync(&self, table: &str, record: &Record) -> DbResult<()> {
        let columns = self.columns(table)?;
        if record.is_empty() {
            return Err(DbError::ExecutionError(format!(
                "cannot insert an empty record into '{table}'"
            )));
        }

        let mut names = Vec::with_capacity(record.len());
        let mut placeholders = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        for (field, value) in record {
            let col = column(columns, table, field)?;
            names.push(quote_ident(&col.name));
            placeholders.push(placeholder(col.kind));
            params.push(to_param(col, value)?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            names.join(", "),
            placeholders.join(", ")
        );
        self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(params))
                .map(|_| ())
                .map_err(DbError::from)
        })
    }

    fn remove_sync(&self, table: &str, filter: &Filter) -> DbResult<usize> {
        let columns = self.columns(table)?;
        let (clause, params) = where_clause(columns, filter)?;
        let sql = format!("DELETE FROM {}{}", quote_ident(table), clause);
        self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(params))
                .map_err(DbError::from)
        })
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    fn restrict_tables(&mut self, tables: &[String]) {
        self.visible = Some(tables.iter().cloned().collect());
    }

    async fn connect(&mut self) -> DbResult<()> {
        let config = self.config()?;
        let conn = match self.file_path() {
            Some(path) => Connection::open_with_flags(&path, config)
                .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?,
            None => Connection::open_in_memory_with_flags(config)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?,
        };
        log::debug!("Connected to duckdb database '{}'", self.name);
        self.conn = Some(Mutex::new(conn));
        Ok(())
    }

    async fn close(&mut self) -> DbResult<()> {
        if let Some(conn) = self.conn.take() {
            let conn = conn
                .into_inner()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            conn.close()
                .map_err(|(_, e)| DbError::ConnectionError(e.to_string()))?;
            log::debug!("Closed duckdb database '{}'", self.name);
        }
        self.tables.clear();
        Ok(())
    }

    async fn establish(&mut self, tables: &[(String, TableOptions)]) -> DbResult<()> {
        for (table, options) in tables {
            self.establish_sync(table, options)?;
            log::debug!(
                "Established table '{}' (purge: {}) in '{}'",
                table,
                options.purge,
                self.name
            );
            if let Some(visible) = &mut self.visible {
                visible.insert(table.clone());
            }
            self.tables.insert(table.clone(), options.columns.clone());
        }
        Ok(())
    }

    async fn query(&self, table: &str, filter: &Filter) -> DbResult<Option<Vec<Record>>> {
        let rows = self.query_sync(table, filter)?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }

    async fn insert(&self, table: &str, record: Record) -> DbResult<()> {
        self.insert_sync(table, &record)
    }

    async fn remove(&self, table: &str, filter: &Filter) -> DbResult<usize> {
        self.remove_sync(table, filter)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Bind placeholder for a column; timestamps travel as epoch microseconds
fn placeholder(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Timestamp => "make_timestamp(?)",
        _ => "?",
    }
}

fn column<'a>(columns: &'a [ColumnDef], table: &str, field: &str) -> DbResult<&'a ColumnDef> {
    columns
        .iter()
        .find(|col| col.name == field)
        .ok_or_else(|| DbError::ExecutionError(format!("unknown column '{field}' in '{table}'")))
}

fn to_param(col: &ColumnDef, value: &Value) -> DbResult<duckdb::types::Value> {
    use duckdb::types::Value as Param;

    match (col.kind, value) {
        (_, Value::Null) => Ok(Param::Null),
        (ColumnKind::Text, Value::Text(s)) => Ok(Param::Text(s.clone())),
        (ColumnKind::Integer, Value::Integer(n)) => Ok(Param::BigInt(*n)),
        (ColumnKind::Timestamp, Value::Timestamp(ts)) => Ok(Param::BigInt(ts.timestamp_micros())),
        (kind, value) => Err(DbError::ExecutionError(format!(
            "column '{}' of type {} cannot hold {:?}",
            col.name,
            kind.sql_type(),
            value
        ))),
    }
}

/// Build a `WHERE` clause from an equality filter
fn where_clause(
    columns: &[ColumnDef],
    filter: &Filter,
) -> DbResult<(String, Vec<duckdb::types::Value>)> {
    if filter.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut conditions = Vec::with_capacity(filter.len());
    let mut params = Vec::with_capacity(filter.len());
    for (field, value) in filter {
        let col = columns
            .iter()
            .find(|col| &col.name == field)
            .ok_or_else(|| DbError::ExecutionError(format!("unknown filter column '{field}'")))?;
        if *value == Value::Null {
            conditions.push(format!("{} IS NULL", quote_ident(&col.name)));
            continue;
        }
        conditions.push(format!(
            "{} = {}",
            quote_ident(&col.name),
            placeholder(col.kind)
        ));
        params.push(to_param(col, value)?);
    }
    Ok((format!(" WHERE {}", conditions.join(" AND ")), params))
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
