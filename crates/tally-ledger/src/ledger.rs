//! Ledger table layout and record operations

use chrono::Utc;
use tally_db::{ColumnDef, ColumnKind, Database, DbResult, Filter, Record, TableOptions, Value};

/// Migration identifier column
pub const NAME_COLUMN: &str = "name";

/// Time the migration was marked executed
pub const CREATED_COLUMN: &str = "created";

/// Non-destructive ledger table definition.
///
/// `name` is unique, so marking the same migration twice is rejected by
/// the store.
pub fn ledger_table_options() -> TableOptions {
    TableOptions::keep(vec![
        ColumnDef::new(NAME_COLUMN, ColumnKind::Text).unique(),
        ColumnDef::new(CREATED_COLUMN, ColumnKind::Timestamp),
    ])
}

fn name_filter(name: &str) -> Filter {
    let mut filter = Filter::new();
    filter.insert(NAME_COLUMN.to_string(), Value::from(name));
    filter
}

/// Names of every recorded migration, in store order
pub(crate) async fn executed_names<Db: Database>(db: &Db, table: &str) -> DbResult<Vec<String>> {
    let Some(rows) = db.query(table, &Filter::new()).await? else {
        return Ok(Vec::new());
    };

    let names = rows
        .into_iter()
        .filter_map(|mut row| match row.remove(NAME_COLUMN) {
            Some(Value::Text(name)) => Some(name),
            other => {
                log::warn!("Skipping ledger row in '{table}' without a name: {other:?}");
                None
            }
        })
        .collect();
    Ok(names)
}

pub(crate) async fn mark<Db: Database>(db: &Db, table: &str, name: &str) -> DbResult<()> {
    let mut record = Record::new();
    record.insert(NAME_COLUMN.to_string(), Value::from(name));
    record.insert(CREATED_COLUMN.to_string(), Value::from(Utc::now()));
    db.insert(table, record).await?;
    log::debug!("Marked migration '{name}' executed in '{table}'");
    Ok(())
}

/// Remove every record for `name`; succeeds when none exist
pub(crate) async fn unmark<Db: Database>(db: &Db, table: &str, name: &str) -> DbResult<()> {
    let removed = db.remove(table, &name_filter(name)).await?;
    log::debug!("Unmarked migration '{name}' in '{table}' ({removed} row(s) removed)");
    Ok(())
}
