use super::*;
use crate::config::{ConfigSource, DatabaseDescriptor};
use crate::error::BoxError;
use std::sync::Mutex;
use tally_db::{ConnectionSettings, Database, DbError, DbResult, Filter, Record, TableOptions};

// ── Helpers ────────────────────────────────────────────────────────────

fn memory_adapter() -> LedgerAdapter {
    let descriptor = DatabaseDescriptor::new("app", ConnectionSettings::in_memory());
    LedgerAdapter::duckdb(AdapterParams::new(descriptor)).unwrap()
}

/// Driver that records every call and fails on demand
#[derive(Clone, Default)]
struct FakeDriver {
    events: Arc<Mutex<Vec<String>>>,
    fail_connect: bool,
    fail_establish: bool,
}

impl FakeDriver {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

struct FakeDb {
    driver: FakeDriver,
}

impl FakeDb {
    fn log(&self, event: String) {
        self.driver.events.lock().unwrap().push(event);
    }
}

impl Driver for FakeDriver {
    type Settings = u32;
    type Db = FakeDb;

    fn database(&self, name: &str, settings: u32) -> FakeDb {
        self.events
            .lock()
            .unwrap()
            .push(format!("open {name} threads={settings}"));
        FakeDb {
            driver: self.clone(),
        }
    }
}

#[async_trait]
impl Database for FakeDb {
    fn restrict_tables(&mut self, tables: &[String]) {
        self.log(format!("restrict {}", tables.join(",")));
    }

    async fn connect(&mut self) -> DbResult<()> {
        self.log("connect".to_string());
        if self.driver.fail_connect {
            return Err(DbError::ConnectionError("refused".to_string()));
        }
        Ok(())
    }

    async fn close(&mut self) -> DbResult<()> {
        self.log("close".to_string());
        Ok(())
    }

    async fn establish(&mut self, tables: &[(String, TableOptions)]) -> DbResult<()> {
        for (table, options) in tables {
            self.log(format!("establish {table} purge={}", options.purge));
        }
        if self.driver.fail_establish {
            return Err(DbError::ExecutionError("disk full".to_string()));
        }
        Ok(())
    }

    async fn query(&self, table: &str, _filter: &Filter) -> DbResult<Option<Vec<Record>>> {
        self.log(format!("query {table}"));
        Ok(None)
    }

    async fn insert(&self, table: &str, _record: Record) -> DbResult<()> {
        self.log(format!("insert {table}"));
        Ok(())
    }

    async fn remove(&self, table: &str, _filter: &Filter) -> DbResult<usize> {
        self.log(format!("remove {table}"));
        Ok(0)
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }
}

fn fake_adapter(driver: FakeDriver, tables: Option<Vec<String>>) -> LedgerAdapter<FakeDriver> {
    let params = AdapterParams {
        database: Some(ConfigSource::Literal(DatabaseDescriptor::new("app", 4u32))),
        tables,
    };
    LedgerAdapter::with_driver(driver, params).unwrap()
}

// ── Construction ───────────────────────────────────────────────────────

#[test]
fn test_missing_database_config_fails_before_io() {
    let driver = FakeDriver::default();
    let err = LedgerAdapter::with_driver(driver.clone(), AdapterParams::default())
        .err()
        .unwrap();
    assert!(matches!(err, LedgerError::MissingDatabaseConfig));
    assert!(driver.events().is_empty());
}

#[test]
fn test_template_path_exists() {
    let path = memory_adapter().template_path();
    assert_eq!(path, template_path());
    assert!(path.ends_with("templates/migration.sql"));
    assert!(path.is_file(), "missing template at {}", path.display());
}

// ── Connection manager ────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_sequence() {
    let driver = FakeDriver::default();
    let adapter = fake_adapter(driver.clone(), Some(vec!["users".to_string()]));

    let session = adapter.connect().await.unwrap();
    assert_eq!(session.name(), "app");
    adapter.disconnect(session).await.unwrap();

    assert_eq!(
        driver.events(),
        vec![
            "open app threads=4",
            "restrict users",
            "connect",
            "establish migration purge=false",
            "close",
        ]
    );
}

#[tokio::test]
async fn test_connect_without_tables_skips_restriction() {
    let driver = FakeDriver::default();
    let adapter = fake_adapter(driver.clone(), None);
    let _session = adapter.connect().await.unwrap();
    assert!(!driver.events().iter().any(|e| e.starts_with("restrict")));
}

#[tokio::test]
async fn test_connection_error_stops_connect() {
    let driver = FakeDriver {
        fail_connect: true,
        ..FakeDriver::default()
    };
    let adapter = fake_adapter(driver.clone(), None);

    let err = adapter.connect().await.unwrap_err();
    assert!(matches!(err, LedgerError::Db(DbError::ConnectionError(_))));
    assert_eq!(driver.events(), vec!["open app threads=4", "connect"]);
}

#[tokio::test]
async fn test_establish_error_fails_connect_and_closes() {
    let driver = FakeDriver {
        fail_establish: true,
        ..FakeDriver::default()
    };
    let adapter = fake_adapter(driver.clone(), None);

    let err = adapter.connect().await.unwrap_err();
    assert!(matches!(err, LedgerError::Db(DbError::ExecutionError(_))));
    assert_eq!(err.to_string(), "[D002] SQL execution failed: disk full");
    assert_eq!(driver.events().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn test_provider_error_surfaces_from_connect() {
    let driver = FakeDriver::default();
    let params = AdapterParams::<u32> {
        database: Some(ConfigSource::provider(|| async {
            Err::<DatabaseDescriptor<u32>, BoxError>("no credentials".into())
        })),
        tables: None,
    };
    let adapter = LedgerAdapter::with_driver(driver.clone(), params).unwrap();

    let err = adapter.connect().await.unwrap_err();
    assert_eq!(err.to_string(), "no credentials");
    match err {
        LedgerError::Provider(source) => assert_eq!(source.to_string(), "no credentials"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(driver.events().is_empty());
}

// ── Ledger operations ─────────────────────────────────────────────────

#[tokio::test]
async fn test_fresh_ledger_is_empty() {
    let adapter = memory_adapter();
    let session = adapter.connect().await.unwrap();
    assert!(adapter
        .executed_migration_names(&session)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_mark_then_unmark() {
    let adapter = memory_adapter();
    let session = adapter.connect().await.unwrap();

    adapter.mark_executed(&session, "001-init").await.unwrap();
    assert_eq!(
        adapter.executed_migration_names(&session).await.unwrap(),
        vec!["001-init".to_string()]
    );

    adapter.unmark_executed(&session, "001-init").await.unwrap();
    assert!(adapter
        .executed_migration_names(&session)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_unmark_unknown_name_is_noop() {
    let adapter = memory_adapter();
    let session = adapter.connect().await.unwrap();
    adapter.mark_executed(&session, "001-init").await.unwrap();

    adapter.unmark_executed(&session, "999-never").await.unwrap();
    assert_eq!(
        adapter.executed_migration_names(&session).await.unwrap(),
        vec!["001-init".to_string()]
    );
}

#[tokio::test]
async fn test_duplicate_mark_is_rejected() {
    let adapter = memory_adapter();
    let session = adapter.connect().await.unwrap();
    adapter.mark_executed(&session, "001-init").await.unwrap();

    let err = adapter
        .mark_executed(&session, "001-init")
        .await
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::Db(DbError::ConstraintViolation(_))),
        "unexpected error: {err}"
    );
    assert_eq!(
        adapter.executed_migration_names(&session).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_created_timestamp_is_recorded() {
    let adapter = memory_adapter();
    let session = adapter.connect().await.unwrap();
    let before = chrono::Utc::now() - chrono::Duration::seconds(1);
    adapter.mark_executed(&session, "001-init").await.unwrap();

    let rows = session
        .database()
        .query("migration", &Filter::new())
        .await
        .unwrap()
        .unwrap();
    match &rows[0][crate::ledger::CREATED_COLUMN] {
        tally_db::Value::Timestamp(created) => assert!(*created >= before),
        other => panic!("unexpected created value: {other:?}"),
    }
}

#[tokio::test]
async fn test_ledger_operations_use_fake_table_name() {
    let driver = FakeDriver::default();
    let adapter = fake_adapter(driver.clone(), None);
    let session = adapter.connect().await.unwrap();

    // The fake returns no result set; it reads back as an empty ledger
    assert!(adapter
        .executed_migration_names(&session)
        .await
        .unwrap()
        .is_empty());
    adapter.mark_executed(&session, "001").await.unwrap();
    adapter.unmark_executed(&session, "001").await.unwrap();

    let events = driver.events();
    assert!(events.contains(&"query migration".to_string()));
    assert!(events.contains(&"insert migration".to_string()));
    assert!(events.contains(&"remove migration".to_string()));
}
