//! SQLite driver over `rusqlite`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::SecondsFormat;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use tetra_types::Value;
use tracing::debug;

use crate::{Dialect, Driver, DriverError, ExecResult, Rows, SqlDb};

/// SQLite database behind a single mutex-guarded connection.
pub struct SqliteDb {
    conn: Mutex<Option<Connection>>,
}

impl SqliteDb {
    /// Opens (or creates) a database file.
    pub fn open(path: &str) -> Result<Self, DriverError> {
        let conn = Connection::open(path).map_err(driver_error)?;
        debug!("Opened sqlite database at {}", path);
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory().map_err(driver_error)?;
        Ok(Self::from_connection(conn))
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, DriverError> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_ref().ok_or_else(DriverError::closed)?;
        f(conn).map_err(driver_error)
    }
}

impl SqlDb for SqliteDb {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError> {
        let params = to_sql_values(args)?;
        self.with_conn(|conn| {
            let changed = conn.execute(sql, params_from_iter(params.iter()))?;
            Ok(ExecResult {
                rows_affected: changed as u64,
                last_insert_id: Some(conn.last_insert_rowid()),
            })
        })
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, DriverError> {
        let params = to_sql_values(args)?;
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let width = columns.len();

            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(from_sql_value(row.get::<_, SqlValue>(i)?));
                }
                out.push(values);
            }
            Ok(Rows::new(columns, out))
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), DriverError> {
        self.with_conn(|conn| conn.execute_batch(sql))
    }

    fn ping(&self) -> Result<(), DriverError> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .map(|_| ())
    }

    fn close(&self) -> Result<(), DriverError> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.take() {
            Some(conn) => conn.close().map_err(|(conn, e)| {
                *guard = Some(conn);
                driver_error(e)
            }),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Opens [`SqliteDb`] handles. The DSN is a file path, optionally prefixed
/// with `sqlite://`; an empty DSN or `:memory:` opens an in-memory database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn open(&self, dsn: &str) -> Result<Arc<dyn SqlDb>, DriverError> {
        let path = dsn.strip_prefix("sqlite://").unwrap_or(dsn);
        let db = if path.is_empty() || path == ":memory:" {
            SqliteDb::open_in_memory()?
        } else {
            SqliteDb::open(path)?
        };
        Ok(Arc::new(db))
    }
}

fn driver_error(err: rusqlite::Error) -> DriverError {
    match err {
        rusqlite::Error::SqliteFailure(ffi, message) => DriverError::with_code(
            ffi.extended_code.to_string(),
            message.unwrap_or_else(|| ffi.to_string()),
        ),
        other => DriverError::new(other.to_string()),
    }
}

/// SQLite has no boolean, UUID, timestamp or composite storage: booleans
/// become integers, UUIDs and timestamps become text, lists and maps become
/// tagged JSON text.
fn to_sql_values(args: &[Value]) -> Result<Vec<SqlValue>, DriverError> {
    args.iter().map(to_sql_value).collect()
}

fn to_sql_value(value: &Value) -> Result<SqlValue, DriverError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(x) => SqlValue::Real(*x),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
        Value::Uuid(u) => SqlValue::Text(u.hyphenated().to_string()),
        Value::Timestamp(t) => SqlValue::Text(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::List(_) | Value::Map(_) => SqlValue::Text(
            serde_json::to_string(value).map_err(|e| DriverError::new(e.to_string()))?,
        ),
    })
}

fn from_sql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::Int(n),
        SqlValue::Real(x) => Value::Float(x),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Bytes(b),
    }
}
