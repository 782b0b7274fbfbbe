//! DuckDB-based query engine
//!
//! Renders queries to parameterised SQL and executes them on a
//! DuckDB connection. Tables must be registered with their column list so
//! rows can be read back by name.

use super::sql::{render_count, render_select, SqlQuery};
use crate::config::PaginationConfig;
use crate::error::{Error, Result};
use crate::query::{QueryEngine, QuerySpec, TableMetadata};
use crate::types::Record;
use crate::value::Value;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::Connection;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;

/// Query engine backed by DuckDB
pub struct DuckDbEngine {
    /// DuckDB connection
    conn: Mutex<Connection>,
    /// Registered tables by name
    tables: HashMap<String, TableMetadata>,
}

impl DuckDbEngine {
    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a database file, creating it if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::config(format!(
                "Failed to open DuckDB database '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            tables: HashMap::new(),
        }
    }

    /// Register every table of a config
    pub fn with_config(mut self, config: &PaginationConfig) -> Result<Self> {
        for table in &config.tables {
            self.register_table(table.clone())?;
        }
        Ok(self)
    }

    /// Register a table, builder style
    pub fn with_table(mut self, metadata: TableMetadata) -> Result<Self> {
        self.register_table(metadata)?;
        Ok(self)
    }

    /// Register a table so it can be paginated
    pub fn register_table(&mut self, metadata: TableMetadata) -> Result<()> {
        metadata.validate()?;
        if metadata.columns.is_empty() {
            return Err(Error::config(format!(
                "Table '{}' must declare its columns to be queried through DuckDB",
                metadata.table
            )));
        }
        self.tables.insert(metadata.table.clone(), metadata);
        Ok(())
    }

    /// Run one or more statements, e.g. schema setup
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn registered(&self, table: &str) -> Result<&TableMetadata> {
        self.tables
            .get(table)
            .ok_or_else(|| Error::config(format!("Table '{table}' is not registered")))
    }
}

#[async_trait]
impl QueryEngine for DuckDbEngine {
    type Row = Record;

    fn metadata(&self, table: &str) -> Option<TableMetadata> {
        self.tables.get(table).cloned()
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Record>> {
        let columns = &self.registered(query.table())?.columns;
        let SqlQuery { sql, params } = render_select(query, columns);

        tracing::debug!("Executing query: {}", sql);

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                duckdb::params_from_iter(params.iter().map(to_duckdb_value)),
                |row| {
                    let mut record = Record::with_capacity(columns.len());
                    for (i, column) in columns.iter().enumerate() {
                        let value: DuckValue = row.get(i)?;
                        record.insert(column.clone(), from_duckdb_value(value));
                    }
                    Ok(record)
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    async fn count(&self, query: &QuerySpec) -> Result<u64> {
        self.registered(query.table())?;
        let SqlQuery { sql, params } = render_count(query);

        tracing::debug!("Executing count: {}", sql);

        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            &sql,
            duckdb::params_from_iter(params.iter().map(to_duckdb_value)),
            |row| row.get(0),
        )?;

        u64::try_from(count).map_err(|_| Error::engine(format!("Negative row count: {count}")))
    }
}

/// Convert a parameter to its DuckDB representation
fn to_duckdb_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DuckValue::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                DuckValue::UBigInt(u)
            } else {
                n.as_f64().map_or(DuckValue::Null, DuckValue::Double)
            }
        }
        Value::String(s) => DuckValue::Text(s.clone()),
        Value::Timestamp(t) => DuckValue::Timestamp(TimeUnit::Microsecond, t.timestamp_micros()),
    }
}

/// Convert a DuckDB result value
fn from_duckdb_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::from(i64::from(i)),
        DuckValue::SmallInt(i) => Value::from(i64::from(i)),
        DuckValue::Int(i) => Value::from(i),
        DuckValue::BigInt(i) => Value::from(i),
        DuckValue::HugeInt(i) => Value::String(i.to_string()),
        DuckValue::UTinyInt(i) => Value::from(u64::from(i)),
        DuckValue::USmallInt(i) => Value::from(u64::from(i)),
        DuckValue::UInt(i) => Value::from(u64::from(i)),
        DuckValue::UBigInt(i) => Value::from(i),
        DuckValue::Float(f) => Value::from(f64::from(f)),
        DuckValue::Double(f) => Value::from(f),
        DuckValue::Text(s) => Value::String(s),
        DuckValue::Timestamp(unit, i) => timestamp_from_unit(unit, i)
            .map_or_else(|| Value::from(i), Value::Timestamp),
        DuckValue::Date32(d) => {
            // Days since epoch (719163 is the number of days from 1 CE to 1970-01-01)
            NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map_or_else(|| Value::from(d), |date| Value::String(date.to_string()))
        }
        other => Value::String(format!("{other:?}")),
    }
}

fn timestamp_from_unit(unit: TimeUnit, value: i64) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryOrder;

    async fn seeded() -> DuckDbEngine {
        let engine = DuckDbEngine::open_in_memory()
            .unwrap()
            .with_table(
                TableMetadata::new("tasks")
                    .with_columns(["id", "rank", "created_at"])
                    .with_primary_key("id"),
            )
            .unwrap();
        engine
            .execute_batch(
                "CREATE TABLE tasks (id VARCHAR PRIMARY KEY, rank INTEGER, created_at TIMESTAMP);
                 INSERT INTO tasks VALUES
                   ('t1', 3, TIMESTAMP '2024-08-28 13:27:55.450'),
                   ('t2', 1, TIMESTAMP '2024-08-28 14:27:55.450'),
                   ('t3', NULL, TIMESTAMP '2024-08-28 15:27:55.450');",
            )
            .await
            .unwrap();
        engine
    }

    #[test]
    fn test_duckdb_value_conversion() {
        assert_eq!(from_duckdb_value(DuckValue::Null), Value::Null);
        assert_eq!(from_duckdb_value(DuckValue::Boolean(true)), Value::Bool(true));
        assert_eq!(from_duckdb_value(DuckValue::Int(42)), Value::from(42));
        assert_eq!(
            from_duckdb_value(DuckValue::Text("hello".to_string())),
            Value::from("hello")
        );
        assert_eq!(
            from_duckdb_value(DuckValue::Date32(19_963)),
            Value::from("2024-08-28")
        );

        let ts: DateTime<Utc> = "2024-08-28T13:27:55.450Z".parse().unwrap();
        let round_trip = from_duckdb_value(to_duckdb_value(&Value::from(ts)));
        assert_eq!(round_trip, Value::Timestamp(ts));
    }

    #[test]
    fn test_register_requires_columns() {
        let mut engine = DuckDbEngine::open_in_memory().unwrap();
        let err = engine
            .register_table(TableMetadata::new("tasks").with_primary_key("id"))
            .unwrap_err();
        assert!(err.to_string().contains("must declare its columns"));
    }

    #[tokio::test]
    async fn test_fetch_and_count() {
        let engine = seeded().await;

        let query = QuerySpec::new("tasks")
            .with_order_by("created_at", QueryOrder::Desc)
            .with_limit(2);
        let rows = engine.fetch(&query).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], Value::from("t3"));
        assert_eq!(rows[0]["rank"], Value::Null);
        assert!(matches!(rows[0]["created_at"], Value::Timestamp(_)));

        let ts: DateTime<Utc> = "2024-08-28T14:00:00Z".parse().unwrap();
        let after = QuerySpec::new("tasks").with_filter(crate::query::Predicate::compare(
            "created_at",
            crate::types::Comparison::Gt,
            ts,
        ));
        assert_eq!(engine.count(&after).await.unwrap(), 2);
        assert_eq!(engine.count(&QuerySpec::new("tasks")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unregistered_table() {
        let engine = seeded().await;
        let result = engine.fetch(&QuerySpec::new("events")).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(engine.metadata("events").is_none());
        assert!(engine.metadata("tasks").is_some());
    }
}
