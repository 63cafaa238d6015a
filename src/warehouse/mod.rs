//! Warehouse persistence.
//!
//! Provides the [`Warehouse`] trait, the record-to-row mapping ([`TableRow`]),
//! and the loader that replaces a table's contents with a validated record
//! set. Backends: [`PostgresWarehouse`] for production and
//! [`SqliteWarehouse`] for local runs and tests.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::WarehouseConfig;
use crate::domain::{AssistRecord, Records, ScorerRecord, StandingRecord};
use crate::error::LoadError;

pub mod postgres;
pub mod sqlite;

pub use self::postgres::PostgresWarehouse;
pub use self::sqlite::SqliteWarehouse;

/// Column added to every table; same value for every row of a run.
pub const EXPORTED_AT_COLUMN: &str = "exported_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn int(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Int,
    }
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
    }
}

/// A single cell. `None` is written as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(Option<i64>),
    Text(Option<String>),
}

/// A record type that maps onto a warehouse table.
pub trait TableRow {
    const COLUMNS: &'static [Column];

    /// Cell values, in `COLUMNS` order.
    fn values(&self) -> Vec<SqlValue>;
}

impl TableRow for StandingRecord {
    const COLUMNS: &'static [Column] = &[
        int("rank"),
        text("team"),
        int("points"),
        int("played"),
        int("wins"),
        int("draws"),
        int("losses"),
        int("goals_for"),
        int("goals_against"),
        int("goal_difference"),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.rank),
            SqlValue::Text(self.team.clone()),
            SqlValue::Int(self.points),
            SqlValue::Int(self.played),
            SqlValue::Int(self.wins),
            SqlValue::Int(self.draws),
            SqlValue::Int(self.losses),
            SqlValue::Int(self.goals_for),
            SqlValue::Int(self.goals_against),
            SqlValue::Int(self.goal_difference),
        ]
    }
}

impl TableRow for ScorerRecord {
    const COLUMNS: &'static [Column] = &[
        text("player"),
        text("team"),
        int("goals"),
        int("appearances"),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.player.clone()),
            SqlValue::Text(self.team.clone()),
            SqlValue::Int(self.goals),
            SqlValue::Int(self.appearances),
        ]
    }
}

impl TableRow for AssistRecord {
    const COLUMNS: &'static [Column] = &[
        text("player"),
        text("team"),
        int("assists"),
        int("appearances"),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.player.clone()),
            SqlValue::Text(self.team.clone()),
            SqlValue::Int(self.assists),
            SqlValue::Int(self.appearances),
        ]
    }
}

/// Storage contract for the pipeline's output tables.
pub trait Warehouse {
    /// Replace the full contents of `table` with `rows`, stamping each row's
    /// `exported_at` column. All-or-nothing: on error the previous contents
    /// are left untouched.
    ///
    /// Returns the number of rows written.
    fn replace_table(
        &mut self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<SqlValue>],
        exported_at: DateTime<Utc>,
    ) -> Result<u64, LoadError>;

    /// Release the connection.
    fn close(self: Box<Self>) -> Result<(), LoadError>;
}

/// Open the warehouse described by `config`.
pub fn open(config: &WarehouseConfig) -> Result<Box<dyn Warehouse>, LoadError> {
    match config {
        WarehouseConfig::Postgres(pg) => Ok(Box::new(PostgresWarehouse::connect(pg)?)),
        WarehouseConfig::Sqlite { path } => Ok(Box::new(SqliteWarehouse::open(path)?)),
    }
}

/// Replace `table` with `records`.
pub fn load<R: TableRow>(
    warehouse: &mut dyn Warehouse,
    table: &str,
    records: &[R],
    exported_at: DateTime<Utc>,
) -> Result<u64, LoadError> {
    let rows: Vec<Vec<SqlValue>> = records.iter().map(TableRow::values).collect();
    match warehouse.replace_table(table, R::COLUMNS, &rows, exported_at) {
        Ok(count) => {
            info!(table, rows = count, exported_at = %exported_at, "Table replaced");
            Ok(count)
        }
        Err(err) => {
            error!(table, error = %err, "Table replace failed; previous contents kept");
            Err(err)
        }
    }
}

/// Replace the table belonging to `records`' dataset.
pub fn load_records(
    warehouse: &mut dyn Warehouse,
    records: &Records,
    exported_at: DateTime<Utc>,
) -> Result<u64, LoadError> {
    let table = records.dataset().table();
    match records {
        Records::Standings(rows) => load(warehouse, table, rows, exported_at),
        Records::Scorers(rows) => load(warehouse, table, rows, exported_at),
        Records::Assists(rows) => load(warehouse, table, rows, exported_at),
    }
}

/// Double-quote an identifier (valid for both PostgreSQL and SQLite).
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE IF NOT EXISTS` for `columns` plus `exported_at`.
pub(crate) fn create_table_sql(
    qualified: &str,
    columns: &[Column],
    type_name: impl Fn(ColumnType) -> &'static str,
    timestamp_type: &str,
) -> String {
    let mut defs: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), type_name(c.ty)))
        .collect();
    defs.push(format!("{} {timestamp_type} NOT NULL", quote_ident(EXPORTED_AT_COLUMN)));
    format!("CREATE TABLE IF NOT EXISTS {qualified} ({})", defs.join(", "))
}

/// `INSERT` for `columns` plus `exported_at`, with numbered placeholders.
pub(crate) fn insert_sql(qualified: &str, columns: &[Column], placeholder: &str) -> String {
    let names: Vec<String> = columns
        .iter()
        .map(|c| quote_ident(c.name))
        .chain(std::iter::once(quote_ident(EXPORTED_AT_COLUMN)))
        .collect();
    let params: Vec<String> = (1..=names.len()).map(|i| format!("{placeholder}{i}")).collect();
    format!(
        "INSERT INTO {qualified} ({}) VALUES ({})",
        names.join(", "),
        params.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lists_match_values() {
        assert_eq!(
            StandingRecord::default().values().len(),
            StandingRecord::COLUMNS.len()
        );
        assert_eq!(ScorerRecord::default().values().len(), ScorerRecord::COLUMNS.len());
        assert_eq!(AssistRecord::default().values().len(), AssistRecord::COLUMNS.len());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("rank"), "\"rank\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn builds_insert_with_exported_at() {
        let sql = insert_sql("\"t\"", ScorerRecord::COLUMNS, "$");
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"player\", \"team\", \"goals\", \"appearances\", \"exported_at\") \
             VALUES ($1, $2, $3, $4, $5)"
        );
    }

    #[test]
    fn builds_create_table() {
        let sql = create_table_sql(
            "\"t\"",
            AssistRecord::COLUMNS,
            |ty| match ty {
                ColumnType::Int => "BIGINT",
                ColumnType::Text => "TEXT",
            },
            "TIMESTAMPTZ",
        );
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"t\" ("));
        assert!(sql.contains("\"assists\" BIGINT"));
        assert!(sql.ends_with("\"exported_at\" TIMESTAMPTZ NOT NULL)"));
    }
}
