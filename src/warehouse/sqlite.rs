//! `SQLite`-backed implementation of [`Warehouse`].
//!
//! Used for local runs (`SQL_DRIVER=sqlite`) and tests. There are no schemas;
//! `exported_at` is stored as RFC 3339 text.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::info;

use crate::error::LoadError;
use crate::warehouse::{
    Column, ColumnType, SqlValue, Warehouse, create_table_sql, insert_sql, quote_ident,
};

/// Create with [`SqliteWarehouse::open`] for a database file or
/// [`SqliteWarehouse::in_memory`] for tests.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Open or create a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the directory can't be created,
    /// or [`LoadError::Sqlite`] if the database can't be opened.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Warehouse opened");
        Ok(Self { conn })
    }

    /// In-memory database (for tests).
    pub fn in_memory() -> Result<Self, LoadError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Underlying connection, for inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn sqlite_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Int => "INTEGER",
        ColumnType::Text => "TEXT",
    }
}

fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(Some(v)) => Value::Integer(*v),
        SqlValue::Text(Some(v)) => Value::Text(v.clone()),
        SqlValue::Int(None) | SqlValue::Text(None) => Value::Null,
    }
}

/// The text form stored in `exported_at`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Warehouse for SqliteWarehouse {
    fn replace_table(
        &mut self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<SqlValue>],
        exported_at: DateTime<Utc>,
    ) -> Result<u64, LoadError> {
        let qualified = quote_ident(table);
        let stamp = format_timestamp(exported_at);

        // Dropping `tx` without commit rolls everything back.
        let tx = self.conn.transaction()?;
        tx.execute_batch(&create_table_sql(&qualified, columns, sqlite_type, "TEXT"))?;
        tx.execute(&format!("DELETE FROM {qualified}"), [])?;

        let mut count = 0u64;
        {
            let mut stmt = tx.prepare(&insert_sql(&qualified, columns, "?"))?;
            for row in rows {
                let mut params: Vec<Value> = row.iter().map(to_value).collect();
                params.push(Value::Text(stamp.clone()));
                count += stmt.execute(rusqlite::params_from_iter(params))? as u64;
            }
        }
        tx.commit()?;

        Ok(count)
    }

    fn close(self: Box<Self>) -> Result<(), LoadError> {
        self.conn.close().map_err(|(_, e)| LoadError::Sqlite(e))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::{ScorerRecord, StandingRecord};
    use crate::warehouse::{TableRow, load};

    fn scorer(player: &str, goals: i64) -> ScorerRecord {
        ScorerRecord {
            player: Some(player.into()),
            team: Some("Liverpool".into()),
            goals: Some(goals),
            appearances: Some(30),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn contents(warehouse: &SqliteWarehouse, table: &str) -> Vec<(String, String)> {
        let sql = format!("SELECT player, exported_at FROM {table} ORDER BY player");
        let mut stmt = warehouse.connection().prepare(&sql).unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        rows
    }

    #[test]
    fn second_load_replaces_first() {
        let mut warehouse = SqliteWarehouse::in_memory().unwrap();

        load(&mut warehouse, "epl_top_scorers", &[scorer("A", 3), scorer("B", 2)], ts(1_000))
            .unwrap();
        let written =
            load(&mut warehouse, "epl_top_scorers", &[scorer("C", 9)], ts(2_000)).unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            contents(&warehouse, "epl_top_scorers"),
            vec![("C".to_string(), format_timestamp(ts(2_000)))]
        );
    }

    #[test]
    fn every_row_shares_the_export_stamp() {
        let mut warehouse = SqliteWarehouse::in_memory().unwrap();
        let rows = [scorer("A", 3), scorer("B", 2), scorer("C", 1)];

        load(&mut warehouse, "epl_top_scorers", &rows, ts(5_000)).unwrap();

        let stamps: Vec<String> = contents(&warehouse, "epl_top_scorers")
            .into_iter()
            .map(|(_, stamp)| stamp)
            .collect();
        assert_eq!(stamps, vec![format_timestamp(ts(5_000)); 3]);
    }

    #[test]
    fn failed_replace_keeps_previous_rows() {
        let mut warehouse = SqliteWarehouse::in_memory().unwrap();
        load(&mut warehouse, "epl_top_scorers", &[scorer("A", 3)], ts(1_000)).unwrap();

        // A row with the wrong number of cells fails the insert midway.
        let good = scorer("B", 1).values();
        let bad = vec![SqlValue::Text(Some("short".into()))];
        let err = warehouse
            .replace_table("epl_top_scorers", ScorerRecord::COLUMNS, &[good, bad], ts(2_000))
            .unwrap_err();
        assert!(matches!(err, LoadError::Sqlite(_)));

        assert_eq!(
            contents(&warehouse, "epl_top_scorers"),
            vec![("A".to_string(), format_timestamp(ts(1_000)))]
        );
    }

    #[test]
    fn nulls_are_written_as_null() {
        let mut warehouse = SqliteWarehouse::in_memory().unwrap();
        let record = StandingRecord {
            rank: Some(1),
            team: Some("Arsenal".into()),
            ..StandingRecord::default()
        };
        load(&mut warehouse, "epl_standings", &[record], ts(1)).unwrap();

        let wins: Option<i64> = warehouse
            .connection()
            .query_row("SELECT wins FROM epl_standings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(wins, None);
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("epl-wh-{}", std::process::id()));
        let path = dir.join("nested").join("warehouse.db");

        let warehouse = SqliteWarehouse::open(&path).unwrap();
        Box::new(warehouse).close().unwrap();

        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
