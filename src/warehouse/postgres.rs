//! `PostgreSQL`-backed implementation of [`Warehouse`].
//!
//! Uses the sync `postgres` crate. Tables live in the configured schema;
//! both schema and table are created on first use.

use chrono::{DateTime, Utc};
use postgres::types::ToSql;
use postgres::{Client, Config, NoTls};
use tracing::info;

use crate::config::PostgresConfig;
use crate::error::LoadError;
use crate::warehouse::{
    Column, ColumnType, SqlValue, Warehouse, create_table_sql, insert_sql, quote_ident,
};

/// Create with [`PostgresWarehouse::connect`].
pub struct PostgresWarehouse {
    client: Client,
    schema: String,
}

impl PostgresWarehouse {
    /// Connect and verify the connection with a trivial query.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Postgres`] if the server is unreachable or rejects
    /// the credentials.
    pub fn connect(config: &PostgresConfig) -> Result<Self, LoadError> {
        let mut client = Config::new()
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user)
            .password(&config.password)
            .connect(NoTls)?;
        client.simple_query("SELECT 1")?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            schema = %config.schema,
            "Warehouse connection established"
        );
        Ok(Self {
            client,
            schema: config.schema.clone(),
        })
    }

    fn qualified(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(table))
    }
}

fn pg_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Int => "BIGINT",
        ColumnType::Text => "TEXT",
    }
}

fn to_param(value: &SqlValue) -> Box<dyn ToSql + Sync> {
    match value {
        SqlValue::Int(v) => Box::new(*v),
        SqlValue::Text(v) => Box::new(v.clone()),
    }
}

impl Warehouse for PostgresWarehouse {
    fn replace_table(
        &mut self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<SqlValue>],
        exported_at: DateTime<Utc>,
    ) -> Result<u64, LoadError> {
        let qualified = self.qualified(table);
        let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema));
        let create_table = create_table_sql(&qualified, columns, pg_type, "TIMESTAMPTZ");

        // Dropping `tx` without commit rolls everything back.
        let mut tx = self.client.transaction()?;
        tx.batch_execute(&create_schema)?;
        tx.batch_execute(&create_table)?;
        let delete = format!("DELETE FROM {qualified}");
        tx.execute(delete.as_str(), &[])?;

        let stmt = tx.prepare(&insert_sql(&qualified, columns, "$"))?;
        let mut count = 0u64;
        for row in rows {
            let mut params: Vec<Box<dyn ToSql + Sync>> = row.iter().map(to_param).collect();
            params.push(Box::new(exported_at));
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p).collect();
            count += tx.execute(&stmt, &refs)?;
        }
        tx.commit()?;

        Ok(count)
    }

    fn close(self: Box<Self>) -> Result<(), LoadError> {
        self.client.close()?;
        Ok(())
    }
}
