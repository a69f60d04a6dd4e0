use std::env;

use async_trait::async_trait;
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use dotenv::dotenv;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{
    types::{ToSql, Type as PgType},
    Config,
};
use tracing::debug;

use crate::{
    executor::{ExecutionError, StatementExecutor},
    sql_value::SqlValue,
};

pub fn connection_string() -> Result<String, env::VarError> {
    dotenv().ok();
    let connection = env::var("DATABASE_URL")?;
    Ok(connection)
}

#[derive(thiserror::Error, Debug)]
pub enum PostgresConnectionError {
    #[error("The database connection string is wrong please check your environment: {0}")]
    DatabaseConnectionConfigWrong(#[from] env::VarError),

    #[error("Connection pool error: {0}")]
    ConnectionPoolError(#[from] tokio_postgres::Error),

    #[error("Could not parse connection string make sure it is correctly formatted")]
    CouldNotParseConnectionString,

    #[error("Could not create tls connector")]
    CouldNotCreateTlsConnector,
}

/// Statement executor backed by a pooled PostgreSQL connection.
///
/// The batch operations emit dialect-neutral `?` placeholders; this executor
/// rewrites them to the `$N` markers PostgreSQL expects before preparing.
pub struct PostgresExecutor {
    pool: Pool<PostgresConnectionManager<MakeTlsConnector>>,
}

impl PostgresExecutor {
    /// Connects using the `DATABASE_URL` environment variable.
    pub async fn new() -> Result<Self, PostgresConnectionError> {
        let connection_str = connection_string()?;
        Self::with_connection_string(&connection_str).await
    }

    pub async fn with_connection_string(
        connection_str: &str,
    ) -> Result<Self, PostgresConnectionError> {
        let config: Config = connection_str
            .parse()
            .map_err(|_| PostgresConnectionError::CouldNotParseConnectionString)?;

        let connector = TlsConnector::builder()
            .build()
            .map_err(|_| PostgresConnectionError::CouldNotCreateTlsConnector)?;
        let tls_connector = MakeTlsConnector::new(connector);

        let manager = PostgresConnectionManager::new(config, tls_connector);
        let pool = Pool::builder().build(manager).await?;

        Ok(PostgresExecutor { pool })
    }
}

/// Rewrites positional `?` placeholders to numbered `$N` markers, skipping
/// anything inside single-quoted literals.
fn positional_to_numbered(sql: &str) -> String {
    let mut rewritten = String::with_capacity(sql.len() + 8);
    let mut next_index = 0usize;
    let mut in_literal = false;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                rewritten.push(ch);
            }
            '?' if !in_literal => {
                next_index += 1;
                rewritten.push('$');
                rewritten.push_str(&next_index.to_string());
            }
            _ => rewritten.push(ch),
        }
    }

    rewritten
}

#[async_trait]
impl StatementExecutor for PostgresExecutor {
    /// Parameter types forwarded to `prepare_typed`.
    type Options = Vec<PgType>;

    async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        options: Option<&Self::Options>,
    ) -> Result<u64, ExecutionError> {
        let sql = positional_to_numbered(sql);
        debug!("Executing batch statement: {}", sql);

        let conn = self.pool.get().await.map_err(ExecutionError::driver)?;

        let statement = match options {
            Some(parameter_types) => conn.prepare_typed(&sql, parameter_types).await,
            None => conn.prepare(&sql).await,
        }
        .map_err(ExecutionError::driver)?;

        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|param| param as &(dyn ToSql + Sync)).collect();

        conn.execute(&statement, &params).await.map_err(ExecutionError::driver)
    }
}
