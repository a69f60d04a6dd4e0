use async_trait::async_trait;

use crate::sql_value::SqlValue;

#[derive(thiserror::Error, Debug)]
pub enum ExecutionError {
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ExecutionError {
    pub fn driver<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ExecutionError::Driver(error.into())
    }
}

/// Prepares and runs one parameterized write statement.
///
/// The batch operations only build statement text and ordered parameter
/// lists; everything driver-specific (connections, preparation, dialect
/// placeholder style) belongs to the executor.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Driver-specific statement options, passed through to preparation
    /// untouched.
    type Options: Send + Sync;

    /// Returns the number of rows affected.
    async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        options: Option<&Self::Options>,
    ) -> Result<u64, ExecutionError>;
}
