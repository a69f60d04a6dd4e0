//! Batch accumulation engine for multi-row INSERT, UPDATE and DELETE
//! statements.
//!
//! Each operation owns an [`accumulator::Accumulator`] configured with an
//! operation-specific statement prefix and per-row fragment shape. Rows are
//! appended one at a time; once the configured batch size is reached the
//! accumulated statement is executed and state resets for the next round.

mod accumulator;
mod delete;
mod insert;
mod query_builder;
mod update;

pub use delete::BatchDeleter;
pub use insert::BatchInserter;
pub use update::BatchUpdater;

use std::{fmt, str::FromStr};

use async_trait::async_trait;

use crate::{executor::ExecutionError, sql_value::SqlValue};

/// The boolean operator joining condition columns within one row's WHERE
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Combinator {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            _ => Err(ConfigError::UnknownCombinator(value.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Table name must not be empty")]
    EmptyTableName,

    #[error("Column list must not be empty")]
    EmptyColumns,

    #[error("Update values must not be empty")]
    EmptyUpdateValues,

    #[error("Update columns ({columns}) and update values ({values}) must be the same length")]
    ColumnValueLengthMismatch { columns: usize, values: usize },

    #[error("Max batch size must be at least 1")]
    ZeroMaxBatchSize,

    #[error("Unknown condition combinator: {0}")]
    UnknownCombinator(String),
}

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Row must not be empty")]
    EmptyRow,

    #[error("Row has {actual} values but the operation expects {expected}")]
    RowArityMismatch { expected: usize, actual: usize },

    #[error("Operation already finalized")]
    Finalized,

    #[error("Statement execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// Common surface over the three batch operations.
#[async_trait]
pub trait BatchOperation {
    /// Adds one row to the open batch. Returns `true` when the row filled
    /// the batch and triggered a flush.
    async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError>;

    /// Flushes any pending remainder and closes the operation. Further rows
    /// are rejected with [`BatchError::Finalized`].
    async fn finalize(&mut self) -> Result<(), BatchError>;
}

fn validate_common(
    table: &str,
    columns: &[&str],
    max_batch_size: usize,
) -> Result<(), ConfigError> {
    if table.trim().is_empty() {
        return Err(ConfigError::EmptyTableName);
    }
    if columns.is_empty() {
        return Err(ConfigError::EmptyColumns);
    }
    if max_batch_size < 1 {
        return Err(ConfigError::ZeroMaxBatchSize);
    }
    Ok(())
}

/// Rejects rows before anything is appended, so a failed call leaves the
/// open batch untouched and the caller can retry with corrected input.
fn check_row_arity(values: &[SqlValue], expected: usize) -> Result<(), BatchError> {
    if values.is_empty() {
        return Err(BatchError::EmptyRow);
    }
    if values.len() != expected {
        return Err(BatchError::RowArityMismatch { expected, actual: values.len() });
    }
    Ok(())
}
