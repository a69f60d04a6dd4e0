use std::sync::Arc;

use async_trait::async_trait;

use super::{
    accumulator::Accumulator, check_row_arity, query_builder, validate_common, BatchError,
    BatchOperation, ConfigError,
};
use crate::{executor::StatementExecutor, sql_value::SqlValue};

/// Batches rows into multi-row `INSERT INTO <table>(...) VALUES (...),(...)`
/// statements.
pub struct BatchInserter<E: StatementExecutor> {
    accumulator: Accumulator<E>,
    row_group: String,
    column_count: usize,
}

impl<E: StatementExecutor> BatchInserter<E> {
    pub fn new(
        executor: Arc<E>,
        table: &str,
        columns: &[&str],
        max_batch_size: usize,
        options: Option<E::Options>,
    ) -> Result<Self, ConfigError> {
        validate_common(table, columns, max_batch_size)?;

        let prefix = query_builder::insert_prefix(table, columns);
        Ok(BatchInserter {
            accumulator: Accumulator::new(
                executor,
                prefix,
                ",",
                Vec::new(),
                max_batch_size,
                options,
            ),
            row_group: query_builder::insert_row_group(columns.len()),
            column_count: columns.len(),
        })
    }

    /// Adds one row of column values, in construction column order. Returns
    /// `true` when this row filled the batch and it was flushed.
    pub async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        check_row_arity(&values, self.column_count)?;
        self.accumulator.append(self.row_group.clone(), values).await
    }

    /// Flushes any pending remainder and closes the inserter.
    pub async fn finalize(&mut self) -> Result<(), BatchError> {
        self.accumulator.finalize().await
    }

    /// Rows accumulated in the currently open batch.
    pub fn pending_rows(&self) -> usize {
        self.accumulator.pending_rows()
    }

    /// Rows added over the lifetime of this inserter.
    pub fn total_rows(&self) -> u64 {
        self.accumulator.total_rows()
    }
}

#[async_trait]
impl<E: StatementExecutor> BatchOperation for BatchInserter<E> {
    async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        BatchInserter::add_row(self, values).await
    }

    async fn finalize(&mut self) -> Result<(), BatchError> {
        BatchInserter::finalize(self).await
    }
}
