use std::sync::Arc;

use async_trait::async_trait;

use super::{
    accumulator::Accumulator, check_row_arity, query_builder, validate_common, BatchError,
    BatchOperation, Combinator, ConfigError,
};
use crate::{executor::StatementExecutor, sql_value::SqlValue};

/// Batches rows into `UPDATE <table> SET ... WHERE <group> OR <group> ...`
/// statements.
///
/// The SET values are fixed at construction and apply to every matched row;
/// each added row contributes one condition group built from the condition
/// columns.
pub struct BatchUpdater<E: StatementExecutor> {
    accumulator: Accumulator<E>,
    condition_columns: Vec<String>,
    default_combinator: Combinator,
}

impl<E: StatementExecutor> BatchUpdater<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        executor: Arc<E>,
        table: &str,
        update_columns: &[&str],
        update_values: Vec<SqlValue>,
        condition_columns: &[&str],
        combinator: Combinator,
        max_batch_size: usize,
        options: Option<E::Options>,
    ) -> Result<Self, ConfigError> {
        validate_common(table, update_columns, max_batch_size)?;
        if update_values.is_empty() {
            return Err(ConfigError::EmptyUpdateValues);
        }
        if update_columns.len() != update_values.len() {
            return Err(ConfigError::ColumnValueLengthMismatch {
                columns: update_columns.len(),
                values: update_values.len(),
            });
        }
        if condition_columns.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }

        let prefix = query_builder::update_prefix(table, update_columns);
        Ok(BatchUpdater {
            accumulator: Accumulator::new(
                executor,
                prefix,
                " OR ",
                update_values,
                max_batch_size,
                options,
            ),
            condition_columns: condition_columns.iter().map(|col| col.to_string()).collect(),
            default_combinator: combinator,
        })
    }

    /// Adds one row of condition values using the construction-time
    /// combinator. Returns `true` when this row filled the batch and it was
    /// flushed.
    pub async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        self.add_row_with_combinator(values, None).await
    }

    /// Adds one row of condition values, overriding the combinator for this
    /// row only.
    ///
    /// The override is evaluated at each call: mixing combinators within one
    /// still-open batch produces mixed clause text across its condition
    /// groups.
    pub async fn add_row_with_combinator(
        &mut self,
        values: Vec<SqlValue>,
        combinator: Option<Combinator>,
    ) -> Result<bool, BatchError> {
        check_row_arity(&values, self.condition_columns.len())?;

        let fragment = query_builder::condition_group(
            &self.condition_columns,
            combinator.unwrap_or(self.default_combinator),
        );
        self.accumulator.append(fragment, values).await
    }

    /// Flushes any pending remainder and closes the updater.
    pub async fn finalize(&mut self) -> Result<(), BatchError> {
        self.accumulator.finalize().await
    }

    /// Rows accumulated in the currently open batch.
    pub fn pending_rows(&self) -> usize {
        self.accumulator.pending_rows()
    }

    /// Rows added over the lifetime of this updater.
    pub fn total_rows(&self) -> u64 {
        self.accumulator.total_rows()
    }
}

#[async_trait]
impl<E: StatementExecutor> BatchOperation for BatchUpdater<E> {
    async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        BatchUpdater::add_row(self, values).await
    }

    async fn finalize(&mut self) -> Result<(), BatchError> {
        BatchUpdater::finalize(self).await
    }
}
