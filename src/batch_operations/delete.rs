use std::sync::Arc;

use async_trait::async_trait;

use super::{
    accumulator::Accumulator, check_row_arity, query_builder, validate_common, BatchError,
    BatchOperation, Combinator, ConfigError,
};
use crate::{executor::StatementExecutor, sql_value::SqlValue};

/// Batches rows into `DELETE FROM <table> WHERE <group> OR <group> ...`
/// statements.
///
/// Every added row contributes one condition group; the combinator joining
/// the condition columns inside a group is fixed at construction.
pub struct BatchDeleter<E: StatementExecutor> {
    accumulator: Accumulator<E>,
    row_group: String,
    column_count: usize,
}

impl<E: StatementExecutor> BatchDeleter<E> {
    pub fn new(
        executor: Arc<E>,
        table: &str,
        condition_columns: &[&str],
        combinator: Combinator,
        max_batch_size: usize,
        options: Option<E::Options>,
    ) -> Result<Self, ConfigError> {
        validate_common(table, condition_columns, max_batch_size)?;

        let prefix = query_builder::delete_prefix(table);
        Ok(BatchDeleter {
            accumulator: Accumulator::new(
                executor,
                prefix,
                " OR ",
                Vec::new(),
                max_batch_size,
                options,
            ),
            row_group: query_builder::condition_group(condition_columns, combinator),
            column_count: condition_columns.len(),
        })
    }

    /// Adds one row of condition values. Returns `true` when this row filled
    /// the batch and it was flushed.
    pub async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        check_row_arity(&values, self.column_count)?;
        self.accumulator.append(self.row_group.clone(), values).await
    }

    /// Flushes any pending remainder and closes the deleter.
    pub async fn finalize(&mut self) -> Result<(), BatchError> {
        self.accumulator.finalize().await
    }

    /// Rows accumulated in the currently open batch.
    pub fn pending_rows(&self) -> usize {
        self.accumulator.pending_rows()
    }

    /// Rows added over the lifetime of this deleter.
    pub fn total_rows(&self) -> u64 {
        self.accumulator.total_rows()
    }
}

#[async_trait]
impl<E: StatementExecutor> BatchOperation for BatchDeleter<E> {
    async fn add_row(&mut self, values: Vec<SqlValue>) -> Result<bool, BatchError> {
        BatchDeleter::add_row(self, values).await
    }

    async fn finalize(&mut self) -> Result<(), BatchError> {
        BatchDeleter::finalize(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_operations::testing::RecordingExecutor;

    #[tokio::test]
    async fn test_single_pending_row_flushes_on_finalize() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut deleter = BatchDeleter::new(
            executor.clone(),
            "t",
            &["id", "region"],
            Combinator::Or,
            2,
            None,
        )
        .unwrap();

        deleter.add_row(vec![1i64.into(), "eu".into()]).await.unwrap();
        deleter.finalize().await.unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "DELETE FROM t WHERE id=? OR region=?");
        assert_eq!(calls[0].1, vec![SqlValue::Int8(1), SqlValue::Text("eu".to_string())]);
    }

    #[tokio::test]
    async fn test_rows_joined_with_or() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut deleter =
            BatchDeleter::new(executor.clone(), "t", &["id"], Combinator::And, 2, None).unwrap();

        assert!(!deleter.add_row(vec![1i64.into()]).await.unwrap());
        assert!(deleter.add_row(vec![2i64.into()]).await.unwrap());

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "DELETE FROM t WHERE id=? OR id=?");
        assert_eq!(calls[0].1, vec![SqlValue::Int8(1), SqlValue::Int8(2)]);
    }

    #[tokio::test]
    async fn test_failed_flush_discards_rows() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut deleter =
            BatchDeleter::new(executor.clone(), "t", &["id"], Combinator::And, 1, None).unwrap();

        executor.fail_next();
        let err = deleter.add_row(vec![1i64.into()]).await.unwrap_err();
        assert!(matches!(err, BatchError::Execution(_)));
        assert_eq!(deleter.pending_rows(), 0);
        assert_eq!(deleter.total_rows(), 1);

        deleter.add_row(vec![2i64.into()]).await.unwrap();
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec![SqlValue::Int8(2)]);
    }

    #[tokio::test]
    async fn test_arity_mismatch_rejected() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut deleter =
            BatchDeleter::new(executor.clone(), "t", &["id", "region"], Combinator::Or, 2, None)
                .unwrap();

        let err = deleter.add_row(vec![1i64.into()]).await.unwrap_err();
        assert!(matches!(err, BatchError::RowArityMismatch { expected: 2, actual: 1 }));

        deleter.finalize().await.unwrap();
        assert!(executor.calls().is_empty());
    }
}
