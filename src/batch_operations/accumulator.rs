use std::sync::Arc;

use tracing::{debug, error};

use super::BatchError;
use crate::{executor::StatementExecutor, sql_value::SqlValue};

/// The batch state machine shared by the three operations.
///
/// Holds the open batch's row fragments and ordered parameters; the
/// statement text is assembled once at flush time by joining the fragments
/// with the operation's row-joiner behind the statement prefix.
///
/// State transitions: `Open(0..max-1)` -> append hits max -> flush ->
/// `Open(0)`; `finalize` flushes any pending remainder and moves to a
/// terminal closed state.
pub(crate) struct Accumulator<E: StatementExecutor> {
    executor: Arc<E>,
    statement_prefix: String,
    row_joiner: &'static str,
    constant_params: Vec<SqlValue>,
    options: Option<E::Options>,
    max_batch_size: usize,
    fragments: Vec<String>,
    params: Vec<SqlValue>,
    pending_rows: usize,
    total_rows: u64,
    closed: bool,
}

impl<E: StatementExecutor> Accumulator<E> {
    pub(crate) fn new(
        executor: Arc<E>,
        statement_prefix: String,
        row_joiner: &'static str,
        constant_params: Vec<SqlValue>,
        max_batch_size: usize,
        options: Option<E::Options>,
    ) -> Self {
        let params = constant_params.clone();
        Accumulator {
            executor,
            statement_prefix,
            row_joiner,
            constant_params,
            options,
            max_batch_size,
            fragments: Vec::new(),
            params,
            pending_rows: 0,
            total_rows: 0,
            closed: false,
        }
    }

    pub(crate) fn pending_rows(&self) -> usize {
        self.pending_rows
    }

    pub(crate) fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Appends one already-validated row. Returns `true` when the row filled
    /// the batch and it was flushed.
    pub(crate) async fn append(
        &mut self,
        fragment: String,
        values: Vec<SqlValue>,
    ) -> Result<bool, BatchError> {
        if self.closed {
            return Err(BatchError::Finalized);
        }

        self.params.extend(values);
        self.fragments.push(fragment);
        self.pending_rows += 1;
        self.total_rows += 1;

        if self.pending_rows == self.max_batch_size {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Flushes any pending remainder and closes the accumulator. A second
    /// call on an already-closed accumulator is a no-op.
    pub(crate) async fn finalize(&mut self) -> Result<(), BatchError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.pending_rows > 0 {
            self.flush().await?;
        } else {
            self.reset();
        }
        Ok(())
    }

    /// Executes the accumulated statement and resets state whether or not
    /// the executor succeeds. Rows in a failed batch are discarded, not
    /// re-queued: at-most-once, no internal retry.
    async fn flush(&mut self) -> Result<(), BatchError> {
        let rows = self.pending_rows;
        let sql = format!("{}{}", self.statement_prefix, self.fragments.join(self.row_joiner));
        debug!("Flushing batch of {} rows: {}", rows, sql);

        let result = self.executor.execute(&sql, &self.params, self.options.as_ref()).await;
        self.reset();

        if let Err(e) = result {
            error!("Batch flush failed, {} rows discarded: {}", rows, e);
            return Err(BatchError::Execution(e));
        }
        Ok(())
    }

    /// Clears the open batch, re-seeding the parameter sequence with the
    /// constant prefix values. The lifetime counter is preserved.
    fn reset(&mut self) {
        self.pending_rows = 0;
        self.fragments.clear();
        self.params.clear();
        self.params.extend_from_slice(&self.constant_params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_operations::testing::RecordingExecutor;

    fn accumulator(
        executor: Arc<RecordingExecutor>,
        max_batch_size: usize,
    ) -> Accumulator<RecordingExecutor> {
        Accumulator::new(executor, "PREFIX ".to_string(), ",", Vec::new(), max_batch_size, None)
    }

    #[tokio::test]
    async fn test_append_below_threshold_does_not_execute() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = accumulator(executor.clone(), 3);

        assert!(!acc.append("(?)".to_string(), vec![SqlValue::Int8(1)]).await.unwrap());
        assert!(!acc.append("(?)".to_string(), vec![SqlValue::Int8(2)]).await.unwrap());

        assert!(executor.calls().is_empty());
        assert_eq!(acc.pending_rows(), 2);
        assert_eq!(acc.total_rows(), 2);
    }

    #[tokio::test]
    async fn test_threshold_flush_joins_fragments() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = accumulator(executor.clone(), 2);

        acc.append("(?)".to_string(), vec![SqlValue::Int8(1)]).await.unwrap();
        let flushed = acc.append("(?)".to_string(), vec![SqlValue::Int8(2)]).await.unwrap();

        assert!(flushed);
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "PREFIX (?),(?)");
        assert_eq!(calls[0].1, vec![SqlValue::Int8(1), SqlValue::Int8(2)]);
        assert_eq!(acc.pending_rows(), 0);
        assert_eq!(acc.total_rows(), 2);
    }

    #[tokio::test]
    async fn test_constant_params_reseeded_after_flush() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = Accumulator::new(
            executor.clone(),
            "PREFIX ".to_string(),
            ",",
            vec![SqlValue::Text("fixed".to_string())],
            1,
            None,
        );

        acc.append("(?)".to_string(), vec![SqlValue::Int8(1)]).await.unwrap();
        acc.append("(?)".to_string(), vec![SqlValue::Int8(2)]).await.unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, vec![SqlValue::Text("fixed".to_string()), SqlValue::Int8(1)]);
        assert_eq!(calls[1].1, vec![SqlValue::Text("fixed".to_string()), SqlValue::Int8(2)]);
    }

    #[tokio::test]
    async fn test_failed_flush_discards_batch_and_resets() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = accumulator(executor.clone(), 1);

        executor.fail_next();
        let err = acc.append("(?)".to_string(), vec![SqlValue::Int8(1)]).await.unwrap_err();
        assert!(matches!(err, BatchError::Execution(_)));
        assert_eq!(acc.pending_rows(), 0);

        // the failed batch is gone, the next one carries only new rows
        acc.append("(?)".to_string(), vec![SqlValue::Int8(2)]).await.unwrap();
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec![SqlValue::Int8(2)]);
    }

    #[tokio::test]
    async fn test_finalize_without_pending_rows_executes_nothing() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = accumulator(executor.clone(), 2);

        acc.finalize().await.unwrap();
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_append_after_finalize_is_rejected() {
        let executor = Arc::new(RecordingExecutor::default());
        let mut acc = accumulator(executor.clone(), 2);

        acc.finalize().await.unwrap();
        let err = acc.append("(?)".to_string(), vec![SqlValue::Int8(1)]).await.unwrap_err();
        assert!(matches!(err, BatchError::Finalized));

        // second finalize on a closed accumulator is a no-op
        acc.finalize().await.unwrap();
        assert!(executor.calls().is_empty());
    }
}
