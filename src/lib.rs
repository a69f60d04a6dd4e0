// public
pub mod batch_operations;

mod executor;
pub use executor::{ExecutionError, StatementExecutor};

mod postgres;
pub use postgres::{connection_string, PostgresConnectionError, PostgresExecutor};

mod sql_value;
pub use sql_value::SqlValue;

mod logger;
pub use logger::{setup_info_logger, setup_logger};

pub use batch_operations::{
    BatchDeleter, BatchError, BatchInserter, BatchOperation, BatchUpdater, Combinator, ConfigError,
};

// export 3rd party dependencies
pub use async_trait::async_trait;
pub use tokio_postgres::types::Type as PgType;
