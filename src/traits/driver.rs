use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::query_text::Dialect;
use crate::types::RawQueryResult;

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Holding exactly one session with the database
/// - Executing final SQL text (no parameters; substitution already happened)
/// - Converting results to RawQueryResult
///
/// Failures carry the client library's message: `DbError::Query` for
/// statements, `DbError::Transaction` for transaction control.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Quoting and comment rules of the backend.
    fn dialect(&self) -> Dialect;

    /// Execute a row-returning statement.
    async fn query(&self, sql: &str) -> Result<RawQueryResult>;

    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str) -> Result<u64>;

    async fn begin(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;

    /// Toggle the session's auto-commit attribute.
    async fn set_auto_commit(&self, enabled: bool) -> Result<()>;

    /// Statement reading the last auto-generated key of this session.
    fn last_insert_id_sql(&self) -> &'static str;

    /// Column listing for one table. The single `?` marker takes the table
    /// name.
    fn table_info_sql(&self) -> &'static str;
}

/// Drivers that can open their own connection from a [`ConnectionConfig`].
#[async_trait]
pub trait Connect: DatabaseDriver + Sized {
    async fn connect(config: &ConnectionConfig) -> Result<Self>;
}
