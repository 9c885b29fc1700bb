use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Args, ResultSet, Row};

/// Public contract of an adapter.
///
/// Every statement runs through argument substitution and table-prefix
/// rewriting before reaching the driver. The fetch helpers never treat
/// "no rows" as an error.
#[async_trait]
pub trait Database: Send {
    /// Run a row-returning statement.
    async fn query<A>(&mut self, sql: &str, args: A) -> Result<ResultSet>
    where
        A: Into<Args> + Send;

    /// Run a statement without a row set and return the affected row count.
    async fn exec<A>(&mut self, sql: &str, args: A) -> Result<u64>
    where
        A: Into<Args> + Send;

    /// All rows of the result.
    async fn get_all<A>(&mut self, sql: &str, args: A) -> Result<Vec<Row>>
    where
        A: Into<Args> + Send,
    {
        Ok(self.query(sql, args).await?.fetch_all())
    }

    /// The first row, or `None` when the result is empty.
    async fn get_row<A>(&mut self, sql: &str, args: A) -> Result<Option<Row>>
    where
        A: Into<Args> + Send,
    {
        Ok(self.query(sql, args).await?.fetch())
    }

    /// The first column of the first row. `None` for no rows or a NULL value.
    async fn get_column<A>(&mut self, sql: &str, args: A) -> Result<Option<String>>
    where
        A: Into<Args> + Send,
    {
        Ok(self.query(sql, args).await?.fetch_column())
    }

    /// Auto-generated key of the last insert on this session.
    async fn last_insert_id(&mut self) -> Result<String>;

    /// One row per column of `table`, in declaration order. The name goes
    /// through table-prefix rewriting first; an unknown table yields no rows.
    async fn get_table_info(&mut self, table: &str) -> Result<Vec<Row>>;

    async fn begin_transaction(&mut self) -> Result<&mut Self>;

    async fn commit(&mut self) -> Result<()>;

    async fn roll_back(&mut self) -> Result<()>;

    async fn set_auto_commit(&mut self, enabled: bool) -> Result<&mut Self>;

    /// Diagnostic text of the most recent driver failure; empty if none.
    fn get_last_err(&self) -> String;
}
