use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{DbError, Result};
use crate::log::ExecutionLog;
use crate::query_text;
use crate::traits::{Connect, Database, DatabaseDriver};
use crate::transaction::{Outcome, TransactionCounter};
use crate::types::{Args, ResultSet, Row, SqlValue};

/// Main entry point for sqladapter.
/// Owns one driver connection plus its transaction depth and execution log.
///
/// An adapter is meant for one caller at a time; share it behind a lock or
/// open one adapter per unit of work.
pub struct Adapter<D> {
    config: ConnectionConfig,
    driver: D,
    transactions: TransactionCounter,
    log: ExecutionLog,
    last_error: Option<String>,
}

impl<D: Connect> Adapter<D> {
    /// Open a connection with the driver `D`.
    ///
    /// # Example
    /// ```ignore
    /// let config = ConnectionConfig::new("test").user("root").table_prefix("wk_");
    /// let mut db = Adapter::<MySqlDriver>::connect(config).await?;
    /// let rows = db.get_all("SELECT * FROM {{users}} WHERE id > ?", [SqlValue::Int32(10)]).await?;
    /// ```
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let driver = D::connect(&config).await?;
        info!(
            host = %config.host,
            database = %config.database,
            "database connection opened"
        );
        Ok(Self::with_driver(config, driver))
    }
}

impl<D: DatabaseDriver> Adapter<D> {
    /// Create an adapter over an already connected driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(config: ConnectionConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            transactions: TransactionCounter::new(),
            log: ExecutionLog::new(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    /// Number of statements sent to the driver so far.
    pub fn exec_times(&self) -> u64 {
        self.log.exec_times()
    }

    pub fn transaction_depth(&self) -> u32 {
        self.transactions.depth()
    }

    /// Substitute arguments, then rewrite table markers.
    pub fn prepare_sql(&self, sql: &str, args: &Args) -> Result<String> {
        let dialect = self.driver.dialect();
        let sql = query_text::format(sql, args, dialect)?;
        let prefixed = query_text::apply_table_prefix(
            &sql,
            &self.config.table_prefix,
            self.config.table_marker.as_deref(),
            dialect,
        );
        Ok(prefixed.into_owned())
    }

    fn record_statement(&mut self, sql: &str) {
        self.log.record_statement(sql);
        if self.config.debug {
            debug!(exec_times = self.log.exec_times(), sql = %sql, "executing statement");
        }
    }

    /// Remember a driver failure and hand back the error to return.
    fn record_failure(&mut self, err: DbError, logged: bool) -> DbError {
        let message = err.message().to_string();
        if logged {
            self.log.record_error(&message);
        }
        warn!(error = %message, "database operation failed");
        self.last_error = Some(message);
        err
    }

    async fn finish_transaction(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Deferred | Outcome::Begin => Ok(()),
            Outcome::Commit => match self.driver.commit().await {
                Ok(()) => Ok(()),
                Err(e) => {
                    let err =
                        DbError::Transaction(format!("transaction commit error: {}", e.message()));
                    Err(self.record_failure(err, false))
                }
            },
            Outcome::Rollback => match self.driver.rollback().await {
                Ok(()) => Ok(()),
                Err(e) => {
                    let err = DbError::Transaction(format!(
                        "transaction rollback error: {}",
                        e.message()
                    ));
                    Err(self.record_failure(err, false))
                }
            },
        }
    }
}

#[async_trait]
impl<D: DatabaseDriver> Database for Adapter<D> {
    async fn query<A>(&mut self, sql: &str, args: A) -> Result<ResultSet>
    where
        A: Into<Args> + Send,
    {
        let sql = self.prepare_sql(sql, &args.into())?;
        self.record_statement(&sql);

        match self.driver.query(&sql).await {
            Ok(raw) => Ok(ResultSet::from_raw(raw)),
            Err(e) => {
                let err = DbError::Query(e.message().to_string());
                Err(self.record_failure(err, true))
            }
        }
    }

    async fn exec<A>(&mut self, sql: &str, args: A) -> Result<u64>
    where
        A: Into<Args> + Send,
    {
        let sql = self.prepare_sql(sql, &args.into())?;
        self.record_statement(&sql);

        match self.driver.execute(&sql).await {
            Ok(affected) => Ok(affected),
            Err(e) => {
                let err = DbError::Query(e.message().to_string());
                Err(self.record_failure(err, true))
            }
        }
    }

    async fn last_insert_id(&mut self) -> Result<String> {
        let sql = self.driver.last_insert_id_sql();
        self.get_column(sql, Args::none())
            .await?
            .ok_or_else(|| DbError::Query("no insert id is available on this session".to_string()))
    }

    async fn get_table_info(&mut self, table: &str) -> Result<Vec<Row>> {
        let table = query_text::apply_table_prefix(
            table,
            &self.config.table_prefix,
            self.config.table_marker.as_deref(),
            self.driver.dialect(),
        )
        .into_owned();
        let sql = self.driver.table_info_sql();
        self.get_all(sql, [SqlValue::Text(table)]).await
    }

    async fn begin_transaction(&mut self) -> Result<&mut Self> {
        if self.transactions.begin() == Outcome::Begin {
            if let Err(e) = self.driver.begin().await {
                let err = DbError::Transaction(format!(
                    "transaction begin error: {}",
                    e.message()
                ));
                return Err(self.record_failure(err, false));
            }
        }
        self.transactions.entered();
        if self.config.debug {
            debug!(depth = self.transactions.depth(), "transaction entered");
        }
        Ok(self)
    }

    async fn commit(&mut self) -> Result<()> {
        let outcome = self.transactions.commit()?;
        self.finish_transaction(outcome).await?;
        if outcome == Outcome::Rollback {
            return Err(DbError::Transaction(
                "transaction was rolled back: a nested rollback marked it rollback-only"
                    .to_string(),
            ));
        }
        Ok(())
    }

    async fn roll_back(&mut self) -> Result<()> {
        let outcome = self.transactions.rollback()?;
        self.finish_transaction(outcome).await
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> Result<&mut Self> {
        if self.transactions.is_active() {
            warn!(
                depth = self.transactions.depth(),
                "auto-commit toggled inside an open transaction"
            );
        }
        if let Err(e) = self.driver.set_auto_commit(enabled).await {
            return Err(self.record_failure(e, false));
        }
        Ok(self)
    }

    fn get_last_err(&self) -> String {
        self.last_error.clone().unwrap_or_default()
    }
}
