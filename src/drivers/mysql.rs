use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mysql::{prelude::Queryable, Conn, OptsBuilder, Value};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{DbError, Result};
use crate::query_text::Dialect;
use crate::traits::{Connect, DatabaseDriver};
use crate::types::RawQueryResult;

const DEFAULT_MYSQL_PORT: u16 = 3306;
const DISABLE_STRICT_MODE_SQL: &str = "SET SESSION sql_mode = ''";
const BEGIN_SQL: &str = "START TRANSACTION";
const COMMIT_SQL: &str = "COMMIT";
const ROLLBACK_SQL: &str = "ROLLBACK";
const LAST_INSERT_ID_SQL: &str = "SELECT LAST_INSERT_ID()";
pub(crate) const TABLE_INFO_SQL: &str = "SELECT COLUMN_NAME AS `Field`, COLUMN_TYPE AS `Type`, \
     IS_NULLABLE AS `Null`, COLUMN_KEY AS `Key`, COLUMN_DEFAULT AS `Default`, EXTRA AS `Extra` \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";
const POISONED_CONNECTION_MESSAGE: &str = "mysql connection state was poisoned";

/// MySQL driver implementation using the `mysql` crate.
///
/// The client is blocking, so every call runs on tokio's blocking pool
/// against the single session this driver owns.
pub struct MySqlDriver {
    conn: Arc<Mutex<Conn>>,
}

impl MySqlDriver {
    /// Connect, then clear `sql_mode` for the session.
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port.unwrap_or(DEFAULT_MYSQL_PORT))
            .user(non_empty(&config.user))
            .pass(non_empty(&config.password))
            .db_name(non_empty(&config.database));

        let conn = tokio::task::spawn_blocking(move || -> Result<Conn> {
            let mut conn = Conn::new(opts).map_err(|e| DbError::Connection(e.to_string()))?;
            conn.query_drop(DISABLE_STRICT_MODE_SQL)
                .map_err(|e| DbError::Connection(e.to_string()))?;
            Ok(conn)
        })
        .await
        .map_err(|e| DbError::Connection(e.to_string()))??;

        debug!(host = %config.host, "mysql session ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the session on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Conn) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| DbError::Query(POISONED_CONNECTION_MESSAGE.to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DbError::Query(format!("mysql worker failed: {e}")))?
    }

    async fn control(&self, sql: &'static str) -> Result<()> {
        self.with_conn(move |conn| {
            conn.query_drop(sql)
                .map_err(|e| DbError::Transaction(e.to_string()))
        })
        .await
    }
}

#[async_trait]
impl Connect for MySqlDriver {
    async fn connect(config: &ConnectionConfig) -> Result<Self> {
        Self::open(config).await
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn query(&self, sql: &str) -> Result<RawQueryResult> {
        let sql = sql.to_string();
        self.with_conn(move |conn| {
            let result = conn
                .query_iter(sql.as_str())
                .map_err(|e| DbError::Query(e.to_string()))?;

            let columns: Vec<String> = result
                .columns()
                .as_ref()
                .iter()
                .map(|c| c.name_str().into_owned())
                .collect();

            let mut rows = Vec::new();
            for row in result {
                let row = row.map_err(|e| DbError::Query(e.to_string()))?;
                rows.push(
                    row.unwrap_raw()
                        .into_iter()
                        .map(|v| v.and_then(value_to_string))
                        .collect(),
                );
            }

            Ok(RawQueryResult::new(columns, rows))
        })
        .await
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let sql = sql.to_string();
        self.with_conn(move |conn| {
            conn.query_drop(sql.as_str())
                .map_err(|e| DbError::Query(e.to_string()))?;
            Ok(conn.affected_rows())
        })
        .await
    }

    async fn begin(&self) -> Result<()> {
        self.control(BEGIN_SQL).await
    }

    async fn commit(&self) -> Result<()> {
        self.control(COMMIT_SQL).await
    }

    async fn rollback(&self) -> Result<()> {
        self.control(ROLLBACK_SQL).await
    }

    async fn set_auto_commit(&self, enabled: bool) -> Result<()> {
        let sql = if enabled {
            "SET autocommit = 1"
        } else {
            "SET autocommit = 0"
        };
        self.with_conn(move |conn| {
            conn.query_drop(sql)
                .map_err(|e| DbError::Query(e.to_string()))
        })
        .await
    }

    fn last_insert_id_sql(&self) -> &'static str {
        LAST_INSERT_ID_SQL
    }

    fn table_info_sql(&self) -> &'static str {
        TABLE_INFO_SQL
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Convert a text-protocol value to its string form. NULL becomes `None`.
fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Double(d) => Some(d.to_string()),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut s = format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            );
            if micros > 0 {
                s.push_str(&format!(".{micros:06}"));
            }
            Some(s)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if negative { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            let mut s = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
            if micros > 0 {
                s.push_str(&format!(".{micros:06}"));
            }
            Some(s)
        }
    }
}
