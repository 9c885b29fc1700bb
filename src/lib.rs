//! sqladapter - a thin adapter over one database connection
//!
//! Every statement goes through argument substitution (`?` / `:name`
//! markers) and table-prefix rewriting (`{{table}}`) before it reaches the
//! driver. Nested `begin`/`commit`/`rollback` calls are reference counted so
//! only the outermost pair touches the real connection.
//!
//! # Example
//! ```ignore
//! use sqladapter::{Adapter, Args, ConnectionConfig, Database, SqlValue};
//! use sqladapter::drivers::MySqlDriver;
//!
//! let config = ConnectionConfig::new("test").user("root").table_prefix("wk_");
//! let mut db = Adapter::<MySqlDriver>::connect(config).await?;
//!
//! db.begin_transaction().await?;
//! db.exec("INSERT INTO {{users}} (name) VALUES (?)", [SqlValue::from("John")]).await?;
//! let id = db.last_insert_id().await?;
//! db.commit().await?;
//!
//! let row = db
//!     .get_row("SELECT * FROM {{users}} WHERE id = :id", Args::named([("id", id)]))
//!     .await?;
//! ```

pub mod config;
pub mod drivers;
pub mod error;
pub mod log;
pub mod query_text;
pub mod traits;
pub mod transaction;
pub mod types;

mod adapter;

// Re-export main types for convenient access
pub use adapter::Adapter;
pub use config::ConnectionConfig;
pub use error::{DbError, Result};
pub use log::{ExecutionLog, LogEntry};
pub use query_text::Dialect;
pub use traits::{Connect, Database, DatabaseDriver};
pub use transaction::TransactionCounter;
pub use types::{Args, RawQueryResult, ResultSet, Row, SqlValue};
