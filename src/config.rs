use serde::Deserialize;

use crate::error::{DbError, Result};

const DEFAULT_HOST: &str = "127.0.0.1";

/// Connection settings for one [`Adapter`](crate::Adapter).
///
/// Unknown keys are ignored when deserializing, so a shared configuration
/// document can carry settings for other components.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    /// `None` uses the driver's default port.
    pub port: Option<u16>,
    #[serde(alias = "name")]
    pub database: String,
    pub user: String,
    #[serde(alias = "pass")]
    pub password: String,
    /// Prepended to every table written as a table marker.
    pub table_prefix: String,
    /// Optional bare marker (for example `wk_`) rewritten to `table_prefix`.
    pub table_marker: Option<String>,
    /// Emit every executed statement through `tracing` at debug level.
    pub debug: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            table_prefix: String::new(),
            table_marker: None,
            debug: false,
        }
    }
}

impl ConnectionConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    ///
    /// # Example
    /// ```
    /// use sqladapter::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_toml_str(r#"
    ///     host = "db.local"
    ///     database = "test"
    ///     table_prefix = "wk_"
    /// "#).unwrap();
    /// assert_eq!(config.port, None);
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn table_marker(mut self, marker: impl Into<String>) -> Self {
        self.table_marker = Some(marker.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
