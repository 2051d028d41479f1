//! Configuration loaded from environment variables

use std::env;

use anyhow::{Context, Result};

use crate::source::Attribute;

/// Storage dialect, used to decide whether a windowed total count can be
/// requested together with the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Mssql,
    Mysql,
    Sqlite,
    /// No window functions; totals always come from a separate count.
    #[default]
    Generic,
}

impl Dialect {
    pub fn window_count_expression(&self) -> Option<&'static str> {
        match self {
            Dialect::Postgres | Dialect::Mysql | Dialect::Sqlite => Some("COUNT(*) OVER()"),
            Dialect::Mssql => Some("COUNT(1) OVER()"),
            Dialect::Generic => None,
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mssql" | "sqlserver" => Ok(Dialect::Mssql),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" => Ok(Dialect::Sqlite),
            "generic" | "none" => Ok(Dialect::Generic),
            _ => Err(anyhow::anyhow!("Unknown dialect: {}", s)),
        }
    }
}

/// Settings shared by every connection resolver of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub dialect: Dialect,
    /// Alias of the windowed count attribute.
    pub full_count_column: String,
    /// Reject `first` together with `last` instead of preferring `first`.
    pub strict_arguments: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Generic,
            full_count_column: "full_count".to_string(),
            strict_arguments: true,
        }
    }
}

impl ConnectionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            dialect: match env::var("RELAY_DIALECT") {
                Ok(value) => value.parse().context("Invalid RELAY_DIALECT")?,
                Err(_) => defaults.dialect,
            },
            full_count_column: env::var("RELAY_FULL_COUNT_COLUMN")
                .unwrap_or(defaults.full_count_column),
            strict_arguments: env::var("RELAY_STRICT_ARGUMENTS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.strict_arguments),
        })
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// The attribute carrying the windowed count, when the dialect has one.
    pub fn window_count_attribute(&self) -> Option<Attribute> {
        self.dialect
            .window_count_expression()
            .map(|expression| Attribute::WindowCount {
                expression: expression.to_string(),
                alias: self.full_count_column.clone(),
            })
    }
}

/// Demo server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    pub connection: ConnectionConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            connection: ConnectionConfig::from_env()?,
        })
    }
}
