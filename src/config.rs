//! Runtime configuration.
//!
//! Every setting is a CLI flag with an environment-variable fallback:
//! CLI flag > env var > default.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

/// Server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-api")]
#[command(author, version, about = "Todo list HTTP service", long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "TODO_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "TODO_PORT", default_value_t = 9000)]
    pub port: u16,

    #[command(flatten)]
    pub db: DbConfig,

    /// HTML file served at / (defaults to the built-in page)
    #[arg(long, env = "TODO_HOME_TEMPLATE")]
    pub home_template: Option<PathBuf>,

    /// Seconds a single request may run before it is answered with 408
    #[arg(
        long,
        env = "TODO_REQUEST_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "TODO_DRAIN_TIMEOUT_SECS", default_value_t = 5)]
    pub drain_timeout_secs: u64,

    /// Serve the OpenAPI viewer at /docs
    #[arg(long, env = "TODO_ENABLE_DOCS")]
    pub enable_docs: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// Database connection settings
#[derive(Args, Debug, Clone)]
pub struct DbConfig {
    /// Database endpoint (ws://host:port for a server, mem:// for in-memory)
    #[arg(
        long = "db-endpoint",
        env = "TODO_DB_ENDPOINT",
        default_value = "ws://localhost:8000"
    )]
    pub endpoint: String,

    /// Database namespace
    #[arg(long = "db-namespace", env = "TODO_DB_NAMESPACE", default_value = "demo")]
    pub namespace: String,

    /// Database name
    #[arg(long = "db-name", env = "TODO_DB_NAME", default_value = "demo_todo")]
    pub database: String,

    /// Table holding the todo records
    #[arg(long = "db-table", env = "TODO_DB_TABLE", default_value = "todo")]
    pub table: String,

    /// Root user to sign in as (sign-in is skipped when unset)
    #[arg(long = "db-username", env = "TODO_DB_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for --db-username
    #[arg(
        long = "db-password",
        env = "TODO_DB_PASSWORD",
        hide_env_values = true,
        requires = "username"
    )]
    pub password: Option<String>,

    /// Seconds a single database call may take
    #[arg(
        long = "db-timeout-secs",
        env = "TODO_DB_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl DbConfig {
    /// Settings for an embedded in-memory store.
    pub fn in_memory() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "test".to_string(),
            database: "test".to_string(),
            table: "todo".to_string(),
            username: None,
            password: None,
            timeout_secs: 10,
        }
    }
}
