//! Server configuration.
//!
//! Every setting can come from a command-line flag or an environment
//! variable; flags win over the environment.

use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;

/// Default grace period for in-flight connections at shutdown, in seconds.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;

/// Default write timeout, in seconds.
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

/// Default maximum request line length (64 KB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Runtime configuration for the linekv server.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "linekv", author, version, about, long_about = None)]
pub struct Config {
    /// Host to bind to.
    #[arg(long, env = "LINEKV_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on. Use 0 for an ephemeral port.
    #[arg(short, long, env = "LINEKV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds in-flight connections get to finish after a shutdown signal.
    #[arg(long = "grace-period", env = "LINEKV_GRACE_PERIOD", default_value_t = DEFAULT_GRACE_PERIOD_SECS)]
    pub grace_period_secs: u64,

    /// Close connections that send nothing for this many seconds.
    #[arg(long = "idle-timeout", env = "LINEKV_IDLE_TIMEOUT")]
    pub idle_timeout_secs: Option<u64>,

    /// Close connections whose response cannot be written within this many seconds.
    #[arg(long = "write-timeout", env = "LINEKV_WRITE_TIMEOUT", default_value_t = DEFAULT_WRITE_TIMEOUT_SECS)]
    pub write_timeout_secs: u64,

    /// Longest accepted request line, in bytes.
    #[arg(long, env = "LINEKV_MAX_LINE_LENGTH", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            idle_timeout_secs: None,
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT_SECS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl Config {
    /// Returns the bind address as a string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// The per-connection limits derived from this configuration.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            max_line_length: self.max_line_length,
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            write_timeout: Some(Duration::from_secs(self.write_timeout_secs)),
        }
    }
}

/// Limits applied to each client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub max_line_length: usize,
    pub idle_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Config::default().connection_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["linekv"]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert_eq!(config.idle_timeout_secs, None);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "linekv",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--grace-period",
            "1",
            "--idle-timeout",
            "30",
            "--max-line-length",
            "128",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.grace_period(), Duration::from_secs(1));

        let conn = config.connection_config();
        assert_eq!(conn.idle_timeout, Some(Duration::from_secs(30)));
        assert_eq!(conn.max_line_length, 128);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Config::try_parse_from(["linekv", "--port", "not-a-port"]).is_err());
        assert!(Config::try_parse_from(["linekv", "--port", "70000"]).is_err());
    }
}
