//! Configuration loading and representation.
//!
//! Everything comes from the process environment (a `.env` loader is the
//! caller's business). Missing variables fall back to development defaults.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value:?}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be a boolean (true/false/1/0), got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Where todo rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local store (dev/test). Contents vanish on restart.
    InMemory,
    /// Postgres reachable at the given URL.
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub run_migrations: bool,
}

impl Config {
    /// Reads `BIND_ADDR`, `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` and
    /// `RUN_MIGRATIONS` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { var: "BIND_ADDR", value })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::InvalidAddr {
                    var: "BIND_ADDR",
                    value: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        let storage = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(value) => match value.trim().parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            return Err(ConfigError::InvalidNumber {
                                var: "DATABASE_MAX_CONNECTIONS",
                                value,
                            });
                        }
                    },
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                StorageBackend::Postgres { url, max_connections }
            }
            None => StorageBackend::InMemory,
        };

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(value) => parse_bool("RUN_MIGRATIONS", value)?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            storage,
            run_migrations,
        })
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_storage() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.storage, StorageBackend::InMemory);
        assert!(cfg.run_migrations);
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/todo"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("RUN_MIGRATIONS", "false"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageBackend::Postgres {
                url: "postgres://localhost/todo".to_string(),
                max_connections: 12,
            }
        );
        assert!(!cfg.run_migrations);
    }

    #[test]
    fn blank_database_url_is_ignored() {
        let cfg = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::InMemory);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            config(&[("DATABASE_URL", "postgres://x"), ("DATABASE_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[("RUN_MIGRATIONS", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }
}
