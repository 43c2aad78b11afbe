/// Configuration management for the handles server
use crate::{
    db::PostgresConfig,
    error::{HandlesError, HandlesResult},
    template::UrlTemplate,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub redirect: RedirectConfig,
    pub provider: ProviderConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Query parameter read by `/domainz`
    pub check_domain_parameter: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Where unmatched routes redirect to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Used when the handle resolved to a DID
    pub did_template: UrlTemplate,
    /// Used when the handle has no DID
    pub handle_template: UrlTemplate,
}

/// DID provider selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Memory {
        /// `(handle, did)` pairs
        dids: Vec<(String, String)>,
        domains: Vec<String>,
    },
    Postgres(PostgresProviderConfig),
}

/// Settings of the PostgreSQL provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresProviderConfig {
    pub pool: PostgresConfig,
    pub dids_table: String,
    pub domains_table: String,
    /// Check both tables are queryable before serving
    pub verify_tables: bool,
}

pub const DEFAULT_DID_TEMPLATE: &str = "https://bsky.app/profile/{did}";
pub const DEFAULT_HANDLE_TEMPLATE: &str = "https://{handle.domain}?handle={handle}";

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> HandlesResult<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> HandlesResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "localhost");
        let port = parse_var(&lookup, "PORT", 8080u16)?;
        let check_domain_parameter = var("CHECK_DOMAIN_PARAMETER", "domain");

        let level = var("LOG_LEVEL", "error");
        let format = match var("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(HandlesError::Config(format!(
                    "Unknown log format `{}` (expected `text` or `json`)",
                    other
                )))
            }
        };

        let did_template = UrlTemplate::new(var("REDIRECT_DID_TEMPLATE", DEFAULT_DID_TEMPLATE));
        let handle_template =
            UrlTemplate::new(var("REDIRECT_HANDLE_TEMPLATE", DEFAULT_HANDLE_TEMPLATE));

        let provider = match lookup("DID_PROVIDER").as_deref() {
            Some("memory") => {
                let (Some(dids), Some(domains)) = (lookup("MEMORY_DIDS"), lookup("MEMORY_DOMAINS"))
                else {
                    return Err(HandlesError::Config(
                        "A map of Decentralized IDs (`MEMORY_DIDS`) and domains (`MEMORY_DOMAINS`) is required to use the memory provider".to_string(),
                    ));
                };

                ProviderConfig::Memory {
                    dids: parse_did_map(&dids)?,
                    domains: split_list(&domains),
                }
            }
            Some("postgres") | Some("store") => {
                let database_url = lookup("DATABASE_URL").ok_or_else(|| {
                    HandlesError::Config(
                        "A database connection (`DATABASE_URL`) is required to use the postgres provider".to_string(),
                    )
                })?;

                let defaults = PostgresConfig::new(database_url);
                let pool = PostgresConfig {
                    max_connections: parse_var(
                        &lookup,
                        "POSTGRES_MAX_CONNECTIONS",
                        defaults.max_connections,
                    )?,
                    min_connections: parse_var(
                        &lookup,
                        "POSTGRES_MIN_CONNECTIONS",
                        defaults.min_connections,
                    )?,
                    connect_timeout: parse_var(
                        &lookup,
                        "POSTGRES_CONNECT_TIMEOUT",
                        defaults.connect_timeout,
                    )?,
                    max_lifetime: parse_var(&lookup, "POSTGRES_MAX_LIFETIME", defaults.max_lifetime)?,
                    idle_timeout: parse_var(&lookup, "POSTGRES_IDLE_TIMEOUT", defaults.idle_timeout)?,
                    ..defaults
                };

                ProviderConfig::Postgres(PostgresProviderConfig {
                    pool,
                    dids_table: var("DATABASE_TABLE_DIDS", "dids"),
                    domains_table: var("DATABASE_TABLE_DOMAINS", "domains"),
                    verify_tables: parse_var(&lookup, "DATABASE_VERIFY_TABLES", true)?,
                })
            }
            Some(other) => {
                return Err(HandlesError::Config(format!(
                    "No valid provider of decentralized IDs specified: `{}` (expected `memory` or `postgres`)",
                    other
                )))
            }
            None => {
                return Err(HandlesError::Config(
                    "A provider of decentralized IDs (`DID_PROVIDER`) is required".to_string(),
                ))
            }
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                host,
                port,
                check_domain_parameter,
            },
            logging: LoggingConfig { level, format },
            redirect: RedirectConfig {
                did_template,
                handle_template,
            },
            provider,
        })
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> HandlesResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| HandlesError::Config(format!("Invalid value for {}: `{}`", key, value))),
        None => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `handle@did` entries separated by commas
fn parse_did_map(value: &str) -> HandlesResult<Vec<(String, String)>> {
    split_list(value)
        .into_iter()
        .map(|entry| match entry.split_once('@') {
            Some((handle, did)) if !handle.trim().is_empty() && !did.trim().is_empty() => {
                Ok((handle.trim().to_string(), did.trim().to_string()))
            }
            _ => Err(HandlesError::Config(format!(
                "Invalid MEMORY_DIDS entry `{}` (expected `handle@did`)",
                entry
            ))),
        })
        .collect()
}
