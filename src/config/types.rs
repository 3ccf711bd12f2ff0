// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub frontend: FrontendConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// How the site is addressed from outside
#[derive(Debug, Deserialize, Clone)]
pub struct FrontendConfig {
    /// Host name used in redirects; defaults to the request's `Host` header
    pub host_name: Option<String>,
    /// Scheme used in redirects when the request line does not carry one
    pub scheme: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// `LocalRoot=<dir>` or `UseInMemoryStorage=true`
    pub connection_string: String,
    /// Container index filename; empty disables index substitution
    pub index_name: Option<String>,
    /// Deadline for each storage call, 0 to disable
    pub timeout_ms: u64,
}

impl StorageConfig {
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref().filter(|s| !s.is_empty())
    }

    /// True when the connection string selects the in-memory backend, which
    /// starts with no containers
    pub fn is_in_memory(&self) -> bool {
        matches!(
            crate::storage::parse_connection_string(&self.connection_string),
            Ok(crate::storage::Backend::Memory)
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
    /// Info-level output file (stdout when unset)
    pub access_log_file: Option<String>,
    /// Warning/error output file (stderr when unset)
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Path segment(s) in front of `/{container}`, e.g. `/api`
    pub route_prefix: String,
}
