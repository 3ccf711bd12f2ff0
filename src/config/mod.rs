// Configuration module entry point
// Loads the immutable process configuration and the shared request state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, FrontendConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    StorageConfig,
};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is optional; `BLOBSITE__SECTION__KEY` environment variables
    /// override it, e.g. `BLOBSITE__STORAGE__CONNECTION_STRING`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("BLOBSITE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("frontend.scheme", "http")?
            .set_default("storage.connection_string", "UseInMemoryStorage=true")?
            .set_default("storage.index_name", "index.html")?
            .set_default("storage.timeout_ms", 0)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("blobsite/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.route_prefix", "")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
