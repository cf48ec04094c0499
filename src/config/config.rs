use config::Environment;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Loaded once at startup. A missing model credential makes this panic,
/// the service refuses to run without it.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::load().unwrap_or_else(|e| panic!("Failed to load configuration: {e}"))
});

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct GeminiConfig {
    pub domain: String,
    pub model: String,
    pub api_key: String,
}

impl AppConfig {
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("server.address", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("gemini.domain", "https://generativelanguage.googleapis.com")?
            .set_default("gemini.model", "gemini-2.5-pro")?
            .add_source(Environment::with_prefix("LINEAL").separator("__"))
            .build()?
            .try_deserialize()
    }
}
