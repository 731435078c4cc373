use std::env;

use audit::LogConfig;
use auth::DEFAULT_TOKEN_TTL_HOURS;
use auth::INSECURE_DEFAULT_SECRET;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    pub fn uses_insecure_default(&self) -> bool {
        self.secret == INSECURE_DEFAULT_SECRET
    }
}

/// Argon2id work factor.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Flat variables JWT_SECRET, LOG_LEVEL, LOG_INIT_TABLE, DATABASE_URL
    /// 2. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("database.url", "postgres://localhost:5432/petclinic")?
            .set_default("database.max_connections", 5)?
            .set_default("server.http_port", 8080)?
            .set_default("jwt.secret", INSECURE_DEFAULT_SECRET)?
            .set_default("jwt.expiration_hours", DEFAULT_TOKEN_TTL_HOURS)?
            .set_default("password.memory_kib", 19 * 1024)?
            .set_default("password.iterations", 2)?
            .set_default("password.parallelism", 1)?
            .set_default("log.level", "INFO")?
            .set_default("log.init_table", false)?
            .set_default("log.queue_capacity", 1024)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__").try_parsing(true))
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("log.level", env::var("LOG_LEVEL").ok())?
            .set_override_option("log.init_table", flag("LOG_INIT_TABLE"))?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

/// Only the literal `true` enables a flag.
fn flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|value| value == "true")
}
