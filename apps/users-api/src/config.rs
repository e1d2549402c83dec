use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::common::RetryConfig;
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config sections
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Backoff for the startup connection to MongoDB
    pub db_retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let db_retry = RetryConfig::from_env()?;

        mongodb.validate()?;

        let mongodb = if mongodb.app_name.is_none() {
            mongodb.with_app_name(env!("CARGO_PKG_NAME"))
        } else {
            mongodb
        };

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            db_retry,
        })
    }
}
