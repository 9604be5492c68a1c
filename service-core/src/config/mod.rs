use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Process-level listener settings shared by every service binary.
///
/// Values come from an optional `service` config file in the working
/// directory, overridden by `APP__`-prefixed environment variables
/// (e.g. `APP__PORT=9090`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("service").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
