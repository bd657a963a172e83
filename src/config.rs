use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub image_dir: PathBuf,
    pub base_url: String,
}

impl Config {
    pub fn load() -> Self {
        let port: u16 = try_load("PORT", "3001");
        Self {
            port,
            database_url: try_load("DATABASE_URL", "sqlite://screamer.db"),
            image_dir: PathBuf::from(try_load::<String>("IMAGE_DIR", "images")),
            base_url: try_load("BASE_URL", &format!("http://localhost:{port}/images")),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
