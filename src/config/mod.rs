// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

const ENV_PREFIX: &str = "UPTIME";

/// Load configuration from an optional file (YAML or JSON) layered under
/// `UPTIME__*` environment variables.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let settings = ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let mut config: Config = settings
        .try_deserialize()
        .context("Failed to parse config")?;

    // Plain PORT wins, matching common hosting conventions.
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid PORT value {:?}", port))?;
    }

    config.validate()?;
    Ok(config)
}
