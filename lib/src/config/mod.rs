// lib/src/config/mod.rs

pub mod config_defaults;
pub mod config_structs;

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::{debug, info};

pub use config_structs::{AllocationSettings, AppConfig, LogConfig, SeedConfig, ServerConfig};

use config_defaults::{ENV_PREFIX, ENV_SEPARATOR};

/// Layers built-in defaults, an optional YAML/TOML file and `BEDALLOC__*`
/// environment variables, in that order.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("[Config] loading configuration from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let app_config: AppConfig = builder
        .build()
        .context("failed to read configuration sources")?
        .try_deserialize()
        .context("failed to deserialize configuration")?;
    app_config.validate()?;
    debug!("[Config] effective configuration: {:?}", app_config);
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::storage_engine::StorageEngineType;

    #[test]
    fn defaults_apply_without_a_file() {
        let cfg = load_app_config(None).unwrap();
        assert_eq!(cfg.allocation.default_search_limit, 10);
        assert_eq!(cfg.allocation.average_speed_kmh, 50.0);
        assert!(!cfg.seed.enabled);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\nstorage:\n  engine: sled\n  data_directory: /tmp/beds\nseed:\n  enabled: true"
        )
        .unwrap();

        let cfg = load_app_config(Some(file.path())).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.storage.engine, StorageEngineType::Sled);
        assert!(cfg.seed.enabled);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_app_config(Some(Path::new("/nonexistent/bedalloc.yaml"))).is_err());
    }

    #[test]
    fn zero_search_limit_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.allocation.default_search_limit = 0;
        assert!(cfg.validate().is_err());
    }
}
