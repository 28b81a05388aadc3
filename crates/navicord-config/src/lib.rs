//! navicord configuration system.
//!
//! TOML-based configuration with environment overrides and full
//! validation. All sections use defaults so partial configs work out of
//! the box.
//!
//! ```rust,no_run
//! use navicord_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{NavicordConfig, CONFIG_SCHEMA_VERSION};
pub use validation::{require_credentials, validate};

use std::path::Path;

use navicord_common::ConfigError;

/// Load config from `path`, or the platform default path when `None`.
///
/// A missing file is created from the commented template. Environment
/// overrides are applied before the result is validated.
pub fn load_config(path: Option<&Path>) -> Result<NavicordConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    env::apply_process_env(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string with the token redacted.
pub fn config_to_json(config: &NavicordConfig) -> String {
    let mut redacted = config.clone();
    if !redacted.gateway.token.is_empty() {
        redacted.gateway.token = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
