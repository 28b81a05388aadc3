//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;


use crate::schema::NavicordConfig;
use navicord_common::ConfigError;

use helpers::{validate_one_of, validate_range, validate_range_f64};

/// Statuses the gateway accepts in a presence frame.
pub const PRESENCE_STATUSES: &[&str] = &["online", "idle", "dnd", "invisible"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &NavicordConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_gateway(&mut errors, config);
    validate_backoff(&mut errors, config);
    validate_presence(&mut errors, config);
    validate_assets(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Check that the credential needed to start the gateway client is present.
pub fn require_credentials(config: &NavicordConfig) -> Result<(), ConfigError> {
    if config.gateway.token.trim().is_empty() {
        return Err(ConfigError::MissingCredential("gateway.token"));
    }
    if config.gateway.application_id.trim().is_empty() {
        return Err(ConfigError::MissingCredential("gateway.application_id"));
    }
    Ok(())
}

fn validate_gateway(errors: &mut Vec<String>, config: &NavicordConfig) {
    let gateway = &config.gateway;
    if !is_http_url(&gateway.api_base) {
        errors.push(format!(
            "gateway.api_base = \"{}\" must be an http(s) URL",
            gateway.api_base
        ));
    }
    validate_range(errors, "gateway.api_version", gateway.api_version.into(), 6, 10);
    validate_range(
        errors,
        "gateway.handshake_timeout_secs",
        gateway.handshake_timeout_secs,
        5,
        120,
    );
    validate_range(
        errors,
        "gateway.connect_timeout_secs",
        gateway.connect_timeout_secs,
        1,
        60,
    );
}

fn validate_backoff(errors: &mut Vec<String>, config: &NavicordConfig) {
    let backoff = &config.backoff;
    validate_range_f64(errors, "backoff.factor", backoff.factor, 1.5, 2.0);
    validate_range_f64(errors, "backoff.max_secs", backoff.max_secs, 1.0, 3600.0);
    validate_range_f64(
        errors,
        "backoff.initial_secs",
        backoff.initial_secs,
        0.1,
        backoff.max_secs.max(0.1),
    );
}

fn validate_presence(errors: &mut Vec<String>, config: &NavicordConfig) {
    validate_one_of(
        errors,
        "presence.status",
        &config.presence.status,
        PRESENCE_STATUSES,
    );
    validate_range(
        errors,
        "presence.activity_type",
        config.presence.activity_type.into(),
        0,
        5,
    );
}

fn validate_assets(errors: &mut Vec<String>, config: &NavicordConfig) {
    let url = &config.assets.fallback_image_url;
    if !is_http_url(url) && !url.starts_with("mp:") {
        errors.push(format!(
            "assets.fallback_image_url = \"{url}\" must be an http(s) URL or an mp: reference"
        ));
    }
    validate_range(
        errors,
        "assets.upload_timeout_secs",
        config.assets.upload_timeout_secs,
        1,
        60,
    );
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}
