//! Environment variable overrides.

use crate::schema::{ActivityNameMode, NavicordConfig};

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const CLIENT_ID_VAR: &str = "DISCORD_CLIENT_ID";
pub const ACTIVITY_NAME_VAR: &str = "ACTIVITY_NAME";

/// Apply overrides from the process environment.
pub fn apply_process_env(config: &mut NavicordConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` to read variables. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut NavicordConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(TOKEN_VAR) {
        config.gateway.token = token;
    }
    if let Some(id) = get(CLIENT_ID_VAR) {
        config.gateway.application_id = id;
    }
    if let Some(name) = get(ACTIVITY_NAME_VAR) {
        config.presence.activity_name = ActivityNameMode::from(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            (TOKEN_VAR, "env-token"),
            (CLIENT_ID_VAR, "42"),
            (ACTIVITY_NAME_VAR, "TRACK"),
        ]
        .into_iter()
        .collect();

        let mut config = NavicordConfig::default();
        config.gateway.token = "file-token".into();
        apply_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.gateway.token, "env-token");
        assert_eq!(config.gateway.application_id, "42");
        assert_eq!(config.presence.activity_name, ActivityNameMode::Track);
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut config = NavicordConfig::default();
        config.gateway.token = "file-token".into();
        apply_overrides(&mut config, |_| Some("  ".into()));
        assert_eq!(config.gateway.token, "file-token");
        assert_eq!(config.presence.activity_name, ActivityNameMode::Artist);
    }
}
