//! Where navicord keeps its files, and first-run creation of the config.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use navicord_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "navicord";
const CONFIG_FILE: &str = "config.toml";
const DOTENV_FILE: &str = ".env";

/// `<platform config dir>/navicord/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// `.env` beside the default config file.
pub fn default_dotenv_path() -> Option<PathBuf> {
    default_config_path()
        .ok()?
        .parent()
        .map(|dir| dir.join(DOTENV_FILE))
}

/// Write the commented template to `path`, creating parent directories.
///
/// The file is where users put the gateway token, so on Unix it is
/// created readable by its owner only.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_failure("create config directory", parent, e))?;
    }
    write_private(path, default_config_toml().as_bytes())
        .map_err(|e| io_failure("write default config to", path, e))?;

    info!(path = %path.display(), "Created default config");
    Ok(())
}

fn io_failure(action: &str, path: &Path, e: io::Error) -> ConfigError {
    ConfigError::ParseError(format!("failed to {action} {}: {e}", path.display()))
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}
