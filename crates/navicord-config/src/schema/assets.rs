use serde::{Deserialize, Serialize};

/// Image shown when a track has no art or its art cannot be uploaded.
pub const DEFAULT_FALLBACK_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/navidrome/navidrome/master/resources/logo-192x192.png";

/// Album art upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub fallback_image_url: String,
    /// Timeout for a single upload request in seconds (valid range: 1-60).
    pub upload_timeout_secs: u64,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            fallback_image_url: DEFAULT_FALLBACK_IMAGE_URL.into(),
            upload_timeout_secs: 10,
        }
    }
}
