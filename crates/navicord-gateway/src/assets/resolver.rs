//! Maps raw art URLs to protocol-native asset references.

use std::fmt;
use std::sync::Arc;

use navicord_common::AssetError;
use tracing::{debug, warn};

use super::uploader::AssetUploader;

/// Marks a string as an already-resolved asset reference.
pub const ASSET_PREFIX: &str = "mp:";

/// A resolved asset reference, always carrying [`ASSET_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wrap `value` if it is already a reference.
    pub fn parse(value: &str) -> Option<Self> {
        value
            .starts_with(ASSET_PREFIX)
            .then(|| Self(value.to_string()))
    }

    fn from_path(path: &str) -> Self {
        Self(format!("{ASSET_PREFIX}{path}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves art URLs, substituting a fixed image when there is none or
/// the upload fails. Results are not cached here.
#[derive(Clone)]
pub struct AssetResolver {
    uploader: Arc<dyn AssetUploader>,
    fallback_url: String,
}

impl AssetResolver {
    pub fn new(uploader: Arc<dyn AssetUploader>, fallback_url: impl Into<String>) -> Self {
        Self {
            uploader,
            fallback_url: fallback_url.into(),
        }
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Resolve `raw`, or the fallback image when `raw` is `None`.
    ///
    /// At most one fallback upload is made per call. If that fails too the
    /// error is returned as [`AssetError::FallbackFailed`].
    pub async fn resolve(&self, raw: Option<&str>) -> Result<AssetRef, AssetError> {
        let Some(raw) = raw.filter(|url| !url.is_empty()) else {
            return self.resolve_fallback().await;
        };

        if let Some(existing) = AssetRef::parse(raw) {
            return Ok(existing);
        }

        match self.uploader.upload(raw).await {
            Ok(path) => {
                debug!(url = %raw, "Resolved album art");
                Ok(AssetRef::from_path(&path))
            }
            Err(e) => {
                warn!(url = %raw, error = %e, "Album art upload failed, using fallback image");
                self.resolve_fallback().await
            }
        }
    }

    async fn resolve_fallback(&self) -> Result<AssetRef, AssetError> {
        if let Some(existing) = AssetRef::parse(&self.fallback_url) {
            return Ok(existing);
        }
        self.uploader
            .upload(&self.fallback_url)
            .await
            .map(|path| AssetRef::from_path(&path))
            .map_err(|e| AssetError::FallbackFailed(Box::new(e)))
    }
}

impl fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetResolver")
            .field("fallback_url", &self.fallback_url)
            .finish_non_exhaustive()
    }
}
