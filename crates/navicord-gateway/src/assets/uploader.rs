//! External asset upload endpoint.

use std::time::Duration;

use async_trait::async_trait;
use navicord_common::AssetError;
use navicord_config::schema::{AssetsConfig, GatewayConfig};
use tracing::debug;

/// Turns a raw image URL into a server-side asset path.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Upload `url` and return the path the server assigned to it.
    async fn upload(&self, url: &str) -> Result<String, AssetError>;
}

/// Extract `[0].external_asset_path` from an upload response body.
pub fn parse_upload_response(body: &serde_json::Value) -> Result<String, AssetError> {
    let entries = body
        .as_array()
        .ok_or_else(|| AssetError::Malformed("expected a JSON array".into()))?;
    let first = entries.first().ok_or(AssetError::EmptyResponse)?;
    first
        .get("external_asset_path")
        .and_then(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AssetError::Malformed("missing external_asset_path".into()))
}

// ---------------------------------------------------------------------------
// HTTP uploader
// ---------------------------------------------------------------------------

/// Uploads through the application's external-assets REST endpoint.
pub struct HttpAssetUploader {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpAssetUploader {
    pub fn new(gateway: &GatewayConfig, assets: &AssetsConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(assets.upload_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: gateway.external_assets_url(),
            token: gateway.token.clone(),
        }
    }
}

impl std::fmt::Debug for HttpAssetUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssetUploader")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl AssetUploader for HttpAssetUploader {
    async fn upload(&self, url: &str) -> Result<String, AssetError> {
        debug!(url = %url, "Uploading external asset");

        // User tokens go in the header as-is, without a scheme.
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", &self.token)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = text.chars().take(200).collect::<String>();
            return Err(AssetError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssetError::Malformed(e.to_string()))?;

        parse_upload_response(&json)
    }
}
