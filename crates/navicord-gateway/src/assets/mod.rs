//! Album art resolution.

mod resolver;
mod uploader;


pub use resolver::{AssetRef, AssetResolver, ASSET_PREFIX};
pub use uploader::{parse_upload_response, AssetUploader, HttpAssetUploader};
