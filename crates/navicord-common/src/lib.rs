pub mod errors;
pub mod types;

pub use errors::{AssetError, ConfigError, GatewayError, NavicordError};
pub use types::PresenceUpdate;

pub type Result<T> = std::result::Result<T, NavicordError>;
