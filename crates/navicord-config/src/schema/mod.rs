//! Configuration schema types for navicord.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod assets;
mod gateway;
mod logging;
mod presence;

pub use assets::*;
pub use gateway::*;
pub use logging::*;
pub use presence::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for navicord.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NavicordConfig {
    pub gateway: GatewayConfig,
    pub backoff: BackoffConfig,
    pub presence: PresenceConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
