use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Failures of a single gateway session. None of these are fatal to the
/// process; the reconnection driver backs off and tries again.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway discovery failed: {0}")]
    Discovery(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("no {0} received within the handshake window")]
    HandshakeTimeout(&'static str),

    #[error("connection closed: {0}")]
    Closed(String),

    #[error("not connected")]
    NotConnected,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset upload request failed: {0}")]
    Network(String),

    #[error("asset upload rejected: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed asset upload response: {0}")]
    Malformed(String),

    #[error("asset upload returned no assets")]
    EmptyResponse,

    #[error("fallback image could not be resolved: {0}")]
    FallbackFailed(Box<AssetError>),
}

#[derive(Debug, thiserror::Error)]
pub enum NavicordError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::MissingCredential("gateway.token");
        assert_eq!(err.to_string(), "missing credential: gateway.token");
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::HandshakeTimeout("Hello");
        assert_eq!(
            err.to_string(),
            "no Hello received within the handshake window"
        );

        let err = GatewayError::Transport("connection reset".into());
        assert_eq!(err.to_string(), "transport error: connection reset");

        assert_eq!(GatewayError::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn asset_error_fallback_wraps_cause() {
        let err = AssetError::FallbackFailed(Box::new(AssetError::EmptyResponse));
        assert_eq!(
            err.to_string(),
            "fallback image could not be resolved: asset upload returned no assets"
        );

        let err = AssetError::Api {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "asset upload rejected: HTTP 401: unauthorized"
        );
    }

    #[test]
    fn navicord_error_from_variants() {
        let err: NavicordError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, NavicordError::Config(_)));
        assert!(err.to_string().contains("bad toml"));

        let err: NavicordError = GatewayError::NotConnected.into();
        assert!(matches!(err, NavicordError::Gateway(_)));

        let err: NavicordError = AssetError::EmptyResponse.into();
        assert!(matches!(err, NavicordError::Asset(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: NavicordError = io_err.into();
        assert!(matches!(err, NavicordError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
