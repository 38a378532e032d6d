use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by the host-process bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host bridge disconnected")]
    Disconnected,

    #[error("no surface for view {0}")]
    UnknownSurface(String),

    #[error("host rejected {action}: {reason}")]
    Rejected { action: String, reason: String },

    #[error("unexpected host response to {0}")]
    UnexpectedResponse(String),
}

/// Failures reported by the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("content store error: {0}")]
    Content(String),

    #[error("{0}")]
    Other(String),
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

        let err = ConfigError::ValidationError("views.pool_size = 9".into());
        assert_eq!(
            err.to_string(),
            "config validation error: views.pool_size = 9"
        );
    }

    #[test]
    fn host_error_display() {
        let err = HostError::UnknownSurface("abc".into());
        assert_eq!(err.to_string(), "no surface for view abc");

        let err = HostError::Rejected {
            action: "LOAD_URL".into(),
            reason: "bad scheme".into(),
        };
        assert_eq!(err.to_string(), "host rejected LOAD_URL: bad scheme");
    }

    #[test]
    fn shell_error_from_host() {
        let shell_err: ShellError = HostError::Disconnected.into();
        assert!(matches!(shell_err, ShellError::Host(_)));
        assert!(shell_err.to_string().contains("disconnected"));
    }

    #[test]
    fn shell_error_from_store() {
        let store_err = StoreError::Unavailable("locked".into());
        let shell_err: ShellError = store_err.into();
        assert!(matches!(shell_err, ShellError::Store(_)));
        assert!(shell_err.to_string().contains("locked"));
    }

    #[test]
    fn store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
        assert!(store_err.to_string().contains("file missing"));
    }

    #[test]
    fn shell_error_other_variants() {
        let err = ShellError::Content("resource gone".into());
        assert_eq!(err.to_string(), "content store error: resource gone");

        let err = ShellError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
