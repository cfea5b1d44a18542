use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    /// A parameter is missing, out of range, or inconsistent with the others.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("metrics store unreachable: {0}")]
    Connectivity(String),

    #[error("metrics store returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl DeployError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DeployError::InvalidArgument(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeployError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DeployError::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(e: serde_json::Error) -> Self {
        DeployError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for DeployError {
    fn from(e: serde_yaml::Error) -> Self {
        DeployError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
