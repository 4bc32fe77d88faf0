//! Error types for the customizations pipeline
//!
//! Every stage failure is terminal: nothing is retried internally. Each
//! variant carries the stage that failed plus the underlying cause so the
//! adapter can log full context before flattening the error to a message
//! string for the caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::tool::ToolError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Temporary artifact creation, write, or delete failure
    #[error("Artifact error for {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tailoring JSON to XML conversion failure
    #[error("Tailoring translation failed: {source}")]
    Translation {
        #[source]
        source: ToolError,
    },

    /// Blueprint generation failure
    #[error("Blueprint generation failed: {source}")]
    Generation {
        #[source]
        source: ToolError,
    },

    /// Profile description lookup failure
    #[error("Profile description lookup failed: {source}")]
    Description {
        #[source]
        source: ToolError,
    },

    /// Blueprint text did not match the expected structure
    #[error("Blueprint parse error: {message}")]
    Parse { message: String },

    /// Blueprint could not be mapped into the customizations schema
    #[error("Blueprint mapping error: {message}")]
    Mapping { message: String },

    /// Final JSON encoding failure
    #[error("Customizations serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create an artifact error for the given path
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }

    /// Create a blueprint mapping error
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }
}
