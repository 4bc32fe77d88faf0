//! Transient on-disk artifacts
//!
//! One pipeline run may need up to two temporary files: the raw tailoring
//! JSON handed to `autotailor` and the XML tailoring file it produces.
//! Both are modeled as scoped handles whose deletion is guaranteed on every
//! exit path of the owning scope. Names are randomized per call, so
//! concurrent runs never collide in the filesystem namespace.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{PipelineError, Result};

/// The kinds of temporary artifact a pipeline run can create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Raw tailoring JSON, input to the translation tool
    TailoringJson,
    /// Translated tailoring XML, input to the blueprint generator
    TailoringXml,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        "tailoring-"
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::TailoringJson => ".json",
            Self::TailoringXml => ".xml",
        }
    }
}

/// Owning handle for a uniquely named temporary file
///
/// The underlying file is deleted when [`TempArtifact::release`] is called
/// or when the handle is dropped, whichever comes first. Release is
/// idempotent.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    file: Option<NamedTempFile>,
}

impl TempArtifact {
    /// Create a new temporary artifact of the given kind
    pub fn create(kind: ArtifactKind) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(kind.prefix())
            .suffix(kind.suffix())
            .tempfile()
            .map_err(|source| PipelineError::artifact(std::env::temp_dir(), source))?;

        let path = file.path().to_path_buf();
        tracing::debug!(path = %path.display(), "Created temp artifact");

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write content to the artifact
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            PipelineError::artifact(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "artifact already released"),
            )
        })?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| PipelineError::artifact(&self.path, source))
    }

    /// Delete the underlying file
    ///
    /// Safe to call multiple times. Deletion failures are logged rather than
    /// escalated; the pipeline result never depends on cleanup succeeding.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(err) = file.close() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to remove temp artifact"
                );
            } else {
                tracing::debug!(path = %self.path.display(), "Released temp artifact");
            }
        }
    }

    /// Whether the underlying file has already been deleted
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_produces_file_on_disk() {
        let artifact = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
        assert!(artifact.path().exists());
        assert!(artifact
            .path()
            .extension()
            .is_some_and(|ext| ext == "json"));
    }

    #[test]
    fn test_write_persists_content() {
        let mut artifact = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
        artifact.write(b"{\"profiles\":[]}").unwrap();

        let content = std::fs::read(artifact.path()).unwrap();
        assert_eq!(content, b"{\"profiles\":[]}");
    }

    #[test]
    fn test_release_deletes_file() {
        let mut artifact = TempArtifact::create(ArtifactKind::TailoringXml).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());

        artifact.release();
        assert!(!path.exists());
        assert!(artifact.is_released());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut artifact = TempArtifact::create(ArtifactKind::TailoringXml).unwrap();
        artifact.release();
        artifact.release();
        assert!(artifact.is_released());
    }

    #[test]
    fn test_write_after_release_fails() {
        let mut artifact = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
        artifact.release();

        let err = artifact.write(b"late").unwrap_err();
        assert!(matches!(err, PipelineError::Artifact { .. }));
    }

    #[test]
    fn test_drop_deletes_file() {
        let path = {
            let artifact = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_artifacts_get_unique_names() {
        let a = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
        let b = TempArtifact::create(ArtifactKind::TailoringJson).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
