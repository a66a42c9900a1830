use crate::error::OutputError;
use crate::model::GeneratedArtifact;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Persists whole artifacts. Implementations never see partial buffers.
pub trait ArtifactWriter: Send + Sync {
    fn write(&self, artifact: &GeneratedArtifact) -> Result<(), OutputError>;
}

/// Writes artifacts to their paths on disk: directories `0755`, files `0600`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl FsWriter {
    fn create_dir(dir: &Path) -> std::io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(dir)
    }

    fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
        fs::write(path, content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl ArtifactWriter for FsWriter {
    fn write(&self, artifact: &GeneratedArtifact) -> Result<(), OutputError> {
        let path = artifact.path();
        let wrap = |source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Self::create_dir(dir).map_err(wrap)?;
        }
        Self::write_file(path, artifact.content()).map_err(wrap)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), artifact.content().len());
        Ok(())
    }
}

/// Collects artifacts in memory, in write order.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    written: Mutex<Vec<GeneratedArtifact>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<GeneratedArtifact> {
        self.written
            .lock()
            .map(|written| written.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&self, artifact: &GeneratedArtifact) -> Result<(), OutputError> {
        let mut written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        written.push(artifact.clone());
        Ok(())
    }
}
