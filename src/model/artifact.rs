use crate::error::BundleError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Code,
    Diagram,
}

/// A finished output file. Created once by a backend or the output coordinator and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    path: PathBuf,
    content: Vec<u8>,
    kind: ArtifactKind,
}

impl GeneratedArtifact {
    pub fn new(path: PathBuf, content: Vec<u8>, kind: ArtifactKind) -> Self {
        Self {
            path,
            content,
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The content as text. Generated artifacts are always UTF-8.
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.content).unwrap_or_default()
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

/// Every artifact of one compilation unit, ready to be persisted or replayed later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub package: String,
    pub artifacts: Vec<GeneratedArtifact>,
}

impl ArtifactBundle {
    pub fn new(package: impl Into<String>, artifacts: Vec<GeneratedArtifact>) -> Self {
        Self {
            package: package.into(),
            artifacts,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        encode_to_vec(self, standard()).map_err(|e| BundleError::Encode(e.to_string()))
    }

    /// Saves the bundle to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BundleError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a bundle previously written by [`ArtifactBundle::save`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        decode_from_slice(bytes, standard())
            .map(|(bundle, _)| bundle) // bincode 2 returns (value, bytes_read)
            .map_err(|e| BundleError::Decode(e.to_string()))
    }
}
