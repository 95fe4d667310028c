//! Bundle file selection
//!
//! Drops and picker/path selections are normalised into a single
//! [`FileCandidate`] and validated the same way.

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::deploy::naming::{strip_zip_suffix, suggest};
use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::models::bundle::{BundleSource, StagedFile};

/// A file offered by the operator, not yet validated
#[derive(Debug, Clone)]
pub struct FileCandidate {
    name: String,
    size_bytes: u64,
    source: BundleSource,
}

impl FileCandidate {
    /// A candidate whose bytes are already in memory
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            source: BundleSource::Memory(Bytes::from(bytes)),
        }
    }

    /// A candidate backed by a file on disk; only metadata is read here
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let file = File::new(path.as_ref());
        let size_bytes = file.size().await?;
        let name = file.file_name().unwrap_or_default();
        Ok(Self {
            name,
            size_bytes,
            source: BundleSource::Path(file),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An accepted bundle together with the app name suggested for it
#[derive(Debug, Clone)]
pub struct Selection {
    pub staged: StagedFile,
    pub suggested_name: String,
}

/// File selector with its drag hover flag
#[derive(Debug, Default)]
pub struct FileSelector {
    hovering: bool,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a candidate; only `.zip` bundles (any case) are accepted
    pub fn select(&self, candidate: FileCandidate) -> Result<Selection, ConsoleError> {
        if strip_zip_suffix(&candidate.name).is_none() {
            warn!("Rejected non-zip file: {}", candidate.name);
            return Err(ConsoleError::UnsupportedType(candidate.name));
        }

        let suggested_name = suggest(&candidate.name);
        debug!(
            "Selected bundle {} ({} bytes), suggested name '{}'",
            candidate.name, candidate.size_bytes, suggested_name
        );

        Ok(Selection {
            staged: StagedFile {
                name: candidate.name,
                size_bytes: candidate.size_bytes,
                source: candidate.source,
            },
            suggested_name,
        })
    }

    /// Handle a drop: the first file wins, an empty drop does nothing
    pub fn drop_files(
        &mut self,
        files: Vec<FileCandidate>,
    ) -> Option<Result<Selection, ConsoleError>> {
        self.hovering = false;
        files.into_iter().next().map(|file| self.select(file))
    }

    pub fn drag_over(&mut self) {
        self.hovering = true;
    }

    pub fn drag_leave(&mut self) {
        self.hovering = false;
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Reset presentational state
    pub fn clear(&mut self) {
        self.hovering = false;
    }
}
