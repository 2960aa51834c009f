//! Artifacts produced by the pipeline.
//!
//! An artifact is a file on disk: the downloaded dataset or a rendered plot.
//! Its state is binary. Presence is taken as proof of validity; no timestamp,
//! size or checksum is ever consulted.

use std::fmt;
use std::path::{Path, PathBuf};

/// A file the pipeline produces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    /// Where the artifact lives
    pub path: PathBuf,

    /// What kind of artifact this is
    pub kind: ArtifactKind,
}

impl Artifact {
    /// Create a new artifact
    pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The downloaded dataset file
    pub fn dataset(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ArtifactKind::Dataset)
    }

    /// A rendered plot image
    pub fn plot(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ArtifactKind::Plot)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the filesystem for this artifact
    pub fn state(&self) -> ArtifactState {
        ArtifactState::of(&self.path)
    }
}

/// Types of artifacts the pipeline writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Input CSV fetched over HTTP
    Dataset,

    /// PNG image
    Plot,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Dataset => write!(f, "dataset"),
            ArtifactKind::Plot => write!(f, "plot"),
        }
    }
}

/// Existence state of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Exists,
    Missing,
}

impl ArtifactState {
    /// State of whatever is at `path` right now
    pub fn of(path: &Path) -> Self {
        if path.exists() {
            Self::Exists
        } else {
            Self::Missing
        }
    }

    pub fn exists(self) -> bool {
        matches!(self, Self::Exists)
    }
}
