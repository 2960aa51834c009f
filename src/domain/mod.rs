//! Domain types for titanic-eda.
//!
//! This module contains the core data structures:
//! - Artifact: Files the pipeline produces, and their existence state
//! - Dataset: The typed in-memory table
//! - PlotPlan: Plot requests mapped to artifact paths

pub mod artifact;
pub mod plot;
pub mod table;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactKind, ArtifactState};
pub use plot::{PlotKind, PlotPlan, PlotRequest};
pub use table::{find_csv, Column, ColumnData, Dataset, DatasetError};
