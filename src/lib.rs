//! titanic-eda - Exploratory data analysis of the Titanic passenger list
//!
//! Downloads the dataset, prints summary statistics and renders a fixed set
//! of plots. Every output file is an artifact guarded by an existence check:
//! whatever is already on disk is left alone, so repeated runs are cheap.
//!
//! # Modules
//!
//! - `adapters`: HTTP download and plot rendering
//! - `core`: Existence gate, summary statistics, pipeline
//! - `domain`: Data structures (Dataset, PlotPlan, Artifact)
//! - `config`: Layered configuration and artifact paths
//! - `console`: Colorized status lines
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Full run
//! titanic-eda run
//!
//! # Re-download, then plot into another directory
//! titanic-eda run --refresh --plots-dir out/plots
//!
//! # Overview of any CSV
//! titanic-eda summary --file passengers.csv
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod console;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{DatasetSource, HttpSource, PlotRenderer, PlottersRenderer};
pub use config::{Overrides, ResolvedConfig};
pub use console::{ColorMode, Console, Palette, Style};
pub use core::{GateOutcome, Pipeline, PlotReport};
pub use domain::{Artifact, ArtifactState, Dataset, PlotKind, PlotPlan, PlotRequest};
