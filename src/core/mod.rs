//! Core EDA logic.
//!
//! This module contains:
//! - Gate: artifact existence check around a producer
//! - Summary: head, info, describe and correlation
//! - Pipeline: the sequential fetch / load / print / plot run

pub mod gate;
pub mod pipeline;
pub mod summary;

// Re-export commonly used types
pub use gate::{all_exist, ensure, ensure_async, GateOutcome};
pub use pipeline::{print_overview, Pipeline, PlotReport};
pub use summary::{correlation, describe, head, info, CorrelationMatrix, Describe, Info};
