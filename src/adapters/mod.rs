//! Adapter interfaces for external systems.
//!
//! Adapters isolate the two side effects that produce artifacts: fetching
//! the dataset over HTTP and rendering plot images.

pub mod http;
pub mod render;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Dataset, PlotRequest};

// Re-export the concrete adapters
pub use http::HttpSource;
pub use render::PlottersRenderer;

/// Somewhere the dataset bytes come from
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable location (URL, path)
    fn describe(&self) -> String;

    /// Fetch the raw dataset bytes
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Something that turns a plot request into an image file
pub trait PlotRenderer {
    /// Render `request` from `dataset`, writing the image to `path`
    fn render(&self, request: &PlotRequest, dataset: &Dataset, path: &Path) -> Result<()>;
}
