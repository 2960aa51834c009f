//! Plot requests and the plan that maps them to artifact paths.
//!
//! The plan is derived from the dataset's columns alone. A plot whose input
//! columns are missing is left out of the plan rather than reported.

use std::path::{Path, PathBuf};

use crate::config::paths;

use super::artifact::Artifact;
use super::table::Dataset;

/// Candidate columns for the scatterplot's x axis, first match wins
pub const SIZE_COLUMNS: &[&str] = &["Age"];

/// Candidate columns for the scatterplot's y axis, first match wins
pub const PRICE_COLUMNS: &[&str] = &["Fare"];

/// Grouping column of the count plot
pub const GENDER_COLUMN: &str = "Sex";

/// Hue column of the count plot
pub const TARGET_COLUMN: &str = "Survived";

/// What to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotKind {
    /// Histogram with density overlay of one numeric column
    Distribution { column: String },

    /// Scatterplot of two numeric columns
    Scatter { x: String, y: String },

    /// Pairwise correlation matrix of the numeric columns
    Heatmap { columns: Vec<String> },

    /// Bar counts of `x` categories split by `hue`
    GroupedCount { x: String, hue: String },
}

/// A plot bound to the artifact it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotRequest {
    pub kind: PlotKind,
    pub artifact: Artifact,
}

impl PlotRequest {
    pub fn new(kind: PlotKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            artifact: Artifact::plot(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    /// Status line for a freshly rendered plot
    pub fn created_message(&self) -> String {
        match &self.kind {
            PlotKind::Distribution { column } => format!("✓ Created distribution plot: {}", column),
            PlotKind::Scatter { x, y } => format!("✓ Created scatterplot: {} vs {}", x, y),
            PlotKind::Heatmap { .. } => "✓ Created correlation heatmap".to_string(),
            PlotKind::GroupedCount { .. } => "✓ Created gender vs survived plot".to_string(),
        }
    }

    /// Status line for a plot that was already on disk
    pub fn exists_message(&self) -> String {
        match &self.kind {
            PlotKind::Distribution { column } => {
                format!("✓ Distribution plot already exists: {}", column)
            }
            PlotKind::Scatter { .. } => "✓ Scatterplot already exists".to_string(),
            PlotKind::Heatmap { .. } => "✓ Correlation heatmap already exists".to_string(),
            PlotKind::GroupedCount { .. } => "✓ Gender vs survived plot already exists".to_string(),
        }
    }
}

/// Ordered set of plots expected for a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotPlan {
    requests: Vec<PlotRequest>,
}

impl PlotPlan {
    /// Build the plan for `dataset`, rooted at `plots_dir`
    ///
    /// Order: one histogram per numeric column, the size/price scatter,
    /// the correlation heatmap, the gender/survival count plot.
    pub fn for_dataset(dataset: &Dataset, plots_dir: &Path) -> Self {
        let numeric = dataset.numeric_columns();
        let mut requests = Vec::with_capacity(numeric.len() + 3);

        for column in &numeric {
            requests.push(PlotRequest::new(
                PlotKind::Distribution {
                    column: column.to_string(),
                },
                paths::distribution_plot(plots_dir, column),
            ));
        }

        if let Some((x, y)) = scatter_columns(dataset) {
            requests.push(PlotRequest::new(
                PlotKind::Scatter {
                    x: x.to_string(),
                    y: y.to_string(),
                },
                paths::scatter_plot(plots_dir),
            ));
        }

        if !numeric.is_empty() {
            requests.push(PlotRequest::new(
                PlotKind::Heatmap {
                    columns: numeric.iter().map(|c| c.to_string()).collect(),
                },
                paths::heatmap_plot(plots_dir),
            ));
        }

        if dataset.has_column(GENDER_COLUMN) && dataset.has_column(TARGET_COLUMN) {
            requests.push(PlotRequest::new(
                PlotKind::GroupedCount {
                    x: GENDER_COLUMN.to_string(),
                    hue: TARGET_COLUMN.to_string(),
                },
                paths::grouped_count_plot(plots_dir),
            ));
        }

        Self { requests }
    }

    pub fn requests(&self) -> &[PlotRequest] {
        &self.requests
    }

    /// Every artifact path the plan expects
    pub fn paths(&self) -> Vec<&Path> {
        self.requests.iter().map(PlotRequest::path).collect()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// First present size column paired with the first present price column
pub fn scatter_columns(dataset: &Dataset) -> Option<(&'static str, &'static str)> {
    let size = SIZE_COLUMNS.iter().copied().find(|c| dataset.has_column(c))?;
    let price = PRICE_COLUMNS.iter().copied().find(|c| dataset.has_column(c))?;
    Some((size, price))
}
