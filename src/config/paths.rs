//! Canonical artifact file names.
//!
//! Single source of truth - import this instead of hardcoding file names.
//!
//! ## Layout
//!
//! | Location | File | Producer |
//! |----------|------|----------|
//! | dataset dir | `titanic.csv` | HTTP download |
//! | plots dir | `{column}_distribution.png` | histogram per numeric column |
//! | plots dir | `size_vs_price.png` | scatterplot |
//! | plots dir | `correlation_heatmap.png` | heatmap |
//! | plots dir | `sex_vs_survived.png` | grouped count plot |

use std::path::{Path, PathBuf};

/// Default dataset file name inside the dataset directory
pub const DATASET_FILE: &str = "titanic.csv";

/// Scatterplot of the size column against the price column
pub const SCATTER_FILE: &str = "size_vs_price.png";

/// Correlation heatmap over all numeric columns
pub const HEATMAP_FILE: &str = "correlation_heatmap.png";

/// Survival counts grouped by gender
pub const GROUPED_COUNT_FILE: &str = "sex_vs_survived.png";

/// Histogram file for a numeric column
pub fn distribution_file(column: &str) -> String {
    format!("{}_distribution.png", column)
}

/// Full path of a column's histogram
pub fn distribution_plot(plots_dir: &Path, column: &str) -> PathBuf {
    plots_dir.join(distribution_file(column))
}

pub fn scatter_plot(plots_dir: &Path) -> PathBuf {
    plots_dir.join(SCATTER_FILE)
}

pub fn heatmap_plot(plots_dir: &Path) -> PathBuf {
    plots_dir.join(HEATMAP_FILE)
}

pub fn grouped_count_plot(plots_dir: &Path) -> PathBuf {
    plots_dir.join(GROUPED_COUNT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_naming() {
        assert_eq!(distribution_file("Age"), "Age_distribution.png");
        assert_eq!(
            distribution_plot(Path::new("/tmp/plots"), "Fare"),
            PathBuf::from("/tmp/plots/Fare_distribution.png")
        );
    }

    #[test]
    fn test_fixed_plot_names() {
        let dir = Path::new("plots");
        assert_eq!(scatter_plot(dir), PathBuf::from("plots/size_vs_price.png"));
        assert_eq!(heatmap_plot(dir), PathBuf::from("plots/correlation_heatmap.png"));
        assert_eq!(grouped_count_plot(dir), PathBuf::from("plots/sex_vs_survived.png"));
    }
}
