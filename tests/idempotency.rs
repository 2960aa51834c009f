//! Idempotency Integration Tests
//!
//! Full pipeline runs against temp directories with a fake dataset source
//! and a renderer that only counts calls and touches the output file.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use titanic_eda::adapters::{DatasetSource, PlotRenderer};
use titanic_eda::config::paths;
use titanic_eda::core::{GateOutcome, Pipeline};
use titanic_eda::domain::{Dataset, PlotKind, PlotRequest};
use titanic_eda::{Console, ResolvedConfig};

const TITANIC: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,Fare
1,0,3,\"Braund, Mr. Owen Harris\",male,22,7.25
2,1,1,\"Cumings, Mrs. John Bradley\",female,38,71.2833
3,1,3,\"Heikkinen, Miss. Laina\",female,26,7.925
4,1,1,\"Futrelle, Mrs. Jacques Heath\",female,35,53.1
5,0,3,\"Allen, Mr. William Henry\",male,35,8.05
6,0,3,\"Moran, Mr. James\",male,,8.4583
";

const SMALL: &str = "\
Age,Fare,Survived,Sex
22,7.25,0,male
38,71.28,1,female
26,7.92,1,female
";

/// Source serving a fixed CSV and counting fetches
struct FakeSource {
    body: &'static str,
    fetches: Arc<AtomicUsize>,
}

impl FakeSource {
    fn new(body: &'static str) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            Self {
                body,
                fetches: fetches.clone(),
            },
            fetches,
        )
    }
}

#[async_trait]
impl DatasetSource for FakeSource {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.as_bytes().to_vec())
    }
}

/// Renderer that writes a placeholder file and records what it drew
#[derive(Clone, Default)]
struct CountingRenderer {
    drawn: Arc<Mutex<Vec<PlotKind>>>,
}

impl CountingRenderer {
    fn calls(&self) -> usize {
        self.drawn.lock().unwrap().len()
    }

    fn kinds(&self) -> Vec<PlotKind> {
        self.drawn.lock().unwrap().clone()
    }
}

impl PlotRenderer for CountingRenderer {
    fn render(&self, request: &PlotRequest, _dataset: &Dataset, path: &Path) -> Result<()> {
        self.drawn.lock().unwrap().push(request.kind.clone());
        std::fs::write(path, b"\x89PNG")?;
        Ok(())
    }
}

fn pipeline(
    temp: &TempDir,
    body: &'static str,
) -> (
    Pipeline<FakeSource, CountingRenderer>,
    Arc<AtomicUsize>,
    CountingRenderer,
) {
    let (source, fetches) = FakeSource::new(body);
    let renderer = CountingRenderer::default();
    let config = ResolvedConfig::defaults(temp.path());
    (
        Pipeline::new(config, source, renderer.clone()),
        fetches,
        renderer,
    )
}

fn sorted_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_second_run_regenerates_nothing() {
    let temp = TempDir::new().unwrap();
    let (pipeline, fetches, renderer) = pipeline(&temp, TITANIC);

    let (mut console, _) = Console::buffered();
    let first = pipeline.run(&mut console).await.unwrap();
    let listing_after_first = sorted_listing(&pipeline.config().plots_dir);

    let (mut console, capture) = Console::buffered();
    let second = pipeline.run(&mut console).await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    // PassengerId, Survived, Pclass, Age, Fare + scatter + heatmap + gender
    assert_eq!(first.produced.len(), 8);
    assert_eq!(renderer.calls(), 8);

    assert!(second.is_noop());
    assert!(second.skipped_all);
    assert_eq!(second.cached.len(), 8);
    assert_eq!(sorted_listing(&pipeline.config().plots_dir), listing_after_first);

    let out = capture.contents();
    assert!(out.contains("✓ Dataset already exists"));
    assert!(out.contains("Skipping plot generation..."));
}

#[tokio::test]
async fn test_empty_plots_dir_produces_expected_set() {
    let temp = TempDir::new().unwrap();
    let (pipeline, _, renderer) = pipeline(&temp, SMALL);
    let (mut console, capture) = Console::buffered();

    let report = pipeline.run(&mut console).await.unwrap();
    let plots_dir = &pipeline.config().plots_dir;

    assert_eq!(
        sorted_listing(plots_dir),
        vec![
            "Age_distribution.png",
            "Fare_distribution.png",
            "Survived_distribution.png",
            "correlation_heatmap.png",
            "sex_vs_survived.png",
            "size_vs_price.png",
        ]
    );
    assert_eq!(report.produced.len(), 6);
    assert!(report.cached.is_empty());
    assert_eq!(
        renderer.kinds()[3],
        PlotKind::Scatter {
            x: "Age".to_string(),
            y: "Fare".to_string()
        }
    );

    let out = capture.contents();
    assert!(out.contains("--- Creating Visualizations ---"));
    assert!(out.contains("✓ Created distribution plot: Age"));
    assert!(out.contains("✓ Created scatterplot: Age vs Fare"));
    assert!(out.contains("✓ Created correlation heatmap"));
    assert!(out.contains("✓ Created gender vs survived plot"));
}

#[tokio::test]
async fn test_all_plots_present_means_zero_render_calls() {
    let temp = TempDir::new().unwrap();
    let (pipeline, _, renderer) = pipeline(&temp, SMALL);
    let plots_dir = pipeline.config().plots_dir.clone();
    std::fs::create_dir_all(&plots_dir).unwrap();

    for path in [
        paths::distribution_plot(&plots_dir, "Age"),
        paths::distribution_plot(&plots_dir, "Fare"),
        paths::distribution_plot(&plots_dir, "Survived"),
        paths::scatter_plot(&plots_dir),
        paths::heatmap_plot(&plots_dir),
        paths::grouped_count_plot(&plots_dir),
    ] {
        std::fs::write(path, b"old").unwrap();
    }

    let (mut console, capture) = Console::buffered();
    let report = pipeline.run(&mut console).await.unwrap();

    assert_eq!(renderer.calls(), 0);
    assert!(report.skipped_all);

    let out = capture.contents();
    let plot_lines: Vec<&str> = out
        .lines()
        .skip_while(|l| !l.starts_with("Columns:"))
        .skip(1)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(
        plot_lines,
        vec![
            format!("✓ All plots already exist in '{}'", plots_dir.display()).as_str(),
            "Skipping plot generation...",
        ]
    );
}

#[tokio::test]
async fn test_partial_plots_only_fill_gaps() {
    let temp = TempDir::new().unwrap();
    let (pipeline, _, renderer) = pipeline(&temp, SMALL);
    let plots_dir = pipeline.config().plots_dir.clone();
    std::fs::create_dir_all(&plots_dir).unwrap();
    std::fs::write(paths::heatmap_plot(&plots_dir), b"old").unwrap();
    std::fs::write(paths::distribution_plot(&plots_dir, "Age"), b"old").unwrap();

    let (mut console, capture) = Console::buffered();
    let report = pipeline.run(&mut console).await.unwrap();

    assert_eq!(renderer.calls(), 4);
    assert_eq!(report.cached.len(), 2);
    assert_eq!(std::fs::read(paths::heatmap_plot(&plots_dir)).unwrap(), b"old");

    let out = capture.contents();
    assert!(out.contains("✓ Distribution plot already exists: Age"));
    assert!(out.contains("✓ Correlation heatmap already exists"));
    assert!(out.contains("✓ Created distribution plot: Fare"));
}

#[tokio::test]
async fn test_missing_gender_column_drops_gender_plot() {
    let temp = TempDir::new().unwrap();
    let (pipeline, _, renderer) = pipeline(&temp, "Age,Fare,Survived\n22,7.25,0\n38,71.28,1\n");
    let (mut console, _) = Console::buffered();

    let report = pipeline.run(&mut console).await.unwrap();

    assert_eq!(report.produced.len(), 5);
    assert!(!renderer
        .kinds()
        .iter()
        .any(|k| matches!(k, PlotKind::GroupedCount { .. })));
    assert!(!paths::grouped_count_plot(&pipeline.config().plots_dir).exists());
}

#[tokio::test]
async fn test_missing_price_column_drops_scatter() {
    let temp = TempDir::new().unwrap();
    let (pipeline, _, renderer) = pipeline(&temp, "Age,Sex,Survived\n22,male,0\n38,female,1\n");
    let (mut console, _) = Console::buffered();

    pipeline.run(&mut console).await.unwrap();

    assert!(!renderer
        .kinds()
        .iter()
        .any(|k| matches!(k, PlotKind::Scatter { .. })));
    assert!(!paths::scatter_plot(&pipeline.config().plots_dir).exists());
}

#[tokio::test]
async fn test_existing_dataset_is_not_fetched() {
    let temp = TempDir::new().unwrap();
    let (pipeline, fetches, _) = pipeline(&temp, TITANIC);
    let dataset_path = pipeline.config().dataset_path();
    std::fs::create_dir_all(dataset_path.parent().unwrap()).unwrap();
    std::fs::write(&dataset_path, SMALL).unwrap();

    let (mut console, _) = Console::buffered();
    let outcome = pipeline.fetch(&mut console).await.unwrap();
    let dataset = pipeline.load().unwrap();

    assert_eq!(outcome, GateOutcome::CacheHit);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    // the cached file wins over what the source would serve
    assert_eq!(dataset.row_count(), 3);
}
