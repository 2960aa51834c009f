//! The end-to-end run: fetch, load, print, plot.
//!
//! Stages run strictly in sequence. Every artifact goes through the
//! existence gate, so a second run over the same directories only reads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::adapters::http::download_dataset;
use crate::adapters::{DatasetSource, PlotRenderer};
use crate::config::ResolvedConfig;
use crate::console::{Console, Style};
use crate::domain::{Artifact, Dataset, PlotPlan};

use super::gate::{all_exist, ensure, ensure_async, GateOutcome};
use super::summary::{describe, head, info as dataset_info};

/// Rows shown at the top of the overview
const HEAD_ROWS: usize = 5;

/// What the plot stage did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotReport {
    /// Plots rendered by this run
    pub produced: Vec<PathBuf>,

    /// Plots that were already on disk
    pub cached: Vec<PathBuf>,

    /// Every plot existed, so the stage was skipped as a whole
    pub skipped_all: bool,
}

impl PlotReport {
    pub fn is_noop(&self) -> bool {
        self.produced.is_empty()
    }
}

/// Sequential EDA pipeline over one dataset and one plots directory
pub struct Pipeline<S, R> {
    config: ResolvedConfig,
    source: S,
    renderer: R,
    /// Re-download even when the dataset is on disk
    refresh: bool,
}

impl<S, R> Pipeline<S, R>
where
    S: DatasetSource,
    R: PlotRenderer,
{
    pub fn new(config: ResolvedConfig, source: S, renderer: R) -> Self {
        Self {
            config,
            source,
            renderer,
            refresh: false,
        }
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Make sure the dataset is on disk, downloading it if needed
    #[instrument(skip_all, fields(source = %self.source.describe()))]
    pub async fn fetch(&self, console: &mut Console) -> Result<GateOutcome> {
        let artifact = Artifact::dataset(self.config.dataset_path());
        let dataset_path = artifact.path();

        tokio::fs::create_dir_all(&self.config.dataset_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create dataset directory: {}",
                    self.config.dataset_dir.display()
                )
            })?;

        if self.refresh && artifact.state().exists() {
            info!(
                operation = "dataset.refresh",
                kind = %artifact.kind,
                path = %dataset_path.display(),
                "removing cached artifact"
            );
            tokio::fs::remove_file(dataset_path)
                .await
                .with_context(|| format!("Failed to remove dataset: {}", dataset_path.display()))?;
        }

        let outcome = ensure_async(dataset_path, || {
            download_dataset(&self.source, dataset_path)
        })
        .await?;

        match outcome {
            GateOutcome::Produced => console.line(
                Style::Success,
                &format!("Downloaded Titanic dataset → {}", dataset_path.display()),
            )?,
            GateOutcome::CacheHit => console.line(
                Style::Exists,
                &format!("✓ Dataset already exists: {}", dataset_path.display()),
            )?,
        }

        Ok(outcome)
    }

    /// Read the downloaded dataset
    pub fn load(&self) -> Result<Dataset> {
        let path = self.config.dataset_path();
        let dataset = Dataset::from_path(&path)
            .with_context(|| format!("Failed to load dataset: {}", path.display()))?;

        info!(
            operation = "dataset.load",
            status = "success",
            rows = dataset.row_count(),
            columns = dataset.columns().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn print_overview(&self, dataset: &Dataset, console: &mut Console) -> Result<()> {
        print_overview(dataset, console)
    }

    /// Render every plot that is not on disk yet
    #[instrument(skip_all, fields(plots_dir = %self.config.plots_dir.display()))]
    pub fn generate_plots(&self, dataset: &Dataset, console: &mut Console) -> Result<PlotReport> {
        let plots_dir = &self.config.plots_dir;
        std::fs::create_dir_all(plots_dir).with_context(|| {
            format!("Failed to create plots directory: {}", plots_dir.display())
        })?;

        let plan = PlotPlan::for_dataset(dataset, plots_dir);
        let mut report = PlotReport::default();

        if all_exist(plan.paths()) {
            console.blank()?;
            console.line(
                Style::Success,
                &format!("✓ All plots already exist in '{}'", plots_dir.display()),
            )?;
            console.line(Style::Skip, "Skipping plot generation...")?;

            report.cached = plan.paths().into_iter().map(Path::to_path_buf).collect();
            report.skipped_all = true;
            return Ok(report);
        }

        console.blank()?;
        console.line(Style::Section, "--- Creating Visualizations ---")?;

        for request in plan.requests() {
            let path = request.path();
            let outcome = ensure(path, || self.renderer.render(request, dataset, path))?;

            if outcome.is_hit() {
                console.line(Style::Exists, &request.exists_message())?;
                report.cached.push(path.to_path_buf());
            } else {
                console.line(Style::Success, &request.created_message())?;
                report.produced.push(path.to_path_buf());
            }
        }

        info!(
            operation = "plots.generate",
            status = "success",
            produced = report.produced.len(),
            cached = report.cached.len(),
            "plot stage finished"
        );
        Ok(report)
    }

    /// Fetch, load, print the overview, then plot
    pub async fn run(&self, console: &mut Console) -> Result<PlotReport> {
        self.fetch(console).await?;
        let dataset = self.load()?;
        self.print_overview(&dataset, console)?;
        let report = self.generate_plots(&dataset, console)?;
        console.flush()?;
        Ok(report)
    }
}

/// Print head, info, describe and the column list of `dataset`
pub fn print_overview(dataset: &Dataset, console: &mut Console) -> Result<()> {
    console.line(Style::Heading, "=== Titanic Dataset Overview ===")?;
    console.plain(&format!("first {} rows:", HEAD_ROWS))?;
    console.plain(&head(dataset, HEAD_ROWS))?;

    console.blank()?;
    console.line(Style::Success, "Dataset Info:")?;
    console.plain(&dataset_info(dataset).to_string())?;

    console.blank()?;
    console.line(Style::Heading, "Statistical Summary:")?;
    console.plain(&describe(dataset).to_string())?;

    console.blank()?;
    console.line(Style::Alert, &format!("Columns: {}", column_list(dataset)))?;
    Ok(())
}

/// `['a', 'b']` style listing of the column names
fn column_list(dataset: &Dataset) -> String {
    let quoted: Vec<String> = dataset
        .column_names()
        .iter()
        .map(|name| format!("'{}'", name))
        .collect();
    format!("[{}]", quoted.join(", "))
}
