//! Command-line interface for titanic-eda.
//!
//! Provides commands for the full run, the download stage alone, the
//! printed overview, the plot stage alone and the resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::{HttpSource, PlottersRenderer};
use crate::config::{self, Overrides, ResolvedConfig, DEFAULT_DATASET_URL};
use crate::console::{ColorMode, Console};
use crate::core::{print_overview, Pipeline};
use crate::domain::{find_csv, Dataset};

/// titanic-eda - Download the Titanic dataset, summarize it and plot it
#[derive(Parser, Debug)]
#[command(name = "titanic-eda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory the dataset is downloaded into
    #[arg(long, global = true)]
    pub dataset_dir: Option<PathBuf>,

    /// Directory the plots are written to
    #[arg(long, global = true)]
    pub plots_dir: Option<PathBuf>,

    /// When to color status output
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, summarize and plot (skipping anything already on disk)
    Run {
        /// Download the dataset even if it exists
        #[arg(long)]
        refresh: bool,
    },

    /// Download the dataset only
    Download {
        /// Download the dataset even if it exists
        #[arg(long)]
        refresh: bool,
    },

    /// Print the dataset overview
    Summary {
        /// CSV to summarize (defaults to the configured dataset)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate missing plots from the downloaded dataset
    Plots,

    /// Show resolved configuration (debug)
    Config,
}

/// Color mode for CLI (maps to ColorMode)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            dataset_dir: self.dataset_dir.clone(),
            plots_dir: self.plots_dir.clone(),
            color: self.color.map(ColorMode::from),
        }
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::load_config(&self.overrides())?;

        match self.command {
            Commands::Run { refresh } => run(cfg, refresh).await,
            Commands::Download { refresh } => download(cfg, refresh).await,
            Commands::Summary { file } => summary(&cfg, file),
            Commands::Plots => plots(cfg),
            Commands::Config => show_config(&cfg),
        }
    }
}

fn console_for(cfg: &ResolvedConfig) -> Console {
    Console::stdout(cfg.palette.clone(), cfg.color)
}

fn pipeline_for(cfg: ResolvedConfig) -> Pipeline<HttpSource, PlottersRenderer> {
    let source = HttpSource::new(DEFAULT_DATASET_URL);
    Pipeline::new(cfg, source, PlottersRenderer::new())
}

/// Run every stage
async fn run(cfg: ResolvedConfig, refresh: bool) -> Result<()> {
    let mut console = console_for(&cfg);
    let pipeline = pipeline_for(cfg).with_refresh(refresh);

    pipeline.run(&mut console).await?;
    Ok(())
}

/// Fetch the dataset only
async fn download(cfg: ResolvedConfig, refresh: bool) -> Result<()> {
    let mut console = console_for(&cfg);
    let pipeline = pipeline_for(cfg).with_refresh(refresh);

    pipeline.fetch(&mut console).await?;
    console.flush()?;
    Ok(())
}

/// Print the overview of a local CSV
fn summary(cfg: &ResolvedConfig, file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => locate_dataset(cfg)?,
    };

    let dataset = Dataset::from_path(&path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;

    let mut console = console_for(cfg);
    print_overview(&dataset, &mut console)?;
    console.flush()?;
    Ok(())
}

/// Configured dataset path, else the first CSV under the dataset directory
fn locate_dataset(cfg: &ResolvedConfig) -> Result<PathBuf> {
    let configured = cfg.dataset_path();
    if configured.exists() {
        return Ok(configured);
    }

    find_csv(&cfg.dataset_dir).with_context(|| {
        format!(
            "No CSV file found in {} (run `titanic-eda download` first)",
            cfg.dataset_dir.display()
        )
    })
}

/// Plot stage over the already downloaded dataset
fn plots(cfg: ResolvedConfig) -> Result<()> {
    let mut console = console_for(&cfg);
    let path = locate_dataset(&cfg)?;
    let dataset = Dataset::from_path(&path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;

    let pipeline = pipeline_for(cfg);
    pipeline.generate_plots(&dataset, &mut console)?;
    console.flush()?;
    Ok(())
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("════════════════════════════════════════");
    println!("  titanic-eda Configuration");
    println!("════════════════════════════════════════");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Dataset:");
    println!("  URL:   {}", DEFAULT_DATASET_URL);
    println!("  Dir:   {}", cfg.dataset_dir.display());
    println!("  File:  {}", cfg.dataset_path().display());
    println!();
    println!("Plots:");
    println!("  Dir:   {}", cfg.plots_dir.display());
    println!();
    println!("Console:");
    println!("  Color: {:?}", cfg.color);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "titanic-eda",
            "run",
            "--refresh",
            "--plots-dir",
            "/tmp/plots",
            "--color",
            "never",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Run { refresh: true }));
        let overrides = cli.overrides();
        assert_eq!(overrides.plots_dir, Some(PathBuf::from("/tmp/plots")));
        assert_eq!(overrides.color, Some(ColorMode::Never));
        assert_eq!(overrides.dataset_dir, None);
    }

    #[test]
    fn test_dataset_url_flag_does_not_exist() {
        let result = Cli::try_parse_from([
            "titanic-eda",
            "run",
            "--url",
            "https://example.com/other.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_file_flag() {
        let cli = Cli::try_parse_from(["titanic-eda", "summary", "--file", "data.csv"]).unwrap();
        match cli.command {
            Commands::Summary { file } => assert_eq!(file, Some(PathBuf::from("data.csv"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_locate_dataset_falls_back_to_any_csv() {
        let temp = TempDir::new().unwrap();
        let mut cfg = ResolvedConfig::defaults(temp.path());
        let nested = cfg.dataset_dir.join("archive");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("passengers.csv"), "a\n1\n").unwrap();

        assert_eq!(locate_dataset(&cfg).unwrap(), nested.join("passengers.csv"));

        std::fs::write(cfg.dataset_path(), "a\n1\n").unwrap();
        assert_eq!(locate_dataset(&cfg).unwrap(), cfg.dataset_path());

        cfg.dataset_dir = temp.path().join("empty");
        assert!(locate_dataset(&cfg).is_err());
    }
}
