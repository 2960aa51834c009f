//! Configuration for titanic-eda.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (`--dataset-dir`, `--plots-dir`, `--color`)
//! 2. Environment variables (TITANIC_EDA_DATASETS, TITANIC_EDA_PLOTS)
//! 3. Config file (.titanic-eda/config.yaml)
//! 4. Defaults (./datasets, ./plots)
//!
//! The dataset is always fetched from [`DEFAULT_DATASET_URL`]; only where it
//! lands on disk is configurable.
//!
//! Config file discovery:
//! - Searches current directory and parents for .titanic-eda/config.yaml
//! - Falls back to <config dir>/titanic-eda/config.yaml
//! - Paths in a project config file are relative to the project root
//!   (the directory holding .titanic-eda/)
//!
//! The resolved configuration is a plain value handed to whoever needs it.

pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::console::{ColorMode, Palette};

/// Where the dataset is downloaded from
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/sitmbadept/sitmbadept.github.io/main/BDTM/R/titanic.csv";

const CONFIG_DIR: &str = ".titanic-eda";
const CONFIG_FILE: &str = "config.yaml";

const ENV_DATASETS: &str = "TITANIC_EDA_DATASETS";
const ENV_PLOTS: &str = "TITANIC_EDA_PLOTS";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub dataset: DatasetSection,
    #[serde(default)]
    pub plots: PlotsSection,
    #[serde(default)]
    pub console: ConsoleSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSection {
    /// Dataset directory (relative to the project root)
    pub dir: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotsSection {
    /// Plots directory (relative to the project root)
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleSection {
    pub color: Option<ColorMode>,
    #[serde(default)]
    pub palette: Palette,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dataset_dir: Option<PathBuf>,
    pub plots_dir: Option<PathBuf>,
    pub color: Option<ColorMode>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Directory holding the downloaded CSV
    pub dataset_dir: PathBuf,
    /// File name of the CSV inside `dataset_dir`
    pub dataset_file: String,
    /// Directory receiving the PNG plots
    pub plots_dir: PathBuf,
    pub color: ColorMode,
    pub palette: Palette,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults rooted at `base`
    pub fn defaults(base: &Path) -> Self {
        Self {
            dataset_dir: base.join("datasets"),
            dataset_file: paths::DATASET_FILE.to_string(),
            plots_dir: base.join("plots"),
            color: ColorMode::Auto,
            palette: Palette::default(),
            config_file: None,
        }
    }

    /// Full path of the downloaded CSV
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset_dir.join(&self.dataset_file)
    }
}

/// Find config file by searching `start` and its parents, then the user config dir
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("titanic-eda").join(CONFIG_FILE);
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Directory that relative paths in `config_path` resolve against
fn config_base_dir(config_path: &Path) -> PathBuf {
    let parent = config_path.parent().unwrap_or(Path::new("."));
    if parent.file_name().map_or(false, |name| name == CONFIG_DIR) {
        parent.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge all sources into a resolved configuration
///
/// `env` looks up environment variables; `cwd` anchors defaults and
/// config discovery.
pub fn resolve<E>(cwd: &Path, env: E, overrides: &Overrides) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config = ResolvedConfig::defaults(cwd);

    if let Some(config_path) = find_config_file(cwd) {
        let file = load_config_file(&config_path)?;
        apply_file(&mut config, &file, &config_base_dir(&config_path));
        config.config_file = Some(config_path);
    }

    if let Some(dir) = env(ENV_DATASETS) {
        config.dataset_dir = PathBuf::from(dir);
    }
    if let Some(dir) = env(ENV_PLOTS) {
        config.plots_dir = PathBuf::from(dir);
    }

    if let Some(ref dir) = overrides.dataset_dir {
        config.dataset_dir = dir.clone();
    }
    if let Some(ref dir) = overrides.plots_dir {
        config.plots_dir = dir.clone();
    }
    if let Some(color) = overrides.color {
        config.color = color;
    }

    Ok(config)
}

fn apply_file(config: &mut ResolvedConfig, file: &ConfigFile, base_dir: &Path) {
    if let Some(ref dir) = file.dataset.dir {
        config.dataset_dir = resolve_path(base_dir, dir);
    }
    if let Some(ref name) = file.dataset.file_name {
        config.dataset_file = name.clone();
    }
    if let Some(ref dir) = file.plots.dir {
        config.plots_dir = resolve_path(base_dir, dir);
    }
    if let Some(color) = file.console.color {
        config.color = color;
    }
    config.palette = file.console.palette.clone();
}

/// Load configuration from the process environment and working directory
pub fn load_config(overrides: &Overrides) -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    resolve(&cwd, |key| std::env::var(key).ok(), overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = resolve(temp.path(), no_env, &Overrides::default()).unwrap();

        // A user-level config could exist on the machine; only check paths
        // when nothing was discovered.
        if config.config_file.is_none() {
            assert_eq!(config.dataset_dir, temp.path().join("datasets"));
            assert_eq!(config.plots_dir, temp.path().join("plots"));
            assert_eq!(config.dataset_path(), temp.path().join("datasets/titanic.csv"));
        }
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
version: "1"
dataset:
  dir: data
  file_name: passengers.csv
plots:
  dir: out/plots
console:
  color: never
  palette:
    heading: "1;34"
"#,
        );

        let file = load_config_file(&path).unwrap();
        assert_eq!(file.version, "1");
        assert_eq!(file.dataset.dir, Some("data".to_string()));
        assert_eq!(file.console.color, Some(ColorMode::Never));
        assert_eq!(file.console.palette.heading, "1;34");
        assert_eq!(file.console.palette.success, "92");
    }

    #[test]
    fn test_file_paths_relative_to_project_root() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "version: \"1\"\ndataset:\n  dir: data\nplots:\n  dir: out/plots\n",
        );
        let nested = temp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve(&nested, no_env, &Overrides::default()).unwrap();

        assert_eq!(config.dataset_dir, temp.path().join("data"));
        assert_eq!(config.plots_dir, temp.path().join("out/plots"));
        assert_eq!(
            config.config_file,
            Some(temp.path().join(CONFIG_DIR).join(CONFIG_FILE))
        );
    }

    #[test]
    fn test_precedence_flags_over_env_over_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "version: \"1\"\ndataset:\n  dir: from-file\nplots:\n  dir: file-plots\n",
        );

        let env = |key: &str| match key {
            ENV_DATASETS => Some("/env/datasets".to_string()),
            ENV_PLOTS => Some("/env/plots".to_string()),
            _ => None,
        };
        let overrides = Overrides {
            dataset_dir: Some(PathBuf::from("/flag/datasets")),
            ..Default::default()
        };

        let config = resolve(temp.path(), env, &overrides).unwrap();

        assert_eq!(config.dataset_dir, PathBuf::from("/flag/datasets"));
        assert_eq!(config.plots_dir, PathBuf::from("/env/plots"));
    }

    #[test]
    fn test_dataset_url_is_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "version: \"1\"\ndataset:\n  url: https://example.com/t.csv\n",
        );

        let result = resolve(temp.path(), no_env, &Overrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "version: [unclosed");

        let result = resolve(temp.path(), no_env, &Overrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_config_base_dir() {
        assert_eq!(
            config_base_dir(Path::new("/proj/.titanic-eda/config.yaml")),
            PathBuf::from("/proj")
        );
        assert_eq!(
            config_base_dir(Path::new("/home/u/.config/titanic-eda/config.yaml")),
            PathBuf::from("/home/u/.config/titanic-eda")
        );
    }
}
