use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::registry::GeometryInput;
use crate::tracker::Source;


/// Default number of histories when neither file nor command line set one.
pub const DEFAULT_HISTORIES: usize = 10_000;

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub geometry: GeometryInput,
    pub source: Source,
    #[serde(default = "default_histories")]
    pub histories: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_histories() -> usize {
    DEFAULT_HISTORIES
}

impl Settings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text).context("invalid settings")?;
        validate_config(&settings)?;
        Ok(settings)
    }
}

/// Loads settings from a single file, with environment overrides.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("ELLIPSOIDS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("error loading configuration from {}", path.display()))?;

    let config: Settings = settings
        .try_deserialize()
        .context("error deserializing configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Loads `config/default.toml` from the project root, ignoring the command line.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    load_config_from(&root.join("config/default.toml"))
}

/// Loads settings for the binary: the file named by `--config`, otherwise
/// `config/local.toml` if present, otherwise `config/default.toml`; then the
/// environment; then command-line overrides.
pub fn load_config() -> Result<Settings> {
    let args = CliArgs::parse();

    let config_file = match &args.config {
        Some(path) => path.clone(),
        None => {
            let root = retrieve_project_root()?;
            let local_config = root.join("config/local.toml");
            if local_config.exists() {
                local_config
            } else {
                root.join("config/default.toml")
            }
        }
    };
    info!("using configuration: {}", config_file.display());

    let mut config = load_config_from(&config_file)?;
    args.apply(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the ELLIPSOIDS_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("ELLIPSOIDS_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .context("could not find project root directory")
}

fn validate_config(config: &Settings) -> Result<()> {
    if config.histories == 0 {
        bail!("number of histories must be greater than 0");
    }
    if let Some(direction) = config.source.direction {
        if direction.iter().all(|c| *c == 0.0) {
            bail!("source direction must be non-zero");
        }
    }
    if config.geometry.kind.is_empty() {
        bail!("geometry type must be set");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "Trace straight-line histories through an ellipsoid geometry")]
pub struct CliArgs {
    /// Configuration file. Defaults to config/local.toml, then config/default.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of histories to trace.
    #[arg(short = 'n', long)]
    histories: Option<usize>,

    /// Random seed for the isotropic source.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Source position, format: x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    position: Option<Vec<f64>>,

    /// Fixed source direction, format: x,y,z. Isotropic when omitted.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    direction: Option<Vec<f64>>,
}

impl CliArgs {
    /// Overrides values in `config` with those given on the command line.
    pub fn apply(&self, config: &mut Settings) -> Result<()> {
        if let Some(histories) = self.histories {
            config.histories = histories;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(position) = &self.position {
            config.source.position = triple(position, "position")?;
        }
        if let Some(direction) = &self.direction {
            config.source.direction = Some(triple(direction, "direction")?);
        }
        Ok(())
    }
}

fn triple(values: &[f64], flag: &str) -> Result<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => bail!(
            "--{} expects 3 comma-separated values (x,y,z), got {}",
            flag,
            values.len()
        ),
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Geometry: {} '{}'
  - Source Position: {:?}
  - Source Direction: {}
  - Histories: {}
  - Seed: {}
  ",
            self.geometry.kind,
            self.geometry.name,
            self.source.position,
            match self.source.direction {
                Some(d) => format!("{:?}", d),
                None => "isotropic".to_string(),
            },
            self.histories,
            match self.seed {
                Some(seed) => seed.to_string(),
                None => "random".to_string(),
            },
        )
    }
}
