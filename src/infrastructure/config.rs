use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Prefix of environment overrides, e.g. `ROWLENS_BACKEND__BASE_URL`.
pub const ENV_PREFIX: &str = "ROWLENS";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub view: ViewConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the diff backend, without the `/api/diff` path.
    pub base_url: String,
    /// Per-request timeout. Unset leaves the transport default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewConfig {
    /// Schema sent with every request; omitted when unset.
    #[serde(default)]
    pub schema: Option<String>,
    /// Key used when the command line names none.
    #[serde(default)]
    pub default_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: String,
}

impl AppConfig {
    /// Load `path` (TOML, optional) layered under `ROWLENS_*` environment
    /// variables. `__` separates nested keys.
    pub fn load(path: &str) -> Result<Self> {
        Self::builder(path)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config file: {}", path))?
            .try_deserialize()
            .with_context(|| "Failed to parse config")
    }

    /// Load `path` only, ignoring the environment.
    pub fn load_file(path: &str) -> Result<Self> {
        Self::builder(path)?
            .build()
            .with_context(|| format!("Failed to read config file: {}", path))?
            .try_deserialize()
            .with_context(|| "Failed to parse config")
    }

    fn builder(path: &str) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("backend.base_url", "http://localhost:8080")?
            .set_default("output.dir", "out")?
            .add_source(File::new(path, FileFormat::Toml).required(false)))
    }
}
