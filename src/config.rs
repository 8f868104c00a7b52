use crate::constants::CONFIG_RELATIVE_PATH;
use crate::env::EnvironmentView;
use crate::error::{Result, SbError};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fallback configuration compiled in from `assets/defaults.yaml`
pub static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(|| {
    serde_yaml::from_str(include_str!("../assets/defaults.yaml"))
        .expect("Invalid built-in defaults.yaml")
});

/// Repository location and alias → branch mapping
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub repo: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    pub fn branch_for(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}

/// The file as written on disk; every field may be absent.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    repo: Option<String>,
    #[serde(default, alias = "slugs")]
    aliases: Option<BTreeMap<String, String>>,
}

/// What to do when the config file is missing or incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Any problem is an error that points at `sb install`
    Strict,
    /// Problems fall back to the defaults, field by field
    Lenient,
}

/// Locates and loads the config file
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    defaults: Config,
    policy: LoadPolicy,
}

impl ConfigResolver {
    pub fn new(defaults: Config, policy: LoadPolicy) -> Self {
        Self { defaults, policy }
    }

    /// Strict resolver backed by the built-in defaults
    pub fn strict() -> Self {
        Self::new(DEFAULT_CONFIG.clone(), LoadPolicy::Strict)
    }

    /// `$SB_CONFIG` if non-blank, otherwise `~/.config/sb.yaml`
    pub fn config_path(env: &EnvironmentView) -> Result<PathBuf> {
        if let Some(path) = env.config_override() {
            return Ok(PathBuf::from(path));
        }
        let home = env.home.as_deref().ok_or(SbError::HomeNotFound)?;
        Ok(home.join(CONFIG_RELATIVE_PATH))
    }

    /// Resolve the config path from `env` and load it
    pub fn load(&self, env: &EnvironmentView) -> Result<Config> {
        match Self::config_path(env) {
            Ok(path) => self.load_from(&path),
            Err(e) if self.policy == LoadPolicy::Lenient => {
                warn!("{e}; using built-in defaults");
                Ok(self.defaults.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Load the config at an explicit path
    pub fn load_from(&self, path: &Path) -> Result<Config> {
        debug!("Loading config from {}", path.display());

        let file = match self.read_file(path) {
            Ok(file) => file,
            Err(e) if self.policy == LoadPolicy::Lenient => {
                warn!("{e}; using built-in defaults");
                return Ok(self.defaults.clone());
            }
            Err(e) => return Err(e),
        };

        match self.policy {
            LoadPolicy::Strict => {
                let repo = file
                    .repo
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| SbError::MissingRepo {
                        path: path.to_path_buf(),
                    })?;
                Ok(Config {
                    repo,
                    aliases: file.aliases.unwrap_or_default(),
                })
            }
            LoadPolicy::Lenient => Ok(Config {
                repo: file
                    .repo
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| self.defaults.repo.clone()),
                aliases: file
                    .aliases
                    .unwrap_or_else(|| self.defaults.aliases.clone()),
            }),
        }
    }

    fn read_file(&self, path: &Path) -> Result<ConfigFile> {
        let contents = fs::read_to_string(path).map_err(|source| SbError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(ConfigFile::default());
        }

        let file: Option<ConfigFile> =
            serde_yaml::from_str(&contents).map_err(|source| SbError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.unwrap_or_default())
    }
}
