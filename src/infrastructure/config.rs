use crate::domain::{
    config::SerialFlowConfig,
    error::{SerialFlowError, SerialFlowResult},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR_NAME: &str = "serialflow";
const PROJECT_DIR_NAME: &str = ".serialflow";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration manager
///
/// Reads the user-wide file and an optional project file found by walking up
/// from the current directory. Keys set in the project file override the
/// user-wide ones; anything unset falls back to built-in defaults.
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> SerialFlowResult<Self> {
        let global_config_path = Self::default_global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration from files
    pub fn load_config(&self) -> SerialFlowResult<SerialFlowConfig> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        for path in std::iter::once(&self.global_config_path).chain(self.project_config_path.as_ref()) {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                merge_values(&mut merged, read_value(path)?);
            }
        }

        merged.try_into::<SerialFlowConfig>().map_err(|e| SerialFlowError::Config {
            message: format!("Invalid configuration: {}", e),
        })
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> SerialFlowResult<SerialFlowConfig> {
        let content = fs::read_to_string(path).map_err(|e| SerialFlowError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| SerialFlowError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &SerialFlowConfig) -> SerialFlowResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SerialFlowError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| SerialFlowError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| SerialFlowError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Writes a default configuration file, refusing to overwrite one.
    pub fn init_config(&self, path: &Path) -> SerialFlowResult<()> {
        if path.exists() {
            return Err(SerialFlowError::Config {
                message: format!("Configuration already exists at {}", path.display()),
            });
        }
        self.save_config_to_path(path, &SerialFlowConfig::default())
    }

    /// Project configuration file location under `dir`.
    pub fn project_config_path_in(dir: &Path) -> PathBuf {
        dir.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    pub fn global_config_path(&self) -> &Path {
        &self.global_config_path
    }

    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_config_path.as_deref()
    }

    fn default_global_config_path() -> SerialFlowResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| SerialFlowError::Config {
            message: "Could not determine configuration directory".to_string(),
        })?;

        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        current_dir
            .ancestors()
            .map(Self::project_config_path_in)
            .find(|path| path.exists())
    }
}

fn read_value(path: &Path) -> SerialFlowResult<toml::Value> {
    let content = fs::read_to_string(path).map_err(|e| SerialFlowError::Config {
        message: format!("Failed to read config file {}: {}", path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| SerialFlowError::Config {
        message: format!("Failed to parse config file {}: {}", path.display(), e),
    })
}

/// Recursively overlays tables; any other value in `overlay` replaces the base.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
