// Dispatcher Settings
//
// Reads the dispatcher configuration from config.json and keeps one
// immutable copy for the whole process (singleton pattern).
//

use crate::error::ConfigError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const CONFIG_DIR_NAME: &str = "alleria-notify";
const CONFIG_FILE_NAME: &str = "config.json";

/// Global configuration singleton, set once at startup
static CONFIG: OnceCell<Arc<DispatcherConfig>> = OnceCell::new();

/// Fixed presentation settings shared by every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Deployed dispatcher version, logged on install/activate
    pub version: String,
    pub app_name: String,
    pub icon: String,
    pub badge: String,
    pub view_action_icon: String,
    /// Route used both to match open pages on click and to open a new one
    pub target_path: String,
    /// Body used when a push carries nothing usable
    pub generic_message: String,
    pub view_action_title: String,
    pub dismiss_action_title: String,
    /// Desktop bundle identifier (Tauri host only)
    pub bundle_identifier: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            app_name: "🍽️ Restaurante Alleria".to_string(),
            icon: "/static/images/logo-alleria.png".to_string(),
            badge: "/static/images/logo-alleria.png".to_string(),
            view_action_icon: "/static/images/icono-de-la-mesa-redonda.webp".to_string(),
            target_path: "/cliente".to_string(),
            generic_message: "Es tu turno en el restaurante!".to_string(),
            view_action_title: "Ver Mesa".to_string(),
            dismiss_action_title: "Cerrar".to_string(),
            bundle_identifier: "com.alleria.notify".to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_path.starts_with('/') || self.target_path.starts_with("//") {
            return Err(ConfigError::InvalidTargetPath(self.target_path.clone()));
        }
        Ok(())
    }
}

/// Get the default config.json path (`<config dir>/alleria-notify/config.json`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read and validate a config file
pub fn load_from_path(path: &Path) -> Result<DispatcherConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: DispatcherConfig =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    config.validate()?;
    info!("[Config] Loaded dispatcher config from {:?}", path);
    Ok(config)
}

/// Read the config at `path` (or the default location), falling back to
/// built-in defaults when the file does not exist
pub fn load_or_default(path: Option<&Path>) -> Result<DispatcherConfig, ConfigError> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("[Config] No config directory available, using defaults");
            return Ok(DispatcherConfig::default());
        }
    };

    if !path.exists() {
        info!("[Config] No config at {:?}, using defaults", path);
        return Ok(DispatcherConfig::default());
    }

    load_from_path(&path)
}

/// Install the process-wide configuration
/// This should be called once during startup, before the first event
pub fn init(config: DispatcherConfig) -> Result<Arc<DispatcherConfig>, ConfigError> {
    config.validate()?;
    let config = Arc::new(config);
    if CONFIG.set(config.clone()).is_err() {
        warn!("[Config] Configuration already initialized, keeping the first one");
        return Err(ConfigError::AlreadyInitialized);
    }
    info!("[Config] Dispatcher configuration initialized (version {})", config.version);
    Ok(config)
}

/// Get the process-wide configuration, defaults if `init` was never called
pub fn current() -> Arc<DispatcherConfig> {
    CONFIG
        .get_or_init(|| Arc::new(DispatcherConfig::default()))
        .clone()
}
