// SPDX-License-Identifier: LGPL-3.0-only
use anyhow::Result;
use serde::Deserialize;
use smol::fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

/// XDG prefix under which configuration files are looked up.
pub const CONFIG_PREFIX: &str = "entryicons";

/// The main configuration structure for the application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Interface density settings
    #[serde(default)]
    pub gui: GuiSettings,
    /// Icon rendering and cache settings
    #[serde(default)]
    pub icons: IconSettings,
    /// Any other sections are captured here
    #[serde(flatten)]
    pub other: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuiSettings {
    /// Nonzero selects compact mode.
    pub application_density: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconSettings {
    pub device_pixel_ratio: Option<f32>,
    pub cache_limit_kb: Option<usize>,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The raw density setting, 0 when unset.
    pub fn application_density(&self) -> i64 {
        self.gui.application_density.unwrap_or(0)
    }

    /// Whether the density setting selects compact mode.
    pub fn compact_mode(&self) -> bool {
        self.application_density() != 0
    }

    fn defaults() -> Self {
        Self {
            gui: GuiSettings {
                application_density: Some(0),
            },
            icons: IconSettings::default(),
            other: HashMap::new(),
        }
    }
}

/// Registry for managing application settings.
pub struct SettingsRegistry {
    config: Config,
}

impl SettingsRegistry {
    /// Create a new SettingsRegistry and load configuration from standard locations.
    pub async fn new() -> Result<Self> {
        let mut registry = Self::with_defaults();
        registry.load().await?;
        Ok(registry)
    }

    /// Create a registry holding only the built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            config: Config::defaults(),
        }
    }

    /// Load configuration from standard locations in precedence order.
    ///
    /// Order (later overrides earlier):
    /// 1. System Data: /usr/share/entryicons/config.toml (and XDG_DATA_DIRS)
    /// 2. System Config: /etc/xdg/entryicons/config.toml (and XDG_CONFIG_DIRS)
    /// 3. User Config: ~/.config/entryicons/config.toml (XDG_CONFIG_HOME)
    pub async fn load(&mut self) -> Result<()> {
        let xdg_dirs = BaseDirectories::with_prefix(CONFIG_PREFIX)?;
        self.load_config_type(&xdg_dirs, "config.toml").await;
        Ok(())
    }

    async fn load_config_type(&mut self, xdg_dirs: &BaseDirectories, filename: &str) {
        // 1. Load from system data directories
        for path in xdg_dirs.find_data_files(filename).rev() {
            self.load_file(&path).await;
        }

        // 2. Load from system config directories
        for path in xdg_dirs.find_config_files(filename).rev() {
            self.load_file(&path).await;
        }

        // 3. Load from user config directory
        if let Some(user_config_path) = xdg_dirs.find_config_file(filename) {
            self.load_file(&user_config_path).await;
        } else {
            let user_config_path = xdg_dirs.get_config_home().join(filename);
            if user_config_path.exists() {
                self.load_file(&user_config_path).await;
            }
        }
    }

    async fn load_file(&mut self, path: &Path) {
        log::info!("Loading config from: {:?}", path);
        match fs::read_to_string(path).await {
            Ok(content) => match Config::from_toml(&content) {
                Ok(loaded_config) => {
                    self.merge(loaded_config);
                },
                Err(e) => {
                    log::error!("Failed to parse config file {:?}: {}", path, e);
                },
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
            },
        }
    }

    /// Merge a loaded config into the current config.
    fn merge(&mut self, other: Config) {
        // GUI
        if let Some(density) = other.gui.application_density {
            self.config.gui.application_density = Some(density);
        }

        // Icons
        if let Some(ratio) = other.icons.device_pixel_ratio {
            self.config.icons.device_pixel_ratio = Some(ratio);
        }
        if let Some(limit) = other.icons.cache_limit_kb {
            self.config.icons.cache_limit_kb = Some(limit);
        }

        // Other
        self.config.other.extend(other.other);
    }

    /// Get the current configuration.
    pub fn get(&self) -> &Config {
        &self.config
    }

    /// Load configuration from multiple custom paths asynchronously.
    pub async fn load_from_paths_async(&mut self, paths: Vec<PathBuf>) -> Vec<Result<()>> {
        let mut results = Vec::new();

        for path in paths {
            let result = async {
                let content = fs::read_to_string(&path)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;

                let loaded_config = Config::from_toml(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;

                self.merge(loaded_config);
                Ok(())
            }
            .await;

            results.push(result);
        }

        results
    }

    /// Reload configuration asynchronously (re-runs the full load process).
    pub async fn reload_async(&mut self) -> Result<()> {
        *self = Self::with_defaults();
        self.load().await
    }
}
