use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "quire";

/// Page layout mode: one page per row, or facing pairs side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    #[default]
    Single,
    Double,
}

impl PageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageMode::Single => "Single",
            PageMode::Double => "Double",
        }
    }

    pub fn toggled(&self) -> PageMode {
        match self {
            PageMode::Single => PageMode::Double,
            PageMode::Double => PageMode::Single,
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, PageMode::Double)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Zoom factor stored as text so hand-edited values round-trip unchanged.
    #[serde(default = "default_zoom_level")]
    pub zoom_level: String,

    #[serde(default)]
    pub page_mode: PageMode,

    /// "dark" or "light"; absent until the user toggles the theme explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_zoom_level() -> String {
    "1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            zoom_level: default_zoom_level(),
            page_mode: PageMode::default(),
            theme: None,
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

fn load_settings_from_path(path: &PathBuf) {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, cannot save settings");
        return;
    };

    if let Ok(settings) = SETTINGS.read() {
        save_settings_to_file(&settings, &path);
    }
}

fn save_settings_to_file(settings: &Settings, path: &PathBuf) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    match serde_yaml::to_string(settings) {
        Ok(content) => match fs::write(path, content) {
            Ok(()) => debug!("Saved settings to {path:?}"),
            Err(e) => error!("Failed to save settings to {path:?}: {e}"),
        },
        Err(e) => error!("Failed to serialize settings: {e}"),
    }
}

// Public API for accessing/modifying settings

/// Parsed zoom factor; falls back to 1.0 when the stored text is not a number.
pub fn get_zoom_level() -> f32 {
    SETTINGS
        .read()
        .ok()
        .and_then(|s| s.zoom_level.trim().parse::<f32>().ok())
        .unwrap_or(1.0)
}

pub fn set_zoom_level(factor: f32) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.zoom_level = format!("{factor}");
    }
    save_settings();
}

pub fn get_page_mode() -> PageMode {
    SETTINGS.read().map(|s| s.page_mode).unwrap_or_default()
}

pub fn set_page_mode(mode: PageMode) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.page_mode = mode;
    }
    save_settings();
}

pub fn get_theme_preference() -> Option<String> {
    SETTINGS.read().ok().and_then(|s| s.theme.clone())
}

pub fn set_theme_preference(name: &str) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.theme = Some(name.to_string());
    }
    save_settings();
}
