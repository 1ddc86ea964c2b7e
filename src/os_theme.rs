//! Terminal background detection for the initial theme.
//!
//! Terminals expose no direct light/dark query, so detection reads the
//! `COLORFGBG` convention (set by rxvt, konsole and others) with an explicit
//! `QUIRE_THEME` override on top. Detection is split into an environment
//! snapshot and pure functions over it so tests never touch process env.

use crate::theme::ThemeMode;
use std::env;

const THEME_OVERRIDE_VAR: &str = "QUIRE_THEME";
const COLORFGBG_VAR: &str = "COLORFGBG";

/// Snapshot of the environment variables relevant to theme detection.
#[derive(Debug, Clone, Default)]
pub struct TerminalThemeEnv {
    pub theme_override: Option<String>,
    pub colorfgbg: Option<String>,
}

impl TerminalThemeEnv {
    pub fn read() -> Self {
        Self {
            theme_override: env::var(THEME_OVERRIDE_VAR).ok(),
            colorfgbg: env::var(COLORFGBG_VAR).ok(),
        }
    }
}

/// Best-effort light/dark detection. Returns None when the environment gives
/// no usable signal, in which case the caller picks its own default.
pub fn detect(env: &TerminalThemeEnv) -> Option<ThemeMode> {
    if let Some(value) = &env.theme_override {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => return Some(ThemeMode::Dark),
            "light" => return Some(ThemeMode::Light),
            other => {
                log::debug!("Ignoring unrecognized {THEME_OVERRIDE_VAR}={other}");
            }
        }
    }
    detect_from_colorfgbg(env.colorfgbg.as_deref()?)
}

/// Parses the background slot of a `COLORFGBG` value such as "15;0" or
/// "15;default;0". ANSI colors 0-6 and 8 count as dark backgrounds.
fn detect_from_colorfgbg(value: &str) -> Option<ThemeMode> {
    let background = value.rsplit(';').next()?.trim();
    let code: u8 = background.parse().ok()?;
    if code <= 6 || code == 8 {
        Some(ThemeMode::Dark)
    } else {
        Some(ThemeMode::Light)
    }
}
