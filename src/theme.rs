use crate::os_theme;
use crate::settings;
use log::debug;
use ratatui::style::Color;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// Color palette structure
#[allow(dead_code)]
#[derive(Clone)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThemeMode {
    Light = 0,
    Dark = 1,
}

impl ThemeMode {
    /// Name used in the stored preference.
    pub fn name(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Status bar indicator for the active mode.
    pub fn glyph(&self) -> &'static str {
        match self {
            ThemeMode::Light => "☀",
            ThemeMode::Dark => "☾",
        }
    }

    pub fn from_name(name: &str) -> Option<ThemeMode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn opposite(&self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    fn from_index(idx: usize) -> Self {
        match idx {
            1 => ThemeMode::Dark,
            _ => ThemeMode::Light,
        }
    }
}

static CURRENT_THEME_INDEX: AtomicUsize = AtomicUsize::new(0);
// Set when --theme pins the mode for the session; blocks OS re-probing.
static THEME_FORCED: AtomicBool = AtomicBool::new(false);

pub fn current_theme_mode() -> ThemeMode {
    ThemeMode::from_index(CURRENT_THEME_INDEX.load(Ordering::Relaxed))
}

pub fn set_theme_mode(mode: ThemeMode) {
    CURRENT_THEME_INDEX.store(mode as usize, Ordering::Relaxed);
}

pub fn current_theme() -> &'static Base16Palette {
    match current_theme_mode() {
        ThemeMode::Light => &ONE_LIGHT_PALETTE,
        ThemeMode::Dark => &OCEANIC_NEXT_PALETTE,
    }
}

/// Flips the active mode and returns the new one. The caller persists the
/// choice so it survives restarts.
pub fn toggle_theme() -> ThemeMode {
    let next = current_theme_mode().opposite();
    set_theme_mode(next);
    debug!("Theme toggled to {}", next.name());
    next
}

/// Pins the mode for this session, ignoring stored and OS preferences.
pub fn force_theme_mode(mode: ThemeMode) {
    THEME_FORCED.store(true, Ordering::Relaxed);
    set_theme_mode(mode);
}

pub fn follows_os_preference() -> bool {
    !THEME_FORCED.load(Ordering::Relaxed)
}

/// Startup resolution: stored preference, then terminal background
/// detection, then light.
pub fn init_from_environment() {
    let stored = settings::get_theme_preference().and_then(|name| ThemeMode::from_name(&name));
    let os = os_theme::detect(&os_theme::TerminalThemeEnv::read());
    let resolved = resolve_initial(stored, os);
    set_theme_mode(resolved);
    debug!("Initial theme resolved to {}", resolved.name());
}

fn resolve_initial(stored: Option<ThemeMode>, os: Option<ThemeMode>) -> ThemeMode {
    stored.or(os).unwrap_or(ThemeMode::Light)
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    )
}

// Oceanic Next theme
static OCEANIC_NEXT_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_09: rgb(0xF99157),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0c: rgb(0x5FB3B3),
    base_0d: rgb(0x6699CC),
    base_0e: rgb(0xC594C5),
    base_0f: rgb(0xAB7967),
};

// One Light theme
static ONE_LIGHT_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0xFAFAFA),
    base_01: rgb(0xF0F0F1),
    base_02: rgb(0xE5E5E6),
    base_03: rgb(0xA0A1A7),
    base_04: rgb(0x696C77),
    base_05: rgb(0x383A42),
    base_06: rgb(0x202227),
    base_07: rgb(0x090A0B),
    base_08: rgb(0xCA1243),
    base_09: rgb(0xD75F00),
    base_0a: rgb(0xC18401),
    base_0b: rgb(0x50A14F),
    base_0c: rgb(0x0184BC),
    base_0d: rgb(0x4078F2),
    base_0e: rgb(0xA626A4),
    base_0f: rgb(0x986801),
};

// Color utilities for focus states
impl Base16Palette {
    // Get colors for focused/unfocused panels
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color, Color) {
        if is_focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_03, self.base_03, self.base_00)
        }
    }

    // Get selection colors for focused/unfocused states
    pub fn get_selection_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_02, self.base_06)
        } else {
            (self.base_02, self.base_03)
        }
    }
}
