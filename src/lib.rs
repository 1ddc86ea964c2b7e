// Export modules for use in tests
pub mod debounce;
pub mod download;
pub mod event_source;
pub mod geometry;
pub mod main_app;
pub mod notification;
pub mod os_theme;
pub mod pages;
pub mod panic_handler;
pub mod settings;
pub mod theme;
pub mod viewer;
pub mod widget;
pub mod zoom;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use main_app::{App, AppAction, FocusedPanel, run_app_with_event_source};
