pub mod download_overlay;
pub mod hud_message;
pub mod page_view;
pub mod thumbnail_panel;
