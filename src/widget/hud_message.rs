use std::time::{Duration, Instant};

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Base16Palette;

/// How long the zoom readout stays on screen after a change.
pub const ZOOM_FLASH_DURATION: Duration = Duration::from_millis(1200);

/// Short-lived message flashed over the page stack.
#[derive(Debug, Clone)]
pub struct HudMessage {
    pub message: String,
    pub expires_at: Instant,
}

impl HudMessage {
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + duration,
        }
    }

    /// The zoom percentage readout shown whenever the factor changes.
    pub fn zoom_flash(percent: u16) -> Self {
        Self::new(format!("Zoom {percent}%"), ZOOM_FLASH_DURATION)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn styled_line(&self, palette: &Base16Palette) -> Line<'static> {
        let style = Style::default()
            .fg(palette.base_06)
            .bg(palette.base_02)
            .add_modifier(Modifier::BOLD);

        Line::from(vec![Span::styled(format!(" {} ", self.message), style)]).centered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn zoom_flash_formats_percentage() {
        let hud = HudMessage::zoom_flash(110);
        assert_eq!(hud.message, "Zoom 110%");
        assert!(!hud.is_expired());
    }

    #[test]
    fn message_expires_after_duration() {
        let hud = HudMessage::new("Zoom 50%", Duration::from_millis(20));
        assert!(!hud.is_expired());
        sleep(Duration::from_millis(30));
        assert!(hud.is_expired());
    }
}
