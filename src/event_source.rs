use anyhow::Result;
pub use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real keyboard/mouse event source using crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

// Bare event constructors, for tests that feed a handler directly
// instead of going through an event source.

pub fn key_event(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

pub fn char_key(c: char) -> KeyEvent {
    key_event(KeyCode::Char(c))
}

pub fn ctrl_char_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn mouse_event(
    kind: MouseEventKind,
    column: u16,
    row: u16,
    modifiers: KeyModifiers,
) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers,
    }
}

pub fn scroll_down_at(column: u16, row: u16) -> MouseEvent {
    mouse_event(MouseEventKind::ScrollDown, column, row, KeyModifiers::empty())
}

pub fn scroll_up_at(column: u16, row: u16) -> MouseEvent {
    mouse_event(MouseEventKind::ScrollUp, column, row, KeyModifiers::empty())
}

/// Ctrl+wheel, which zooms instead of scrolling
pub fn ctrl_scroll_at(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    mouse_event(kind, column, row, KeyModifiers::CONTROL)
}

pub fn left_click_at(column: u16, row: u16) -> MouseEvent {
    mouse_event(
        MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        KeyModifiers::empty(),
    )
}

/// Simulated event source for testing
pub struct SimulatedEventSource {
    pub(crate) events: Vec<Event>,
    current_index: usize,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            current_index: 0,
        }
    }

    /// Helper method to create a key event
    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    /// Helper method to create a simple character key event
    pub fn char_key(c: char) -> Event {
        Event::Key(char_key(c))
    }

    /// Helper method to create a Ctrl+char key event
    pub fn ctrl_char_key(c: char) -> Event {
        Event::Key(ctrl_char_key(c))
    }

    pub fn scroll_down_at(column: u16, row: u16) -> Event {
        Event::Mouse(scroll_down_at(column, row))
    }

    pub fn scroll_up_at(column: u16, row: u16) -> Event {
        Event::Mouse(scroll_up_at(column, row))
    }

    /// Ctrl+wheel, which zooms instead of scrolling
    pub fn ctrl_scroll_at(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(ctrl_scroll_at(kind, column, row))
    }

    pub fn left_click_at(column: u16, row: u16) -> Event {
        Event::Mouse(left_click_at(column, row))
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.current_index < self.events.len())
    }

    fn read(&mut self) -> Result<Event> {
        if self.current_index < self.events.len() {
            let event = self.events[self.current_index].clone();
            self.current_index += 1;
            Ok(event)
        } else {
            // Return a quit event if we've exhausted all events
            Ok(SimulatedEventSource::char_key('q'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_source_replays_events_in_order() {
        let events = vec![
            SimulatedEventSource::char_key('j'),
            SimulatedEventSource::char_key('t'),
            SimulatedEventSource::ctrl_char_key('0'),
        ];

        let mut source = SimulatedEventSource::new(events);

        assert!(source.poll(Duration::from_millis(0)).unwrap());

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('j'));
            assert!(key.modifiers.is_empty());
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('t'));
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('0'));
            assert!(key.modifiers.contains(KeyModifiers::CONTROL));
        }

        // No more events
        assert!(!source.poll(Duration::from_millis(0)).unwrap());
    }

    #[test]
    fn mouse_helpers_carry_position_and_modifiers() {
        let mouse = scroll_down_at(12, 7);
        assert_eq!(mouse.kind, MouseEventKind::ScrollDown);
        assert_eq!((mouse.column, mouse.row), (12, 7));
        assert!(mouse.modifiers.is_empty());

        let mouse = ctrl_scroll_at(MouseEventKind::ScrollUp, 3, 4);
        assert!(mouse.modifiers.contains(KeyModifiers::CONTROL));

        let mouse = left_click_at(5, 6);
        assert_eq!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
    }
}
