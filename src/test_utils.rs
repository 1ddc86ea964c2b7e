pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, KeyEvent, KeyModifiers, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Add a Ctrl+character key press
        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        /// Type a run of characters, e.g. a page number
        pub fn type_chars(mut self, text: &str) -> Self {
            for c in text.chars() {
                self.events.push(SimulatedEventSource::char_key(c));
            }
            self
        }

        /// Press Enter
        pub fn press_enter(mut self) -> Self {
            self.events
                .push(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::empty())));
            self
        }

        /// Press Tab
        pub fn press_tab(mut self) -> Self {
            self.events
                .push(Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::empty())));
            self
        }

        /// Press Escape
        pub fn press_esc(mut self) -> Self {
            self.events
                .push(Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::empty())));
            self
        }

        /// Navigate down n times (press 'j' n times)
        pub fn navigate_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        /// Navigate up n times (press 'k' n times)
        pub fn navigate_up(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('k'));
            }
            self
        }

        /// Navigate to next page (press 'l')
        pub fn next_page(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('l'));
            self
        }

        /// Navigate to previous page (press 'h')
        pub fn prev_page(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('h'));
            self
        }

        /// Left mouse click at a cell position
        pub fn click_at(mut self, column: u16, row: u16) -> Self {
            self.events
                .push(SimulatedEventSource::left_click_at(column, row));
            self
        }

        /// Wheel scroll down at a cell position, n notches
        pub fn scroll_down_at(mut self, column: u16, row: u16, times: usize) -> Self {
            for _ in 0..times {
                self.events
                    .push(SimulatedEventSource::scroll_down_at(column, row));
            }
            self
        }

        /// Wheel scroll up at a cell position, n notches
        pub fn scroll_up_at(mut self, column: u16, row: u16, times: usize) -> Self {
            for _ in 0..times {
                self.events
                    .push(SimulatedEventSource::scroll_up_at(column, row));
            }
            self
        }

        /// Ctrl+wheel up, which zooms in
        pub fn ctrl_scroll_up_at(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::ctrl_scroll_at(
                crate::event_source::MouseEventKind::ScrollUp,
                column,
                row,
            ));
            self
        }

        /// Ctrl+wheel down, which zooms out
        pub fn ctrl_scroll_down_at(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::ctrl_scroll_at(
                crate::event_source::MouseEventKind::ScrollDown,
                column,
                row,
            ));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    line.push_str(cell.symbol());
                }
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }
}
