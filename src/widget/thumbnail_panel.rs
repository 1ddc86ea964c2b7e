use crate::pages::PageSet;
use crate::viewer::ViewerController;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::theme::Base16Palette;

pub enum ThumbnailAction {
    /// Jump to a 1-based page number.
    Navigate(usize),
    Close,
}

/// Guard that routes clicks outside the panel into a close. Installed when
/// the panel opens and removed when it closes, so a toggle never stacks a
/// second handler.
#[derive(Debug, Default)]
pub struct OutsideClickGuard {
    installed: bool,
}

impl OutsideClickGuard {
    pub fn install(&mut self) {
        self.installed = true;
    }

    pub fn uninstall(&mut self) {
        self.installed = false;
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

/// Sidebar listing every page, with the displayed page (or pair) highlighted.
pub struct ThumbnailPanel {
    state: ListState,
    open: bool,
    guard: OutsideClickGuard,
    last_area: Option<Rect>,
    toggle_area: Option<Rect>,
}

impl Default for ThumbnailPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ThumbnailPanel {
    pub fn new() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        ThumbnailPanel {
            state,
            open: false,
            guard: OutsideClickGuard::default(),
            last_area: None,
            toggle_area: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, current_page: usize) {
        self.open = true;
        self.guard.install();
        self.sync_selection(current_page);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.guard.uninstall();
        self.last_area = None;
    }

    pub fn guard_installed(&self) -> bool {
        self.guard.is_installed()
    }

    /// Keeps the list cursor on the page the viewer shows.
    pub fn sync_selection(&mut self, page: usize) {
        self.state.select(Some(page.saturating_sub(1)));
    }

    pub fn selected_page(&self) -> Option<usize> {
        self.state.selected().map(|i| i + 1)
    }

    /// Status bar segment that toggles the panel; set each draw.
    pub fn set_toggle_area(&mut self, area: Rect) {
        self.toggle_area = Some(area);
    }

    pub fn toggle_area_contains(&self, x: u16, y: u16) -> bool {
        self.toggle_area
            .is_some_and(|area| contains(area, x, y))
    }

    /// Whether a column falls inside the rendered panel, used to route
    /// wheel events to the list instead of the page stack.
    pub fn area_contains_column(&self, column: u16) -> bool {
        self.last_area
            .is_some_and(|area| column >= area.x && column < area.x + area.width)
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        pages: &PageSet,
        viewer: &ViewerController,
        palette: &Base16Palette,
        is_focused: bool,
    ) {
        self.last_area = Some(area);

        let (text_color, border_color, bg_color) = palette.get_panel_colors(is_focused);
        let (selection_bg, selection_fg) = palette.get_selection_colors(is_focused);
        let (active_left, active_right) = viewer.displayed_pair();

        let items: Vec<ListItem> = pages
            .iter()
            .enumerate()
            .map(|(i, asset)| {
                let page = i + 1;
                let is_active = page == active_left || Some(page) == active_right;
                let number_style = if is_active {
                    Style::default()
                        .fg(palette.base_0d)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.base_03)
                };
                let name_style = if is_active {
                    Style::default()
                        .fg(palette.base_0d)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(text_color)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{page:>4} "), number_style),
                    Span::styled(asset.file_name.clone(), name_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Pages ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color))
                    .style(Style::default().bg(bg_color)),
            )
            .highlight_style(
                Style::default()
                    .bg(selection_bg)
                    .fg(selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");

        f.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn next(&mut self, page_count: usize) {
        if page_count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= page_count - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self, page_count: usize) {
        if page_count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    page_count - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Resolves a click on a list row to its 1-based page number,
    /// accounting for the scrolled list offset and the block border.
    pub fn handle_mouse_click(&mut self, x: u16, y: u16, page_count: usize) -> Option<usize> {
        let area = self.last_area?;
        if x >= area.x
            && x < area.x + area.width
            && y > area.y
            && y < area.y + area.height.saturating_sub(1)
        {
            let relative_y = y.saturating_sub(area.y).saturating_sub(1);
            let offset = self.state.offset();
            let index = offset + relative_y as usize;
            if index < page_count {
                self.state.select(Some(index));
                return Some(index + 1);
            }
        }
        None
    }

    /// True when the position is outside both the panel and its toggle
    /// control, the condition for the guard to close the panel.
    pub fn is_outside(&self, x: u16, y: u16) -> bool {
        let inside_panel = self.last_area.is_some_and(|area| contains(area, x, y));
        !(inside_panel || self.toggle_area_contains(x, y))
    }

    pub fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        page_count: usize,
    ) -> Option<ThumbnailAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.next(page_count);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.previous(page_count);
                None
            }
            KeyCode::Enter => self.selected_page().map(ThumbnailAction::Navigate),
            KeyCode::Esc => Some(ThumbnailAction::Close),
            _ => None,
        }
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PageMode;

    fn panel_with_area(area: Rect) -> ThumbnailPanel {
        let mut panel = ThumbnailPanel::new();
        panel.open(1);
        panel.last_area = Some(area);
        panel
    }

    #[test]
    fn open_installs_guard_and_close_removes_it() {
        let mut panel = ThumbnailPanel::new();
        assert!(!panel.guard_installed());
        panel.open(3);
        assert!(panel.guard_installed());
        assert_eq!(panel.selected_page(), Some(3));
        panel.close();
        assert!(!panel.guard_installed());
    }

    #[test]
    fn reopening_does_not_stack_guards() {
        let mut panel = ThumbnailPanel::new();
        panel.open(1);
        panel.open(1);
        panel.close();
        // A single close fully uninstalls, regardless of how many opens ran.
        assert!(!panel.guard_installed());
    }

    #[test]
    fn click_on_row_selects_its_page() {
        let mut panel = panel_with_area(Rect::new(0, 0, 20, 12));
        // Row y=1 is the first list row (y=0 is the border).
        assert_eq!(panel.handle_mouse_click(5, 1, 10), Some(1));
        assert_eq!(panel.handle_mouse_click(5, 4, 10), Some(4));
    }

    #[test]
    fn click_below_last_page_is_ignored() {
        let mut panel = panel_with_area(Rect::new(0, 0, 20, 12));
        assert_eq!(panel.handle_mouse_click(5, 8, 3), None);
    }

    #[test]
    fn click_on_border_rows_is_ignored() {
        let mut panel = panel_with_area(Rect::new(0, 0, 20, 12));
        assert_eq!(panel.handle_mouse_click(5, 0, 10), None);
        assert_eq!(panel.handle_mouse_click(5, 11, 10), None);
    }

    #[test]
    fn outside_test_excludes_panel_and_toggle_control() {
        let mut panel = panel_with_area(Rect::new(0, 0, 20, 12));
        panel.set_toggle_area(Rect::new(0, 20, 12, 1));

        assert!(!panel.is_outside(5, 5));
        assert!(!panel.is_outside(3, 20));
        assert!(panel.is_outside(30, 5));
        assert!(panel.is_outside(15, 20));
    }

    #[test]
    fn keyboard_navigation_wraps() {
        let mut panel = ThumbnailPanel::new();
        panel.open(1);
        let key = |code| crossterm::event::KeyEvent::new(code, crossterm::event::KeyModifiers::empty());

        panel.handle_key(key(crossterm::event::KeyCode::Char('k')), 5);
        assert_eq!(panel.selected_page(), Some(5));
        panel.handle_key(key(crossterm::event::KeyCode::Char('j')), 5);
        assert_eq!(panel.selected_page(), Some(1));
    }

    #[test]
    fn enter_navigates_to_selection() {
        let mut panel = ThumbnailPanel::new();
        panel.open(4);
        let key = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Enter,
            crossterm::event::KeyModifiers::empty(),
        );
        match panel.handle_key(key, 10) {
            Some(ThumbnailAction::Navigate(page)) => assert_eq!(page, 4),
            _ => panic!("expected Navigate"),
        }
    }

    #[test]
    fn displayed_pair_drives_active_rows() {
        let mut viewer = ViewerController::new(vec![1.5; 10], 1.0, PageMode::Double);
        viewer.go_to_page(6);
        assert_eq!(viewer.displayed_pair(), (5, Some(6)));
    }
}
