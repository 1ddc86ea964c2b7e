use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, warn};
use ratatui::{
    Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::debounce::DeferredTask;
use crate::download::DownloadManager;
use crate::event_source::EventSource;
use crate::notification::NotificationManager;
use crate::os_theme;
use crate::pages::PageSet;
use crate::settings;
use crate::theme::{self, current_theme};
use crate::viewer::ViewerController;
use crate::widget::download_overlay;
use crate::widget::hud_message::HudMessage;
use crate::widget::page_view::{PageView, UNITS_PER_ROW};
use crate::widget::thumbnail_panel::{ThumbnailAction, ThumbnailPanel};

/// Scroll units applied per wheel notch or j/k press.
const SCROLL_STEP_UNITS: f32 = 40.0;

/// Quiet period after the last scroll before the current page is
/// recomputed from the settled position.
const SCROLL_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// How often the terminal background is re-checked while the theme
/// follows the environment.
const OS_THEME_PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Longest page number the go-to prompt accepts.
const PAGE_INPUT_MAX_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPanel {
    Viewer,
    Thumbnails,
}

pub struct App {
    pages: PageSet,
    pub viewer: ViewerController,
    page_view: PageView,
    pub thumbnails: ThumbnailPanel,
    pub downloads: DownloadManager,
    pub notifications: NotificationManager,
    pub hud_message: Option<HudMessage>,
    pub focused_panel: FocusedPanel,
    scroll_settle: DeferredTask,
    page_input: Option<String>,
    last_os_probe: Instant,
    test_mode: bool,
}

impl App {
    pub fn new(pages: PageSet, downloads: DownloadManager) -> App {
        let zoom = settings::get_zoom_level();
        let mode = settings::get_page_mode();
        let viewer = ViewerController::new(pages.aspects(), zoom, mode);
        App {
            pages,
            viewer,
            page_view: PageView::new(),
            thumbnails: ThumbnailPanel::new(),
            downloads,
            notifications: NotificationManager::new(),
            hud_message: None,
            focused_panel: FocusedPanel::Viewer,
            scroll_settle: DeferredTask::new(SCROLL_SETTLE_DELAY),
            page_input: None,
            last_os_probe: Instant::now(),
            test_mode: false,
        }
    }

    /// Like [`App::new`] but ignores persisted settings and never writes
    /// them back, so tests cannot clobber a real config file.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_tests(pages: PageSet, downloads: DownloadManager) -> App {
        use crate::settings::PageMode;

        let viewer = ViewerController::new(pages.aspects(), 1.0, PageMode::Single);
        App {
            pages,
            viewer,
            page_view: PageView::new(),
            thumbnails: ThumbnailPanel::new(),
            downloads,
            notifications: NotificationManager::new(),
            hud_message: None,
            focused_panel: FocusedPanel::Viewer,
            scroll_settle: DeferredTask::new(SCROLL_SETTLE_DELAY),
            page_input: None,
            last_os_probe: Instant::now(),
            test_mode: true,
        }
    }

    pub fn pages(&self) -> &PageSet {
        &self.pages
    }

    pub fn is_page_input_active(&self) -> bool {
        self.page_input.is_some()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        use crossterm::event::KeyCode;

        if self.page_input.is_some() {
            self.handle_page_input_key(key);
            return None;
        }

        if self.focused_panel == FocusedPanel::Thumbnails {
            match self.thumbnails.handle_key(key, self.pages.count()) {
                Some(ThumbnailAction::Navigate(page)) => {
                    self.viewer.go_to_page(page);
                    return None;
                }
                Some(ThumbnailAction::Close) => {
                    self.close_thumbnails();
                    return None;
                }
                None => {
                    // The list consumed navigation keys; anything else
                    // falls through to the global bindings.
                    if matches!(
                        key.code,
                        KeyCode::Char('j')
                            | KeyCode::Char('k')
                            | KeyCode::Down
                            | KeyCode::Up
                            | KeyCode::Enter
                            | KeyCode::Esc
                    ) {
                        return None;
                    }
                }
            }
        }

        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_pages(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_pages(-1),
            KeyCode::Char('l') | KeyCode::Right => {
                self.viewer.next_page();
                self.thumbnails.sync_selection(self.viewer.current_page());
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.viewer.previous_page();
                self.thumbnails.sync_selection(self.viewer.current_page());
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom_out(),
            KeyCode::Char('0') => self.zoom_reset(),
            KeyCode::Char('d') => self.toggle_page_mode(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('s') => {
                self.downloads.start();
            }
            KeyCode::Char(':') => self.page_input = Some(String::new()),
            KeyCode::Tab => self.toggle_thumbnails(),
            KeyCode::Esc => {
                self.notifications.dismiss_current();
            }
            _ => {}
        }
        None
    }

    fn handle_page_input_key(&mut self, key: KeyEvent) {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(input) = self.page_input.as_mut()
                    && input.len() < PAGE_INPUT_MAX_LEN
                {
                    input.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.page_input.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Enter => {
                // An empty or unparseable buffer cancels the prompt.
                if let Some(committed) = self.page_input.take()
                    && let Ok(page) = committed.parse::<usize>()
                {
                    self.viewer.go_to_page(page);
                    self.thumbnails.sync_selection(self.viewer.current_page());
                }
            }
            KeyCode::Esc => self.page_input = None,
            _ => {}
        }
    }

    fn zoom_in(&mut self) {
        let factor = self.viewer.zoom_in();
        self.after_zoom_change(factor);
    }

    fn zoom_out(&mut self) {
        let factor = self.viewer.zoom_out();
        self.after_zoom_change(factor);
    }

    fn zoom_reset(&mut self) {
        let factor = self.viewer.zoom_reset();
        self.after_zoom_change(factor);
    }

    fn after_zoom_change(&mut self, factor: f32) {
        if !self.test_mode {
            settings::set_zoom_level(factor);
        }
        self.hud_message = Some(HudMessage::zoom_flash(self.viewer.zoom().percent()));
    }

    fn toggle_page_mode(&mut self) {
        let mode = self.viewer.toggle_page_mode();
        if !self.test_mode {
            settings::set_page_mode(mode);
        }
        self.thumbnails.sync_selection(self.viewer.current_page());
    }

    fn toggle_theme(&mut self) {
        let mode = theme::toggle_theme();
        if !self.test_mode {
            settings::set_theme_preference(mode.name());
        }
        self.notifications.info(format!("Theme: {}", mode.name()));
    }

    fn toggle_thumbnails(&mut self) {
        if self.thumbnails.is_open() {
            self.close_thumbnails();
        } else {
            self.thumbnails.open(self.viewer.current_page());
            self.focused_panel = FocusedPanel::Thumbnails;
        }
    }

    fn close_thumbnails(&mut self) {
        self.thumbnails.close();
        self.focused_panel = FocusedPanel::Viewer;
    }

    pub fn handle_and_drain_mouse_events(
        &mut self,
        initial_mouse_event: MouseEvent,
        event_source: Option<&mut dyn EventSource>,
    ) {
        let is_scroll_event = matches!(
            initial_mouse_event.kind,
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp
        );

        if !is_scroll_event {
            self.handle_non_scroll_mouse_event(initial_mouse_event);
            return;
        }

        // Ctrl-modified wheel notches zoom one step each and are never
        // batched.
        if initial_mouse_event.modifiers.contains(KeyModifiers::CONTROL) {
            match initial_mouse_event.kind {
                MouseEventKind::ScrollUp => self.zoom_in(),
                MouseEventKind::ScrollDown => self.zoom_out(),
                _ => unreachable!(),
            }
            return;
        }

        // for testing: event_source is None -> don't need to drain events
        let Some(event_source) = event_source else {
            match initial_mouse_event.kind {
                MouseEventKind::ScrollDown => self.apply_scroll(1, initial_mouse_event.column),
                MouseEventKind::ScrollUp => self.apply_scroll(-1, initial_mouse_event.column),
                _ => unreachable!(),
            }
            return;
        };

        // Batching logic for scroll events
        let mut scroll_down_count = 0;
        let mut scroll_up_count = 0;

        let initial_column = initial_mouse_event.column;

        // Count the initial event
        match initial_mouse_event.kind {
            MouseEventKind::ScrollDown => {
                scroll_down_count += 1;
            }
            MouseEventKind::ScrollUp => {
                scroll_up_count += 1;
            }
            _ => unreachable!(), // We already checked this is a scroll event
        }

        // Drain additional mouse scroll events that are queued up
        let drain_timeout = Duration::from_millis(0); // Non-blocking poll
        let max_drain_iterations = 50; // Safety limit to prevent infinite loops
        let mut drain_count = 0;
        let batch_start_time = std::time::Instant::now();

        while drain_count < max_drain_iterations && event_source.poll(drain_timeout).unwrap_or(false)
        {
            drain_count += 1;

            // Timeout circuit breaker - prevent infinite loops or excessive processing
            if batch_start_time.elapsed() > std::time::Duration::from_millis(100) {
                break;
            }

            if drain_count > 20 {
                // Safety check
                warn!(
                    "Warning: draining many events ({drain_count}), may indicate event accumulation issue"
                );
            }

            match event_source.read() {
                Ok(Event::Mouse(mouse_event)) => match mouse_event.kind {
                    MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {
                        //ignore
                        break;
                    }
                    MouseEventKind::ScrollUp
                        if mouse_event.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        self.zoom_in();
                        break;
                    }
                    MouseEventKind::ScrollDown
                        if mouse_event.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        self.zoom_out();
                        break;
                    }
                    MouseEventKind::ScrollDown => scroll_down_count += 1,
                    MouseEventKind::ScrollUp => scroll_up_count += 1,
                    _ => {
                        self.handle_non_scroll_mouse_event(mouse_event);
                        break;
                    }
                },
                Ok(_) => {
                    // Non-mouse event, stop draining.
                    break;
                }
                Err(e) => {
                    warn!("Error reading event during batching: {e:?}");
                    break;
                }
            }
        }

        let net_scroll = scroll_down_count - scroll_up_count;

        self.apply_scroll(net_scroll, initial_column);
    }

    /// Handle non-scroll mouse events (clicks).
    pub fn handle_non_scroll_mouse_event(&mut self, mouse_event: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
            let (x, y) = (mouse_event.column, mouse_event.row);

            if self.thumbnails.toggle_area_contains(x, y) {
                self.toggle_thumbnails();
                return;
            }

            if self.thumbnails.is_open() {
                if let Some(page) = self.thumbnails.handle_mouse_click(x, y, self.pages.count()) {
                    self.viewer.go_to_page(page);
                    return;
                }
                if self.thumbnails.guard_installed() && self.thumbnails.is_outside(x, y) {
                    self.close_thumbnails();
                }
            }
        }
    }

    /// Apply a net scroll amount, routed by the column the wheel event
    /// originated from.
    fn apply_scroll(&mut self, net_scroll: i32, column: u16) {
        if net_scroll == 0 {
            return;
        }

        if self.thumbnails.is_open() && self.thumbnails.area_contains_column(column) {
            for _ in 0..net_scroll.unsigned_abs() {
                if net_scroll > 0 {
                    self.thumbnails.next(self.pages.count());
                } else {
                    self.thumbnails.previous(self.pages.count());
                }
            }
            return;
        }

        self.scroll_pages(net_scroll);
    }

    fn scroll_pages(&mut self, notches: i32) {
        if notches == 0 {
            return;
        }
        self.viewer.scroll_by(notches as f32 * SCROLL_STEP_UNITS);
        self.scroll_settle.arm();
    }

    /// Advance animations and timers. Returns true when something
    /// visible changed and the screen should be redrawn.
    pub fn on_tick(&mut self) -> bool {
        let mut changed = false;

        if self.viewer.on_tick() {
            changed = true;
        }
        if self.viewer.is_scroll_animating() {
            // Keep deferring the settled-position recompute until the
            // motion stops.
            self.scroll_settle.arm();
        }
        if self.scroll_settle.fire_if_due() {
            let page = self.viewer.sync_settled_scroll();
            self.thumbnails.sync_selection(page);
            changed = true;
        }

        if self.downloads.on_tick(&mut self.notifications) {
            changed = true;
        }
        if self.notifications.update() {
            changed = true;
        }
        if self.hud_message.as_ref().is_some_and(HudMessage::is_expired) {
            self.hud_message = None;
            changed = true;
        }
        if self.maybe_probe_os_theme() {
            changed = true;
        }

        changed
    }

    /// Re-check the terminal background at a slow cadence so the theme
    /// tracks the environment until the user picks one explicitly.
    fn maybe_probe_os_theme(&mut self) -> bool {
        if self.test_mode || !theme::follows_os_preference() {
            return false;
        }
        if self.last_os_probe.elapsed() < OS_THEME_PROBE_INTERVAL {
            return false;
        }
        self.last_os_probe = Instant::now();

        if settings::get_theme_preference().is_some() {
            return false;
        }
        let Some(detected) = os_theme::detect(&os_theme::TerminalThemeEnv::read()) else {
            return false;
        };
        if detected != theme::current_theme_mode() {
            theme::set_theme_mode(detected);
            debug!("Terminal background changed, switching to {} theme", detected.name());
            return true;
        }
        false
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame) {
        let palette = current_theme();

        let background_block = Block::default().style(Style::default().bg(palette.base_00));
        f.render_widget(background_block, f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = if self.thumbnails.is_open() {
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
                .split(chunks[0]);
            self.thumbnails.render(
                f,
                main_chunks[0],
                &self.pages,
                &self.viewer,
                palette,
                self.focused_panel == FocusedPanel::Thumbnails,
            );
            main_chunks[1]
        } else {
            chunks[0]
        };

        // The viewer measures scroll in layout units; convert the inner
        // text rows before rendering so clamps use the real viewport.
        let inner_rows = content_area.height.saturating_sub(2);
        self.viewer.set_viewport_height(inner_rows as f32 * UNITS_PER_ROW);

        self.page_view.render(
            f,
            content_area,
            &self.viewer,
            &self.pages,
            palette,
            self.focused_panel == FocusedPanel::Viewer,
        );

        if let Some(hud) = &self.hud_message
            && content_area.width > 2
            && content_area.height > 2
        {
            let hud_area = Rect {
                x: content_area.x + 1,
                y: content_area.y + 1,
                width: content_area.width - 2,
                height: 1,
            };
            f.render_widget(Paragraph::new(hud.styled_line(palette)), hud_area);
        }

        self.render_status_bar(f, chunks[1]);

        if let Some(overlay) = self.downloads.overlay() {
            download_overlay::render(f, f.area(), overlay, palette);
        }
    }

    fn render_status_bar(&mut self, f: &mut ratatui::Frame, area: Rect) {
        let palette = current_theme();
        let (_, border_color, _) = palette.get_panel_colors(false);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(palette.base_00));

        let inner_area = block.inner(area);
        f.render_widget(block, area);

        if inner_area.width == 0 || inner_area.height == 0 {
            self.thumbnails.set_toggle_area(Rect::default());
            return;
        }

        let text_color = palette.base_03;

        // Clickable panel toggle pinned to the left edge.
        let toggle_label = "[Tab: Pages]";
        let toggle_width = (toggle_label.len() as u16).min(inner_area.width);
        let toggle_area = Rect {
            x: inner_area.x,
            y: inner_area.y,
            width: toggle_width,
            height: 1,
        };
        self.thumbnails.set_toggle_area(toggle_area);
        let toggle = Paragraph::new(Line::from(vec![
            Span::raw("["),
            Span::styled(
                "Tab: Pages",
                Style::default()
                    .fg(text_color)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Span::raw("]"),
        ]))
        .style(Style::default().fg(text_color).bg(palette.base_00));
        f.render_widget(toggle, toggle_area);

        let left_content = if let Some(notification) = self.notifications.current() {
            format!(
                "[{}] {} | ESC: Dismiss",
                notification.level.label(),
                notification.message
            )
        } else if let Some(input) = &self.page_input {
            format!("Go to page: {input}█  Enter: Jump | ESC: Cancel")
        } else {
            let help_text = match self.focused_panel {
                FocusedPanel::Viewer => {
                    "j/k: Scroll | h/l: Page | +/-/0: Zoom | d: Layout | t: Theme | s: Save | :: Go to | q: Quit"
                }
                FocusedPanel::Thumbnails => "j/k: Navigate | Enter: Open page | ESC: Close | q: Quit",
            };
            help_text.to_string()
        };
        let message_area = Rect {
            x: inner_area.x + toggle_width.saturating_add(1).min(inner_area.width),
            y: inner_area.y,
            width: inner_area.width.saturating_sub(toggle_width + 1),
            height: inner_area.height,
        };
        let left_para = Paragraph::new(left_content)
            .style(Style::default().fg(text_color).bg(palette.base_00));
        f.render_widget(left_para, message_area);

        let right_content = format!(
            "{}/{} | {}% | {} | {}",
            self.viewer.current_page(),
            self.viewer.page_count(),
            self.viewer.zoom().percent(),
            self.viewer.page_mode().as_str(),
            theme::current_theme_mode().glyph(),
        );
        let right_para = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(Style::default().fg(text_color).bg(palette.base_00));
        f.render_widget(right_para, inner_area);
    }

    pub fn handle_resize(&mut self) {
        debug!("Terminal resized, recomputing page layout");
        self.viewer.refresh_layout();
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50); // Faster tick rate for smoother animation
    let mut last_tick = std::time::Instant::now();
    let mut first_render = true; // Ensure we always render at least once on startup
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            match event {
                Event::Mouse(mouse_event) => {
                    match mouse_event.kind {
                        MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {
                            // Completely ignore horizontal scroll events to prevent flooding
                        }
                        _ => {
                            app.handle_and_drain_mouse_events(mouse_event, Some(event_source));
                        }
                    }
                }
                Event::Key(key) => {
                    if app.handle_key_event(key) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Resize(_cols, _rows) => {
                    app.handle_resize();
                }
                _ => {}
            }

            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0;

        if first_render {
            needs_redraw = true;
            first_render = false;
        }

        if last_tick.elapsed() >= tick_rate {
            if app.on_tick() {
                needs_redraw = true;
            }
            last_tick = std::time::Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout);
        }

        if should_quit {
            return Ok(());
        }
    }
}
