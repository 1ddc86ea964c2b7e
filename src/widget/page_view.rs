use crate::pages::PageSet;
use crate::theme::Base16Palette;
use crate::viewer::ViewerController;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Layout units per terminal row. Cells are roughly twice as tall as wide,
/// so a row covers twice the units of a column.
pub const UNITS_PER_ROW: f32 = 20.0;
/// Layout units per terminal column.
pub const UNITS_PER_COL: f32 = 10.0;

/// Renders the visible slice of the page stack. Pages are drawn as framed
/// boxes carrying their number and file name; geometry comes straight from
/// the viewer's layout, converted from units to cells here.
pub struct PageView {
    last_area: Rect,
}

impl Default for PageView {
    fn default() -> Self {
        Self::new()
    }
}

impl PageView {
    pub fn new() -> Self {
        Self {
            last_area: Rect::default(),
        }
    }

    pub fn last_area(&self) -> Rect {
        self.last_area
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        viewer: &ViewerController,
        pages: &PageSet,
        palette: &Base16Palette,
        is_focused: bool,
    ) {
        self.last_area = area;

        let (_, border_color, bg_color) = palette.get_panel_colors(is_focused);
        let frame = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));
        let inner = frame.inner(area);
        f.render_widget(frame, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let offset = viewer.scroll_offset();
        let layout = viewer.layout();
        let viewport_units = inner.height as f32 * UNITS_PER_ROW;

        // Center the stack horizontally; content wider than the viewport
        // clips on the right.
        let content_cols = layout.content_width() / UNITS_PER_COL;
        let left_margin = ((inner.width as f32 - content_cols) / 2.0).max(0.0) as i32;

        let current = viewer.current_page();
        for (page, rect) in layout.pages_in_view(offset, viewport_units) {
            let x = inner.x as i32 + left_margin + (rect.left / UNITS_PER_COL).round() as i32;
            let y = inner.y as i32 + ((rect.top - offset) / UNITS_PER_ROW).round() as i32;
            let width = (rect.width / UNITS_PER_COL).round() as i32;
            let height = (rect.height / UNITS_PER_ROW).round().max(2.0) as i32;

            let Some(cell_rect) = clip_rect(inner, x, y, width, height) else {
                continue;
            };
            if cell_rect.width < 2 || cell_rect.height < 2 {
                continue;
            }

            let border = if page == current {
                Style::default().fg(palette.base_0d)
            } else {
                Style::default().fg(palette.base_03)
            };
            let page_block = Block::default()
                .title(format!(" {page} "))
                .borders(Borders::ALL)
                .border_style(border)
                .style(Style::default().bg(palette.base_01));
            let page_inner = page_block.inner(cell_rect);
            f.render_widget(page_block, cell_rect);

            // File name tag through the middle of the page body.
            if page_inner.height >= 1 && page_inner.width >= 4 {
                let label_row = Rect {
                    x: page_inner.x,
                    y: page_inner.y + page_inner.height / 2,
                    width: page_inner.width,
                    height: 1,
                };
                let label = Paragraph::new(pages.file_name(page))
                    .alignment(Alignment::Center)
                    .style(
                        Style::default()
                            .fg(palette.base_03)
                            .add_modifier(Modifier::DIM),
                    );
                f.render_widget(label, label_row);
            }
        }
    }
}

/// Intersects a possibly negative cell-space rectangle with `outer`.
fn clip_rect(outer: Rect, x: i32, y: i32, width: i32, height: i32) -> Option<Rect> {
    let x0 = x.max(outer.x as i32);
    let y0 = y.max(outer.y as i32);
    let x1 = (x + width).min(outer.x as i32 + outer.width as i32);
    let y1 = (y + height).min(outer.y as i32 + outer.height as i32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}
