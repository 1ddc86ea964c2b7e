use crate::download::ProgressOverlay;
use crate::theme::Base16Palette;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};

/// Modal progress popup shown while the document download runs. Dims the
/// whole screen and draws a gauge plus a one-line caption in the middle.
pub fn render(f: &mut Frame, area: Rect, overlay: &ProgressOverlay, palette: &Base16Palette) {
    let dim = Block::default().style(
        Style::default()
            .bg(palette.base_00)
            .add_modifier(Modifier::DIM),
    );
    f.render_widget(dim, area);

    let popup = centered_box(50, 6, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Save Document ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.base_0c))
        .style(Style::default().bg(palette.base_00));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let gauge_area = Rect {
        x: rows[1].x + 1,
        y: rows[1].y,
        width: rows[1].width.saturating_sub(2),
        height: 1,
    };
    let fill = if overlay.is_complete() {
        palette.base_0b
    } else {
        palette.base_0c
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(fill).bg(palette.base_02))
        .percent(overlay.percent())
        .label(format!("{}%", overlay.percent()));
    f.render_widget(gauge, gauge_area);

    let caption = Paragraph::new(overlay.caption())
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.base_05));
    f.render_widget(caption, rows[2]);
}

/// Horizontally percentage-sized, vertically fixed-height centered rect.
fn centered_box(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let top_margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top_margin),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
