use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::{App, ContentPane};
use crate::theme::Theme;

/// The page strip. At rest this is the selected pane; during a slide the
/// neighbouring pane shows through from the side it is coming from.
pub struct PageWidget;

impl PageWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg0)), area);
        if area.width == 0 || area.height == 0 {
            return;
        }

        let position = app.pager().position();
        let first = position.floor().max(0.0) as usize;
        for index in [first, first + 1] {
            let Some(pane) = app.panes().get(index) else {
                continue;
            };
            let shift = ((index as f64 - position) * area.width as f64).round() as i32;
            if shift.unsigned_abs() >= area.width as u32 {
                continue;
            }
            render_pane(frame, area, shift, pane, &app.theme);
        }
    }
}

/// Draw `pane` shifted `shift` columns to the right of `area`
fn render_pane(frame: &mut Frame, area: Rect, shift: i32, pane: &ContentPane, theme: &Theme) {
    let (x, width, skip_columns) = if shift >= 0 {
        let shift = shift as u16;
        (area.x + shift, area.width - shift, 0)
    } else {
        let skip = shift.unsigned_abs() as u16;
        (area.x, area.width - skip, skip)
    };

    // A negative offset is the rubber band: blank rows above the content
    let offset = pane.offset().round();
    let (top_gap, skip_rows) = if offset < 0.0 {
        ((-offset) as u16, 0)
    } else {
        (0, offset as u16)
    };
    if top_gap >= area.height {
        return;
    }

    let target = Rect::new(x, area.y + top_gap, width, area.height - top_gap);
    let lines: Vec<Line> = pane
        .lines()
        .iter()
        .map(|line| Line::raw(line.as_str()))
        .collect();
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg0).bg(theme.bg0))
        .scroll((skip_rows, skip_columns));
    frame.render_widget(paragraph, target);
}
