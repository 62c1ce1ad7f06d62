use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::App;

/// Collapsible header. Drawn at its current visible height, so rows at the
/// bottom disappear first as it collapses.
pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        if area.height == 0 {
            return;
        }
        let theme = &app.theme;
        let progress = app.segmented().collapse_progress();

        let lines = vec![
            Line::from(Span::styled(
                " segscroll",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(" collapsed {:>3.0}%", progress * 100.0),
                Style::default().fg(theme.fg1),
            )),
            Line::from(Span::styled(
                progress_bar(progress, area.width.saturating_sub(2)),
                Style::default().fg(theme.indicator),
            )),
            Line::from(Span::styled(
                " Pull a page past its top to collapse this header",
                Style::default().fg(theme.grey1),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().style(Style::default().bg(theme.header)));
        frame.render_widget(paragraph, area);
    }
}

fn progress_bar(progress: f64, width: u16) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = (width as usize).saturating_sub(filled);
    format!(" {}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), " ░░░░");
        assert_eq!(progress_bar(0.5, 4), " ██░░");
        assert_eq!(progress_bar(2.0, 2), " ██");
    }
}
