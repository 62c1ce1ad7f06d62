use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let mode_str = match app.mode {
            Mode::Normal => "NORMAL",
            Mode::Help => "HELP",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", mode_str, msg)
        } else {
            let index = app.active_index();
            let title = app.segmented().titles().get(index).map(String::as_str).unwrap_or("");
            format!(
                " {} | {}/{} {} | header {}",
                mode_str,
                index + 1,
                app.panes().len(),
                title,
                app.header_rows(),
            )
        };

        let stats = app.stats();
        let offsets = format!(
            " parent {:.0} child {:.0} | ev {} int {} ign {} drop {} ",
            app.segmented().parent().offset().y,
            app.active_pane().offset(),
            stats.events,
            stats.interventions,
            stats.ignored,
            stats.reentrant_dropped,
        );

        let help_hint = " q:quit j/k:scroll h/l:swipe ?:help ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.chars().count() + offsets.len() + help_hint.len());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(offsets, Style::default().fg(theme.info).bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey1).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
