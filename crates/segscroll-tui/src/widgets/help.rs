use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use segscroll_core::config::KeymapConfig;

use crate::theme::Theme;

/// Key help popup
pub struct HelpWidget;

impl HelpWidget {
    pub fn render(frame: &mut Frame, keymap: &KeymapConfig, theme: &Theme) {
        let entries = Self::entries(keymap);
        let area = frame.area();

        let popup_width = 46u16.min(area.width.saturating_sub(4));
        let popup_height = (entries.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg1));

        let mut lines: Vec<Line> = entries
            .into_iter()
            .map(|(keys, description)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<12}", keys),
                        Style::default()
                            .fg(theme.selected_title)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(description, Style::default().fg(theme.fg0)),
                ])
            })
            .collect();
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                "press any key to close",
                Style::default().fg(theme.grey1),
            ))
            .alignment(Alignment::Center),
        );

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    fn entries(keymap: &KeymapConfig) -> Vec<(String, &'static str)> {
        vec![
            (format!("{} {}", keymap.scroll_down, keymap.scroll_up), "scroll page down / up"),
            (
                format!("{} {}", keymap.scroll_half_down, keymap.scroll_half_up),
                "half page down / up",
            ),
            (
                format!("{} {}", keymap.jump_to_top, keymap.jump_to_bottom),
                "top / bottom of page",
            ),
            (
                format!("{} {}", keymap.next_segment, keymap.prev_segment),
                "tap next / previous tab",
            ),
            (format!("{} {}", keymap.swipe_next, keymap.swipe_prev), "swipe next / previous"),
            ("1-9".to_string(), "tap tab by number"),
            (keymap.quit.clone(), "quit"),
        ]
    }
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
