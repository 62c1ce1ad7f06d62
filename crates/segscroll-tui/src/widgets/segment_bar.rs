use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

/// Segment titles with the selected indicator underneath
pub struct SegmentBarWidget;

impl SegmentBarWidget {
    /// Split `width` columns starting at `x` into equal tabs; the last one
    /// takes the remainder.
    pub fn layout(count: usize, x: u16, width: u16) -> Vec<(u16, u16)> {
        if count == 0 {
            return Vec::new();
        }
        let count = count.min(width.max(1) as usize) as u16;
        let base = width / count;
        (0..count)
            .map(|i| {
                let start = x + i * base;
                let end = if i + 1 == count { x + width } else { start + base };
                (start, end)
            })
            .collect()
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        app.segment_bar_area = area;
        if area.height == 0 {
            app.tab_bar_mut().set_regions(Vec::new());
            return;
        }

        let regions = Self::layout(app.segmented().segment_count(), area.x, area.width);
        app.tab_bar_mut().set_regions(regions.clone());

        let theme = &app.theme;
        let segment = &app.config.segment;
        let selected = app.tab_bar().selected();

        let mut block = Block::default().style(Style::default().bg(theme.bg1));
        if segment.shadow {
            block = block
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.grey0));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let mut title_spans = Vec::with_capacity(regions.len());
        let mut indicator_spans = Vec::with_capacity(regions.len());
        for (index, ((start, end), title)) in regions
            .iter()
            .zip(app.segmented().titles())
            .enumerate()
        {
            let width = (end - start) as usize;
            let mut style = if index == selected {
                Style::default().fg(theme.selected_title)
            } else {
                Style::default().fg(theme.title)
            };
            if segment.title_bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            title_spans.push(Span::styled(center(title, width), style));

            let mark = if index == selected { "━" } else { " " };
            indicator_spans.push(Span::styled(
                mark.repeat(width),
                Style::default().fg(theme.indicator),
            ));
        }

        let indicator_rows = segment
            .selected_indicator_height
            .min(inner.height.saturating_sub(1));
        let mut lines = vec![Line::from(title_spans)];
        let filler = inner.height.saturating_sub(1 + indicator_rows);
        lines.extend((0..filler).map(|_| Line::default()));
        lines.extend((0..indicator_rows).map(|_| Line::from(indicator_spans.clone())));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Center `title` in `width` columns, truncating with an ellipsis
fn center(title: &str, width: usize) -> String {
    let title = truncate(title, width);
    let used = title.width();
    let left = width.saturating_sub(used) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{}{}", " ".repeat(left), title, " ".repeat(right))
}

fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_evenly() {
        assert_eq!(
            SegmentBarWidget::layout(3, 0, 31),
            vec![(0, 10), (10, 20), (20, 31)]
        );
        assert_eq!(SegmentBarWidget::layout(2, 5, 10), vec![(5, 10), (10, 15)]);
        assert!(SegmentBarWidget::layout(0, 0, 10).is_empty());
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語", 4), "日…");
    }
}
