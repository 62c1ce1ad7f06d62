use std::io;
use std::sync::Arc;

use anyhow::{bail, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::info;

use segscroll_core::AppConfig;
use segscroll_tui::{
    app::{App, Mode, SegmentSpec},
    apply_segment_overrides,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event, Action},
    keymap::Keymap,
    load_theme,
    widgets::{HeaderWidget, HelpWidget, PageWidget, SegmentBarWidget, StatusBarWidget},
};

type Backend = CrosstermBackend<io::Stdout>;

const DEMO_TITLES: [&str; 9] = [
    "Overview", "Activity", "Photos", "Notes", "Likes", "Lists", "Media", "Replies", "Drafts",
];

/// Rows of demo content per segment
const DEMO_LINES: usize = 80;

pub fn run(config: Arc<AppConfig>, segments: usize) -> Result<()> {
    if segments == 0 || segments > DEMO_TITLES.len() {
        bail!("segments must be between 1 and {}", DEMO_TITLES.len());
    }

    let keymap = Keymap::from_config(&config.keymap);
    let theme = apply_segment_overrides(load_theme(&config.ui.theme), &config.segment.colors);
    let mut app = App::new(config.clone(), theme, demo_segments(segments))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("segscroll"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(segments, "TUI started");
    let result = main_loop(&mut terminal, &mut app, &keymap);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn main_loop(terminal: &mut Terminal<Backend>, app: &mut App, keymap: &Keymap) -> Result<()> {
    let event_handler = EventHandler::with_animation_fps(
        app.config.ui.tick_rate_ms,
        app.config.ui.paging.animation_fps,
    );

    loop {
        app.update_animation();

        terminal.draw(|frame| {
            // Main layout: segmented view + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());
            app.resize(main_layout[0].height);

            let header = &app.config.header;
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(header.top_spacing.round().max(0.0) as u16),
                    Constraint::Length(app.header_rows()),
                    Constraint::Length(app.segment_bar_rows()),
                    Constraint::Min(0),
                    Constraint::Length(header.bottom_spacing.round().max(0.0) as u16),
                ])
                .split(main_layout[0]);

            app.set_page_viewport(chunks[3].height);

            HeaderWidget::render(frame, chunks[1], app);
            SegmentBarWidget::render(frame, chunks[2], app);
            PageWidget::render(frame, chunks[3], app);
            StatusBarWidget::render(frame, main_layout[1], app);

            if app.mode == Mode::Help {
                HelpWidget::render(frame, &app.config.keymap, &app.theme);
            }
        })?;

        let event = if app.needs_animation_update() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        match event {
            Some(AppEvent::Key(key)) => {
                let action = handle_key_event(key, app, keymap);
                handle_action(app, action);
            }
            Some(AppEvent::Mouse(mouse)) => {
                let action = handle_mouse_event(mouse, app);
                handle_action(app, action);
            }
            // The next draw picks up the new size
            Some(AppEvent::Resize(_, _)) | Some(AppEvent::Tick) | None => {}
        }

        if app.should_quit {
            info!(stats = ?app.stats(), "TUI exiting");
            return Ok(());
        }
    }
}

fn handle_action(app: &mut App, action: Action) {
    if action == Action::PendingG {
        app.pending_key = Some('g');
        return;
    }
    app.clear_pending_key();

    match action {
        Action::Quit => app.should_quit = true,
        Action::ScrollDown => app.scroll_active(1.0),
        Action::ScrollUp => app.scroll_active(-1.0),
        Action::ScrollHalfPageDown => app.scroll_half_page(true),
        Action::ScrollHalfPageUp => app.scroll_half_page(false),
        Action::JumpToTop => app.jump_to_top(),
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::NextSegment => {
            app.next_segment();
        }
        Action::PrevSegment => {
            app.prev_segment();
        }
        Action::SelectSegment(index) => {
            if !app.tap_segment(index) {
                app.set_status(format!("No segment {}", index + 1));
            }
        }
        Action::SwipeNext => {
            app.swipe(true);
        }
        Action::SwipePrev => {
            app.swipe(false);
        }
        Action::ToggleHelp => app.toggle_help(),
        Action::ExitMode => {
            app.mode = Mode::Normal;
            app.clear_status();
        }
        Action::PendingG | Action::None => {}
    }
}

fn demo_segments(count: usize) -> Vec<SegmentSpec> {
    DEMO_TITLES
        .iter()
        .take(count)
        .map(|title| SegmentSpec {
            title: Some(title.to_string()),
            lines: (1..=DEMO_LINES)
                .map(|n| format!("  {} · row {:>3}", title, n))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_segments() {
        let segments = demo_segments(3);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].title.as_deref(), Some("Photos"));
        assert_eq!(segments[0].lines.len(), DEMO_LINES);
    }

    #[test]
    fn test_segment_count_is_checked() {
        let config = Arc::new(AppConfig::default());
        assert!(run(config.clone(), 0).is_err());
        assert!(run(config, 10).is_err());
    }

    #[test]
    fn test_pending_g_survives_until_next_key() {
        let segments = demo_segments(2);
        let mut app = App::new(
            Arc::new(AppConfig::default()),
            segscroll_tui::Theme::default(),
            segments,
        )
        .unwrap();

        handle_action(&mut app, Action::PendingG);
        assert_eq!(app.pending_key, Some('g'));
        handle_action(&mut app, Action::ScrollDown);
        assert_eq!(app.pending_key, None);
    }
}
