use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Result};
use ratatui::layout::Rect;
use segscroll_core::{
    AppConfig, CoordinatorStats, LayoutHost, PageView, PagingConfig, ScrollOffset, ScrollSurface,
    SegmentedScroll, SurfaceHandle, TabStrip,
};
use tracing::debug;

use crate::paging::{PageAnimator, SlideOrigin};
use crate::theme::Theme;

/// One page of content backed by its own scroll surface.
///
/// Scrolls natively one row per step. A bouncing pane rubber-bands above
/// its top to a small negative offset and leaves the rest to the
/// coordinator; past the end of the content it stops.
pub struct ContentPane {
    title: Option<String>,
    surface: SurfaceHandle,
    lines: Vec<String>,
    viewport_height: u16,
    overscroll: f64,
}

impl ContentPane {
    /// Rows a bouncing pane may be pulled past its top
    pub const BOUNCE_ROWS: f64 = 1.0;

    pub fn new(title: Option<String>, lines: Vec<String>, bounces: bool) -> Self {
        let name = title.clone().unwrap_or_else(|| "untitled".to_string());
        Self {
            title,
            surface: ScrollSurface::new(name),
            lines,
            viewport_height: 0,
            overscroll: if bounces { Self::BOUNCE_ROWS } else { 0.0 },
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> f64 {
        self.surface.offset().y
    }

    pub fn viewport_height(&self) -> u16 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, rows: u16) {
        self.viewport_height = rows;
    }

    /// Rows the pane may be pulled past its top
    pub fn overscroll(&self) -> f64 {
        self.overscroll
    }

    /// Largest offset that still fills the viewport
    pub fn max_offset(&self) -> f64 {
        self.lines.len().saturating_sub(self.viewport_height as usize) as f64
    }

    pub fn scroll_by(&self, rows: f64) {
        self.scroll_to(self.offset() + rows);
    }

    /// Assign a new offset, clamped to what the pane allows natively
    pub fn scroll_to(&self, y: f64) {
        let target = y.clamp(-self.overscroll, self.max_offset());
        if target != self.offset() {
            self.surface.set_offset(ScrollOffset::vertical(target));
        }
    }
}

/// Horizontal pager showing one pane at a time
pub struct Pager {
    animator: PageAnimator,
    page_count: usize,
}

impl Pager {
    pub fn new(config: PagingConfig, page_count: usize) -> Self {
        Self {
            animator: PageAnimator::new(config),
            page_count,
        }
    }

    /// Strip position in page units
    pub fn position(&self) -> f64 {
        self.animator.position()
    }

    pub fn target(&self) -> usize {
        self.animator.target()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn needs_update(&self) -> bool {
        self.animator.needs_update()
    }

    /// Swipe one page forward or back. Returns `false` at either end.
    pub fn swipe(&mut self, forward: bool) -> bool {
        let current = self.animator.target();
        let next = if forward {
            current + 1
        } else {
            match current.checked_sub(1) {
                Some(index) => index,
                None => return false,
            }
        };
        if next >= self.page_count {
            return false;
        }

        self.animator.slide_to(next, SlideOrigin::Swipe);
        true
    }

    /// Advance the slide; returns the page a swipe settled on
    pub fn update(&mut self) -> Option<usize> {
        let finished = self.animator.update()?;
        match finished.origin {
            SlideOrigin::Swipe => Some(finished.index),
            SlideOrigin::Tap => None,
        }
    }
}

impl PageView for Pager {
    fn move_to(&mut self, index: usize, animated: bool) {
        if animated {
            self.animator.slide_to(index, SlideOrigin::Tap);
        } else {
            self.animator.jump_to(index);
        }
    }
}

/// Segment labels with hit regions for mouse taps
#[derive(Debug, Default)]
pub struct TabBar {
    selected: usize,
    /// Column span `[start, end)` of every tab, refreshed on each draw
    regions: Vec<(u16, u16)>,
}

impl TabBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn set_regions(&mut self, regions: Vec<(u16, u16)>) {
        self.regions = regions;
    }

    pub fn index_at(&self, column: u16) -> Option<usize> {
        self.regions
            .iter()
            .position(|&(start, end)| column >= start && column < end)
    }
}

impl TabStrip for TabBar {
    fn select(&mut self, index: usize) {
        self.selected = index;
    }
}

/// Parent canvas size as reported by the segmented view
#[derive(Debug, Default)]
pub struct CanvasLayout {
    content_height: f64,
    layout_passes: u64,
}

impl CanvasLayout {
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }
}

impl LayoutHost for CanvasLayout {
    fn set_content_height(&mut self, height: f64) {
        self.content_height = height;
    }

    fn request_layout(&mut self) {
        self.layout_passes += 1;
    }
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Key help overlay
    Help,
}

/// Title and body of one segment
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub title: Option<String>,
    pub lines: Vec<String>,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    /// Where the segment bar was last drawn
    pub segment_bar_area: Rect,
    segmented: SegmentedScroll,
    panes: Vec<ContentPane>,
    pager: Pager,
    tab_bar: TabBar,
    canvas: CanvasLayout,
    last_selection: Rc<RefCell<Option<(usize, String)>>>,
    viewport_height: u16,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme, segments: Vec<SegmentSpec>) -> Result<Self> {
        if segments.is_empty() {
            bail!("at least one segment is required");
        }

        let mut segmented =
            SegmentedScroll::new(config.segmented_config()?, ScrollSurface::new("parent"));

        let mut panes = Vec::with_capacity(segments.len());
        for spec in segments {
            let pane = ContentPane::new(spec.title, spec.lines, config.header.bounces);
            if segmented
                .add_segment(pane.title.clone(), pane.surface().clone())
                .is_none()
            {
                bail!("segment {} could not be registered", panes.len());
            }
            panes.push(pane);
        }

        let last_selection = Rc::new(RefCell::new(None));
        let sink = last_selection.clone();
        segmented.on_segment_selected(move |index, label| {
            *sink.borrow_mut() = Some((index, label.to_string()));
        });

        let pager = Pager::new(config.ui.paging.clone(), panes.len());
        debug!(segments = panes.len(), "App created");

        Ok(Self {
            config,
            theme,
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            pending_key: None,
            segment_bar_area: Rect::default(),
            segmented,
            panes,
            pager,
            tab_bar: TabBar::new(),
            canvas: CanvasLayout::default(),
            last_selection,
            viewport_height: 0,
        })
    }

    pub fn segmented(&self) -> &SegmentedScroll {
        &self.segmented
    }

    pub fn panes(&self) -> &[ContentPane] {
        &self.panes
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn tab_bar(&self) -> &TabBar {
        &self.tab_bar
    }

    pub fn tab_bar_mut(&mut self) -> &mut TabBar {
        &mut self.tab_bar
    }

    pub fn canvas(&self) -> &CanvasLayout {
        &self.canvas
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.segmented.stats()
    }

    /// Index of the selected segment
    pub fn active_index(&self) -> usize {
        self.segmented.selected()
    }

    pub fn active_pane(&self) -> &ContentPane {
        &self.panes[self.active_index()]
    }

    pub fn header_rows(&self) -> u16 {
        self.segmented.header_height().round().max(0.0) as u16
    }

    pub fn segment_bar_rows(&self) -> u16 {
        self.segmented.segment_bar_height().round().max(0.0) as u16
    }

    /// The terminal changed size
    pub fn resize(&mut self, viewport_height: u16) {
        if viewport_height == self.viewport_height {
            return;
        }
        self.viewport_height = viewport_height;
        self.segmented
            .frame_changed(viewport_height as f64, &mut self.canvas);
    }

    /// Rows available to a page after the header and bar took theirs
    pub fn set_page_viewport(&mut self, rows: u16) {
        for pane in &mut self.panes {
            pane.set_viewport_height(rows);
        }
    }

    pub fn scroll_active(&self, rows: f64) {
        self.active_pane().scroll_by(rows);
    }

    pub fn scroll_half_page(&self, down: bool) {
        let half = (self.active_pane().viewport_height() / 2).max(1) as f64;
        self.scroll_active(if down { half } else { -half });
    }

    pub fn jump_to_top(&self) {
        self.active_pane().scroll_to(0.0);
    }

    pub fn jump_to_bottom(&self) {
        let pane = self.active_pane();
        pane.scroll_to(pane.max_offset());
    }

    /// A tab was tapped, by key or mouse
    pub fn tap_segment(&mut self, index: usize) -> bool {
        if index >= self.panes.len() {
            return false;
        }
        self.tab_bar.select(index);
        let moved = self.segmented.select_segment(index, &mut self.pager);
        self.show_selection();
        moved
    }

    pub fn next_segment(&mut self) -> bool {
        self.tap_segment(self.active_index() + 1)
    }

    pub fn prev_segment(&mut self) -> bool {
        match self.active_index().checked_sub(1) {
            Some(index) => self.tap_segment(index),
            None => false,
        }
    }

    pub fn swipe(&mut self, forward: bool) -> bool {
        self.pager.swipe(forward)
    }

    /// Advance the page slide; a finished swipe selects its page
    pub fn update_animation(&mut self) {
        if let Some(index) = self.pager.update() {
            self.segmented.page_settled(index, &mut self.tab_bar);
            self.show_selection();
        }
    }

    pub fn needs_animation_update(&self) -> bool {
        self.pager.needs_update()
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Normal => Mode::Help,
            Mode::Help => Mode::Normal,
        };
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }

    /// Stop observing before the surfaces go away
    pub fn shutdown(&mut self) {
        self.segmented.teardown();
    }

    fn show_selection(&mut self) {
        let selection = self.last_selection.borrow_mut().take();
        if let Some((index, label)) = selection {
            let label = if label.is_empty() { "untitled" } else { label.as_str() };
            self.set_status(format!("Selected {} ({})", label, index + 1));
        }
    }
}
