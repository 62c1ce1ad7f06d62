//! The segmented scroll view: header, segment bar and one page per segment.

use tracing::{debug, info, warn};

use crate::bridge::{PageView, SelectionBridge, TabStrip};
use crate::coordinator::{CoordinatorStats, ScrollCoordinator};
use crate::error::{Error, Result};
use crate::geometry::HeaderGeometry;
use crate::surface::SurfaceHandle;

/// Layout system hosting the view
pub trait LayoutHost {
    /// Height of the parent's scrollable canvas
    fn set_content_height(&mut self, height: f64);
    fn request_layout(&mut self);
}

/// Validated construction parameters for [`SegmentedScroll`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentedScrollConfig {
    geometry: HeaderGeometry,
    segment_height: f64,
}

impl SegmentedScrollConfig {
    pub fn new(geometry: HeaderGeometry, segment_height: f64) -> Result<Self> {
        if !segment_height.is_finite() || segment_height < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "segment_height must be non-negative, got {}",
                segment_height
            )));
        }
        Ok(Self {
            geometry,
            segment_height,
        })
    }

    pub fn geometry(&self) -> &HeaderGeometry {
        &self.geometry
    }

    pub fn segment_height(&self) -> f64 {
        self.segment_height
    }
}

/// Composite of the scroll coordinator and the selection bridge.
///
/// Keeps the coordinator's active child in step with the selected segment,
/// so only the visible page can drive the header.
pub struct SegmentedScroll {
    config: SegmentedScrollConfig,
    coordinator: ScrollCoordinator,
    bridge: SelectionBridge,
}

impl SegmentedScroll {
    pub fn new(config: SegmentedScrollConfig, parent: SurfaceHandle) -> Self {
        let coordinator = ScrollCoordinator::new(parent, config.geometry());
        Self {
            config,
            coordinator,
            bridge: SelectionBridge::new(),
        }
    }

    pub fn config(&self) -> &SegmentedScrollConfig {
        &self.config
    }

    /// Add a page. Untitled pages get an empty label.
    ///
    /// Returns the segment index, or `None` if the surface is the parent or
    /// already backs another segment.
    pub fn add_segment(&mut self, title: Option<String>, surface: SurfaceHandle) -> Option<usize> {
        let expected = self.coordinator.child_count();
        let index = self.coordinator.register_child(surface)?;
        if index != expected {
            debug!(index, "Surface already backs a segment, ignoring");
            return None;
        }

        let label = title.unwrap_or_default();
        debug!(index, label = %label, "Segment added");
        Some(self.bridge.push_label(label))
    }

    /// Drop a page, its label and its subscription together.
    ///
    /// Returns the page's surface, or `None` for an unknown index.
    pub fn remove_segment(&mut self, index: usize) -> Option<SurfaceHandle> {
        let surface = self.coordinator.child(index)?;
        if !self.bridge.contains(index) || !self.coordinator.deregister_child(surface.id()) {
            return None;
        }
        self.bridge.remove_label(index);

        if !self.bridge.is_empty() {
            self.coordinator.set_active_child(self.bridge.selected());
        }
        debug!(index, remaining = self.segment_count(), "Segment removed");
        Some(surface)
    }

    pub fn segment_count(&self) -> usize {
        self.bridge.len()
    }

    pub fn titles(&self) -> &[String] {
        self.bridge.labels()
    }

    pub fn selected(&self) -> usize {
        self.bridge.selected()
    }

    pub fn page_surface(&self, index: usize) -> Option<SurfaceHandle> {
        self.coordinator.child(index)
    }

    pub fn parent(&self) -> SurfaceHandle {
        self.coordinator.parent()
    }

    /// Segment whose page currently drives the header
    pub fn active_child(&self) -> Option<usize> {
        self.coordinator.active_child()
    }

    /// How far the header has collapsed, in `[0, 1]`
    pub fn collapse_progress(&self) -> f64 {
        self.coordinator.collapse_progress()
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.coordinator.stats()
    }

    /// The segment bar is only shown when there is something to switch to
    pub fn segment_bar_height(&self) -> f64 {
        if self.segment_count() > 1 {
            self.config.segment_height
        } else {
            0.0
        }
    }

    /// Visible header height given the parent's current offset
    pub fn header_height(&self) -> f64 {
        let geometry = self.config.geometry();
        let collapsed = self.parent().offset().y.clamp(0.0, geometry.collapse_range());
        geometry.expanded_height() - collapsed
    }

    pub fn content_height(&self, viewport_height: f64) -> f64 {
        self.config.geometry().content_height(viewport_height)
    }

    /// The hosting frame changed size: resize the canvas, then relayout.
    pub fn frame_changed(&self, viewport_height: f64, layout: &mut dyn LayoutHost) {
        let height = self.content_height(viewport_height);
        debug!(viewport_height, content_height = height, "Frame changed");
        layout.set_content_height(height);
        layout.request_layout();
    }

    /// Register the public selection callback `(index, label)`
    pub fn on_segment_selected<F>(&mut self, listener: F)
    where
        F: FnMut(usize, &str) + 'static,
    {
        self.bridge.set_listener(listener);
    }

    /// A tab was tapped
    pub fn select_segment(&mut self, index: usize, pager: &mut dyn PageView) -> bool {
        if !self.bridge.contains(index) {
            debug!(index, "Segment index out of range, ignoring");
            return false;
        }
        if !self.coordinator.set_active_child(index) {
            warn!(index, "Segment has no registered page, ignoring selection");
            return false;
        }
        self.bridge.on_tab_selected(index, pager)
    }

    /// The pager settled after a swipe
    pub fn page_settled(&mut self, index: usize, strip: &mut dyn TabStrip) -> bool {
        if !self.bridge.contains(index) {
            debug!(index, "Settled page out of range, ignoring");
            return false;
        }
        if !self.coordinator.set_active_child(index) {
            warn!(index, "Settled segment has no registered page, ignoring");
            return false;
        }
        self.bridge.on_page_settled(index, strip)
    }

    /// Stop observing every surface
    pub fn teardown(&mut self) {
        self.bridge.clear_listener();
        self.coordinator.teardown();
        info!("Segmented scroll torn down");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::ScrollOffset;
    use crate::surface::ScrollSurface;

    #[derive(Default)]
    struct RecordingPager {
        moves: Vec<(usize, bool)>,
    }

    impl PageView for RecordingPager {
        fn move_to(&mut self, index: usize, animated: bool) {
            self.moves.push((index, animated));
        }
    }

    #[derive(Default)]
    struct RecordingStrip {
        selections: Vec<usize>,
    }

    impl TabStrip for RecordingStrip {
        fn select(&mut self, index: usize) {
            self.selections.push(index);
        }
    }

    #[derive(Default)]
    struct RecordingLayout {
        calls: Vec<String>,
    }

    impl LayoutHost for RecordingLayout {
        fn set_content_height(&mut self, height: f64) {
            self.calls.push(format!("height {}", height));
        }

        fn request_layout(&mut self) {
            self.calls.push("layout".to_string());
        }
    }

    fn build(pages: usize) -> (SegmentedScroll, Vec<SurfaceHandle>) {
        let geometry = HeaderGeometry::new(200.0, 136.0, 0.0, 0.0).unwrap();
        let config = SegmentedScrollConfig::new(geometry, 44.0).unwrap();
        let mut view = SegmentedScroll::new(config, ScrollSurface::new("parent"));
        let surfaces: Vec<_> = (0..pages)
            .map(|i| {
                let surface = ScrollSurface::new(format!("page-{}", i));
                view.add_segment(Some(format!("Page {}", i)), surface.clone());
                surface
            })
            .collect();
        (view, surfaces)
    }

    #[test]
    fn test_rejects_negative_segment_height() {
        let geometry = HeaderGeometry::new(10.0, 0.0, 0.0, 0.0).unwrap();
        assert!(SegmentedScrollConfig::new(geometry, -1.0).is_err());
    }

    #[test]
    fn test_untitled_segment_gets_empty_label() {
        let (mut view, _) = build(1);
        view.add_segment(None, ScrollSurface::new("untitled"));
        assert_eq!(view.titles(), &["Page 0".to_string(), String::new()]);
    }

    #[test]
    fn test_duplicate_surface_is_not_a_new_segment() {
        let (mut view, surfaces) = build(2);
        assert_eq!(view.add_segment(Some("again".into()), surfaces[0].clone()), None);
        assert_eq!(view.add_segment(Some("parent".into()), view.parent()), None);
        assert_eq!(view.segment_count(), 2);
    }

    #[test]
    fn test_segment_bar_hidden_for_single_page() {
        let (view, _) = build(1);
        assert_eq!(view.segment_bar_height(), 0.0);
        let (view, _) = build(2);
        assert_eq!(view.segment_bar_height(), 44.0);
    }

    #[test]
    fn test_frame_changed_reports_height_then_layout() {
        let (view, _) = build(2);
        let mut layout = RecordingLayout::default();

        view.frame_changed(600.0, &mut layout);

        assert_eq!(layout.calls, vec!["height 664".to_string(), "layout".to_string()]);
    }

    #[test]
    fn test_selection_moves_active_child() {
        let (mut view, surfaces) = build(4);
        let mut pager = RecordingPager::default();
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();
        view.on_segment_selected(move |index, label| {
            sink.borrow_mut().push((index, label.to_string()))
        });

        assert!(view.select_segment(2, &mut pager));
        assert!(!view.select_segment(9, &mut pager));

        assert_eq!(pager.moves, vec![(2, true)]);
        assert_eq!(*selected.borrow(), vec![(2, "Page 2".to_string())]);
        assert_eq!(view.active_child(), Some(2));

        // Only the selected page drives the header now
        surfaces[0].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(view.header_height(), 200.0);
        surfaces[2].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(view.header_height(), 190.0);
    }

    #[test]
    fn test_page_settled_updates_strip_and_active_child() {
        let (mut view, _) = build(3);
        let mut strip = RecordingStrip::default();

        assert!(view.page_settled(1, &mut strip));
        assert!(!view.page_settled(1, &mut strip));

        assert_eq!(strip.selections, vec![1]);
        assert_eq!(view.selected(), 1);
        assert_eq!(view.active_child(), Some(1));
    }

    #[test]
    fn test_removed_segment_keeps_selection_in_step() {
        let (mut view, surfaces) = build(3);
        let mut pager = RecordingPager::default();
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();
        view.on_segment_selected(move |index, label| {
            sink.borrow_mut().push((index, label.to_string()))
        });

        let removed = view.remove_segment(0).unwrap();
        assert!(Rc::ptr_eq(&removed, &surfaces[0]));
        assert_eq!(view.titles(), &["Page 1".to_string(), "Page 2".to_string()]);
        assert_eq!(view.active_child(), Some(0));

        // Index 2 no longer exists on either side
        assert!(!view.select_segment(2, &mut pager));
        assert!(pager.moves.is_empty());
        assert!(selected.borrow().is_empty());

        assert!(view.select_segment(1, &mut pager));
        assert_eq!(view.active_child(), Some(1));
        assert_eq!(*selected.borrow(), vec![(1, "Page 2".to_string())]);

        // The visible page still drives the header; the removed one does not
        surfaces[0].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(view.header_height(), 200.0);
        surfaces[2].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(view.header_height(), 190.0);
    }

    #[test]
    fn test_removing_the_selected_segment_selects_its_successor() {
        let (mut view, surfaces) = build(3);
        let mut pager = RecordingPager::default();
        view.select_segment(1, &mut pager);

        view.remove_segment(1);

        assert_eq!(view.selected(), 1);
        assert_eq!(view.active_child(), Some(1));
        surfaces[2].set_offset(ScrollOffset::vertical(-4.0));
        assert_eq!(view.header_height(), 196.0);
        assert_eq!(view.remove_segment(7), None);
    }

    #[test]
    fn test_teardown_stops_observation() {
        let (mut view, surfaces) = build(2);
        view.teardown();

        surfaces[0].set_offset(ScrollOffset::vertical(-30.0));
        assert_eq!(view.header_height(), 200.0);
        assert!(!view.parent().is_subscribed());
    }
}
