//! Scroll coordination between the parent surface and its children.
//!
//! The coordinator subscribes to the parent and to every registered child.
//! Each change from the active child is run through the clamper; when the
//! parent has to absorb the delta, both corrective writes happen under a
//! [`Suppression`] guard so neither of them is observed.
//!
//! Handlers run synchronously on the UI thread. A change that arrives while
//! the coordinator is already handling one means the suppression discipline
//! was broken somewhere; it is logged and dropped rather than allowed to
//! recurse.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::clamp::{compute_collapse, ChildMotion, Collapse};
use crate::geometry::HeaderGeometry;
use crate::observer::{PositionObserver, Suppression};
use crate::surface::{OffsetChange, SurfaceHandle, SurfaceId};

/// Counters for what the coordinator did with the changes it saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Changes delivered to the coordinator
    pub events: u64,
    /// Changes that moved the parent and pinned a child
    pub interventions: u64,
    /// Changes from the parent, unknown or inactive children, or after teardown
    pub ignored: u64,
    /// Changes dropped because they arrived during another change
    pub reentrant_dropped: u64,
}

struct CoordinatorState {
    parent: SurfaceHandle,
    children: Vec<SurfaceHandle>,
    active: Option<usize>,
    range: f64,
    observer: PositionObserver,
    attached: bool,
    stats: CoordinatorStats,
}

struct Shared {
    state: RefCell<CoordinatorState>,
    reentrant_dropped: Cell<u64>,
}

/// Owns the parent surface and observes the child registry
pub struct ScrollCoordinator {
    shared: Rc<Shared>,
}

impl ScrollCoordinator {
    pub fn new(parent: SurfaceHandle, geometry: &HeaderGeometry) -> Self {
        let shared = Rc::new(Shared {
            state: RefCell::new(CoordinatorState {
                parent: parent.clone(),
                children: Vec::new(),
                active: None,
                range: geometry.collapse_range(),
                observer: PositionObserver::new(),
                attached: true,
                stats: CoordinatorStats::default(),
            }),
            reentrant_dropped: Cell::new(0),
        });

        {
            let mut state = shared.state.borrow_mut();
            observe(&shared, &mut state.observer, &parent);
        }

        debug!(
            parent = %parent.name(),
            range = geometry.collapse_range(),
            "Scroll coordinator created"
        );

        Self { shared }
    }

    /// Register a child surface and return its index.
    ///
    /// A surface is only ever registered once; registering it again returns
    /// its existing index. The first child becomes the active one. The parent
    /// can't be its own child, and nothing registers after teardown.
    pub fn register_child(&self, child: SurfaceHandle) -> Option<usize> {
        let mut state = self.shared.state.borrow_mut();

        if !state.attached {
            debug!(child = %child.name(), "Coordinator torn down, ignoring registration");
            return None;
        }

        if let Some(index) = state.index_of(child.id()) {
            debug!(child = %child.name(), index, "Child already registered");
            return Some(index);
        }

        if child.id() == state.parent.id() {
            warn!(child = %child.name(), "Refusing to register the parent as its own child");
            return None;
        }

        observe(&self.shared, &mut state.observer, &child);
        state.children.push(child.clone());
        let index = state.children.len() - 1;

        if state.active.is_none() {
            state.active = Some(index);
        }

        debug!(child = %child.name(), index, "Child registered");
        Some(index)
    }

    /// Stop observing a child and drop it from the registry.
    ///
    /// Later children shift down by one. If the active child is removed no
    /// child is active until [`ScrollCoordinator::set_active_child`] is called.
    pub fn deregister_child(&self, id: SurfaceId) -> bool {
        let mut state = self.shared.state.borrow_mut();
        let Some(index) = state.index_of(id) else {
            debug!(child = %id, "Deregistering unknown child, ignoring");
            return false;
        };

        let child = state.children.remove(index);
        state.observer.unsubscribe(&child);

        state.active = match state.active {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };

        debug!(child = %child.name(), index, "Child deregistered");
        true
    }

    /// Select which child drives the header. Out-of-range indices are ignored.
    pub fn set_active_child(&self, index: usize) -> bool {
        let mut state = self.shared.state.borrow_mut();
        if index >= state.children.len() {
            debug!(index, count = state.children.len(), "Active child out of range, ignoring");
            return false;
        }
        state.active = Some(index);
        true
    }

    pub fn active_child(&self) -> Option<usize> {
        self.shared.state.borrow().active
    }

    pub fn child(&self, index: usize) -> Option<SurfaceHandle> {
        self.shared.state.borrow().children.get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.shared.state.borrow().children.len()
    }

    pub fn parent(&self) -> SurfaceHandle {
        self.shared.state.borrow().parent.clone()
    }

    pub fn collapse_range(&self) -> f64 {
        self.shared.state.borrow().range
    }

    /// How far the header has collapsed, in `[0, 1]`
    pub fn collapse_progress(&self) -> f64 {
        let state = self.shared.state.borrow();
        if state.range <= 0.0 {
            return 0.0;
        }
        (state.parent.offset().y / state.range).clamp(0.0, 1.0)
    }

    pub fn is_attached(&self) -> bool {
        self.shared.state.borrow().attached
    }

    pub fn stats(&self) -> CoordinatorStats {
        let mut stats = self.shared.state.borrow().stats;
        stats.reentrant_dropped = self.shared.reentrant_dropped.get();
        stats
    }

    /// Unsubscribe from every surface and forget the children.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&self) {
        let Ok(mut state) = self.shared.state.try_borrow_mut() else {
            warn!("Teardown requested while a change is being handled, ignoring");
            return;
        };
        if !state.attached {
            return;
        }

        state.observer.unsubscribe_all();
        state.children.clear();
        state.active = None;
        state.attached = false;

        info!(
            events = state.stats.events,
            interventions = state.stats.interventions,
            "Scroll coordinator torn down"
        );
    }
}

impl Drop for ScrollCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl CoordinatorState {
    fn index_of(&self, id: SurfaceId) -> Option<usize> {
        self.children.iter().position(|child| child.id() == id)
    }

    fn handle(&mut self, change: &OffsetChange) {
        self.stats.events += 1;

        if !self.attached {
            self.stats.ignored += 1;
            return;
        }

        // The parent is only ever written here, never re-read as a source
        if change.surface == self.parent.id() {
            trace!(y = change.new.y, "Parent offset changed");
            self.stats.ignored += 1;
            return;
        }

        let Some(index) = self.index_of(change.surface) else {
            debug!(surface = %change.surface, "Change from unregistered surface, ignoring");
            self.stats.ignored += 1;
            return;
        };

        if self.active != Some(index) {
            trace!(index, active = ?self.active, "Change from inactive child, ignoring");
            self.stats.ignored += 1;
            return;
        }

        let child = self.children[index].clone();
        let parent = self.parent.clone();
        let parent_offset = parent.offset();
        let motion = ChildMotion::new(change.old, change.new);

        let Collapse::Intervene { parent_y, residual } =
            compute_collapse(parent_offset.y, motion, self.range)
        else {
            trace!(index, delta = motion.delta(), "Native child scroll");
            return;
        };

        {
            let _suppressed = Suppression::new(&[&*parent, &*child]);
            parent.set_offset(parent_offset.with_y(parent_y));
            child.set_offset(residual);
        }

        self.stats.interventions += 1;
        trace!(
            index,
            delta = motion.delta(),
            parent_y,
            child_y = residual.y,
            "Parent absorbed child delta"
        );
    }
}

fn observe(shared: &Rc<Shared>, observer: &mut PositionObserver, surface: &SurfaceHandle) {
    let weak: Weak<Shared> = Rc::downgrade(shared);
    observer.subscribe(surface, move |change| {
        if let Some(shared) = weak.upgrade() {
            dispatch(&shared, change);
        }
    });
}

fn dispatch(shared: &Shared, change: &OffsetChange) {
    match shared.state.try_borrow_mut() {
        Ok(mut state) => state.handle(change),
        Err(_) => {
            shared
                .reentrant_dropped
                .set(shared.reentrant_dropped.get() + 1);
            warn!(
                surface = %change.surface,
                old_y = change.old.y,
                new_y = change.new.y,
                "Offset change arrived while another change was being handled, dropping"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScrollOffset;
    use crate::surface::ScrollSurface;

    fn geometry(range: f64) -> HeaderGeometry {
        HeaderGeometry::new(100.0 + range, 100.0, 0.0, 0.0).unwrap()
    }

    fn setup(range: f64, children: usize) -> (ScrollCoordinator, SurfaceHandle, Vec<SurfaceHandle>) {
        let parent = ScrollSurface::new("parent");
        let coordinator = ScrollCoordinator::new(parent.clone(), &geometry(range));
        let children: Vec<_> = (0..children)
            .map(|i| {
                let child = ScrollSurface::new(format!("child-{}", i));
                coordinator.register_child(child.clone());
                child
            })
            .collect();
        (coordinator, parent, children)
    }

    #[test]
    fn test_rubber_band_scenario() {
        let (coordinator, parent, children) = setup(64.0, 1);
        let child = &children[0];

        child.set_offset(ScrollOffset::vertical(-20.0));
        assert_eq!(parent.offset().y, 20.0);
        assert_eq!(child.offset().y, 0.0);

        child.set_offset(ScrollOffset::vertical(-50.0));
        assert_eq!(parent.offset().y, 64.0);
        assert_eq!(child.offset().y, 0.0);

        let stats = coordinator.stats();
        assert_eq!(stats.interventions, 2);
        assert_eq!(stats.events, 2);
    }

    #[test]
    fn test_fully_collapsed_child_scrolls_natively() {
        let (coordinator, parent, children) = setup(64.0, 1);
        let child = &children[0];
        child.set_offset(ScrollOffset::vertical(-80.0));
        assert_eq!(parent.offset().y, 64.0);

        child.set_offset(ScrollOffset::vertical(-5.0));
        assert_eq!(parent.offset().y, 64.0);
        assert_eq!(child.offset().y, -5.0);
        assert_eq!(coordinator.stats().interventions, 1);
    }

    #[test]
    fn test_header_reexpands_before_content_scrolls() {
        let (_coordinator, parent, children) = setup(64.0, 1);
        let child = &children[0];
        child.set_offset(ScrollOffset::vertical(-30.0));
        assert_eq!(parent.offset().y, 30.0);

        child.set_offset(ScrollOffset::vertical(10.0));
        assert_eq!(parent.offset().y, 20.0);
        assert_eq!(child.offset().y, 0.0);

        child.set_offset(ScrollOffset::vertical(25.0));
        assert_eq!(parent.offset().y, 0.0);
        assert_eq!(child.offset().y, 0.0);

        child.set_offset(ScrollOffset::vertical(25.0));
        assert_eq!(parent.offset().y, 0.0);
        assert_eq!(child.offset().y, 25.0);
    }

    #[test]
    fn test_parent_x_is_preserved() {
        let parent = ScrollSurface::with_offset("parent", ScrollOffset::new(7.0, 0.0));
        let coordinator = ScrollCoordinator::new(parent.clone(), &geometry(64.0));
        let child = ScrollSurface::with_offset("child", ScrollOffset::new(2.0, 0.0));
        coordinator.register_child(child.clone());

        child.set_offset(ScrollOffset::new(2.0, -10.0));

        assert_eq!(parent.offset(), ScrollOffset::new(7.0, 10.0));
        assert_eq!(child.offset(), ScrollOffset::new(2.0, 0.0));
    }

    #[test]
    fn test_writes_happen_while_suppressed() {
        let (coordinator, parent, children) = setup(64.0, 1);
        let child = children[0].clone();
        let log: Rc<RefCell<Vec<(&'static str, bool, bool)>>> = Rc::new(RefCell::new(Vec::new()));

        for (name, surface) in [("parent", &parent), ("child", &child)] {
            let log = log.clone();
            let parent = Rc::downgrade(&parent);
            let child = Rc::downgrade(&child);
            surface.set_write_probe(move |_| {
                if let (Some(parent), Some(child)) = (parent.upgrade(), child.upgrade()) {
                    log.borrow_mut().push((
                        name,
                        parent.observation_enabled(),
                        child.observation_enabled(),
                    ));
                }
            });
        }

        assert!(parent.observation_enabled() && child.observation_enabled());
        child.set_offset(ScrollOffset::vertical(-12.0));
        assert!(parent.observation_enabled() && child.observation_enabled());

        let log = log.borrow();
        // The user-driven write, then the two corrective writes
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], ("child", true, true));
        assert_eq!(log[1], ("parent", false, false));
        assert_eq!(log[2], ("child", false, false));

        let stats = coordinator.stats();
        assert_eq!(stats.events, 1);
        assert_eq!(stats.reentrant_dropped, 0);
    }

    #[test]
    fn test_parent_changes_are_ignored() {
        let (coordinator, parent, children) = setup(64.0, 1);

        parent.set_offset(ScrollOffset::vertical(30.0));

        assert_eq!(children[0].offset().y, 0.0);
        let stats = coordinator.stats();
        assert_eq!(stats.events, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.interventions, 0);
    }

    #[test]
    fn test_inactive_child_is_ignored() {
        let (coordinator, parent, children) = setup(64.0, 3);
        assert_eq!(coordinator.active_child(), Some(0));

        children[2].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(parent.offset().y, 0.0);
        assert_eq!(children[2].offset().y, -10.0);

        assert!(coordinator.set_active_child(2));
        children[2].set_offset(ScrollOffset::vertical(-20.0));
        assert_eq!(parent.offset().y, 10.0);
        assert_eq!(children[2].offset().y, -10.0);
    }

    #[test]
    fn test_parent_cannot_be_child() {
        let (coordinator, parent, _children) = setup(64.0, 1);
        assert_eq!(coordinator.register_child(parent), None);
        assert_eq!(coordinator.child_count(), 1);
    }

    #[test]
    fn test_set_active_out_of_range() {
        let (coordinator, _parent, _children) = setup(64.0, 2);
        assert!(!coordinator.set_active_child(5));
        assert_eq!(coordinator.active_child(), Some(0));
    }

    #[test]
    fn test_register_child_once() {
        let (coordinator, _parent, children) = setup(64.0, 2);
        assert_eq!(coordinator.register_child(children[1].clone()), Some(1));
        assert_eq!(coordinator.child_count(), 2);
    }

    #[test]
    fn test_deregister_shifts_active() {
        let (coordinator, parent, children) = setup(64.0, 3);
        coordinator.set_active_child(2);

        assert!(coordinator.deregister_child(children[0].id()));
        assert_eq!(coordinator.active_child(), Some(1));
        assert!(!children[0].is_subscribed());

        children[0].set_offset(ScrollOffset::vertical(-10.0));
        assert_eq!(parent.offset().y, 0.0);

        assert!(coordinator.deregister_child(children[2].id()));
        assert_eq!(coordinator.active_child(), None);
        assert!(!coordinator.deregister_child(children[2].id()));
    }

    #[test]
    fn test_zero_range_leaves_children_native() {
        let (coordinator, parent, children) = setup(0.0, 1);
        children[0].set_offset(ScrollOffset::vertical(-20.0));
        children[0].set_offset(ScrollOffset::vertical(40.0));

        assert_eq!(parent.offset().y, 0.0);
        assert_eq!(children[0].offset().y, 40.0);
        assert_eq!(coordinator.stats().interventions, 0);
    }

    #[test]
    fn test_reentrant_change_is_dropped() {
        let (coordinator, parent, children) = setup(64.0, 1);

        {
            let _busy = coordinator.shared.state.borrow_mut();
            children[0].set_offset(ScrollOffset::vertical(-20.0));
        }

        assert_eq!(parent.offset().y, 0.0);
        assert_eq!(children[0].offset().y, -20.0);
        assert_eq!(coordinator.stats().reentrant_dropped, 1);
    }

    #[test]
    fn test_teardown_unsubscribes_everything() {
        let (coordinator, parent, children) = setup(64.0, 2);

        coordinator.teardown();
        coordinator.teardown();

        assert!(!coordinator.is_attached());
        assert!(!parent.is_subscribed());
        assert!(children.iter().all(|child| !child.is_subscribed()));
        assert_eq!(coordinator.child_count(), 0);

        children[0].set_offset(ScrollOffset::vertical(-20.0));
        assert_eq!(parent.offset().y, 0.0);
    }

    #[test]
    fn test_no_registration_after_teardown() {
        let (coordinator, parent, _children) = setup(64.0, 1);
        coordinator.teardown();

        let late = ScrollSurface::new("late");
        assert_eq!(coordinator.register_child(late.clone()), None);
        assert!(!late.is_subscribed());
        assert_eq!(coordinator.child_count(), 0);

        late.set_offset(ScrollOffset::vertical(-20.0));
        assert_eq!(parent.offset().y, 0.0);
    }

    #[test]
    fn test_follows_the_clamper() {
        let (coordinator, parent, children) = setup(64.0, 1);
        let child = &children[0];

        for target in [-20.0, -20.0, 15.0, -100.0, 0.0, 0.0, 30.0] {
            let motion = ChildMotion::new(child.offset(), ScrollOffset::vertical(target));
            let expected = match compute_collapse(parent.offset().y, motion, 64.0) {
                Collapse::Intervene { parent_y, residual } => (parent_y, residual.y),
                Collapse::NoIntervention => (parent.offset().y, target),
            };

            child.set_offset(ScrollOffset::vertical(target));

            assert_eq!((parent.offset().y, child.offset().y), expected, "target {}", target);
        }
        assert_eq!(coordinator.stats().reentrant_dropped, 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (coordinator, parent, children) = setup(64.0, 1);
        drop(coordinator);

        assert!(!parent.is_subscribed());
        children[0].set_offset(ScrollOffset::vertical(-20.0));
        assert_eq!(parent.offset().y, 0.0);
    }

    #[test]
    fn test_collapse_progress() {
        let (coordinator, _parent, children) = setup(64.0, 1);
        assert_eq!(coordinator.collapse_progress(), 0.0);
        children[0].set_offset(ScrollOffset::vertical(-16.0));
        assert_eq!(coordinator.collapse_progress(), 0.25);
    }
}
