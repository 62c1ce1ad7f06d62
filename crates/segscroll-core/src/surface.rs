//! Scrollable surfaces and their change notifications.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::geometry::ScrollOffset;

/// Stable identity of a surface, independent of where it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One offset assignment on a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetChange {
    pub surface: SurfaceId,
    pub old: ScrollOffset,
    pub new: ScrollOffset,
}

impl OffsetChange {
    /// Vertical delta in the engine's convention: `old.y - new.y`
    pub fn delta_y(&self) -> f64 {
        self.old.y - self.new.y
    }
}

pub type OffsetCallback = Rc<dyn Fn(&OffsetChange)>;

/// Shared reference to a surface. Surfaces live on the UI thread only.
pub type SurfaceHandle = Rc<ScrollSurface>;

/// A scrollable region whose offset can be read, written and observed.
///
/// Every call to [`ScrollSurface::set_offset`] dispatches synchronously to the
/// subscribed callback, unless observation has been disabled by the engine.
/// The callback is cloned out of its slot before it runs, so it may
/// unsubscribe (or write to other surfaces) without tripping a borrow.
pub struct ScrollSurface {
    id: SurfaceId,
    name: String,
    offset: Cell<ScrollOffset>,
    observation_enabled: Cell<bool>,
    callback: RefCell<Option<OffsetCallback>>,
    #[cfg(test)]
    write_probe: RefCell<Option<Box<dyn Fn(&ScrollSurface)>>>,
}

impl ScrollSurface {
    pub fn new(name: impl Into<String>) -> SurfaceHandle {
        Self::with_offset(name, ScrollOffset::ZERO)
    }

    pub fn with_offset(name: impl Into<String>, offset: ScrollOffset) -> SurfaceHandle {
        Rc::new(Self {
            id: SurfaceId::new(),
            name: name.into(),
            offset: Cell::new(offset),
            observation_enabled: Cell::new(true),
            callback: RefCell::new(None),
            #[cfg(test)]
            write_probe: RefCell::new(None),
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn offset(&self) -> ScrollOffset {
        self.offset.get()
    }

    /// Assign a new offset and notify the subscriber (if observation is on).
    pub fn set_offset(&self, offset: ScrollOffset) {
        let old = self.offset.replace(offset);

        #[cfg(test)]
        if let Some(probe) = self.write_probe.borrow().as_ref() {
            probe(self);
        }

        if !self.observation_enabled.get() {
            return;
        }

        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(&OffsetChange {
                surface: self.id,
                old,
                new: offset,
            });
        }
    }

    /// Install the change callback.
    ///
    /// Returns `false` and keeps the existing callback if the surface is
    /// already subscribed.
    pub fn subscribe(&self, callback: OffsetCallback) -> bool {
        let mut slot = self.callback.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(callback);
        true
    }

    /// Remove the change callback. Returns `false` if there was none.
    pub fn unsubscribe(&self) -> bool {
        self.callback.borrow_mut().take().is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.callback.borrow().is_some()
    }

    pub fn observation_enabled(&self) -> bool {
        self.observation_enabled.get()
    }

    pub(crate) fn set_observation_enabled(&self, enabled: bool) {
        self.observation_enabled.set(enabled);
    }

    /// Run `probe` after every offset assignment, before dispatch.
    #[cfg(test)]
    pub(crate) fn set_write_probe(&self, probe: impl Fn(&ScrollSurface) + 'static) {
        *self.write_probe.borrow_mut() = Some(Box::new(probe));
    }
}

impl fmt::Debug for ScrollSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSurface")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("offset", &self.offset.get())
            .field("observation_enabled", &self.observation_enabled.get())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
