//! Position-change subscriptions with per-surface suppression.
//!
//! The engine writes offsets from inside its own change handler. Each of those
//! writes would re-enter the handler, so the surfaces involved are muted for
//! exactly the duration of the write through a [`Suppression`] guard. Muting
//! is per surface: silencing the parent never drops events from a child.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::surface::{OffsetChange, ScrollSurface, SurfaceHandle, SurfaceId};

/// Tracks which surfaces the engine is subscribed to
#[derive(Debug, Default)]
pub struct PositionObserver {
    subscriptions: HashMap<SurfaceId, Weak<ScrollSurface>>,
}

impl PositionObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `on_change` to every offset assignment on `surface`.
    ///
    /// Duplicate subscriptions are ignored and return `false`.
    pub fn subscribe<F>(&mut self, surface: &SurfaceHandle, on_change: F) -> bool
    where
        F: Fn(&OffsetChange) + 'static,
    {
        if self.subscriptions.contains_key(&surface.id()) {
            debug!(surface = %surface.name(), "Already observing surface, ignoring subscribe");
            return false;
        }

        if !surface.subscribe(Rc::new(on_change)) {
            debug!(surface = %surface.name(), "Surface already has an observer, ignoring subscribe");
            return false;
        }

        surface.set_observation_enabled(true);
        self.subscriptions
            .insert(surface.id(), Rc::downgrade(surface));
        true
    }

    /// Drop the subscription on `surface`. No-op if there is none.
    pub fn unsubscribe(&mut self, surface: &ScrollSurface) {
        if self.subscriptions.remove(&surface.id()).is_some() {
            surface.unsubscribe();
        }
    }

    /// Drop every subscription, including ones on surfaces nobody else holds
    pub fn unsubscribe_all(&mut self) {
        for (_, surface) in self.subscriptions.drain() {
            if let Some(surface) = surface.upgrade() {
                surface.unsubscribe();
            }
        }
    }

    /// Idempotent. Takes effect for the very next assignment.
    pub fn set_observation_enabled(&self, surface: &ScrollSurface, enabled: bool) {
        surface.set_observation_enabled(enabled);
    }

    pub fn is_observing(&self, id: SurfaceId) -> bool {
        self.subscriptions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Mutes observation on a set of surfaces until dropped.
///
/// Each surface gets its previous flag back on drop, in reverse order, so
/// naming the same surface twice is harmless.
#[must_use = "observation is restored as soon as the guard is dropped"]
pub struct Suppression<'a> {
    restore: Vec<(&'a ScrollSurface, bool)>,
}

impl<'a> Suppression<'a> {
    pub fn new(surfaces: &[&'a ScrollSurface]) -> Self {
        let restore = surfaces
            .iter()
            .map(|surface| {
                let previous = surface.observation_enabled();
                surface.set_observation_enabled(false);
                (*surface, previous)
            })
            .collect();
        Self { restore }
    }
}

impl Drop for Suppression<'_> {
    fn drop(&mut self) {
        for (surface, previous) in self.restore.iter().rev() {
            surface.set_observation_enabled(*previous);
        }
    }
}
