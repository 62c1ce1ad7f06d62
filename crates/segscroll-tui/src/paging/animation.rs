//! Page slide controller
//!
//! Tracks the strip position in page units (0.0 is the first page, 1.0 the
//! second, ...). A slide moves that position from where the strip is now to
//! the target page, decelerating into it.

use std::time::{Duration, Instant};

use segscroll_core::{EasingType, PagingConfig};

/// What started a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOrigin {
    /// A tab was tapped; the selection is already known
    Tap,
    /// The user swiped the pager; the selection is known once it settles
    Swipe,
}

/// Reported once when a slide comes to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideFinished {
    pub index: usize,
    pub origin: SlideOrigin,
}

#[derive(Debug, Clone)]
struct ActiveSlide {
    start: Instant,
    from: f64,
    to: usize,
    duration: Duration,
    easing: EasingType,
    origin: SlideOrigin,
}

impl ActiveSlide {
    fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }

    /// Strip position at `now`
    fn position_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        let fraction = if self.duration.is_zero() {
            1.0
        } else {
            elapsed / self.duration.as_secs_f64()
        };
        let travelled = ease(self.easing, fraction);
        self.from + (self.to as f64 - self.from) * travelled
    }
}

/// Share of the distance covered after `fraction` of the slide time
fn ease(easing: EasingType, fraction: f64) -> f64 {
    let t = fraction.clamp(0.0, 1.0);
    let remaining = 1.0 - t;
    match easing {
        // Hold still, then land on the page
        EasingType::None if t < 1.0 => 0.0,
        EasingType::None => 1.0,
        EasingType::Linear => t,
        EasingType::Cubic => 1.0 - remaining.powi(3),
        EasingType::Quintic => 1.0 - remaining.powi(5),
        EasingType::EaseOut if t >= 1.0 => 1.0,
        EasingType::EaseOut => 1.0 - 2.0_f64.powf(-10.0 * t),
    }
}

/// Slide animation controller for the page strip
#[derive(Debug, Clone)]
pub struct PageAnimator {
    slide: Option<ActiveSlide>,
    config: PagingConfig,
    position: f64,
    /// Finished instant slide not yet reported by `update`
    pending: Option<SlideFinished>,
}

impl PageAnimator {
    pub fn new(config: PagingConfig) -> Self {
        Self {
            slide: None,
            config,
            position: 0.0,
            pending: None,
        }
    }

    /// Whether the main loop should poll at animation rate
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.slide.is_some() || self.pending.is_some()
    }

    /// Current strip position in page units
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Page the strip is heading to, or resting on
    pub fn target(&self) -> usize {
        match &self.slide {
            Some(slide) => slide.to,
            None => self.position.round().max(0.0) as usize,
        }
    }

    /// Move to `index` immediately, dropping any slide in flight
    pub fn jump_to(&mut self, index: usize) {
        self.slide = None;
        self.pending = None;
        self.position = index as f64;
    }

    /// Start sliding toward `index`.
    ///
    /// With smooth paging off the strip jumps, and the finish is reported by
    /// the next `update`. A new slide replaces the one in flight and starts
    /// from wherever the strip is now; the replaced slide never reports.
    pub fn slide_to(&mut self, index: usize, origin: SlideOrigin) {
        self.slide_to_at(index, origin, Instant::now());
    }

    /// Advance the slide. Returns the finish exactly once per slide.
    pub fn update(&mut self) -> Option<SlideFinished> {
        self.update_at(Instant::now())
    }

    fn is_smooth(&self) -> bool {
        self.config.smooth_enabled && self.config.animation_duration_ms > 0
    }

    fn slide_to_at(&mut self, index: usize, origin: SlideOrigin, now: Instant) {
        let from = self.position;

        if !self.is_smooth() || from == index as f64 {
            self.slide = None;
            self.position = index as f64;
            self.pending = Some(SlideFinished { index, origin });
            return;
        }

        self.pending = None;
        self.slide = Some(ActiveSlide {
            start: now,
            from,
            to: index,
            duration: Duration::from_millis(self.config.animation_duration_ms),
            easing: self.config.easing,
            origin,
        });
    }

    fn update_at(&mut self, now: Instant) -> Option<SlideFinished> {
        if let Some(finished) = self.pending.take() {
            return Some(finished);
        }

        let slide = self.slide.as_ref()?;
        if slide.is_done(now) {
            let finished = SlideFinished {
                index: slide.to,
                origin: slide.origin,
            };
            self.position = slide.to as f64;
            self.slide = None;
            return Some(finished);
        }

        self.position = slide.position_at(now);
        None
    }
}
