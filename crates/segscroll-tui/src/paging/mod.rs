//! Horizontal paging between segment pages
//!
//! Slides the page strip from one segment to the next with the easing curve
//! from `[ui.paging]`. With smooth paging off the strip jumps.
//!
//! # Usage
//!
//! ```ignore
//! use segscroll_tui::paging::{PageAnimator, SlideOrigin};
//!
//! let mut animator = PageAnimator::new(config.ui.paging.clone());
//! animator.slide_to(2, SlideOrigin::Swipe);
//!
//! // In the main loop, advance the slide every frame
//! if let Some(finished) = animator.update() {
//!     // finished.index is the page the strip came to rest on
//! }
//! ```

mod animation;

pub use animation::{PageAnimator, SlideFinished, SlideOrigin};
