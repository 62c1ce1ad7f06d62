//! Offset clamping for the header-collapse phase.
//!
//! Pure arithmetic. Given the parent's offset, one child change and the
//! collapse range, decide whether the parent absorbs the delta. When it does,
//! the child is pinned back to where it was so the header, not the content,
//! appears to move.

use crate::geometry::ScrollOffset;

/// Direction of a child change, from `delta = old.y - new.y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// `delta > 0`: the parent offset grows (header collapses)
    Up,
    /// `delta <= 0`: the parent offset shrinks (header re-expands)
    Down,
}

impl ScrollDirection {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        }
    }
}

/// Old and new offset of the child that emitted a change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildMotion {
    pub old: ScrollOffset,
    pub new: ScrollOffset,
}

impl ChildMotion {
    pub fn new(old: ScrollOffset, new: ScrollOffset) -> Self {
        Self { old, new }
    }

    #[inline]
    pub fn delta(&self) -> f64 {
        self.old.y - self.new.y
    }

    pub fn direction(&self) -> ScrollDirection {
        ScrollDirection::of(self.delta())
    }
}

/// Outcome of clamping one child change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collapse {
    /// Leave both surfaces alone; the child scrolls natively
    NoIntervention,
    /// Move the parent to `parent_y` and pin the child at `residual`
    Intervene { parent_y: f64, residual: ScrollOffset },
}

impl Collapse {
    pub fn is_intervention(&self) -> bool {
        matches!(self, Collapse::Intervene { .. })
    }
}

/// Route `motion` to [`scroll_up`] or [`scroll_down`] by its direction.
pub fn compute_collapse(parent_y: f64, motion: ChildMotion, range: f64) -> Collapse {
    match motion.direction() {
        ScrollDirection::Up => scroll_up(parent_y, motion, range),
        ScrollDirection::Down => scroll_down(parent_y, motion, range),
    }
}

/// Collapse branch.
///
/// Applies only while the child rubber-bands above its top (`new.y < 0`) and
/// the parent can still grow.
pub fn scroll_up(parent_y: f64, motion: ChildMotion, range: f64) -> Collapse {
    let delta = motion.delta();
    if !inputs_usable(parent_y, motion, range) || delta <= 0.0 {
        return Collapse::NoIntervention;
    }

    if motion.new.y >= 0.0 || parent_y >= range {
        return Collapse::NoIntervention;
    }

    Collapse::Intervene {
        parent_y: (parent_y + delta).clamp(0.0, range),
        residual: motion.old,
    }
}

/// Re-expand branch.
///
/// Applies only while the header is not fully expanded (`parent_y > 0`) and
/// the child has not scrolled above its own top (`new.y >= 0`).
pub fn scroll_down(parent_y: f64, motion: ChildMotion, range: f64) -> Collapse {
    let delta = motion.delta();
    if !inputs_usable(parent_y, motion, range) || delta >= 0.0 {
        return Collapse::NoIntervention;
    }

    if motion.new.y < 0.0 || parent_y <= 0.0 {
        return Collapse::NoIntervention;
    }

    Collapse::Intervene {
        parent_y: (parent_y + delta).clamp(0.0, range),
        residual: motion.old,
    }
}

fn inputs_usable(parent_y: f64, motion: ChildMotion, range: f64) -> bool {
    range > 0.0
        && range.is_finite()
        && parent_y.is_finite()
        && motion.old.y.is_finite()
        && motion.new.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(old: f64, new: f64) -> ChildMotion {
        ChildMotion::new(ScrollOffset::vertical(old), ScrollOffset::vertical(new))
    }

    fn parent_after(collapse: Collapse) -> f64 {
        match collapse {
            Collapse::Intervene { parent_y, .. } => parent_y,
            Collapse::NoIntervention => panic!("expected an intervention"),
        }
    }

    #[test]
    fn test_rubber_band_collapses_header() {
        let collapse = compute_collapse(0.0, motion(0.0, -20.0), 64.0);
        assert_eq!(
            collapse,
            Collapse::Intervene {
                parent_y: 20.0,
                residual: ScrollOffset::vertical(0.0),
            }
        );
    }

    #[test]
    fn test_collapse_clamps_to_range() {
        let collapse = compute_collapse(20.0, motion(0.0, -50.0), 64.0);
        assert_eq!(parent_after(collapse), 64.0);
    }

    #[test]
    fn test_idempotent_at_upper_bound() {
        for delta in [1.0, 5.0, 64.0, 1000.0] {
            let collapse = scroll_up(64.0, motion(0.0, -delta), 64.0);
            assert_eq!(collapse, Collapse::NoIntervention);
        }
    }

    #[test]
    fn test_conservation_within_range() {
        let mut parent_y = 10.0;
        for delta in [1.0, 7.5, 20.0, 25.5] {
            assert!(delta <= 64.0 - parent_y);
            let before = ScrollOffset::new(3.0, -1.0);
            let after = ScrollOffset::new(3.0, -1.0 - delta);
            match scroll_up(parent_y, ChildMotion::new(before, after), 64.0) {
                Collapse::Intervene { parent_y: next, residual } => {
                    assert_eq!(next, parent_y + delta);
                    assert_eq!(residual, before);
                    parent_y = next;
                }
                Collapse::NoIntervention => panic!("delta {} should be absorbed", delta),
            }
        }
        assert_eq!(parent_y, 64.0);
    }

    #[test]
    fn test_symmetry() {
        let range = 64.0;
        let deltas = [12.0, 30.0, 22.0];
        let mut parent_y = 0.0;

        for delta in deltas {
            parent_y = parent_after(scroll_up(parent_y, motion(0.0, -delta), range));
        }
        assert_eq!(parent_y, 64.0);

        for delta in deltas.iter().rev() {
            parent_y = parent_after(scroll_down(parent_y, motion(0.0, *delta), range));
        }
        assert_eq!(parent_y, 0.0);
    }

    #[test]
    fn test_child_mid_scroll_is_left_alone() {
        // Child scrolling back toward its top but still inside its content
        assert_eq!(
            compute_collapse(10.0, motion(40.0, 30.0), 64.0),
            Collapse::NoIntervention
        );
    }

    #[test]
    fn test_scroll_down_requires_child_at_or_below_top() {
        assert_eq!(
            scroll_down(30.0, motion(-10.0, -5.0), 64.0),
            Collapse::NoIntervention
        );
        assert!(scroll_down(30.0, motion(-5.0, 0.0), 64.0).is_intervention());
    }

    #[test]
    fn test_scroll_down_at_expanded_header_is_native() {
        assert_eq!(
            scroll_down(0.0, motion(0.0, 15.0), 64.0),
            Collapse::NoIntervention
        );
    }

    #[test]
    fn test_scroll_down_floors_at_zero() {
        let collapse = scroll_down(5.0, motion(10.0, 40.0), 64.0);
        assert_eq!(
            collapse,
            Collapse::Intervene {
                parent_y: 0.0,
                residual: ScrollOffset::vertical(10.0),
            }
        );
    }

    #[test]
    fn test_zero_range_never_intervenes() {
        assert_eq!(
            compute_collapse(0.0, motion(0.0, -20.0), 0.0),
            Collapse::NoIntervention
        );
        assert_eq!(
            compute_collapse(0.0, motion(0.0, 20.0), 0.0),
            Collapse::NoIntervention
        );
    }

    #[test]
    fn test_zero_delta_never_intervenes() {
        assert_eq!(
            compute_collapse(10.0, motion(-3.0, -3.0), 64.0),
            Collapse::NoIntervention
        );
        assert_eq!(
            compute_collapse(10.0, motion(5.0, 5.0), 64.0),
            Collapse::NoIntervention
        );
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        assert_eq!(
            compute_collapse(f64::NAN, motion(0.0, -5.0), 64.0),
            Collapse::NoIntervention
        );
        assert_eq!(
            compute_collapse(0.0, motion(0.0, f64::NEG_INFINITY), 64.0),
            Collapse::NoIntervention
        );
    }

    #[test]
    fn test_direction() {
        assert_eq!(motion(0.0, -1.0).direction(), ScrollDirection::Up);
        assert_eq!(motion(0.0, 1.0).direction(), ScrollDirection::Down);
        assert_eq!(motion(2.0, 2.0).direction(), ScrollDirection::Down);
    }
}
