//! Offsets and header measurements shared by the engine.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scroll position of a surface. Only `y` drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub const ZERO: ScrollOffset = ScrollOffset { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset with `x = 0`
    pub const fn vertical(y: f64) -> Self {
        Self { x: 0.0, y }
    }

    /// Same `x`, different `y`
    pub fn with_y(self, y: f64) -> Self {
        Self { x: self.x, y }
    }
}

/// Measurements of the collapsible header.
///
/// Only constructible through [`HeaderGeometry::new`], which rejects negative,
/// non-finite or inconsistent values. Once built it never changes, so the
/// collapse range is known to be non-negative for the whole lifetime of the
/// view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeaderGeometry {
    expanded_height: f64,
    collapsed_offset_height: f64,
    top_spacing: f64,
    bottom_spacing: f64,
}

impl HeaderGeometry {
    pub fn new(
        expanded_height: f64,
        collapsed_offset_height: f64,
        top_spacing: f64,
        bottom_spacing: f64,
    ) -> Result<Self> {
        for (name, value) in [
            ("expanded_height", expanded_height),
            ("collapsed_offset_height", collapsed_offset_height),
            ("top_spacing", top_spacing),
            ("bottom_spacing", bottom_spacing),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidGeometry(format!("{} is not finite", name)));
            }
            if value < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if collapsed_offset_height > expanded_height {
            return Err(Error::InvalidGeometry(format!(
                "collapsed_offset_height ({}) exceeds expanded_height ({})",
                collapsed_offset_height, expanded_height
            )));
        }

        Ok(Self {
            expanded_height,
            collapsed_offset_height,
            top_spacing,
            bottom_spacing,
        })
    }

    /// Geometry for a view that has no header: the header shrinks to the
    /// collapsed offset height, leaving nothing to collapse.
    pub fn without_header(
        collapsed_offset_height: f64,
        top_spacing: f64,
        bottom_spacing: f64,
    ) -> Result<Self> {
        Self::new(
            collapsed_offset_height,
            collapsed_offset_height,
            top_spacing,
            bottom_spacing,
        )
    }

    pub fn expanded_height(&self) -> f64 {
        self.expanded_height
    }

    pub fn collapsed_offset_height(&self) -> f64 {
        self.collapsed_offset_height
    }

    pub fn top_spacing(&self) -> f64 {
        self.top_spacing
    }

    pub fn bottom_spacing(&self) -> f64 {
        self.bottom_spacing
    }

    /// Distance the header can shrink by. Always `>= 0`.
    pub fn collapse_range(&self) -> f64 {
        self.expanded_height - self.collapsed_offset_height
    }

    /// Height of the scrollable canvas for a viewport of `viewport_height`.
    pub fn content_height(&self, viewport_height: f64) -> f64 {
        let height = viewport_height + self.expanded_height
            - (self.top_spacing + self.bottom_spacing + self.collapsed_offset_height);
        height.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_range() {
        let geometry = HeaderGeometry::new(200.0, 136.0, 0.0, 0.0).unwrap();
        assert_eq!(geometry.collapse_range(), 64.0);
    }

    #[test]
    fn test_rejects_negative_values() {
        assert!(matches!(
            HeaderGeometry::new(-1.0, 0.0, 0.0, 0.0),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(HeaderGeometry::new(10.0, 0.0, -2.0, 0.0).is_err());
        assert!(HeaderGeometry::new(10.0, 0.0, 0.0, -0.5).is_err());
    }

    #[test]
    fn test_rejects_offset_above_height() {
        let err = HeaderGeometry::new(40.0, 60.0, 0.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(HeaderGeometry::new(f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert!(HeaderGeometry::new(f64::INFINITY, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_without_header_has_zero_range() {
        let geometry = HeaderGeometry::without_header(44.0, 0.0, 0.0).unwrap();
        assert_eq!(geometry.expanded_height(), 44.0);
        assert_eq!(geometry.collapse_range(), 0.0);
    }

    #[test]
    fn test_content_height() {
        let geometry = HeaderGeometry::new(200.0, 64.0, 20.0, 10.0).unwrap();
        // 600 + 200 - (20 + 10 + 64)
        assert_eq!(geometry.content_height(600.0), 706.0);
        assert_eq!(geometry.content_height(0.0), 106.0);
    }

    #[test]
    fn test_content_height_never_negative() {
        let geometry = HeaderGeometry::new(10.0, 10.0, 50.0, 50.0).unwrap();
        assert_eq!(geometry.content_height(20.0), 0.0);
    }

    #[test]
    fn test_offset_helpers() {
        let offset = ScrollOffset::new(3.0, 4.0).with_y(-2.0);
        assert_eq!(offset, ScrollOffset::new(3.0, -2.0));
        assert_eq!(ScrollOffset::vertical(5.0).x, 0.0);
    }
}
