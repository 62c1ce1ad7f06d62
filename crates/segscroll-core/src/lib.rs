pub mod bridge;
pub mod clamp;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geometry;
pub mod observer;
pub mod segmented;
pub mod surface;

pub use bridge::{PageView, SelectionBridge, TabStrip};
pub use clamp::{compute_collapse, ChildMotion, Collapse, ScrollDirection};
pub use config::{AppConfig, EasingType, PagingConfig};
pub use coordinator::{CoordinatorStats, ScrollCoordinator};
pub use error::{Error, Result};
pub use geometry::{HeaderGeometry, ScrollOffset};
pub use observer::{PositionObserver, Suppression};
pub use segmented::{LayoutHost, SegmentedScroll, SegmentedScrollConfig};
pub use surface::{OffsetChange, ScrollSurface, SurfaceHandle, SurfaceId};
