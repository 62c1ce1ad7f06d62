mod header;
mod help;
mod page;
mod segment_bar;
mod status_bar;

pub use header::HeaderWidget;
pub use help::HelpWidget;
pub use page::PageWidget;
pub use segment_bar::SegmentBarWidget;
pub use status_bar::StatusBarWidget;
