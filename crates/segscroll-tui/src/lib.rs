pub mod app;
pub mod event;
pub mod input;
pub mod keymap;
pub mod paging;
pub mod theme;
pub mod themes;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
pub use themes::{apply_segment_overrides, available_themes, load_theme, parse_hex_color};
