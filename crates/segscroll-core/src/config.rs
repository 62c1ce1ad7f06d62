use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geometry::HeaderGeometry;
use crate::segmented::SegmentedScrollConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Collapsible header geometry, in terminal rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Show a header at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Header height when fully expanded
    #[serde(default = "default_expanded_height")]
    pub expanded_height: f64,
    /// Header height left visible when fully collapsed
    #[serde(default = "default_collapsed_offset")]
    pub collapsed_offset: f64,
    /// Spacing above the header
    #[serde(default)]
    pub top_spacing: f64,
    /// Spacing below the segment pages
    #[serde(default)]
    pub bottom_spacing: f64,
    /// Let a page be pulled past its top. Pulling is what collapses the
    /// header, so with this off only the segment bar stays interactive.
    #[serde(default = "default_true")]
    pub bounces: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            expanded_height: default_expanded_height(),
            collapsed_offset: default_collapsed_offset(),
            top_spacing: 0.0,
            bottom_spacing: 0.0,
            bounces: default_true(),
        }
    }
}

/// Segment bar appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Bar height, including the selected indicator
    #[serde(default = "default_segment_height")]
    pub height: f64,
    /// Rows used by the selected indicator (0 hides it)
    #[serde(default = "default_indicator_height")]
    pub selected_indicator_height: u16,
    /// Render titles in bold
    #[serde(default)]
    pub title_bold: bool,
    /// Draw a shadow line under the bar
    #[serde(default = "default_true")]
    pub shadow: bool,
    /// Optional colour overrides
    #[serde(default)]
    pub colors: SegmentColorOverrides,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            height: default_segment_height(),
            selected_indicator_height: default_indicator_height(),
            title_bold: false,
            shadow: default_true(),
            colors: SegmentColorOverrides::default(),
        }
    }
}

/// Each colour is a hex string (e.g., "#ff0000" or "ff0000")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentColorOverrides {
    /// Bar background
    pub background: Option<String>,
    /// Unselected title colour
    pub title: Option<String>,
    /// Selected title colour
    pub selected_title: Option<String>,
    /// Selected indicator colour
    pub indicator: Option<String>,
    /// Header background
    pub header_background: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Theme configuration
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Horizontal paging animation
    #[serde(default)]
    pub paging: PagingConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: ThemeConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

/// Easing curve for the page slide
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump at the end
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    /// Exponential ease-out
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Slide between pages instead of jumping
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Slide duration in milliseconds
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Redraw rate while sliding
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

/// Theme configuration
/// Can be specified as a simple string (theme name) or as a full struct with overrides
#[derive(Debug, Clone, Serialize)]
pub struct ThemeConfig {
    /// Theme name (e.g., "gruvbox-dark", "nord")
    pub name: String,
    /// Optional color overrides for semantic colors
    pub colors: ThemeColorOverrides,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            colors: ThemeColorOverrides::default(),
        }
    }
}

// Custom deserializer to accept either a string or a struct
impl<'de> Deserialize<'de> for ThemeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        use std::fmt;

        struct ThemeConfigVisitor;

        impl<'de> Visitor<'de> for ThemeConfigVisitor {
            type Value = ThemeConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a theme name or a table with 'name' and optional 'colors'")
            }

            fn visit_str<E>(self, value: &str) -> Result<ThemeConfig, E>
            where
                E: de::Error,
            {
                Ok(ThemeConfig {
                    name: value.to_string(),
                    colors: ThemeColorOverrides::default(),
                })
            }

            fn visit_map<M>(self, mut map: M) -> Result<ThemeConfig, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut name: Option<String> = None;
                let mut colors: Option<ThemeColorOverrides> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "name" => name = Some(map.next_value()?),
                        "colors" => colors = Some(map.next_value()?),
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(ThemeConfig {
                    name: name.unwrap_or_else(default_theme_name),
                    colors: colors.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_any(ThemeConfigVisitor)
    }
}

fn default_theme_name() -> String {
    "gruvbox-dark".to_string()
}

/// Optional color overrides for theme customization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeColorOverrides {
    /// Primary background
    pub bg0: Option<String>,
    /// Secondary background (slightly lighter)
    pub bg1: Option<String>,
    /// Tertiary background (selection, highlights)
    pub bg2: Option<String>,
    /// Primary foreground
    pub fg0: Option<String>,
    /// Secondary foreground (slightly dimmer)
    pub fg1: Option<String>,
    /// Accent color
    pub accent: Option<String>,
    /// Selection background
    pub selection: Option<String>,
    /// Error color
    pub error: Option<String>,
    /// Success color
    pub success: Option<String>,
    /// Warning color
    pub warning: Option<String>,
    /// Info color
    pub info: Option<String>,
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "<S-Tab>", "<CR>" (Enter), "<Esc>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,

    // Scrolling the visible page
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,

    // Segment switching
    /// Tap the next tab
    #[serde(default = "default_key_next_segment")]
    pub next_segment: String,
    /// Tap the previous tab
    #[serde(default = "default_key_prev_segment")]
    pub prev_segment: String,
    /// Swipe the pager to the next page
    #[serde(default = "default_key_swipe_next")]
    pub swipe_next: String,
    /// Swipe the pager to the previous page
    #[serde(default = "default_key_swipe_prev")]
    pub swipe_prev: String,

    /// Show or hide the key help line
    #[serde(default = "default_key_toggle_help")]
    pub toggle_help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            next_segment: default_key_next_segment(),
            prev_segment: default_key_prev_segment(),
            swipe_next: default_key_swipe_next(),
            swipe_prev: default_key_swipe_prev(),
            toggle_help: default_key_toggle_help(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_next_segment() -> String { "<Tab>".to_string() }
fn default_key_prev_segment() -> String { "<S-Tab>".to_string() }
fn default_key_swipe_next() -> String { "l".to_string() }
fn default_key_swipe_prev() -> String { "h".to_string() }
fn default_key_toggle_help() -> String { "?".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("segscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_expanded_height() -> f64 {
    8.0
}

fn default_collapsed_offset() -> f64 {
    2.0
}

fn default_segment_height() -> f64 {
    2.0
}

fn default_indicator_height() -> u16 {
    1
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_duration() -> u64 {
    150
}

fn default_animation_fps() -> u32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    ///
    /// A file whose geometry cannot build a view is rejected here rather than
    /// at startup of the view.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml(&content)?;
            tracing::debug!(path = %config_path.display(), "Loaded configuration");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.segmented_config()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/segscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("segscroll")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file written while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("segscroll.log")
    }

    /// Header geometry described by `[header]`
    pub fn header_geometry(&self) -> crate::Result<HeaderGeometry> {
        let header = &self.header;
        if header.enabled {
            HeaderGeometry::new(
                header.expanded_height,
                header.collapsed_offset,
                header.top_spacing,
                header.bottom_spacing,
            )
        } else {
            HeaderGeometry::without_header(
                header.collapsed_offset,
                header.top_spacing,
                header.bottom_spacing,
            )
        }
    }

    /// Validated engine configuration
    pub fn segmented_config(&self) -> crate::Result<SegmentedScrollConfig> {
        SegmentedScrollConfig::new(self.header_geometry()?, self.segment.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build_a_view() {
        let config = AppConfig::default();
        let segmented = config.segmented_config().unwrap();
        assert_eq!(segmented.geometry().collapse_range(), 6.0);
        assert_eq!(segmented.segment_height(), 2.0);
        assert_eq!(config.ui.paging.easing, EasingType::Cubic);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [header]
            expanded_height = 12.0

            [ui]
            theme = "nord"

            [ui.paging]
            easing = "ease_out"
            "#,
        )
        .unwrap();

        assert_eq!(config.header.expanded_height, 12.0);
        assert_eq!(config.header.collapsed_offset, 2.0);
        assert_eq!(config.ui.theme.name, "nord");
        assert_eq!(config.ui.paging.easing, EasingType::EaseOut);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_theme_table_form() {
        let config = AppConfig::from_toml(
            r##"
            [ui.theme]
            name = "dracula"
            colors = { accent = "#ff0000" }
            "##,
        )
        .unwrap();

        assert_eq!(config.ui.theme.name, "dracula");
        assert_eq!(config.ui.theme.colors.accent.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [header]
            expanded_height = 2.0
            collapsed_offset = 5.0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_disabled_header_has_no_range() {
        let mut config = AppConfig::default();
        config.header.enabled = false;
        assert_eq!(config.header_geometry().unwrap().collapse_range(), 0.0);
    }

    #[test]
    fn test_bounces_defaults_on() {
        assert!(AppConfig::default().header.bounces);
        let config = AppConfig::from_toml(
            r#"
            [header]
            bounces = false
            "#,
        )
        .unwrap();
        assert!(!config.header.bounces);
    }

    #[test]
    fn test_toml_round_trip_keeps_keymap() {
        let mut config = AppConfig::default();
        config.keymap.swipe_next = "<C-l>".to_string();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.keymap.swipe_next, "<C-l>");
    }
}
