//! Theme registry and loader
//!
//! Built-in palettes plus user colour overrides from `[ui.theme]` and
//! `[segment.colors]`.

mod dracula;
mod nord;

use ratatui::style::Color;
use segscroll_core::config::{SegmentColorOverrides, ThemeColorOverrides, ThemeConfig};
use tracing::warn;

use crate::theme::Theme;

/// Parse a hex color string into a ratatui Color
/// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        // Short form: RGB -> RRGGBB
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Load a theme by name from config
pub fn load_theme(config: &ThemeConfig) -> Theme {
    let base = match config.name.to_lowercase().as_str() {
        "gruvbox-dark" | "gruvbox" => Theme::default(),
        "dracula" => dracula::default(),
        "nord" => nord::default(),
        other => {
            warn!(theme = other, "Unknown theme, falling back to gruvbox-dark");
            Theme::default()
        }
    };

    apply_overrides(base, &config.colors)
}

/// Apply `[segment.colors]` on top of a loaded theme
pub fn apply_segment_overrides(mut theme: Theme, overrides: &SegmentColorOverrides) -> Theme {
    override_color(&mut theme.bg1, &overrides.background);
    override_color(&mut theme.title, &overrides.title);
    override_color(&mut theme.selected_title, &overrides.selected_title);
    override_color(&mut theme.indicator, &overrides.indicator);
    override_color(&mut theme.header, &overrides.header_background);
    theme
}

/// Apply user color overrides to a base theme
fn apply_overrides(mut theme: Theme, overrides: &ThemeColorOverrides) -> Theme {
    override_color(&mut theme.bg0, &overrides.bg0);
    override_color(&mut theme.bg1, &overrides.bg1);
    override_color(&mut theme.bg2, &overrides.bg2);
    override_color(&mut theme.fg0, &overrides.fg0);
    override_color(&mut theme.fg1, &overrides.fg1);
    override_color(&mut theme.accent, &overrides.accent);
    override_color(&mut theme.selection, &overrides.selection);
    override_color(&mut theme.error, &overrides.error);
    override_color(&mut theme.success, &overrides.success);
    override_color(&mut theme.warning, &overrides.warning);
    override_color(&mut theme.info, &overrides.info);
    theme
}

fn override_color(slot: &mut Color, hex: &Option<String>) {
    let Some(hex) = hex else {
        return;
    };
    match parse_hex_color(hex) {
        Some(color) => *slot = color,
        None => warn!(value = %hex, "Invalid colour override, ignoring"),
    }
}

/// Get list of available theme names
pub fn available_themes() -> Vec<&'static str> {
    vec!["gruvbox-dark", "dracula", "nord"]
}
