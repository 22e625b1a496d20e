use std::str::FromStr;

use palette::Srgb;

/// Colour in the `(r, g, b, alpha)` form fast2d shapes take.
pub type Rgba = (u8, u8, u8, f32);

pub const DEFAULT_TRACK_RGBA: Rgba = (51, 136, 255, 1.0);
pub const MARKER_RGBA: Rgba = (220, 53, 69, 1.0);
pub const MARKER_OUTLINE_RGBA: Rgba = (255, 255, 255, 1.0);

const SERIES_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Parses `#rrggbb` (or `#rgb`) into fast2d's colour tuple.
pub fn parse_hex(color: &str) -> Option<Rgba> {
    let rgb = Srgb::<u8>::from_str(color.trim()).ok()?;
    Some((rgb.red, rgb.green, rgb.blue, 1.0))
}

pub fn parse_hex_or(color: &str, fallback: Rgba) -> Rgba {
    parse_hex(color).unwrap_or(fallback)
}

/// Series colours cycle in catalog order.
pub fn series_color(index: usize) -> Rgba {
    parse_hex_or(SERIES_COLORS[index % SERIES_COLORS.len()], DEFAULT_TRACK_RGBA)
}

pub fn css(color: Rgba) -> String {
    let (r, g, b, a) = color;
    format!("rgba({}, {}, {}, {})", r, g, b, a)
}

/// Chart and panel colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub page: &'static str,
    pub panel: &'static str,
    pub text: &'static str,
    pub muted_text: &'static str,
    pub border: &'static str,
    pub plot_background: Rgba,
    pub plot_grid: Rgba,
}

const LIGHT: ThemeColors = ThemeColors {
    page: "rgb(245, 246, 248)",
    panel: "rgb(255, 255, 255)",
    text: "rgb(33, 37, 41)",
    muted_text: "rgb(108, 117, 125)",
    border: "rgb(222, 226, 230)",
    plot_background: (255, 255, 255, 1.0),
    plot_grid: (222, 226, 230, 1.0),
};

const DARK: ThemeColors = ThemeColors {
    page: "rgb(13, 13, 13)",
    panel: "rgb(33, 37, 41)",
    text: "rgb(248, 249, 250)",
    muted_text: "rgb(173, 181, 189)",
    border: "rgb(73, 80, 87)",
    plot_background: (45, 47, 50, 1.0),
    plot_grid: (65, 69, 75, 1.0),
};

pub fn theme(dark_mode: bool) -> ThemeColors {
    if dark_mode { DARK } else { LIGHT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_hex_colours() {
        assert_eq!(parse_hex("#ff0000"), Some((255, 0, 0, 1.0)));
        assert_eq!(parse_hex(" #3388ff "), Some((51, 136, 255, 1.0)));
        assert_eq!(parse_hex("#0f0"), Some((0, 255, 0, 1.0)));
        assert_eq!(parse_hex("teal-ish"), None);
        assert_eq!(parse_hex_or("nope", MARKER_RGBA), MARKER_RGBA);
    }

    #[test]
    fn default_track_colour_matches_shared_constant() {
        assert_eq!(parse_hex(shared::DEFAULT_TRACK_COLOR), Some(DEFAULT_TRACK_RGBA));
    }

    #[test]
    fn series_colours_cycle() {
        assert_eq!(series_color(0), series_color(SERIES_COLORS.len()));
        assert_ne!(series_color(0), series_color(1));
    }
}
