// Cell background colors: an opacity ramp over one hue per sign.

use std::fmt;

use courtside_core::config::{parse_hex_rgb, ColorConfig};
use tracing::warn;

use crate::stats::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// How a column's values map to color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    None,
    /// Alpha grows from `min` to `max`.
    Monotonic,
    /// Zero is transparent; each sign scales against its own side of the
    /// range.
    Diverging,
}

/// Colors used for positive (and monotonic) and negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub positive: Rgb,
    pub negative: Rgb,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        positive: Rgb::new(0x09, 0x73, 0x4E),
        negative: Rgb::new(0x7D, 0x2C, 0x2D),
    };

    /// Build from hex strings. An unparseable string falls back to the
    /// matching default color.
    pub fn from_hex(positive: &str, negative: &str) -> Self {
        let pick = |hex: &str, fallback: Rgb| match parse_hex_rgb(hex) {
            Some((r, g, b)) => Rgb::new(r, g, b),
            None => {
                warn!("invalid color {:?}, using default", hex);
                fallback
            }
        };
        Palette {
            positive: pick(positive, Self::DEFAULT.positive),
            negative: pick(negative, Self::DEFAULT.negative),
        }
    }

    pub fn from_config(colors: &ColorConfig) -> Self {
        Self::from_hex(&colors.positive, &colors.negative)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A computed cell background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellColor {
    Transparent,
    Rgba(Rgb, f64),
}

impl CellColor {
    fn with_alpha(rgb: Rgb, alpha: f64) -> Self {
        CellColor::Rgba(rgb, alpha.clamp(0.0, 1.0))
    }

    /// Opacity, 0 for transparent.
    pub fn alpha(&self) -> f64 {
        match self {
            CellColor::Transparent => 0.0,
            CellColor::Rgba(_, a) => *a,
        }
    }

    /// Composite over an opaque background color.
    pub fn blend_over(&self, background: Rgb) -> Rgb {
        match *self {
            CellColor::Transparent => background,
            CellColor::Rgba(c, a) => {
                let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
                Rgb::new(mix(c.r, background.r), mix(c.g, background.g), mix(c.b, background.b))
            }
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellColor::Transparent => write!(f, "transparent"),
            CellColor::Rgba(c, a) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, a),
        }
    }
}

/// Map a value to a background color.
pub fn scale(value: Option<f64>, range: Range, mode: ColorMode, palette: &Palette) -> CellColor {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return CellColor::Transparent;
    };
    let Range { min, max } = range;
    match mode {
        ColorMode::None => CellColor::Transparent,
        ColorMode::Monotonic => {
            if !(max > min) {
                return CellColor::Transparent;
            }
            let t = ((v - min) / (max - min)).clamp(0.0, 1.0);
            CellColor::with_alpha(palette.positive, t)
        }
        ColorMode::Diverging => {
            if v == 0.0 {
                return CellColor::Transparent;
            }
            if v > 0.0 {
                let pos = max.max(0.0);
                let a = if pos > 0.0 { (v / pos).min(1.0) } else { 0.0 };
                CellColor::with_alpha(palette.positive, a)
            } else {
                let neg = min.min(0.0).abs();
                let a = if neg > 0.0 { (v.abs() / neg).min(1.0) } else { 0.0 };
                CellColor::with_alpha(palette.negative, a)
            }
        }
    }
}
