//! Fixed cyclic palettes for colour, line dash and marker shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Shared colour of muted series.
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#rrggbb` or one of `gray`, `grey`, `orange`, `red`, `blue`, `black`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => return Ok(Color::GRAY),
            "orange" => return Ok(Color::ORANGE),
            "red" => return Ok(Color::RED),
            "blue" => return Ok(Color::BLUE),
            "black" => return Ok(Color::BLACK),
            _ => {}
        }
        let hex = s
            .trim()
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| format!("invalid colour '{s}' (expected #rrggbb or a colour name)"))?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.hex()
    }
}

/// tab10 followed by tab20.
pub const COLORS: [Color; 30] = [
    // tab10
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
    // tab20
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xae, 0xc7, 0xe8),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0xff, 0xbb, 0x78),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0x98, 0xdf, 0x8a),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0xff, 0x98, 0x96),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0xc5, 0xb0, 0xd5),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xc4, 0x9c, 0x94),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0xf7, 0xb6, 0xd2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xc7, 0xc7, 0xc7),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0xdb, 0xdb, 0x8d),
    Color::rgb(0x17, 0xbe, 0xcf),
    Color::rgb(0x9e, 0xda, 0xe5),
];

/// Line dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    /// Conventional one-glyph token (`-`, `--`, `-.`, `:`).
    pub fn token(&self) -> &'static str {
        match self {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::DashDot => "-.",
            LineStyle::Dotted => ":",
        }
    }

    /// Alternating on/off lengths in pixels, empty for a solid line.
    pub fn dash_pattern(&self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[6.0, 4.0],
            LineStyle::DashDot => &[8.0, 3.0, 2.0, 3.0],
            LineStyle::Dotted => &[2.0, 3.0],
        }
    }
}

pub const LINES: [LineStyle; 4] = [
    LineStyle::Solid,
    LineStyle::Dashed,
    LineStyle::DashDot,
    LineStyle::Dotted,
];

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerShape {
    Circle,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Star,
    Hexagon,
    HexagonFlat,
    Cross,
    Plus,
}

impl MarkerShape {
    /// Conventional one-glyph token.
    pub fn token(&self) -> &'static str {
        match self {
            MarkerShape::Circle => "o",
            MarkerShape::Square => "s",
            MarkerShape::Diamond => "D",
            MarkerShape::TriangleUp => "^",
            MarkerShape::TriangleDown => "v",
            MarkerShape::TriangleLeft => "<",
            MarkerShape::TriangleRight => ">",
            MarkerShape::Pentagon => "p",
            MarkerShape::Star => "*",
            MarkerShape::Hexagon => "h",
            MarkerShape::HexagonFlat => "H",
            MarkerShape::Cross => "x",
            MarkerShape::Plus => "+",
        }
    }

    /// Whether the shape is drawn as strokes rather than a filled outline.
    pub fn is_stroked(&self) -> bool {
        matches!(self, MarkerShape::Cross | MarkerShape::Plus)
    }
}

pub const MARKERS: [MarkerShape; 13] = [
    MarkerShape::Circle,
    MarkerShape::Square,
    MarkerShape::Diamond,
    MarkerShape::TriangleUp,
    MarkerShape::TriangleDown,
    MarkerShape::TriangleLeft,
    MarkerShape::TriangleRight,
    MarkerShape::Pentagon,
    MarkerShape::Star,
    MarkerShape::Hexagon,
    MarkerShape::HexagonFlat,
    MarkerShape::Cross,
    MarkerShape::Plus,
];
