//! Value types shared by the planner and the backends.
//!
//! These structs describe *what* the geometry is, not *how* pixels get moved.
//! They are the vocabulary of a [`RenderPlan`](super::plan::RenderPlan):
//!
//! - [`Dimensions`]: a positive width/height pair.
//! - [`Point`]: a signed placement offset (content may overhang a canvas by a rounding pixel).
//! - [`CropRegion`]: a rectangle in the pixel space of the image it crops.
//! - [`Quality`]: output encoding quality (0–100, default 80). Clamped on construction.
//! - [`Color`]: an opaque sRGB colour parsed from `RRGGBB` / `RGB` hex.
//! - [`OutputFormat`]: output encoding, inferred from the output path's extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn area(self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1024x768`.
impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width: u32 = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
        let height: u32 = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("dimensions must be positive, got '{s}'"));
        }
        Ok(Self { width, height })
    }
}

/// A placement offset. Top-left origin, may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Rectangle in the pixel space of the image being cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Build a region from a signed start point, pulled back inside `bounds`.
    ///
    /// The size is capped to `bounds` first, then the origin is clamped so
    /// the region never extends past the right or bottom edge.
    pub fn within(start: Point, size: Dimensions, bounds: Dimensions) -> Self {
        let width = size.width.min(bounds.width);
        let height = size.height.min(bounds.height);
        let max_x = (bounds.width - width) as i64;
        let max_y = (bounds.height - height) as i64;
        Self {
            x: start.x.clamp(0, max_x) as u32,
            y: start.y.clamp(0, max_y) as u32,
            width,
            height,
        }
    }

    pub fn fits_within(self, bounds: Dimensions) -> bool {
        self.x as u64 + self.width as u64 <= bounds.width as u64
            && self.y as u64 + self.height as u64 <= bounds.height as u64
    }
}

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    /// Clamp a possibly out-of-range computed value into 0–100.
    pub fn saturating(value: i64) -> Self {
        Self(value.clamp(0, 100) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `RRGGBB` or `RGB`, with or without a leading `#`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| (n << 4) | n);
                Some(Self {
                    r: nibble(0)?,
                    g: nibble(1)?,
                    b: nibble(2)?,
                })
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self {
                    r: byte(0)?,
                    g: byte(2)?,
                    b: byte(4)?,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Output encoding, decided by the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
    Avif,
}

impl OutputFormat {
    /// Any extension starting with `jp` (jpg, jpeg, jpe) is JPEG-class.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if ext.starts_with("jp") {
            return Some(Self::Jpeg);
        }
        match ext.as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// JPEG cannot carry alpha and is the only format whose quality gets ramped.
    pub fn is_jpeg(self) -> bool {
        self == Self::Jpeg
    }
}
