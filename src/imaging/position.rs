//! Nine-point anchors and placement of a content box inside a container.

use super::params::{Dimensions, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where content sits inside a larger container.
///
/// Parsed from the short tokens used by the `zc` and `far` options:
/// `c`, `tl`, `t`, `tr`, `l`, `r`, `bl`, `b`, `br`. Matching is
/// case-insensitive, `1` is an alias for center, and anything else
/// falls back to center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "tl" => Self::TopLeft,
            "t" => Self::Top,
            "tr" => Self::TopRight,
            "l" => Self::Left,
            "r" => Self::Right,
            "bl" => Self::BottomLeft,
            "b" => Self::Bottom,
            "br" => Self::BottomRight,
            // "c", "1" and anything unrecognised
            _ => Self::Center,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Center => "c",
            Self::TopLeft => "tl",
            Self::Top => "t",
            Self::TopRight => "tr",
            Self::Left => "l",
            Self::Right => "r",
            Self::BottomLeft => "bl",
            Self::Bottom => "b",
            Self::BottomRight => "br",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Top-left corner of `content` when anchored inside `container`.
///
/// Centered axes use truncating division, so an odd leftover pixel goes to
/// the right/bottom side. Content larger than the container yields negative
/// offsets rather than being clamped.
pub fn resolve(anchor: Anchor, container: Dimensions, content: Dimensions) -> Point {
    let dx = container.width as i64 - content.width as i64;
    let dy = container.height as i64 - content.height as i64;

    let (x, y) = match anchor {
        Anchor::Center => (dx / 2, dy / 2),
        Anchor::TopLeft => (0, 0),
        Anchor::Top => (dx / 2, 0),
        Anchor::TopRight => (dx, 0),
        Anchor::Left => (0, dy / 2),
        Anchor::Right => (dx, dy / 2),
        Anchor::BottomLeft => (0, dy),
        Anchor::Bottom => (dx / 2, dy),
        Anchor::BottomRight => (dx, dy),
    };
    Point::new(x, y)
}
