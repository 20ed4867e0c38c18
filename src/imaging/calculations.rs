//! Pure calculation functions for target dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Boxes stay in `f64` until a branch of the planner commits to integer
//! pixels, so aspect ratios survive the intermediate steps unrounded.

use super::options::{SizeRequest, SourceWindow};
use super::params::{CropRegion, Dimensions, Quality};

/// A target box that may still carry fractional pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBox {
    pub width: f64,
    pub height: f64,
    /// Both dimensions were supplied by the caller rather than derived.
    pub both_dims: bool,
}

impl TargetBox {
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }
}

/// Round a fractional extent to whole pixels, never below one.
pub(crate) fn round_px(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

/// Fill in a missing target dimension from the source aspect ratio.
///
/// # Examples
/// ```
/// # use resizer::imaging::calculations::fill_missing_dimension;
/// # use resizer::imaging::options::SizeRequest;
/// # use resizer::imaging::Dimensions;
/// let target = fill_missing_dimension(
///     Dimensions::new(800, 600),
///     SizeRequest { width: Some(400.0), height: None },
/// );
/// assert_eq!((target.width, target.height), (400.0, 300.0));
/// assert!(!target.both_dims);
/// ```
pub fn fill_missing_dimension(source: Dimensions, requested: SizeRequest) -> TargetBox {
    let aspect = source.aspect();
    let (width, height, both_dims) = match (requested.width, requested.height) {
        (Some(w), Some(h)) => (w, h, true),
        (Some(w), None) => (w, w / aspect, false),
        (None, Some(h)) => (h * aspect, h, false),
        (None, None) => (source.width as f64, source.height as f64, false),
    };
    TargetBox {
        width,
        height,
        both_dims,
    }
}

/// Result of applying the `scale` option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub target: TargetBox,
    /// The factor actually applied.
    pub factor: f64,
    /// `target × requested factor` before capping, kept for quality ramping.
    /// Only recorded when enlargement is disallowed.
    pub requested: Option<(f64, f64)>,
}

/// Apply a uniform scale factor, capped so the box never grows past the
/// source unless enlargement is allowed.
///
/// When the box is already at or above the source size on either axis the
/// factor is forced to 1.
pub fn apply_scale(
    target: TargetBox,
    source: Dimensions,
    scale: Option<f64>,
    allow_enlargement: bool,
) -> Scaled {
    let Some(mut factor) = scale else {
        return Scaled {
            target,
            factor: 1.0,
            requested: None,
        };
    };

    let mut requested = None;
    if !allow_enlargement {
        let height_cap = source.height as f64 / target.height;
        let width_cap = source.width as f64 / target.width;
        requested = Some((target.width * factor, target.height * factor));
        factor = if height_cap > 1.0 && width_cap > 1.0 {
            factor.min(height_cap).min(width_cap)
        } else {
            1.0
        };
    }

    Scaled {
        target: TargetBox {
            width: target.width * factor,
            height: target.height * factor,
            ..target
        },
        factor,
        requested,
    }
}

/// Resolve the source sub-window against the original image.
///
/// Per axis: a size below 1 is a fraction of the original extent, 1 and up
/// is pixels, and zero, absent or oversized means the full extent. An absent
/// start centers the window; a present one follows the same fraction/pixel
/// rule (fractions against the original extent) and is pulled back so the
/// window never passes the far edge.
pub fn resolve_source_window(original: Dimensions, window: &SourceWindow) -> CropRegion {
    let width = window_extent(window.width, original.width);
    let height = window_extent(window.height, original.height);
    CropRegion {
        x: window_start(window.x, original.width, width),
        y: window_start(window.y, original.height, height),
        width,
        height,
    }
}

fn fraction_or_pixels(value: f64, extent: u32) -> f64 {
    if value < 1.0 {
        (extent as f64 * value).round()
    } else {
        value.round()
    }
}

fn window_extent(value: Option<f64>, extent: u32) -> u32 {
    match value {
        Some(v) if v > 0.0 && v <= extent as f64 => {
            (fraction_or_pixels(v, extent) as u32).clamp(1, extent)
        }
        _ => extent,
    }
}

fn window_start(value: Option<f64>, extent: u32, span: u32) -> u32 {
    let room = extent - span;
    match value {
        None => room / 2,
        Some(v) => (fraction_or_pixels(v, extent) as u32).min(room),
    }
}

/// Shrink a box that overflows the source, keeping the box's own aspect.
///
/// The overflowing axis is pinned to the source extent and the other axis
/// recomputed from the requested aspect.
pub fn fit_within_source(width: f64, height: f64, source: Dimensions) -> (f64, f64) {
    let aspect = width / height;
    let (mut w, mut h) = (width, height);
    if w > source.width as f64 {
        h = source.width as f64 / aspect;
        w = source.width as f64;
    }
    if h > source.height as f64 {
        w = source.height as f64 * aspect;
        h = source.height as f64;
    }
    (w, h)
}

/// Raise quality toward `ceiling` for an undersized source.
///
/// `size_ratio` is source area over requested area. Above one half, quality
/// climbs linearly as the ratio falls; at or below one half it jumps to the
/// ceiling.
pub fn ramp_quality(quality: Quality, ceiling: Quality, size_ratio: f64) -> Quality {
    if size_ratio > 0.5 {
        let gap = ceiling.value() as f64 - quality.value() as f64;
        let bump = (gap * (1.0 - size_ratio) * 2.0).round() as i64;
        Quality::saturating(quality.value() as i64 + bump)
    } else {
        ceiling
    }
}
