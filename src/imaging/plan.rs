//! Render plan resolution.
//!
//! [`Planner::resolve`] turns an image's native size plus a normalized
//! option set into a [`RenderPlan`]: every number a backend needs, decided
//! up front. The steps run in a fixed order:
//!
//! ```text
//! fill missing dimension → scale cap (both against the original)
//!     → source window → shrink into the window
//!     → cover-crop (zc + both dims) | contain (+ far canvas)
//!     → scale decision → background → cover-crop region → quality
//! ```
//!
//! A backend executes the plan as: sub-crop → scale → strip → sharpen →
//! background composite → cover-crop → save.

use super::calculations::{
    TargetBox, apply_scale, fill_missing_dimension, fit_within_source, ramp_quality,
    resolve_source_window, round_px,
};
use super::options::TransformOptions;
use super::params::{Color, CropRegion, Dimensions, OutputFormat, Point, Quality};
use super::position::{self, Anchor};
use serde::Serialize;

/// Canvas the processed image is pasted onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackgroundPlan {
    pub canvas: Dimensions,
    pub color: Color,
    /// 0 = transparent, 100 = opaque.
    pub opacity: u8,
    /// Top-left of the processed image on the canvas.
    pub paste_at: Point,
    /// The canvas is the requested box from fit-and-relocate, not a fill
    /// behind an image of the same size.
    pub relocated: bool,
}

/// Everything a backend needs to produce the output image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    /// Native size of the input.
    pub original: Dimensions,
    /// Window of the original to keep before anything else.
    pub source_sub_crop: Option<CropRegion>,
    /// Size of the image after the sub-crop (the original when there is none).
    pub source: Dimensions,
    /// Size asked for by `scale` before it was capped.
    pub requested: Option<Dimensions>,
    /// Box handed to the resample step.
    pub scale_to: Dimensions,
    /// Whether the resample step runs. When false the image keeps its source size.
    pub did_scale: bool,
    pub background: Option<BackgroundPlan>,
    /// Applied after scaling and compositing.
    pub cover_crop: Option<CropRegion>,
    pub final_dimensions: Dimensions,
    pub quality: Quality,
    pub strip_metadata: bool,
    pub sharpen: bool,
}

/// Branch output: where to resample to and what to do around it.
struct Geometry {
    scale_to: Dimensions,
    /// Crop start and box, relative to `scale_to`.
    cover: Option<(Point, Dimensions)>,
    /// Fit-and-relocate anchor and canvas.
    canvas: Option<(Anchor, Dimensions)>,
}

/// Resolves render plans. Holds the settings that are not per-request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    /// Used when `q` is not supplied.
    pub default_quality: Quality,
}

impl Planner {
    pub fn new(default_quality: Quality) -> Self {
        Self { default_quality }
    }

    /// Resolve a plan. Pure: the same inputs always give the same plan.
    pub fn resolve(
        &self,
        original: Dimensions,
        options: &TransformOptions,
        format: OutputFormat,
    ) -> RenderPlan {
        let requested_size = options.requested_size(original);

        let source_sub_crop = options
            .source_window
            .as_ref()
            .map(|window| resolve_source_window(original, window));
        let source = source_sub_crop.map(CropRegion::size).unwrap_or(original);

        // With no size requested the box is the window itself
        let fill_from = if requested_size.is_empty() {
            source
        } else {
            original
        };
        let target = fill_missing_dimension(fill_from, requested_size);
        let mut scaled = apply_scale(target, original, options.scale, options.allow_enlargement);

        // From here on the window is the source
        if source_sub_crop.is_some() && !options.allow_enlargement {
            let (width, height) =
                fit_within_source(scaled.target.width, scaled.target.height, source);
            scaled.target = TargetBox {
                width,
                height,
                ..scaled.target
            };
        }

        let geometry = match options.cover_crop {
            Some(anchor) if scaled.target.both_dims => {
                cover(scaled.target, source, anchor, options.allow_enlargement)
            }
            _ => contain(scaled.target, source, options.fit_anchor),
        };

        let did_scale = options.allow_enlargement
            || (geometry.scale_to.width < source.width && geometry.scale_to.height < source.height);
        let content = if did_scale { geometry.scale_to } else { source };

        let background = background(options, format, &geometry, content);
        let composed = background.map(|bg| bg.canvas).unwrap_or(content);

        let cover_crop = geometry
            .cover
            .map(|(start, size)| CropRegion::within(start, size, composed));
        let final_dimensions = cover_crop.map(CropRegion::size).unwrap_or(composed);

        let requested_area = scaled
            .requested
            .map(|(w, h)| w * h)
            .unwrap_or_else(|| geometry.scale_to.area());

        RenderPlan {
            original,
            source_sub_crop,
            source,
            requested: scaled
                .requested
                .map(|(w, h)| Dimensions::new(round_px(w), round_px(h))),
            scale_to: geometry.scale_to,
            did_scale,
            background,
            cover_crop,
            final_dimensions,
            quality: self.quality(options, format, did_scale, source.area() / requested_area),
            strip_metadata: options.strip,
            sharpen: options.sharpen(),
        }
    }

    /// Ramp toward `qmax` only for an unscaled JPEG with both `q` and `qmax`.
    fn quality(
        &self,
        options: &TransformOptions,
        format: OutputFormat,
        did_scale: bool,
        size_ratio: f64,
    ) -> Quality {
        match (options.quality, options.quality_max) {
            (Some(q), Some(ceiling))
                if !did_scale && format.is_jpeg() && !options.allow_enlargement =>
            {
                ramp_quality(q, ceiling, size_ratio)
            }
            (Some(q), _) => q,
            (None, _) => self.default_quality,
        }
    }
}

/// Cover-crop: resample so the box is fully covered, then crop the overflow.
fn cover(target: TargetBox, source: Dimensions, anchor: Anchor, allow_enlargement: bool) -> Geometry {
    let (w, h) = if allow_enlargement {
        (target.width, target.height)
    } else {
        fit_within_source(target.width, target.height, source)
    };

    let source_aspect = source.aspect();
    let crop = Dimensions::new(round_px(w), round_px(h));
    let scale_to = if h * source_aspect > w {
        // wider than the box: horizontal crop
        Dimensions::new(round_px(h * source_aspect), crop.height)
    } else if w / source_aspect > h {
        // taller than the box: vertical crop
        Dimensions::new(crop.width, round_px(w / source_aspect))
    } else {
        crop
    };

    Geometry {
        scale_to,
        cover: Some((position::resolve(anchor, scale_to, crop), crop)),
        canvas: None,
    }
}

/// Contain: shrink the non-binding axis to the source aspect. With `far` and
/// both dimensions supplied, the requested box becomes a canvas.
fn contain(target: TargetBox, source: Dimensions, fit_anchor: Option<Anchor>) -> Geometry {
    let source_aspect = source.aspect();
    let (mut w, mut h) = (target.width, target.height);
    let aspect = target.aspect();
    if aspect < source_aspect {
        h = w / source_aspect;
    } else if aspect > source_aspect {
        w = h * source_aspect;
    }

    let canvas = fit_anchor.filter(|_| target.both_dims).map(|anchor| {
        (
            anchor,
            Dimensions::new(round_px(target.width), round_px(target.height)),
        )
    });

    Geometry {
        scale_to: Dimensions::new(round_px(w), round_px(h)),
        cover: None,
        canvas,
    }
}

/// A canvas is needed for a fit-and-relocate box, or for a `bg` fill on a
/// format that can carry it (not JPEG).
fn background(
    options: &TransformOptions,
    format: OutputFormat,
    geometry: &Geometry,
    content: Dimensions,
) -> Option<BackgroundPlan> {
    let wants_fill = options.background.is_some() && !format.is_jpeg();
    if !wants_fill && geometry.canvas.is_none() {
        return None;
    }

    let fill = options.background.unwrap_or_default();
    let (anchor, canvas) = geometry
        .canvas
        .unwrap_or((Anchor::Center, geometry.scale_to));
    Some(BackgroundPlan {
        canvas,
        color: fill.color,
        opacity: fill.opacity,
        paste_at: position::resolve(anchor, canvas, content),
        relocated: geometry.canvas.is_some(),
    })
}
