//! Render-plan properties checked through the public API.
//!
//! These run the planner only; no image is decoded or written.

use resizer::imaging::calculations::{apply_scale, fill_missing_dimension, ramp_quality};
use resizer::imaging::options::SizeRequest;
use resizer::imaging::position::resolve;
use resizer::imaging::{
    Anchor, CropRegion, Dimensions, OutputFormat, Planner, Point, Quality, RawOptions, RenderPlan,
    normalize,
};

const SOURCES: &[(u32, u32)] = &[
    (800, 600),
    (600, 800),
    (1000, 500),
    (1234, 567),
    (97, 1301),
    (640, 640),
];

fn plan(original: (u32, u32), raw: &RawOptions, format: OutputFormat) -> RenderPlan {
    let (options, warnings) = normalize(raw);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    Planner::new(Quality::default()).resolve(
        Dimensions::new(original.0, original.1),
        &options,
        format,
    )
}

fn boxes_within(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut boxes = Vec::new();
    for w in [1, 7, width / 3, width / 2, width - 1, width] {
        for h in [1, 13, height / 4, height / 2, height - 1, height] {
            boxes.push((w.max(1), h.max(1)));
        }
    }
    boxes
}

// =========================================================================
// Missing dimension
// =========================================================================

#[test]
fn missing_dimension_preserves_original_aspect() {
    for &(width, height) in SOURCES {
        let source = Dimensions::new(width, height);
        for w in [1.0, 10.0, 99.0, width as f64 / 3.0, width as f64 * 2.0] {
            let target = fill_missing_dimension(
                source,
                SizeRequest {
                    width: Some(w),
                    height: None,
                },
            );
            assert!((target.aspect() - source.aspect()).abs() < 1e-9);
        }
    }
}

#[test]
fn width_only_plan_keeps_aspect_within_rounding() {
    for &(width, height) in SOURCES {
        let aspect = width as f64 / height as f64;
        for w in [2, 17, width / 4, width / 2] {
            let plan = plan(
                (width, height),
                &RawOptions::new().with("w", w),
                OutputFormat::Jpeg,
            );
            let expected_height = w as f64 / aspect;
            assert_eq!(plan.final_dimensions.width, w);
            assert!(
                (plan.final_dimensions.height as f64 - expected_height.max(1.0)).abs() <= 0.5,
                "{width}x{height} w={w}: got {}",
                plan.final_dimensions
            );
        }
    }
}

// =========================================================================
// Cover-crop
// =========================================================================

#[test]
fn cover_crop_output_matches_requested_box() {
    for &(width, height) in SOURCES {
        for (w, h) in boxes_within(width, height) {
            for anchor in ["c", "tl", "br", "t", "l"] {
                let raw = RawOptions::new()
                    .with("w", w)
                    .with("h", h)
                    .with("zc", anchor);
                let plan = plan((width, height), &raw, OutputFormat::Jpeg);
                assert_eq!(
                    plan.final_dimensions,
                    Dimensions::new(w, h),
                    "{width}x{height} box {w}x{h} zc={anchor}"
                );
                let crop = plan.cover_crop.unwrap();
                let composed = if plan.did_scale {
                    plan.scale_to
                } else {
                    plan.source
                };
                assert!(crop.fits_within(composed), "{crop:?} escapes {composed}");
            }
        }
    }
}

// =========================================================================
// Fit-and-relocate
// =========================================================================

#[test]
fn far_canvas_matches_requested_box() {
    for &(width, height) in SOURCES {
        let aspect = width as f64 / height as f64;
        for (w, h) in boxes_within(width, height) {
            let raw = RawOptions::new().with("w", w).with("h", h).with("far", "c");
            let plan = plan((width, height), &raw, OutputFormat::Png);

            let bg = plan.background.unwrap();
            assert_eq!(bg.canvas, Dimensions::new(w, h));
            assert_eq!(plan.final_dimensions, Dimensions::new(w, h));
            assert!(bg.relocated);

            let content = if plan.did_scale {
                plan.scale_to
            } else {
                plan.source
            };
            // inner content keeps the source aspect; only the derived axis is rounded
            let (cw, ch) = (content.width as f64, content.height as f64);
            assert!(
                (cw - ch * aspect).abs() <= 1.0 || (ch - cw / aspect).abs() <= 1.0,
                "{width}x{height} box {w}x{h}: content {content}"
            );
        }
    }
}

#[test]
fn far_paste_point_keeps_content_on_canvas() {
    for anchor in ["c", "tl", "t", "tr", "l", "r", "bl", "b", "br"] {
        let raw = RawOptions::new()
            .with("w", 300)
            .with("h", 300)
            .with("far", anchor);
        let plan = plan((800, 600), &raw, OutputFormat::Jpeg);
        let bg = plan.background.unwrap();
        let region = CropRegion::within(bg.paste_at, plan.scale_to, bg.canvas);
        assert_eq!(region.x as i64, bg.paste_at.x, "far={anchor}");
        assert_eq!(region.y as i64, bg.paste_at.y, "far={anchor}");
    }
}

// =========================================================================
// Placement
// =========================================================================

#[test]
fn position_resolver_reference_points() {
    let container = Dimensions::new(100, 100);
    let content = Dimensions::new(50, 50);
    assert_eq!(resolve(Anchor::parse("c"), container, content), Point::new(25, 25));
    assert_eq!(resolve(Anchor::parse("bl"), container, content), Point::new(0, 50));
    assert_eq!(resolve(Anchor::parse("tr"), container, content), Point::new(50, 0));
}

// =========================================================================
// Scale capping
// =========================================================================

#[test]
fn scale_is_capped_at_source() {
    let source = Dimensions::new(800, 600);
    let target = fill_missing_dimension(
        source,
        SizeRequest {
            width: Some(400.0),
            height: Some(300.0),
        },
    );
    let scaled = apply_scale(target, source, Some(3.0), false);
    assert_eq!(scaled.factor, 2.0);

    let plan = plan(
        (800, 600),
        &RawOptions::new().with("w", 400).with("h", 300).with("scale", 3),
        OutputFormat::Jpeg,
    );
    assert_eq!(plan.final_dimensions, Dimensions::new(800, 600));
    assert_eq!(plan.requested, Some(Dimensions::new(1200, 900)));
}

// =========================================================================
// Quality ramp
// =========================================================================

#[test]
fn quality_ramp_reference_points() {
    let (q, qmax) = (Quality::new(75), Quality::new(95));
    assert_eq!(ramp_quality(q, qmax, 0.3), Quality::new(95));
    assert_eq!(ramp_quality(q, qmax, 0.75), Quality::new(85));
}

#[test]
fn quality_ramp_applies_to_unscaled_jpeg() {
    let raw = RawOptions::new()
        .with("w", 800)
        .with("h", 600)
        .with("q", 75)
        .with("qmax", 95);
    // 400x300 for 800x600 → ratio 0.25
    assert_eq!(plan((400, 300), &raw, OutputFormat::Jpeg).quality, Quality::new(95));
    assert_eq!(plan((400, 300), &raw, OutputFormat::WebP).quality, Quality::new(75));
}

// =========================================================================
// Source sub-window
// =========================================================================

#[test]
fn sub_window_start_clamped_to_source_edge() {
    let raw = RawOptions::new().with("sw", 200).with("sx", 0.9);
    let plan = plan((1000, 500), &raw, OutputFormat::Jpeg);
    let window = plan.source_sub_crop.unwrap();
    assert_eq!(window.x, 800);
    assert_eq!(window.width, 200);
    assert!(window.fits_within(plan.original));
}

#[test]
fn single_dimension_with_window_uses_original_aspect() {
    for &(width, height) in SOURCES {
        // a window a quarter as wide: narrower than the original aspect
        let w = width / 8;
        let raw = RawOptions::new().with("sw", 0.25).with("w", w);
        let plan = plan((width, height), &raw, OutputFormat::Jpeg);

        // the box is w x (w / original aspect); the narrow window then binds the width
        let box_height = w as f64 * height as f64 / width as f64;
        let window = plan.source;
        let content = plan.final_dimensions;
        assert!(plan.did_scale);
        assert!(
            (content.height as f64 - box_height).abs() <= 0.5,
            "{width}x{height} w={w}: {content} in window {window}"
        );
        assert!(content.width < w, "{width}x{height} w={w}: {content}");
    }
}

#[test]
fn box_is_shrunk_into_window_without_enlargement() {
    for &(width, height) in SOURCES {
        let raw = RawOptions::new()
            .with("sw", 0.5)
            .with("sh", 0.5)
            .with("w", width)
            .with("h", height / 2);
        let plan = plan((width, height), &raw, OutputFormat::Png);
        let window = plan.source;
        assert!(
            plan.final_dimensions.width <= window.width
                && plan.final_dimensions.height <= window.height,
            "{width}x{height}: {} escapes window {window}",
            plan.final_dimensions
        );
    }
}

#[test]
fn scale_cap_measured_against_original() {
    let raw = RawOptions::new()
        .with("sw", 300)
        .with("sh", 300)
        .with("w", 400)
        .with("h", 400)
        .with("scale", 0.5);
    let plan = plan((1000, 1000), &raw, OutputFormat::Jpeg);
    assert_eq!(plan.final_dimensions, Dimensions::new(200, 200));
    assert!(plan.did_scale);
}

// =========================================================================
// Idempotence
// =========================================================================

#[test]
fn resolving_twice_gives_identical_plans() {
    let cases = [
        RawOptions::new().with("w", 150).with("h", 150).with("zc", "c"),
        RawOptions::new()
            .with("w", 300)
            .with("h", 200)
            .with("far", "br")
            .with("bg", "336699/40"),
        RawOptions::new()
            .with("sw", 0.5)
            .with("sy", 0.1)
            .with("w", 90)
            .with("q", 60)
            .with("qmax", 90),
        RawOptions::new().with("w", 2000).with("aoe", 1).with("strip", 1),
    ];
    for raw in &cases {
        for &source in SOURCES {
            let first = plan(source, raw, OutputFormat::Png);
            let second = plan(source, raw, OutputFormat::Png);
            assert_eq!(first, second, "{raw}");
        }
    }
}
