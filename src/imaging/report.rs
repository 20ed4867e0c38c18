//! Per-call diagnostic trail.
//!
//! Every [`process_image`](super::operations::Resizer::process_image) call
//! gets its own [`Report`]. Warnings and the reason a run was declined are
//! always recorded. Plan detail (sizes, crop boxes, background) is only
//! recorded when the report was opened in debug mode.

use super::plan::RenderPlan;
use serde::Serialize;

/// Ordered diagnostic lines for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    debug: bool,
    lines: Vec<String>,
}

impl Report {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            lines: Vec::new(),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Record a line unconditionally.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Record a line only in debug mode.
    pub fn detail(&mut self, line: impl Into<String>) {
        if self.debug {
            self.lines.push(line.into());
        }
    }

    pub fn extend_detail<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        if self.debug {
            self.lines.extend(lines);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Human-readable breakdown of a plan, one step per line.
pub fn describe_plan(plan: &RenderPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "Original - w: {} | h: {} ({:.2} MP)",
        plan.original.width,
        plan.original.height,
        plan.original.area() / 1e6
    )];

    if let Some(window) = plan.source_sub_crop {
        lines.push(format!(
            "Source area - start: ({}, {}) | box: {} x {}",
            window.x, window.y, window.width, window.height
        ));
    }
    if let Some(requested) = plan.requested {
        lines.push(format!(
            "Requested - w: {} | h: {}",
            requested.width, requested.height
        ));
    }

    let not_scaled = if plan.did_scale {
        ""
    } else {
        " [Not scaled: same size or insufficient input resolution]"
    };
    lines.push(format!(
        "New - w: {} | h: {}{not_scaled}",
        plan.scale_to.width, plan.scale_to.height
    ));

    if let Some(bg) = plan.background {
        if bg.relocated {
            lines.push(format!("FAR - start: {} | box: {}", bg.paste_at, bg.canvas));
        }
        lines.push(format!(
            "Background color: {} | opacity: {}",
            bg.color, bg.opacity
        ));
    }
    if let Some(crop) = plan.cover_crop {
        lines.push(format!(
            "ZC - start: ({},{}) | box: {} x {}",
            crop.x, crop.y, crop.width, crop.height
        ));
    }

    lines.push(format!(
        "Output - {} | quality: {}",
        plan.final_dimensions,
        plan.quality.value()
    ));
    lines
}
