//! CLI output formatting.
//!
//! Each display has a `format_*` function returning `Vec<String>` for
//! testability and, where the binary needs it, a `print_*` wrapper that
//! writes to stdout. Format functions are pure.
//!
//! # Output Format
//!
//! ## Prepare
//!
//! ```text
//! Cropped     2000x2000    1,843,221 B
//!     Path: .media-prep/3f9a0c1e2b4d5a6f.jpg
//! Compressed  2000x2000      912,345 B
//!     Path: .media-prep/a1b2c3d4e5f60718.jpg
//!
//! Upload
//!     Path: .media-prep/a1b2c3d4e5f60718.jpg
//!     Mime: image/jpeg
//!     Size: 2000x2000
//!     Bytes: 912,345 B
//! ```
//!
//! ## Plan
//!
//! ```text
//! Source  3000x2000
//! Upload  2000x2000
//! Ops
//!     crop 1500x1000 at 0,0
//!     resize height 2000
//! ```

use crate::imaging::params::{GeometryOp, ResizeTarget};
use crate::imaging::{Dimensions, ImageAsset};
use crate::model::ImageEvent;
use crate::transform::ManipulationPlan;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1234567` → `1,234,567 B`.
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str(" B");
    out
}

fn asset_summary(label: &str, asset: &ImageAsset) -> Vec<String> {
    vec![
        format!(
            "{:<11} {:<11} {:>12}",
            label,
            asset.dimensions().to_string(),
            format_bytes(asset.byte_size)
        ),
        format!("{}Path: {}", indent(1), asset.path),
    ]
}

/// One change notification from a [`PendingImage`](crate::model::PendingImage).
pub fn format_event(event: &ImageEvent) -> Vec<String> {
    match event {
        ImageEvent::Cropped(asset) => asset_summary("Cropped", asset),
        ImageEvent::Compressed(asset) => asset_summary("Compressed", asset),
        ImageEvent::Restored => vec!["Restored previous state".to_string()],
        ImageEvent::CropFailed(reason) => vec![format!("Crop failed: {reason}")],
    }
}

/// Full description of the asset that would be uploaded.
pub fn format_asset(asset: &ImageAsset) -> Vec<String> {
    vec![
        "Upload".to_string(),
        format!("{}Path: {}", indent(1), asset.path),
        format!("{}Mime: {}", indent(1), asset.mime),
        format!("{}Size: {}", indent(1), asset.dimensions()),
        format!("{}Bytes: {}", indent(1), format_bytes(asset.byte_size)),
    ]
}

pub fn print_asset(asset: &ImageAsset) {
    for line in format_asset(asset) {
        println!("{}", line);
    }
}

fn format_resize_target(target: &ResizeTarget) -> String {
    match target {
        ResizeTarget::Width(w) => format!("resize width {w}"),
        ResizeTarget::Height(h) => format!("resize height {h}"),
        ResizeTarget::Exact {
            width,
            height,
            mode,
        } => format!("resize {width}x{height} ({mode:?})").to_lowercase(),
    }
}

fn format_op(op: &GeometryOp) -> String {
    match op {
        GeometryOp::FlipHorizontal => "flip horizontal".to_string(),
        GeometryOp::FlipVertical => "flip vertical".to_string(),
        GeometryOp::Rotate { degrees } => format!("rotate {degrees}°"),
        GeometryOp::Crop(c) => format!(
            "crop {}x{} at {},{}",
            c.width, c.height, c.origin_x, c.origin_y
        ),
        GeometryOp::Resize(target) => format_resize_target(target),
    }
}

/// Planned geometry for `source`, without touching pixels.
pub fn format_plan(source: Dimensions, plan: &ManipulationPlan) -> Vec<String> {
    let mut lines = vec![
        format!("Source  {source}"),
        format!("Upload  {}", plan.upload),
        "Ops".to_string(),
    ];
    lines.extend(
        plan.ops
            .iter()
            .map(|op| format!("{}{}", indent(1), format_op(op))),
    );
    lines
}

pub fn print_plan(source: Dimensions, plan: &ManipulationPlan) {
    for line in format_plan(source, plan) {
        println!("{}", line);
    }
}
