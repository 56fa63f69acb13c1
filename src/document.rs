//! Document-driven drawing: walks an already-parsed shape-element tree
//! and renders each shape through a context, fitting the document into a
//! power-of-two square target.
//!
//! Ordering contract: each shape fills first, then — when a stroke width
//! is set — the same path storage is destructively converted to its
//! stroke outline and rendered again. Children draw after their parent.

use tracing::{debug, warn};

use crate::color::Color;
use crate::context::RenderContext;
use crate::controller::PathController;
use crate::curves::CurveSettings;
use crate::error::Error;
use crate::math::{next_power_of_two, Vec2};
use crate::raster::ScanlineKind;
use crate::stroke::StrokeSettings;

// Integer path command codes, matching the single-letter SVG commands.
pub const CMD_MOVE: i32 = 77; // M
pub const CMD_CLOSE: i32 = 90; // Z
pub const CMD_LINE: i32 = 76; // L
pub const CMD_CUBIC: i32 = 67; // C
pub const CMD_CUBIC_SMOOTH: i32 = 83; // S
pub const CMD_QUAD: i32 = 81; // Q
pub const CMD_QUAD_SMOOTH: i32 = 84; // T
pub const CMD_ARC: i32 = 65; // A

/// One pre-parsed path command record. Which coordinate slots are
/// meaningful depends on `code`; for `CMD_ARC` the radii arrive in
/// `(x1, y1)`, the x-axis rotation in `x2`, and the flag byte in `y2`
/// (bit 0 large-arc, bit 1 sweep).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PathData {
    pub code: i32,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub x: f64,
    pub y: f64,
}

impl PathData {
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            code: CMD_MOVE,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        Self {
            code: CMD_LINE,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn close() -> Self {
        Self {
            code: CMD_CLOSE,
            ..Default::default()
        }
    }

    pub fn cubic_to(cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64) -> Self {
        Self {
            code: CMD_CUBIC,
            x1: cx0,
            y1: cy0,
            x2: cx1,
            y2: cy1,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn quad_to(cx: f64, cy: f64, x: f64, y: f64) -> Self {
        Self {
            code: CMD_QUAD,
            x1: cx,
            y1: cy,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn arc_to(rx: f64, ry: f64, rotation_deg: f64, large_arc: bool, sweep: bool, x: f64, y: f64) -> Self {
        let flags = (large_arc as i32) | ((sweep as i32) << 1);
        Self {
            code: CMD_ARC,
            x1: rx,
            y1: ry,
            x2: rotation_deg,
            y2: flags as f64,
            x,
            y,
            ..Default::default()
        }
    }
}

/// Style record shared by every shape kind. Colors are hex strings as the
/// document layer delivers them; malformed values fall back to black.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    /// Zero (or anything at or below epsilon) means no stroke pass.
    pub stroke_width: f64,
}

/// Geometry payload of an element. `Group` carries no geometry of its
/// own and exists only to hold children.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Path { data: Vec<PathData> },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Rect { x: f64, y: f64, rx: f64, ry: f64, width: f64, height: f64 },
    Group,
}

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ShapeKind,
    pub style: ShapeStyle,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(kind: ShapeKind, style: ShapeStyle) -> Self {
        Self {
            kind,
            style,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(ShapeKind::Group, ShapeStyle::default())
    }
}

/// A parsed document: declared size plus the element tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: f64,
    pub height: f64,
    pub root: Element,
}

// Fit-to-target state shared by every shape of one draw.
struct FitTransform {
    identity: bool,
    extent: f64,
    scale: f64,
}

const STROKE_WIDTH_EPSILON: f64 = 0.001;

/// Render a document into the context's buffer.
///
/// The buffer is (re)initialized to a power-of-two square of the target
/// extent; unless the document is already exactly that square, every
/// shape is scaled about the document center to fit.
pub fn draw_document(
    doc: &Document,
    ctx: &mut RenderContext,
    target_width: i32,
    target_height: i32,
) -> Result<(), Error> {
    if doc.width <= 0.0 || doc.height <= 0.0 {
        warn!(width = doc.width, height = doc.height, "document size not positive");
        return Err(Error::InvalidDocumentSize {
            width: doc.width,
            height: doc.height,
        });
    }
    let target_max = target_width.max(target_height);
    if target_max <= 0 {
        warn!(target_width, target_height, "target dimension not positive");
        return Err(Error::InvalidTargetDimension(target_max));
    }

    let tex_dim = next_power_of_two(target_max as u32) as i32;
    let identity = tex_dim as f64 == doc.width && tex_dim as f64 == doc.height;
    let doc_max = doc.width.max(doc.height);
    let fit = FitTransform {
        identity,
        extent: doc_max * 0.5,
        scale: if identity { 1.0 } else { tex_dim as f64 / doc_max },
    };
    debug!(identity, extent = fit.extent, scale = fit.scale, tex_dim, "document fit");

    ctx.init_buffer(tex_dim, tex_dim, 0, true);
    if !ctx.has_valid_buffer() {
        warn!("document draw aborted: buffer construction failed");
        return Err(Error::InvalidBuffer);
    }

    // Depth-first, parent before children; children pushed in reverse so
    // the walk matches left-to-right document order.
    let mut worklist = vec![&doc.root];
    while let Some(element) = worklist.pop() {
        if build_shape(element, ctx.path()) {
            draw_shape(&element.style, ctx, &fit);
        }
        for child in element.children.iter().rev() {
            worklist.push(child);
        }
    }
    Ok(())
}

/// Walk the tree and collect every shape's realized vertices, in draw
/// order, pending conversions applied.
pub fn extract_paths(root: &Element, path: &mut PathController) -> Vec<Vec2> {
    let mut vertices = Vec::new();
    let mut worklist = vec![root];
    while let Some(element) = worklist.pop() {
        if build_shape(element, path) {
            path.append_points(true, &mut vertices);
        }
        for child in element.children.iter().rev() {
            worklist.push(child);
        }
    }
    vertices
}

/// Build the element's geometry into the controller. Returns false for
/// elements without geometry of their own.
fn build_shape(element: &Element, path: &mut PathController) -> bool {
    match &element.kind {
        ShapeKind::Path { data } => {
            path.clear();
            let mut any_curve = false;
            for d in data {
                match d.code {
                    CMD_MOVE => path.move_to(d.x, d.y),
                    CMD_CLOSE => path.close_polygon(),
                    CMD_LINE => path.line_to(d.x, d.y),
                    CMD_CUBIC => {
                        any_curve = true;
                        path.curve4(d.x1, d.y1, d.x2, d.y2, d.x, d.y);
                    }
                    CMD_CUBIC_SMOOTH => {
                        any_curve = true;
                        path.curve4_smooth(d.x2, d.y2, d.x, d.y);
                    }
                    CMD_QUAD => {
                        any_curve = true;
                        path.curve3(d.x1, d.y1, d.x, d.y);
                    }
                    CMD_QUAD_SMOOTH => {
                        any_curve = true;
                        path.curve3_smooth(d.x, d.y);
                    }
                    CMD_ARC => {
                        let flags = d.y2 as i32;
                        any_curve = true;
                        path.arc_to(
                            d.x1,
                            d.y1,
                            d.x2,
                            flags & 1 != 0,
                            flags & 2 != 0,
                            d.x,
                            d.y,
                        );
                    }
                    other => {
                        warn!(code = other, "unknown path command code skipped");
                    }
                }
            }
            if any_curve {
                path.path_as_curve(CurveSettings::default());
            }
            true
        }
        ShapeKind::Circle { cx, cy, r } => {
            path.clear();
            path.add_circle(*cx, *cy, *r, 0);
            true
        }
        ShapeKind::Ellipse { cx, cy, rx, ry } => {
            path.clear();
            path.add_ellipse(*cx, *cy, *rx, *ry, 0);
            true
        }
        ShapeKind::Rect {
            x,
            y,
            rx,
            ry,
            width,
            height,
        } => {
            path.clear();
            path.add_round_rect(*x, *y, *rx, *ry, *width, *height);
            true
        }
        ShapeKind::Group => false,
    }
}

/// Fill, then optionally stroke, the shape currently held by the
/// context's path controller.
///
/// The stroke pass destructively converts the shared path into its own
/// outline, so the fill must render first.
fn draw_shape(style: &ShapeStyle, ctx: &mut RenderContext, fit: &FitTransform) {
    if ctx.path_ref().num() == 0 {
        return;
    }

    if !fit.identity {
        // Scale about the document center into the square target.
        let path = ctx.path();
        path.reset_transform();
        path.translate(-fit.extent, -fit.extent);
        path.scale(fit.scale);
        path.translate(fit.extent * fit.scale, fit.extent * fit.scale);
        path.apply_transform();
        path.reset_transform();
    }

    ctx.set_color(Color::from_hex(&style.fill));
    ctx.render(ScanlineKind::PackedAa);

    if style.stroke_width > STROKE_WIDTH_EPSILON {
        let settings = StrokeSettings {
            width: style.stroke_width,
            ..Default::default()
        };
        ctx.path().path_as_stroke(settings);
        ctx.set_color(Color::from_hex(&style.stroke));
        ctx.render(ScanlineKind::PackedAa);
    }
}
