//! Deferred path conversions. Each variant carries its settings inline and
//! rewrites a whole path into a new one; the controller queues them and
//! drains the queue front to back when realized geometry is needed.

use crate::curves::{self, CurveApproximation, CurveSettings};
use crate::dash::{dash_path, DashSettings};
use crate::math::Vec2;
use crate::path::{PathCmd, PathStorage};
use crate::stroke::{stroke_path, StrokeSettings};

/// One queued path rewrite.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Expand the path into stroke outline polygons.
    Stroke(StrokeSettings),
    /// Split into dashes, then stroke the dashes. Always a composite: bare
    /// dashes have zero area and would rasterize to nothing.
    Dash(DashSettings, StrokeSettings),
    /// Flatten curve vertices into line segments.
    Curve(CurveSettings),
}

impl Conversion {
    /// Apply this conversion, producing the replacement path.
    pub fn apply(&self, src: &PathStorage) -> PathStorage {
        match self {
            Conversion::Stroke(s) => stroke_path(src, s),
            Conversion::Dash(d, s) => stroke_path(&dash_path(src, d), s),
            Conversion::Curve(c) => flatten_curves(src, c),
        }
    }
}

/// Rewrite every curve vertex run into line segments; move/line/terminator
/// entries pass through untouched.
pub fn flatten_curves(src: &PathStorage, settings: &CurveSettings) -> PathStorage {
    let mut out = PathStorage::new();
    let mut last = Vec2::ZERO;
    let mut flat: Vec<Vec2> = Vec::new();

    let vertices = src.vertices();
    let mut i = 0;
    while i < vertices.len() {
        let v = vertices[i];
        match v.cmd {
            PathCmd::MoveTo => {
                out.move_to(v.point.x, v.point.y);
                last = v.point;
                i += 1;
            }
            PathCmd::LineTo => {
                out.line_to(v.point.x, v.point.y);
                last = v.point;
                i += 1;
            }
            PathCmd::Curve3 => {
                // Control point plus endpoint; a truncated run degrades to
                // a line through the remaining vertex.
                if i + 1 < vertices.len() && vertices[i + 1].cmd == PathCmd::Curve3 {
                    let ctrl = v.point;
                    let end = vertices[i + 1].point;
                    flat.clear();
                    match settings.method {
                        CurveApproximation::Subdivision => curves::flatten_quad_div(
                            last,
                            ctrl,
                            end,
                            settings.approximation_scale,
                            settings.angle_tolerance_deg,
                            &mut flat,
                        ),
                        CurveApproximation::Incremental => curves::flatten_quad_inc(
                            last,
                            ctrl,
                            end,
                            settings.approximation_scale,
                            &mut flat,
                        ),
                    }
                    for p in &flat {
                        out.line_to(p.x, p.y);
                    }
                    last = end;
                    i += 2;
                } else {
                    out.line_to(v.point.x, v.point.y);
                    last = v.point;
                    i += 1;
                }
            }
            PathCmd::Curve4 => {
                if i + 2 < vertices.len()
                    && vertices[i + 1].cmd == PathCmd::Curve4
                    && vertices[i + 2].cmd == PathCmd::Curve4
                {
                    let c0 = v.point;
                    let c1 = vertices[i + 1].point;
                    let end = vertices[i + 2].point;
                    flat.clear();
                    match settings.method {
                        CurveApproximation::Subdivision => curves::flatten_cubic_div(
                            last,
                            c0,
                            c1,
                            end,
                            settings.approximation_scale,
                            settings.angle_tolerance_deg,
                            &mut flat,
                        ),
                        CurveApproximation::Incremental => curves::flatten_cubic_inc(
                            last,
                            c0,
                            c1,
                            end,
                            settings.approximation_scale,
                            &mut flat,
                        ),
                    }
                    for p in &flat {
                        out.line_to(p.x, p.y);
                    }
                    last = end;
                    i += 3;
                } else {
                    out.line_to(v.point.x, v.point.y);
                    last = v.point;
                    i += 1;
                }
            }
            PathCmd::EndPoly { closed } => {
                if closed {
                    out.close_polygon();
                } else {
                    out.push_vertex(Vec2::ZERO, PathCmd::EndPoly { closed: false });
                }
                i += 1;
            }
        }
    }
    out
}
