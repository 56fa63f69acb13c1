//! Path storage: the command-tagged vertex container every conversion and
//! renderer consumes.
//!
//! Vertices are stored in command order. Curve commands keep their raw
//! control points in storage until a curve conversion flattens them; a
//! renderer fed an unconverted path traverses control points as polyline
//! vertices.

use crate::arc::arc_to_cubics;
use crate::math::{Affine, Vec2};

/// Per-vertex path command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathCmd {
    MoveTo,
    LineTo,
    /// Quadratic Bezier vertex (control point or endpoint).
    Curve3,
    /// Cubic Bezier vertex (control point or endpoint).
    Curve4,
    /// Sub-path terminator. Carries no coordinate.
    EndPoly {
        closed: bool,
    },
}

impl PathCmd {
    /// True for commands that carry a coordinate.
    pub fn is_vertex(self) -> bool {
        !matches!(self, PathCmd::EndPoly { .. })
    }

    /// True for curve control/end vertices.
    pub fn is_curve(self) -> bool {
        matches!(self, PathCmd::Curve3 | PathCmd::Curve4)
    }
}

/// A stored vertex: coordinate plus the command that produced it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub point: Vec2,
    pub cmd: PathCmd,
}

impl Vertex {
    pub const fn new(point: Vec2, cmd: PathCmd) -> Self {
        Self { point, cmd }
    }
}

/// One realized sub-path: polyline points plus the closed flag.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

// Distance under which two endpoints are considered coincident.
const COINCIDENT_EPSILON: f64 = 1.0e-30;

/// Ordered vertex/command sequence with sub-path boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStorage {
    vertices: Vec<Vertex>,
}

impl PathStorage {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push(&mut self, point: Vec2, cmd: PathCmd) {
        self.vertices.push(Vertex::new(point, cmd));
    }

    /// Remove all vertices (keeps allocated memory).
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Total number of stored vertices, including sub-path terminators.
    /// Zero signals "nothing to render".
    pub fn num(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex access.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Begin a new sub-path at the given point.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.push(Vec2::new(x, y), PathCmd::MoveTo);
    }

    /// Straight segment to the given point.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.push(Vec2::new(x, y), PathCmd::LineTo);
    }

    /// Quadratic Bezier: control point then endpoint, stored raw.
    pub fn curve3(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.push(Vec2::new(cx, cy), PathCmd::Curve3);
        self.push(Vec2::new(x, y), PathCmd::Curve3);
    }

    /// Smooth quadratic Bezier: the control point is the previous control
    /// point reflected about the current endpoint. Degenerates to the
    /// current endpoint when the preceding command is not a curve; no-op on
    /// an empty path.
    pub fn curve3_smooth(&mut self, x: f64, y: f64) {
        let Some((p0, _)) = self.last_vertex() else {
            return;
        };
        let ctrl = match self.prev_vertex() {
            Some((prev, cmd)) if cmd.is_curve() => p0 + p0 - prev,
            _ => p0,
        };
        self.curve3(ctrl.x, ctrl.y, x, y);
    }

    /// Cubic Bezier: two control points then the endpoint, stored raw.
    pub fn curve4(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64) {
        self.push(Vec2::new(cx0, cy0), PathCmd::Curve4);
        self.push(Vec2::new(cx1, cy1), PathCmd::Curve4);
        self.push(Vec2::new(x, y), PathCmd::Curve4);
    }

    /// Smooth cubic Bezier: the first control point is reflected from the
    /// previous curve's second control point.
    pub fn curve4_smooth(&mut self, cx1: f64, cy1: f64, x: f64, y: f64) {
        let Some((p0, _)) = self.last_vertex() else {
            return;
        };
        let ctrl0 = match self.prev_vertex() {
            Some((prev, cmd)) if cmd.is_curve() => p0 + p0 - prev,
            _ => p0,
        };
        self.curve4(ctrl0.x, ctrl0.y, cx1, cy1, x, y);
    }

    /// SVG endpoint-parameterized elliptical arc to `(x, y)`, expanded into
    /// cubic Bezier segments.
    ///
    /// `rotation_deg` is the x-axis rotation in degrees. Degenerate radii
    /// (either ≤ 0) produce a straight line; a coincident endpoint produces
    /// nothing. Without a preceding vertex the endpoint becomes a move_to.
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        let Some((p0, cmd)) = self.last_vertex() else {
            self.move_to(x, y);
            return;
        };
        if !cmd.is_vertex() {
            self.move_to(x, y);
            return;
        }

        let rx = rx.abs();
        let ry = ry.abs();
        let end = Vec2::new(x, y);
        if rx < COINCIDENT_EPSILON || ry < COINCIDENT_EPSILON {
            self.line_to(x, y);
            return;
        }
        if p0.distance(end) < COINCIDENT_EPSILON {
            return;
        }

        let cubics = arc_to_cubics(p0, rx, ry, rotation_deg.to_radians(), large_arc, sweep, end);
        if cubics.is_empty() {
            self.line_to(x, y);
            return;
        }
        for c in cubics {
            self.curve4(c[1].x, c[1].y, c[2].x, c[2].y, c[3].x, c[3].y);
        }
    }

    /// Quadratic Bezier from the last vertex, flattened immediately into
    /// line segments at a fixed construction-time resolution.
    pub fn curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        let Some((p0, _)) = self.last_vertex() else {
            return;
        };
        let ctrl = Vec2::new(cx, cy);
        let end = Vec2::new(x, y);
        let mut points = Vec::new();
        crate::curves::flatten_quad_div(p0, ctrl, end, 1.0, 0.0, &mut points);
        for p in points {
            self.line_to(p.x, p.y);
        }
    }

    /// Mark the current sub-path closed.
    pub fn close_polygon(&mut self) {
        if self.last_vertex().is_some() {
            self.push(Vec2::ZERO, PathCmd::EndPoly { closed: true });
        }
    }

    /// Replace the path with a closed fixed-step circle approximation.
    pub fn add_circle(&mut self, x: f64, y: f64, r: f64, step: u32) {
        self.add_ellipse(x, y, r, r, step);
    }

    /// Replace the path with a closed fixed-step ellipse approximation.
    /// `step = 0` derives the step count from the radii.
    pub fn add_ellipse(&mut self, x: f64, y: f64, rx: f64, ry: f64, step: u32) {
        self.clear();
        let rx = rx.abs();
        let ry = ry.abs();
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let steps = if step == 0 {
            ellipse_auto_steps(rx, ry)
        } else {
            step.max(3) as usize
        };
        for i in 0..steps {
            let angle = i as f64 * std::f64::consts::TAU / steps as f64;
            let (sin, cos) = angle.sin_cos();
            let px = x + cos * rx;
            let py = y + sin * ry;
            if i == 0 {
                self.move_to(px, py);
            } else {
                self.line_to(px, py);
            }
        }
        self.close_polygon();
    }

    /// Replace the path with a closed rounded rectangle. `(x, y)` is the
    /// top-left corner, `(rx, ry)` the corner radii, `(w, h)` the extent.
    pub fn add_round_rect(&mut self, x: f64, y: f64, rx: f64, ry: f64, w: f64, h: f64) {
        self.clear();
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let rx = rx.abs().min(w * 0.5);
        let ry = ry.abs().min(h * 0.5);
        let (x1, y1) = (x + w, y + h);

        if rx <= 0.0 || ry <= 0.0 {
            self.move_to(x, y);
            self.line_to(x1, y);
            self.line_to(x1, y1);
            self.line_to(x, y1);
            self.close_polygon();
            return;
        }

        // Quarter-arc corners, flattened at a fixed angular step.
        let steps = ellipse_auto_steps(rx, ry).max(8) / 4;
        let corner = |path: &mut Self, cx: f64, cy: f64, start: f64| {
            for i in 0..=steps {
                let angle = start + i as f64 * std::f64::consts::FRAC_PI_2 / steps as f64;
                let (sin, cos) = angle.sin_cos();
                let px = cx + cos * rx;
                let py = cy + sin * ry;
                if path.is_empty() {
                    path.move_to(px, py);
                } else {
                    path.line_to(px, py);
                }
            }
        };

        use std::f64::consts::{FRAC_PI_2, PI};
        corner(self, x + rx, y + ry, PI); // top-left, sweeping up
        corner(self, x1 - rx, y + ry, PI + FRAC_PI_2); // top-right
        corner(self, x1 - rx, y1 - ry, 0.0); // bottom-right
        corner(self, x + rx, y1 - ry, FRAC_PI_2); // bottom-left
        self.close_polygon();
    }

    /// Last stored coordinate-carrying entry (terminators excluded from the
    /// coordinate but their command is never returned here).
    pub fn last_vertex(&self) -> Option<(Vec2, PathCmd)> {
        self.vertices.last().map(|v| (v.point, v.cmd))
    }

    /// Second-to-last stored entry.
    pub fn prev_vertex(&self) -> Option<(Vec2, PathCmd)> {
        if self.vertices.len() < 2 {
            return None;
        }
        let v = &self.vertices[self.vertices.len() - 2];
        Some((v.point, v.cmd))
    }

    /// Append a raw vertex run (used by conversions rebuilding a path).
    pub fn push_vertex(&mut self, point: Vec2, cmd: PathCmd) {
        self.vertices.push(Vertex::new(point, cmd));
    }

    /// Map every coordinate-carrying vertex through the transform in place.
    pub fn transform_all(&mut self, t: &Affine) {
        for v in &mut self.vertices {
            if v.cmd.is_vertex() {
                v.point = t.transform_point(v.point);
            }
        }
    }

    /// All coordinate-carrying vertices in order.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.vertices
            .iter()
            .filter(|v| v.cmd.is_vertex())
            .map(|v| v.point)
    }

    /// Decompose into realized polyline sub-paths. Curve control points that
    /// were never flattened are traversed as polyline vertices.
    pub fn to_polylines(&self) -> Vec<SubPath> {
        let mut subs = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();
        let mut closed = false;

        let flush = |subs: &mut Vec<SubPath>, current: &mut Vec<Vec2>, closed: bool| {
            if current.len() > 1 {
                subs.push(SubPath {
                    points: std::mem::take(current),
                    closed,
                });
            } else {
                current.clear();
            }
        };

        for v in &self.vertices {
            match v.cmd {
                PathCmd::MoveTo => {
                    flush(&mut subs, &mut current, closed);
                    closed = false;
                    current.push(v.point);
                }
                PathCmd::LineTo | PathCmd::Curve3 | PathCmd::Curve4 => {
                    current.push(v.point);
                }
                PathCmd::EndPoly { closed: c } => {
                    flush(&mut subs, &mut current, c);
                    closed = false;
                }
            }
        }
        flush(&mut subs, &mut current, closed);
        subs
    }
}

/// Step count for a polygonal ellipse, derived from the mean radius so the
/// chord error stays near an eighth of a pixel.
fn ellipse_auto_steps(rx: f64, ry: f64) -> usize {
    let ra = (rx.abs() + ry.abs()) * 0.5;
    let da = (ra / (ra + 0.125)).acos() * 2.0;
    ((std::f64::consts::TAU / da).round() as usize).clamp(8, 512)
}
