//! Stroke outline generation: expands polyline sub-paths into filled
//! outline polygons with configurable caps, joins and miter limits.
//!
//! Open sub-paths become a single closed outline (forward side, end cap,
//! backward side, start cap). Closed sub-paths become two rings — the
//! backward ring runs with opposite winding so a non-zero fill leaves the
//! interior hollow.

use crate::math::Vec2;
use crate::path::{PathStorage, SubPath};

/// End-of-line cap shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Square,
    Round,
}

/// Outer corner shape where two segments meet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    /// Miter that falls back to a bevel when the limit is exceeded.
    MiterRevert,
    Round,
    Bevel,
    /// Miter that falls back to a round join when the limit is exceeded.
    MiterRound,
}

/// Inner corner shape (the concave side of a turn).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum InnerJoin {
    Bevel,
    #[default]
    Miter,
    Jag,
    Round,
}

/// Settings for a stroke conversion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeSettings {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub inner_join: InnerJoin,
    pub miter_limit: f64,
    pub inner_miter_limit: f64,
    pub approximation_scale: f64,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            width: 0.5,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            inner_join: InnerJoin::Miter,
            miter_limit: 4.0,
            inner_miter_limit: 1.01,
            approximation_scale: 1.0,
        }
    }
}

// Consecutive input vertices closer than this are merged.
const VERTEX_DIST_EPSILON: f64 = 1.0e-10;
const INTERSECTION_EPSILON: f64 = 1.0e-30;

/// Expand every sub-path of `src` into stroke outline polygons.
pub fn stroke_path(src: &PathStorage, settings: &StrokeSettings) -> PathStorage {
    let mut out = PathStorage::new();
    let stroker = Stroker::new(settings);
    for sub in src.to_polylines() {
        stroker.stroke_subpath(&sub, &mut out);
    }
    out
}

/// Stateless outline calculator; all geometry parameters derived once from
/// the settings.
struct Stroker {
    width: f64,
    width_abs: f64,
    width_sign: f64,
    width_eps: f64,
    cap: LineCap,
    join: LineJoin,
    inner_join: InnerJoin,
    miter_limit: f64,
    inner_miter_limit: f64,
    approx_scale: f64,
}

impl Stroker {
    fn new(settings: &StrokeSettings) -> Self {
        let half = settings.width * 0.5;
        Self {
            width: half,
            width_abs: half.abs(),
            width_sign: if half < 0.0 { -1.0 } else { 1.0 },
            width_eps: half.abs() / 1024.0,
            cap: settings.cap,
            join: settings.join,
            inner_join: settings.inner_join,
            miter_limit: settings.miter_limit.max(1.0),
            inner_miter_limit: settings.inner_miter_limit.max(1.01),
            approx_scale: settings.approximation_scale.max(1.0e-6),
        }
    }

    fn stroke_subpath(&self, sub: &SubPath, out: &mut PathStorage) {
        let pts = dedupe(&sub.points, sub.closed);
        if pts.len() < 2 {
            return;
        }
        let n = pts.len();

        if sub.closed && n >= 3 {
            // Forward ring (outer for positive winding).
            let mut ring = Vec::new();
            for i in 0..n {
                let v0 = pts[(i + n - 1) % n];
                let v1 = pts[i];
                let v2 = pts[(i + 1) % n];
                self.calc_join(&mut ring, v0, v1, v2);
            }
            push_ring(out, &ring);

            // Backward ring with reversed winding.
            let mut ring = Vec::new();
            for i in (0..n).rev() {
                let v0 = pts[(i + 1) % n];
                let v1 = pts[i];
                let v2 = pts[(i + n - 1) % n];
                self.calc_join(&mut ring, v0, v1, v2);
            }
            push_ring(out, &ring);
        } else {
            // Open path: one outline ring around both sides.
            let mut ring = Vec::new();
            self.calc_cap(&mut ring, pts[0], pts[1]);
            for i in 1..n - 1 {
                self.calc_join(&mut ring, pts[i - 1], pts[i], pts[i + 1]);
            }
            self.calc_cap(&mut ring, pts[n - 1], pts[n - 2]);
            for i in (1..n - 1).rev() {
                self.calc_join(&mut ring, pts[i + 1], pts[i], pts[i - 1]);
            }
            push_ring(out, &ring);
        }
    }

    /// Cap at `v0`, with the line running toward `v1`.
    fn calc_cap(&self, out: &mut Vec<Vec2>, v0: Vec2, v1: Vec2) {
        let len = v0.distance(v1);
        let dx1 = (v1.y - v0.y) / len * self.width;
        let dy1 = (v1.x - v0.x) / len * self.width;

        match self.cap {
            LineCap::Butt | LineCap::Square => {
                let (mut dx2, mut dy2) = (0.0, 0.0);
                if self.cap == LineCap::Square {
                    dx2 = dy1 * self.width_sign;
                    dy2 = dx1 * self.width_sign;
                }
                out.push(Vec2::new(v0.x - dx1 - dx2, v0.y + dy1 - dy2));
                out.push(Vec2::new(v0.x + dx1 - dx2, v0.y - dy1 - dy2));
            }
            LineCap::Round => {
                let mut da = self.arc_step();
                let n = (std::f64::consts::PI / da) as usize;
                da = std::f64::consts::PI / (n + 1) as f64;
                out.push(Vec2::new(v0.x - dx1, v0.y + dy1));
                if self.width_sign > 0.0 {
                    let mut a1 = dy1.atan2(-dx1) + da;
                    for _ in 0..n {
                        out.push(Vec2::new(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 += da;
                    }
                } else {
                    let mut a1 = (-dy1).atan2(dx1) - da;
                    for _ in 0..n {
                        out.push(Vec2::new(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 -= da;
                    }
                }
                out.push(Vec2::new(v0.x + dx1, v0.y - dy1));
            }
        }
    }

    /// Join at `v1`, between the segments `v0→v1` and `v1→v2`.
    fn calc_join(&self, out: &mut Vec<Vec2>, v0: Vec2, v1: Vec2, v2: Vec2) {
        let len1 = v0.distance(v1);
        let len2 = v1.distance(v2);
        let dx1 = self.width * (v1.y - v0.y) / len1;
        let dy1 = self.width * (v1.x - v0.x) / len1;
        let dx2 = self.width * (v2.y - v1.y) / len2;
        let dy2 = self.width * (v2.x - v1.x) / len2;

        let cp = cross3(v0, v1, v2);
        if cp != 0.0 && (cp > 0.0) == (self.width > 0.0) {
            // Concave side of the turn.
            let limit = (len1.min(len2) / self.width_abs).max(self.inner_miter_limit);
            match self.inner_join {
                InnerJoin::Bevel => {
                    out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                    out.push(Vec2::new(v1.x + dx2, v1.y - dy2));
                }
                InnerJoin::Miter => {
                    self.calc_miter(
                        out,
                        v0,
                        v1,
                        v2,
                        dx1,
                        dy1,
                        dx2,
                        dy2,
                        LineJoin::MiterRevert,
                        limit,
                        0.0,
                    );
                }
                InnerJoin::Jag | InnerJoin::Round => {
                    let d = (dx1 - dx2) * (dx1 - dx2) + (dy1 - dy2) * (dy1 - dy2);
                    if d < len1 * len1 && d < len2 * len2 {
                        self.calc_miter(
                            out,
                            v0,
                            v1,
                            v2,
                            dx1,
                            dy1,
                            dx2,
                            dy2,
                            LineJoin::MiterRevert,
                            limit,
                            0.0,
                        );
                    } else if self.inner_join == InnerJoin::Jag {
                        out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                        out.push(v1);
                        out.push(Vec2::new(v1.x + dx2, v1.y - dy2));
                    } else {
                        out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                        out.push(v1);
                        self.calc_arc(out, v1, dx2, -dy2, dx1, -dy1);
                        out.push(v1);
                        out.push(Vec2::new(v1.x + dx2, v1.y - dy2));
                    }
                }
            }
        } else {
            // Convex side.
            let dx = (dx1 + dx2) * 0.5;
            let dy = (dy1 + dy2) * 0.5;
            let dbevel = (dx * dx + dy * dy).sqrt();

            if matches!(self.join, LineJoin::Round | LineJoin::Bevel)
                && self.approx_scale * (self.width_abs - dbevel) < self.width_eps
            {
                // Segments are nearly collinear: a single intersection point
                // is indistinguishable from the full join shape.
                if let Some(p) = calc_intersection(
                    Vec2::new(v0.x + dx1, v0.y - dy1),
                    Vec2::new(v1.x + dx1, v1.y - dy1),
                    Vec2::new(v1.x + dx2, v1.y - dy2),
                    Vec2::new(v2.x + dx2, v2.y - dy2),
                ) {
                    out.push(p);
                } else {
                    out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                }
                return;
            }

            match self.join {
                LineJoin::Miter | LineJoin::MiterRevert | LineJoin::MiterRound => {
                    self.calc_miter(
                        out,
                        v0,
                        v1,
                        v2,
                        dx1,
                        dy1,
                        dx2,
                        dy2,
                        self.join,
                        self.miter_limit,
                        dbevel,
                    );
                }
                LineJoin::Round => {
                    self.calc_arc(out, v1, dx1, -dy1, dx2, -dy2);
                }
                LineJoin::Bevel => {
                    out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                    out.push(Vec2::new(v1.x + dx2, v1.y - dy2));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_miter(
        &self,
        out: &mut Vec<Vec2>,
        v0: Vec2,
        v1: Vec2,
        v2: Vec2,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
        join: LineJoin,
        mlimit: f64,
        dbevel: f64,
    ) {
        let mut xi = v1;
        let mut di = 1.0;
        let lim = self.width_abs * mlimit;
        let mut miter_limit_exceeded = true;
        let mut intersection_failed = true;

        if let Some(p) = calc_intersection(
            Vec2::new(v0.x + dx1, v0.y - dy1),
            Vec2::new(v1.x + dx1, v1.y - dy1),
            Vec2::new(v1.x + dx2, v1.y - dy2),
            Vec2::new(v2.x + dx2, v2.y - dy2),
        ) {
            xi = p;
            di = v1.distance(p);
            if di <= lim {
                out.push(p);
                miter_limit_exceeded = false;
            }
            intersection_failed = false;
        } else {
            // Offset lines are parallel: keep the shared offset point when
            // the turn direction did not flip across it.
            let p2 = Vec2::new(v1.x + dx1, v1.y - dy1);
            if (cross3(v0, v1, p2) < 0.0) == (cross3(v1, v2, p2) < 0.0) {
                out.push(p2);
                miter_limit_exceeded = false;
            }
        }

        if miter_limit_exceeded {
            match join {
                LineJoin::MiterRevert => {
                    out.push(Vec2::new(v1.x + dx1, v1.y - dy1));
                    out.push(Vec2::new(v1.x + dx2, v1.y - dy2));
                }
                LineJoin::MiterRound => {
                    self.calc_arc(out, v1, dx1, -dy1, dx2, -dy2);
                }
                _ => {
                    if intersection_failed {
                        let m = mlimit * self.width_sign;
                        out.push(Vec2::new(v1.x + dx1 - dy1 * m, v1.y - dy1 + dx1 * m));
                        out.push(Vec2::new(v1.x + dx2 + dy2 * m, v1.y - dy2 - dx2 * m));
                    } else {
                        // Clip the spike at the miter limit.
                        let p1 = Vec2::new(v1.x + dx1, v1.y - dy1);
                        let p2 = Vec2::new(v1.x + dx2, v1.y - dy2);
                        let t = (lim - dbevel) / (di - dbevel);
                        out.push(p1.lerp(xi, t));
                        out.push(p2.lerp(xi, t));
                    }
                }
            }
        }
    }

    /// Arc sweep between two offset directions around `c`.
    fn calc_arc(&self, out: &mut Vec<Vec2>, c: Vec2, dx1: f64, dy1: f64, dx2: f64, dy2: f64) {
        let a1 = (dy1 * self.width_sign).atan2(dx1 * self.width_sign);
        let mut a2 = (dy2 * self.width_sign).atan2(dx2 * self.width_sign);
        let mut da = self.arc_step();

        out.push(Vec2::new(c.x + dx1, c.y + dy1));
        if self.width_sign > 0.0 {
            if a2 < a1 {
                a2 += std::f64::consts::TAU;
            }
            let n = ((a2 - a1) / da) as usize;
            da = (a2 - a1) / (n + 1) as f64;
            let mut a = a1 + da;
            for _ in 0..n {
                out.push(Vec2::new(
                    c.x + a.cos() * self.width,
                    c.y + a.sin() * self.width,
                ));
                a += da;
            }
        } else {
            if a2 > a1 {
                a2 -= std::f64::consts::TAU;
            }
            let n = ((a1 - a2) / da) as usize;
            da = (a1 - a2) / (n + 1) as f64;
            let mut a = a1 - da;
            for _ in 0..n {
                out.push(Vec2::new(
                    c.x + a.cos() * self.width,
                    c.y + a.sin() * self.width,
                ));
                a -= da;
            }
        }
        out.push(Vec2::new(c.x + dx2, c.y + dy2));
    }

    // Angular step keeping the arc's chord error near an eighth of a pixel.
    fn arc_step(&self) -> f64 {
        (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos() * 2.0
    }
}

fn push_ring(out: &mut PathStorage, ring: &[Vec2]) {
    let mut iter = ring.iter();
    let Some(first) = iter.next() else {
        return;
    };
    out.move_to(first.x, first.y);
    for p in iter {
        out.line_to(p.x, p.y);
    }
    out.close_polygon();
}

/// Drop consecutive duplicates; for a closed path also drop a trailing point
/// coincident with the first.
fn dedupe(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |q| q.distance(p) > VERTEX_DIST_EPSILON) {
            out.push(p);
        }
    }
    if closed && out.len() > 1 {
        if let (Some(&first), Some(&last)) = (out.first(), out.last()) {
            if first.distance(last) <= VERTEX_DIST_EPSILON {
                out.pop();
            }
        }
    }
    out
}

fn cross3(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (c.x - b.x) * (b.y - a.y) - (c.y - b.y) * (b.x - a.x)
}

fn calc_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    let num = (a.y - c.y) * (d.x - c.x) - (a.x - c.x) * (d.y - c.y);
    let den = (b.x - a.x) * (d.y - c.y) - (b.y - a.y) * (d.x - c.x);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some(Vec2::new(a.x + r * (b.x - a.x), a.y + r * (b.y - a.y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(path: &PathStorage) -> (Vec2, Vec2) {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in path.points() {
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    #[test]
    fn butt_stroked_segment_is_a_rectangle() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);

        let settings = StrokeSettings {
            width: 10.0,
            ..Default::default()
        };
        let out = stroke_path(&src, &settings);
        let subs = out.to_polylines();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].closed);
        assert_eq!(subs[0].points.len(), 4);

        let (min, max) = bbox(&out);
        assert!((min.x - 0.0).abs() < 1e-9 && (max.x - 100.0).abs() < 1e-9);
        assert!((min.y + 5.0).abs() < 1e-9 && (max.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn square_cap_extends_past_endpoints() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);

        let settings = StrokeSettings {
            width: 10.0,
            cap: LineCap::Square,
            ..Default::default()
        };
        let (min, max) = bbox(&stroke_path(&src, &settings));
        assert!((min.x + 5.0).abs() < 1e-9);
        assert!((max.x - 105.0).abs() < 1e-9);
    }

    #[test]
    fn round_cap_adds_arc_vertices() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);

        let butt = stroke_path(&src, &StrokeSettings {
            width: 10.0,
            ..Default::default()
        });
        let round = stroke_path(&src, &StrokeSettings {
            width: 10.0,
            cap: LineCap::Round,
            ..Default::default()
        });
        assert!(round.num() > butt.num());

        // Round cap vertices stay on the half-width circle around the ends.
        let (min, max) = bbox(&round);
        assert!(min.x >= -5.0 - 1e-9 && max.x <= 105.0 + 1e-9);
    }

    #[test]
    fn closed_path_produces_two_rings() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);
        src.line_to(100.0, 100.0);
        src.line_to(0.0, 100.0);
        src.close_polygon();

        let out = stroke_path(&src, &StrokeSettings {
            width: 4.0,
            ..Default::default()
        });
        let subs = out.to_polylines();
        assert_eq!(subs.len(), 2);
        assert!(subs[0].closed && subs[1].closed);
    }

    #[test]
    fn miter_corner_reaches_past_bevel() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);
        src.line_to(100.0, 100.0);

        let miter = stroke_path(&src, &StrokeSettings {
            width: 10.0,
            ..Default::default()
        });
        let bevel = stroke_path(&src, &StrokeSettings {
            width: 10.0,
            join: LineJoin::Bevel,
            ..Default::default()
        });
        let (_, mmax) = bbox(&miter);
        let (_, bmax) = bbox(&bevel);
        // The right-angle miter tip lands at (105, -5); the bevel cuts it.
        assert!((mmax.x - 105.0).abs() < 1e-9);
        assert!(bmax.x < 105.0 + 1e-9);
    }

    #[test]
    fn sharp_turn_honors_miter_limit() {
        // Nearly reversing turn: an unbounded miter would spike far out.
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);
        src.line_to(0.0, 5.0);

        let settings = StrokeSettings {
            width: 10.0,
            miter_limit: 4.0,
            ..Default::default()
        };
        let (_, max) = bbox(&stroke_path(&src, &settings));
        // Spike clipped near width/2 * limit past the corner.
        assert!(max.x <= 100.0 + 5.0 * 4.0 + 1e-6, "max.x = {}", max.x);
    }

    #[test]
    fn degenerate_input_is_ignored() {
        let mut src = PathStorage::new();
        src.move_to(5.0, 5.0);
        let out = stroke_path(&src, &StrokeSettings::default());
        assert_eq!(out.num(), 0);
    }
}
