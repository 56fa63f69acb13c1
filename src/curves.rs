//! Curve flattening: quadratic and cubic Beziers into polylines.
//!
//! Two approximation methods are offered, mirroring the classic pair:
//! incremental (fixed subdivision count from estimated length) and
//! recursive subdivision (flatness plus optional angle tolerance).

use crate::math::Vec2;

/// Curve approximation method for a flatten conversion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CurveApproximation {
    /// Fixed subdivision count derived from the control polygon length.
    Incremental,
    /// Adaptive recursive subdivision driven by flatness and angle
    /// tolerance.
    #[default]
    Subdivision,
}

/// Settings for a curve-flatten conversion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurveSettings {
    pub method: CurveApproximation,
    /// Scales the flatness tolerance; larger values yield more segments.
    pub approximation_scale: f64,
    /// Extra subdivision below this turn angle is skipped. Zero disables
    /// the angle criterion.
    pub angle_tolerance_deg: f64,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            method: CurveApproximation::Subdivision,
            approximation_scale: 1.0,
            angle_tolerance_deg: 0.0,
        }
    }
}

const MAX_SUBDIVISION_DEPTH: u32 = 24;
const COLLINEARITY_EPSILON: f64 = 1.0e-30;
const ANGLE_TOLERANCE_EPSILON: f64 = 0.01;

fn distance_tolerance(approximation_scale: f64) -> f64 {
    let scale = approximation_scale.max(1.0e-6);
    0.5 / (scale * scale)
}

/// Flatten a quadratic Bezier with recursive subdivision. Appends every
/// generated point after `p0` (inclusive of `p2`) to `out`.
pub fn flatten_quad_div(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    approximation_scale: f64,
    angle_tolerance_deg: f64,
    out: &mut Vec<Vec2>,
) {
    let tol = distance_tolerance(approximation_scale);
    let angle_tol = angle_tolerance_deg.to_radians();
    quad_div_recursive(p0, p1, p2, tol, angle_tol, 0, out);
    out.push(p2);
}

fn quad_div_recursive(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    tol: f64,
    angle_tol: f64,
    depth: u32,
    out: &mut Vec<Vec2>,
) {
    if depth >= MAX_SUBDIVISION_DEPTH {
        return;
    }

    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p012 = p01.lerp(p12, 0.5);

    let d = p2 - p0;
    let dist = (p1 - p0).cross(d).abs();

    if dist > COLLINEARITY_EPSILON {
        // Regular case: compare control-point deviation against tolerance.
        if dist * dist <= tol * d.length_squared() {
            if angle_tol < ANGLE_TOLERANCE_EPSILON {
                out.push(p012);
                return;
            }
            let da = angle_between(p1 - p0, p2 - p1);
            if da < angle_tol {
                out.push(p012);
                return;
            }
        }
    } else {
        // Collinear control point: subdivide only while the midpoint strays
        // from the chord.
        if (p012 - p0.lerp(p2, 0.5)).length_squared() <= tol {
            out.push(p012);
            return;
        }
    }

    quad_div_recursive(p0, p01, p012, tol, angle_tol, depth + 1, out);
    quad_div_recursive(p012, p12, p2, tol, angle_tol, depth + 1, out);
}

/// Flatten a cubic Bezier with recursive subdivision. Appends every
/// generated point after `p0` (inclusive of `p3`) to `out`.
pub fn flatten_cubic_div(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    approximation_scale: f64,
    angle_tolerance_deg: f64,
    out: &mut Vec<Vec2>,
) {
    let tol = distance_tolerance(approximation_scale);
    let angle_tol = angle_tolerance_deg.to_radians();
    cubic_div_recursive(p0, p1, p2, p3, tol, angle_tol, 0, out);
    out.push(p3);
}

#[allow(clippy::too_many_arguments)]
fn cubic_div_recursive(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    tol: f64,
    angle_tol: f64,
    depth: u32,
    out: &mut Vec<Vec2>,
) {
    if depth >= MAX_SUBDIVISION_DEPTH {
        return;
    }

    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p23 = p2.lerp(p3, 0.5);
    let p012 = p01.lerp(p12, 0.5);
    let p123 = p12.lerp(p23, 0.5);
    let p0123 = p012.lerp(p123, 0.5);

    let d = p3 - p0;
    let d1 = (p1 - p0).cross(d).abs();
    let d2 = (p2 - p0).cross(d).abs();
    let dev = d1 + d2;

    let flat_enough = if dev > COLLINEARITY_EPSILON {
        dev * dev <= tol * d.length_squared()
    } else {
        (p0123 - p0.lerp(p3, 0.5)).length_squared() <= tol
    };

    if flat_enough {
        if angle_tol < ANGLE_TOLERANCE_EPSILON {
            out.push(p0123);
            return;
        }
        let da1 = angle_between(p1 - p0, p2 - p1);
        let da2 = angle_between(p2 - p1, p3 - p2);
        if da1 + da2 < angle_tol {
            out.push(p0123);
            return;
        }
    }

    cubic_div_recursive(p0, p01, p012, p0123, tol, angle_tol, depth + 1, out);
    cubic_div_recursive(p0123, p123, p23, p3, tol, angle_tol, depth + 1, out);
}

/// Flatten a quadratic Bezier at a fixed subdivision count.
pub fn flatten_quad_inc(p0: Vec2, p1: Vec2, p2: Vec2, approximation_scale: f64, out: &mut Vec<Vec2>) {
    let len = p0.distance(p1) + p1.distance(p2);
    let steps = incremental_steps(len, approximation_scale);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        out.push(eval_quad(p0, p1, p2, t));
    }
}

/// Flatten a cubic Bezier at a fixed subdivision count.
pub fn flatten_cubic_inc(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    approximation_scale: f64,
    out: &mut Vec<Vec2>,
) {
    let len = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);
    let steps = incremental_steps(len, approximation_scale);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        out.push(eval_cubic(p0, p1, p2, p3, t));
    }
}

fn incremental_steps(control_len: f64, approximation_scale: f64) -> usize {
    ((control_len * 0.25 * approximation_scale.max(1.0e-6)).sqrt() * 4.0)
        .ceil()
        .clamp(4.0, 1024.0) as usize
}

/// Evaluate a quadratic Bezier at `t`.
pub fn eval_quad(p0: Vec2, p1: Vec2, p2: Vec2, t: f64) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Evaluate a cubic Bezier at `t`.
pub fn eval_cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f64) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

fn angle_between(a: Vec2, b: Vec2) -> f64 {
    let mut da = (b.y.atan2(b.x) - a.y.atan2(a.x)).abs();
    if da > std::f64::consts::PI {
        da = std::f64::consts::TAU - da;
    }
    da
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord_error(points: &[Vec2], p0: Vec2, p1: Vec2, p2: Vec2) -> f64 {
        // Maximum distance from each flattened point to the true curve,
        // sampled densely.
        let mut max_err = 0.0f64;
        for &fp in points {
            let mut nearest = f64::INFINITY;
            for i in 0..=256 {
                let t = i as f64 / 256.0;
                nearest = nearest.min(fp.distance(eval_quad(p0, p1, p2, t)));
            }
            max_err = max_err.max(nearest);
        }
        max_err
    }

    #[test]
    fn quad_div_ends_on_endpoint() {
        let (p0, p1, p2) = (
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let mut out = Vec::new();
        flatten_quad_div(p0, p1, p2, 1.0, 0.0, &mut out);
        assert!(!out.is_empty());
        assert_eq!(*out.last().unwrap(), p2);
    }

    #[test]
    fn quad_div_points_lie_on_curve() {
        let (p0, p1, p2) = (
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let mut out = Vec::new();
        flatten_quad_div(p0, p1, p2, 1.0, 0.0, &mut out);
        assert!(chord_error(&out, p0, p1, p2) < 0.75);
    }

    #[test]
    fn higher_scale_yields_more_segments() {
        let (p0, p1, p2) = (
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let mut coarse = Vec::new();
        let mut fine = Vec::new();
        flatten_quad_div(p0, p1, p2, 0.2, 0.0, &mut coarse);
        flatten_quad_div(p0, p1, p2, 8.0, 0.0, &mut fine);
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn cubic_div_ends_on_endpoint() {
        let mut out = Vec::new();
        flatten_cubic_div(
            Vec2::new(0.0, 0.0),
            Vec2::new(25.0, 100.0),
            Vec2::new(75.0, 100.0),
            Vec2::new(100.0, 0.0),
            1.0,
            0.0,
            &mut out,
        );
        assert!(out.len() >= 2);
        assert_eq!(*out.last().unwrap(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn incremental_hits_endpoint_exactly() {
        let mut out = Vec::new();
        flatten_cubic_inc(
            Vec2::new(0.0, 0.0),
            Vec2::new(25.0, 100.0),
            Vec2::new(75.0, 100.0),
            Vec2::new(100.0, 0.0),
            1.0,
            &mut out,
        );
        let last = *out.last().unwrap();
        assert!(last.distance(Vec2::new(100.0, 0.0)) < 1e-9);
    }

    #[test]
    fn degenerate_quad_is_cheap() {
        // All control points coincident: must terminate and emit the end.
        let p = Vec2::new(5.0, 5.0);
        let mut out = Vec::new();
        flatten_quad_div(p, p, p, 1.0, 0.0, &mut out);
        assert_eq!(*out.last().unwrap(), p);
        assert!(out.len() <= 2);
    }
}
