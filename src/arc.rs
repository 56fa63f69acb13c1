//! SVG endpoint-parameterized elliptical arcs, expanded into cubic Beziers
//! via the standard endpoint-to-center conversion.

use crate::math::Vec2;

// Largest angular extent approximated by a single cubic segment.
const MAX_SEGMENT_SWEEP: f64 = std::f64::consts::FRAC_PI_2;

/// Convert an endpoint arc into cubic Bezier segments.
///
/// `rotation` is the ellipse x-axis rotation in radians. Radii are scaled up
/// when no ellipse through both endpoints exists, per the SVG rules. Returns
/// an empty vector only for degenerate input the caller should replace with
/// a straight line (the path layer checks radii and coincident endpoints
/// before calling, so that is a second line of defense).
///
/// Each returned segment is `[p0, c1, c2, p3]` in final (rotated,
/// translated) coordinates; consecutive segments share endpoints.
pub fn arc_to_cubics(
    start: Vec2,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
    end: Vec2,
) -> Vec<[Vec2; 4]> {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx <= 0.0 || ry <= 0.0 {
        return Vec::new();
    }

    let (sin_phi, cos_phi) = rotation.sin_cos();

    // Step 1: midpoint vector in the ellipse's local frame.
    let dx2 = (start.x - end.x) * 0.5;
    let dy2 = (start.y - end.y) * 0.5;
    let x1 = cos_phi * dx2 + sin_phi * dy2;
    let y1 = -sin_phi * dx2 + cos_phi * dy2;

    // Step 2: scale radii up if the endpoints are too far apart.
    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    // Step 3: center in the local frame.
    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let x12 = x1 * x1;
    let y12 = y1 * y1;
    let num = rx2 * ry2 - rx2 * y12 - ry2 * x12;
    let den = rx2 * y12 + ry2 * x12;
    if den == 0.0 {
        return Vec::new();
    }
    let mut coef = (num / den).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cx1 = coef * rx * y1 / ry;
    let cy1 = -coef * ry * x1 / rx;

    // Center in the caller's frame.
    let sx2 = (start.x + end.x) * 0.5;
    let sy2 = (start.y + end.y) * 0.5;
    let cx = sx2 + cos_phi * cx1 - sin_phi * cy1;
    let cy = sy2 + sin_phi * cx1 + cos_phi * cy1;

    // Step 4: start angle and sweep extent.
    let ux = (x1 - cx1) / rx;
    let uy = (y1 - cy1) / ry;
    let vx = (-x1 - cx1) / rx;
    let vy = (-y1 - cy1) / ry;

    let theta1 = uy.atan2(ux);
    let mut dtheta = (vy.atan2(vx) - theta1) % std::f64::consts::TAU;
    if !sweep && dtheta > 0.0 {
        dtheta -= std::f64::consts::TAU;
    } else if sweep && dtheta < 0.0 {
        dtheta += std::f64::consts::TAU;
    }

    if dtheta == 0.0 {
        return Vec::new();
    }

    // Step 5: approximate each slice with one cubic.
    let segments = (dtheta.abs() / MAX_SEGMENT_SWEEP).ceil().max(1.0) as usize;
    let delta = dtheta / segments as f64;
    // Control-point distance for a unit-circle slice of `delta` radians.
    let alpha = 4.0 / 3.0 * (delta * 0.25).tan();

    let eval = |theta: f64| -> (Vec2, Vec2) {
        let (sin_t, cos_t) = theta.sin_cos();
        let p = Vec2::new(
            cx + cos_phi * rx * cos_t - sin_phi * ry * sin_t,
            cy + sin_phi * rx * cos_t + cos_phi * ry * sin_t,
        );
        // Derivative direction (unnormalized) at theta.
        let d = Vec2::new(
            -cos_phi * rx * sin_t - sin_phi * ry * cos_t,
            -sin_phi * rx * sin_t + cos_phi * ry * cos_t,
        );
        (p, d)
    };

    let mut out = Vec::with_capacity(segments);
    let mut p_prev = start;
    let (_, mut d_prev) = eval(theta1);
    for i in 1..=segments {
        let theta = theta1 + delta * i as f64;
        let (mut p, d) = eval(theta);
        if i == segments {
            // Land exactly on the requested endpoint.
            p = end;
        }
        let c1 = p_prev + d_prev * alpha;
        let c2 = p - d * alpha;
        out.push([p_prev, c1, c2, p]);
        p_prev = p;
        d_prev = d;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_cubic(c: &[Vec2; 4], t: f64) -> Vec2 {
        let u = 1.0 - t;
        c[0] * (u * u * u) + c[1] * (3.0 * u * u * t) + c[2] * (3.0 * u * t * t) + c[3] * (t * t * t)
    }

    #[test]
    fn quarter_circle_radial_deviation_is_tiny() {
        let r = 100.0;
        let cubics = arc_to_cubics(
            Vec2::new(r, 0.0),
            r,
            r,
            0.0,
            false,
            true,
            Vec2::new(0.0, r),
        );
        assert!(!cubics.is_empty());

        // The arc around the origin: every sampled point must sit within
        // 0.01% of the radius.
        let mut worst = 0.0f64;
        for c in &cubics {
            for i in 0..=64 {
                let p = eval_cubic(c, i as f64 / 64.0);
                let dev = (p.length() - r).abs();
                worst = worst.max(dev);
            }
        }
        assert!(worst < r * 1.0e-4, "radial deviation {worst}");
    }

    #[test]
    fn endpoints_are_exact() {
        let start = Vec2::new(10.0, 20.0);
        let end = Vec2::new(60.0, 80.0);
        let cubics = arc_to_cubics(start, 50.0, 40.0, 0.3, true, false, end);
        assert!(!cubics.is_empty());
        assert_eq!(cubics.first().unwrap()[0], start);
        assert_eq!(cubics.last().unwrap()[3], end);
    }

    #[test]
    fn large_arc_covers_more_segments() {
        let start = Vec2::new(100.0, 0.0);
        let end = Vec2::new(0.0, 100.0);
        let small = arc_to_cubics(start, 100.0, 100.0, 0.0, false, true, end);
        let large = arc_to_cubics(start, 100.0, 100.0, 0.0, true, false, end);
        assert!(large.len() > small.len());
    }

    #[test]
    fn undersized_radii_are_scaled_up() {
        // Radii far too small for the endpoint distance; the SVG rules scale
        // them so a valid arc still exists and hits the endpoint.
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(100.0, 0.0);
        let cubics = arc_to_cubics(start, 1.0, 1.0, 0.0, false, true, end);
        assert!(!cubics.is_empty());
        assert_eq!(cubics.last().unwrap()[3], end);
    }
}
