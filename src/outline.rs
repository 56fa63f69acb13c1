//! Direct outline rasterization: per-pixel coverage from the distance to
//! each polyline segment, shaped by a line profile (core width plus a
//! smoother falloff band). No stroked-polygon fill is involved; segment
//! coverages combine by maximum, which keeps overlapping joints from
//! double-blending.

use crate::math::Vec2;
use crate::path::PathStorage;

/// Joint shape between consecutive segments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutlineJoin {
    /// Segments end flat at the shared vertex; outer corners stay open.
    None,
    /// Segments extend toward the miter point, clipped at the limit.
    #[default]
    Miter,
    /// Disc around the shared vertex.
    Round,
    /// Miter without the limit clip.
    MiterAccurate,
}

/// Settings for one outline render.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutlineSettings {
    /// Full line width in pixels.
    pub width: f64,
    /// Width of the falloff band on each side of the core.
    pub smoother_width: f64,
    pub join: OutlineJoin,
    /// Round discs at the two ends of an open sub-path.
    pub round_caps: bool,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            width: 1.0,
            smoother_width: 1.0,
            join: OutlineJoin::Miter,
            round_caps: false,
        }
    }
}

const MITER_LIMIT: f64 = 4.0;
// Extension clamp for the accurate miter; keeps a reversal finite.
const MITER_ACCURATE_LIMIT: f64 = 100.0;

// How a segment end contributes coverage past its vertex.
#[derive(Copy, Clone, PartialEq)]
enum EndMode {
    Butt,
    Round,
    /// Perpendicular band extended by this length.
    Extend(f64),
}

struct Segment {
    a: Vec2,
    b: Vec2,
    start: EndMode,
    end: EndMode,
}

/// Rasterize the path's sub-paths as outlines into a coverage map of
/// `width * height` bytes. `force_closed` joins each sub-path's last
/// vertex back to its first regardless of how the path was built.
pub fn outline_coverage(
    path: &PathStorage,
    settings: &OutlineSettings,
    width: i32,
    height: i32,
    force_closed: bool,
) -> Vec<u8> {
    let mut coverage = vec![0u8; (width.max(0) * height.max(0)) as usize];
    if width <= 0 || height <= 0 {
        return coverage;
    }

    let profile = Profile::new(settings);
    for sub in path.to_polylines() {
        let closed = force_closed || sub.closed;
        let segments = build_segments(&sub.points, closed, settings);
        for seg in &segments {
            rasterize_segment(seg, &profile, width, height, &mut coverage);
        }
    }
    coverage
}

/// Line profile: maps distance from the line center to coverage.
struct Profile {
    half: f64,
    smoother: f64,
    /// Peak coverage; below one pixel of width the line thins by
    /// intensity instead of vanishing.
    peak: f64,
}

impl Profile {
    fn new(settings: &OutlineSettings) -> Self {
        let half = (settings.width * 0.5).max(0.0);
        let smoother = settings.smoother_width.max(0.5);
        let peak = (settings.width / smoother).min(1.0).max(0.0);
        Self {
            half,
            smoother,
            peak,
        }
    }

    fn reach(&self) -> f64 {
        self.half + self.smoother * 0.5
    }

    fn coverage(&self, dist: f64) -> f64 {
        let inner = self.half - self.smoother * 0.5;
        if dist <= inner {
            self.peak
        } else if dist >= self.half + self.smoother * 0.5 {
            0.0
        } else {
            self.peak * (1.0 - (dist - inner) / self.smoother)
        }
    }
}

fn build_segments(points: &[Vec2], closed: bool, settings: &OutlineSettings) -> Vec<Segment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let half = (settings.width * 0.5).max(0.0);
    let seg_count = if closed { n } else { n - 1 };
    let mut segments = Vec::with_capacity(seg_count);

    let cap = if settings.round_caps {
        EndMode::Round
    } else {
        EndMode::Butt
    };

    // Joint behavior at an interior vertex, given incoming and outgoing
    // directions.
    let joint = |d_in: Vec2, d_out: Vec2| -> EndMode {
        match settings.join {
            OutlineJoin::None => EndMode::Butt,
            OutlineJoin::Round => EndMode::Round,
            OutlineJoin::Miter | OutlineJoin::MiterAccurate => {
                let cos = d_in.dot(d_out).clamp(-1.0, 1.0);
                let phi = cos.acos();
                let ext = half * (phi * 0.5).tan();
                let limit = if settings.join == OutlineJoin::Miter {
                    half * MITER_LIMIT
                } else {
                    half * MITER_ACCURATE_LIMIT
                };
                EndMode::Extend(ext.min(limit).max(0.0))
            }
        }
    };

    for i in 0..seg_count {
        let a = points[i];
        let b = points[(i + 1) % n];
        let dir = (b - a).normalized();

        let start = if closed || i > 0 {
            let prev = points[(i + n - 1) % n];
            let d_in = (a - prev).normalized();
            joint(d_in, dir)
        } else {
            cap
        };
        let end = if closed || i + 1 < seg_count {
            let next = points[(i + 2) % n];
            let d_out = (next - b).normalized();
            joint(dir, d_out)
        } else {
            cap
        };

        segments.push(Segment { a, b, start, end });
    }
    segments
}

fn rasterize_segment(
    seg: &Segment,
    profile: &Profile,
    width: i32,
    height: i32,
    coverage: &mut [u8],
) {
    let reach = profile.reach();
    let ext = |mode: EndMode| match mode {
        EndMode::Extend(e) => e,
        _ => 0.0,
    };
    let margin = reach + ext(seg.start).max(ext(seg.end));

    let min = seg.a.min(seg.b) - Vec2::new(margin, margin);
    let max = seg.a.max(seg.b) + Vec2::new(margin, margin);
    let x0 = (min.x.floor() as i32).max(0);
    let y0 = (min.y.floor() as i32).max(0);
    let x1 = (max.x.ceil() as i32).min(width - 1);
    let y1 = (max.y.ceil() as i32).min(height - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let ab = seg.b - seg.a;
    let len = ab.length();
    if len < f64::EPSILON {
        return;
    }
    let dir = ab / len;

    let t_min = -ext(seg.start);
    let t_max = len + ext(seg.end);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Vec2::new(x as f64 + 0.5, y as f64 + 0.5);
            let rel = p - seg.a;
            let t = rel.dot(dir);

            let dist = if t < t_min {
                match seg.start {
                    EndMode::Round => p.distance(seg.a),
                    _ => continue,
                }
            } else if t > t_max {
                match seg.end {
                    EndMode::Round => p.distance(seg.b),
                    _ => continue,
                }
            } else if t < 0.0 && seg.start == EndMode::Round {
                p.distance(seg.a)
            } else if t > len && seg.end == EndMode::Round {
                p.distance(seg.b)
            } else {
                rel.cross(dir).abs()
            };

            let c = (profile.coverage(dist) * 255.0).round() as u8;
            if c > 0 {
                let idx = (y * width + x) as usize;
                coverage[idx] = coverage[idx].max(c);
            }
        }
    }
}
