//! Dash generation: splits polyline sub-paths into alternating drawn and
//! skipped runs by walking accumulated arc length against a repeating
//! (dash, gap) pattern.
//!
//! Output sub-paths are open polylines; a dash conversion is always
//! composed with a stroke, so the dashes are widened afterwards.

use smallvec::SmallVec;

use crate::math::Vec2;
use crate::path::PathStorage;

/// Settings for a dash conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashSettings {
    /// Repeating (drawn, skipped) length pairs.
    pub pattern: SmallVec<[(f64, f64); 4]>,
    /// Arc-length offset into the pattern at the start of each sub-path.
    pub dash_start: f64,
}

impl DashSettings {
    pub fn new(pattern: &[(f64, f64)], dash_start: f64) -> Self {
        Self {
            pattern: SmallVec::from_slice(pattern),
            dash_start,
        }
    }

    /// Total length of one pattern repetition.
    pub fn pattern_length(&self) -> f64 {
        self.pattern.iter().map(|(d, g)| d + g).sum()
    }
}

const PATTERN_EPSILON: f64 = 1.0e-10;

/// Split every sub-path of `src` into dashes. A pattern with no usable
/// length passes the input through unchanged.
pub fn dash_path(src: &PathStorage, settings: &DashSettings) -> PathStorage {
    let mut out = PathStorage::new();
    if settings.pattern_length() < PATTERN_EPSILON {
        for sub in src.to_polylines() {
            let mut iter = sub.points.iter();
            if let Some(first) = iter.next() {
                out.move_to(first.x, first.y);
                for p in iter {
                    out.line_to(p.x, p.y);
                }
                if sub.closed {
                    out.close_polygon();
                }
            }
        }
        return out;
    }

    // Flattened pattern: even entries drawn, odd entries skipped.
    let dashes: Vec<f64> = settings
        .pattern
        .iter()
        .flat_map(|&(d, g)| [d.max(0.0), g.max(0.0)])
        .collect();

    for sub in src.to_polylines() {
        let mut points = sub.points.clone();
        if sub.closed {
            if let Some(&first) = points.first() {
                points.push(first);
            }
        }
        dash_polyline(&points, &dashes, settings.dash_start, &mut out);
    }
    out
}

fn dash_polyline(points: &[Vec2], dashes: &[f64], dash_start: f64, out: &mut PathStorage) {
    if points.len() < 2 {
        return;
    }

    // Advance the pattern cursor to the start offset.
    let mut curr = 0usize;
    let mut consumed = 0.0;
    let mut rest = dash_start.max(0.0);
    while rest > 0.0 {
        let remain = dashes[curr] - consumed;
        if rest >= remain {
            rest -= remain;
            curr = (curr + 1) % dashes.len();
            consumed = 0.0;
        } else {
            consumed = rest;
            rest = 0.0;
        }
    }

    let mut emit_move = true;
    for seg in points.windows(2) {
        let (p0, p1) = (seg[0], seg[1]);
        let len = p0.distance(p1);
        if len < PATTERN_EPSILON {
            continue;
        }

        let mut pos = 0.0;
        while pos < len - PATTERN_EPSILON {
            let remain = dashes[curr] - consumed;
            let take = remain.min(len - pos);
            let end = p0.lerp(p1, (pos + take) / len);

            if curr % 2 == 0 && take > 0.0 {
                if emit_move {
                    let start = p0.lerp(p1, pos / len);
                    out.move_to(start.x, start.y);
                    emit_move = false;
                }
                out.line_to(end.x, end.y);
            }

            pos += take;
            consumed += take;
            if consumed >= dashes[curr] - PATTERN_EPSILON {
                curr = (curr + 1) % dashes.len();
                consumed = 0.0;
                if curr % 2 == 0 {
                    emit_move = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_pattern_splits_line_into_dashes() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);

        let out = dash_path(&src, &DashSettings::new(&[(10.0, 10.0)], 0.0));
        let subs = out.to_polylines();
        assert_eq!(subs.len(), 5);
        for (i, sub) in subs.iter().enumerate() {
            assert!(!sub.closed);
            let start = sub.points.first().unwrap();
            let end = sub.points.last().unwrap();
            assert!((start.x - i as f64 * 20.0).abs() < 1e-9);
            assert!((end.x - (i as f64 * 20.0 + 10.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn dash_start_shifts_the_pattern() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(100.0, 0.0);

        // Starting 5 units into the first dash: first dash is half length.
        let out = dash_path(&src, &DashSettings::new(&[(10.0, 10.0)], 5.0));
        let subs = out.to_polylines();
        let first = &subs[0];
        assert!((first.points.first().unwrap().x - 0.0).abs() < 1e-9);
        assert!((first.points.last().unwrap().x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn dash_spans_segment_boundary_without_break() {
        // Corner at (10, 0) falls inside the first dash: the dash must
        // continue around it as one sub-path.
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(10.0, 0.0);
        src.line_to(10.0, 10.0);

        let out = dash_path(&src, &DashSettings::new(&[(15.0, 5.0)], 0.0));
        let subs = out.to_polylines();
        assert!(!subs.is_empty());
        let first = &subs[0];
        assert_eq!(*first.points.first().unwrap(), Vec2::new(0.0, 0.0));
        assert_eq!(*first.points.last().unwrap(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn closed_path_dashes_the_closing_segment() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(10.0, 0.0);
        src.line_to(10.0, 10.0);
        src.line_to(0.0, 10.0);
        src.close_polygon();

        let out = dash_path(&src, &DashSettings::new(&[(3.0, 2.0)], 0.0));
        // Perimeter 40 over a 5-unit pattern: eight dashes.
        assert_eq!(out.to_polylines().len(), 8);
    }

    #[test]
    fn empty_pattern_passes_through() {
        let mut src = PathStorage::new();
        src.move_to(0.0, 0.0);
        src.line_to(50.0, 0.0);

        let out = dash_path(&src, &DashSettings::default());
        let subs = out.to_polylines();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].points.len(), 2);
    }
}
