//! Path controller: a path under construction plus its pending conversion
//! queue and transform state.
//!
//! Conversions are deferred. Queueing a stroke, dash or curve-flatten does
//! not touch the stored path; the queue drains front to back the first time
//! realized geometry is requested, each step replacing the path wholesale.
//! Draining is destructive — after it, the stored path IS the converted
//! outline geometry.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::convert::Conversion;
use crate::curves::CurveSettings;
use crate::dash::DashSettings;
use crate::math::{Affine, Vec2};
use crate::path::PathStorage;
use crate::stroke::StrokeSettings;

/// Path construction and conversion front-end.
#[derive(Debug, Clone, Default)]
pub struct PathController {
    storage: PathStorage,
    conversions: VecDeque<Conversion>,
    transform: Affine,
}

impl PathController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the path and any pending conversions. Transform state survives.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.conversions.clear();
    }

    /// Total stored vertex count, terminators included.
    pub fn num(&self) -> usize {
        self.storage.num()
    }

    // ---- path commands, delegated to the storage ----

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.storage.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.storage.line_to(x, y);
    }

    pub fn curve3(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.storage.curve3(cx, cy, x, y);
    }

    pub fn curve3_smooth(&mut self, x: f64, y: f64) {
        self.storage.curve3_smooth(x, y);
    }

    pub fn curve4(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64) {
        self.storage.curve4(cx0, cy0, cx1, cy1, x, y);
    }

    pub fn curve4_smooth(&mut self, cx1: f64, cy1: f64, x: f64, y: f64) {
        self.storage.curve4_smooth(cx1, cy1, x, y);
    }

    pub fn curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.storage.curve_to(cx, cy, x, y);
    }

    #[allow(clippy::too_many_arguments)]
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
        self.storage
            .arc_to(rx, ry, rotation_deg, large_arc, sweep, x, y);
    }

    pub fn close_polygon(&mut self) {
        self.storage.close_polygon();
    }

    pub fn add_circle(&mut self, x: f64, y: f64, r: f64, step: u32) {
        self.storage.add_circle(x, y, r, step);
    }

    pub fn add_ellipse(&mut self, x: f64, y: f64, rx: f64, ry: f64, step: u32) {
        self.storage.add_ellipse(x, y, rx, ry, step);
    }

    pub fn add_round_rect(&mut self, x: f64, y: f64, rx: f64, ry: f64, w: f64, h: f64) {
        self.storage.add_round_rect(x, y, rx, ry, w, h);
    }

    // ---- transform state ----

    /// Compose a translation onto the pending transform.
    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform.multiply(&Affine::translation(x, y));
    }

    /// Compose a rotation (radians, counter-clockwise) onto the pending
    /// transform.
    pub fn rotation(&mut self, radians: f64) {
        self.transform.multiply(&Affine::rotation(radians));
    }

    /// Compose a uniform scale onto the pending transform.
    pub fn scale(&mut self, s: f64) {
        self.transform.multiply(&Affine::scaling(s));
    }

    /// Discard the pending transform.
    pub fn reset_transform(&mut self) {
        self.transform.reset();
    }

    /// Bake the pending transform into every stored vertex. The transform
    /// itself is kept; callers sharing one controller across independent
    /// shapes reset it explicitly.
    pub fn apply_transform(&mut self) {
        if self.transform.is_identity() {
            return;
        }
        self.storage.transform_all(&self.transform);
    }

    /// The pending transform (not yet baked into the path).
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    // ---- conversion queue ----

    /// Queue a stroke conversion.
    pub fn path_as_stroke(&mut self, settings: StrokeSettings) {
        self.conversions.push_back(Conversion::Stroke(settings));
    }

    /// Queue a dash-then-stroke conversion. A pattern with no usable length
    /// is rejected without touching the queue.
    pub fn path_as_dash(&mut self, dash: DashSettings, stroke: StrokeSettings) {
        if dash.pattern_length() <= 0.0 {
            warn!("dash conversion rejected: pattern has no length");
            return;
        }
        self.conversions.push_back(Conversion::Dash(dash, stroke));
    }

    /// Queue a curve-flatten conversion.
    pub fn path_as_curve(&mut self, settings: CurveSettings) {
        self.conversions.push_back(Conversion::Curve(settings));
    }

    pub fn has_conversions(&self) -> bool {
        !self.conversions.is_empty()
    }

    /// Drop pending conversions without applying them.
    pub fn clear_conversions(&mut self) {
        self.conversions.clear();
    }

    /// Drain the queue front to back, each conversion replacing the path.
    pub fn apply_conversions(&mut self) {
        if self.conversions.is_empty() {
            return;
        }
        trace!(count = self.conversions.len(), "applying path conversions");
        while let Some(conv) = self.conversions.pop_front() {
            self.storage = conv.apply(&self.storage);
        }
    }

    /// Realized vertex coordinates. `apply = true` drains the conversion
    /// queue first (destructively); `apply = false` reads the path as-is.
    pub fn to_points(&mut self, apply: bool) -> Vec<Vec2> {
        if apply {
            self.apply_conversions();
        }
        self.storage.points().collect()
    }

    /// Append realized vertex coordinates to a caller-owned vector.
    pub fn append_points(&mut self, apply: bool, out: &mut Vec<Vec2>) {
        if apply {
            self.apply_conversions();
        }
        out.extend(self.storage.points());
    }

    /// The stored path, optionally draining the conversion queue first.
    pub fn storage(&mut self, apply: bool) -> &PathStorage {
        if apply {
            self.apply_conversions();
        }
        &self.storage
    }

    /// The stored path as-is, without touching the queue.
    pub fn storage_ref(&self) -> &PathStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::LineCap;

    #[test]
    fn stroke_conversion_mutates_realized_points() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.line_to(100.0, 0.0);
        let before = c.to_points(false);

        c.path_as_stroke(StrokeSettings {
            width: 10.0,
            ..Default::default()
        });
        let after = c.to_points(true);

        assert_ne!(before, after);
        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 4);
        assert!(!c.has_conversions());
    }

    #[test]
    fn to_points_without_apply_leaves_queue_intact() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.path_as_stroke(StrokeSettings::default());

        let pts = c.to_points(false);
        assert_eq!(pts.len(), 2);
        assert!(c.has_conversions());
    }

    #[test]
    fn conversions_drain_in_fifo_order() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.curve3(50.0, 100.0, 100.0, 0.0);

        // Flatten first, then stroke: the stroke outline wraps the
        // flattened polyline, so the result has many outline vertices.
        c.path_as_curve(CurveSettings::default());
        c.path_as_stroke(StrokeSettings {
            width: 2.0,
            cap: LineCap::Butt,
            ..Default::default()
        });
        c.apply_conversions();

        let subs = c.storage(false).to_polylines();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].closed);
        assert!(subs[0].points.len() > 8);
    }

    #[test]
    fn settings_do_not_survive_a_drain() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.path_as_stroke(StrokeSettings {
            width: 10.0,
            ..Default::default()
        });
        c.apply_conversions();
        let after_first = c.num();

        // Draining again applies nothing.
        c.apply_conversions();
        assert_eq!(c.num(), after_first);
    }

    #[test]
    fn empty_dash_pattern_is_not_enqueued() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.path_as_dash(DashSettings::default(), StrokeSettings::default());
        assert!(!c.has_conversions());
    }

    #[test]
    fn transform_composes_then_bakes() {
        let mut c = PathController::new();
        c.move_to(1.0, 0.0);
        c.translate(10.0, 0.0);
        c.scale(2.0);
        c.apply_transform();

        let pts = c.to_points(false);
        assert!((pts[0].x - 22.0).abs() < 1e-12);

        // The transform survives baking until reset explicitly.
        assert!(!c.transform().is_identity());
        c.reset_transform();
        assert!(c.transform().is_identity());
    }

    #[test]
    fn clear_drops_path_and_queue() {
        let mut c = PathController::new();
        c.move_to(0.0, 0.0);
        c.line_to(1.0, 1.0);
        c.path_as_stroke(StrokeSettings::default());
        c.clear();
        assert_eq!(c.num(), 0);
        assert!(!c.has_conversions());
    }
}
