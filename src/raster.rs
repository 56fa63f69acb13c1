//! Polygon rasterization into anti-aliased scanlines.
//!
//! Edges accumulate signed per-pixel area deltas into a row-major f32
//! grid; a horizontal prefix sum per row then yields winding coverage,
//! quantized to 256 levels with a non-zero fill rule. Sub-paths are
//! always treated as closed polygons for filling.

use smallvec::SmallVec;

use crate::math::Vec2;
use crate::path::PathStorage;

/// Full coverage value (256 levels, 0..=255).
pub const COVER_FULL: u8 = 255;

/// Span representation produced by a sweep.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanlineKind {
    /// Runs of equal coverage collapse into solid spans.
    PackedAa,
    /// One coverage byte per pixel across each non-zero run.
    UnpackedAa,
    /// Any non-zero coverage becomes full coverage.
    Binary,
}

/// Coverage payload of one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverRun {
    /// Every pixel in the span shares this coverage.
    Uniform(u8),
    /// Per-pixel coverage, one byte per pixel.
    Varying(SmallVec<[u8; 64]>),
}

/// A horizontal run of covered pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub len: i32,
    pub cover: CoverRun,
}

/// One rasterized row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanline {
    pub y: i32,
    pub spans: SmallVec<[Span; 8]>,
}

/// Accumulation-grid rasterizer clipped to a fixed pixel extent.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    width: i32,
    height: i32,
    // One extra column absorbs right-edge deltas.
    stride: usize,
    cells: Vec<f32>,
    min_y: i32,
    max_y: i32,
}

impl Rasterizer {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let stride = width as usize + 2;
        Self {
            width,
            height,
            stride,
            cells: vec![0.0; stride * height as usize],
            min_y: height,
            max_y: -1,
        }
    }

    /// Discard accumulated edges.
    pub fn reset(&mut self) {
        self.cells.fill(0.0);
        self.min_y = self.height;
        self.max_y = -1;
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Accumulate every sub-path of `path` as a closed polygon.
    pub fn add_path(&mut self, path: &PathStorage) {
        for sub in path.to_polylines() {
            let pts = &sub.points;
            if pts.len() < 2 {
                continue;
            }
            for seg in pts.windows(2) {
                self.add_edge(seg[0], seg[1]);
            }
            // Filling always closes the contour.
            if let (Some(&last), Some(&first)) = (pts.last(), pts.first()) {
                self.add_edge(last, first);
            }
        }
    }

    /// Accumulate one edge. Horizontal edges contribute nothing.
    fn add_edge(&mut self, p0: Vec2, p1: Vec2) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        if (p0.y - p1.y).abs() <= f64::EPSILON {
            return;
        }
        let (dir, top, bot) = if p0.y < p1.y {
            (1.0f32, p0, p1)
        } else {
            (-1.0f32, p1, p0)
        };
        let dxdy = (bot.x - top.x) / (bot.y - top.y);

        let y_start = top.y.max(0.0).floor() as i32;
        let y_end = (bot.y.ceil() as i32).min(self.height);
        if y_start >= y_end {
            return;
        }
        self.min_y = self.min_y.min(y_start);
        self.max_y = self.max_y.max(y_end - 1);

        let w = self.width as f64;
        let mut x = top.x + (y_start as f64 - top.y).max(0.0) * dxdy;

        for y in y_start..y_end {
            let row = y as usize * self.stride;
            let dy = ((y + 1) as f64).min(bot.y) - (y as f64).max(top.y);
            let xnext = x + dxdy * dy;
            let d = dy as f32 * dir;

            // Clamp into the grid; out-of-range area piles up at the
            // borders where opposing edges cancel.
            let xa = x.clamp(0.0, w);
            let xb = xnext.clamp(0.0, w);
            let (x0, x1) = if xa < xb { (xa, xb) } else { (xb, xa) };

            let x0floor = x0.floor();
            let x0i = x0floor as usize;
            let x1ceil = x1.ceil();
            let x1i = x1ceil as usize;

            if x1i <= x0i + 1 {
                // Whole step inside one pixel column.
                let xmf = (0.5 * (xa + xb) - x0floor) as f32;
                self.cells[row + x0i] += d * (1.0 - xmf);
                self.cells[row + x0i + 1] += d * xmf;
            } else {
                let s = ((x1 - x0).recip()) as f32;
                let x0f = (x0 - x0floor) as f32;
                let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
                let x1f = (x1 - x1ceil + 1.0) as f32;
                let am = 0.5 * s * x1f * x1f;
                self.cells[row + x0i] += d * a0;
                if x1i == x0i + 2 {
                    self.cells[row + x0i + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - x0f);
                    self.cells[row + x0i + 1] += d * (a1 - a0);
                    for xi in x0i + 2..x1i - 1 {
                        self.cells[row + xi] += d * s;
                    }
                    let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                    self.cells[row + x1i - 1] += d * (1.0 - a2 - am);
                }
                self.cells[row + x1i] += d * am;
            }
            x = xnext;
        }
    }

    /// Sweep the accumulated coverage into scanlines, top to bottom,
    /// calling `emit` for every row that has at least one span.
    pub fn sweep<F: FnMut(&Scanline)>(&self, kind: ScanlineKind, mut emit: F) {
        if self.max_y < self.min_y {
            return;
        }
        let mut covers: Vec<u8> = vec![0; self.width as usize];
        for y in self.min_y..=self.max_y {
            let row = y as usize * self.stride;
            let mut acc = 0.0f32;
            let mut any = false;
            for xi in 0..self.width as usize {
                acc += self.cells[row + xi];
                // Non-zero fill: magnitude of the winding coverage.
                let c = (acc.abs() * 255.0).round().min(255.0) as u8;
                covers[xi] = c;
                any |= c != 0;
            }
            if !any {
                continue;
            }
            let sl = build_scanline(y, &covers, kind);
            if !sl.spans.is_empty() {
                emit(&sl);
            }
        }
    }
}

fn build_scanline(y: i32, covers: &[u8], kind: ScanlineKind) -> Scanline {
    let mut spans: SmallVec<[Span; 8]> = SmallVec::new();
    let mut x = 0usize;
    while x < covers.len() {
        if covers[x] == 0 {
            x += 1;
            continue;
        }
        let start = x;
        match kind {
            ScanlineKind::PackedAa => {
                // Run of equal coverage.
                let c = covers[x];
                while x < covers.len() && covers[x] == c {
                    x += 1;
                }
                spans.push(Span {
                    x: start as i32,
                    len: (x - start) as i32,
                    cover: CoverRun::Uniform(c),
                });
            }
            ScanlineKind::UnpackedAa => {
                while x < covers.len() && covers[x] != 0 {
                    x += 1;
                }
                spans.push(Span {
                    x: start as i32,
                    len: (x - start) as i32,
                    cover: CoverRun::Varying(SmallVec::from_slice(&covers[start..x])),
                });
            }
            ScanlineKind::Binary => {
                while x < covers.len() && covers[x] != 0 {
                    x += 1;
                }
                spans.push(Span {
                    x: start as i32,
                    len: (x - start) as i32,
                    cover: CoverRun::Uniform(COVER_FULL),
                });
            }
        }
    }
    Scanline { y, spans }
}
