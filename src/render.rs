//! Renderer façades: wire a path into the rasterizers and blend the
//! resulting coverage into a buffer with one solid color per call.
//!
//! Both renderers are silent no-ops on an empty path or an invalid
//! buffer.

use tracing::trace;

use crate::buffer::RenderBuffer;
use crate::color::Color;
use crate::outline::{outline_coverage, OutlineSettings};
use crate::path::PathStorage;
use crate::raster::{CoverRun, Rasterizer, ScanlineKind};

/// Filled-polygon renderer over the scanline rasterizer.
#[derive(Debug, Copy, Clone)]
pub struct ScanlineRenderer {
    pub kind: ScanlineKind,
}

impl Default for ScanlineRenderer {
    fn default() -> Self {
        Self {
            kind: ScanlineKind::PackedAa,
        }
    }
}

impl ScanlineRenderer {
    pub fn new(kind: ScanlineKind) -> Self {
        Self { kind }
    }

    /// Fill the path into the buffer with a solid color.
    pub fn render(&self, buf: &mut RenderBuffer, path: &PathStorage, color: Color) {
        if path.is_empty() || !buf.is_valid() {
            return;
        }
        trace!(vertices = path.num(), "scanline render");

        let mut ras = Rasterizer::new(buf.width(), buf.height());
        ras.add_path(path);
        ras.sweep(self.kind, |sl| {
            for span in &sl.spans {
                match &span.cover {
                    CoverRun::Uniform(c) => {
                        buf.blend_hline(span.x, sl.y, span.len, color, *c);
                    }
                    CoverRun::Varying(covers) => {
                        buf.blend_solid_hspan(span.x, sl.y, covers, color);
                    }
                }
            }
        });
    }
}

/// Line renderer over the distance-profile outline rasterizer.
#[derive(Debug, Copy, Clone, Default)]
pub struct OutlineRenderer {
    pub settings: OutlineSettings,
}

impl OutlineRenderer {
    pub fn new(settings: OutlineSettings) -> Self {
        Self { settings }
    }

    /// Draw the path's polylines into the buffer. `closed` forces every
    /// sub-path to connect back to its first vertex.
    pub fn render(&self, buf: &mut RenderBuffer, path: &PathStorage, color: Color, closed: bool) {
        if path.is_empty() || !buf.is_valid() {
            return;
        }
        trace!(vertices = path.num(), closed, "outline render");

        let w = buf.width();
        let h = buf.height();
        let coverage = outline_coverage(path, &self.settings, w, h, closed);
        for y in 0..h {
            let row = &coverage[(y * w) as usize..((y + 1) * w) as usize];
            // Blend only the covered stretches of the row.
            let mut x = 0usize;
            while x < row.len() {
                if row[x] == 0 {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < row.len() && row[x] != 0 {
                    x += 1;
                }
                buf.blend_solid_hspan(start as i32, y, &row[start..x], color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelFormat;

    fn square() -> PathStorage {
        let mut p = PathStorage::new();
        p.move_to(2.0, 2.0);
        p.line_to(14.0, 2.0);
        p.line_to(14.0, 14.0);
        p.line_to(2.0, 14.0);
        p.close_polygon();
        p
    }

    #[test]
    fn fill_writes_interior_pixels() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(16, 16, 0, false);
        ScanlineRenderer::default().render(&mut buf, &square(), Color::WHITE);
        assert_eq!(buf.byte_at((8 * 16 + 8) as usize), 255);
        assert_eq!(buf.byte_at(0), 0);
    }

    #[test]
    fn invalid_buffer_is_a_noop() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        ScanlineRenderer::default().render(&mut buf, &square(), Color::WHITE);
        OutlineRenderer::default().render(&mut buf, &square(), Color::WHITE, false);
        assert!(!buf.is_valid());
    }

    #[test]
    fn empty_path_is_a_noop() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(8, 8, 0, false);
        ScanlineRenderer::default().render(&mut buf, &PathStorage::new(), Color::WHITE);
        for i in 0..64 {
            assert_eq!(buf.byte_at(i), 0);
        }
    }

    #[test]
    fn all_scanline_kinds_cover_the_interior() {
        for kind in [
            ScanlineKind::PackedAa,
            ScanlineKind::UnpackedAa,
            ScanlineKind::Binary,
        ] {
            let mut buf = RenderBuffer::new(PixelFormat::Gray8);
            buf.init(16, 16, 0, false);
            ScanlineRenderer::new(kind).render(&mut buf, &square(), Color::WHITE);
            assert_eq!(buf.byte_at((8 * 16 + 8) as usize), 255, "{kind:?}");
        }
    }

    #[test]
    fn outline_draws_the_border_not_the_interior() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(16, 16, 0, false);
        let renderer = OutlineRenderer::new(OutlineSettings {
            width: 2.0,
            ..Default::default()
        });
        renderer.render(&mut buf, &square(), Color::WHITE, false);
        // Border pixel covered, center untouched.
        assert!(buf.byte_at((2 * 16 + 8) as usize) > 0);
        assert_eq!(buf.byte_at((8 * 16 + 8) as usize), 0);
    }

    #[test]
    fn bgra_fill_blends_alpha() {
        let mut buf = RenderBuffer::new(PixelFormat::Bgra32);
        buf.init(16, 16, 0, false);
        ScanlineRenderer::default().render(&mut buf, &square(), Color::new(255, 0, 0, 128));
        let idx = ((8 * 16 + 8) * 4) as usize;
        // Half-alpha red over transparent black.
        assert_eq!(buf.byte_at(idx), 0);
        assert!((buf.byte_at(idx + 2) as i32 - 128).abs() <= 1);
        assert!((buf.byte_at(idx + 3) as i32 - 128).abs() <= 1);
    }
}
