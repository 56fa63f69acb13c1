//! Render context: one buffer, one path controller, and the renderers
//! that connect them. This is the top-level drawing surface — build a
//! path through the controller, queue conversions, then render it in the
//! current color.

use tracing::warn;

use crate::buffer::{PixelFormat, RenderBuffer, TextureData};
use crate::color::Color;
use crate::controller::PathController;
use crate::outline::OutlineSettings;
use crate::raster::ScanlineKind;
use crate::render::{OutlineRenderer, ScanlineRenderer};

/// Drawing surface with an owned pixel buffer and path state.
#[derive(Debug, Clone)]
pub struct RenderContext {
    buffer: RenderBuffer,
    controller: PathController,
    color: Color,
}

impl RenderContext {
    /// Create a context for the given pixel layout. The buffer starts
    /// invalid; call `init_buffer` before rendering.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            buffer: RenderBuffer::new(format),
            controller: PathController::new(),
            color: Color::BLACK,
        }
    }

    /// (Re)allocate the pixel buffer. See `RenderBuffer::init`.
    pub fn init_buffer(&mut self, width: i32, height: i32, clear_val: u8, square_size: bool) -> bool {
        self.buffer.init(width, height, clear_val, square_size)
    }

    /// Overwrite every buffer byte.
    pub fn clear_buffer(&mut self, val: u8) {
        self.buffer.clear(val);
    }

    pub fn has_valid_buffer(&self) -> bool {
        self.buffer.is_valid()
    }

    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    /// Current render color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Current render color as a single byte on all four channels (the
    /// gray-format convenience).
    pub fn set_color_byte(&mut self, v: u8) {
        self.color = Color::gray(v);
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The path controller. Conversions queued here apply on `render`.
    pub fn path(&mut self) -> &mut PathController {
        &mut self.controller
    }

    pub fn path_ref(&self) -> &PathController {
        &self.controller
    }

    /// Fill the current path (draining pending conversions) into the
    /// buffer.
    pub fn render(&mut self, kind: ScanlineKind) {
        let color = self.color;
        let path = self.controller.storage(true);
        ScanlineRenderer::new(kind).render(&mut self.buffer, path, color);
    }

    /// Draw the current path as outlines (draining pending conversions).
    /// `closed` forces each sub-path to close back on itself.
    pub fn render_outline(&mut self, settings: OutlineSettings, closed: bool) {
        let color = self.color;
        let path = self.controller.storage(true);
        OutlineRenderer::new(settings).render(&mut self.buffer, path, color, closed);
    }

    /// Checked buffer byte read; 0 when out of range or invalid.
    pub fn byte_at(&self, index: usize) -> u8 {
        self.buffer.byte_at(index)
    }

    /// Allocate a texture matching the buffer's dimensions and layout.
    /// `None` while the buffer is invalid.
    pub fn create_texture(&self) -> Option<TextureData> {
        if !self.buffer.is_valid() {
            warn!("create_texture rejected: buffer is invalid");
            return None;
        }
        Some(TextureData::new(
            self.buffer.width() as u32,
            self.buffer.height() as u32,
            self.buffer.bytes_per_pixel() as u32,
        ))
    }

    /// Load buffer pixels from a texture. Rejected on any size mismatch.
    pub fn copy_from_texture(&mut self, tex: &TextureData) -> bool {
        if !tex.is_valid() {
            return false;
        }
        self.buffer.copy_from(&tex.data)
    }

    /// Store buffer pixels into a texture. Rejected on any size mismatch.
    pub fn copy_to_texture(&self, tex: &mut TextureData) -> bool {
        if !tex.is_valid() || tex.data.len() != (self.buffer.width().max(0) as usize)
            * (self.buffer.height().max(0) as usize)
            * (self.buffer.bytes_per_pixel().max(0) as usize)
        {
            return false;
        }
        self.buffer.copy_to(&mut tex.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_fill_end_to_end() {
        let mut ctx = RenderContext::new(PixelFormat::Gray8);
        assert!(ctx.init_buffer(32, 32, 0, false));
        ctx.set_color_byte(255);
        ctx.path().add_circle(16.0, 16.0, 10.0, 0);
        ctx.render(ScanlineKind::PackedAa);

        assert_eq!(ctx.byte_at((16 * 32 + 16) as usize), 255);
        assert_eq!(ctx.byte_at(0), 0);
    }

    #[test]
    fn stroke_conversion_applies_on_render() {
        let mut ctx = RenderContext::new(PixelFormat::Gray8);
        ctx.init_buffer(32, 32, 0, false);
        ctx.set_color_byte(255);
        ctx.path().move_to(4.0, 16.0);
        ctx.path().line_to(28.0, 16.0);
        ctx.path()
            .path_as_stroke(crate::stroke::StrokeSettings {
                width: 6.0,
                ..Default::default()
            });
        ctx.render(ScanlineKind::UnpackedAa);

        // On the stroke's center line.
        assert_eq!(ctx.byte_at((16 * 32 + 16) as usize), 255);
        // Outside the 6-wide band.
        assert_eq!(ctx.byte_at((8 * 32 + 16) as usize), 0);
        assert!(!ctx.path().has_conversions());
    }

    #[test]
    fn render_without_buffer_is_silent() {
        let mut ctx = RenderContext::new(PixelFormat::Gray8);
        ctx.path().add_circle(8.0, 8.0, 4.0, 0);
        ctx.render(ScanlineKind::PackedAa);
        assert!(!ctx.has_valid_buffer());
        assert_eq!(ctx.byte_at(0), 0);
    }

    #[test]
    fn texture_round_trip_through_context() {
        let mut ctx = RenderContext::new(PixelFormat::Gray8);
        ctx.init_buffer(8, 8, 5, false);
        let mut tex = ctx.create_texture().unwrap();
        assert!(ctx.copy_to_texture(&mut tex));
        assert_eq!(tex.data[0], 5);

        tex.data.fill(9);
        assert!(ctx.copy_from_texture(&tex));
        assert_eq!(ctx.byte_at(0), 9);
    }

    #[test]
    fn texture_size_mismatch_is_rejected() {
        let mut ctx = RenderContext::new(PixelFormat::Gray8);
        ctx.init_buffer(8, 8, 0, false);
        let mut small = TextureData::new(4, 4, 1);
        assert!(!ctx.copy_to_texture(&mut small));
        assert!(!ctx.copy_from_texture(&small));
    }

    #[test]
    fn create_texture_needs_valid_buffer() {
        let ctx = RenderContext::new(PixelFormat::Bgra32);
        assert!(ctx.create_texture().is_none());
    }
}
