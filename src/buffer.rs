//! Render targets: the pixel-format dispatch, the owned byte buffer the
//! rasterizers blend into, and the plain texture stand-in used to move
//! pixel data in and out.

use tracing::warn;

use crate::color::{lerp_u8, Color};
use crate::math::next_power_of_two;

/// Closed set of supported pixel layouts. Dispatch happens by `match` at
/// the blend boundary; every format funnels through the same integer lerp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// One gray byte per pixel.
    Gray8,
    /// Four bytes per pixel, blue first, straight alpha.
    #[default]
    Bgra32,
    /// Gray blended into the blue channel of a 4-byte pixel.
    GrayBlue,
    /// Gray blended into the green channel of a 4-byte pixel.
    GrayGreen,
    /// Gray blended into the red channel of a 4-byte pixel.
    GrayRed,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    pub const fn bytes_per_pixel(self) -> i32 {
        match self {
            PixelFormat::Gray8 => 1,
            _ => 4,
        }
    }

    /// Channel offset for the single-channel gray formats.
    const fn gray_offset(self) -> usize {
        match self {
            PixelFormat::GrayBlue => 0,
            PixelFormat::GrayGreen => 1,
            PixelFormat::GrayRed => 2,
            _ => 0,
        }
    }

    /// Blend `color` into the pixel bytes at `px` with the given coverage.
    fn blend(self, px: &mut [u8], color: Color, cover: u8) {
        let alpha = ((color.a as u32 * cover as u32 + 127) / 255) as u8;
        if alpha == 0 {
            return;
        }
        match self {
            PixelFormat::Gray8 => {
                px[0] = lerp_u8(px[0], color.luminance(), alpha);
            }
            PixelFormat::Bgra32 => {
                px[0] = lerp_u8(px[0], color.b, alpha);
                px[1] = lerp_u8(px[1], color.g, alpha);
                px[2] = lerp_u8(px[2], color.r, alpha);
                px[3] = px[3].saturating_add(
                    (((255 - px[3] as u32) * alpha as u32 + 127) / 255) as u8,
                );
            }
            PixelFormat::GrayBlue | PixelFormat::GrayGreen | PixelFormat::GrayRed => {
                let off = self.gray_offset();
                px[off] = lerp_u8(px[off], color.luminance(), alpha);
            }
        }
    }
}

/// Owned pixel buffer with explicit validity state. `reset` pushes the
/// dimensions to -1; a buffer is renderable only while the byte length
/// matches `height * stride` exactly.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    data: Vec<u8>,
    width: i32,
    height: i32,
    bpp: i32,
    format: PixelFormat,
}

impl RenderBuffer {
    /// A fresh buffer starts invalid; call `init` before rendering.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            data: Vec::new(),
            width: -1,
            height: -1,
            bpp: -1,
            format,
        }
    }

    /// Allocate and clear the pixel store. With `square_size` both
    /// dimensions snap up to the next power of two of the larger extent.
    /// Non-positive dimensions leave the buffer invalid.
    pub fn init(&mut self, width: i32, height: i32, clear_val: u8, square_size: bool) -> bool {
        if width <= 0 || height <= 0 {
            warn!(width, height, "buffer init rejected: non-positive size");
            self.reset();
            return false;
        }
        let (w, h) = if square_size {
            let side = next_power_of_two(width.max(height) as u32) as i32;
            (side, side)
        } else {
            (width, height)
        };
        self.width = w;
        self.height = h;
        self.bpp = self.format.bytes_per_pixel();
        self.data.clear();
        self.data.resize((w * h * self.bpp) as usize, clear_val);
        true
    }

    /// Drop the pixel store and mark the buffer invalid.
    pub fn reset(&mut self) {
        self.data.clear();
        self.width = -1;
        self.height = -1;
        self.bpp = -1;
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> i32 {
        self.bpp
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn stride(&self) -> i32 {
        self.width * self.bpp
    }

    /// True while the byte store matches the declared dimensions exactly.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.bpp > 0
            && self.data.len() == (self.height * self.stride()) as usize
    }

    /// Checked byte read: 0 for any out-of-range index or invalid buffer.
    pub fn byte_at(&self, index: usize) -> u8 {
        if !self.is_valid() {
            return 0;
        }
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Unchecked byte read. Caller contract: `index` in range of a valid
    /// buffer.
    pub fn byte_at_unchecked(&self, index: usize) -> u8 {
        debug_assert!(self.is_valid() && index < self.data.len());
        self.data[index]
    }

    /// Overwrite every byte.
    pub fn clear(&mut self, val: u8) {
        self.data.fill(val);
    }

    /// Replace the pixel store from a slice. Rejected unless the length
    /// matches exactly.
    pub fn copy_from(&mut self, src: &[u8]) -> bool {
        if !self.is_valid() || src.len() != self.data.len() {
            return false;
        }
        self.data.copy_from_slice(src);
        true
    }

    /// Copy the pixel store out. Rejected unless the length matches
    /// exactly.
    pub fn copy_to(&self, dst: &mut [u8]) -> bool {
        if !self.is_valid() || dst.len() != self.data.len() {
            return false;
        }
        dst.copy_from_slice(&self.data);
        true
    }

    /// Blend a single pixel; silently ignores out-of-bounds coordinates.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, cover: u8) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.bpp as usize;
        let idx = (y * self.stride() + x * self.bpp) as usize;
        let format = self.format;
        format.blend(&mut self.data[idx..idx + bpp], color, cover);
    }

    /// Blend a horizontal run at constant coverage, clipped to the buffer.
    pub fn blend_hline(&mut self, x: i32, y: i32, len: i32, color: Color, cover: u8) {
        if y < 0 || y >= self.height || len <= 0 {
            return;
        }
        let x0 = x.max(0);
        let x1 = (x + len).min(self.width);
        if x0 >= x1 {
            return;
        }
        let bpp = self.bpp as usize;
        let format = self.format;
        let row = (y * self.stride()) as usize;
        for xi in x0..x1 {
            let idx = row + xi as usize * bpp;
            format.blend(&mut self.data[idx..idx + bpp], color, cover);
        }
    }

    /// Blend a horizontal run with per-pixel coverage, clipped to the
    /// buffer.
    pub fn blend_solid_hspan(&mut self, x: i32, y: i32, covers: &[u8], color: Color) {
        if y < 0 || y >= self.height || covers.is_empty() {
            return;
        }
        let bpp = self.bpp as usize;
        let format = self.format;
        let row = (y * self.stride()) as usize;
        for (i, &cover) in covers.iter().enumerate() {
            let xi = x + i as i32;
            if xi < 0 || xi >= self.width {
                continue;
            }
            let idx = row + xi as usize * bpp;
            format.blend(&mut self.data[idx..idx + bpp], color, cover);
        }
    }

    /// Snapshot into a texture stand-in. `None` while invalid.
    pub fn to_texture(&self) -> Option<TextureData> {
        if !self.is_valid() {
            return None;
        }
        Some(TextureData {
            width: self.width as u32,
            height: self.height as u32,
            bytes_per_pixel: self.bpp as u32,
            data: self.data.clone(),
        })
    }
}

/// Plain byte image: the stand-in for an external texture resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub data: Vec<u8>,
}

impl TextureData {
    /// Allocate a zeroed texture.
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            data: vec![0; (width * height * bytes_per_pixel) as usize],
        }
    }

    /// True while the byte length matches the declared dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.bytes_per_pixel > 0
            && self.data.len() == (self.width * self.height * self.bytes_per_pixel) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_allocates_and_clears() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        assert!(!buf.is_valid());
        assert!(buf.init(10, 5, 7, false));
        assert!(buf.is_valid());
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 5);
        assert_eq!(buf.byte_at(0), 7);
        assert_eq!(buf.byte_at(49), 7);
    }

    #[test]
    fn square_init_snaps_to_power_of_two() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        assert!(buf.init(100, 60, 0, true));
        // max(100, 60) rounds up to 128, applied to both sides.
        assert_eq!(buf.width(), 128);
        assert_eq!(buf.height(), 128);
    }

    #[test]
    fn reset_invalidates() {
        let mut buf = RenderBuffer::new(PixelFormat::Bgra32);
        buf.init(4, 4, 0, false);
        buf.reset();
        assert!(!buf.is_valid());
        assert_eq!(buf.width(), -1);
        assert_eq!(buf.height(), -1);
        assert_eq!(buf.bytes_per_pixel(), -1);
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        assert!(!buf.init(0, 10, 0, false));
        assert!(!buf.is_valid());
        assert!(!buf.init(10, -1, 0, false));
        assert!(!buf.is_valid());
    }

    #[test]
    fn byte_at_out_of_range_is_zero() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(2, 2, 9, false);
        assert_eq!(buf.byte_at(3), 9);
        assert_eq!(buf.byte_at(4), 0);
        assert_eq!(buf.byte_at(usize::MAX), 0);
    }

    #[test]
    fn copy_rejects_size_mismatch() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(4, 4, 0, false);
        assert!(!buf.copy_from(&[0u8; 15]));
        assert!(buf.copy_from(&[1u8; 16]));
        assert_eq!(buf.byte_at(0), 1);

        let mut small = [0u8; 8];
        assert!(!buf.copy_to(&mut small));
        let mut exact = [0u8; 16];
        assert!(buf.copy_to(&mut exact));
        assert_eq!(exact[5], 1);
    }

    #[test]
    fn gray_blend_full_coverage_is_opaque_write() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(4, 1, 0, false);
        buf.blend_pixel(1, 0, Color::WHITE, 255);
        assert_eq!(buf.byte_at(1), 255);
        assert_eq!(buf.byte_at(0), 0);
    }

    #[test]
    fn bgra_blend_writes_channels_in_order() {
        let mut buf = RenderBuffer::new(PixelFormat::Bgra32);
        buf.init(1, 1, 0, false);
        buf.blend_pixel(0, 0, Color::new(10, 20, 30, 255), 255);
        assert_eq!(buf.byte_at(0), 30); // blue
        assert_eq!(buf.byte_at(1), 20); // green
        assert_eq!(buf.byte_at(2), 10); // red
        assert_eq!(buf.byte_at(3), 255);
    }

    #[test]
    fn gray_channel_formats_touch_one_channel() {
        let mut buf = RenderBuffer::new(PixelFormat::GrayGreen);
        buf.init(1, 1, 0, false);
        buf.blend_pixel(0, 0, Color::WHITE, 255);
        assert_eq!(buf.byte_at(0), 0);
        assert_eq!(buf.byte_at(1), 255);
        assert_eq!(buf.byte_at(2), 0);
        assert_eq!(buf.byte_at(3), 0);
    }

    #[test]
    fn out_of_bounds_blend_is_ignored() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(2, 2, 0, false);
        buf.blend_pixel(-1, 0, Color::WHITE, 255);
        buf.blend_pixel(2, 0, Color::WHITE, 255);
        buf.blend_pixel(0, 5, Color::WHITE, 255);
        for i in 0..4 {
            assert_eq!(buf.byte_at(i), 0);
        }
    }

    #[test]
    fn hspan_clips_to_buffer() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(3, 1, 0, false);
        buf.blend_solid_hspan(-1, 0, &[255, 255, 255, 255, 255], Color::WHITE);
        assert_eq!(buf.byte_at(0), 255);
        assert_eq!(buf.byte_at(1), 255);
        assert_eq!(buf.byte_at(2), 255);
    }

    #[test]
    fn texture_round_trip() {
        let mut buf = RenderBuffer::new(PixelFormat::Gray8);
        buf.init(4, 2, 3, false);
        let tex = buf.to_texture().unwrap();
        assert!(tex.is_valid());
        assert_eq!(tex.width, 4);
        assert_eq!(tex.height, 2);
        assert_eq!(tex.data.len(), 8);

        let mut other = RenderBuffer::new(PixelFormat::Gray8);
        other.init(4, 2, 0, false);
        assert!(other.copy_from(&tex.data));
        assert_eq!(other.byte_at(7), 3);
    }
}
