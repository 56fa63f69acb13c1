//! Pseudo-height synthesis from a flat rasterized shape: a flood fill
//! assigns every solid pixel a distance rank from the shape border, ranks are
//! redistributed through a quadratic-area law, and a fixed 3x3 average
//! smooths the result.
//!
//! Output is deterministic: the border scan is row-major, the BFS visits
//! neighbors in a fixed order, and rank ties break by pixel index.

use std::collections::VecDeque;

use tracing::warn;

use crate::buffer::{RenderBuffer, TextureData};
use crate::error::Error;

// Neighbor visit order: E, NE, N, NW, W, SW, S, SE.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const RELIEF_EPSILON: f64 = 1.0e-4;

/// Optional remap applied to each smoothed elevation value.
pub type ResponseCurve<'a> = &'a dyn Fn(f32) -> f32;

/// Generate a per-pixel elevation map from the buffer's solid mask
/// (first byte of each pixel >= `solid_threshold`).
///
/// Returns one f32 per pixel, zero at non-solid pixels. A mask without
/// enough relief (one solid pixel or none) yields an all-zero map.
pub fn generate_depth_map(
    buffer: &RenderBuffer,
    solid_threshold: u8,
    response: Option<ResponseCurve>,
) -> Result<Vec<f32>, Error> {
    if !buffer.is_valid() {
        warn!("depth map aborted: invalid render buffer");
        return Err(Error::InvalidBuffer);
    }
    let w = buffer.width();
    let h = buffer.height();
    if w < 3 || h < 3 {
        warn!(width = w, height = h, "depth map aborted: buffer too small");
        return Err(Error::UndersizedDepthMap {
            width: w,
            height: h,
        });
    }

    let size = (w * h) as usize;
    let bpp = buffer.bytes_per_pixel() as usize;
    let solid = |i: usize| buffer.byte_at(i * bpp) >= solid_threshold;

    let mut visited = vec![false; size];
    let mut rank = vec![0i32; size];
    let mut borders: Vec<usize> = Vec::new();

    // Border pass: any solid pixel with a non-solid or out-of-bounds
    // 8-neighbor, scanned row-major.
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            if !solid(i) {
                continue;
            }
            let is_border = NEIGHBOR_OFFSETS.iter().any(|&(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    true
                } else {
                    !solid((ny * w + nx) as usize)
                }
            });
            if is_border {
                visited[i] = true;
                borders.push(i);
            }
        }
    }

    let neighbors = |i: usize| {
        let x = i as i32 % w;
        let y = i as i32 / w;
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                None
            } else {
                Some((ny * w + nx) as usize)
            }
        })
    };

    // Seed: the first interior ring around every border pixel gets rank 1.
    let mut queue: VecDeque<usize> = VecDeque::new();
    for &b in &borders {
        for ni in neighbors(b) {
            if !visited[ni] && solid(ni) {
                rank[ni] = 1;
                visited[ni] = true;
                queue.push_back(ni);
            }
        }
    }

    // BFS inward.
    while let Some(i) = queue.pop_front() {
        let next = rank[i] + 1;
        for ni in neighbors(i) {
            if !visited[ni] && solid(ni) {
                rank[ni] = next;
                visited[ni] = true;
                queue.push_back(ni);
            }
        }
    }

    let mut sorted: Vec<usize> = (0..size).filter(|&i| visited[i]).collect();
    sorted.sort_unstable_by_key(|&i| (rank[i], i));

    let n = sorted.len();
    if n <= 1 {
        warn!(solid = n, "depth map degenerate: not enough solid pixels");
        return Ok(vec![0.0; size]);
    }

    // Rank-position redistribution: let y(x) = 1 - (1-x)^2 be the area at
    // elevation <= x, so high elevations occupy less area than low ones.
    let redistribute = |pos: usize| -> f64 {
        let y = pos as f64 / (n - 1) as f64;
        1.1f64.sqrt() - (1.1 * (1.0 - y)).sqrt()
    };
    let max_elevation = redistribute(n - 1);
    if max_elevation <= RELIEF_EPSILON {
        warn!("depth map degenerate: insufficient relief");
        return Ok(vec![0.0; size]);
    }
    let scale = 1.0 / max_elevation;

    let mut elevation = vec![0.0f64; size];
    for (pos, &i) in sorted.iter().enumerate() {
        elevation[i] = redistribute(pos) * scale;
    }

    // Fixed 3x3 average: own value plus every solid neighbor's, always
    // divided by nine.
    let mut out = vec![0.0f32; size];
    for &i in &sorted {
        let mut e = elevation[i];
        for ni in neighbors(i) {
            if visited[ni] {
                e += elevation[ni];
            }
        }
        e /= 9.0;
        let mut v = e as f32;
        if let Some(curve) = response {
            v = curve(v);
        }
        out[i] = v;
    }
    Ok(out)
}

/// Generate a depth map packed into a texture of little-endian f32
/// pixels.
pub fn generate_depth_map_texture(
    buffer: &RenderBuffer,
    solid_threshold: u8,
    response: Option<ResponseCurve>,
) -> Result<TextureData, Error> {
    let map = generate_depth_map(buffer, solid_threshold, response)?;
    let mut tex = TextureData::new(
        buffer.width() as u32,
        buffer.height() as u32,
        std::mem::size_of::<f32>() as u32,
    );
    for (dst, v) in tex.data.chunks_exact_mut(4).zip(&map) {
        dst.copy_from_slice(&v.to_le_bytes());
    }
    Ok(tex)
}
