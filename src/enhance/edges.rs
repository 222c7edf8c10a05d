// SPDX-License-Identifier: GPL-3.0-only

//! Edge map extraction
//!
//! Canny-style detector: Sobel gradients, non-maximum suppression along the
//! quantized gradient direction, then double-threshold hysteresis. Output is
//! a binary map (255 on edges).

use image::GrayImage;

/// Compute the edge map of `src` with hysteresis thresholds `low`/`high`.
pub fn edge_map(src: &GrayImage, low: u8, high: u8) -> GrayImage {
    let w = src.width() as usize;
    let h = src.height() as usize;
    let mut out = GrayImage::new(src.width(), src.height());
    if w < 3 || h < 3 {
        return out;
    }

    let (mag, dir) = gradients_and_directions(src);
    let nms = non_max_suppression(w, h, &mag, &dir);
    hysteresis(w, h, &nms, low as f32, (high.max(low)) as f32, out.as_mut());
    out
}

/// Gradient magnitude and direction quantized to 4 bins:
/// 0 = horizontal, 1 = 45°, 2 = vertical, 3 = 135°.
fn gradients_and_directions(src: &GrayImage) -> (Vec<f32>, Vec<u8>) {
    let w = src.width() as usize;
    let h = src.height() as usize;
    let raw = src.as_raw();

    let mut mag = vec![0.0f32; w * h];
    let mut dir = vec![0u8; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let p = |dx: isize, dy: isize| -> i32 {
                let xx = (x as isize + dx) as usize;
                let yy = (y as isize + dy) as usize;
                raw[yy * w + xx] as i32
            };

            let gx = -p(-1, -1) + p(1, -1) - 2 * p(-1, 0) + 2 * p(1, 0) - p(-1, 1) + p(1, 1);
            let gy = -p(-1, -1) - 2 * p(0, -1) - p(1, -1) + p(-1, 1) + 2 * p(0, 1) + p(1, 1);

            let idx = y * w + x;
            mag[idx] = ((gx * gx + gy * gy) as f32).sqrt();

            let angle = (gy as f32).atan2(gx as f32).to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };
            dir[idx] = if !(22.5..157.5).contains(&angle) {
                0
            } else if angle < 67.5 {
                1
            } else if angle < 112.5 {
                2
            } else {
                3
            };
        }
    }

    (mag, dir)
}

/// Keep only pixels that are local maxima along their gradient direction.
fn non_max_suppression(w: usize, h: usize, mag: &[f32], dir: &[u8]) -> Vec<f32> {
    let mut nms = vec![0.0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = mag[idx];
            if m == 0.0 {
                continue;
            }
            let (a, b) = match dir[idx] {
                0 => (mag[idx - 1], mag[idx + 1]),
                1 => (mag[idx - w + 1], mag[idx + w - 1]),
                2 => (mag[idx - w], mag[idx + w]),
                _ => (mag[idx - w - 1], mag[idx + w + 1]),
            };
            if m >= a && m >= b {
                nms[idx] = m;
            }
        }
    }
    nms
}

/// Double-threshold hysteresis: seed from strong pixels, then flood through
/// 8-connected weak pixels.
fn hysteresis(w: usize, h: usize, nms: &[f32], low: f32, high: f32, out: &mut [u8]) {
    let mut stack: Vec<usize> = Vec::new();

    for (idx, &m) in nms.iter().enumerate() {
        if m >= high && out[idx] == 0 {
            out[idx] = 255;
            stack.push(idx);
        }
        while let Some(seed) = stack.pop() {
            let x = seed % w;
            let y = seed / w;
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                        continue;
                    }
                    let n = ny as usize * w + nx as usize;
                    if out[n] == 0 && nms[n] >= low {
                        out[n] = 255;
                        stack.push(n);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn constant_image_has_no_edges() {
        let img = GrayImage::from_pixel(16, 16, Luma([100]));
        let edges = edge_map(&img, 50, 150);
        assert!(edges.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn vertical_step_produces_vertical_edge() {
        let mut img = GrayImage::new(16, 16);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = Luma([if x < 8 { 0 } else { 255 }]);
        }
        let edges = edge_map(&img, 50, 150);
        // The step column must be marked
        let hits = (1..15).filter(|&y| edges.get_pixel(8, y)[0] == 255 || edges.get_pixel(7, y)[0] == 255).count();
        assert!(hits >= 10, "expected a vertical edge, got {} hits", hits);
        // Flat regions stay clear
        assert_eq!(edges.get_pixel(2, 8)[0], 0);
        assert_eq!(edges.get_pixel(13, 8)[0], 0);
    }

    #[test]
    fn weak_gradient_below_low_threshold_is_dropped() {
        let mut img = GrayImage::new(16, 16);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = Luma([if x < 8 { 100 } else { 110 }]);
        }
        let edges = edge_map(&img, 50, 150);
        assert!(edges.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn tiny_image_is_all_zero() {
        let img = GrayImage::from_pixel(2, 2, Luma([255]));
        let edges = edge_map(&img, 50, 150);
        assert!(edges.as_raw().iter().all(|&v| v == 0));
    }
}
