// SPDX-License-Identifier: GPL-3.0-only

//! Frame enhancement for low-contrast decoding
//!
//! Dark or matte surfaces often defeat a decoder's finder-pattern search.
//! This pipeline brightens the frame, stretches contrast globally and
//! locally, and accentuates edges before the result is handed to a decoder.
//! It is a heuristic: it raises the odds of a successful decode on bad
//! surfaces, it guarantees nothing.
//!
//! Every step is deterministic and pure; two calls on the same frame yield
//! bit-identical output.

mod edges;
mod histogram;

pub use edges::edge_map;
pub use histogram::{clahe, equalize};

use crate::constants::{
    BRIGHTNESS_BOOST, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID, EDGE_BLEND_WEIGHT, EDGE_HIGH_THRESHOLD,
    EDGE_LOW_THRESHOLD, ENHANCED_BLEND_WEIGHT,
};
use image::GrayImage;

/// Add a constant brightness offset, saturating at 255.
pub fn brighten(src: &GrayImage, offset: u8) -> GrayImage {
    let mut out = src.clone();
    for px in out.as_mut().iter_mut() {
        *px = px.saturating_add(offset);
    }
    out
}

/// Weighted blend of two equally sized intensity images, clamped to 0-255.
pub fn blend(a: &GrayImage, weight_a: f32, b: &GrayImage, weight_b: f32) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut out = GrayImage::new(a.width(), a.height());
    for (slot, (&va, &vb)) in out
        .as_mut()
        .iter_mut()
        .zip(a.as_raw().iter().zip(b.as_raw().iter()))
    {
        let v = va as f32 * weight_a + vb as f32 * weight_b;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Run the full enhancement pipeline on a grayscale frame.
///
/// Steps, with the constants from [`crate::constants`]:
/// 1. brightness boost (saturating),
/// 2. global histogram equalization,
/// 3. CLAHE to recover local detail lost to the global stretch,
/// 4. edge map,
/// 5. weighted blend of the CLAHE result with the edge map.
pub fn enhance(src: &GrayImage) -> GrayImage {
    let brightened = brighten(src, BRIGHTNESS_BOOST);
    let equalized = equalize(&brightened);
    let local = clahe(&equalized, CLAHE_TILE_GRID, CLAHE_CLIP_LIMIT);
    let edges = edge_map(&local, EDGE_LOW_THRESHOLD, EDGE_HIGH_THRESHOLD);
    blend(&local, ENHANCED_BLEND_WEIGHT, &edges, EDGE_BLEND_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient_frame(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Luma([((x + y * 7) % 256) as u8]);
        }
        img
    }

    #[test]
    fn brighten_saturates_at_scale_maximum() {
        let img = GrayImage::from_pixel(8, 8, Luma([255]));
        let out = brighten(&img, 50);
        // Must clamp at 255, never wrap around to 49
        assert!(out.as_raw().iter().all(|&v| v == 255));
    }

    #[test]
    fn brighten_shifts_midtones() {
        let img = GrayImage::from_pixel(8, 8, Luma([100]));
        let out = brighten(&img, 50);
        assert!(out.as_raw().iter().all(|&v| v == 150));
    }

    #[test]
    fn blend_clamps_to_valid_range() {
        let a = GrayImage::from_pixel(4, 4, Luma([255]));
        let b = GrayImage::from_pixel(4, 4, Luma([255]));
        let out = blend(&a, 0.8, &b, 0.2);
        assert!(out.as_raw().iter().all(|&v| v == 255));
    }

    #[test]
    fn enhance_is_deterministic() {
        let img = gradient_frame(64, 64);
        let first = enhance(&img);
        let second = enhance(&img);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn enhance_does_not_mutate_input() {
        let img = gradient_frame(32, 32);
        let copy = img.clone();
        let _ = enhance(&img);
        assert_eq!(img.as_raw(), copy.as_raw());
    }

    #[test]
    fn enhance_of_saturated_frame_stays_saturated() {
        let img = GrayImage::from_pixel(32, 32, Luma([255]));
        let out = enhance(&img);
        // No wrap anywhere; flat frame has no edges, so the blend only
        // scales the (still saturated) CLAHE output.
        assert_eq!(out.dimensions(), (32, 32));
        assert!(out.as_raw().iter().all(|&v| v >= 200));
    }
}
