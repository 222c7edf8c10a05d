// SPDX-License-Identifier: GPL-3.0-only

//! Global and local histogram operations

use image::GrayImage;

fn compute_histogram(pixels: impl Iterator<Item = u8>) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for v in pixels {
        hist[v as usize] += 1;
    }
    hist
}

fn compute_cdf(hist: &[u32; 256]) -> [u32; 256] {
    let mut cdf = [0u32; 256];
    cdf[0] = hist[0];
    for i in 1..256 {
        cdf[i] = cdf[i - 1] + hist[i];
    }
    cdf
}

/// Build the equalization LUT for a (possibly clipped) histogram.
///
/// Constant regions map to identity: with a single occupied bin the
/// denominator collapses and stretching would amplify nothing but noise.
fn equalization_lut(hist: &[u32; 256]) -> [u8; 256] {
    let cdf = compute_cdf(hist);
    let cdf_min = cdf.iter().copied().find(|&v| v > 0).unwrap_or(0);
    let total = cdf[255];

    let mut lut = [0u8; 256];
    if total > cdf_min {
        let denom = (total - cdf_min) as f32;
        for i in 0..256 {
            let val = (cdf[i].saturating_sub(cdf_min)) as f32 / denom * 255.0;
            lut[i] = val.round().min(255.0) as u8;
        }
    } else {
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = i as u8;
        }
    }
    lut
}

/// Global histogram equalization: redistribute intensities over the full
/// 0-255 range.
pub fn equalize(src: &GrayImage) -> GrayImage {
    let hist = compute_histogram(src.as_raw().iter().copied());
    let lut = equalization_lut(&hist);

    let mut out = src.clone();
    for px in out.as_mut().iter_mut() {
        *px = lut[*px as usize];
    }
    out
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into `tiles` regions; each gets its own clipped
/// equalization LUT, and every pixel is mapped by bilinear interpolation
/// between the four nearest tile LUTs, which hides the tile seams.
pub fn clahe(src: &GrayImage, tiles: (usize, usize), clip_limit: f32) -> GrayImage {
    let w = src.width() as usize;
    let h = src.height() as usize;
    let (tiles_x, tiles_y) = tiles;
    if w == 0 || h == 0 || tiles_x == 0 || tiles_y == 0 {
        return src.clone();
    }
    let tile_w = w / tiles_x;
    let tile_h = h / tiles_y;
    if tile_w == 0 || tile_h == 0 {
        // Image too small to tile; plain equalization is the sane fallback
        return equalize(src);
    }

    let raw = src.as_raw();
    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            // Last row/column of tiles absorbs the remainder
            let x1 = if tx == tiles_x - 1 { w } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { h } else { y0 + tile_h };
            let tile_pixels = ((x1 - x0) * (y1 - y0)) as u32;

            let mut hist = [0u32; 256];
            for row in y0..y1 {
                for col in x0..x1 {
                    hist[raw[row * w + col] as usize] += 1;
                }
            }

            clip_histogram(&mut hist, tile_pixels, clip_limit);
            luts[ty * tiles_x + tx] = equalization_lut(&hist);
        }
    }

    let mut out = GrayImage::new(src.width(), src.height());
    let out_raw = out.as_mut();
    let tw = tile_w as f32;
    let th = tile_h as f32;

    for y in 0..h {
        let fy = (y as f32 + 0.5) / th - 0.5;
        let ty0 = (fy.floor() as i32).clamp(0, tiles_y as i32 - 1) as usize;
        let ty1 = (fy.floor() as i32 + 1).clamp(0, tiles_y as i32 - 1) as usize;
        let ay = fy - fy.floor();

        for x in 0..w {
            let fx = (x as f32 + 0.5) / tw - 0.5;
            let tx0 = (fx.floor() as i32).clamp(0, tiles_x as i32 - 1) as usize;
            let tx1 = (fx.floor() as i32 + 1).clamp(0, tiles_x as i32 - 1) as usize;
            let ax = fx - fx.floor();

            let v = raw[y * w + x] as usize;
            let v00 = luts[ty0 * tiles_x + tx0][v] as f32;
            let v10 = luts[ty0 * tiles_x + tx1][v] as f32;
            let v01 = luts[ty1 * tiles_x + tx0][v] as f32;
            let v11 = luts[ty1 * tiles_x + tx1][v] as f32;

            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            out_raw[y * w + x] = (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

/// Clip histogram bins at `clip_limit` times the uniform bin height and
/// spread the excess evenly over all bins.
fn clip_histogram(hist: &mut [u32; 256], tile_pixels: u32, clip_limit: f32) {
    let clip = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn equalize_stretches_narrow_range() {
        // Two-level image squeezed into 100..=120 must spread to 0..=255
        let mut img = GrayImage::new(16, 16);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = Luma([if x < 8 { 100 } else { 120 }]);
        }
        let eq = equalize(&img);
        let min = eq.as_raw().iter().copied().min().unwrap();
        let max = eq.as_raw().iter().copied().max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn equalize_constant_image_is_identity() {
        let img = GrayImage::from_pixel(8, 8, Luma([77]));
        let eq = equalize(&img);
        assert!(eq.as_raw().iter().all(|&v| v == 77));
    }

    #[test]
    fn clahe_preserves_dimensions_and_range() {
        let mut img = GrayImage::new(64, 48);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Luma([((x * 3 + y * 5) % 256) as u8]);
        }
        let out = clahe(&img, (8, 8), 2.0);
        assert_eq!(out.dimensions(), (64, 48));
    }

    #[test]
    fn clahe_on_tiny_image_falls_back_to_equalize() {
        let img = GrayImage::from_pixel(4, 4, Luma([10]));
        let out = clahe(&img, (8, 8), 2.0);
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[test]
    fn clip_redistributes_all_excess() {
        let mut hist = [0u32; 256];
        hist[0] = 1000;
        hist[255] = 24;
        let before: u32 = hist.iter().sum();
        clip_histogram(&mut hist, 1024, 2.0);
        let after: u32 = hist.iter().sum();
        assert_eq!(before, after);
    }
}
