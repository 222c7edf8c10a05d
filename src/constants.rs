// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! The enhancement parameters are fixed by design: they are the tuning that
//! makes low-contrast decode work, not a user-facing configuration surface.

use std::time::Duration;

/// Brightness offset added to the grayscale frame before equalization,
/// saturating at 255.
pub const BRIGHTNESS_BOOST: u8 = 50;

/// CLAHE tile grid (tiles per axis).
pub const CLAHE_TILE_GRID: (usize, usize) = (8, 8);

/// CLAHE contrast clip limit, as a multiple of the uniform bin height.
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Lower hysteresis threshold of the edge detector.
pub const EDGE_LOW_THRESHOLD: u8 = 50;

/// Upper hysteresis threshold of the edge detector.
pub const EDGE_HIGH_THRESHOLD: u8 = 150;

/// Weight of the contrast-enhanced image in the final blend.
pub const ENHANCED_BLEND_WEIGHT: f32 = 0.8;

/// Weight of the edge map in the final blend.
pub const EDGE_BLEND_WEIGHT: f32 = 0.2;

/// Overlay colour for polygon outlines and labels (RGB).
pub const OVERLAY_COLOR: [u8; 3] = [0, 255, 0];

/// Vertical distance, in frame pixels, between a symbol's first polygon point
/// and its label anchor.
pub const LABEL_OFFSET_PX: i32 = 10;

/// How long the viewer waits for a key event each iteration. This bound is
/// also what throttles the preview refresh rate.
pub const KEY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Number of memory-mapped capture buffers requested from the V4L2 driver.
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_weights_cover_full_range() {
        // The blend must not be able to push a saturated pixel past 255
        // by more than the clamp can absorb.
        assert!(ENHANCED_BLEND_WEIGHT > 0.0 && ENHANCED_BLEND_WEIGHT <= 1.0);
        assert!(EDGE_BLEND_WEIGHT >= 0.0 && EDGE_BLEND_WEIGHT <= 1.0);
    }

    #[test]
    fn edge_thresholds_ordered() {
        assert!(EDGE_LOW_THRESHOLD < EDGE_HIGH_THRESHOLD);
    }
}
