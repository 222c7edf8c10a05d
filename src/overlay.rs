// SPDX-License-Identifier: GPL-3.0-only

//! Overlay drawing on the original frame
//!
//! Annotation happens on the colour frame the operator sees, never on the
//! enhanced frame the decoder sees. Only symbols whose boundary is exactly
//! four points get an outline and a label; anything else has already been
//! logged by the session and is skipped here.

use crate::constants::{LABEL_OFFSET_PX, OVERLAY_COLOR};
use crate::decode::DecodedSymbol;

use image::{Rgb, RgbImage};

/// Text to draw by the presenter, anchored in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// Draw polygon outlines for every 4-point symbol and return the labels to
/// render above them. Symbols with any other point count leave the frame
/// untouched and produce no label.
pub fn annotate(frame: &mut RgbImage, symbols: &[DecodedSymbol]) -> Vec<Label> {
    let mut labels = Vec::new();

    for symbol in symbols {
        if symbol.polygon.len() != 4 {
            continue;
        }

        for i in 0..4 {
            let (x0, y0) = symbol.polygon[i];
            let (x1, y1) = symbol.polygon[(i + 1) % 4];
            draw_line(frame, x0, y0, x1, y1, OVERLAY_COLOR);
        }

        let (ax, ay) = symbol.polygon[0];
        labels.push(Label {
            text: symbol.payload.clone(),
            x: ax,
            y: ay - LABEL_OFFSET_PX,
        });
    }

    labels
}

/// Bresenham line, clipped per pixel so out-of-frame polygon points are
/// harmless.
fn draw_line(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 3]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        put_pixel_checked(frame, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn put_pixel_checked(frame: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < frame.width() && (y as u32) < frame.height() {
        frame.put_pixel(x as u32, y as u32, Rgb(color));
    }
}
