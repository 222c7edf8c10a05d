// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for overlay rendering

use dimscan::decode::{DecodedSymbol, Symbology};
use dimscan::overlay::annotate;
use image::{Rgb, RgbImage};

fn symbol(payload: &str, polygon: Vec<(i32, i32)>) -> DecodedSymbol {
    DecodedSymbol {
        payload: payload.to_string(),
        polygon,
        symbology: Symbology::QrCode,
    }
}

#[test]
fn empty_symbol_set_is_a_no_op() {
    let mut frame = RgbImage::from_pixel(48, 48, Rgb([30, 40, 50]));
    let before = frame.clone();

    let labels = annotate(&mut frame, &[]);

    assert!(labels.is_empty());
    assert_eq!(frame.as_raw(), before.as_raw());
}

#[test]
fn only_quads_contribute_overlays() {
    let mut frame = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));

    let symbols = vec![
        symbol("triangle", vec![(2, 2), (30, 2), (30, 30)]),
        symbol("quad", vec![(8, 8), (40, 8), (40, 40), (8, 40)]),
        symbol("pentagon", vec![(2, 2), (30, 2), (30, 30), (16, 40), (2, 30)]),
        symbol("empty", vec![]),
    ];

    let labels = annotate(&mut frame, &symbols);

    // Exactly one overlay (the quad); odd point counts never fail rendering
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "quad");
}

#[test]
fn label_sits_above_first_polygon_point() {
    let mut frame = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
    let labels = annotate(
        &mut frame,
        &[symbol("x", vec![(20, 30), (40, 30), (40, 50), (20, 50)])],
    );
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].x, 20);
    assert!(labels[0].y < 30, "label must be anchored above the symbol");
}

#[test]
fn degenerate_quads_do_not_panic() {
    let mut frame = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
    // All corners identical, corners outside the frame, zero-area line
    let symbols = vec![
        symbol("point", vec![(5, 5), (5, 5), (5, 5), (5, 5)]),
        symbol("offscreen", vec![(-10, -10), (99, -10), (99, 99), (-10, 99)]),
        symbol("line", vec![(0, 8), (15, 8), (15, 8), (0, 8)]),
    ];
    let labels = annotate(&mut frame, &symbols);
    assert_eq!(labels.len(), 3);
}
