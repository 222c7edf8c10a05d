// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end pipeline tests: synthetic symbol images through
//! Enhancer → Decoder, no camera involved.

use dimscan::decode::{DecoderBackend, Symbology, create_decoder};
use dimscan::enhance::enhance;
use image::{GrayImage, Luma};
use qrcode::QrCode;

/// Render a QR code for `payload` as a grayscale image with a quiet zone,
/// large enough that the enhancement tiling has real data per tile.
fn qr_image(payload: &str) -> GrayImage {
    let code = QrCode::new(payload.as_bytes()).expect("payload encodes");
    code.render::<Luma<u8>>()
        .quiet_zone(true)
        .min_dimensions(240, 240)
        .build()
}

#[test]
fn enhanced_qr_decodes_with_multi_symbol_backend() {
    let frame = qr_image("HELLO");
    let enhanced = enhance(&frame);

    let mut decoder = create_decoder(DecoderBackend::MultiSymbol);
    let symbols = decoder.decode(&enhanced);

    assert_eq!(symbols.len(), 1, "expected exactly one decoded symbol");
    assert_eq!(symbols[0].payload, "HELLO");
    assert_eq!(symbols[0].symbology, Symbology::QrCode);
    assert!(!symbols[0].polygon.is_empty());
}

#[test]
fn plain_qr_decodes_with_qr_native_backend() {
    let frame = qr_image("HELLO");

    let mut decoder = create_decoder(DecoderBackend::QrNative);
    let symbols = decoder.decode(&frame);

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].payload, "HELLO");
    assert_eq!(symbols[0].symbology, Symbology::QrCode);
    // The native detector always reports the four grid corners
    assert_eq!(symbols[0].polygon.len(), 4);
}

#[test]
fn symbol_free_frame_yields_no_symbols_from_either_backend() {
    let flat = GrayImage::from_pixel(320, 240, Luma([128]));
    let enhanced = enhance(&flat);

    for backend in [DecoderBackend::MultiSymbol, DecoderBackend::QrNative] {
        let mut decoder = create_decoder(backend);
        assert!(
            decoder.decode(&flat).is_empty(),
            "{:?} found symbols in a flat frame",
            backend
        );
        assert!(
            decoder.decode(&enhanced).is_empty(),
            "{:?} found symbols in an enhanced flat frame",
            backend
        );
    }
}

#[test]
fn decoders_are_stateless_across_calls() {
    let qr = qr_image("HELLO");
    let blank = GrayImage::from_pixel(240, 240, Luma([255]));

    let mut decoder = create_decoder(DecoderBackend::QrNative);
    assert_eq!(decoder.decode(&qr).len(), 1);
    assert!(decoder.decode(&blank).is_empty());
    // A previous hit leaves no residue; the same frame decodes again
    assert_eq!(decoder.decode(&qr).len(), 1);
}
