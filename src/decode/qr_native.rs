// SPDX-License-Identifier: GPL-3.0-only

//! QR-only decoding with the pure-Rust detector
//!
//! Detection and decoding are one pass: the detector locates candidate
//! grids, and each grid either decodes to text or is dropped. Bounds are
//! always the four corners of the located grid.

use super::{DecodedSymbol, SymbolDecoder, Symbology};

use image::GrayImage;
use tracing::debug;

/// Strategy B: QR-only detector
pub struct QrNativeDecoder;

impl QrNativeDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QrNativeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder for QrNativeDecoder {
    fn decode(&mut self, frame: &GrayImage) -> Vec<DecodedSymbol> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let raw = frame.as_raw();

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| raw[y * width + x]);

        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| {
                let polygon: Vec<(i32, i32)> =
                    grid.bounds.iter().map(|p| (p.x, p.y)).collect();
                match grid.decode() {
                    Ok((_meta, payload)) => Some(DecodedSymbol {
                        payload,
                        polygon,
                        symbology: Symbology::QrCode,
                    }),
                    Err(e) => {
                        // A located grid that fails to decode is dropped;
                        // one bad symbol never ends the session.
                        debug!(error = ?e, "Located grid failed to decode");
                        None
                    }
                }
            })
            .collect()
    }
}
