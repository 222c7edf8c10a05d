// SPDX-License-Identifier: GPL-3.0-only

//! Multi-symbology decoding via the zxing port
//!
//! The search is restricted to the three symbologies this tool targets;
//! everything else the library could find is ignored up front rather than
//! filtered after the fact.

use super::{DecodedSymbol, SymbolDecoder, Symbology};

use image::GrayImage;
use rxing::{BarcodeFormat, DecodeHintType, DecodeHintValue, DecodingHintDictionary};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Strategy A: QR / Code 128 / Code 39 decoder
pub struct MultiSymbolDecoder {
    hints: DecodingHintDictionary,
}

impl MultiSymbolDecoder {
    pub fn new() -> Self {
        let mut hints = DecodingHintDictionary::new();
        hints.insert(
            DecodeHintType::POSSIBLE_FORMATS,
            DecodeHintValue::PossibleFormats(HashSet::from([
                BarcodeFormat::QR_CODE,
                BarcodeFormat::CODE_128,
                BarcodeFormat::CODE_39,
            ])),
        );
        hints.insert(DecodeHintType::TRY_HARDER, DecodeHintValue::TryHarder(true));
        Self { hints }
    }
}

impl Default for MultiSymbolDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder for MultiSymbolDecoder {
    fn decode(&mut self, frame: &GrayImage) -> Vec<DecodedSymbol> {
        let (width, height) = frame.dimensions();
        let luma = frame.as_raw().clone();

        let results = match rxing::helpers::detect_multiple_in_luma_with_hints(
            luma,
            width,
            height,
            &mut self.hints,
        ) {
            Ok(results) => results,
            Err(e) => {
                // "Not found" is the normal empty-frame outcome
                trace!(error = %e, "No symbols detected");
                return Vec::new();
            }
        };

        results
            .into_iter()
            .filter_map(|result| {
                let symbology = match result.getBarcodeFormat() {
                    BarcodeFormat::QR_CODE => Symbology::QrCode,
                    BarcodeFormat::CODE_128 => Symbology::Code128,
                    BarcodeFormat::CODE_39 => Symbology::Code39,
                    other => {
                        debug!(format = %other, "Ignoring symbol outside the requested set");
                        return None;
                    }
                };
                let polygon = result
                    .getRXingResultPoints()
                    .iter()
                    .map(|p| (p.x.round() as i32, p.y.round() as i32))
                    .collect();
                Some(DecodedSymbol {
                    payload: result.getText().to_string(),
                    polygon,
                    symbology,
                })
            })
            .collect()
    }
}
