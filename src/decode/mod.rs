// SPDX-License-Identifier: GPL-3.0-only

//! Symbol decoding backends
//!
//! Two interchangeable strategies sit behind [`SymbolDecoder`]:
//! [`multi_symbol::MultiSymbolDecoder`] (QR, Code 128 and Code 39 via the
//! zxing port) and [`qr_native::QrNativeDecoder`] (QR only, pure-Rust
//! detector). The backend is chosen once at startup; nothing in the loop
//! body branches on it.

pub mod multi_symbol;
pub mod qr_native;

pub use multi_symbol::MultiSymbolDecoder;
pub use qr_native::QrNativeDecoder;

use clap::ValueEnum;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Barcode symbology of a decoded symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    QrCode,
    Code128,
    Code39,
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbology::QrCode => write!(f, "QR"),
            Symbology::Code128 => write!(f, "Code128"),
            Symbology::Code39 => write!(f, "Code39"),
        }
    }
}

/// One decoded symbol from one frame
///
/// Symbols carry no identity across frames: the same physical code seen in
/// two consecutive frames yields two unrelated values.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Decoded payload text
    pub payload: String,
    /// Boundary points in frame pixel coordinates. Typically 4 (a closed
    /// quadrilateral) but the multi-symbology backend may report other
    /// counts; the overlay only draws quads.
    pub polygon: Vec<(i32, i32)>,
    pub symbology: Symbology,
}

/// A decoding strategy
///
/// Stateless across calls: no memory of previous frames. The returned order
/// is implementation-defined and not stable between frames.
pub trait SymbolDecoder {
    fn decode(&mut self, frame: &GrayImage) -> Vec<DecodedSymbol>;
}

/// Which decoding strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderBackend {
    /// QR, Code 128 and Code 39 via the zxing port
    #[default]
    MultiSymbol,
    /// Pure-Rust QR-only detector
    QrNative,
}

impl std::fmt::Display for DecoderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderBackend::MultiSymbol => write!(f, "multi-symbol"),
            DecoderBackend::QrNative => write!(f, "qr-native"),
        }
    }
}

/// Construct the decoder for the selected backend.
pub fn create_decoder(backend: DecoderBackend) -> Box<dyn SymbolDecoder> {
    match backend {
        DecoderBackend::MultiSymbol => Box::new(MultiSymbolDecoder::new()),
        DecoderBackend::QrNative => Box::new(QrNativeDecoder::new()),
    }
}
