// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Decoding symbols from a still image file

use dimscan::backends::camera::v4l2;
use dimscan::decode::{self, DecoderBackend};
use dimscan::enhance;
use dimscan::errors::{ScanError, ScanResult};

use std::path::Path;

/// List all V4L2 capture devices.
pub fn list_devices() -> ScanResult<()> {
    let devices = v4l2::enumerate_devices();

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for device in devices {
        println!("  [{}] {}", device.index, device.name);
    }

    Ok(())
}

/// Run the enhancement pipeline and the selected decoder over a still
/// image, printing one line per decoded symbol.
pub fn decode_image(path: &Path, backend: DecoderBackend, enhance_enabled: bool) -> ScanResult<()> {
    let image = image::open(path)
        .map_err(|e| ScanError::Other(format!("failed to open {}: {}", path.display(), e)))?;
    let gray = image.to_luma8();

    let decoder_input = if enhance_enabled {
        enhance::enhance(&gray)
    } else {
        gray
    };

    let mut decoder = decode::create_decoder(backend);
    let symbols = decoder.decode(&decoder_input);

    if symbols.is_empty() {
        println!("No symbols detected.");
        return Ok(());
    }

    for symbol in symbols {
        println!("{}: {}", symbol.symbology, symbol.payload);
    }

    Ok(())
}
