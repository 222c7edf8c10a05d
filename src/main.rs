// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use dimscan::config::Config;
use dimscan::decode::DecoderBackend;
use dimscan::viewer;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "dimscan")]
#[command(about = "Webcam barcode/QR scanner tuned for dark and low-contrast surfaces")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live scanner (the default when no command is given)
    Scan {
        /// Camera index to use (from 'dimscan list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Decoding strategy
        #[arg(short, long, value_enum)]
        decoder: Option<DecoderBackend>,

        /// Feed the plain grayscale frame to the decoder (diagnostics)
        #[arg(long)]
        no_enhance: bool,
    },

    /// List available cameras
    List,

    /// Decode symbols from a still image file
    Decode {
        /// Image file to decode
        image: PathBuf,

        /// Decoding strategy
        #[arg(short, long, value_enum)]
        decoder: Option<DecoderBackend>,

        /// Feed the plain grayscale image to the decoder (diagnostics)
        #[arg(long)]
        no_enhance: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=dimscan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dimscan=info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        None => viewer::run(&config).map_err(Into::into),
        Some(Commands::Scan {
            camera,
            decoder,
            no_enhance,
        }) => {
            let config = merge(config, camera, decoder, no_enhance);
            viewer::run(&config).map_err(Into::into)
        }
        Some(Commands::List) => cli::list_devices().map_err(Into::into),
        Some(Commands::Decode {
            image,
            decoder,
            no_enhance,
        }) => {
            let config = merge(config, None, decoder, no_enhance);
            cli::decode_image(&image, config.decoder, config.enhance).map_err(Into::into)
        }
    }
}

/// Overlay command-line flags on the configuration file values.
fn merge(
    mut config: Config,
    camera: Option<usize>,
    decoder: Option<DecoderBackend>,
    no_enhance: bool,
) -> Config {
    if let Some(camera) = camera {
        config.device = camera;
    }
    if let Some(decoder) = decoder {
        config.decoder = decoder;
    }
    if no_enhance {
        config.enhance = false;
    }
    config
}
