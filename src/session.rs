// SPDX-License-Identifier: GPL-3.0-only

//! Scan session loop
//!
//! Drives Frame Source → Enhancer → Decoder → Presenter, strictly
//! sequential and single-threaded. Two states: RUNNING and STOPPED.
//! STOPPED is terminal and is reached on end of stream or when the
//! presenter reports the exit key. All resources are released by drop when
//! the session ends, on every exit path.

use crate::backends::camera::FrameSource;
use crate::decode::SymbolDecoder;
use crate::enhance::enhance;
use crate::errors::{CameraError, FrameError, ScanError, ScanResult};
use crate::overlay::{self, Label};

use image::RgbImage;
use tracing::{error, info, warn};

/// What the presenter asked the loop to do after a frame was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Keep scanning
    Continue,
    /// Exit key observed; stop the session
    Exit,
    /// Flip the enhancement stage on/off (diagnostics)
    ToggleEnhance,
}

/// Renders one annotated frame per loop iteration.
///
/// The bounded wait inside `present` (key polling) is what throttles the
/// refresh rate; the session adds no timing of its own.
pub trait Presenter {
    fn present(&mut self, frame: &RgbImage, labels: &[Label]) -> ScanResult<PresentOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Running,
    Stopped,
}

/// Counters for a finished session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub symbols: u64,
}

/// One capture-process-display session over an open frame source.
pub struct ScanSession<S: FrameSource, P: Presenter> {
    source: S,
    decoder: Box<dyn SymbolDecoder>,
    presenter: P,
    enhance_enabled: bool,
    state: SessionState,
}

impl<S: FrameSource, P: Presenter> ScanSession<S, P> {
    pub fn new(
        source: S,
        decoder: Box<dyn SymbolDecoder>,
        presenter: P,
        enhance_enabled: bool,
    ) -> Self {
        Self {
            source,
            decoder,
            presenter,
            enhance_enabled,
            state: SessionState::Running,
        }
    }

    /// Run until end of stream or exit key. Consumes the session; the
    /// source and presenter are dropped (and thereby released) on return.
    pub fn run(mut self) -> ScanResult<SessionSummary> {
        let mut summary = SessionSummary::default();

        while self.state == SessionState::Running {
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(FrameError::EndOfStream(reason)) => {
                    info!(%reason, "Capture stream ended");
                    self.state = SessionState::Stopped;
                    break;
                }
                Err(FrameError::Malformed(reason)) => {
                    // No retry policy: the first failed read ends the session
                    warn!(%reason, "Failed to read frame");
                    self.state = SessionState::Stopped;
                    break;
                }
            };

            let original = match frame.to_rgb() {
                Ok(rgb) => rgb,
                Err(e) => {
                    warn!(error = %e, "Failed to convert frame");
                    self.state = SessionState::Stopped;
                    break;
                }
            };
            let gray = match frame.to_luma() {
                Ok(gray) => gray,
                Err(e) => {
                    warn!(error = %e, "Failed to convert frame");
                    self.state = SessionState::Stopped;
                    break;
                }
            };

            let decoder_input = if self.enhance_enabled {
                enhance(&gray)
            } else {
                gray
            };

            let symbols = self.decoder.decode(&decoder_input);
            for symbol in &symbols {
                // Every decode is reported, including symbols the overlay
                // will skip for not being quads.
                info!(
                    symbology = %symbol.symbology,
                    points = symbol.polygon.len(),
                    "Decoded: {}",
                    symbol.payload
                );
            }

            let mut annotated = original;
            let labels = overlay::annotate(&mut annotated, &symbols);

            summary.frames += 1;
            summary.symbols += symbols.len() as u64;

            match self.presenter.present(&annotated, &labels)? {
                PresentOutcome::Continue => {}
                PresentOutcome::Exit => self.state = SessionState::Stopped,
                PresentOutcome::ToggleEnhance => {
                    self.enhance_enabled = !self.enhance_enabled;
                    info!(enabled = self.enhance_enabled, "Enhancement toggled");
                }
            }
        }

        Ok(summary)
    }
}

/// Open a frame source and run a session over it.
///
/// When `open` fails the loop is never entered and no frame is ever
/// requested; the failure is logged and returned.
pub fn run_with_source<S, P, F>(
    open: F,
    decoder: Box<dyn SymbolDecoder>,
    presenter: P,
    enhance_enabled: bool,
) -> ScanResult<SessionSummary>
where
    S: FrameSource,
    P: Presenter,
    F: FnOnce() -> Result<S, CameraError>,
{
    let source = match open() {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to open camera");
            return Err(ScanError::from(e));
        }
    };
    ScanSession::new(source, decoder, presenter, enhance_enabled).run()
}
