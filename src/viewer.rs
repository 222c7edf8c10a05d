// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based live scanner view
//!
//! Renders the annotated camera feed to the terminal using Unicode
//! half-block characters for improved vertical resolution, and polls the
//! keyboard between frames. The poll interval doubles as the refresh
//! throttle.

use crate::backends::camera::CameraSource;
use crate::config::Config;
use crate::constants::{KEY_POLL_INTERVAL, OVERLAY_COLOR};
use crate::decode;
use crate::errors::{ScanError, ScanResult};
use crate::overlay::Label;
use crate::session::{self, PresentOutcome, Presenter, SessionSummary};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbImage;
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    style::Style, widgets::Widget,
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use tracing::{error, info};

/// Run the live scanner until the exit key or end of stream.
pub fn run(config: &Config) -> ScanResult<()> {
    // Set up terminal
    enable_raw_mode().map_err(|e| ScanError::Display(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| ScanError::Display(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| ScanError::Display(e.to_string()))?;

    // Run the session
    let result = run_app(&mut terminal, config);

    // Restore terminal on every exit path
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result.map(|summary| {
        info!(
            frames = summary.frames,
            symbols = summary.symbols,
            "Session finished"
        );
    })
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: &Config,
) -> ScanResult<SessionSummary> {
    let decoder = decode::create_decoder(config.decoder);
    let presenter = TerminalPresenter::new(terminal);
    let device = config.device;

    session::run_with_source(
        move || CameraSource::open(device),
        decoder,
        presenter,
        config.enhance,
    )
}

/// Presenter backed by the ratatui terminal.
struct TerminalPresenter<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
    widget: FrameWidget,
    status_message: String,
    show_help: bool,
}

impl<'a> TerminalPresenter<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self {
            terminal,
            widget: FrameWidget::new(),
            status_message: build_status_message(None),
            show_help: false,
        }
    }
}

impl Presenter for TerminalPresenter<'_> {
    fn present(&mut self, frame: &RgbImage, labels: &[Label]) -> ScanResult<PresentOutcome> {
        if let Some(label) = labels.last() {
            if !self.show_help {
                self.status_message = build_status_message(Some(&label.text));
            }
        }
        self.widget.update(frame.clone(), labels.to_vec());

        let widget = &self.widget;
        let status_message = &self.status_message;
        self.terminal
            .draw(|f| {
                let area = f.area();

                // Reserve bottom line for status
                let camera_area = Rect {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height.saturating_sub(1),
                };
                f.render_widget(widget, camera_area);

                let status_area = Rect {
                    x: area.x,
                    y: area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                };
                let status = StatusBar {
                    message: status_message,
                };
                f.render_widget(status, status_area);
            })
            .map_err(|e| ScanError::Display(e.to_string()))?;

        // Bounded wait for a key; this is the only refresh throttle
        if !event::poll(KEY_POLL_INTERVAL).map_err(|e| ScanError::Display(e.to_string()))? {
            return Ok(PresentOutcome::Continue);
        }
        let ev = event::read().map_err(|e| ScanError::Display(e.to_string()))?;
        let Event::Key(key) = ev else {
            return Ok(PresentOutcome::Continue);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(PresentOutcome::Continue);
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(PresentOutcome::Exit);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(PresentOutcome::Exit),
            KeyCode::Char('e') => {
                self.show_help = false;
                self.status_message = "Enhancement toggled".to_string();
                return Ok(PresentOutcome::ToggleEnhance);
            }
            KeyCode::Char('p') => {
                self.show_help = false;
                match save_snapshot(frame) {
                    Ok(path) => {
                        self.status_message = format!("Saved: {}", path.display());
                    }
                    Err(e) => {
                        error!("Failed to save snapshot: {}", e);
                        self.status_message = format!("Error: {}", e);
                    }
                }
            }
            KeyCode::Char('h') => {
                self.show_help = !self.show_help;
                self.status_message = if self.show_help {
                    build_help_message()
                } else {
                    build_status_message(None)
                };
            }
            _ => {}
        }

        Ok(PresentOutcome::Continue)
    }
}

fn build_status_message(last_decode: Option<&str>) -> String {
    let mut msg = String::new();
    if let Some(text) = last_decode {
        msg.push_str("Last: ");
        msg.push_str(text);
        msg.push_str(" | ");
    }
    msg.push_str("'p' snapshot | 'e' enhance | 'h' help | 'q' quit");
    msg
}

fn build_help_message() -> String {
    "p: Save snapshot | e: Toggle enhancement | h: Toggle help | q/Ctrl+C: Quit".to_string()
}

/// Save the current annotated frame as a PNG snapshot.
fn save_snapshot(frame: &RgbImage) -> ScanResult<PathBuf> {
    let dir = dirs::picture_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| ScanError::Other("no directory to save snapshots in".into()))?
        .join("dimscan");
    std::fs::create_dir_all(&dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("scan_{}.png", timestamp));
    frame
        .save(&path)
        .map_err(|e| ScanError::Other(format!("failed to save snapshot: {}", e)))?;
    info!(path = %path.display(), "Snapshot saved");

    Ok(path)
}

/// Widget that renders an annotated frame using half-block characters.
struct FrameWidget {
    frame: Option<RgbImage>,
    labels: Vec<Label>,
}

impl FrameWidget {
    fn new() -> Self {
        Self {
            frame: None,
            labels: Vec::new(),
        }
    }

    fn update(&mut self, frame: RgbImage, labels: Vec<Label>) {
        self.frame = Some(frame);
        self.labels = labels;
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };
        if frame.width() == 0 || frame.height() == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio.
        // Each terminal cell displays 2 vertical pixels using half-blocks.
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(frame, src_x, src_y_top);
                let bottom_color = sample_pixel(frame, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }

        // Payload text above each symbol, in the overlay colour
        let overlay_fg = Color::Rgb(OVERLAY_COLOR[0], OVERLAY_COLOR[1], OVERLAY_COLOR[2]);
        for label in &self.labels {
            let px = label.x.clamp(0, frame.width() as i32 - 1) as f64;
            let py = label.y.clamp(0, frame.height() as i32 - 1) as f64;
            let cell_x = x_offset as i32 + (px / x_scale) as i32;
            let cell_y = y_offset as i32 + (py / (y_scale * 2.0)) as i32;
            if cell_y < area.y as i32 || cell_y >= (area.y + area.height) as i32 {
                continue;
            }
            if cell_x < area.x as i32 || cell_x >= (area.x + area.width) as i32 {
                continue;
            }
            let max_len = ((area.x + area.width) as i32 - cell_x) as usize;
            let text: String = label.text.chars().take(max_len).collect();
            buf.set_string(
                cell_x as u16,
                cell_y as u16,
                text,
                Style::default().fg(overlay_fg),
            );
        }
    }
}

fn sample_pixel(frame: &RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let p = frame.get_pixel(x, y);
    Color::Rgb(p.0[0], p.0[1], p.0[2])
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Char-wise truncation: decoded payloads can be multibyte
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
