// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 capture source
//!
//! Thin wrapper over the `v4l` crate: open a device node, negotiate one of
//! the supported pixel formats, and read frames from a memory-mapped stream.
//! The read blocks until the driver hands over the next buffer; that blocking
//! call is the loop's natural pacing.

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::constants::CAPTURE_BUFFER_COUNT;
use crate::errors::{CameraError, FrameError};

use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Formats we can consume, in preference order. Raw luma-bearing formats
/// first; MJPEG last since every frame pays a JPEG decode.
const PREFERRED_FOURCCS: [&[u8; 4]; 5] = [b"YUYV", b"UYVY", b"GREY", b"RGB3", b"MJPG"];

/// An open V4L2 capture device
///
/// Dropping the source stops streaming and releases the device handle.
pub struct CameraSource {
    // Held for the lifetime of the stream; the handle must outlive the mmap.
    _device: v4l::Device,
    stream: MmapStream<'static>,
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
}

impl CameraSource {
    /// Open capture device `index` (e.g. 0 for /dev/video0) and start
    /// streaming in the first supported pixel format the driver accepts.
    pub fn open(index: usize) -> Result<Self, CameraError> {
        let device = v4l::Device::new(index).map_err(|e| CameraError::DeviceUnavailable {
            index,
            reason: e.to_string(),
        })?;

        let (format, fmt) = negotiate_format(&device, index)?;

        let stride = if fmt.stride > 0 {
            fmt.stride
        } else {
            format.bytes_per_pixel().map(|bpp| fmt.width * bpp).unwrap_or(0)
        };

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
            .map_err(|e| CameraError::DeviceUnavailable {
                index,
                reason: format!("failed to map capture buffers: {}", e),
            })?;

        info!(
            index,
            width = fmt.width,
            height = fmt.height,
            format = %format,
            "Opened camera"
        );

        Ok(Self {
            _device: device,
            stream,
            width: fmt.width,
            height: fmt.height,
            stride,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }
}

impl super::FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<CameraFrame, FrameError> {
        let (buf, meta) = self
            .stream
            .next()
            .map_err(|e| FrameError::EndOfStream(e.to_string()))?;

        // Compressed frames report their real length in bytesused; raw
        // frames sometimes report 0 there, in which case the whole buffer
        // is the frame.
        let used = meta.bytesused as usize;
        let payload = if used > 0 && used <= buf.len() {
            &buf[..used]
        } else {
            buf
        };

        if payload.is_empty() {
            return Err(FrameError::EndOfStream("driver returned an empty buffer".into()));
        }

        Ok(CameraFrame::new(
            self.width,
            self.height,
            self.stride,
            self.format,
            payload,
        ))
    }
}

fn negotiate_format(
    device: &v4l::Device,
    index: usize,
) -> Result<(PixelFormat, Format), CameraError> {
    let current = device.format().map_err(|e| CameraError::DeviceUnavailable {
        index,
        reason: format!("failed to query format: {}", e),
    })?;

    for fourcc in PREFERRED_FOURCCS {
        let wanted = Format::new(current.width, current.height, FourCC::new(fourcc));
        let actual = match device.set_format(&wanted) {
            Ok(actual) => actual,
            Err(e) => {
                debug!(fourcc = %wanted.fourcc, error = %e, "Format rejected");
                continue;
            }
        };
        if actual.fourcc.repr == *fourcc {
            if let Some(format) = PixelFormat::from_fourcc(&actual.fourcc.repr) {
                return Ok((format, actual));
            }
        }
    }

    // Last resort: whatever the driver is already configured for
    if let Some(format) = PixelFormat::from_fourcc(&current.fourcc.repr) {
        return Ok((format, current));
    }

    Err(CameraError::UnsupportedFormat(format!(
        "device {} offers none of YUYV/UYVY/GREY/RGB3/MJPG (current: {})",
        index, current.fourcc
    )))
}

/// Summary of one enumerated capture device
pub struct DeviceSummary {
    pub index: usize,
    pub name: String,
}

/// Enumerate V4L2 capture nodes visible to this process.
pub fn enumerate_devices() -> Vec<DeviceSummary> {
    let mut devices = Vec::new();
    let Ok(entries) = std::fs::read_dir("/dev") else {
        return devices;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(rest) = name.strip_prefix("video") else {
            continue;
        };
        let Ok(index) = rest.parse::<usize>() else {
            continue;
        };

        // Device name via QUERYCAP; fall back to the node name
        let card = v4l::Device::with_path(&path)
            .ok()
            .and_then(|dev| dev.query_caps().ok())
            .map(|caps| caps.card)
            .unwrap_or_else(|| name.to_string());

        devices.push(DeviceSummary { index, name: card });
    }

    devices.sort_by_key(|d| d.index);
    devices
}
