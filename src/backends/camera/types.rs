// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera frames

use crate::errors::FrameError;
use image::{GrayImage, RgbImage};
use std::sync::Arc;

/// Pixel format of a captured frame
///
/// Covers the raw formats common on webcam sensors plus MJPEG, which many
/// UVC cameras prefer at higher resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Packed 4:2:2 (Y0 U Y1 V interleaved), the usual raw webcam format
    Yuyv,
    /// Packed 4:2:2 (U Y0 V Y1 interleaved)
    Uyvy,
    /// 24-bit RGB, 3 bytes per pixel
    Rgb24,
    /// 8-bit grayscale, single channel
    Gray8,
    /// Motion-JPEG: `data` holds one compressed JPEG image
    Mjpeg,
}

impl PixelFormat {
    /// Map a V4L2 FourCC to a supported pixel format.
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"YUYV" => Some(PixelFormat::Yuyv),
            b"UYVY" => Some(PixelFormat::Uyvy),
            b"RGB3" => Some(PixelFormat::Rgb24),
            b"GREY" => Some(PixelFormat::Gray8),
            b"MJPG" | b"JPEG" => Some(PixelFormat::Mjpeg),
            _ => None,
        }
    }

    /// Bytes per pixel for raw formats; `None` for compressed ones.
    pub fn bytes_per_pixel(&self) -> Option<u32> {
        match self {
            PixelFormat::Yuyv | PixelFormat::Uyvy => Some(2),
            PixelFormat::Rgb24 => Some(3),
            PixelFormat::Gray8 => Some(1),
            PixelFormat::Mjpeg => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Yuyv => write!(f, "YUYV"),
            PixelFormat::Uyvy => write!(f, "UYVY"),
            PixelFormat::Rgb24 => write!(f, "RGB24"),
            PixelFormat::Gray8 => write!(f, "GREY"),
            PixelFormat::Mjpeg => write!(f, "MJPG"),
        }
    }
}

/// One captured frame
///
/// Owned by the current loop iteration and discarded at the start of the
/// next; the only state that survives iterations is the open device handle.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row for raw formats; 0 for compressed frames
    pub stride: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
}

impl CameraFrame {
    /// Wrap raw frame bytes.
    pub fn new(width: u32, height: u32, stride: u32, format: PixelFormat, data: &[u8]) -> Self {
        Self {
            width,
            height,
            stride,
            format,
            data: Arc::from(data),
        }
    }

    /// Convert the frame to RGB for presentation.
    pub fn to_rgb(&self) -> Result<RgbImage, FrameError> {
        match self.format {
            PixelFormat::Mjpeg => {
                let decoded =
                    image::load_from_memory_with_format(&self.data, image::ImageFormat::Jpeg)
                        .map_err(|e| FrameError::Malformed(format!("MJPEG decode: {}", e)))?;
                Ok(decoded.to_rgb8())
            }
            _ => {
                let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
                for y in 0..self.height {
                    for x in 0..self.width {
                        let (r, g, b) = self.sample_rgb(x, y)?;
                        rgb.push(r);
                        rgb.push(g);
                        rgb.push(b);
                    }
                }
                RgbImage::from_raw(self.width, self.height, rgb)
                    .ok_or_else(|| FrameError::Malformed("RGB buffer size mismatch".into()))
            }
        }
    }

    /// Convert the frame to single-channel intensity for decoding.
    ///
    /// YUV formats take the luma plane directly; RGB uses the BT.601 weights
    /// in fixed-point form.
    pub fn to_luma(&self) -> Result<GrayImage, FrameError> {
        match self.format {
            PixelFormat::Mjpeg => {
                let decoded =
                    image::load_from_memory_with_format(&self.data, image::ImageFormat::Jpeg)
                        .map_err(|e| FrameError::Malformed(format!("MJPEG decode: {}", e)))?;
                Ok(decoded.to_luma8())
            }
            PixelFormat::Gray8 => {
                let mut luma = Vec::with_capacity((self.width * self.height) as usize);
                for y in 0..self.height {
                    let row = (y * self.stride) as usize;
                    let end = row + self.width as usize;
                    if end > self.data.len() {
                        return Err(FrameError::Malformed("frame shorter than geometry".into()));
                    }
                    luma.extend_from_slice(&self.data[row..end]);
                }
                GrayImage::from_raw(self.width, self.height, luma)
                    .ok_or_else(|| FrameError::Malformed("luma buffer size mismatch".into()))
            }
            PixelFormat::Yuyv | PixelFormat::Uyvy => {
                // Y bytes sit at even (YUYV) or odd (UYVY) offsets
                let y_offset = if self.format == PixelFormat::Yuyv { 0 } else { 1 };
                let mut luma = Vec::with_capacity((self.width * self.height) as usize);
                for y in 0..self.height {
                    let row = (y * self.stride) as usize;
                    for x in 0..self.width {
                        let idx = row + (x as usize) * 2 + y_offset;
                        let v = self
                            .data
                            .get(idx)
                            .copied()
                            .ok_or_else(|| FrameError::Malformed("frame shorter than geometry".into()))?;
                        luma.push(v);
                    }
                }
                GrayImage::from_raw(self.width, self.height, luma)
                    .ok_or_else(|| FrameError::Malformed("luma buffer size mismatch".into()))
            }
            PixelFormat::Rgb24 => {
                let mut luma = Vec::with_capacity((self.width * self.height) as usize);
                for y in 0..self.height {
                    let row = (y * self.stride) as usize;
                    for x in 0..self.width {
                        let idx = row + (x as usize) * 3;
                        if idx + 2 >= self.data.len() {
                            return Err(FrameError::Malformed("frame shorter than geometry".into()));
                        }
                        let r = self.data[idx] as u32;
                        let g = self.data[idx + 1] as u32;
                        let b = self.data[idx + 2] as u32;
                        // Y = (76 R + 150 G + 29 B) >> 8
                        luma.push(((76 * r + 150 * g + 29 * b) >> 8) as u8);
                    }
                }
                GrayImage::from_raw(self.width, self.height, luma)
                    .ok_or_else(|| FrameError::Malformed("luma buffer size mismatch".into()))
            }
        }
    }

    fn sample_rgb(&self, x: u32, y: u32) -> Result<(u8, u8, u8), FrameError> {
        let data = &self.data;
        match self.format {
            PixelFormat::Rgb24 => {
                let idx = (y * self.stride + x * 3) as usize;
                if idx + 2 < data.len() {
                    Ok((data[idx], data[idx + 1], data[idx + 2]))
                } else {
                    Err(FrameError::Malformed("frame shorter than geometry".into()))
                }
            }
            PixelFormat::Gray8 => {
                let idx = (y * self.stride + x) as usize;
                match data.get(idx) {
                    Some(&v) => Ok((v, v, v)),
                    None => Err(FrameError::Malformed("frame shorter than geometry".into())),
                }
            }
            PixelFormat::Yuyv | PixelFormat::Uyvy => {
                // Packed 4:2:2: two pixels share chroma
                let pair_x = (x & !1) as usize;
                let base = (y as usize) * (self.stride as usize) + pair_x * 2;
                if base + 3 >= data.len() {
                    return Err(FrameError::Malformed("frame shorter than geometry".into()));
                }
                let (luma, u, v) = if self.format == PixelFormat::Yuyv {
                    let luma = if x & 1 == 0 { data[base] } else { data[base + 2] };
                    (luma, data[base + 1], data[base + 3])
                } else {
                    let luma = if x & 1 == 0 { data[base + 1] } else { data[base + 3] };
                    (luma, data[base], data[base + 2])
                };
                Ok(yuv_to_rgb(luma, u, v))
            }
            PixelFormat::Mjpeg => Err(FrameError::Malformed(
                "cannot sample pixels from a compressed frame".into(),
            )),
        }
    }
}

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32, fill: u8) -> CameraFrame {
        let data = vec![fill; (width * height) as usize];
        CameraFrame::new(width, height, width, PixelFormat::Gray8, &data)
    }

    #[test]
    fn gray_to_luma_is_identity() {
        let frame = gray_frame(4, 3, 200);
        let luma = frame.to_luma().unwrap();
        assert_eq!(luma.dimensions(), (4, 3));
        assert!(luma.as_raw().iter().all(|&v| v == 200));
    }

    #[test]
    fn yuyv_luma_takes_y_bytes() {
        // 2x1 YUYV frame: Y0=10 U=128 Y1=20 V=128
        let data = [10u8, 128, 20, 128];
        let frame = CameraFrame::new(2, 1, 4, PixelFormat::Yuyv, &data);
        let luma = frame.to_luma().unwrap();
        assert_eq!(luma.as_raw(), &vec![10, 20]);
    }

    #[test]
    fn yuyv_neutral_chroma_is_gray_in_rgb() {
        let data = [100u8, 128, 100, 128];
        let frame = CameraFrame::new(2, 1, 4, PixelFormat::Yuyv, &data);
        let rgb = frame.to_rgb().unwrap();
        for p in rgb.pixels() {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
        }
    }

    #[test]
    fn rgb24_respects_stride_padding() {
        // 2x2 RGB24 with 2 bytes of padding per row
        let data = [
            255, 0, 0, 0, 255, 0, 0, 0, // row 0 + pad
            0, 0, 255, 255, 255, 255, 0, 0, // row 1 + pad
        ];
        let frame = CameraFrame::new(2, 2, 8, PixelFormat::Rgb24, &data);
        let rgb = frame.to_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn truncated_frame_is_malformed() {
        let data = vec![0u8; 4];
        let frame = CameraFrame::new(4, 4, 4, PixelFormat::Gray8, &data);
        assert!(matches!(frame.to_luma(), Err(FrameError::Malformed(_))));
    }
}
