//! Frame acquisition from a real webcam or a synthetic generator.
//!
//! Opening a source is its constructor and is the only fatal step; a
//! per-tick read that yields nothing is a transient miss (`None`) and the
//! loop simply tries again next tick.

use crate::config::AppConfig;
use crate::error::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured image, 0RGB pixels in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Position in the stream, starting at 0.
    pub index:  u64,
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn filled(index: u64, width: usize, height: usize, color: u32) -> Self {
        Frame { index, width, height, pixels: vec![color; width * height] }
    }

    /// Packed `R, G, B` bytes, as the landmark helper expects them.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            out.push((p >> 16) as u8);
            out.push((p >> 8) as u8);
            out.push(p as u8);
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// A lazy, possibly endless frame sequence owned by one loop.
pub trait FrameSource {
    /// Next frame in arrival order, or `None` when none was available this
    /// tick.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Open the source selected at build time: the webcam with
/// `--features camera`, the synthetic generator otherwise.
pub fn open_frame_source(cfg: &AppConfig) -> Result<Box<dyn FrameSource>, AppError> {
    #[cfg(feature = "camera")]
    {
        Ok(Box::new(CameraFrameSource::open(cfg.camera_index)?))
    }
    #[cfg(not(feature = "camera"))]
    {
        Ok(Box::new(SimFrameSource::new(cfg.frame_width, cfg.frame_height)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource: synthetic frames (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Slowly shifting gradient; pairs with `SimHandDetector`.
pub struct SimFrameSource {
    width:  usize,
    height: usize,
    next:   u64,
}

impl SimFrameSource {
    pub fn new(width: usize, height: usize) -> Self {
        SimFrameSource { width, height, next: 0 }
    }
}

impl FrameSource for SimFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let index = self.next;
        self.next += 1;

        let shift = (index % 256) as usize;
        let mut pixels = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x * 64 / self.width.max(1)) + 24) as u32;
                let g = ((y * 64 / self.height.max(1)) + 24) as u32;
                let b = ((shift + x / 8) % 64 + 32) as u32;
                pixels.push((r << 16) | (g << 8) | b);
            }
        }
        Some(Frame { index, width: self.width, height: self.height, pixels })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraFrameSource: real webcam (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Webcam frames via `nokhwa`.  The stream is stopped on drop.
#[cfg(feature = "camera")]
pub struct CameraFrameSource {
    camera: nokhwa::Camera,
    next:   u64,
}

#[cfg(feature = "camera")]
impl CameraFrameSource {
    pub fn open(index: u32) -> Result<Self, AppError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

        let unavailable = |e: nokhwa::NokhwaError| AppError::DeviceUnavailable {
            index,
            reason: e.to_string(),
        };

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested).map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;

        log::info!("opened camera {}: {}", index, camera.info().human_name());
        Ok(CameraFrameSource { camera, next: 0 })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = match self.camera.frame() {
            Ok(b) => b,
            Err(e) => {
                log::debug!("frame read failed: {}", e);
                return None;
            }
        };
        let image = match buffer.decode_image::<RgbFormat>() {
            Ok(img) => img,
            Err(e) => {
                log::debug!("frame decode failed: {}", e);
                return None;
            }
        };

        let (w, h) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                ((r as u32) << 16) | ((g as u32) << 8) | b as u32
            })
            .collect();

        let index = self.next;
        self.next += 1;
        Some(Frame { index, width: w as usize, height: h as usize, pixels })
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraFrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("failed to stop camera stream: {}", e);
        }
        log::debug!("camera released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_frames_are_sized_and_sequential() {
        let mut src = SimFrameSource::new(32, 24);
        let a = src.next_frame().unwrap();
        let b = src.next_frame().unwrap();
        assert_eq!((a.index, b.index), (0, 1));
        assert_eq!(a.pixels.len(), 32 * 24);
        assert_ne!(a.pixels, b.pixels);
    }

    #[test]
    fn rgb_bytes_unpacks_channels() {
        let f = Frame::filled(0, 2, 1, 0x00_12_34_56);
        assert_eq!(f.rgb_bytes(), vec![0x12, 0x34, 0x56, 0x12, 0x34, 0x56]);
    }
}
