// THEORY:
// A `Frame` is an immutable, independently owned grid of RGBA8 pixels. The scorer
// keeps exactly one of them alive between submissions, so a frame must never borrow
// from a capture buffer that the camera will recycle. `copy_from_slice` is the
// defensive copy a capture collaborator makes before handing a frame to another
// execution context; its allocation is fallible and reported, never aborted.
//
// `FrameLayout` is the comparable "shape" of a frame. Two frames can only be
// differenced when their layouts are equal.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::MotionError;
use image::RgbaImage;
use std::fmt;

/// The pixel encoding of a frame. Only 8-bit, 4-channel RGBA is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Rgba8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => CHANNELS,
        }
    }

    pub fn bits_per_channel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 8,
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bits_per_channel() / 8
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Rgba8 => f.write_str("RGBA8"),
        }
    }
}

/// Dimensions and format of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameLayout {
    /// `None` when the pixel count does not fit in `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// `None` when the buffer size does not fit in `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        self.pixel_count()?.checked_mul(self.format.bytes_per_pixel())
    }
}

impl fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.format)
    }
}

/// An owned, immutable camera frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    layout: FrameLayout,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps an owned RGBA8 buffer. The buffer length must be `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, MotionError> {
        let layout = Self::rgba_layout(width, height);
        Self::check_len(&layout, data.len())?;
        Ok(Self { layout, data })
    }

    /// Copies a borrowed capture buffer into a frame the scorer may retain.
    pub fn copy_from_slice(width: u32, height: u32, bytes: &[u8]) -> Result<Self, MotionError> {
        let layout = Self::rgba_layout(width, height);
        Self::check_len(&layout, bytes.len())?;
        let mut data = Self::allocate(&layout)?;
        data.extend_from_slice(bytes);
        Ok(Self { layout, data })
    }

    /// A frame where every pixel is `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self, MotionError> {
        let layout = Self::rgba_layout(width, height);
        let len = Self::byte_len(&layout)?;
        let mut data = Self::allocate(&layout)?;
        while data.len() < len {
            data.extend_from_slice(&pixel.channels());
        }
        Ok(Self { layout, data })
    }

    /// Copies an `image` buffer into a frame.
    pub fn from_image(image: &RgbaImage) -> Result<Self, MotionError> {
        Self::copy_from_slice(image.width(), image.height(), image.as_raw())
    }

    fn rgba_layout(width: u32, height: u32) -> FrameLayout {
        FrameLayout {
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    fn check_len(layout: &FrameLayout, actual: usize) -> Result<(), MotionError> {
        let expected = Self::byte_len(layout)?;
        if expected != actual {
            return Err(MotionError::InvalidBuffer {
                width: layout.width,
                height: layout.height,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn byte_len(layout: &FrameLayout) -> Result<usize, MotionError> {
        layout.byte_len().ok_or(MotionError::FrameAllocation {
            width: layout.width,
            height: layout.height,
            bytes: None,
            source: None,
        })
    }

    fn allocate(layout: &FrameLayout) -> Result<Vec<u8>, MotionError> {
        let bytes = Self::byte_len(layout)?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|source| MotionError::FrameAllocation {
                width: layout.width,
                height: layout.height,
                bytes: Some(bytes),
                source: Some(source),
            })?;
        Ok(data)
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / self.layout.format.bytes_per_pixel()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data
            .chunks_exact(self.layout.format.bytes_per_pixel())
            .map(Pixel::from)
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        let layout = Self::rgba_layout(image.width(), image.height());
        Self {
            layout,
            data: image.into_raw(),
        }
    }
}
