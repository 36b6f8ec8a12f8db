//! Test frames for the flipbook tearing harness.
//!
//! Every frame is a full-resolution RGBA raster holding one opaque white
//! vertical bar on a zeroed background. Frame `i` of `N` places the bar's left
//! edge at column `width * i / N`, so cycling through the set sweeps the bar
//! across the window. A torn swap shows up as a bar broken at some scanline.
//!
//! The whole set is built up front in one contiguous allocation and is never
//! written again; the render loop only borrows frames out of it.

use std::ops::RangeInclusive;

/// Number of frames the harness cycles through.
pub const DEFAULT_FRAME_COUNT: usize = 10;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Pixel value inside the bar (all four channels saturated).
pub const BAR_PIXEL: u32 = 0xFFFF_FFFF;

/// Pixel value everywhere else.
pub const BACKGROUND_PIXEL: u32 = 0x0000_0000;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("frame count must be at least 1")]
    NoFrames,
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("{count} frames of {width}x{height} do not fit in memory")]
    TooLarge { width: u32, height: u32, count: usize },
}

/// Inclusive column range covered by a frame's bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSpan {
    pub left: u32,
    pub right: u32,
}

impl BarSpan {
    /// Computes the bar for frame `index` of `count` in a `width`-wide image.
    ///
    /// The nominal span is `[width*index/count, width*index/count + width/count]`
    /// (inclusive on both ends, so one column wider than `width/count`). The
    /// last frame's span can run one column past the image and is clipped.
    pub fn for_frame(width: u32, index: usize, count: usize) -> Self {
        let width = width as u64;
        let count = count.max(1) as u64;
        let left = width * index as u64 / count;
        let bar_width = width / count;
        let right = (left + bar_width).min(width.saturating_sub(1));
        Self {
            left: left as u32,
            right: right as u32,
        }
    }

    pub fn columns(&self) -> RangeInclusive<u32> {
        self.left..=self.right
    }

    pub fn contains(&self, column: u32) -> bool {
        self.columns().contains(&column)
    }

    /// Number of columns painted by the bar.
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }
}

/// Maps a loop iteration to the frame shown on that iteration.
pub fn frame_index(counter: u64, count: usize) -> usize {
    (counter % count.max(1) as u64) as usize
}

/// Immutable set of pre-rendered stripe frames.
pub struct FrameSet {
    width: u32,
    height: u32,
    count: usize,
    pixels: Vec<u32>,
}

impl FrameSet {
    /// Renders `count` frames of `width` x `height` pixels.
    pub fn generate(width: u32, height: u32, count: usize) -> Result<Self, PatternError> {
        if count == 0 {
            return Err(PatternError::NoFrames);
        }
        if width == 0 || height == 0 {
            return Err(PatternError::EmptyFrame { width, height });
        }

        let too_large = PatternError::TooLarge {
            width,
            height,
            count,
        };
        let frame_pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| too_large.clone())?;
        let total_pixels = frame_pixels
            .checked_mul(count)
            .ok_or_else(|| too_large.clone())?;
        total_pixels
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(too_large)?;

        let mut pixels = Vec::with_capacity(total_pixels);
        for index in 0..count {
            let bar = BarSpan::for_frame(width, index, count);
            for _ in 0..height {
                pixels.extend((0..width).map(|x| {
                    if bar.contains(x) {
                        BAR_PIXEL
                    } else {
                        BACKGROUND_PIXEL
                    }
                }));
            }
        }

        tracing::debug!(
            width,
            height,
            count,
            bytes = total_pixels * BYTES_PER_PIXEL,
            "generated stripe frames"
        );

        Ok(Self {
            width,
            height,
            count,
            pixels,
        })
    }

    /// Builds the standard ten-frame sweep.
    pub fn standard(width: u32, height: u32) -> Result<Self, PatternError> {
        Self::generate(width, height, DEFAULT_FRAME_COUNT)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size in bytes of a single frame.
    pub fn byte_len(&self) -> usize {
        self.frame_pixels() * BYTES_PER_PIXEL
    }

    pub fn bar(&self, index: usize) -> BarSpan {
        BarSpan::for_frame(self.width, index % self.count, self.count)
    }

    /// Pixels of frame `index` (wrapped modulo the frame count), row-major from
    /// the top row down.
    pub fn frame(&self, index: usize) -> &[u32] {
        let stride = self.frame_pixels();
        let start = (index % self.count) * stride;
        &self.pixels[start..start + stride]
    }

    /// Frame `index` as the RGBA8 byte payload uploaded to the GPU.
    pub fn frame_bytes(&self, index: usize) -> &[u8] {
        bytemuck::cast_slice(self.frame(index))
    }

    /// Payload for loop iteration `counter`.
    pub fn select(&self, counter: u64) -> &[u8] {
        self.frame_bytes(frame_index(counter, self.count))
    }

    fn frame_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Debug for FrameSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSet")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
