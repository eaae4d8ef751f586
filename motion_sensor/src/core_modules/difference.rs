// THEORY:
// The difference reduction collapses a pair of frames into one comparable scalar.
//
// 1.  **Difference image**: every channel of `current` is compared with the same
//     channel of `previous` and the absolute difference is kept. No image is ever
//     materialised; differences are folded straight into per-channel accumulators.
// 2.  **Area average**: the accumulators are divided by the pixel count, giving one
//     mean per channel over the full extent of the frame.
// 3.  **Render**: the means are quantised to a single representative RGBA8 pixel.
// 4.  **Score**: the pixel's channels are summed in a widened integer and normalised
//     by `255 * 4`, producing a magnitude in [0, 1].
//
// The result is resolution independent but spatially blind: one hot pixel and a faint
// haze across the whole frame can score the same.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::{
    CHANNEL_MAX, CHANNELS, Channel, Pixel, WorkingSpace, linear_to_srgb, quantize,
    srgb_to_linear,
};
use crate::error::MotionError;

const ALPHA: usize = 3;
const MAX_PIXEL_SUM: f32 = CHANNEL_MAX * CHANNELS as f32;

/// Reduces the absolute difference of two frames to one averaged pixel.
pub fn difference_average(
    current: &Frame,
    previous: &Frame,
    space: WorkingSpace,
) -> Result<Pixel, MotionError> {
    if current.layout() != previous.layout() {
        return Err(MotionError::FormatMismatch {
            previous: previous.layout(),
            current: current.layout(),
        });
    }

    let num_pixels = current.pixel_count();
    if num_pixels == 0 {
        return Ok(Pixel::default());
    }

    // Process in blocks for better cache locality on large frames.
    const BLOCK_BYTES: usize = 64 * CHANNELS;
    let mut sums = [0f64; CHANNELS];

    for (cur_block, prev_block) in current
        .as_bytes()
        .chunks(BLOCK_BYTES)
        .zip(previous.as_bytes().chunks(BLOCK_BYTES))
    {
        for (cur_px, prev_px) in cur_block
            .chunks_exact(CHANNELS)
            .zip(prev_block.chunks_exact(CHANNELS))
        {
            for channel in 0..CHANNELS {
                sums[channel] += channel_difference(cur_px[channel], prev_px[channel], channel, space);
            }
        }
    }

    let mut averaged = [0 as Channel; CHANNELS];
    for channel in 0..CHANNELS {
        let mean = sums[channel] / num_pixels as f64;
        averaged[channel] = match space {
            WorkingSpace::Linear if channel != ALPHA => quantize(linear_to_srgb(mean)),
            _ => quantize(mean),
        };
    }

    Ok(Pixel::from(averaged))
}

/// Normalised motion magnitude in [0, 1] between two same-layout frames.
pub fn compute_magnitude(
    current: &Frame,
    previous: &Frame,
    space: WorkingSpace,
) -> Result<f32, MotionError> {
    let average = difference_average(current, previous, space)?;
    Ok(average.sum() as f32 / MAX_PIXEL_SUM)
}

/// Absolute difference of one channel, normalised to 0..=1.
#[inline]
fn channel_difference(current: Channel, previous: Channel, channel: usize, space: WorkingSpace) -> f64 {
    match space {
        WorkingSpace::Linear if channel != ALPHA => {
            (srgb_to_linear(current) - srgb_to_linear(previous)).abs() as f64
        }
        _ => current.abs_diff(previous) as f64 / CHANNEL_MAX as f64,
    }
}
