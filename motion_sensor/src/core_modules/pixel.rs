// THEORY:
// The `Pixel` module is the smallest unit of the motion scorer. A `Pixel` is a
// "dumb" RGBA8 container: it knows its own channels and how to total them, and
// nothing about neighbours or history.
//
// It also owns the colour-space helpers used by the difference reduction. Camera
// bytes are sRGB encoded; averaging them as-is under-weights bright changes compared
// to what a rendering pipeline produces. The `Linear` working space decodes each
// byte through a 256-entry `OnceLock` table, so the hot path stays a lookup, and
// encodes the averaged result back to sRGB before it is quantised.
// Alpha is not gamma-encoded and is passed through untouched.

pub mod pixel {
    use serde::{Deserialize, Serialize};
    use std::sync::OnceLock;

    pub type Channel = u8;
    pub type LinearChannel = f32;
    pub type ChannelSum = u32;

    pub const CHANNELS: usize = 4;
    pub const CHANNEL_MAX: f32 = 255.0;

    static SRGB_TO_LINEAR_LUT: OnceLock<[LinearChannel; 256]> = OnceLock::new();

    /// A single RGBA8 pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Self {
                red,
                green,
                blue,
                alpha,
            }
        }

        pub const BLACK: Pixel = Pixel::new(0, 0, 0, 255);
        pub const RED: Pixel = Pixel::new(255, 0, 0, 255);

        /// Sum of all four channels, widened so it can never overflow (max 1020).
        pub fn sum(&self) -> ChannelSum {
            self.red as ChannelSum
                + self.green as ChannelSum
                + self.blue as ChannelSum
                + self.alpha as ChannelSum
        }

        pub fn channels(&self) -> [Channel; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }
    }

    impl From<&[u8]> for Pixel {
        /// Reads the first four bytes as R, G, B, A. Missing bytes read as zero.
        fn from(bytes: &[u8]) -> Self {
            let at = |i: usize| bytes.get(i).copied().unwrap_or_default();
            Pixel::new(at(0), at(1), at(2), at(3))
        }
    }

    impl From<[Channel; CHANNELS]> for Pixel {
        fn from(c: [Channel; CHANNELS]) -> Self {
            Pixel::new(c[0], c[1], c[2], c[3])
        }
    }

    impl From<Pixel> for image::Rgba<u8> {
        fn from(p: Pixel) -> Self {
            image::Rgba(p.channels())
        }
    }

    /// The space in which frame differences are evaluated and averaged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum WorkingSpace {
        /// sRGB bytes are decoded to linear light, averaged, then re-encoded.
        #[default]
        Linear,
        /// Bytes are differenced and averaged exactly as stored.
        Encoded,
    }

    /// Decodes an sRGB byte to linear light in 0..=1.
    #[inline]
    pub fn srgb_to_linear(value: Channel) -> LinearChannel {
        let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
            let mut table = [0.0f32; 256];
            for (i, entry) in table.iter_mut().enumerate() {
                let srgb = i as f32 / CHANNEL_MAX;
                *entry = if srgb <= 0.04045 {
                    srgb / 12.92
                } else {
                    ((srgb + 0.055) / 1.055).powf(2.4)
                };
            }
            table
        });
        table[value as usize]
    }

    /// Encodes a linear-light value in 0..=1 back to normalised sRGB.
    pub fn linear_to_srgb(value: f64) -> f64 {
        let value = value.clamp(0.0, 1.0);
        if value <= 0.003_130_8 {
            value * 12.92
        } else {
            1.055 * value.powf(1.0 / 2.4) - 0.055
        }
    }

    /// Rounds a normalised channel to the nearest byte.
    pub fn quantize(normalized: f64) -> Channel {
        (normalized * CHANNEL_MAX as f64).round().clamp(0.0, CHANNEL_MAX as f64) as Channel
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn sum_does_not_overflow_at_full_white() {
        let white = Pixel::new(255, 255, 255, 255);
        assert_eq!(white.sum(), 1020);
    }

    #[test]
    fn from_short_slice_fills_missing_channels_with_zero() {
        let pixel = Pixel::from(&[10u8, 20][..]);
        assert_eq!(pixel, Pixel::new(10, 20, 0, 0));
    }

    #[test]
    fn linearization_endpoints_are_exact() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        assert_eq!(quantize(linear_to_srgb(0.0)), 0);
        assert_eq!(quantize(linear_to_srgb(1.0)), 255);
    }

    #[test]
    fn encoding_round_trips_every_byte() {
        for byte in 0..=255u8 {
            let back = quantize(linear_to_srgb(srgb_to_linear(byte) as f64));
            assert_eq!(back, byte, "byte {byte} did not survive decode/encode");
        }
    }

    #[test]
    fn mid_grey_linear_average_is_brighter_once_encoded() {
        // Half of the pixels fully lit averages to 0.5 linear, which encodes well above 128.
        assert_eq!(quantize(linear_to_srgb(0.5)), 188);
    }
}
