// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the device layer

//! Frame and inference-output types delivered by device output queues

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;

/// One color preview frame
///
/// Pixel data is tightly packed RGB24, row-major, matching the configured
/// preview resolution.
#[derive(Debug, Clone)]
pub struct ColorFrame {
    pub width: u32,
    pub height: u32,
    /// RGB24 pixel data, 3 bytes per pixel, no row padding
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was produced (for latency diagnostics)
    pub captured_at: Instant,
}

impl ColorFrame {
    /// Expected byte length for a frame of the given dimensions
    pub fn expected_len(width: u32, height: u32) -> usize {
        (width * height * 3) as usize
    }

    /// Sample one pixel, clamping out-of-range coordinates to the edge
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let idx = ((y * self.width + x) * 3) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// View the frame as an owned `image::RgbImage`
    pub fn to_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.to_vec())
    }
}

/// One raw inference output layer
///
/// The wire format is a flat sequence of IEEE-754 half-precision floats,
/// little-endian, row-major, one value per input pixel.
#[derive(Debug, Clone)]
pub struct InferencePacket {
    /// Raw little-endian half-float bytes
    pub data: Arc<[u8]>,
    /// Timestamp when the packet was produced
    pub captured_at: Instant,
}

impl InferencePacket {
    /// Number of 16-bit values carried by this packet
    pub fn len_values(&self) -> usize {
        self.data.len() / 2
    }

    /// Decode the packet into f32 values
    ///
    /// A trailing odd byte, if any, is ignored.
    pub fn values(&self) -> Vec<f32> {
        self.data
            .chunks_exact(2)
            .map(|pair| half_bits_to_f32(u16::from_le_bytes([pair[0], pair[1]])))
            .collect()
    }
}

/// Decode an IEEE-754 binary16 bit pattern to f32
pub fn half_bits_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) & 0x1) as u32;
    let exponent = ((bits >> 10) & 0x1f) as u32;
    let mantissa = (bits & 0x3ff) as u32;

    let value = match exponent {
        // Zero and subnormals: mantissa * 2^-24
        0 => mantissa as f32 * 2.0f32.powi(-24),
        // Infinities and NaN
        0x1f => {
            if mantissa == 0 {
                f32::INFINITY
            } else {
                f32::NAN
            }
        }
        // Normal numbers: rebias exponent from 15 to 127
        _ => f32::from_bits(((exponent + 112) << 23) | (mantissa << 13)),
    };

    if sign == 1 { -value } else { value }
}

/// Encode an f32 as an IEEE-754 binary16 bit pattern (round to nearest)
pub fn f32_to_half_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x7f_ffff;

    // NaN and infinity
    if exponent == 0xff {
        return if mantissa == 0 {
            sign | 0x7c00
        } else {
            sign | 0x7e00
        };
    }

    let unbiased = exponent - 127;
    // Overflows half range: clamp to infinity
    if unbiased > 15 {
        return sign | 0x7c00;
    }
    // Underflows to subnormal or zero
    if unbiased < -14 {
        if unbiased < -24 {
            return sign;
        }
        let shift = (-14 - unbiased) as u32;
        let sub = (mantissa | 0x80_0000) >> (13 + shift);
        let round_bit = 1u32 << (12 + shift);
        let rounded = if (mantissa | 0x80_0000) & round_bit != 0 {
            sub + 1
        } else {
            sub
        };
        return sign | rounded as u16;
    }

    let half_exp = ((unbiased + 15) as u32) << 10;
    let half_mant = mantissa >> 13;
    // A mantissa carry propagates into the exponent, up to infinity at the
    // top of the half range
    let rounded = if mantissa & 0x1000 != 0 {
        half_exp + half_mant + 1
    } else {
        half_exp + half_mant
    };
    sign | rounded as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_decode_known_patterns() {
        assert_eq!(half_bits_to_f32(0x0000), 0.0);
        assert_eq!(half_bits_to_f32(0x3c00), 1.0);
        assert_eq!(half_bits_to_f32(0xc000), -2.0);
        assert_eq!(half_bits_to_f32(0x3800), 0.5);
        assert_eq!(half_bits_to_f32(0x7c00), f32::INFINITY);
        assert!(half_bits_to_f32(0x7e00).is_nan());
        // Smallest subnormal
        assert!((half_bits_to_f32(0x0001) - 5.960_464_5e-8).abs() < 1e-12);
    }

    #[test]
    fn test_half_encode_known_values() {
        assert_eq!(f32_to_half_bits(0.0), 0x0000);
        assert_eq!(f32_to_half_bits(1.0), 0x3c00);
        assert_eq!(f32_to_half_bits(-2.0), 0xc000);
        assert_eq!(f32_to_half_bits(65504.0), 0x7bff);
        assert_eq!(f32_to_half_bits(1e6), 0x7c00);
    }

    #[test]
    fn test_packet_decode() {
        let mut bytes = Vec::new();
        for v in [0.0f32, 0.5, 1.0, 5.0] {
            bytes.extend_from_slice(&f32_to_half_bits(v).to_le_bytes());
        }
        let packet = InferencePacket {
            data: Arc::from(bytes.into_boxed_slice()),
            captured_at: Instant::now(),
        };
        assert_eq!(packet.len_values(), 4);
        assert_eq!(packet.values(), vec![0.0, 0.5, 1.0, 5.0]);
    }

    #[test]
    fn test_frame_sampling_clamps_to_edge() {
        let data: Vec<u8> = vec![
            10, 20, 30, 40, 50, 60, //
            70, 80, 90, 100, 110, 120,
        ];
        let frame = ColorFrame {
            width: 2,
            height: 2,
            data: Arc::from(data.into_boxed_slice()),
            captured_at: Instant::now(),
        };
        assert_eq!(frame.rgb_at(0, 0), (10, 20, 30));
        assert_eq!(frame.rgb_at(5, 5), (100, 110, 120));
    }
}
