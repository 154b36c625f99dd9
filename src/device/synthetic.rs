// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic frame source
//!
//! Procedural stand-in for the camera device and its on-board depth
//! network, used by the viewer and headless mode when no hardware is
//! attached. Produces a dim backdrop with a bright pane sweeping across
//! it, plus a matching animated depth ramp.

use super::types::{ColorFrame, InferencePacket, f32_to_half_bits};
use super::{FrameProducer, MaskModel};
use crate::errors::DeviceError;
use image::{GrayImage, Luma};
use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

/// Procedural producer of paired color frames and depth outputs
pub struct SyntheticProducer {
    width: u32,
    height: u32,
    cycle: u64,
}

impl SyntheticProducer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cycle: 0,
        }
    }

    /// Animation phase for the current cycle
    fn phase(&self) -> f32 {
        self.cycle as f32 * 0.05
    }

    fn render_color(&self) -> Vec<u8> {
        let (w, h) = (self.width, self.height);
        let phase = self.phase();
        // Pane sweeps horizontally across the scene
        let pane_center = ((phase * 0.5).sin() * 0.3 + 0.5) * w as f32;
        let pane_half_width = w as f32 / 6.0;

        let mut data = Vec::with_capacity(ColorFrame::expected_len(w, h));
        for y in 0..h {
            for x in 0..w {
                let in_pane = (x as f32 - pane_center).abs() < pane_half_width
                    && y > h / 8
                    && y < h - h / 8;
                if in_pane {
                    data.extend_from_slice(&[235, 240, 248]);
                } else {
                    let r = (40 + x * 60 / w.max(1)) as u8;
                    let g = (45 + y * 60 / h.max(1)) as u8;
                    data.extend_from_slice(&[r, g, 90]);
                }
            }
        }
        data
    }

    fn render_depth(&self) -> Vec<u8> {
        let (w, h) = (self.width, self.height);
        let phase = self.phase();

        let mut data = Vec::with_capacity((w * h * 2) as usize);
        for y in 0..h {
            for x in 0..w {
                // Incline toward the bottom plus a slow traveling wave
                let incline = y as f32 / h.max(1) as f32 * 2.0;
                let wave = 0.25 * (x as f32 / w.max(1) as f32 * TAU + phase).sin();
                data.extend_from_slice(&f32_to_half_bits(incline + wave).to_le_bytes());
            }
        }
        data
    }
}

impl FrameProducer for SyntheticProducer {
    fn produce(&mut self) -> Result<(ColorFrame, InferencePacket), DeviceError> {
        let captured_at = Instant::now();
        let frame = ColorFrame {
            width: self.width,
            height: self.height,
            data: Arc::from(self.render_color().into_boxed_slice()),
            captured_at,
        };
        let packet = InferencePacket {
            data: Arc::from(self.render_depth().into_boxed_slice()),
            captured_at,
        };
        self.cycle += 1;
        Ok((frame, packet))
    }
}

/// Luma-based stand-in for the pretrained segmentation model
///
/// Scores each pixel by BT.601 luma, so bright regions (the pane) read as
/// high values and drop out of the mask after inversion and thresholding.
#[derive(Debug, Clone, Copy, Default)]
pub struct LumaMaskModel;

impl MaskModel for LumaMaskModel {
    fn infer(&self, frame: &ColorFrame) -> Result<GrayImage, DeviceError> {
        let expected = ColorFrame::expected_len(frame.width, frame.height);
        if frame.data.len() != expected {
            return Err(DeviceError::Model(format!(
                "frame data {} bytes, expected {}",
                frame.data.len(),
                expected
            )));
        }
        let gray = GrayImage::from_fn(frame.width, frame.height, |x, y| {
            let (r, g, b) = frame.rgb_at(x, y);
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            Luma([luma.clamp(0.0, 255.0) as u8])
        });
        Ok(gray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produce_shapes() {
        let mut producer = SyntheticProducer::new(16, 8);
        let (frame, packet) = producer.produce().unwrap();
        assert_eq!(frame.data.len(), 16 * 8 * 3);
        assert_eq!(packet.len_values(), 16 * 8);
    }

    #[test]
    fn test_cycles_advance_the_scene() {
        let mut producer = SyntheticProducer::new(16, 8);
        let (first, _) = producer.produce().unwrap();
        for _ in 0..20 {
            producer.produce().unwrap();
        }
        let (later, _) = producer.produce().unwrap();
        assert_ne!(first.data, later.data);
    }

    #[test]
    fn test_luma_model_scores_white_as_full() {
        let frame = ColorFrame {
            width: 2,
            height: 2,
            data: Arc::from(vec![255u8; 12].into_boxed_slice()),
            captured_at: Instant::now(),
        };
        let gray = LumaMaskModel.infer(&frame).unwrap();
        assert!(gray.pixels().all(|Luma([v])| *v >= 254));
    }
}
