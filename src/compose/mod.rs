// SPDX-License-Identifier: MPL-2.0

//! Depth-mask compositing pipeline
//!
//! This module turns one raw depth buffer and one model-derived grayscale
//! frame into a three-panel debug composite:
//!
//! - normalize the depth buffer against its own min/max and quantize to 8 bit
//! - colorize the quantized map through the Inferno palette
//! - invert and threshold the grayscale frame into a binary mask
//! - AND the mask against the colorized depth
//! - concatenate [depth | mask | masked] side by side
//!
//! Every call is stateless; the only side effect is output allocation.

pub mod colormap;

pub use colormap::Palette;

use crate::errors::ComposeError;
use image::{GrayImage, Luma, RgbImage};

/// Row-major grid of raw depth values
///
/// Values arrive as one flat inference output layer and are validated
/// against the declared grid dimensions on construction.
#[derive(Debug, Clone)]
pub struct DepthMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthMap {
    /// Wrap a flat value buffer as a width x height grid
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Result<Self, ComposeError> {
        if width == 0 || height == 0 {
            return Err(ComposeError::EmptyPanel);
        }
        let expected = (width * height) as usize;
        if values.len() != expected {
            return Err(ComposeError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Observed value range of this buffer
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Normalize raw depth values to 8-bit levels using the buffer's own range.
///
/// Quantization truncates rather than rounds, so only the exact maximum
/// reaches 255. A uniform buffer has no range to normalize; the result is
/// an all-zero map rather than NaN propagation.
pub fn normalize_depth(depth: &DepthMap) -> Vec<u8> {
    let (d_min, d_max) = depth.min_max();
    let range = d_max - d_min;
    if range <= 0.0 {
        return vec![0; depth.values.len()];
    }
    depth
        .values
        .iter()
        .map(|&v| (((v - d_min) / range) * 255.0) as u8)
        .collect()
}

/// Colorize 8-bit depth levels through a palette
pub fn colorize(
    levels: &[u8],
    width: u32,
    height: u32,
    palette: &Palette,
) -> Result<RgbImage, ComposeError> {
    let expected = (width * height) as usize;
    if levels.len() != expected {
        return Err(ComposeError::ShapeMismatch {
            expected,
            actual: levels.len(),
        });
    }
    let mut data = Vec::with_capacity(expected * 3);
    for &level in levels {
        data.extend_from_slice(&palette.color(level));
    }
    let actual = data.len();
    RgbImage::from_raw(width, height, data).ok_or(ComposeError::ShapeMismatch {
        expected: expected * 3,
        actual,
    })
}

/// Pixel-wise inversion (255 - value)
pub fn invert(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = 255 - *v;
    }
    out
}

/// Binary threshold: values at or above `cutoff` become 255, the rest 0
pub fn threshold_binary(gray: &GrayImage, cutoff: u8) -> GrayImage {
    let mut out = gray.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = if *v >= cutoff { 255 } else { 0 };
    }
    out
}

/// Replicate a single channel into three identical RGB channels
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        image::Rgb([v, v, v])
    })
}

/// Pixel-wise bitwise AND of two same-sized RGB images
pub fn bitwise_and(a: &RgbImage, b: &RgbImage) -> Result<RgbImage, ComposeError> {
    if a.dimensions() != b.dimensions() {
        return Err(ComposeError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    let data: Vec<u8> = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&x, &y)| x & y)
        .collect();
    let actual = data.len();
    RgbImage::from_raw(a.width(), a.height(), data).ok_or(ComposeError::ShapeMismatch {
        expected: (a.width() * a.height() * 3) as usize,
        actual,
    })
}

/// Concatenate same-height panels side by side
pub fn hconcat(panels: &[&RgbImage]) -> Result<RgbImage, ComposeError> {
    let Some(first) = panels.first() else {
        return Err(ComposeError::EmptyPanel);
    };
    let height = first.height();
    for panel in panels {
        if panel.height() != height {
            return Err(ComposeError::DimensionMismatch {
                left: first.dimensions(),
                right: panel.dimensions(),
            });
        }
    }
    let total_width: u32 = panels.iter().map(|p| p.width()).sum();
    if total_width == 0 || height == 0 {
        return Err(ComposeError::EmptyPanel);
    }

    let mut out = RgbImage::new(total_width, height);
    let mut x_offset = 0u32;
    for panel in panels {
        for y in 0..height {
            for x in 0..panel.width() {
                out.put_pixel(x_offset + x, y, *panel.get_pixel(x, y));
            }
        }
        x_offset += panel.width();
    }
    Ok(out)
}

/// One composite visualization frame
#[derive(Debug, Clone)]
pub struct CompositeFrame {
    /// [depth | mask | masked] panels, width = 3x input width
    pub image: RgbImage,
}

impl CompositeFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Stateless per-cycle compositor
///
/// Holds only the palette and the mask threshold; no state is carried
/// between cycles.
pub struct Compositor {
    palette: Palette,
    mask_threshold: u8,
}

impl Compositor {
    pub fn new(mask_threshold: u8) -> Self {
        Self {
            palette: Palette::inferno(),
            mask_threshold,
        }
    }

    /// Composite one depth buffer with one model-derived grayscale frame.
    ///
    /// The grayscale frame must share the depth grid's dimensions. Output
    /// is (3 * width) x height RGB.
    pub fn compose(
        &self,
        depth: &DepthMap,
        model_output: &GrayImage,
    ) -> Result<CompositeFrame, ComposeError> {
        if model_output.dimensions() != (depth.width(), depth.height()) {
            return Err(ComposeError::DimensionMismatch {
                left: (depth.width(), depth.height()),
                right: model_output.dimensions(),
            });
        }

        let levels = normalize_depth(depth);
        let depth_panel = colorize(&levels, depth.width(), depth.height(), &self.palette)?;

        let inverted = invert(model_output);
        let mask = threshold_binary(&inverted, self.mask_threshold);
        let mask_panel = gray_to_rgb(&mask);

        let masked_panel = bitwise_and(&depth_panel, &mask_panel)?;

        let image = hconcat(&[&depth_panel, &mask_panel, &masked_panel])?;
        Ok(CompositeFrame { image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_shape() {
        let compositor = Compositor::new(120);
        let depth = DepthMap::from_values(4, 2, (0..8).map(|v| v as f32).collect()).unwrap();
        let gray = GrayImage::from_pixel(4, 2, Luma([0]));
        let frame = compositor.compose(&depth, &gray).unwrap();
        assert_eq!(frame.width(), 12);
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn test_compose_rejects_mismatched_model_output() {
        let compositor = Compositor::new(120);
        let depth = DepthMap::from_values(4, 2, vec![0.0; 8]).unwrap();
        let gray = GrayImage::from_pixel(2, 2, Luma([0]));
        assert!(compositor.compose(&depth, &gray).is_err());
    }

    #[test]
    fn test_depth_map_shape_check() {
        assert!(DepthMap::from_values(4, 4, vec![0.0; 15]).is_err());
        assert!(DepthMap::from_values(0, 4, vec![]).is_err());
    }
}
