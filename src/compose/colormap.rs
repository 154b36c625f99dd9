// SPDX-License-Identifier: GPL-3.0-only

//! Depth colormap palette
//!
//! Maps 8-bit depth levels to RGB for visualization. The palette is a
//! 256-entry lookup table built from a polynomial fit of the Inferno
//! colormap (black=near zero, yellow=full scale).

/// Inferno colormap sample at `t` in [0, 1]
///
/// Polynomial approximation of the matplotlib Inferno colormap.
#[inline]
fn inferno(t: f32) -> [u8; 3] {
    let r = (0.00021894 + t * (0.1065134 + t * (11.602493 + t * (-41.703996
        + t * (77.162936 + t * (-71.319428 + t * 25.131126))))))
        .clamp(0.0, 1.0);
    let g = (0.0016510 + t * (0.5639564 + t * (-3.9728540 + t * (17.436399
        + t * (-33.402359 + t * (32.626064 + t * -12.242669))))))
        .clamp(0.0, 1.0);
    let b = (-0.0194809 + t * (3.9327124 + t * (-15.942394 + t * (44.354145
        + t * (-81.807309 + t * (73.209520 + t * -23.070325))))))
        .clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// 256-entry RGB lookup table for 8-bit depth levels
pub struct Palette {
    lut: [[u8; 3]; 256],
}

impl Palette {
    /// Build the Inferno palette
    pub fn inferno() -> Self {
        let mut lut = [[0u8; 3]; 256];
        for (level, entry) in lut.iter_mut().enumerate() {
            *entry = inferno(level as f32 / 255.0);
        }
        Self { lut }
    }

    /// Look up the color for an 8-bit depth level
    #[inline]
    pub fn color(&self, level: u8) -> [u8; 3] {
        self.lut[level as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::inferno()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let palette = Palette::inferno();
        // Low end is near black
        let [r, g, b] = palette.color(0);
        assert!(r < 16 && g < 16 && b < 16);
        // High end is bright yellow
        let [r, g, b] = palette.color(255);
        assert!(r > 200 && g > 200 && b > 100);
    }

    #[test]
    fn test_brightness_increases() {
        let palette = Palette::inferno();
        let luma = |level: u8| {
            let [r, g, b] = palette.color(level);
            r as u32 + g as u32 + b as u32
        };
        // Perceived brightness climbs across the ramp (sampled coarsely)
        assert!(luma(0) < luma(64));
        assert!(luma(64) < luma(128));
        assert!(luma(128) < luma(255));
    }
}
