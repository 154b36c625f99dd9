// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Network input constants
///
/// The on-board depth network runs at a fixed input resolution; every
/// intermediate grid in the compositing pipeline shares these dimensions.
pub mod network {
    /// Depth network input width (pixels)
    pub const INPUT_WIDTH: u32 = 256;

    /// Depth network input height (pixels)
    pub const INPUT_HEIGHT: u32 = 256;

    /// Values per inference output layer (one scalar per input pixel)
    pub const VALUES_PER_FRAME: usize = (INPUT_WIDTH * INPUT_HEIGHT) as usize;

    /// Bytes per inference output layer (16-bit values, little-endian)
    pub const BYTES_PER_FRAME: usize = VALUES_PER_FRAME * 2;
}

/// Capture pipeline constants
pub mod capture {
    /// Default preview framerate
    pub const DEFAULT_FPS: u32 = 40;

    /// Output queue depth (frames beyond this are dropped, newest first)
    pub const QUEUE_CAPACITY: usize = 4;

    /// Frame pool size configured on the device
    pub const POOL_FRAMES: u32 = 4;

    /// On-board inference threads
    pub const INFERENCE_THREADS: u32 = 2;

    /// Bounded wait for one frame before reporting a timeout
    pub const READ_TIMEOUT_MS: u64 = 5_000;

    /// Poll interval while waiting on an output queue
    pub const FRAME_POLL_INTERVAL_MS: u64 = 16;
}

/// Mask extraction constants
pub mod mask {
    /// Binary threshold applied to the inverted model output.
    ///
    /// Inverted values at or above the cutoff become 255, the rest 0.
    pub const DEFAULT_THRESHOLD: u8 = 120;
}

/// Viewer constants
pub mod viewer {
    use std::time::Duration;

    /// Throughput figures are refreshed once per interval
    pub const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(1);
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_per_frame() {
        assert_eq!(network::VALUES_PER_FRAME, 65_536);
        assert_eq!(network::BYTES_PER_FRAME, 131_072);
    }

    #[test]
    fn test_threshold_is_nontrivial() {
        assert!(mask::DEFAULT_THRESHOLD > 0);
        assert!(mask::DEFAULT_THRESHOLD < u8::MAX);
    }
}
