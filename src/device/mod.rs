// SPDX-License-Identifier: GPL-3.0-only

//! Device layer: pipeline configuration, scoped device handle, output queues
//!
//! The camera hardware and its on-board depth network stay behind the
//! [`FrameProducer`] trait; the host-side segmentation model stays behind
//! [`MaskModel`]. A [`Device`] owns the capture thread that drives a
//! producer and exposes its frames through bounded output queues.

pub mod frame_loop;
pub mod synthetic;
pub mod types;

use crate::constants::capture;
use crate::errors::DeviceError;
use frame_loop::{CaptureLoopController, LoopAction};
use futures::channel::mpsc;
use image::GrayImage;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use types::{ColorFrame, InferencePacket};

/// On-board pipeline configuration
///
/// Built once by the caller and handed to [`Device::open`]; mirrors the
/// knobs the device exposes for its preview stream and inference node.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Preview / network input width
    pub preview_width: u32,
    /// Preview / network input height
    pub preview_height: u32,
    /// Preview framerate
    pub fps: u32,
    /// Output queue depth; frames beyond this are dropped
    pub queue_capacity: usize,
    /// Frame pool size configured on the inference node
    pub pool_frames: u32,
    /// On-board inference threads
    pub inference_threads: u32,
    /// Depth model blob handed to the device (opaque to this crate)
    pub model_path: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        use crate::constants::network;
        Self {
            preview_width: network::INPUT_WIDTH,
            preview_height: network::INPUT_HEIGHT,
            fps: capture::DEFAULT_FPS,
            queue_capacity: capture::QUEUE_CAPACITY,
            pool_frames: capture::POOL_FRAMES,
            inference_threads: capture::INFERENCE_THREADS,
            model_path: None,
        }
    }
}

impl DeviceConfig {
    fn validate(&self) -> Result<(), DeviceError> {
        if self.preview_width == 0 || self.preview_height == 0 {
            return Err(DeviceError::InvalidConfig(format!(
                "preview resolution {}x{} is empty",
                self.preview_width, self.preview_height
            )));
        }
        if self.fps == 0 {
            return Err(DeviceError::InvalidConfig("fps must be nonzero".into()));
        }
        if self.queue_capacity == 0 {
            return Err(DeviceError::InvalidConfig(
                "queue capacity must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

/// Upstream producer of paired color frames and inference outputs
///
/// Implementations stand in for the camera device and its on-board depth
/// network. `produce` is called once per cycle from the capture thread.
pub trait FrameProducer: Send + 'static {
    fn produce(&mut self) -> Result<(ColorFrame, InferencePacket), DeviceError>;
}

/// Host-side model deriving a grayscale frame from a color frame
///
/// The model itself is opaque; only the per-frame inference call is
/// visible to this crate.
pub trait MaskModel {
    fn infer(&self, frame: &ColorFrame) -> Result<GrayImage, DeviceError>;
}

/// Receiving end of a device output stream
pub struct OutputQueue<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T> OutputQueue<T> {
    fn new(receiver: mpsc::Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Option<T> {
        match self.receiver.try_next() {
            Ok(Some(item)) => Some(item),
            _ => None,
        }
    }

    /// Bounded wait for the next item.
    ///
    /// Polls the queue until an item arrives or the timeout elapses,
    /// returning `DeviceError::Timeout` rather than blocking forever.
    /// A closed queue (producer gone) reports `Disconnected`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<T, DeviceError> {
        let start = Instant::now();
        loop {
            match self.receiver.try_next() {
                Ok(Some(item)) => return Ok(item),
                Ok(None) => return Err(DeviceError::Disconnected),
                Err(_) => {
                    if start.elapsed() >= timeout {
                        return Err(DeviceError::Timeout);
                    }
                    std::thread::sleep(Duration::from_millis(capture::FRAME_POLL_INTERVAL_MS));
                }
            }
        }
    }
}

/// Scoped handle to a running device pipeline
///
/// Opening a device starts the capture thread; dropping the handle (or
/// calling [`Device::close`]) stops and joins it, releasing the pipeline
/// on every exit path.
pub struct Device {
    controller: CaptureLoopController,
    /// Preview frame stream
    pub color: OutputQueue<ColorFrame>,
    /// Inference output stream
    pub inference: OutputQueue<InferencePacket>,
}

impl Device {
    /// Assign the pipeline configuration to a producer and start it
    pub fn open<P: FrameProducer>(config: &DeviceConfig, mut producer: P) -> Result<Self, DeviceError> {
        config.validate()?;

        info!(
            width = config.preview_width,
            height = config.preview_height,
            fps = config.fps,
            "Opening device"
        );

        let (mut color_tx, color_rx) = mpsc::channel(config.queue_capacity);
        let (mut inference_tx, inference_rx) = mpsc::channel(config.queue_capacity);
        let frame_interval = Duration::from_secs_f64(1.0 / config.fps as f64);

        let controller = CaptureLoopController::start("device-capture", move || {
            let cycle_start = Instant::now();

            let (frame, packet) = match producer.produce() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "Producer failed, stopping capture");
                    return LoopAction::Stop;
                }
            };

            if push(&mut color_tx, frame) == LoopAction::Stop {
                return LoopAction::Stop;
            }
            if push(&mut inference_tx, packet) == LoopAction::Stop {
                return LoopAction::Stop;
            }

            // Pace the loop to the configured framerate
            let elapsed = cycle_start.elapsed();
            if elapsed < frame_interval {
                std::thread::sleep(frame_interval - elapsed);
            }
            LoopAction::Continue
        });

        Ok(Self {
            controller,
            color: OutputQueue::new(color_rx),
            inference: OutputQueue::new(inference_rx),
        })
    }

    /// Check whether the capture thread is still alive
    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Stop the capture thread and release the pipeline
    ///
    /// Dropping the handle has the same effect; `close` makes the release
    /// point explicit.
    pub fn close(mut self) {
        self.controller.stop();
    }
}

/// Offer an item to a bounded output queue.
///
/// A full queue drops the new item, matching the device's non-blocking
/// outputs; a disconnected queue means the consumer is gone.
fn push<T>(sender: &mut mpsc::Sender<T>, item: T) -> LoopAction {
    match sender.try_send(item) {
        Ok(()) => LoopAction::Continue,
        Err(e) if e.is_full() => {
            debug!("Output queue full, dropping frame");
            LoopAction::Continue
        }
        Err(_) => LoopAction::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct CountingProducer {
        width: u32,
        height: u32,
    }

    impl FrameProducer for CountingProducer {
        fn produce(&mut self) -> Result<(ColorFrame, InferencePacket), DeviceError> {
            let frame = ColorFrame {
                width: self.width,
                height: self.height,
                data: Arc::from(
                    vec![0u8; ColorFrame::expected_len(self.width, self.height)].into_boxed_slice(),
                ),
                captured_at: Instant::now(),
            };
            let packet = InferencePacket {
                data: Arc::from(
                    vec![0u8; (self.width * self.height * 2) as usize].into_boxed_slice(),
                ),
                captured_at: Instant::now(),
            };
            Ok((frame, packet))
        }
    }

    #[test]
    fn test_open_delivers_paired_outputs() {
        let config = DeviceConfig {
            preview_width: 8,
            preview_height: 8,
            fps: 200,
            ..DeviceConfig::default()
        };
        let mut device = Device::open(&config, CountingProducer {
            width: 8,
            height: 8,
        })
        .unwrap();

        let frame = device.color.recv_timeout(Duration::from_secs(2)).unwrap();
        let packet = device
            .inference
            .recv_timeout(Duration::from_secs(2))
            .unwrap();
        assert_eq!(frame.width, 8);
        assert_eq!(packet.len_values(), 64);

        device.close();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DeviceConfig {
            fps: 0,
            ..DeviceConfig::default()
        };
        assert!(Device::open(&config, CountingProducer { width: 8, height: 8 }).is_err());
    }

    #[test]
    fn test_recv_timeout_reports_timeout() {
        struct SlowProducer {
            inner: CountingProducer,
        }
        impl FrameProducer for SlowProducer {
            fn produce(&mut self) -> Result<(ColorFrame, InferencePacket), DeviceError> {
                std::thread::sleep(Duration::from_millis(200));
                self.inner.produce()
            }
        }

        let config = DeviceConfig {
            preview_width: 8,
            preview_height: 8,
            ..DeviceConfig::default()
        };
        let mut device = Device::open(&config, SlowProducer {
            inner: CountingProducer {
                width: 8,
                height: 8,
            },
        })
        .unwrap();
        // First frame arrives well after this bounded wait elapses
        let result = device.color.recv_timeout(Duration::from_millis(50));
        assert!(matches!(result, Err(DeviceError::Timeout)));
        device.close();
    }
}
