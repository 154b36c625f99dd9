// SPDX-License-Identifier: MPL-2.0

//! depthview - depth-mask visualization for depth-sensing cameras
//!
//! This library consumes color frames and raw depth-inference output from
//! a device pipeline, composites them into a three-panel debug frame, and
//! renders the result in the terminal.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`compose`]: The depth-mask compositing pipeline
//! - [`device`]: Device configuration, scoped handle, and output queues
//! - [`viewer`]: Terminal rendering of composite frames
//! - [`config`]: User configuration handling
//! - [`constants`]: Application-wide defaults

pub mod compose;
pub mod config;
pub mod constants;
pub mod device;
pub mod errors;
pub mod viewer;

// Re-export commonly used types
pub use compose::{CompositeFrame, Compositor, DepthMap, Palette};
pub use config::Config;
pub use device::{Device, DeviceConfig, FrameProducer, MaskModel};
pub use errors::{AppError, AppResult};
