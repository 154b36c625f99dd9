// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for running the pipeline without the terminal viewer
//!
//! This module provides command-line functionality for:
//! - Headless runs reporting throughput
//! - Capturing a single composite frame to disk

use chrono::Local;
use depthview::compose::{Compositor, DepthMap};
use depthview::config::Config;
use depthview::device::synthetic::{LumaMaskModel, SyntheticProducer};
use depthview::device::{Device, MaskModel};
use depthview::viewer::snapshot_directory;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Run the pipeline without a display, reporting throughput once per second
pub fn run_headless(
    duration_secs: u64,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let producer = SyntheticProducer::new(config.preview_width, config.preview_height);
    let mut device = Device::open(&config.device_config(), producer)?;
    let model = LumaMaskModel;
    let compositor = Compositor::new(config.mask_threshold);
    let read_timeout = config.read_timeout();

    println!(
        "Running headless: {}x{} @ {}fps target, {}s",
        config.preview_width, config.preview_height, config.fps, duration_secs
    );
    println!("Press Ctrl+C to stop early");

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let target_duration = Duration::from_secs(duration_secs);
    let mut window_start = Instant::now();
    let mut counter = 0u32;

    while start.elapsed() < target_duration {
        if stop_flag.load(Ordering::SeqCst) {
            println!("Stopping early...");
            break;
        }

        let frame = device.color.recv_timeout(read_timeout)?;
        let packet = device.inference.recv_timeout(read_timeout)?;

        let depth = DepthMap::from_values(frame.width, frame.height, packet.values())?;
        let model_output = model.infer(&frame)?;
        compositor.compose(&depth, &model_output)?;
        counter += 1;

        if window_start.elapsed() >= Duration::from_secs(1) {
            let fps = counter as f64 / window_start.elapsed().as_secs_f64();
            println!("{:.1}", fps);
            counter = 0;
            window_start = Instant::now();
        }
    }

    device.close();
    Ok(())
}

/// Capture one composite frame and save it to disk
pub fn snapshot(
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let producer = SyntheticProducer::new(config.preview_width, config.preview_height);
    let mut device = Device::open(&config.device_config(), producer)?;
    let model = LumaMaskModel;
    let compositor = Compositor::new(config.mask_threshold);

    println!("Capturing...");
    let frame = device.color.recv_timeout(config.read_timeout())?;
    let packet = device.inference.recv_timeout(config.read_timeout())?;
    device.close();

    let depth = DepthMap::from_values(frame.width, frame.height, packet.values())?;
    let model_output = model.infer(&frame)?;
    let composite = compositor.compose(&depth, &model_output)?;

    // Determine output path
    let output_path = if let Some(path) = output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        path
    } else {
        let dir = snapshot_directory();
        std::fs::create_dir_all(&dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("DEPTH_{}.png", timestamp))
    };

    composite.image.save(&output_path)?;
    println!("Snapshot saved: {}", output_path.display());

    Ok(())
}
