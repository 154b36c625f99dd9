// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based composite viewer
//!
//! Renders the [depth | mask | masked] composite to the terminal using
//! Unicode half-block characters for improved vertical resolution.

use crate::compose::{CompositeFrame, Compositor, DepthMap};
use crate::config::Config;
use crate::constants::viewer::FPS_REPORT_INTERVAL;
use crate::device::synthetic::{LumaMaskModel, SyntheticProducer};
use crate::device::{Device, MaskModel};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbImage;
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Run the terminal composite viewer
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let producer = SyntheticProducer::new(config.preview_width, config.preview_height);
    let mut device = Device::open(&config.device_config(), producer)?;
    let model = LumaMaskModel;
    let compositor = Compositor::new(config.mask_threshold);
    let read_timeout = config.read_timeout();

    info!(
        width = config.preview_width,
        height = config.preview_height,
        "Viewer started"
    );

    let mut composite_widget = CompositeWidget::new();
    let mut status_message = build_status_message(0.0);

    // Throughput figure refreshed once per report interval
    let mut fps_window_start = Instant::now();
    let mut fps_counter = 0u32;

    loop {
        // One color frame and one inference output per cycle, bounded wait
        let frame = device.color.recv_timeout(read_timeout)?;
        let packet = device.inference.recv_timeout(read_timeout)?;

        let depth = DepthMap::from_values(frame.width, frame.height, packet.values())?;
        let model_output = model.infer(&frame)?;
        let composite = compositor.compose(&depth, &model_output)?;
        composite_widget.update(composite);

        fps_counter += 1;
        if fps_window_start.elapsed() >= FPS_REPORT_INTERVAL {
            let fps = fps_counter as f64 / fps_window_start.elapsed().as_secs_f64();
            status_message = build_status_message(fps);
            fps_counter = 0;
            fps_window_start = Instant::now();
        }

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let composite_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            f.render_widget(&composite_widget, composite_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            let status = StatusBar {
                message: &status_message,
            };
            f.render_widget(status, status_area);
        })?;

        // Handle input between cycles
        if event::poll(Duration::ZERO)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            // 'p' to save a snapshot of the current composite
            if key.code == KeyCode::Char('p')
                && let Some(frame) = &composite_widget.frame
            {
                match save_snapshot(&frame.image) {
                    Ok(path) => {
                        status_message = format!("Saved: {}", path.display());
                    }
                    Err(e) => {
                        error!("Failed to save snapshot: {}", e);
                        status_message = format!("Error: {}", e);
                    }
                }
            }

            // 'q' quits
            if key.code == KeyCode::Char('q') {
                break;
            }
        }
    }

    device.close();
    Ok(())
}

fn build_status_message(fps: f64) -> String {
    format!("'p' snapshot | 'q' quit | {:.1} fps", fps)
}

/// Save the current composite as a PNG
fn save_snapshot(image: &RgbImage) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = snapshot_directory();
    std::fs::create_dir_all(&dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("DEPTH_{}.png", timestamp);
    let filepath = dir.join(&filename);

    image.save(&filepath)?;
    info!(path = %filepath.display(), "Snapshot saved");

    Ok(filepath)
}

/// Default folder for saved composites
pub fn snapshot_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("depthview")
}

/// Widget that renders a composite frame using half-block characters
struct CompositeWidget {
    frame: Option<CompositeFrame>,
}

impl CompositeWidget {
    fn new() -> Self {
        Self { frame: None }
    }

    fn update(&mut self, frame: CompositeFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &CompositeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for device...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let image = &frame.image;
        if image.width() == 0 || image.height() == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = image.width() as f64 / image.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Scale factors
        let x_scale = image.width() as f64 / display_width as f64;
        let y_scale = image.height() as f64 / (display_height * 2) as f64;

        // Render using half-block characters
        // Each terminal cell represents 2 vertical pixels:
        // - Upper half (▀) colored with fg
        // - Lower half colored with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(image, src_x, src_y_top);
                let bottom_color = sample_pixel(image, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

fn sample_pixel(image: &RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let pixel = image.get_pixel(x, y);
    Color::Rgb(pixel[0], pixel[1], pixel[2])
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Render text
        let text = if self.message.len() > area.width as usize {
            &self.message[..area.width as usize]
        } else {
            self.message
        };

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
