//! PNG export of the visible map.
//!
//! The export re-rasterizes the current scene at a user-chosen scale and
//! writes it to the configured path on a worker thread.

use crate::render::{output_size, RasterError, SceneGeometry, SceneRasterizer, SceneSnapshot};
use eframe::egui;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use thiserror::Error;
use web_time::Instant;

pub const MIN_SCALE_PERCENT: u32 = 25;
pub const MAX_SCALE_PERCENT: u32 = 300;
pub const DEFAULT_SCALE_PERCENT: u32 = 100;

/// Interprets the scale field. Blank or non-numeric input falls back to the
/// default; numbers are rounded and clamped to the supported range.
pub fn resolve_scale(input: &str) -> u32 {
    let input = input.trim();
    if input.is_empty() {
        return DEFAULT_SCALE_PERCENT;
    }
    match input.parse::<f64>() {
        Ok(value) if !value.is_nan() => value
            .round()
            .clamp(MIN_SCALE_PERCENT as f64, MAX_SCALE_PERCENT as f64)
            as u32,
        _ => {
            log::debug!("Invalid export scale {:?}; using default", input);
            DEFAULT_SCALE_PERCENT
        }
    }
}

/// Pixel scale factor for a percentage.
pub fn scale_factor(scale_percent: u32) -> f32 {
    scale_percent as f32 / 100.0
}

/// What to export: the scene as it looked when the button was pressed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub scale_percent: u32,
    pub snapshot: SceneSnapshot,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export worker stopped without a result")]
    WorkerStopped,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub scale_percent: u32,
    pub render_time_ms: f64,
}

/// Encodes a premultiplied pixmap as PNG, keeping transparency.
pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, ExportError> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let image = RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or(
        RasterError::EmptyCanvas {
            width: pixmap.width(),
            height: pixmap.height(),
        },
    )?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Renders `request` and writes the PNG to `path`.
pub fn export_png(
    geometry: &SceneGeometry,
    request: &ExportRequest,
    path: &Path,
) -> Result<ExportOutcome, ExportError> {
    let start = Instant::now();
    let scale = scale_factor(request.scale_percent);
    let (width, height) = output_size(geometry, scale);
    log::debug!(
        "Exporting {}x{} at {}% to {}",
        width,
        height,
        request.scale_percent,
        path.display()
    );

    let pixmap = SceneRasterizer::new().render(geometry, &request.snapshot, scale)?;
    let bytes = encode_png(&pixmap)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = ExportOutcome {
        path: path.to_path_buf(),
        width,
        height,
        scale_percent: request.scale_percent,
        render_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    log::info!(
        "Exported {}x{} map to {} in {:.0}ms",
        outcome.width,
        outcome.height,
        outcome.path.display(),
        outcome.render_time_ms
    );
    Ok(outcome)
}

type ExportResult = Result<ExportOutcome, ExportError>;

/// Channel-based background exporter. One export runs at a time, each with
/// its own channel so a worker that dies without sending still ends it.
#[derive(Default)]
pub struct ExportChannel {
    receiver: Option<Receiver<ExportResult>>,
}

impl ExportChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    /// Starts an export on a worker thread. Returns false when one is
    /// already running.
    pub fn export(
        &mut self,
        ctx: egui::Context,
        geometry: Arc<SceneGeometry>,
        request: ExportRequest,
        path: PathBuf,
    ) -> bool {
        self.spawn_with(ctx, move || export_png(&geometry, &request, &path))
    }

    fn spawn_with(
        &mut self,
        ctx: egui::Context,
        job: impl FnOnce() -> ExportResult + Send + 'static,
    ) -> bool {
        if self.is_pending() {
            log::warn!("Export already in progress; ignoring request");
            return false;
        }

        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        std::thread::spawn(move || {
            // Repaint even when the job panics so the UI notices
            struct Repaint(egui::Context);
            impl Drop for Repaint {
                fn drop(&mut self) {
                    self.0.request_repaint();
                }
            }
            let _repaint = Repaint(ctx);
            let _ = sender.send(job());
        });
        true
    }

    /// Non-blocking check for a finished export.
    pub fn try_recv(&mut self) -> Option<ExportResult> {
        let result = match self.receiver.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Export worker exited without reporting a result");
                Err(ExportError::WorkerStopped)
            }
        };
        self.receiver = None;
        Some(result)
    }
}
