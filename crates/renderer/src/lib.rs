//! Windowed host for [`sketch::Sketch`] implementations.
//!
//! The renderer owns the frame clock and the GPU; the sketch only records
//! drawing commands. The flow per frame is:
//!
//! ```text
//!   CLI / orbitload
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                                              │
//!                      Sketch::draw ◀──────────┤ FrameInfo
//!                           │ DisplayList      │
//!                           └─────────────────▶└─▶ GpuState::render ─▶ present
//! ```
//!
//! `Sketch::setup` runs once the surface exists and again whenever it is
//! resized; its requested frame rate paces the loop unless the config sets
//! `target_fps`.

mod compile;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;
use sketch::Sketch;

pub use runtime::{FrameCounter, FrameScheduler, FrameStats};
pub use types::{AdapterProfile, Antialiasing, GpuPowerPreference, RendererConfig, SurfaceAlpha};

/// Entry point for hosting a sketch in a window.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Blocks until the window closes or the configured run time elapses.
    pub fn run<S>(self, sketch: S) -> Result<()>
    where
        S: Sketch + 'static,
    {
        tracing::debug!(
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            antialiasing = ?self.config.antialiasing,
            surface_alpha = ?self.config.surface_alpha,
            "starting renderer"
        );
        window::run(self.config, Box::new(sketch))
    }
}
