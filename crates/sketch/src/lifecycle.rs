use serde::Serialize;

use crate::canvas::Canvas;
use crate::projection::Projection;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f32(&self) -> f32 {
        self.height as f32
    }
}

/// Host-owned state handed to every draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Monotonic frame counter maintained by the host.
    pub count: u64,
    pub viewport: Viewport,
}

impl FrameInfo {
    pub fn new(count: u64, viewport: Viewport) -> Self {
        Self { count, viewport }
    }
}

/// What a sketch asks of the host once setup completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetupRequest {
    /// Preferred frame rate; the host may override it.
    pub frame_rate: f32,
    pub projection: Projection,
}

/// Two-phase lifecycle driven by the host: `setup` once per surface, then
/// `draw` once per frame until the host stops calling it.
pub trait Sketch {
    /// Prepares per-surface state. Called again when the surface is resized.
    fn setup(&mut self, viewport: Viewport) -> SetupRequest;

    /// Records one frame onto the canvas. The host resets the transform
    /// before each call.
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo);
}
