use glam::Mat4;

use crate::lifecycle::Viewport;

/// Depth range as a multiple of the larger viewport side; wide enough that
/// tilted geometry around the origin never reaches the clip planes.
const DEPTH_EXTENT_FACTOR: f32 = 2.0;

/// Camera projection requested by a sketch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Orthographic box in world units. Bounds are given as for a y-up box;
    /// [`Projection::view_projection`] flips y so positive world y lands
    /// towards the bottom of the screen.
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
}

impl Projection {
    /// Orthographic box spanning `±width/zoom` by `±height/zoom`.
    pub fn zoomed_out(viewport: Viewport, zoom: f32) -> Self {
        let half_w = viewport.width_f32() / zoom;
        let half_h = viewport.height_f32() / zoom;
        Self::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
        }
    }

    /// Orthographic box matching the viewport one world unit per pixel.
    pub fn pixel_exact(viewport: Viewport) -> Self {
        Self::zoomed_out(viewport, 2.0)
    }

    /// Clip-space matrix with y pointing down the screen and depth in `[0, 1]`.
    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        match *self {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
            } => {
                let depth = viewport.width.max(viewport.height).max(1) as f32
                    * DEPTH_EXTENT_FACTOR;
                // Vertical bounds swapped: world y grows down the screen.
                Mat4::orthographic_rh(left, right, top, bottom, -depth, depth)
            }
        }
    }
}
