//! Animation core for orbitload.
//!
//! Everything in this crate is pure CPU math so it can be exercised without a
//! window or GPU. The renderer crate plays the role of the host environment:
//!
//! ```text
//!   host (renderer)                         sketch
//!   ───────────────                         ──────
//!   window created ──▶ Sketch::setup(viewport) ──▶ SetupRequest (fps, projection)
//!   every frame    ──▶ DisplayList::begin_frame
//!                  ──▶ Sketch::draw(&mut DisplayList, FrameInfo)
//!                  ◀── recorded DrawEllipse commands ──▶ GPU instances
//! ```
//!
//! [`LoadingSpinner`] is the only sketch shipped today: 64 ellipses orbiting a
//! tilted circle on an eased 512-frame cycle.

pub mod canvas;
pub mod easing;
pub mod lifecycle;
pub mod palette;
pub mod projection;
pub mod spinner;

pub use canvas::{Canvas, DisplayList, DrawEllipse};
pub use lifecycle::{FrameInfo, SetupRequest, Sketch, Viewport};
pub use palette::{Rgba, PALETTE};
pub use projection::Projection;
pub use spinner::{EllipseParams, LoadingSpinner, Placement};
