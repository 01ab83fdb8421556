//! Rotating-ellipse loading animation.
//!
//! Sixty-four discs ride a circle in the XZ plane. Each one is offset by
//! [`FRAME_SPAN`] frames from its predecessor along an eased 512-frame cycle,
//! so they bunch up and spread out as they orbit. The scene is tilted 45°
//! about X and then Y, and every disc is turned to face along its orbit.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec3;
use serde::Serialize;

use crate::canvas::Canvas;
use crate::easing::{ratio_eased, CYCLES};
use crate::lifecycle::{FrameInfo, SetupRequest, Sketch, Viewport};
use crate::palette::{color_for, Rgba};
use crate::projection::Projection;

pub const NUM_ELLIPSES: usize = 64;
/// Phase offset between neighbouring ellipses, in frames.
pub const FRAME_SPAN: u64 = CYCLES / NUM_ELLIPSES as u64;
pub const FRAME_RATE: f32 = 90.0;
/// Edge count used to approximate each disc.
pub const ELLIPSE_DETAIL: u32 = 50;
/// Projection extents are the viewport divided by this factor.
pub const ZOOM_OUT: f32 = 1.2;

const ORBIT_INSET: f32 = 0.42;
const RADIUS_SCALE: f32 = 0.3;
const RADIUS_BASE: f32 = 0.6;
const RADIUS_SWING: f32 = 0.4;
const CAMERA_TILT: f32 = -FRAC_PI_4;
const BACKGROUND: Rgba = Rgba::WHITE.with_alpha(0);

/// Static per-ellipse parameters computed at setup.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EllipseParams {
    /// Even spacing around the circle, `index / 64 * 2π`.
    pub base_angle: f32,
    /// Disc diameter; the name follows the drawing call it feeds.
    pub radius: f32,
}

impl EllipseParams {
    pub fn for_index(index: usize, width: f32) -> Self {
        let base_angle = index as f32 / NUM_ELLIPSES as f32 * TAU;
        let radius = width * RADIUS_SCALE * (RADIUS_BASE + RADIUS_SWING * base_angle.sin());
        Self { base_angle, radius }
    }
}

/// Radius of the shared orbit, `0.29 * width`.
pub fn orbit_radius(width: f32) -> f32 {
    0.5 * (width - width * ORBIT_INSET)
}

/// Where one ellipse sits on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub index: usize,
    pub ratio: f32,
    pub angle: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub diameter: f32,
    pub color: Rgba,
}

impl Placement {
    pub fn compute(frame: u64, index: usize, orbit_radius: f32, params: EllipseParams) -> Self {
        // Wrapping keeps the phase exact: 2^64 is a multiple of the cycle length.
        let count = frame.wrapping_add(index as u64 * FRAME_SPAN);
        let ratio = ratio_eased(count);
        let angle = ratio * TAU;
        Self {
            index,
            ratio,
            angle,
            x: orbit_radius * angle.cos(),
            y: 0.0,
            z: orbit_radius * angle.sin(),
            diameter: params.radius,
            color: color_for(index),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// The loading animation as a [`Sketch`].
#[derive(Debug, Clone)]
pub struct LoadingSpinner {
    ellipses: [EllipseParams; NUM_ELLIPSES],
}

impl Default for LoadingSpinner {
    fn default() -> Self {
        Self {
            ellipses: [EllipseParams::default(); NUM_ELLIPSES],
        }
    }
}

impl LoadingSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ellipses(&self) -> &[EllipseParams; NUM_ELLIPSES] {
        &self.ellipses
    }

    /// Placements for every ellipse on `frame`, in draw order.
    pub fn placements(&self, frame: &FrameInfo) -> Vec<Placement> {
        let orbit = orbit_radius(frame.viewport.width_f32());
        self.ellipses
            .iter()
            .enumerate()
            .map(|(index, params)| Placement::compute(frame.count, index, orbit, *params))
            .collect()
    }
}

impl Sketch for LoadingSpinner {
    fn setup(&mut self, viewport: Viewport) -> SetupRequest {
        let width = viewport.width_f32();
        self.ellipses = std::array::from_fn(|index| EllipseParams::for_index(index, width));
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            ellipses = NUM_ELLIPSES,
            "loading spinner set up"
        );
        SetupRequest {
            frame_rate: FRAME_RATE,
            projection: Projection::zoomed_out(viewport, ZOOM_OUT),
        }
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo) {
        canvas.background(BACKGROUND);
        canvas.rotate_x(CAMERA_TILT);
        canvas.rotate_y(CAMERA_TILT);

        for placement in self.placements(frame) {
            canvas.fill(placement.color);
            canvas.push();
            canvas.translate(placement.position());
            canvas.rotate_y(-placement.angle);
            canvas.ellipse(
                0.0,
                0.0,
                placement.diameter,
                placement.diameter,
                ELLIPSE_DETAIL,
            );
            canvas.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use glam::Mat4;

    use super::*;
    use crate::canvas::DisplayList;

    fn spinner(width: u32, height: u32) -> (LoadingSpinner, Viewport) {
        let viewport = Viewport::new(width, height);
        let mut spinner = LoadingSpinner::new();
        spinner.setup(viewport);
        (spinner, viewport)
    }

    #[test]
    fn setup_requests_rate_and_projection() {
        let viewport = Viewport::new(1200, 900);
        let request = LoadingSpinner::new().setup(viewport);
        assert_eq!(request.frame_rate, 90.0);
        assert_eq!(request.projection, Projection::zoomed_out(viewport, 1.2));
    }

    #[test]
    fn setup_spaces_angles_evenly() {
        let (spinner, _) = spinner(1000, 1000);
        let ellipses = spinner.ellipses();
        assert_eq!(ellipses.len(), 64);
        assert_eq!(ellipses[0].base_angle, 0.0);
        assert!((ellipses[16].base_angle - PI / 2.0).abs() < 1e-5);
        assert!((ellipses[32].base_angle - PI).abs() < 1e-5);
    }

    #[test]
    fn first_radius_matches_reference_width() {
        let (spinner, _) = spinner(1000, 800);
        assert!((spinner.ellipses()[0].radius - 180.0).abs() < 1e-3);
        // sin peaks at a quarter turn.
        assert!((spinner.ellipses()[16].radius - 300.0).abs() < 1e-3);
    }

    #[test]
    fn radii_stay_within_bounds() {
        for width in [1, 320, 1000, 3840] {
            let (spinner, _) = spinner(width, 600);
            let width = width as f32;
            for params in spinner.ellipses() {
                assert!(params.radius >= 0.18 * width - 1e-3);
                assert!(params.radius <= 0.42 * width + 1e-3);
            }
        }
    }

    #[test]
    fn orbit_radius_is_fraction_of_width() {
        assert!((orbit_radius(1000.0) - 290.0).abs() < 1e-3);
    }

    #[test]
    fn frame_zero_starts_on_positive_x() {
        let (spinner, viewport) = spinner(1000, 1000);
        let placements = spinner.placements(&FrameInfo::new(0, viewport));
        let first = placements[0];
        assert_eq!(first.ratio, 0.0);
        assert!((first.x - 290.0).abs() < 1e-3);
        assert!(first.z.abs() < 1e-3);
        assert_eq!(first.y, 0.0);
    }

    #[test]
    fn half_cycle_reaches_negative_x() {
        let (spinner, viewport) = spinner(1000, 1000);
        let first = spinner.placements(&FrameInfo::new(256, viewport))[0];
        assert!((first.ratio - 0.5).abs() < 1e-6);
        assert!((first.angle - PI).abs() < 1e-5);
        assert!((first.x + 290.0).abs() < 1e-3);
        assert!(first.z.abs() < 1e-2);
    }

    #[test]
    fn neighbours_are_offset_by_frame_span() {
        let (spinner, viewport) = spinner(800, 600);
        let now = spinner.placements(&FrameInfo::new(100, viewport));
        let later = spinner.placements(&FrameInfo::new(100 + FRAME_SPAN, viewport));
        for index in 0..NUM_ELLIPSES - 1 {
            assert_eq!(later[index].ratio, now[index + 1].ratio);
        }
    }

    #[test]
    fn ratios_stay_in_range_for_every_ellipse() {
        let (spinner, viewport) = spinner(800, 600);
        for count in (0..2048).step_by(7) {
            for placement in spinner.placements(&FrameInfo::new(count, viewport)) {
                assert!((0.0..1.0).contains(&placement.ratio));
            }
        }
    }

    #[test]
    fn wraps_at_counter_limit_without_phase_jump() {
        let (spinner, viewport) = spinner(800, 600);
        let near_end = spinner.placements(&FrameInfo::new(u64::MAX, viewport));
        let equivalent = spinner.placements(&FrameInfo::new(511, viewport));
        assert_eq!(near_end, equivalent);
    }

    #[test]
    fn draw_records_one_disc_per_ellipse_in_order() {
        let (mut spinner, viewport) = spinner(1000, 1000);
        let mut list = DisplayList::new();
        list.begin_frame();
        spinner.draw(&mut list, &FrameInfo::new(0, viewport));

        assert_eq!(list.clear_color(), Some(Rgba::WHITE.with_alpha(0)));
        assert_eq!(list.commands().len(), NUM_ELLIPSES);
        assert_eq!(list.depth(), 0);
        for (index, command) in list.commands().iter().enumerate() {
            assert_eq!(command.color, color_for(index));
            assert_eq!(command.segments, ELLIPSE_DETAIL);
        }

        let tilt = Mat4::from_rotation_x(CAMERA_TILT) * Mat4::from_rotation_y(CAMERA_TILT);
        let expected = tilt.transform_point3(Vec3::new(290.0, 0.0, 0.0));
        assert!((list.commands()[0].center() - expected).length() < 1e-2);
    }
}
