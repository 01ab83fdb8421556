//! Immediate-mode drawing surface and its recording implementation.
//!
//! Sketches talk to a [`Canvas`]; the host hands them a [`DisplayList`] which
//! folds the transform stack into one model matrix per ellipse so the GPU side
//! only needs a unit disc mesh and per-instance data.

use glam::{Mat4, Vec3};

use crate::palette::Rgba;

/// Smallest segment count that still encloses an area.
pub const MIN_ELLIPSE_SEGMENTS: u32 = 3;

/// Drawing primitives a sketch may use.
pub trait Canvas {
    /// Clears the frame to `color`.
    fn background(&mut self, color: Rgba);
    /// Sets the fill used by subsequent shapes.
    fn fill(&mut self, color: Rgba);
    /// Saves the current transform.
    fn push(&mut self);
    /// Restores the most recently saved transform.
    fn pop(&mut self);
    fn translate(&mut self, offset: Vec3);
    fn rotate_x(&mut self, angle: f32);
    fn rotate_y(&mut self, angle: f32);
    /// Filled ellipse centred at `(x, y)` in the current XY plane,
    /// approximated with `segments` edges.
    fn ellipse(&mut self, x: f32, y: f32, width: f32, height: f32, segments: u32);
}

/// One recorded ellipse. `transform` maps the unit-diameter disc centred on
/// the origin to its final position in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawEllipse {
    pub transform: Mat4,
    pub color: Rgba,
    pub segments: u32,
}

impl DrawEllipse {
    /// World-space centre of the ellipse.
    pub fn center(&self) -> Vec3 {
        self.transform.transform_point3(Vec3::ZERO)
    }
}

/// Canvas that records a frame for later submission.
#[derive(Debug, Clone)]
pub struct DisplayList {
    clear: Option<Rgba>,
    fill: Rgba,
    current: Mat4,
    stack: Vec<Mat4>,
    commands: Vec<DrawEllipse>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            clear: None,
            fill: Rgba::WHITE,
            current: Mat4::IDENTITY,
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets per-frame state while keeping allocations.
    pub fn begin_frame(&mut self) {
        self.clear = None;
        self.fill = Rgba::WHITE;
        self.current = Mat4::IDENTITY;
        self.stack.clear();
        self.commands.clear();
    }

    /// Colour requested by the last `background` call this frame.
    pub fn clear_color(&self) -> Option<Rgba> {
        self.clear
    }

    pub fn commands(&self) -> &[DrawEllipse] {
        &self.commands
    }

    pub fn transform(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Canvas for DisplayList {
    fn background(&mut self, color: Rgba) {
        self.clear = Some(color);
    }

    fn fill(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn push(&mut self) {
        self.stack.push(self.current);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(saved) => self.current = saved,
            None => tracing::warn!("pop called without a matching push; ignoring"),
        }
    }

    fn translate(&mut self, offset: Vec3) {
        self.current *= Mat4::from_translation(offset);
    }

    fn rotate_x(&mut self, angle: f32) {
        self.current *= Mat4::from_rotation_x(angle);
    }

    fn rotate_y(&mut self, angle: f32) {
        self.current *= Mat4::from_rotation_y(angle);
    }

    fn ellipse(&mut self, x: f32, y: f32, width: f32, height: f32, segments: u32) {
        let transform = self.current
            * Mat4::from_translation(Vec3::new(x, y, 0.0))
            * Mat4::from_scale(Vec3::new(width, height, 1.0));
        self.commands.push(DrawEllipse {
            transform,
            color: self.fill,
            segments: segments.max(MIN_ELLIPSE_SEGMENTS),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn push_pop_restores_transform() {
        let mut list = DisplayList::new();
        list.translate(Vec3::new(1.0, 2.0, 3.0));
        let saved = list.transform();
        list.push();
        list.rotate_y(0.3);
        list.translate(Vec3::X * 10.0);
        assert_eq!(list.depth(), 1);
        list.pop();
        assert_eq!(list.transform(), saved);
        assert_eq!(list.depth(), 0);
    }

    #[test]
    fn unmatched_pop_keeps_transform() {
        let mut list = DisplayList::new();
        list.translate(Vec3::Y);
        let before = list.transform();
        list.pop();
        assert_eq!(list.transform(), before);
    }

    #[test]
    fn ellipse_records_scaled_disc_at_translation() {
        let mut list = DisplayList::new();
        list.fill(Rgba::rgb(1, 2, 3));
        list.translate(Vec3::new(5.0, 0.0, -2.0));
        list.ellipse(0.0, 0.0, 40.0, 20.0, 50);

        let command = list.commands()[0];
        assert_eq!(command.color, Rgba::rgb(1, 2, 3));
        assert_eq!(command.segments, 50);
        assert!(approx(command.center(), Vec3::new(5.0, 0.0, -2.0)));
        let rim = command.transform.transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!(approx(rim, Vec3::new(25.0, 0.0, -2.0)));
        let top = command.transform.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!(approx(top, Vec3::new(5.0, 10.0, -2.0)));
    }

    #[test]
    fn rotation_applies_in_local_space() {
        let mut list = DisplayList::new();
        list.rotate_y(FRAC_PI_2);
        list.translate(Vec3::X);
        list.ellipse(0.0, 0.0, 1.0, 1.0, 8);
        // A quarter turn about Y maps +X onto -Z.
        assert!(approx(list.commands()[0].center(), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn begin_frame_resets_state() {
        let mut list = DisplayList::new();
        list.background(Rgba::WHITE);
        list.push();
        list.rotate_x(1.0);
        list.ellipse(0.0, 0.0, 1.0, 1.0, 1);
        assert_eq!(list.commands()[0].segments, MIN_ELLIPSE_SEGMENTS);

        list.begin_frame();
        assert!(list.commands().is_empty());
        assert!(list.clear_color().is_none());
        assert_eq!(list.transform(), Mat4::IDENTITY);
        assert_eq!(list.depth(), 0);
    }
}
