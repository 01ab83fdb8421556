use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use sketch::{DrawEllipse, Rgba};

use super::context::SurfaceColorSpace;

/// Per-vertex disc position, in units of the ellipse's width/height.
pub(crate) const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x2];

/// Model matrix columns followed by the fill colour.
pub(crate) const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    1 => Float32x4,
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4
];

/// Mirrors the `SceneParams` uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct SceneUniforms {
    pub view_projection: [[f32; 4]; 4],
}

impl SceneUniforms {
    pub fn new(view_projection: Mat4) -> Self {
        Self {
            view_projection: view_projection.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct EllipseVertex {
    pub position: [f32; 2],
}

impl EllipseVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<EllipseVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct EllipseInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl EllipseInstance {
    pub fn from_command(command: &DrawEllipse, color_space: SurfaceColorSpace) -> Self {
        Self {
            model: command.transform.to_cols_array_2d(),
            color: encode_color(command.color, color_space),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<EllipseInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        }
    }
}

/// Consecutive display-list entries that share a disc mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SegmentRun {
    pub segments: u32,
    pub instances: Range<u32>,
}

/// Splits the display list into draw calls without reordering it.
pub(crate) fn segment_runs(commands: &[DrawEllipse]) -> Vec<SegmentRun> {
    let mut runs: Vec<SegmentRun> = Vec::new();
    for (index, command) in commands.iter().enumerate() {
        let index = index as u32;
        match runs.last_mut() {
            Some(run) if run.segments == command.segments => run.instances.end = index + 1,
            _ => runs.push(SegmentRun {
                segments: command.segments,
                instances: index..index + 1,
            }),
        }
    }
    runs
}

/// Palette colours are authored gamma-encoded; sRGB targets expect linear input.
fn encode_color(color: Rgba, color_space: SurfaceColorSpace) -> [f32; 4] {
    match color_space {
        SurfaceColorSpace::Gamma => color.to_f32(),
        SurfaceColorSpace::Linear => color.to_linear_f32(),
    }
}

/// Clear colour for the frame, honouring the surface's alpha compositing.
pub(crate) fn clear_color(
    color: Option<Rgba>,
    alpha_mode: wgpu::CompositeAlphaMode,
    color_space: SurfaceColorSpace,
) -> wgpu::Color {
    let Some(color) = color else {
        return wgpu::Color::TRANSPARENT;
    };
    let [mut r, mut g, mut b, a] = encode_color(color, color_space);
    if alpha_mode == wgpu::CompositeAlphaMode::PreMultiplied {
        r *= a;
        g *= a;
        b *= a;
    }
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn command(segments: u32) -> DrawEllipse {
        DrawEllipse {
            transform: Mat4::IDENTITY,
            color: Rgba::WHITE,
            segments,
        }
    }

    #[test]
    fn runs_follow_display_order() {
        let commands = [command(50), command(50), command(8), command(50)];
        let runs = segment_runs(&commands);
        assert_eq!(
            runs,
            vec![
                SegmentRun {
                    segments: 50,
                    instances: 0..2,
                },
                SegmentRun {
                    segments: 8,
                    instances: 2..3,
                },
                SegmentRun {
                    segments: 50,
                    instances: 3..4,
                },
            ]
        );
        assert!(segment_runs(&[]).is_empty());
    }

    #[test]
    fn instance_carries_columns_and_color() {
        let draw = DrawEllipse {
            transform: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            color: Rgba::rgb(255, 0, 0),
            segments: 50,
        };
        let instance = EllipseInstance::from_command(&draw, SurfaceColorSpace::Gamma);
        assert_eq!(instance.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(instance.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(std::mem::size_of::<EllipseInstance>(), 80);
    }

    #[test]
    fn transparent_clear_is_premultiplied() {
        let background = Some(Rgba::WHITE.with_alpha(0));
        let premultiplied = clear_color(
            background,
            wgpu::CompositeAlphaMode::PreMultiplied,
            SurfaceColorSpace::Gamma,
        );
        assert_eq!(premultiplied, wgpu::Color::TRANSPARENT);

        let opaque = clear_color(
            background,
            wgpu::CompositeAlphaMode::Opaque,
            SurfaceColorSpace::Gamma,
        );
        assert_eq!(opaque.r, 1.0);
        assert_eq!(opaque.a, 0.0);

        assert_eq!(
            clear_color(None, wgpu::CompositeAlphaMode::Opaque, SurfaceColorSpace::Gamma),
            wgpu::Color::TRANSPARENT
        );
    }
}
