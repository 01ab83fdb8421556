use std::f32::consts::TAU;

use sketch::canvas::MIN_ELLIPSE_SEGMENTS;
use wgpu::util::DeviceExt;

use super::uniforms::EllipseVertex;

/// Triangle fan around the origin, flattened to a list, with diameter 1.
///
/// The instance model matrix scales it to the requested width and height.
pub(crate) fn disc_vertices(segments: u32) -> Vec<EllipseVertex> {
    let segments = segments.max(MIN_ELLIPSE_SEGMENTS);
    let rim = |step: u32| {
        let theta = step as f32 / segments as f32 * TAU;
        EllipseVertex {
            position: [0.5 * theta.cos(), 0.5 * theta.sin()],
        }
    };

    let mut vertices = Vec::with_capacity(segments as usize * 3);
    for step in 0..segments {
        vertices.push(EllipseVertex {
            position: [0.0, 0.0],
        });
        vertices.push(rim(step));
        vertices.push(rim((step + 1) % segments));
    }
    vertices
}

pub(crate) struct EllipseMesh {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl EllipseMesh {
    pub fn new(device: &wgpu::Device, segments: u32) -> Self {
        let vertices = disc_vertices(segments);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ellipse mesh"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        tracing::debug!(segments, vertices = vertices.len(), "built ellipse mesh");
        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }
}
