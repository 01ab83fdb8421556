use std::collections::HashMap;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use sketch::{DisplayList, Projection, Viewport};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing, GpuPowerPreference, SurfaceAlpha};

use super::context::GpuContext;
use super::mesh::EllipseMesh;
use super::pipeline::{EllipsePipeline, DEPTH_FORMAT};
use super::uniforms::{clear_color, segment_runs, EllipseInstance, SceneUniforms};

const MIN_INSTANCE_CAPACITY: usize = 64;

/// Instance slots to allocate so growth stays geometric.
fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        return current;
    }
    needed.next_power_of_two().max(MIN_INSTANCE_CAPACITY)
}

/// Attachment texture sized to the surface, optionally multisampled.
struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: EllipsePipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: HashMap<u32, EllipseMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<EllipseInstance>,
    multisample_target: Option<RenderTarget>,
    depth_target: RenderTarget,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        surface_alpha: SurfaceAlpha,
        gpu_power: GpuPowerPreference,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(
            target,
            initial_size,
            antialiasing,
            surface_alpha,
            gpu_power,
        )?;
        let device = &context.device;

        let pipeline = EllipsePipeline::new(device, context.surface_format, context.sample_count);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene uniforms"),
            contents: bytemuck::bytes_of(&SceneUniforms::new(glam::Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let instance_capacity = MIN_INSTANCE_CAPACITY;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);
        let (multisample_target, depth_target) = Self::create_targets(&context);

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: HashMap::new(),
            instance_buffer,
            instance_capacity,
            instances: Vec::new(),
            multisample_target,
            depth_target,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn viewport(&self) -> Viewport {
        Viewport::new(self.context.size.width, self.context.size.height)
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.context.size {
            return;
        }
        self.context.resize(new_size);
        let (multisample_target, depth_target) = Self::create_targets(&self.context);
        self.multisample_target = multisample_target;
        self.depth_target = depth_target;
    }

    pub(crate) fn reconfigure(&self) {
        self.context.reconfigure();
    }

    /// Uploads the recorded frame, draws it in display order, and presents.
    pub(crate) fn render(
        &mut self,
        list: &DisplayList,
        projection: &Projection,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_projection = projection.view_projection(self.viewport());
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&SceneUniforms::new(view_projection)),
        );
        self.upload_instances(list);

        let runs = segment_runs(list.commands());
        for run in &runs {
            if !self.meshes.contains_key(&run.segments) {
                let mesh = EllipseMesh::new(&self.context.device, run.segments);
                self.meshes.insert(run.segments, mesh);
            }
        }

        // Frames that skip `background` still start from a transparent clear.
        let load = wgpu::LoadOp::Clear(clear_color(
            list.clear_color(),
            self.context.config.alpha_mode,
            self.context.color_space,
        ));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        {
            let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ellipse pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for run in runs {
                let Some(mesh) = self.meshes.get(&run.segments) else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                render_pass.draw(0..mesh.vertex_count, run.instances);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn upload_instances(&mut self, list: &DisplayList) {
        let color_space = self.context.color_space;
        self.instances.clear();
        self.instances.extend(
            list.commands()
                .iter()
                .map(|command| EllipseInstance::from_command(command, color_space)),
        );

        let capacity = grown_capacity(self.instance_capacity, self.instances.len());
        if capacity != self.instance_capacity {
            tracing::debug!(
                from = self.instance_capacity,
                to = capacity,
                "growing instance buffer"
            );
            self.instance_buffer = Self::create_instance_buffer(&self.context.device, capacity);
            self.instance_capacity = capacity;
        }

        if !self.instances.is_empty() {
            self.context.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ellipse instances"),
            size: (capacity * std::mem::size_of::<EllipseInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_targets(context: &GpuContext) -> (Option<RenderTarget>, RenderTarget) {
        let multisample_target = (context.sample_count > 1).then(|| {
            RenderTarget::new(
                &context.device,
                "msaa color target",
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });
        let depth_target = RenderTarget::new(
            &context.device,
            "depth target",
            DEPTH_FORMAT,
            context.size,
            context.sample_count,
        );
        (multisample_target, depth_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_capacity_grows_geometrically() {
        assert_eq!(grown_capacity(64, 10), 64);
        assert_eq!(grown_capacity(64, 64), 64);
        assert_eq!(grown_capacity(64, 65), 128);
        assert_eq!(grown_capacity(128, 1000), 1024);
        assert_eq!(grown_capacity(0, 1), MIN_INSTANCE_CAPACITY);
    }
}
