//! GPU side of the renderer.
//!
//! - `context` owns the wgpu instance, device and surface, and negotiates the
//!   surface format, alpha mode and MSAA sample count.
//! - `mesh` builds one disc vertex buffer per segment count.
//! - `pipeline` compiles the GLSL shaders into a depth-tested, premultiplied
//!   render pipeline.
//! - `uniforms` holds the GPU-facing structs and turns a display list into
//!   instance data and draw runs.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod mesh;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
#[cfg(test)]
pub(crate) use uniforms::{INSTANCE_ATTRIBUTES, VERTEX_ATTRIBUTES};
