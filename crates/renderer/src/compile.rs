use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the instanced ellipse vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(device, "ellipse vertex", VERTEX_SHADER_GLSL, ShaderStage::Vertex)
}

/// Compiles the flat-fill fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(
        device,
        "ellipse fragment",
        FRAGMENT_SHADER_GLSL,
        ShaderStage::Fragment,
    )
}

fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    tracing::debug!(label, ?stage, "compiling GLSL shader");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Places the unit disc with the per-instance model matrix, then projects it.
///
/// Attribute locations must match the vertex buffer layouts in
/// `gpu::uniforms`; the uniform block must match `SceneUniforms`.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec4 i_model_0;
layout(location = 2) in vec4 i_model_1;
layout(location = 3) in vec4 i_model_2;
layout(location = 4) in vec4 i_model_3;
layout(location = 5) in vec4 i_color;

layout(location = 0) out vec4 v_color;

layout(std140, set = 0, binding = 0) uniform SceneParams {
    mat4 view_projection;
} scene;

void main() {
    mat4 model = mat4(i_model_0, i_model_1, i_model_2, i_model_3);
    v_color = i_color;
    gl_Position = scene.view_projection * model * vec4(a_position, 0.0, 1.0);
}
";

/// Writes premultiplied colour so one blend state serves both alpha modes.
const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 outColor;

void main() {
    outColor = vec4(v_color.rgb * v_color.a, v_color.a);
}
";
