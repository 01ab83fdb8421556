use std::time::Duration;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames fully cover the window; the cleared background shows as white.
    Opaque,
    /// The cleared background is see-through where the compositor allows it.
    #[default]
    Transparent,
}

/// Adapter selection hint forwarded to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Summary of the adapter picked at start-up.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    /// True for CPU rasterisers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || self.name.to_ascii_lowercase().contains("llvmpipe")
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the CLI flags and config file: how large the
/// window should be, how frames are presented, and how long to keep going.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    pub antialiasing: Antialiasing,
    pub surface_alpha: SurfaceAlpha,
    pub decorations: bool,
    /// Overrides the frame rate requested by the sketch.
    pub target_fps: Option<f32>,
    /// Exit the event loop after this much wall-clock time.
    pub run_for: Option<Duration>,
    pub gpu_power: GpuPowerPreference,
}

impl Default for RendererConfig {
    /// Provides an 800x800 transparent window with automatic MSAA.
    fn default() -> Self {
        Self {
            surface_size: (800, 800),
            title: "orbitload".to_string(),
            antialiasing: Antialiasing::default(),
            surface_alpha: SurfaceAlpha::default(),
            decorations: true,
            target_fps: None,
            run_for: None,
            gpu_power: GpuPowerPreference::default(),
        }
    }
}
