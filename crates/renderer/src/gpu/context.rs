use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing, GpuPowerPreference, SurfaceAlpha};

/// How colours must be encoded before they reach the swapchain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SurfaceColorSpace {
    /// The surface stores values as written.
    Gamma,
    /// The surface encodes to sRGB on write, so inputs are linearised first.
    Linear,
}

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
    pub color_space: SurfaceColorSpace,
    pub adapter_profile: AdapterProfile,
}

impl GpuContext {
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
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        // SAFETY: the window outlives the surface; `WindowState` drops the GPU
        // state before the window it was created from.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let power_preference = match gpu_power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_profile = AdapterProfile::from_wgpu(&adapter.get_info());
        let is_software = adapter_profile.is_software();
        tracing::info!(
            name = %adapter_profile.name,
            backend = ?adapter_profile.backend,
            device_type = ?adapter_profile.device_type,
            "selected GPU adapter"
        );

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        if size.width > max_dimension || size.height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested surface is {}x{}",
                size.width,
                size.height
            );
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, color_space) = select_surface_format(&surface_caps.formats)
            .ok_or_else(|| anyhow!("surface reports no supported texture formats"))?;
        if color_space == SurfaceColorSpace::Linear {
            tracing::warn!(
                ?surface_format,
                "no non-sRGB surface format available; linearising colours"
            );
        }

        let format_features = adapter.get_texture_format_features(surface_format);
        let mut sample_count = select_sample_count(
            antialiasing,
            &format_features.flags.supported_sample_counts(),
        );
        if sample_count > 1
            && !format_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
        {
            tracing::warn!(
                ?surface_format,
                "surface format does not support MSAA resolve; disabling MSAA"
            );
            sample_count = 1;
        }
        if is_software && sample_count > 1 && antialiasing == Antialiasing::Auto {
            tracing::warn!(
                sample_count,
                "software rasterizer detected; disabling MSAA for performance"
            );
            sample_count = 1;
        }

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("orbitload device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let present_mode = if surface_caps
            .present_modes
            .contains(&wgpu::PresentMode::Fifo)
        {
            wgpu::PresentMode::Fifo
        } else {
            surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        };
        let alpha_mode = select_alpha_mode(surface_alpha, &surface_caps.alpha_modes);
        if surface_alpha == SurfaceAlpha::Transparent
            && matches!(
                alpha_mode,
                wgpu::CompositeAlphaMode::Opaque | wgpu::CompositeAlphaMode::Auto
            )
        {
            tracing::warn!(
                ?alpha_mode,
                "compositor does not offer a transparent alpha mode; background will be white"
            );
        }
        tracing::debug!(?present_mode, ?alpha_mode, sample_count, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            sample_count,
            surface_format,
            color_space,
            adapter_profile,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the surface was lost.
    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// Prefers a non-sRGB format so palette bytes reach the screen unchanged.
fn select_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, SurfaceColorSpace)> {
    if let Some(format) = formats.iter().copied().find(|format| !format.is_srgb()) {
        return Some((format, SurfaceColorSpace::Gamma));
    }
    formats
        .first()
        .map(|format| (*format, SurfaceColorSpace::Linear))
}

fn select_sample_count(antialiasing: Antialiasing, supported: &[u32]) -> u32 {
    let mut supported = supported.to_vec();
    if !supported.contains(&1) {
        supported.push(1);
    }
    supported.sort_unstable();
    supported.dedup();

    match antialiasing {
        Antialiasing::Auto => supported.last().copied().unwrap_or(1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) if supported.contains(&requested) => requested,
        Antialiasing::Samples(requested) => {
            let fallback = supported
                .iter()
                .copied()
                .filter(|&count| count <= requested)
                .max()
                .unwrap_or(1);
            tracing::warn!(
                requested,
                fallback,
                ?supported,
                "requested MSAA sample count not supported; falling back"
            );
            fallback
        }
    }
}

fn select_alpha_mode(
    surface_alpha: SurfaceAlpha,
    available: &[wgpu::CompositeAlphaMode],
) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode as Mode;

    let preferred: &[Mode] = match surface_alpha {
        SurfaceAlpha::Transparent => &[Mode::PreMultiplied, Mode::PostMultiplied, Mode::Inherit],
        SurfaceAlpha::Opaque => &[Mode::Opaque],
    };
    preferred
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .or_else(|| available.first().copied())
        .unwrap_or(Mode::Auto)
}

#[cfg(test)]
mod tests {
    use wgpu::CompositeAlphaMode as Mode;
    use wgpu::TextureFormat;

    use super::*;

    #[test]
    fn prefers_non_srgb_formats() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            select_surface_format(&formats),
            Some((TextureFormat::Bgra8Unorm, SurfaceColorSpace::Gamma))
        );
        assert_eq!(
            select_surface_format(&[TextureFormat::Rgba8UnormSrgb]),
            Some((TextureFormat::Rgba8UnormSrgb, SurfaceColorSpace::Linear))
        );
        assert_eq!(select_surface_format(&[]), None);
    }

    #[test]
    fn sample_count_negotiation() {
        let supported = [1, 2, 4];
        assert_eq!(select_sample_count(Antialiasing::Auto, &supported), 4);
        assert_eq!(select_sample_count(Antialiasing::Off, &supported), 1);
        assert_eq!(select_sample_count(Antialiasing::Samples(2), &supported), 2);
        assert_eq!(select_sample_count(Antialiasing::Samples(16), &supported), 4);
        assert_eq!(select_sample_count(Antialiasing::Auto, &[]), 1);
    }

    #[test]
    fn transparent_prefers_premultiplied() {
        let available = [Mode::Opaque, Mode::PostMultiplied, Mode::PreMultiplied];
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Transparent, &available),
            Mode::PreMultiplied
        );
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Transparent, &[Mode::Opaque, Mode::PostMultiplied]),
            Mode::PostMultiplied
        );
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Transparent, &[Mode::Opaque]),
            Mode::Opaque
        );
        assert_eq!(select_alpha_mode(SurfaceAlpha::Opaque, &available), Mode::Opaque);
        assert_eq!(select_alpha_mode(SurfaceAlpha::Opaque, &[]), Mode::Auto);
    }
}
