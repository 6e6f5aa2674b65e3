use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::{self, SurfaceErrorAction};

/// Surface and adapter preferences.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO paces presentation to the display.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; unsupported values fall back to the
    /// first mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Desired maximum frame latency. A hint; support depends on the backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// wgpu device, queue and the window surface.
pub struct Gpu<'w> {
    /// Surface lifetime is tied to the window via `'w`.
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// `storage_bytes` is the largest storage buffer the caller will bind;
    /// the device limits are raised to cover it.
    pub async fn new(window: &'w Window, init: &GpuInit, storage_bytes: u64) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("gpu: {} ({:?})", info.name, info.backend);

        let adapter_limits = adapter.limits();
        anyhow::ensure!(
            u64::from(adapter_limits.max_storage_buffer_binding_size) >= storage_bytes,
            "adapter storage buffers are limited to {} bytes, {storage_bytes} required",
            adapter_limits.max_storage_buffer_binding_size
        );
        let required_limits = wgpu::Limits {
            max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nabu device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_format(&surface_caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&surface_caps.alpha_modes, init.alpha_mode);
        log::debug!("gpu: surface {format:?}, {alpha_mode:?}, {:?}", init.present_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface after a resize. A zero-area size (minimized)
    /// is recorded but left unconfigured until the window comes back.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next surface texture.
    pub fn acquire(&self) -> std::result::Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Triages a failed acquire, reconfiguring the surface when that helps.
    pub fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::of(err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        action
    }
}
