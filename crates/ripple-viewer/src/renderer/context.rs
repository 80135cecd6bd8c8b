use crate::error::ViewerError;
use ripple::FieldEncoding;
use std::sync::Arc;
use winit::window::Window;

/// Holds all GPU resources needed for rendering.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    /// How the height field is laid out in its texture on this adapter.
    pub field_encoding: FieldEncoding,
}

impl GfxContext {
    /// Creates a context bound to `window` and probes the capabilities the
    /// ripple field depends on.
    pub async fn new(window: Arc<Window>, force_unorm: bool) -> Result<Self, ViewerError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // The surface must outlive the window; `Arc` guarantees this.
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let field_encoding = probe_field_encoding(&adapter, force_unorm);
        log::info!("height field encoding: {:?}", field_encoding);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ripple Device"),
                    required_features: wgpu::Features::empty(),
                    // Downlevel limits: the effect should run wherever a GPU does.
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        // Errors outside an explicit error scope are logged instead of panicking.
        device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
            log::error!("uncaptured wgpu error: {err}");
        }));

        // Shading math works in display space, so prefer a non-sRGB target.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(ViewerError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // V-sync paces the frame loop
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            field_encoding,
        })
    }

    /// Resizes the swap chain when the window size changes.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// Float texels when the adapter can sample and upload `Rg32Float`, otherwise
/// the folded 8-bit encoding.
fn probe_field_encoding(adapter: &wgpu::Adapter, force_unorm: bool) -> FieldEncoding {
    let needed = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
    let float_ok = adapter
        .get_texture_format_features(wgpu::TextureFormat::Rg32Float)
        .allowed_usages
        .contains(needed);

    match (float_ok, force_unorm) {
        (true, false) => FieldEncoding::Float,
        (true, true) => {
            log::info!("float field textures available but disabled by configuration");
            FieldEncoding::Unorm
        }
        (false, _) => {
            log::warn!("Rg32Float textures unsupported; falling back to 8-bit field encoding");
            FieldEncoding::Unorm
        }
    }
}
