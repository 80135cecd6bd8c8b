use crate::{
    config::Config,
    error::ViewerError,
    input::PointerTranslator,
    renderer::{
        pipelines::points::{FrameTarget, PointsUniforms},
        Renderer,
    },
    ui,
};
use ripple::{RippleEngine, Viewport};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

/// Exponential moving average of the frame rate for the HUD.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<Duration>,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None, fps: 0.0 }
    }

    pub fn tick(&mut self, now: Duration) -> f32 {
        if let Some(last) = self.last {
            let dt = (now - last).as_secs_f32();
            if dt > 0.0 {
                let instant = 1.0 / dt;
                self.fps = if self.fps == 0.0 {
                    instant
                } else {
                    self.fps + (instant - self.fps) * 0.05
                };
            }
        }
        self.last = Some(now);
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn viewport_of(window: &Window) -> Viewport {
    viewport_from(window.inner_size(), window.scale_factor())
}

/// Logical viewport for a physical surface size at `scale`.
pub fn viewport_from(size: PhysicalSize<u32>, scale: f64) -> Viewport {
    let logical = size.to_logical::<f32>(scale);
    Viewport::new(logical.width, logical.height, scale as f32)
}

pub struct App {
    pub renderer: Renderer,
    pub engine: RippleEngine,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub show_hud: bool,
    input: PointerTranslator,
    clock: FrameClock,
    started: Instant,
}

impl App {
    /// Builds the engine and the GPU side for `window`.
    ///
    /// Any [`ViewerError`] for which [`ViewerError::is_unsupported`] holds means
    /// the platform cannot host the effect; the caller should carry on without it.
    pub async fn initialize(window: Arc<Window>, config: &Config) -> Result<Self, ViewerError> {
        let ripple_config = config.ripple_config();
        let engine = RippleEngine::new(ripple_config, viewport_of(&window))?;
        let grid = engine.grid();
        log::info!(
            "ripple field: {:?} preset, {} points ({}x{}), simulation {}x{}{}",
            ripple_config.preset,
            grid.point_count,
            grid.display_cols,
            grid.display_rows,
            grid.sim_width,
            grid.sim_height,
            if ripple_config.reduced_motion {
                ", reduced motion"
            } else {
                ""
            }
        );

        let renderer = Renderer::new(window.clone(), config.force_unorm, engine.field()).await?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            engine,
            egui_ctx,
            egui_state,
            show_hud: config.hud,
            input: PointerTranslator::new(window.scale_factor()),
            clock: FrameClock::new(),
            started: Instant::now(),
        })
    }

    pub fn resize(&mut self, window: &Window, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.engine.resize(viewport_of(window));
        }
    }

    /// Returns true when the event was consumed by the UI.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);

        match event {
            WindowEvent::Resized(physical_size) => self.resize(window, *physical_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.input.set_scale_factor(*scale_factor);
                // Point size follows the pixel ratio even if no resize follows.
                self.engine
                    .resize(viewport_from(window.inner_size(), *scale_factor));
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::KeyH)
                    && !response.consumed =>
            {
                self.show_hud = !self.show_hud;
            }
            _ => {}
        }

        // Leaving the window must always reach the engine, even over a panel.
        let leaving = matches!(event, WindowEvent::CursorLeft { .. });
        if response.consumed && !leaving {
            return true;
        }

        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if let Some(pointer) = self.input.translate(event, now_ms) {
            self.engine.handle_input(pointer);
        }

        false
    }

    /// One frame: step the engine, upload the field, draw points and UI.
    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let elapsed = self.started.elapsed();
        let fps = self.clock.tick(elapsed);
        let params = self.engine.tick(elapsed);
        self.renderer.sync_field(self.engine.field());

        let size = self.renderer.gfx.size;
        let target = FrameTarget {
            grid: *self.engine.grid(),
            field_size: self.renderer.field.size(),
            encoding: self.renderer.field.encoding(),
            viewport_px: [size.width as f32, size.height as f32],
            pixel_ratio: self.engine.pixel_ratio(),
        };
        let uniforms = PointsUniforms::new(&params, self.engine.config(), &target);

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.renderer
            .render(&mut encoder, &swap_view, &uniforms, target.grid.point_count);

        // --- UI ---
        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        if self.show_hud {
            let stats = ui::HudStats {
                fps,
                grid: target.grid,
                encoding: target.encoding,
                activity: params.activity,
                visibility: params.visibility,
                reveal_radius: params.reveal_radius,
                steps: self.engine.field().steps(),
            };
            ui::draw_hud(&self.egui_ctx, &stats);

            let mut edited = *self.engine.config();
            if ui::draw_tuning_panel(&self.egui_ctx, &mut edited) {
                if let Err(err) = self.engine.set_config(edited) {
                    log::warn!("rejected tuning change: {err}");
                }
            }
        }

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        let ui_commands = self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();

        Ok(())
    }

    /// Explicit teardown: waits for the GPU and releases its resources.
    pub fn dispose(self) {
        log::info!(
            "shutting down after {} frames",
            self.engine.frames()
        );
        self.renderer.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_converges_to_frame_rate() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Duration::ZERO), 0.0);
        let mut fps = 0.0;
        for i in 1..=400u64 {
            fps = clock.tick(Duration::from_micros(i * 16_667));
        }
        assert!((fps - 60.0).abs() < 0.5, "fps = {fps}");
    }

    #[test]
    fn viewport_tracks_scale_factor() {
        let size = PhysicalSize::new(2880u32, 1800u32);
        let v = viewport_from(size, 2.0);
        assert_eq!((v.width, v.height), (1440.0, 900.0));
        assert_eq!(v.device_pixel_ratio, 2.0);

        let mut engine = RippleEngine::new(ripple::RippleConfig::default(), viewport_from(size, 1.0))
            .expect("default config is valid");
        assert_eq!(engine.pixel_ratio(), 1.0);
        engine.resize(viewport_from(size, 2.0));
        assert_eq!(engine.pixel_ratio(), 2.0);
    }

    #[test]
    fn frame_clock_ignores_zero_intervals() {
        let mut clock = FrameClock::new();
        clock.tick(Duration::from_millis(10));
        let fps = clock.tick(Duration::from_millis(10));
        assert_eq!(fps, 0.0);
    }
}
