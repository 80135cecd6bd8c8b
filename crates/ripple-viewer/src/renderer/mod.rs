//! The rendering orchestrator. Owns the GPU context, the field texture, the
//! point pipeline and the egui renderer.

pub mod context;
pub mod field_texture;
pub mod pipelines;

use self::{
    context::GfxContext,
    field_texture::FieldTexture,
    pipelines::points::{PointsPipeline, PointsUniforms},
};
use crate::error::ViewerError;
use ripple::HeightField;
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub field: FieldTexture,
    pub points: PointsPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    /// Brings up the GPU side. Shader and pipeline creation run inside a
    /// validation error scope so a bad shader surfaces as
    /// [`ViewerError::ShaderCompile`] instead of a panic.
    pub async fn new(
        window: Arc<Window>,
        force_unorm: bool,
        field: &HeightField,
    ) -> Result<Self, ViewerError> {
        let gfx = GfxContext::new(window, force_unorm).await?;

        let field_tex = FieldTexture::new(&gfx.device, gfx.field_encoding, field.width(), field.height());

        gfx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let points = PointsPipeline::new(&gfx.device, gfx.config.format, &field_tex);
        if let Some(err) = gfx.device.pop_error_scope().await {
            log::warn!("points pipeline rejected: {err}");
            return Err(ViewerError::ShaderCompile(err.to_string()));
        }

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            field: field_tex,
            points,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
        }
    }

    /// Uploads the field's current buffer, reallocating the texture first if
    /// the simulation resolution changed.
    pub fn sync_field(&mut self, field: &HeightField) {
        if !self.field.fits(field) {
            let (w, h) = self.field.size();
            log::debug!(
                "field texture {}x{} -> {}x{}",
                w,
                h,
                field.width(),
                field.height()
            );
            let fresh = FieldTexture::new(
                &self.gfx.device,
                self.gfx.field_encoding,
                field.width(),
                field.height(),
            );
            std::mem::replace(&mut self.field, fresh).destroy();
            self.points.rebind(&self.gfx.device, &self.field);
        }
        self.field.upload(&self.gfx.queue, field);
    }

    /// Clears to black and draws the point cloud. Reads the field texture
    /// only; the simulation is never touched here.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        swap_view: &wgpu::TextureView,
        uniforms: &PointsUniforms,
        point_count: u32,
    ) {
        self.points.update(&self.gfx.queue, uniforms);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Ripple Points Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: swap_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.points.draw(&mut pass, point_count);
    }

    /// Waits for in-flight GPU work, then releases buffers and textures.
    pub fn dispose(self) {
        let Renderer {
            gfx,
            field,
            points,
            egui_renderer,
        } = self;

        let _ = gfx.device.poll(wgpu::Maintain::Wait);
        field.destroy();
        points.destroy();
        drop(egui_renderer);
        gfx.device.destroy();
        log::debug!("renderer disposed");
    }
}
