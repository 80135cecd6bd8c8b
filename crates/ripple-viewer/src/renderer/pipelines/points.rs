// Draws one soft sprite per display-grid cell, displaced by the height field.

use crate::renderer::field_texture::FieldTexture;
use ripple::{FieldEncoding, FrameParams, GridConfig, RippleConfig};
use wgpu::util::DeviceExt;

/// Per-frame uniforms, packed as vec4s so the WGSL layout needs no padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniforms {
    /// cols, rows, field width, field height
    pub grid: [f32; 4],
    /// center.x, center.y, radius, softness
    pub reveal: [f32; 4],
    /// rgb, global visibility
    pub color: [f32; 4],
    /// brightness low, brightness high, height amplitude, point size (device px)
    pub shading: [f32; 4],
    /// viewport width (px), viewport height (px), time (s), row speed
    pub motion: [f32; 4],
    /// size base, size height gain, size reveal gain, reveal enabled
    pub sizing: [f32; 4],
    /// row wave amplitude, row wave frequency, decode texels, unused
    pub wave: [f32; 4],
}

// Compile-time safety check: buffer size must match the WGSL struct.
const _: [(); 112] = [(); core::mem::size_of::<PointsUniforms>()];

/// Everything outside [`FrameParams`] the shader needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTarget {
    pub grid: GridConfig,
    pub field_size: (u32, u32),
    pub encoding: FieldEncoding,
    pub viewport_px: [f32; 2],
    pub pixel_ratio: f32,
}

impl PointsUniforms {
    pub fn new(params: &FrameParams, config: &RippleConfig, target: &FrameTarget) -> Self {
        let r = &config.render;
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        Self {
            grid: [
                target.grid.display_cols as f32,
                target.grid.display_rows as f32,
                target.field_size.0 as f32,
                target.field_size.1 as f32,
            ],
            reveal: [
                params.reveal_center.x,
                params.reveal_center.y,
                params.reveal_radius,
                params.reveal_softness,
            ],
            color: [r.color[0], r.color[1], r.color[2], params.visibility],
            shading: [
                r.brightness[0],
                r.brightness[1],
                params.height_amplitude,
                r.point_size * target.pixel_ratio,
            ],
            motion: [
                target.viewport_px[0].max(1.0),
                target.viewport_px[1].max(1.0),
                params.time,
                params.row_speed,
            ],
            sizing: [
                r.size_base,
                r.size_height_gain,
                r.size_reveal_gain,
                flag(params.reveal_enabled),
            ],
            wave: [
                r.row_wave_amplitude,
                r.row_wave_frequency,
                flag(!target.encoding.is_float()),
                0.0,
            ],
        }
    }
}

pub struct PointsPipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
}

impl PointsPipeline {
    pub fn new(device: &wgpu::Device, target_fmt: wgpu::TextureFormat, field: &FieldTexture) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Points Uniform Buffer"),
            size: std::mem::size_of::<PointsUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Points BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<PointsUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                // Rg32Float is not filterable everywhere; the shader filters by hand.
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = create_bind_group(device, &layout, &uniform_buffer, field);

        // Sprite quad (two triangles), instanced once per point.
        let corners: [[f32; 2]; 6] = [
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Quad VB"),
            contents: bytemuck::cast_slice(&corners),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points WGSL"),
            source: wgpu::ShaderSource::Wgsl(POINTS_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ripple Points Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            layout,
            bind_group,
            uniform_buffer,
            quad_vb,
        }
    }

    /// Points the bind group at a reallocated field texture.
    pub fn rebind(&mut self, device: &wgpu::Device, field: &FieldTexture) {
        self.bind_group = create_bind_group(device, &self.layout, &self.uniform_buffer, field);
    }

    pub fn update(&self, queue: &wgpu::Queue, uniforms: &PointsUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, point_count: u32) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.draw(0..6, 0..point_count);
    }

    pub fn destroy(self) {
        self.uniform_buffer.destroy();
        self.quad_vb.destroy();
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    field: &FieldTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Points Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&field.view),
            },
        ],
    })
}

pub const POINTS_WGSL: &str = r#"
struct PointsUniforms {
    grid: vec4<f32>,
    reveal: vec4<f32>,
    color: vec4<f32>,
    shading: vec4<f32>,
    motion: vec4<f32>,
    sizing: vec4<f32>,
    wave: vec4<f32>,
};
@group(0) @binding(0) var<uniform> U: PointsUniforms;
@group(0) @binding(1) var field_tex: texture_2d<f32>;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) height: f32,
    @location(3) reveal: f32,
}

// Clamped texel fetch, unfolded from [0, 1] when the field is 8-bit.
fn load_height(p: vec2<i32>) -> f32 {
    let size = vec2<i32>(U.grid.zw);
    let c = clamp(p, vec2<i32>(0, 0), size - vec2<i32>(1, 1));
    let raw = textureLoad(field_tex, c, 0).r;
    return select(raw, raw * 2.0 - 1.0, U.wave.z > 0.5);
}

fn sample_height(uv: vec2<f32>) -> f32 {
    let st = uv * U.grid.zw - vec2<f32>(0.5, 0.5);
    let base = floor(st);
    let f = st - base;
    let b = vec2<i32>(base);
    let h00 = load_height(b);
    let h10 = load_height(b + vec2<i32>(1, 0));
    let h01 = load_height(b + vec2<i32>(0, 1));
    let h11 = load_height(b + vec2<i32>(1, 1));
    return mix(mix(h00, h10, f.x), mix(h01, h11, f.x), f.y);
}

fn reveal_mask(uv: vec2<f32>) -> f32 {
    if (U.sizing.w < 0.5) {
        return 1.0;
    }
    let radius = max(U.reveal.z, 0.0001);
    let softness = max(U.reveal.w, 0.05);
    let d = uv - U.reveal.xy;
    return exp(-dot(d, d) / (radius * radius * softness)) * step(0.0001, U.reveal.z);
}

@vertex
fn vs_main(@location(0) corner: vec2<f32>, @builtin(instance_index) idx: u32) -> VSOut {
    let cols = u32(U.grid.x);
    let ix = idx % cols;
    let iy = idx / cols;
    let uv = vec2<f32>(f32(ix), f32(iy)) / max(U.grid.xy - vec2<f32>(1.0, 1.0), vec2<f32>(1.0, 1.0));

    let h = sample_height(uv);
    var pos = uv * 2.0 - vec2<f32>(1.0, 1.0);
    let row_dir = select(1.0, -1.0, (iy & 1u) == 0u);
    pos.y += sin(U.motion.z * U.motion.w + f32(ix) * U.wave.y) * U.wave.x * row_dir;
    pos.y += h * U.shading.z;

    let reveal = reveal_mask(uv);
    let size_px = max(U.shading.w * (U.sizing.x + h * U.sizing.y + reveal * U.sizing.z), 1.0);
    pos += corner * size_px / U.motion.xy;

    var out: VSOut;
    out.clip = vec4<f32>(pos, 0.0, 1.0);
    out.corner = corner;
    out.uv = uv;
    out.height = h;
    out.reveal = reveal;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let d = length(in.corner) * 0.5;
    let core = 1.0 - smoothstep(0.0, 0.5, d);
    let halo = 1.0 - smoothstep(0.15, 0.5, d);

    let vignette = 1.0 - smoothstep(0.25, 0.95, length(in.uv - vec2<f32>(0.5, 0.5)));
    let g = in.uv - vec2<f32>(0.5, 0.12);
    let top_glow = exp(-dot(g, g) * 8.0);
    let height_boost = 1.0 + in.height * 0.85;
    let brightness = mix(U.shading.x, U.shading.y, top_glow) * mix(0.8, 1.35, in.reveal);

    var color = U.color.rgb * brightness * height_boost;
    color.r += max(0.0, in.height) * 0.1;
    color += U.color.rgb * halo * 0.1;

    let alpha = core * vignette * U.color.a * in.reveal;
    return vec4<f32>(color, alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use ripple::{Activity, Preset, Splat, Viewport};

    fn params() -> FrameParams {
        FrameParams {
            splat: Splat::NONE,
            activity: Activity::Idle,
            reveal_center: glam::Vec2::new(0.25, 0.75),
            reveal_radius: 0.1,
            reveal_softness: 2.2,
            reveal_enabled: true,
            visibility: 0.5,
            height_amplitude: 0.22,
            row_speed: 0.6,
            time: 3.0,
        }
    }

    fn target(encoding: FieldEncoding) -> FrameTarget {
        let config = RippleConfig::default();
        FrameTarget {
            grid: GridConfig::from_viewport(Viewport::new(1920.0, 1080.0, 2.0), &config.grid),
            field_size: (455, 256),
            encoding,
            viewport_px: [3840.0, 2160.0],
            pixel_ratio: 2.0,
        }
    }

    #[test]
    fn uniforms_pack_frame_state() {
        let config = RippleConfig::default();
        let u = PointsUniforms::new(&params(), &config, &target(FieldEncoding::Float));

        assert_eq!(u.grid, [409.0, 230.0, 455.0, 256.0]);
        assert_eq!(u.reveal, [0.25, 0.75, 0.1, 2.2]);
        assert_eq!(u.color[3], 0.5);
        assert_eq!(u.shading[3], config.render.point_size * 2.0);
        assert_eq!(u.sizing[3], 1.0);
        assert_eq!(u.wave[2], 0.0);
    }

    #[test]
    fn unorm_fields_request_decoding() {
        let config = RippleConfig::default();
        let u = PointsUniforms::new(&params(), &config, &target(FieldEncoding::Unorm));
        assert_eq!(u.wave[2], 1.0);
    }

    #[test]
    fn classic_disables_reveal_and_row_wave() {
        let config = RippleConfig::preset(Preset::Classic);
        let mut p = params();
        p.reveal_enabled = config.reveal.enabled;
        let u = PointsUniforms::new(&p, &config, &target(FieldEncoding::Float));
        assert_eq!(u.sizing[3], 0.0);
        assert_eq!(u.wave[0], 0.0);
    }

    #[test]
    fn shader_declares_entry_points() {
        assert!(POINTS_WGSL.contains("fn vs_main"));
        assert!(POINTS_WGSL.contains("fn fs_main"));
        assert!(POINTS_WGSL.contains("wave: vec4<f32>"));
    }
}
