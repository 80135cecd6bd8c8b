//! GPU copy of the height field's current buffer.

use ripple::{FieldEncoding, HeightField};

pub fn texture_format(encoding: FieldEncoding) -> wgpu::TextureFormat {
    match encoding {
        FieldEncoding::Float => wgpu::TextureFormat::Rg32Float,
        FieldEncoding::Unorm => wgpu::TextureFormat::Rgba8Unorm,
    }
}

pub struct FieldTexture {
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    encoding: FieldEncoding,
    width: u32,
    height: u32,
    staging: Vec<u8>,
}

impl FieldTexture {
    pub fn new(device: &wgpu::Device, encoding: FieldEncoding, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Height Field Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(encoding),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            encoding,
            width,
            height,
            staging: Vec::with_capacity(width as usize * height as usize * encoding.bytes_per_texel() as usize),
        }
    }

    #[inline]
    pub fn encoding(&self) -> FieldEncoding {
        self.encoding
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether this texture can hold `field` without reallocation.
    pub fn fits(&self, field: &HeightField) -> bool {
        self.width == field.width() && self.height == field.height()
    }

    /// Uploads the field's current buffer. Row 0 of the field (uv.y = 0) lands
    /// in texel row 0.
    pub fn upload(&mut self, queue: &wgpu::Queue, field: &HeightField) {
        debug_assert!(self.fits(field));
        self.encoding.pack(field.cells(), &mut self.staging);

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.staging,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.width * self.encoding.bytes_per_texel()),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn destroy(self) {
        self.texture.destroy();
    }
}
