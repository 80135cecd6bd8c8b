//! Texel encodings for handing the height field to a GPU texture.
//!
//! Platforms with float textures take `(height, velocity)` as-is. Everything
//! else gets the signed range folded into unsigned [0, 1] with [`encode`] and
//! unfolded with [`decode`] on every read. Both sides must agree on the
//! encoding or the field silently flattens.

use crate::field::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// Two `f32` channels per texel (`Rg32Float`).
    Float,
    /// Four `u8` channels per texel (`Rgba8Unorm`), values folded into [0, 1].
    Unorm,
}

impl FieldEncoding {
    pub fn bytes_per_texel(self) -> u32 {
        match self {
            FieldEncoding::Float => 8,
            FieldEncoding::Unorm => 4,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, FieldEncoding::Float)
    }

    /// Serializes cells into the texel layout of this encoding, row by row.
    pub fn pack(self, cells: &[Cell], out: &mut Vec<u8>) {
        out.clear();
        match self {
            FieldEncoding::Float => out.extend_from_slice(bytemuck::cast_slice(cells)),
            FieldEncoding::Unorm => {
                out.reserve(cells.len() * 4);
                for c in cells {
                    out.extend_from_slice(&[
                        quantize(encode(c.height)),
                        quantize(encode(c.velocity)),
                        0,
                        u8::MAX,
                    ]);
                }
            }
        }
    }
}

/// Folds [-1, 1] into [0, 1].
#[inline]
pub fn encode(v: f32) -> f32 {
    v * 0.5 + 0.5
}

/// Unfolds [0, 1] back into [-1, 1].
#[inline]
pub fn decode(v: f32) -> f32 {
    v * 2.0 - 1.0
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
