//! Double-buffered height field stepped with a damped 2D wave equation.

use glam::Vec2;
use rayon::prelude::*;

/// Velocity injected per unit of splat height.
const SPLAT_VELOCITY_SHARE: f32 = 0.35;
/// Courant-style coupling of the Laplacian into velocity.
const WAVE_COUPLING: f32 = 0.5;

/// One simulation texel. Layout matches an `Rg32Float` texel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Cell {
    pub height: f32,
    pub velocity: f32,
}

/// Identity of one of the two simulation buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    A,
    B,
}

impl BufferId {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            BufferId::A => BufferId::B,
            BufferId::B => BufferId::A,
        }
    }
}

/// Gaussian disturbance injected during one step. Coordinates are UV, y-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Splat {
    pub center: Vec2,
    /// Drag offset along the pointer's direction of travel.
    pub offset: Vec2,
    pub strength: f32,
    pub radius: f32,
}

impl Splat {
    pub const NONE: Splat = Splat {
        center: Vec2::ZERO,
        offset: Vec2::ZERO,
        strength: 0.0,
        radius: 0.0,
    };

    #[inline]
    pub fn is_active(&self) -> bool {
        self.strength != 0.0 && self.radius > 1e-6
    }
}

/// `W x H` grid of `(height, velocity)` held in two buffers.
///
/// Exactly one buffer is current (read by the renderer and by the next step);
/// a step writes the other one and then the two swap identity.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: u32,
    height: u32,
    buffers: [Vec<Cell>; 2],
    current: BufferId,
    steps: u64,
}

impl HeightField {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            buffers: [vec![Cell::default(); cells], vec![Cell::default(); cells]],
            current: BufferId::A,
            steps: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn current_id(&self) -> BufferId {
        self.current
    }

    /// Number of steps taken since allocation.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The current buffer, row-major with row 0 at the bottom (uv.y = 0).
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.buffers[index(self.current)]
    }

    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Cell {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.cells()[y * self.width as usize + x]
    }

    #[cfg(test)]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        let i = index(self.current);
        &mut self.buffers[i]
    }

    /// Advances the field by one step and returns the buffer that was written,
    /// which is current afterwards.
    ///
    /// Neighbours outside the grid repeat the edge texel, so the border behaves
    /// like a reflecting wall. The wall conserves mass, so the splat's net
    /// injection is removed again in a second pass and the mean height of the
    /// field stays where it started.
    pub fn step(&mut self, splat: &Splat, damping: f32) -> BufferId {
        let w = self.width as usize;
        let h = self.height as usize;
        let read = self.current;
        let write = read.other();

        let [a, b] = &mut self.buffers;
        let (src, dst) = match read {
            BufferId::A => (&*a, b),
            BufferId::B => (&*b, a),
        };

        let texel = Vec2::new(1.0 / w as f32, 1.0 / h as f32);
        let target = splat.center + splat.offset;
        let strength = splat.strength;
        let inv_r2 = if splat.is_active() {
            1.0 / (splat.radius * splat.radius)
        } else {
            0.0
        };

        let injected: f64 = dst
            .par_chunks_mut(w)
            .enumerate()
            .map(|(y, row)| {
                let up = (y + 1).min(h - 1) * w;
                let down = y.saturating_sub(1) * w;
                let here = y * w;
                let v_coord = (y as f32 + 0.5) * texel.y;
                let mut row_injected = 0.0f64;

                for (x, out) in row.iter_mut().enumerate() {
                    let left = x.saturating_sub(1);
                    let right = (x + 1).min(w - 1);
                    let c = src[here + x];

                    let lap = src[here + left].height
                        + src[here + right].height
                        + src[up + x].height
                        + src[down + x].height
                        - 4.0 * c.height;

                    let mut velocity = (c.velocity + lap * WAVE_COUPLING) * damping;
                    let mut height = c.height + velocity;

                    if inv_r2 > 0.0 {
                        let uv = Vec2::new((x as f32 + 0.5) * texel.x, v_coord);
                        let bump = (-(uv - target).length_squared() * inv_r2).exp() * strength;
                        height += bump;
                        velocity += bump * SPLAT_VELOCITY_SHARE;
                        row_injected += bump as f64;
                    }

                    *out = Cell { height, velocity };
                }
                row_injected
            })
            .sum();

        if injected != 0.0 {
            let bias = (injected / dst.len() as f64) as f32;
            dst.par_iter_mut().for_each(|c| {
                c.height -= bias;
                c.velocity -= bias * SPLAT_VELOCITY_SHARE;
            });
        }

        self.current = write;
        self.steps += 1;
        write
    }

    /// Sum of `height^2 + velocity^2` over the current buffer.
    pub fn energy(&self) -> f64 {
        self.cells()
            .par_iter()
            .map(|c| (c.height as f64).powi(2) + (c.velocity as f64).powi(2))
            .sum()
    }

    pub fn mean_height(&self) -> f32 {
        let sum: f64 = self.cells().par_iter().map(|c| c.height as f64).sum();
        (sum / self.cells().len() as f64) as f32
    }

    /// Bilinear height lookup at `uv` with clamped addressing, matching what
    /// the point-cloud vertex stage does on the GPU.
    pub fn sample_height(&self, uv: Vec2) -> f32 {
        let size = Vec2::new(self.width as f32, self.height as f32);
        let st = uv * size - Vec2::splat(0.5);
        let base = st.floor();
        let f = st - base;
        let (x0, y0) = (base.x as i64, base.y as i64);

        let at = |x: i64, y: i64| -> f32 {
            let x = x.clamp(0, self.width as i64 - 1) as usize;
            let y = y.clamp(0, self.height as i64 - 1) as usize;
            self.cells()[y * self.width as usize + x].height
        };

        let bottom = lerp(at(x0, y0), at(x0 + 1, y0), f.x);
        let top = lerp(at(x0, y0 + 1), at(x0 + 1, y0 + 1), f.x);
        lerp(bottom, top, f.y)
    }
}

#[inline]
fn index(id: BufferId) -> usize {
    match id {
        BufferId::A => 0,
        BufferId::B => 1,
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
