use crate::config::GridLimits;

/// Drawable surface size as reported by the host, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Width over height, with degenerate sizes treated as 1 px.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width.max(1.0) / self.height.max(1.0)
    }
}

/// Simulation and display resolutions derived from one viewport.
///
/// The simulation grid is independent of (and usually coarser than) the point
/// grid: points address heights by UV, not by texel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub sim_width: u32,
    pub sim_height: u32,
    pub display_cols: u32,
    pub display_rows: u32,
    pub point_count: u32,
}

impl GridConfig {
    pub fn from_viewport(viewport: Viewport, limits: &GridLimits) -> Self {
        let aspect = viewport.aspect();

        let display_rows = limits.display_rows;
        let display_cols = ((display_rows as f32 * aspect).round() as u32)
            .clamp(limits.min_cols, limits.max_cols);

        // The short axis gets `sim_base` texels, the long axis scales with aspect.
        let base = limits.sim_base as f32;
        let (sim_width, sim_height) = if aspect >= 1.0 {
            ((base * aspect).round() as u32, limits.sim_base)
        } else {
            (limits.sim_base, (base / aspect).round() as u32)
        };

        Self {
            sim_width: sim_width.clamp(limits.sim_min, limits.sim_max),
            sim_height: sim_height.clamp(limits.sim_min, limits.sim_max),
            display_cols,
            display_rows,
            point_count: display_cols * display_rows,
        }
    }

    #[inline]
    pub fn sim_cells(&self) -> usize {
        self.sim_width as usize * self.sim_height as usize
    }
}

/// Device pixel ratio clamped to the configured maximum (and at least 1).
pub fn clamp_pixel_ratio(ratio: f32, limits: &GridLimits) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(1.0, limits.max_pixel_ratio.max(1.0))
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, RippleConfig};

    fn limits() -> GridLimits {
        RippleConfig::preset(Preset::Reveal).grid
    }

    #[test]
    fn full_hd_landscape() {
        let grid = GridConfig::from_viewport(Viewport::new(1920.0, 1080.0, 1.0), &limits());
        assert_eq!(grid.display_rows, 230);
        assert_eq!(grid.display_cols, 409);
        assert_eq!(grid.point_count, 94_070);
        assert_eq!(grid.sim_width, 455);
        assert_eq!(grid.sim_height, 256);
    }

    #[test]
    fn portrait_phone_clamps_columns_and_sim_height() {
        let grid = GridConfig::from_viewport(Viewport::new(390.0, 844.0, 3.0), &limits());
        // 230 * 0.462 = 106 -> clamped up to the minimum column count.
        assert_eq!(grid.display_cols, 180);
        assert_eq!(grid.sim_width, 256);
        assert_eq!(grid.sim_height, 512);
        assert_eq!(grid.point_count, 180 * 230);
    }

    #[test]
    fn ultrawide_clamps_to_maximums() {
        let grid = GridConfig::from_viewport(Viewport::new(5120.0, 1080.0, 1.0), &limits());
        assert_eq!(grid.display_cols, 520);
        assert_eq!(grid.sim_width, 512);
        assert_eq!(grid.sim_height, 256);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let l = limits();
        let grid = GridConfig::from_viewport(Viewport::new(800.0, 0.0, 1.0), &l);
        assert!((l.min_cols..=l.max_cols).contains(&grid.display_cols));
        assert!((l.sim_min..=l.sim_max).contains(&grid.sim_width));
        assert!((l.sim_min..=l.sim_max).contains(&grid.sim_height));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let l = limits();
        assert_eq!(clamp_pixel_ratio(3.0, &l), 2.0);
        assert_eq!(clamp_pixel_ratio(0.5, &l), 1.0);
        assert_eq!(clamp_pixel_ratio(f32::NAN, &l), 1.0);
    }
}
