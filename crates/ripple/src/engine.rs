use std::time::Duration;

use glam::Vec2;

use crate::config::{ConfigError, RippleConfig};
use crate::driver::{FrameParams, MotionDriver};
use crate::field::HeightField;
use crate::grid::{clamp_pixel_ratio, GridConfig, Viewport};
use crate::pointer::{PointerEvent, PointerState};

/// Owns all mutable state of the effect and advances it one frame at a time.
///
/// Input arrives through [`RippleEngine::handle_input`]; [`RippleEngine::tick`]
/// samples the pointer, derives the splat, steps the field once and returns the
/// parameters the renderer needs alongside [`RippleEngine::field`].
#[derive(Debug, Clone)]
pub struct RippleEngine {
    config: RippleConfig,
    viewport: Viewport,
    grid: GridConfig,
    field: HeightField,
    pointer: PointerState,
    driver: MotionDriver,
    frames: u64,
}

impl RippleEngine {
    pub fn new(config: RippleConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = GridConfig::from_viewport(viewport, &config.grid);
        log::debug!(
            "ripple grid {}x{} points, simulation {}x{}",
            grid.display_cols,
            grid.display_rows,
            grid.sim_width,
            grid.sim_height
        );

        Ok(Self {
            config,
            viewport,
            grid,
            field: HeightField::new(grid.sim_width, grid.sim_height),
            pointer: PointerState::new(Vec2::new(viewport.width, viewport.height)),
            driver: MotionDriver::new(),
            frames: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The height field; its current buffer is what the renderer should draw.
    #[inline]
    pub fn field(&self) -> &HeightField {
        &self.field
    }

    #[inline]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Device pixel ratio after clamping.
    pub fn pixel_ratio(&self) -> f32 {
        clamp_pixel_ratio(self.viewport.device_pixel_ratio, &self.config.grid)
    }

    /// Replaces the live configuration. Grid limits take effect immediately.
    pub fn set_config(&mut self, config: RippleConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let regrid = config.grid != self.config.grid;
        self.config = config;
        if regrid {
            self.regrid();
        }
        Ok(())
    }

    /// Recomputes grid sizes and reallocates the field, discarding its state.
    /// Returns whether the simulation resolution changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        self.pointer
            .set_surface(Vec2::new(viewport.width, viewport.height));
        self.regrid()
    }

    pub fn handle_input(&mut self, event: PointerEvent) {
        self.pointer.handle(&event, &self.config.pointer);
    }

    /// Advances one frame. `elapsed` is measured from engine start on the same
    /// clock as pointer event timestamps.
    pub fn tick(&mut self, elapsed: Duration) -> FrameParams {
        self.pointer.advance(&self.config.smoothing);
        let params = self
            .driver
            .frame(&self.pointer, elapsed.as_secs_f64(), &self.config);
        self.field.step(&params.splat, self.config.damping());
        self.frames += 1;
        params
    }

    fn regrid(&mut self) -> bool {
        let grid = GridConfig::from_viewport(self.viewport, &self.config.grid);
        let changed = grid.sim_width != self.field.width() || grid.sim_height != self.field.height();
        log::debug!(
            "reallocating simulation {}x{} -> {}x{}",
            self.field.width(),
            self.field.height(),
            grid.sim_width,
            grid.sim_height
        );
        self.field = HeightField::new(grid.sim_width, grid.sim_height);
        if grid != self.grid {
            log::debug!(
                "display grid {}x{} ({} points)",
                grid.display_cols,
                grid.display_rows,
                grid.point_count
            );
        }
        self.grid = grid;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::pointer::PointerPhase;

    fn engine() -> RippleEngine {
        RippleEngine::new(RippleConfig::default(), Viewport::new(1920.0, 1080.0, 1.0))
            .expect("default config is valid")
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = RippleConfig::default();
        config.wave.damping = 1.2;
        let err = RippleEngine::new(config, Viewport::new(100.0, 100.0, 1.0)).unwrap_err();
        assert_eq!(err, ConfigError::Damping(1.2));
    }

    #[test]
    fn tick_steps_the_field_once() {
        let mut e = engine();
        let before = e.field().current_id();
        e.tick(Duration::from_millis(16));
        assert_ne!(e.field().current_id(), before);
        assert_eq!(e.field().steps(), 1);
        assert_eq!(e.frames(), 1);
    }

    #[test]
    fn idle_ticks_disturb_the_field() {
        let mut e = engine();
        for i in 0..30 {
            e.tick(Duration::from_millis(16 * i));
        }
        assert!(e.field().energy() > 0.0);
    }

    #[test]
    fn same_aspect_resize_still_clears_field() {
        let mut e = engine();
        for i in 0..10 {
            e.tick(Duration::from_millis(16 * i));
        }
        assert!(e.field().energy() > 0.0);

        assert!(!e.resize(Viewport::new(3840.0, 2160.0, 2.0)));
        assert_eq!(e.field().width(), e.grid().sim_width);
        assert_eq!(e.field().steps(), 0);
        assert_eq!(e.field().energy(), 0.0);
    }

    #[test]
    fn set_config_regrids() {
        let mut e = engine();
        e.set_config(RippleConfig::preset(Preset::Classic)).unwrap();
        assert_eq!(e.grid().display_rows, 180);
        assert_eq!(e.grid().display_cols, 320);

        let mut bad = *e.config();
        bad.smoothing.position = 0.0;
        assert!(e.set_config(bad).is_err());
        assert_eq!(e.config().preset, Preset::Classic);
    }

    #[test]
    fn input_reaches_pointer() {
        let mut e = engine();
        e.handle_input(PointerEvent::primary(PointerPhase::Down, Vec2::new(960.0, 540.0), 0.0));
        assert!(e.pointer().is_active());
        assert_eq!(e.pointer().click_boost(), 1.0);
    }

    #[test]
    fn pixel_ratio_is_clamped() {
        let mut e = engine();
        e.resize(Viewport::new(1920.0, 1080.0, 3.0));
        assert_eq!(e.pixel_ratio(), 2.0);
    }

    #[test]
    fn pixel_ratio_follows_scale_only_changes() {
        let mut e = engine();
        assert_eq!(e.pixel_ratio(), 1.0);
        e.resize(Viewport::new(1920.0, 1080.0, 1.5));
        assert_eq!(e.pixel_ratio(), 1.5);
        assert_eq!(e.viewport().device_pixel_ratio, 1.5);
    }
}
