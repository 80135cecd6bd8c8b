//! Tuning surface for the ripple field.
//!
//! Every constant the simulation, the pointer driver and the point-cloud shading
//! read lives here. The page variants of the effect differ only in these
//! numbers, so they are expressed as [`Preset`]s of one [`RippleConfig`]
//! rather than separate code paths.

use glam::Vec2;
use thiserror::Error;

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Pointer reveal mask, idle wander, click pulses. Dense 230-row grid.
    #[default]
    Reveal,
    /// Flat field that only reacts while a pointer is active. 180-row grid.
    Classic,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("damping must lie strictly between 0 and 1, got {0}")]
    Damping(f32),
    #[error("display grid needs at least 2 rows and 2 columns")]
    DisplayGrid,
    #[error("{name} range is empty: [{min}, {max}]")]
    EmptyRange {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("rate `{name}` must lie in (0, 1], got {value}")]
    Rate { name: &'static str, value: f32 },
    #[error("splat radius must be positive, got {0}")]
    Radius(f32),
}

/// Bounds used when deriving grid resolutions from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLimits {
    /// Fixed number of point rows.
    pub display_rows: u32,
    pub min_cols: u32,
    pub max_cols: u32,
    /// Length of the short simulation axis before clamping.
    pub sim_base: u32,
    pub sim_min: u32,
    pub sim_max: u32,
    pub max_pixel_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveTuning {
    pub damping: f32,
    /// Used instead of `damping` under reduced motion: slower, calmer decay.
    pub reduced_damping: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatTuning {
    pub base_strength: f32,
    pub speed_strength: f32,
    pub base_radius: f32,
    pub speed_radius: f32,
    /// Depth of the slow "active" breathing pulse (0 disables it).
    pub active_pulse_depth: f32,
    pub active_pulse_frequency: f32,
    /// Radius added per unit of active pulse.
    pub pulse_radius: f32,
    /// Splat center offset along the movement direction, per unit of speed.
    pub drag: f32,
    pub click_strength: f32,
    pub click_radius: f32,
    /// Angular frequency (rad/s) of the click oscillation.
    pub click_frequency: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleTuning {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub reveal: f32,
    pub visibility: f32,
    pub pulse_frequency: f32,
    pub wander_amplitude: Vec2,
    pub wander_frequency: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTuning {
    pub enabled: bool,
    pub base_radius: f32,
    pub speed_gain: f32,
    pub softness: f32,
    pub active_visibility: f32,
}

/// Per-frame exponential smoothing rates, all in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothing {
    pub position: f32,
    pub speed_decay: f32,
    pub visibility: f32,
    pub reveal: f32,
    pub click_decay: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTuning {
    /// Upper bound on pointer speed, in logical pixels per millisecond.
    pub max_speed: f32,
    pub min_event_interval_ms: f64,
    /// Movements shorter than this (logical px) keep the previous direction.
    pub direction_noise_floor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTuning {
    /// Point diameter in logical pixels before the device pixel ratio.
    pub point_size: f32,
    pub size_base: f32,
    pub size_height_gain: f32,
    pub size_reveal_gain: f32,
    pub height_amplitude: f32,
    pub reduced_height_amplitude: f32,
    pub height_speed_gain: f32,
    pub reduced_height_speed_gain: f32,
    /// Low and high brightness, mixed by the top glow.
    pub brightness: [f32; 2],
    pub color: [f32; 3],
    pub visibility_gain: f32,
    pub row_wave_amplitude: f32,
    pub row_wave_frequency: f32,
    pub active_row_speed: f32,
    pub idle_row_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleConfig {
    pub preset: Preset,
    /// Sampled once at startup from the user's motion preference.
    pub reduced_motion: bool,
    /// Global amplitude/speed scale applied under reduced motion.
    pub reduced_motion_scale: f32,
    pub grid: GridLimits,
    pub wave: WaveTuning,
    pub splat: SplatTuning,
    pub idle: IdleTuning,
    pub reveal: RevealTuning,
    pub smoothing: Smoothing,
    pub pointer: PointerTuning,
    pub render: RenderTuning,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self::preset(Preset::Reveal)
    }
}

impl RippleConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Reveal => Self::reveal(),
            Preset::Classic => Self::classic(),
        }
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    fn reveal() -> Self {
        Self {
            preset: Preset::Reveal,
            reduced_motion: false,
            reduced_motion_scale: 0.35,
            grid: GridLimits {
                display_rows: 230,
                min_cols: 180,
                max_cols: 520,
                sim_base: 256,
                sim_min: 192,
                sim_max: 512,
                max_pixel_ratio: 2.0,
            },
            wave: WaveTuning {
                damping: 0.986,
                reduced_damping: 0.992,
            },
            splat: SplatTuning {
                base_strength: 0.004,
                speed_strength: 0.12,
                base_radius: 0.045,
                speed_radius: 0.05,
                active_pulse_depth: 0.08,
                active_pulse_frequency: 0.6,
                pulse_radius: 0.01,
                drag: 0.11,
                click_strength: 0.025,
                click_radius: 0.08,
                click_frequency: 6.5,
            },
            idle: IdleTuning {
                enabled: true,
                strength: 0.003,
                radius: 0.05,
                reveal: 0.08,
                visibility: 0.22,
                pulse_frequency: 0.55,
                wander_amplitude: Vec2::new(0.08, 0.07),
                wander_frequency: Vec2::new(0.22, 0.18),
            },
            reveal: RevealTuning {
                enabled: true,
                base_radius: 0.12,
                speed_gain: 0.1,
                softness: 2.2,
                active_visibility: 0.9,
            },
            smoothing: Smoothing {
                position: 0.14,
                speed_decay: 0.06,
                visibility: 0.07,
                reveal: 0.08,
                click_decay: 0.06,
            },
            pointer: PointerTuning {
                max_speed: 1.6,
                min_event_interval_ms: 16.0,
                direction_noise_floor: 0.001,
            },
            render: RenderTuning {
                point_size: 6.0,
                size_base: 1.15,
                size_height_gain: 1.0,
                size_reveal_gain: 0.6,
                height_amplitude: 0.22,
                reduced_height_amplitude: 0.14,
                height_speed_gain: 0.18,
                reduced_height_speed_gain: 0.06,
                brightness: [0.4, 1.25],
                color: [0.98, 0.98, 0.98],
                visibility_gain: 1.05,
                row_wave_amplitude: 0.002,
                row_wave_frequency: 0.06,
                active_row_speed: 0.35,
                idle_row_speed: 0.6,
            },
        }
    }

    fn classic() -> Self {
        let base = Self::reveal();
        Self {
            preset: Preset::Classic,
            grid: GridLimits {
                display_rows: 180,
                min_cols: 160,
                max_cols: 420,
                ..base.grid
            },
            wave: WaveTuning {
                damping: 0.985,
                reduced_damping: 0.993,
            },
            splat: SplatTuning {
                base_strength: 0.015,
                speed_strength: 0.06,
                base_radius: 0.04,
                speed_radius: 0.03,
                active_pulse_depth: 0.0,
                pulse_radius: 0.0,
                drag: 0.035,
                click_strength: 0.0,
                click_radius: 0.0,
                ..base.splat
            },
            idle: IdleTuning {
                enabled: false,
                ..base.idle
            },
            reveal: RevealTuning {
                enabled: false,
                active_visibility: 1.0,
                ..base.reveal
            },
            smoothing: Smoothing {
                position: 0.18,
                speed_decay: 0.08,
                visibility: 0.08,
                ..base.smoothing
            },
            render: RenderTuning {
                point_size: 2.1,
                size_base: 1.0,
                size_height_gain: 0.9,
                size_reveal_gain: 0.0,
                reduced_height_amplitude: 0.12,
                height_speed_gain: 0.0,
                reduced_height_speed_gain: 0.0,
                brightness: [0.3, 1.0],
                color: [0.97, 0.97, 0.97],
                visibility_gain: 1.0,
                row_wave_amplitude: 0.0,
                ..base.render
            },
            ..base
        }
    }

    /// Damping factor in effect for the current motion preference.
    pub fn damping(&self) -> f32 {
        if self.reduced_motion {
            self.wave.reduced_damping
        } else {
            self.wave.damping
        }
    }

    /// 1 normally, `reduced_motion_scale` under reduced motion.
    pub fn motion_scale(&self) -> f32 {
        if self.reduced_motion {
            self.reduced_motion_scale
        } else {
            1.0
        }
    }

    /// Vertical point displacement per unit height at the given pointer speed.
    pub fn height_amplitude(&self, speed: f32) -> f32 {
        let r = &self.render;
        if self.reduced_motion {
            r.reduced_height_amplitude + speed * r.reduced_height_speed_gain
        } else {
            r.height_amplitude + speed * r.height_speed_gain
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for damping in [self.wave.damping, self.wave.reduced_damping] {
            if !(damping > 0.0 && damping < 1.0) {
                return Err(ConfigError::Damping(damping));
            }
        }

        let g = &self.grid;
        if g.display_rows < 2 || g.max_cols < 2 {
            return Err(ConfigError::DisplayGrid);
        }
        for (name, min, max) in [
            ("display columns", g.min_cols, g.max_cols),
            ("simulation size", g.sim_min, g.sim_max),
        ] {
            if min == 0 || min > max {
                return Err(ConfigError::EmptyRange { name, min, max });
            }
        }

        let s = &self.smoothing;
        for (name, value) in [
            ("position", s.position),
            ("speed_decay", s.speed_decay),
            ("visibility", s.visibility),
            ("reveal", s.reveal),
            ("click_decay", s.click_decay),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Rate { name, value });
            }
        }

        for radius in [self.splat.base_radius, self.idle.radius] {
            if radius <= 0.0 {
                return Err(ConfigError::Radius(radius));
            }
        }

        Ok(())
    }
}
