//! Turns pointer state and wall-clock time into per-frame splat and reveal
//! parameters, including the synthetic idle wander.

use crate::config::RippleConfig;
use crate::field::Splat;
use crate::pointer::{Activity, PointerState};
use glam::Vec2;

/// Everything the simulation step and the point renderer need for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub splat: Splat,
    pub activity: Activity,
    /// Center of the reveal mask, UV with y up.
    pub reveal_center: Vec2,
    pub reveal_radius: f32,
    pub reveal_softness: f32,
    /// When false, the renderer treats the reveal mask as 1 everywhere.
    pub reveal_enabled: bool,
    /// Global alpha multiplier in [0, 1].
    pub visibility: f32,
    pub height_amplitude: f32,
    /// Time multiplier for the row shimmer.
    pub row_speed: f32,
    /// Seconds since the engine started.
    pub time: f32,
}

/// Slow oscillators used while idle and while active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulses {
    /// Breathing term in [0.55, 1].
    pub idle: f32,
    /// Gentle modulation around 1 while a pointer is active.
    pub active: f32,
    /// Decaying oscillation left behind by the last pointer-down.
    pub click: f32,
}

impl Pulses {
    pub fn at(t: f32, seconds_since_click: f32, click_boost: f32, config: &RippleConfig) -> Self {
        let s = &config.splat;
        let idle = 0.55 + 0.45 * (0.5 + 0.5 * (t * config.idle.pulse_frequency).sin());
        let active = 1.0 - s.active_pulse_depth + s.active_pulse_depth * (t * s.active_pulse_frequency).sin();
        let click = click_boost * (0.7 + 0.3 * (seconds_since_click * s.click_frequency).sin());
        Self { idle, active, click }
    }
}

/// Smoothed presentation state that persists between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionDriver {
    visibility: f32,
    reveal_radius: f32,
}

impl MotionDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smoothed visibility before the render gain.
    pub fn visibility(&self) -> f32 {
        self.visibility
    }

    pub fn reveal_radius(&self) -> f32 {
        self.reveal_radius
    }

    /// Computes this frame's parameters. `time` is seconds since start on the
    /// same clock as pointer event timestamps.
    pub fn frame(&mut self, pointer: &PointerState, time: f64, config: &RippleConfig) -> FrameParams {
        let t = time as f32;
        let now_ms = time * 1000.0;
        let pulses = Pulses::at(
            t,
            pointer.seconds_since_click(now_ms),
            pointer.click_boost(),
            config,
        );
        let motion = config.motion_scale();
        let speed = pointer.speed();
        let active = pointer.is_active();
        let idle = &config.idle;
        let reveal = &config.reveal;
        let s = &config.splat;

        let wander = idle_position(t, config);
        let (visibility_target, reveal_target) = if active {
            (reveal.active_visibility, reveal.base_radius + speed * reveal.speed_gain)
        } else if idle.enabled {
            (idle.visibility * pulses.idle, idle.reveal * pulses.idle)
        } else {
            (reveal.active_visibility, 0.0)
        };

        let smoothing = &config.smoothing;
        self.visibility += (visibility_target - self.visibility) * smoothing.visibility;
        self.reveal_radius += (reveal_target - self.reveal_radius) * smoothing.reveal;

        let click_strength = pulses.click * s.click_strength;
        let click_radius = pulses.click * s.click_radius;

        let (splat, center) = if active {
            let splat = Splat {
                center: pointer.position(),
                offset: pointer.direction() * speed * s.drag,
                strength: (s.base_strength + speed * s.speed_strength) * motion * pulses.active + click_strength,
                radius: s.base_radius + speed * s.speed_radius + s.pulse_radius * pulses.active + click_radius,
            };
            (splat, pointer.position())
        } else if idle.enabled {
            let splat = Splat {
                center: wander,
                offset: Vec2::ZERO,
                strength: idle.strength * pulses.idle * motion + click_strength,
                radius: idle.radius + click_radius,
            };
            (splat, wander)
        } else {
            // Without an idle source only a fading click can still disturb the field.
            let splat = Splat {
                center: pointer.position(),
                offset: Vec2::ZERO,
                strength: click_strength,
                radius: s.base_radius + click_radius,
            };
            (splat, pointer.position())
        };

        let render = &config.render;
        FrameParams {
            splat: if splat.is_active() { splat } else { Splat::NONE },
            activity: pointer.activity(),
            reveal_center: center,
            reveal_radius: self.reveal_radius,
            reveal_softness: reveal.softness,
            reveal_enabled: reveal.enabled,
            visibility: (self.visibility * render.visibility_gain).min(1.0),
            height_amplitude: config.height_amplitude(speed),
            row_speed: motion
                * if active {
                    render.active_row_speed
                } else {
                    render.idle_row_speed
                },
            time: t,
        }
    }
}

/// Lissajous wander around the surface center.
pub fn idle_position(t: f32, config: &RippleConfig) -> Vec2 {
    let idle = &config.idle;
    let wobble = Vec2::new(
        (t * idle.wander_frequency.x).cos(),
        (t * idle.wander_frequency.y).sin(),
    );
    Vec2::splat(0.5) + wobble * idle.wander_amplitude * config.motion_scale()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::pointer::{PointerEvent, PointerPhase};

    const FRAME: f64 = 0.016;

    fn moving_pointer(config: &RippleConfig, px_per_frame: f32) -> PointerState {
        let mut p = PointerState::new(Vec2::new(1000.0, 1000.0));
        p.handle(
            &PointerEvent::primary(PointerPhase::Move, Vec2::new(500.0, 500.0), 0.0),
            &config.pointer,
        );
        p.handle(
            &PointerEvent::primary(PointerPhase::Move, Vec2::new(500.0 + px_per_frame, 500.0), 16.0),
            &config.pointer,
        );
        p
    }

    #[test]
    fn idle_field_stays_alive() {
        let config = RippleConfig::default();
        let pointer = PointerState::new(Vec2::new(800.0, 600.0));
        let mut driver = MotionDriver::new();

        let mut visibility = Vec::new();
        let mut reveal = Vec::new();
        for frame in 0..3750 {
            let params = driver.frame(&pointer, frame as f64 * FRAME, &config);
            assert!(params.visibility > 0.0 && params.visibility <= 1.0);
            assert!(params.reveal_radius > 0.0 && params.reveal_radius < 1.0);
            assert!(params.splat.is_active());
            visibility.push(params.visibility);
            reveal.push(params.reveal_radius);
        }

        // Second half of the minute: well past the initial fade-in.
        let range = |v: &[f32]| {
            let tail = &v[v.len() / 2..];
            let max = tail.iter().cloned().fold(f32::MIN, f32::max);
            let min = tail.iter().cloned().fold(f32::MAX, f32::min);
            max - min
        };
        assert!(range(&visibility) > 0.05);
        assert!(range(&reveal) > 0.02);
    }

    #[test]
    fn reduced_motion_keeps_idle_visible() {
        let config = RippleConfig::default().with_reduced_motion(true);
        let pointer = PointerState::new(Vec2::new(800.0, 600.0));
        let mut driver = MotionDriver::new();
        let mut params = driver.frame(&pointer, 0.0, &config);
        for frame in 1..600 {
            params = driver.frame(&pointer, frame as f64 * FRAME, &config);
        }
        assert!(params.visibility > 0.1);
        assert!(params.splat.strength > 0.0);
        assert!(params.splat.strength < config.idle.strength);
    }

    #[test]
    fn splat_grows_with_speed() {
        let config = RippleConfig::default();
        let mut previous: Option<Splat> = None;
        for px in [0.0, 2.0, 5.0, 10.0, 20.0, 40.0] {
            let pointer = moving_pointer(&config, px);
            let params = MotionDriver::new().frame(&pointer, 3.0, &config);
            assert_eq!(params.activity, Activity::Active);
            if let Some(prev) = previous {
                assert!(params.splat.strength >= prev.strength, "strength at {px}px");
                assert!(params.splat.radius >= prev.radius, "radius at {px}px");
            }
            previous = Some(params.splat);
        }
    }

    #[test]
    fn active_splat_is_dragged_along_motion() {
        let config = RippleConfig::default();
        let pointer = moving_pointer(&config, 16.0);
        let params = MotionDriver::new().frame(&pointer, 1.0, &config);
        assert!(params.splat.offset.x > 0.0);
        assert_eq!(params.splat.offset.y, 0.0);
    }

    #[test]
    fn idle_wander_stays_near_center() {
        let config = RippleConfig::default();
        for i in 0..1000 {
            let p = idle_position(i as f32 * 0.1, &config);
            assert!((p - Vec2::splat(0.5)).abs().cmple(config.idle.wander_amplitude + 1e-6).all());
        }
    }

    #[test]
    fn classic_idle_is_quiet_but_visible() {
        let config = RippleConfig::preset(Preset::Classic);
        let pointer = PointerState::new(Vec2::new(800.0, 600.0));
        let mut driver = MotionDriver::new();
        let mut params = driver.frame(&pointer, 0.0, &config);
        for frame in 1..200 {
            params = driver.frame(&pointer, frame as f64 * FRAME, &config);
        }
        assert_eq!(params.splat, Splat::NONE);
        assert!(!params.reveal_enabled);
        assert!(params.visibility > 0.9);
    }

    #[test]
    fn click_wave_adds_to_idle_splat() {
        let config = RippleConfig::default();
        let quiet = PointerState::new(Vec2::new(800.0, 600.0));
        let mut clicked = quiet.clone();
        clicked.handle(
            &PointerEvent::primary(PointerPhase::Down, Vec2::new(400.0, 300.0), 1000.0),
            &config.pointer,
        );
        clicked.handle(
            &PointerEvent::primary(PointerPhase::Leave, Vec2::new(400.0, 300.0), 1001.0),
            &config.pointer,
        );

        let a = MotionDriver::new().frame(&quiet, 1.1, &config);
        let b = MotionDriver::new().frame(&clicked, 1.1, &config);
        assert_eq!(b.activity, Activity::Idle);
        assert!(b.splat.strength > a.splat.strength);
        assert!(b.splat.radius > a.splat.radius);
    }
}
