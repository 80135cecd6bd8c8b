//! Pointer tracking: raw events in, smoothed normalized state out.
//!
//! Events only set targets. Smoothing and decay happen once per frame in
//! [`PointerState::advance`], so the response is independent of how often the
//! host delivers pointer events.

use crate::config::{PointerTuning, Smoothing};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Move,
    Down,
    Up,
    Cancel,
    Leave,
}

/// One pointer sample as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Surface-relative position in logical pixels, origin top-left, y down.
    pub position: Vec2,
    pub is_primary: bool,
    pub phase: PointerPhase,
    /// Host timestamp in milliseconds; only differences are used.
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn primary(phase: PointerPhase, position: Vec2, time_ms: f64) -> Self {
        Self {
            position,
            is_primary: true,
            phase,
            time_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// No primary pointer over the surface; the idle wander drives the field.
    #[default]
    Idle,
    /// A primary pointer is inside the surface and has not been released.
    Active,
}

#[derive(Debug, Clone)]
pub struct PointerState {
    surface: Vec2,
    activity: Activity,
    inside: bool,
    /// Smoothed position, normalized to [0, 1]^2 with y up.
    position: Vec2,
    target: Vec2,
    /// Unit vector of recent movement, y up.
    direction: Vec2,
    /// Logical pixels per millisecond, clamped.
    speed: f32,
    click_boost: f32,
    click_time_ms: f64,
    last_raw: Option<Vec2>,
    last_time_ms: f64,
}

impl PointerState {
    pub fn new(surface: Vec2) -> Self {
        Self {
            surface,
            activity: Activity::Idle,
            inside: false,
            position: Vec2::splat(0.5),
            target: Vec2::splat(0.5),
            direction: Vec2::ZERO,
            speed: 0.0,
            click_boost: 0.0,
            click_time_ms: 0.0,
            last_raw: None,
            last_time_ms: 0.0,
        }
    }

    /// Surface size in logical pixels.
    pub fn set_surface(&mut self, surface: Vec2) {
        self.surface = surface;
    }

    #[inline]
    pub fn activity(&self) -> Activity {
        self.activity
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.activity == Activity::Active
    }

    /// Whether the last primary sample landed inside the surface.
    #[inline]
    pub fn inside(&self) -> bool {
        self.inside
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn click_boost(&self) -> f32 {
        self.click_boost
    }

    /// Seconds between the last primary pointer-down and `now_ms`.
    #[inline]
    pub fn seconds_since_click(&self, now_ms: f64) -> f32 {
        ((now_ms - self.click_time_ms) / 1000.0) as f32
    }

    pub fn handle(&mut self, event: &PointerEvent, tuning: &PointerTuning) {
        if !event.is_primary {
            return;
        }

        match event.phase {
            PointerPhase::Down => {
                self.click_boost = 1.0;
                self.click_time_ms = event.time_ms;
                self.track(event, tuning);
            }
            PointerPhase::Move => self.track(event, tuning),
            PointerPhase::Up => {
                self.inside = self.normalize(event.position).is_some();
                self.activity = activity_for(self.inside);
            }
            PointerPhase::Cancel | PointerPhase::Leave => {
                self.inside = false;
                self.activity = Activity::Idle;
            }
        }
    }

    /// Per-frame smoothing toward the latest sample, plus speed and click decay.
    pub fn advance(&mut self, smoothing: &Smoothing) {
        self.position = self.position.lerp(self.target, smoothing.position);
        self.speed += (0.0 - self.speed) * smoothing.speed_decay;
        self.click_boost += (0.0 - self.click_boost) * smoothing.click_decay;
    }

    fn track(&mut self, event: &PointerEvent, tuning: &PointerTuning) {
        let Some(normalized) = self.normalize(event.position) else {
            self.inside = false;
            self.activity = Activity::Idle;
            return;
        };
        self.inside = true;
        self.activity = Activity::Active;
        self.target = normalized;

        let dt = (event.time_ms - self.last_time_ms).max(tuning.min_event_interval_ms);
        let delta = self
            .last_raw
            .map_or(Vec2::ZERO, |last| event.position - last);
        self.last_raw = Some(event.position);
        self.last_time_ms = event.time_ms;

        let distance = delta.length();
        self.speed = (distance / dt as f32).min(tuning.max_speed);
        if distance > tuning.direction_noise_floor {
            // Screen y grows downward; field y grows upward.
            self.direction = Vec2::new(delta.x, -delta.y) / distance;
        }
    }

    /// Maps a surface position to y-up UV, or `None` outside the surface.
    fn normalize(&self, position: Vec2) -> Option<Vec2> {
        let size = self.surface.max(Vec2::ONE);
        let uv = Vec2::new(position.x / size.x, 1.0 - position.y / size.y);
        let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
        inside.then_some(uv)
    }
}

#[inline]
fn activity_for(inside: bool) -> Activity {
    if inside {
        Activity::Active
    } else {
        Activity::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RippleConfig;

    fn setup() -> (PointerState, RippleConfig) {
        (PointerState::new(Vec2::new(800.0, 600.0)), RippleConfig::default())
    }

    fn ev(phase: PointerPhase, x: f32, y: f32, t: f64) -> PointerEvent {
        PointerEvent::primary(phase, Vec2::new(x, y), t)
    }

    #[test]
    fn enter_then_leave_toggles_activity() {
        let (mut p, cfg) = setup();
        assert_eq!(p.activity(), Activity::Idle);

        p.handle(&ev(PointerPhase::Move, 400.0, 300.0, 0.0), &cfg.pointer);
        assert_eq!(p.activity(), Activity::Active);

        p.handle(&ev(PointerPhase::Leave, 400.0, 300.0, 5.0), &cfg.pointer);
        assert_eq!(p.activity(), Activity::Idle);
    }

    #[test]
    fn secondary_pointers_are_ignored() {
        let (mut p, cfg) = setup();
        let mut e = ev(PointerPhase::Down, 400.0, 300.0, 0.0);
        e.is_primary = false;
        p.handle(&e, &cfg.pointer);
        assert_eq!(p.activity(), Activity::Idle);
        assert_eq!(p.click_boost(), 0.0);
    }

    #[test]
    fn moving_outside_deactivates() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 100.0, 100.0, 0.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Move, 900.0, 100.0, 20.0), &cfg.pointer);
        assert!(!p.is_active());
    }

    #[test]
    fn release_keeps_activity_only_inside() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Down, 100.0, 100.0, 0.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Up, 120.0, 100.0, 30.0), &cfg.pointer);
        assert!(p.is_active());

        p.handle(&ev(PointerPhase::Down, 100.0, 100.0, 60.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Up, 100.0, -40.0, 90.0), &cfg.pointer);
        assert!(!p.is_active());
    }

    #[test]
    fn cancel_deactivates() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 100.0, 100.0, 0.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Cancel, 100.0, 100.0, 10.0), &cfg.pointer);
        assert_eq!(p.activity(), Activity::Idle);
    }

    #[test]
    fn direction_is_y_up_and_unit_length() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 100.0, 300.0, 0.0), &cfg.pointer);
        // Moving up the screen (y decreasing) is +y in field space.
        p.handle(&ev(PointerPhase::Move, 100.0, 290.0, 16.0), &cfg.pointer);
        assert!((p.direction() - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn tiny_moves_keep_previous_direction() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 100.0, 300.0, 0.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Move, 110.0, 300.0, 16.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Move, 110.0, 300.0001, 32.0), &cfg.pointer);
        assert!((p.direction() - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn speed_uses_minimum_interval_and_clamps() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 100.0, 100.0, 0.0), &cfg.pointer);
        // 8 px in 2 ms, but the interval floor is 16 ms.
        p.handle(&ev(PointerPhase::Move, 108.0, 100.0, 2.0), &cfg.pointer);
        assert!((p.speed() - 0.5).abs() < 1e-6);

        p.handle(&ev(PointerPhase::Move, 700.0, 100.0, 20.0), &cfg.pointer);
        assert_eq!(p.speed(), cfg.pointer.max_speed);
    }

    #[test]
    fn first_sample_has_no_speed() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 700.0, 500.0, 1000.0), &cfg.pointer);
        assert_eq!(p.speed(), 0.0);
    }

    #[test]
    fn position_is_smoothed_per_frame() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 800.0, 0.0, 0.0), &cfg.pointer);
        assert_eq!(p.position(), Vec2::splat(0.5));

        p.advance(&cfg.smoothing);
        let expected = 0.5 + 0.5 * cfg.smoothing.position;
        assert!((p.position().x - expected).abs() < 1e-6);
        assert!((p.position().y - expected).abs() < 1e-6);

        for _ in 0..200 {
            p.advance(&cfg.smoothing);
        }
        assert!((p.position() - Vec2::ONE).length() < 1e-4);
    }

    #[test]
    fn speed_decays_smoothly_after_leaving() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Move, 400.0, 300.0, 0.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Move, 420.0, 300.0, 16.0), &cfg.pointer);
        p.handle(&ev(PointerPhase::Leave, 420.0, 300.0, 17.0), &cfg.pointer);

        let mut last = p.speed();
        assert!(last > 0.0);
        for _ in 0..120 {
            p.advance(&cfg.smoothing);
            let s = p.speed();
            assert!(s.is_finite() && s >= 0.0 && s <= last);
            assert!(last - s <= last * cfg.smoothing.speed_decay + 1e-7);
            last = s;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn click_boost_decays_geometrically_even_outside() {
        let (mut p, cfg) = setup();
        p.handle(&ev(PointerPhase::Down, 400.0, 300.0, 0.0), &cfg.pointer);
        assert_eq!(p.click_boost(), 1.0);

        let r = 1.0 - cfg.smoothing.click_decay;
        for t in 1..=40 {
            if t == 10 {
                p.handle(&ev(PointerPhase::Move, 2000.0, 300.0, 160.0), &cfg.pointer);
                assert!(!p.is_active());
            }
            p.advance(&cfg.smoothing);
            assert!((p.click_boost() - r.powi(t)).abs() < 1e-5, "tick {t}");
        }
    }
}
