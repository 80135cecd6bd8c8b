//! Maps winit window events onto the engine's pointer events.

use glam::Vec2;
use ripple::{PointerEvent, PointerPhase};
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

/// Tracks the state winit spreads over several events: the last cursor
/// position (button events carry none), the scale factor, and which touch
/// counts as the primary one.
#[derive(Debug, Clone)]
pub struct PointerTranslator {
    scale_factor: f64,
    cursor: Option<Vec2>,
    primary_touch: Option<u64>,
}

impl PointerTranslator {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            cursor: None,
            primary_touch: None,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Returns the pointer event for `event`, if it is one. `time_ms` is the
    /// timestamp on the engine's clock.
    pub fn translate(&mut self, event: &WindowEvent, time_ms: f64) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let p = self.logical(position.x, position.y);
                self.cursor = Some(p);
                Some(PointerEvent::primary(PointerPhase::Move, p, time_ms))
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let p = self.cursor?;
                let phase = match state {
                    ElementState::Pressed => PointerPhase::Down,
                    ElementState::Released => PointerPhase::Up,
                };
                Some(PointerEvent::primary(phase, p, time_ms))
            }
            WindowEvent::CursorLeft { .. } => {
                let p = self.cursor.take().unwrap_or(Vec2::ZERO);
                Some(PointerEvent::primary(PointerPhase::Leave, p, time_ms))
            }
            WindowEvent::Touch(touch) => Some(self.touch(touch, time_ms)),
            _ => None,
        }
    }

    fn touch(&mut self, touch: &Touch, time_ms: f64) -> PointerEvent {
        if touch.phase == TouchPhase::Started && self.primary_touch.is_none() {
            self.primary_touch = Some(touch.id);
        }
        let is_primary = self.primary_touch == Some(touch.id);

        let phase = match touch.phase {
            TouchPhase::Started => PointerPhase::Down,
            TouchPhase::Moved => PointerPhase::Move,
            TouchPhase::Ended => PointerPhase::Up,
            TouchPhase::Cancelled => PointerPhase::Cancel,
        };
        if is_primary && matches!(touch.phase, TouchPhase::Ended | TouchPhase::Cancelled) {
            self.primary_touch = None;
        }

        PointerEvent {
            position: self.logical(touch.location.x, touch.location.y),
            is_primary,
            phase,
            time_ms,
        }
    }

    fn logical(&self, x: f64, y: f64) -> Vec2 {
        let s = self.scale_factor.max(f64::EPSILON);
        Vec2::new((x / s) as f32, (y / s) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only used as an opaque id in synthetic events.
        unsafe { DeviceId::dummy() }
    }

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn button(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id,
        })
    }

    #[test]
    fn cursor_positions_are_logical() {
        let mut t = PointerTranslator::new(2.0);
        let e = t.translate(&moved(200.0, 100.0), 5.0).unwrap();
        assert_eq!(e.phase, PointerPhase::Move);
        assert_eq!(e.position, Vec2::new(100.0, 50.0));
        assert_eq!(e.time_ms, 5.0);
        assert!(e.is_primary);
    }

    #[test]
    fn left_button_uses_last_cursor_position() {
        let mut t = PointerTranslator::new(1.0);
        assert!(t
            .translate(&button(ElementState::Pressed, MouseButton::Left), 0.0)
            .is_none());

        t.translate(&moved(30.0, 40.0), 1.0);
        let down = t
            .translate(&button(ElementState::Pressed, MouseButton::Left), 2.0)
            .unwrap();
        assert_eq!(down.phase, PointerPhase::Down);
        assert_eq!(down.position, Vec2::new(30.0, 40.0));

        let up = t
            .translate(&button(ElementState::Released, MouseButton::Left), 3.0)
            .unwrap();
        assert_eq!(up.phase, PointerPhase::Up);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut t = PointerTranslator::new(1.0);
        t.translate(&moved(30.0, 40.0), 1.0);
        assert!(t
            .translate(&button(ElementState::Pressed, MouseButton::Right), 2.0)
            .is_none());
    }

    #[test]
    fn cursor_left_becomes_leave() {
        let mut t = PointerTranslator::new(1.0);
        t.translate(&moved(30.0, 40.0), 1.0);
        let e = t
            .translate(&WindowEvent::CursorLeft { device_id: device() }, 2.0)
            .unwrap();
        assert_eq!(e.phase, PointerPhase::Leave);
    }

    #[test]
    fn first_touch_is_primary_until_it_ends() {
        let mut t = PointerTranslator::new(1.0);
        let a = t.translate(&touch(7, TouchPhase::Started, 10.0, 10.0), 0.0).unwrap();
        let b = t.translate(&touch(9, TouchPhase::Started, 50.0, 50.0), 1.0).unwrap();
        assert!(a.is_primary && a.phase == PointerPhase::Down);
        assert!(!b.is_primary);

        let end = t.translate(&touch(7, TouchPhase::Ended, 12.0, 10.0), 2.0).unwrap();
        assert!(end.is_primary && end.phase == PointerPhase::Up);

        let c = t.translate(&touch(9, TouchPhase::Moved, 55.0, 50.0), 3.0).unwrap();
        assert!(!c.is_primary);
        let d = t.translate(&touch(11, TouchPhase::Started, 5.0, 5.0), 4.0).unwrap();
        assert!(d.is_primary);
    }

    #[test]
    fn keyboard_and_other_events_pass_through() {
        let mut t = PointerTranslator::new(1.0);
        assert!(t.translate(&WindowEvent::Focused(true), 0.0).is_none());
    }
}
