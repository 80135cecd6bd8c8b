//! Pointer-driven ripple field.
//!
//! A damped 2D wave equation runs on a double-buffered `(height, velocity)`
//! grid. Each frame a Gaussian splat is injected at the pointer (or at a slow
//! idle wander when no pointer is present), and a separate point grid samples
//! the heights for display. This crate holds everything except the GPU and
//! windowing side, which lives in `ripple-viewer`.

pub mod config;
pub mod driver;
pub mod encoding;
pub mod engine;
pub mod field;
pub mod grid;
pub mod pointer;

pub use config::{ConfigError, Preset, RippleConfig};
pub use driver::{FrameParams, MotionDriver};
pub use encoding::{decode, encode, FieldEncoding};
pub use engine::RippleEngine;
pub use field::{BufferId, Cell, HeightField, Splat};
pub use grid::{GridConfig, Viewport};
pub use pointer::{Activity, PointerEvent, PointerPhase, PointerState};
