//! Windowed host for the ripple field.
//!
//! The simulation runs on the CPU in the `ripple` crate; this crate uploads the
//! current height buffer to a texture every frame and draws the display grid as
//! instanced sprites with wgpu, with an optional egui overlay.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod renderer;
pub mod ui;
