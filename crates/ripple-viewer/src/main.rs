//! Entry point for the ripple viewer.

use anyhow::Result;
use clap::Parser;
use ripple_viewer::{app::App, config::Config};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Ripple")
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    // A platform that cannot host the effect gets an empty window, not an error.
    let mut app = match pollster::block_on(App::initialize(window.clone(), &config)) {
        Ok(app) => Some(app),
        Err(err) if err.is_unsupported() => {
            log::warn!("ripple field unavailable, continuing without it: {err}");
            None
        }
        Err(err) => return Err(err.into()),
    };

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                let consumed = app
                    .as_mut()
                    .is_some_and(|app| app.handle_event(&window, &event));
                if consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        if let Some(app) = app.take() {
                            app.dispose();
                        }
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
                    {
                        if let Some(app) = app.take() {
                            app.dispose();
                        }
                        elwt.exit();
                    }
                    WindowEvent::RedrawRequested => {
                        let Some(active) = app.as_mut() else {
                            return;
                        };
                        match active.render(&window) {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                let size = active.renderer.gfx.size;
                                active.resize(&window, size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("WGPU out of memory - exiting.");
                                if let Some(app) = app.take() {
                                    app.dispose();
                                }
                                elwt.exit();
                            }
                            Err(e) => log::warn!("Render error: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                // Request a redraw each frame; Fifo presentation paces the loop.
                if app.is_some() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}
