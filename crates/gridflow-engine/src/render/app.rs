//! Windowed application runner.
//!
//! Provides [`run_windowed`], which opens a winit window and draws either
//! the static scaffold scene or a live simulation. A simulation advances one
//! tick per `fixed_dt` of wall time, independent of the display refresh
//! rate; every redraw renders the latest state.
//!
//! This module is feature-gated behind `renderer`.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use super::renderer::SceneRenderer;
use super::scene::{scaffold_scene, simulation_scene, Scene};
use crate::tick::TickLoop;

/// Ticks allowed per frame when catching up after a stall.
const MAX_CATCH_UP_TICKS: u32 = 5;

/// What the window shows.
pub enum WindowContent {
    /// The placeholder car on a dark background. Nothing ticks.
    Scaffold,
    /// A running traffic simulation.
    Simulation(TickLoop),
}

impl WindowContent {
    /// Build the scene for a `width` x `height` surface.
    pub fn scene(&self, width: u32, height: u32) -> Scene {
        match self {
            WindowContent::Scaffold => scaffold_scene(width, height),
            WindowContent::Simulation(tick_loop) => {
                simulation_scene(tick_loop.simulator(), width, height)
            }
        }
    }
}

/// Open a window and run until it is closed or Escape is pressed.
///
/// # Errors
///
/// Returns an error if the event loop cannot be created, or if the window or
/// renderer fails to initialize.
pub fn run_windowed(
    content: WindowContent,
    window_title: &str,
    width: u32,
    height: u32,
) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App {
        content,
        title: window_title.to_owned(),
        width,
        height,
        renderer: None,
        last_tick: Instant::now(),
        init_failed: false,
    };

    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize windowed renderer (see logs for details)"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// The winit application handler.
///
/// Winit 0.30 requires the window to be created inside
/// `ApplicationHandler::resumed`, so the renderer starts out as `None`.
struct App {
    content: WindowContent,
    title: String,
    width: u32,
    height: u32,
    renderer: Option<SceneRenderer>,
    last_tick: Instant,
    /// Set if window or renderer creation failed, so `run_windowed` can
    /// return an error after the event loop exits.
    init_failed: bool,
}

impl App {
    /// Run however many ticks of wall time have elapsed since the last one.
    fn advance(&mut self) {
        let WindowContent::Simulation(tick_loop) = &mut self.content else {
            return;
        };
        let interval = tick_loop.tick_interval();
        let mut ticks = 0;
        while self.last_tick.elapsed() >= interval {
            if ticks == MAX_CATCH_UP_TICKS {
                // Drop the backlog rather than spiral.
                self.last_tick = Instant::now();
                break;
            }
            tick_loop.tick();
            self.last_tick += interval;
            ticks += 1;
        }
    }

    fn shutdown(&self, event_loop: &ActiveEventLoop) {
        match &self.content {
            WindowContent::Simulation(tick_loop) => tracing::info!(
                ticks = tick_loop.tick_count(),
                arrivals = tick_loop.simulator().total_arrivals(),
                "window closed -- shutting down"
            ),
            WindowContent::Scaffold => tracing::info!("window closed -- shutting down"),
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(self.width, self.height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!(error = %e, "failed to create window -- exiting");
                self.init_failed = true;
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(SceneRenderer::new(window.clone())) {
            Ok(renderer) => {
                tracing::info!(
                    width = self.width,
                    height = self.height,
                    "window created successfully"
                );
                // Kick off the first frame on backends that don't send an
                // initial RedrawRequested.
                window.request_redraw();
                self.last_tick = Instant::now();
                self.renderer = Some(renderer);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize renderer -- exiting");
                self.init_failed = true;
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.renderer.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!(
                    width = new_size.width,
                    height = new_size.height,
                    "window resized"
                );
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.advance();

                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                let (width, height) = renderer.size();
                let scene = self.content.scene(width, height);

                match renderer.render(&scene) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = renderer.window().inner_size();
                        renderer.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory -- exiting");
                        event_loop.exit();
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "surface error during render");
                    }
                }

                renderer.window().request_redraw();
            }
            _ => {}
        }
    }
}
