//! Rendering: GPU-free scene extraction plus a wgpu/winit window.
//!
//! [`scene`] is always compiled; it turns simulator state into colored
//! shapes and triangles and can be tested without a GPU. The [`renderer`]
//! and [`app`] modules are feature-gated behind `renderer`; without the
//! feature they compile to nothing.

pub mod scene;

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod renderer;

#[cfg(feature = "renderer")]
pub use app::{run_windowed, WindowContent};
#[cfg(feature = "renderer")]
pub use renderer::SceneRenderer;
pub use scene::{Camera2D, DrawCommand, Scene, Shape};
