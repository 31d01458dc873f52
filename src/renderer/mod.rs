//! Rendering module
//!
//! Frames are described as plain [`DrawCommand`] lists so they can be built
//! and inspected without a browser. The Canvas 2D backend is wasm-only.

pub mod commands;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

pub use commands::{DrawCommand, build_frame};

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dRenderer;
