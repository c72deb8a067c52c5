//! # holobox
//!
//! An interactive 3D particle demo for lenticular displays: a glowing
//! player sphere roams a sealed box and stirs hundreds of rigid-body
//! points, driven by hand tracking, a gamepad, or the keyboard, and
//! rendered flat or as a stereo quilt.
//!
//! The demo is deliberately thin glue. Rigid-body simulation is rapier3d's
//! job, rendering is wgpu's, windowing is winit's; this crate wires scene
//! setup, input mapping, and the per-frame transfer of body transforms into
//! instance data.
//!
//! ## Quick Start
//!
//! ```ignore
//! use holobox::prelude::*;
//!
//! fn main() -> Result<(), DemoError> {
//!     Demo::new()
//!         .with_point_count(500)
//!         .with_render_mode(RenderMode::Flat)
//!         .run()
//! }
//! ```
//!
//! ## Input priority
//!
//! Sources are tried in order each frame; an absent device silently falls
//! through to the next:
//!
//! 1. **Hand** - palm position drives the player kinematically, grab
//!    strength attracts (fist) or repels (open hand) the points.
//! 2. **Gamepad** - stick axes push the player with a force.
//! 3. **Keyboard** - WASD moves in the horizontal plane, R/F up and down.
//!
//! ## Stereo quilts
//!
//! In quilt mode the scene renders once per view, fanned across a
//! horizontal cone with sheared projections, into one tiled texture. The
//! quilt is what lenticular display pipelines consume; panel-specific
//! interleaving happens outside this crate. Pass `--flat` to skip the
//! stereo path entirely.

pub mod color;
mod demo;
pub mod error;
pub mod gpu;
pub mod input;
pub mod physics;
pub mod scene;
pub mod time;

pub use demo::{Demo, RenderMode};
pub use error::{DemoError, GpuError};
pub use glam::{Vec2, Vec3, Vec4};
pub use scene::Scene;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::demo::{Demo, RenderMode};
    pub use crate::error::{DemoError, GpuError};
    pub use crate::gpu::QuiltLayout;
    pub use crate::input::{Drive, InputRig};
    pub use crate::scene::Scene;
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
}
