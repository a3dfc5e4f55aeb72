//! GPU rendering for the fractal viewer: the wgpu engine, the compiled
//! program cache, uniform staging, the capture loop, and the interactive
//! window.

pub mod binder;
pub mod cache;
pub mod capture;
pub mod engine;
pub mod types;
pub mod window;

pub use capture::{run_capture, CaptureError, CAPTURE_FPS};
pub use engine::{encode_png, Engine, ShaderBuildError};
pub use types::{EngineMode, EngineOptions, FrameSnapshot};
pub use window::{run_viewer, ViewerConfig};
