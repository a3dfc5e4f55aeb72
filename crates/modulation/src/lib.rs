//! Parameter modulation for the fractal renderer.
//!
//! Everything here is CPU-side and GPU-free: the slider/live/anchor
//! parameter model, pointer smoothing with pause/freeze semantics,
//! additive LFOs, camera state, and the cosine palette catalog. The
//! renderer reads live values out of a [`Modulator`] once per frame.

pub mod camera;
pub mod lfo;
pub mod palette;
pub mod params;
pub mod pipeline;
pub mod pointer;

pub use camera::CameraState;
pub use lfo::{Lfo, LfoBank};
pub use palette::{Palette, PaletteState, PALETTES};
pub use params::ParameterSet;
pub use pipeline::Modulator;
pub use pointer::{Axis, AxisBindings, PointerState, SMOOTHING};

/// Number of parameter units; mirrors `shaderlib::ParameterUnit::ALL`.
pub(crate) const UNIT_COUNT: usize = shaderlib::ParameterUnit::ALL.len();
