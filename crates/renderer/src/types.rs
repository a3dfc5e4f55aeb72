//! Engine-facing value types.

use modulation::{CameraState, Palette, ParameterSet};
use shaderlib::SlotAssignments;

/// Render loop state machine. Live self-loops on every redraw; capture
/// suppresses the live tick until it completes or aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Idle,
    Live,
    Capturing,
}

impl EngineMode {
    /// Live frames are suppressed while a capture owns the frame loop.
    pub fn permits_live_frame(self) -> bool {
        !matches!(self, EngineMode::Capturing)
    }
}

/// Read-only snapshot of everything one frame needs. The engine has no
/// reference to any shared state store; callers hand it this struct.
pub struct FrameSnapshot<'a> {
    pub camera: CameraState,
    pub palette: Palette,
    pub params: &'a ParameterSet,
    pub slots: SlotAssignments,
    pub max_iterations: u32,
    /// Seconds since the loop started in live mode, or the manual capture
    /// time.
    pub time: f32,
}

/// Startup options for the engine, assembled by the CLI.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub width: u32,
    pub height: u32,
    pub formula_id: String,
    pub ssaa: bool,
    pub max_iterations: u32,
    pub palette_index: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            formula_id: "mandelbrot".to_string(),
            ssaa: false,
            max_iterations: 250,
            palette_index: 0,
        }
    }
}

/// Floors both dimensions to even values; video encoders commonly reject
/// odd frame sizes.
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width.max(2) & !1, height.max(2) & !1)
}

/// True when the drawing surface is close enough to the host surface that
/// resizing would only thrash on sub-pixel DPR jitter.
pub fn within_resize_tolerance(current: (u32, u32), target: (u32, u32)) -> bool {
    const TOLERANCE: u32 = 2;
    current.0.abs_diff(target.0) <= TOLERANCE && current.1.abs_diff(target.1) <= TOLERANCE
}

/// Display-match check for the live loop: the new drawing size when the
/// host surface has drifted beyond the jitter tolerance, `None` otherwise.
/// Explicit resolution changes bypass this and resize exactly.
pub fn resize_target(current: (u32, u32), requested: (u32, u32)) -> Option<(u32, u32)> {
    let target = even_dimensions(requested.0, requested.1);
    if within_resize_tolerance(current, target) {
        None
    } else {
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capturing_suppresses_live_frames() {
        assert!(EngineMode::Idle.permits_live_frame());
        assert!(EngineMode::Live.permits_live_frame());
        assert!(!EngineMode::Capturing.permits_live_frame());
    }

    #[test]
    fn dimensions_are_floored_to_even() {
        assert_eq!(even_dimensions(1281, 721), (1280, 720));
        assert_eq!(even_dimensions(1280, 720), (1280, 720));
        assert_eq!(even_dimensions(1, 0), (2, 2));
    }

    #[test]
    fn resize_tolerance_is_two_pixels() {
        assert!(within_resize_tolerance((1280, 720), (1282, 718)));
        assert!(!within_resize_tolerance((1280, 720), (1283, 720)));
        assert!(!within_resize_tolerance((1280, 720), (1280, 723)));
    }

    #[test]
    fn live_resize_skips_jitter_but_follows_real_drift() {
        assert_eq!(resize_target((1280, 720), (1281, 721)), None);
        assert_eq!(resize_target((1280, 720), (1290, 720)), Some((1290, 720)));
        assert_eq!(resize_target((1280, 720), (1925, 1081)), Some((1924, 1080)));
    }
}
