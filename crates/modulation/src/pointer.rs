//! Pointer smoothing and axis bindings.
//!
//! The pointer contributes `(smoothed - origin) * sensitivity` to bound
//! parameters. `origin` starts at zero and is only moved by pause/resume:
//! pausing folds the current contribution into the sliders and re-anchors
//! the origin so the image freezes exactly where it was, and resuming
//! re-targets the smoothing at the current position so nothing jumps.

use shaderlib::ParameterUnit;

/// Per-frame exponential smoothing coefficient; a deliberate low-pass so
/// interaction feels inertial rather than jumpy.
pub const SMOOTHING: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    target: (f32, f32),
    smoothed: (f32, f32),
    origin: (f32, f32),
}

impl PointerState {
    /// Sets the raw pointer position in normalized coordinates.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = (x, y);
    }

    /// One smoothing step toward the target.
    pub fn tick(&mut self) {
        self.smoothed.0 += (self.target.0 - self.smoothed.0) * SMOOTHING;
        self.smoothed.1 += (self.target.1 - self.smoothed.1) * SMOOTHING;
    }

    /// Contribution of one axis relative to the current origin.
    pub fn contribution(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.smoothed.0 - self.origin.0,
            Axis::Y => self.smoothed.1 - self.origin.1,
        }
    }

    pub fn smoothed(&self) -> (f32, f32) {
        self.smoothed
    }

    /// Re-anchors the origin at the current smoothed position, zeroing the
    /// contribution without moving anything visually.
    pub fn rebase(&mut self) {
        self.origin = self.smoothed;
    }

    /// Points the smoothing target at the current smoothed position so the
    /// next ticks hold still until new input arrives.
    pub fn settle(&mut self) {
        self.target = self.smoothed;
    }
}

/// Pointer-axis bindings. Several units may ride one axis; a unit is
/// bound to at most one axis at a time.
#[derive(Debug, Clone, Default)]
pub struct AxisBindings {
    entries: Vec<(ParameterUnit, Axis)>,
}

impl AxisBindings {
    /// Binds `unit` to `axis`, moving it off the other axis if it was
    /// bound there. Units already riding `axis` are unaffected.
    pub fn bind(&mut self, unit: ParameterUnit, axis: Axis) {
        self.unbind(unit);
        self.entries.push((unit, axis));
    }

    pub fn unbind(&mut self, unit: ParameterUnit) {
        self.entries.retain(|(bound, _)| *bound != unit);
    }

    pub fn axis_for(&self, unit: ParameterUnit) -> Option<Axis> {
        self.entries
            .iter()
            .find(|(bound, _)| *bound == unit)
            .map(|(_, axis)| *axis)
    }

    /// Units currently riding `axis`, in binding order.
    pub fn bound(&self, axis: Axis) -> impl Iterator<Item = ParameterUnit> + '_ {
        self.entries
            .iter()
            .filter(move |(_, bound)| *bound == axis)
            .map(|(unit, _)| *unit)
    }
}
