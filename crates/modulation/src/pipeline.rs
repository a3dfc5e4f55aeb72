//! The per-frame modulation pipeline: `live = slider + pointer + lfo`.

use shaderlib::ParameterUnit;

use crate::lfo::LfoBank;
use crate::params::ParameterSet;
use crate::pointer::{Axis, AxisBindings, PointerState};

/// Exponent-like units respond geometrically, so their pointer term is
/// scaled down relative to additive-offset units.
pub const POWER_COEFFICIENT: f32 = 0.3;

fn unit_coefficient(unit: ParameterUnit) -> f32 {
    if unit.is_power_like() {
        POWER_COEFFICIENT
    } else {
        1.0
    }
}

/// Owns all modulation state and computes live parameter values.
#[derive(Debug, Clone)]
pub struct Modulator {
    pub params: ParameterSet,
    pub pointer: PointerState,
    pub bindings: AxisBindings,
    pub lfos: LfoBank,
    /// Global pointer sensitivity multiplier; the camera zoom is applied
    /// on top per frame so modulation feels scale-invariant.
    pub sensitivity: f32,
    paused: bool,
}

impl Default for Modulator {
    fn default() -> Self {
        Self {
            params: ParameterSet::default(),
            pointer: PointerState::default(),
            bindings: AxisBindings::default(),
            lfos: LfoBank::default(),
            sensitivity: 1.0,
            paused: false,
        }
    }
}

impl Modulator {
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Freezes modulation: folds the current pointer contribution of every
    /// bound unit into its slider (so the image holds exactly where it
    /// was) and re-anchors the pointer origin.
    pub fn pause(&mut self, zoom: f32) {
        if self.paused {
            return;
        }
        for axis in [Axis::X, Axis::Y] {
            let contribution = self.pointer.contribution(axis);
            let units: Vec<_> = self.bindings.bound(axis).collect();
            for unit in units {
                let term = contribution * self.sensitivity * zoom * unit_coefficient(unit);
                let committed = self.params.slider(unit) + term;
                self.params.set_slider(unit, committed);
            }
        }
        self.pointer.rebase();
        self.paused = true;
        tracing::debug!("modulation paused");
    }

    /// Unfreezes: the smoothing target settles at the current smoothed
    /// position so resuming never jumps.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.pointer.settle();
        self.paused = false;
        tracing::debug!("modulation resumed");
    }

    /// Live-mode frame step: advance pointer smoothing, then evaluate.
    pub fn tick(&mut self, time: f32, zoom: f32) {
        if !self.paused {
            self.pointer.tick();
        }
        self.evaluate(time, zoom);
    }

    /// Computes every unit's live value for `time` without advancing any
    /// internal state. Capture mode calls this directly so repeated
    /// evaluation at the same manual time is exactly reproducible.
    pub fn evaluate(&mut self, time: f32, zoom: f32) {
        for unit in ParameterUnit::ALL {
            let mut live = self.params.slider(unit);
            if !self.paused {
                if let Some(axis) = self.bindings.axis_for(unit) {
                    live += self.pointer.contribution(axis)
                        * self.sensitivity
                        * zoom
                        * unit_coefficient(unit);
                }
            }
            live += self.lfos.sum_for(unit, time);
            self.params.set_live(unit, live);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfo::Lfo;

    #[test]
    fn live_is_slider_plus_pointer_plus_lfo() {
        let mut modulator = Modulator::default();
        modulator.params.set_slider(ParameterUnit::SeedR, 0.5);
        modulator.bindings.bind(ParameterUnit::SeedR, Axis::X);
        modulator.lfos.assign(ParameterUnit::SeedR, Lfo::new(1.0, 0.1, 0.0));
        modulator.pointer.set_target(1.0, 0.0);

        modulator.tick(0.25, 2.0);

        let pointer_term = modulator.pointer.contribution(Axis::X) * 1.0 * 2.0;
        let lfo_term = Lfo::new(1.0, 0.1, 0.0).value(0.25);
        let expected = 0.5 + pointer_term + lfo_term;
        assert!((modulator.params.live(ParameterUnit::SeedR) - expected).abs() < 1e-6);
    }

    #[test]
    fn power_like_units_use_the_reduced_coefficient() {
        let mut modulator = Modulator::default();
        modulator.bindings.bind(ParameterUnit::Power, Axis::X);
        modulator.pointer.set_target(1.0, 0.0);
        modulator.tick(0.0, 1.0);

        let pointer = modulator.pointer.contribution(Axis::X);
        let expected = ParameterUnit::Power.default_value() + pointer * POWER_COEFFICIENT;
        assert!((modulator.params.live(ParameterUnit::Power) - expected).abs() < 1e-6);
    }

    #[test]
    fn pause_freezes_bound_units_idempotently() {
        let mut modulator = Modulator::default();
        modulator.bindings.bind(ParameterUnit::SeedI, Axis::Y);
        modulator.pointer.set_target(0.0, 1.0);
        for _ in 0..30 {
            modulator.tick(0.0, 1.0);
        }
        let before = modulator.params.live(ParameterUnit::SeedI);

        modulator.pause(1.0);
        for _ in 0..10 {
            modulator.tick(0.0, 1.0);
        }
        let after = modulator.params.live(ParameterUnit::SeedI);
        assert!((after - before).abs() < 1e-6);
    }

    #[test]
    fn pause_commits_every_unit_riding_an_axis() {
        let mut modulator = Modulator::default();
        modulator.bindings.bind(ParameterUnit::SeedR, Axis::X);
        modulator.bindings.bind(ParameterUnit::SeedI, Axis::X);
        modulator.pointer.set_target(1.0, 0.0);
        for _ in 0..30 {
            modulator.tick(0.0, 1.0);
        }
        let r = modulator.params.live(ParameterUnit::SeedR);
        let i = modulator.params.live(ParameterUnit::SeedI);

        modulator.pause(1.0);
        for _ in 0..10 {
            modulator.tick(0.0, 1.0);
        }
        assert!((modulator.params.live(ParameterUnit::SeedR) - r).abs() < 1e-6);
        assert!((modulator.params.live(ParameterUnit::SeedI) - i).abs() < 1e-6);
    }

    #[test]
    fn resume_does_not_jump() {
        let mut modulator = Modulator::default();
        modulator.bindings.bind(ParameterUnit::SeedR, Axis::X);
        modulator.pointer.set_target(1.0, 0.0);
        for _ in 0..30 {
            modulator.tick(0.0, 1.0);
        }
        modulator.pause(1.0);
        let frozen = modulator.params.live(ParameterUnit::SeedR);

        modulator.resume();
        modulator.tick(0.0, 1.0);
        let resumed = modulator.params.live(ParameterUnit::SeedR);
        assert!((resumed - frozen).abs() < 1e-4);
    }

    #[test]
    fn evaluate_is_deterministic_at_fixed_time() {
        let mut modulator = Modulator::default();
        modulator.lfos.assign(ParameterUnit::SeedR, Lfo::new(0.5, 1.0, 0.3));
        modulator.evaluate(1.5, 1.0);
        let first = modulator.params.live(ParameterUnit::SeedR);
        modulator.evaluate(1.5, 1.0);
        assert_eq!(modulator.params.live(ParameterUnit::SeedR), first);
    }

    #[test]
    fn pointer_sensitivity_scales_with_zoom() {
        let mut modulator = Modulator::default();
        modulator.bindings.bind(ParameterUnit::SeedR, Axis::X);
        modulator.pointer.set_target(1.0, 0.0);
        modulator.tick(0.0, 1.0);
        let narrow = modulator.params.live(ParameterUnit::SeedR);
        modulator.evaluate(0.0, 2.0);
        let wide = modulator.params.live(ParameterUnit::SeedR);
        assert!((wide - 2.0 * narrow).abs() < 1e-6);
    }
}
