//! Additive low-frequency oscillators attached to parameter units.

use std::f32::consts::TAU;

use shaderlib::ParameterUnit;

#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub active: bool,
}

impl Lfo {
    pub fn new(frequency: f32, amplitude: f32, phase: f32) -> Self {
        Self {
            frequency,
            amplitude,
            phase,
            active: true,
        }
    }

    /// Signal value at `time` seconds; inactive oscillators contribute
    /// zero but stay in their assignment list (soft-disable).
    pub fn value(&self, time: f32) -> f32 {
        if !self.active {
            return 0.0;
        }
        self.amplitude * (time * self.frequency * TAU + self.phase).sin()
    }
}

/// All oscillator assignments, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LfoBank {
    assignments: Vec<(ParameterUnit, Lfo)>,
}

impl LfoBank {
    pub fn assign(&mut self, unit: ParameterUnit, lfo: Lfo) {
        self.assignments.push((unit, lfo));
    }

    /// Sum of all active oscillators attached to `unit` at `time`.
    pub fn sum_for(&self, unit: ParameterUnit, time: f32) -> f32 {
        self.assignments
            .iter()
            .filter(|(assigned, _)| *assigned == unit)
            .map(|(_, lfo)| lfo.value(time))
            .sum()
    }

    pub fn assignments_mut(&mut self) -> &mut [(ParameterUnit, Lfo)] {
        &mut self.assignments
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_oscillator_contributes_zero() {
        let mut bank = LfoBank::default();
        let mut lfo = Lfo::new(1.0, 2.0, 0.0);
        lfo.active = false;
        bank.assign(ParameterUnit::Power, lfo);
        assert_eq!(bank.sum_for(ParameterUnit::Power, 0.37), 0.0);
    }

    #[test]
    fn oscillators_on_one_unit_sum_linearly() {
        let mut bank = LfoBank::default();
        bank.assign(ParameterUnit::SeedR, Lfo::new(1.0, 1.0, 0.0));
        bank.assign(ParameterUnit::SeedR, Lfo::new(1.0, 1.0, 0.0));
        bank.assign(ParameterUnit::SeedI, Lfo::new(1.0, 5.0, 0.0));
        let single = Lfo::new(1.0, 1.0, 0.0).value(0.1);
        assert!((bank.sum_for(ParameterUnit::SeedR, 0.1) - 2.0 * single).abs() < 1e-6);
    }

    #[test]
    fn quarter_period_hits_the_amplitude() {
        let lfo = Lfo::new(1.0, 0.5, 0.0);
        assert!((lfo.value(0.25) - 0.5).abs() < 1e-6);
    }
}
