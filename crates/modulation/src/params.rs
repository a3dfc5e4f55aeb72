//! The slider / live / anchor parameter model.
//!
//! `slider` is the authoritative user-controlled value, `live` is the
//! per-frame value after modulation (derived, never a source of truth),
//! and `anchor` is the snapshot randomization perturbs around.

use rand::Rng;
use shaderlib::ParameterUnit;

use crate::UNIT_COUNT;

fn index(unit: ParameterUnit) -> usize {
    ParameterUnit::ALL
        .iter()
        .position(|u| *u == unit)
        .unwrap_or(0)
}

fn defaults() -> [f32; UNIT_COUNT] {
    let mut values = [0.0; UNIT_COUNT];
    for unit in ParameterUnit::ALL {
        values[index(unit)] = unit.default_value();
    }
    values
}

#[derive(Debug, Clone)]
pub struct ParameterSet {
    slider: [f32; UNIT_COUNT],
    live: [f32; UNIT_COUNT],
    anchor: [f32; UNIT_COUNT],
}

impl Default for ParameterSet {
    fn default() -> Self {
        let base = defaults();
        Self {
            slider: base,
            live: base,
            anchor: base,
        }
    }
}

impl ParameterSet {
    pub fn slider(&self, unit: ParameterUnit) -> f32 {
        self.slider[index(unit)]
    }

    pub fn set_slider(&mut self, unit: ParameterUnit, value: f32) {
        self.slider[index(unit)] = value;
    }

    pub fn live(&self, unit: ParameterUnit) -> f32 {
        self.live[index(unit)]
    }

    pub(crate) fn set_live(&mut self, unit: ParameterUnit, value: f32) {
        self.live[index(unit)] = value;
    }

    /// Restores built-in defaults, then layers the formula's overrides on
    /// top. Live and anchor follow the new sliders.
    pub fn reset_for(&mut self, overrides: &[(ParameterUnit, f32)]) {
        self.slider = defaults();
        for (unit, value) in overrides {
            self.slider[index(*unit)] = *value;
        }
        self.live = self.slider;
        self.anchor = self.slider;
    }

    /// Snapshots the current sliders as the randomization centre.
    pub fn update_anchor(&mut self) {
        self.anchor = self.slider;
    }

    pub fn anchor(&self, unit: ParameterUnit) -> f32 {
        self.anchor[index(unit)]
    }

    /// Perturbs every slider around its anchor by up to ±spread/2.
    ///
    /// juliaMorph is skipped: nudging it flips between Mandelbrot-like and
    /// Julia-like renderings, which reads as a formula change rather than
    /// a variation.
    pub fn randomize(&mut self, spread: f32, rng: &mut impl Rng) {
        for unit in ParameterUnit::ALL {
            if unit == ParameterUnit::JuliaMorph {
                continue;
            }
            let jitter = (rng.gen::<f32>() - 0.5) * spread;
            self.slider[index(unit)] = self.anchor[index(unit)] + jitter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn defaults_follow_unit_definitions() {
        let params = ParameterSet::default();
        assert_eq!(params.slider(ParameterUnit::Power), 2.0);
        assert_eq!(params.slider(ParameterUnit::Relaxation), 1.0);
        assert_eq!(params.slider(ParameterUnit::SeedR), 0.0);
    }

    #[test]
    fn reset_layers_formula_overrides() {
        let mut params = ParameterSet::default();
        params.set_slider(ParameterUnit::SeedR, 9.0);
        params.reset_for(&[(ParameterUnit::Power, 3.0)]);
        assert_eq!(params.slider(ParameterUnit::Power), 3.0);
        assert_eq!(params.slider(ParameterUnit::SeedR), 0.0);
        assert_eq!(params.anchor(ParameterUnit::Power), 3.0);
    }

    #[test]
    fn randomize_skips_julia_morph_and_centers_on_anchor() {
        let mut params = ParameterSet::default();
        params.set_slider(ParameterUnit::JuliaMorph, 1.0);
        params.set_slider(ParameterUnit::SeedR, 0.5);
        params.update_anchor();

        let mut rng = StdRng::seed_from_u64(7);
        params.randomize(0.2, &mut rng);

        assert_eq!(params.slider(ParameterUnit::JuliaMorph), 1.0);
        assert!((params.slider(ParameterUnit::SeedR) - 0.5).abs() <= 0.1 + 1e-6);
    }

    #[test]
    fn randomize_is_deterministic_under_a_seed() {
        let mut a = ParameterSet::default();
        let mut b = ParameterSet::default();
        a.randomize(1.0, &mut StdRng::seed_from_u64(42));
        b.randomize(1.0, &mut StdRng::seed_from_u64(42));
        for unit in ParameterUnit::ALL {
            assert_eq!(a.slider(unit), b.slider(unit));
        }
    }
}
