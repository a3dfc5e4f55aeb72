//! Cosine-ramp palette state: four RGB triples driving
//! `brightness + contrast * cos(TAU * (osc * t + phase))`.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub name: &'static str,
    pub brightness: [f32; 3],
    pub contrast: [f32; 3],
    pub osc: [f32; 3],
    pub phase: [f32; 3],
}

/// Built-in palette catalog, cycled in order.
pub static PALETTES: &[Palette] = &[
    Palette {
        name: "spectrum",
        brightness: [0.5, 0.5, 0.5],
        contrast: [0.5, 0.5, 0.5],
        osc: [1.0, 1.0, 1.0],
        phase: [0.0, 0.33, 0.67],
    },
    Palette {
        name: "ember",
        brightness: [0.5, 0.4, 0.3],
        contrast: [0.5, 0.5, 0.4],
        osc: [1.0, 0.9, 0.7],
        phase: [0.0, 0.15, 0.3],
    },
    Palette {
        name: "abyss",
        brightness: [0.3, 0.4, 0.55],
        contrast: [0.4, 0.4, 0.45],
        osc: [0.8, 0.9, 1.0],
        phase: [0.55, 0.6, 0.7],
    },
    Palette {
        name: "verdant",
        brightness: [0.35, 0.5, 0.35],
        contrast: [0.4, 0.5, 0.35],
        osc: [0.9, 1.0, 0.8],
        phase: [0.3, 0.4, 0.25],
    },
    Palette {
        name: "neon",
        brightness: [0.5, 0.5, 0.5],
        contrast: [0.6, 0.6, 0.6],
        osc: [1.0, 0.7, 0.4],
        phase: [0.0, 0.15, 0.2],
    },
    Palette {
        name: "dusk",
        brightness: [0.55, 0.45, 0.5],
        contrast: [0.35, 0.35, 0.4],
        osc: [0.7, 0.8, 0.9],
        phase: [0.8, 0.9, 0.3],
    },
    Palette {
        name: "mono",
        brightness: [0.5, 0.5, 0.5],
        contrast: [0.5, 0.5, 0.5],
        osc: [1.0, 1.0, 1.0],
        phase: [0.0, 0.0, 0.0],
    },
    Palette {
        name: "solar",
        brightness: [0.55, 0.5, 0.4],
        contrast: [0.45, 0.5, 0.5],
        osc: [0.6, 0.8, 1.0],
        phase: [0.1, 0.25, 0.45],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteState {
    index: usize,
    pub current: Palette,
}

impl Default for PaletteState {
    fn default() -> Self {
        Self {
            index: 0,
            current: PALETTES[0],
        }
    }
}

impl PaletteState {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn select(&mut self, index: usize) {
        self.index = index % PALETTES.len();
        self.current = PALETTES[self.index];
    }

    pub fn step(&mut self, direction: i32) {
        let len = PALETTES.len() as i32;
        let next = (self.index as i32 + direction).rem_euclid(len);
        self.select(next as usize);
    }

    /// Replaces the current ramp with a randomized one: fresh mid-range
    /// brightness/contrast, frequency and phase drifted from their current
    /// values so the change reads as a variation rather than a reroll.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        for channel in 0..3 {
            self.current.brightness[channel] = rng.gen_range(0.3..0.7);
            self.current.contrast[channel] = rng.gen_range(0.3..0.7);
            let osc = self.current.osc[channel] + rng.gen_range(-0.3..0.3);
            self.current.osc[channel] = osc.clamp(0.1, 1.0);
            self.current.phase[channel] += rng.gen_range(-2.0..2.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn catalog_has_eight_uniquely_named_palettes() {
        assert_eq!(PALETTES.len(), 8);
        for (i, a) in PALETTES.iter().enumerate() {
            for b in &PALETTES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn stepping_wraps_in_both_directions() {
        let mut state = PaletteState::default();
        state.step(-1);
        assert_eq!(state.index(), PALETTES.len() - 1);
        state.step(1);
        assert_eq!(state.index(), 0);
    }

    #[test]
    fn randomize_respects_documented_ranges() {
        let mut state = PaletteState::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            state.randomize(&mut rng);
            for channel in 0..3 {
                let b = state.current.brightness[channel];
                let c = state.current.contrast[channel];
                let o = state.current.osc[channel];
                assert!((0.3..0.7).contains(&b));
                assert!((0.3..0.7).contains(&c));
                assert!((0.1..=1.0).contains(&o));
            }
        }
    }

    #[test]
    fn select_is_modular() {
        let mut state = PaletteState::default();
        state.select(PALETTES.len() + 2);
        assert_eq!(state.index(), 2);
        assert_eq!(state.current, PALETTES[2]);
    }
}
