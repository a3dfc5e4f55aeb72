//! Rendering configuration: the compile-time axes that select which GLSL
//! code paths end up in the generated fragment program.

use std::fmt;

/// A named real-valued scalar fed to the shader as one uniform.
///
/// The set is fixed and identical across formulas; a formula that does not
/// use a unit simply ignores its uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterUnit {
    Power,
    PowerI,
    SeedR,
    SeedI,
    JuliaMorph,
    MemoryR,
    MemoryI,
    Subtrahend,
    SubtrahendI,
    Relaxation,
    RelaxationI,
    PowerSecondary,
    PowerSecondaryI,
    KleinianBox,
    KleinianSphere,
}

impl ParameterUnit {
    pub const ALL: [ParameterUnit; 15] = [
        ParameterUnit::Power,
        ParameterUnit::PowerI,
        ParameterUnit::SeedR,
        ParameterUnit::SeedI,
        ParameterUnit::JuliaMorph,
        ParameterUnit::MemoryR,
        ParameterUnit::MemoryI,
        ParameterUnit::Subtrahend,
        ParameterUnit::SubtrahendI,
        ParameterUnit::Relaxation,
        ParameterUnit::RelaxationI,
        ParameterUnit::PowerSecondary,
        ParameterUnit::PowerSecondaryI,
        ParameterUnit::KleinianBox,
        ParameterUnit::KleinianSphere,
    ];

    /// Uniform name as it appears in the generated shader source.
    pub fn name(self) -> &'static str {
        match self {
            ParameterUnit::Power => "power",
            ParameterUnit::PowerI => "powerI",
            ParameterUnit::SeedR => "seedR",
            ParameterUnit::SeedI => "seedI",
            ParameterUnit::JuliaMorph => "juliaMorph",
            ParameterUnit::MemoryR => "memoryR",
            ParameterUnit::MemoryI => "memoryI",
            ParameterUnit::Subtrahend => "subtrahend",
            ParameterUnit::SubtrahendI => "subtrahendI",
            ParameterUnit::Relaxation => "relaxation",
            ParameterUnit::RelaxationI => "relaxationI",
            ParameterUnit::PowerSecondary => "powerSecondary",
            ParameterUnit::PowerSecondaryI => "powerSecondaryI",
            ParameterUnit::KleinianBox => "kleinianBox",
            ParameterUnit::KleinianSphere => "kleinianSphere",
        }
    }

    /// Exponent-like units react geometrically to modulation, so pointer
    /// contributions are scaled down for them.
    pub fn is_power_like(self) -> bool {
        matches!(
            self,
            ParameterUnit::Power
                | ParameterUnit::PowerI
                | ParameterUnit::PowerSecondary
                | ParameterUnit::PowerSecondaryI
        )
    }

    /// Default slider value before any formula override is applied.
    pub fn default_value(self) -> f32 {
        match self {
            ParameterUnit::Power | ParameterUnit::PowerSecondary => 2.0,
            ParameterUnit::Subtrahend | ParameterUnit::Relaxation => 1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for ParameterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complex-plane transform applicable to the iterate, constant, or memory
/// value inside the iteration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModifierId {
    #[default]
    None,
    AbsBoth,
    AbsX,
    AbsY,
    Conjugate,
    Reverse,
    Invert,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
    Reciprocal,
    Pow3,
    Fold,
    Swizzle,
    Kaleidoscope,
    Polar,
    SphereInversion,
    Tile,
    Crease,
    Sawtooth,
    Wavefold,
    ShiftInvert,
    Voxelize,
    TanWarp,
    CrossFold,
    Spiral,
    CirclePulse,
    Glitch,
}

impl ModifierId {
    pub const ALL: [ModifierId; 34] = [
        ModifierId::None,
        ModifierId::AbsBoth,
        ModifierId::AbsX,
        ModifierId::AbsY,
        ModifierId::Conjugate,
        ModifierId::Reverse,
        ModifierId::Invert,
        ModifierId::Sin,
        ModifierId::Cos,
        ModifierId::Tan,
        ModifierId::Sinh,
        ModifierId::Cosh,
        ModifierId::Tanh,
        ModifierId::Exp,
        ModifierId::Log,
        ModifierId::Sqrt,
        ModifierId::Reciprocal,
        ModifierId::Pow3,
        ModifierId::Fold,
        ModifierId::Swizzle,
        ModifierId::Kaleidoscope,
        ModifierId::Polar,
        ModifierId::SphereInversion,
        ModifierId::Tile,
        ModifierId::Crease,
        ModifierId::Sawtooth,
        ModifierId::Wavefold,
        ModifierId::ShiftInvert,
        ModifierId::Voxelize,
        ModifierId::TanWarp,
        ModifierId::CrossFold,
        ModifierId::Spiral,
        ModifierId::CirclePulse,
        ModifierId::Glitch,
    ];

    /// Token used in fingerprints and preprocessor defines.
    pub fn as_str(self) -> &'static str {
        match self {
            ModifierId::None => "NONE",
            ModifierId::AbsBoth => "ABS_BOTH",
            ModifierId::AbsX => "ABS_X",
            ModifierId::AbsY => "ABS_Y",
            ModifierId::Conjugate => "CONJUGATE",
            ModifierId::Reverse => "REVERSE",
            ModifierId::Invert => "INVERT",
            ModifierId::Sin => "SIN",
            ModifierId::Cos => "COS",
            ModifierId::Tan => "TAN",
            ModifierId::Sinh => "SINH",
            ModifierId::Cosh => "COSH",
            ModifierId::Tanh => "TANH",
            ModifierId::Exp => "EXP",
            ModifierId::Log => "LOG",
            ModifierId::Sqrt => "SQRT",
            ModifierId::Reciprocal => "RECIPROCAL",
            ModifierId::Pow3 => "POW3",
            ModifierId::Fold => "FOLD",
            ModifierId::Swizzle => "SWIZZLE",
            ModifierId::Kaleidoscope => "KALEIDOSCOPE",
            ModifierId::Polar => "POLAR",
            ModifierId::SphereInversion => "SPHERE_INVERSION",
            ModifierId::Tile => "TILE",
            ModifierId::Crease => "CREASE",
            ModifierId::Sawtooth => "SAWTOOTH",
            ModifierId::Wavefold => "WAVEFOLD",
            ModifierId::ShiftInvert => "SHIFT_INVERT",
            ModifierId::Voxelize => "VOXELIZE",
            ModifierId::TanWarp => "TAN_WARP",
            ModifierId::CrossFold => "CROSS_FOLD",
            ModifierId::Spiral => "SPIRAL",
            ModifierId::CirclePulse => "CIRCLE_PULSE",
            ModifierId::Glitch => "GLITCH",
        }
    }

    /// Cycles to the next/previous modifier in catalog order.
    pub fn stepped(self, direction: i32) -> ModifierId {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0) as i32;
        Self::ALL[((index + direction).rem_euclid(len)) as usize]
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch predicate gating when a modifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionId {
    #[default]
    Always,
    ZRealPositive,
    ZImagPositive,
    ZMagGt1,
    ZAnglePositive,
    ZRealGtImag,
    ZAbsRealGtAbsImag,
}

impl ConditionId {
    pub const ALL: [ConditionId; 7] = [
        ConditionId::Always,
        ConditionId::ZRealPositive,
        ConditionId::ZImagPositive,
        ConditionId::ZMagGt1,
        ConditionId::ZAnglePositive,
        ConditionId::ZRealGtImag,
        ConditionId::ZAbsRealGtAbsImag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionId::Always => "ALWAYS",
            ConditionId::ZRealPositive => "Z_REAL_POSITIVE",
            ConditionId::ZImagPositive => "Z_IMAG_POSITIVE",
            ConditionId::ZMagGt1 => "Z_MAG_GT_1",
            ConditionId::ZAnglePositive => "Z_ANGLE_POSITIVE",
            ConditionId::ZRealGtImag => "Z_REAL_GT_IMAG",
            ConditionId::ZAbsRealGtAbsImag => "Z_ABS_REAL_GT_ABS_IMAG",
        }
    }

    /// Index uploaded as the per-slot condition uniform.
    pub fn index(self) -> i32 {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0) as i32
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which value inside the iteration step a modifier is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    /// The per-iteration value.
    Z,
    /// The iteration constant.
    C,
    /// The remembered previous iterate ("memory").
    ZPrev,
}

impl SlotRole {
    pub const ALL: [SlotRole; 3] = [SlotRole::Z, SlotRole::C, SlotRole::ZPrev];

    /// Define prefix for this slot's modifier id.
    pub fn define_prefix(self) -> &'static str {
        match self {
            SlotRole::Z => "ZMOD",
            SlotRole::C => "CMOD",
            SlotRole::ZPrev => "MEM",
        }
    }

    /// Define prefix for this slot's baked condition id.
    pub fn condition_prefix(self) -> &'static str {
        match self {
            SlotRole::Z => "ZCOND",
            SlotRole::C => "CCOND",
            SlotRole::ZPrev => "MEMCOND",
        }
    }

    /// Runtime uniform carrying the modifier intensity for this slot.
    pub fn intensity_uniform(self) -> &'static str {
        match self {
            SlotRole::Z => "zModIntensity",
            SlotRole::C => "cModIntensity",
            SlotRole::ZPrev => "memModIntensity",
        }
    }

    /// Runtime uniform carrying the condition index for this slot.
    pub fn condition_uniform(self) -> &'static str {
        match self {
            SlotRole::Z => "zModCondition",
            SlotRole::C => "cModCondition",
            SlotRole::ZPrev => "memModCondition",
        }
    }
}

/// One slot's modifier selection. The modifier and condition ids are baked
/// into the generated source; intensity stays a runtime uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierConfig {
    pub modifier: ModifierId,
    pub intensity: f32,
    pub condition: ConditionId,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            modifier: ModifierId::None,
            intensity: 1.0,
            condition: ConditionId::Always,
        }
    }
}

impl ModifierConfig {
    pub fn is_active(&self) -> bool {
        self.modifier != ModifierId::None
    }
}

/// The three modifier slots of the iteration formula.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlotAssignments {
    pub z: ModifierConfig,
    pub c: ModifierConfig,
    pub z_prev: ModifierConfig,
}

impl SlotAssignments {
    pub fn get(&self, role: SlotRole) -> &ModifierConfig {
        match role {
            SlotRole::Z => &self.z,
            SlotRole::C => &self.c,
            SlotRole::ZPrev => &self.z_prev,
        }
    }

    pub fn get_mut(&mut self, role: SlotRole) -> &mut ModifierConfig {
        match role {
            SlotRole::Z => &mut self.z,
            SlotRole::C => &mut self.c,
            SlotRole::ZPrev => &mut self.z_prev,
        }
    }
}

/// Per-pixel coloring scheme selected at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColoringMode {
    #[default]
    Default,
    OrbitTrap,
    Stalks,
    Curvature,
    Stripes,
    Grid,
    Delta,
    Binary,
    Exp,
}

impl ColoringMode {
    pub const ALL: [ColoringMode; 9] = [
        ColoringMode::Default,
        ColoringMode::OrbitTrap,
        ColoringMode::Stalks,
        ColoringMode::Curvature,
        ColoringMode::Stripes,
        ColoringMode::Grid,
        ColoringMode::Delta,
        ColoringMode::Binary,
        ColoringMode::Exp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColoringMode::Default => "DEFAULT",
            ColoringMode::OrbitTrap => "ORBIT_TRAP",
            ColoringMode::Stalks => "STALKS",
            ColoringMode::Curvature => "CURVATURE",
            ColoringMode::Stripes => "STRIPES",
            ColoringMode::Grid => "GRID",
            ColoringMode::Delta => "DELTA",
            ColoringMode::Binary => "BINARY",
            ColoringMode::Exp => "EXP",
        }
    }

    pub fn stepped(self, direction: i32) -> ColoringMode {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0) as i32;
        Self::ALL[((index + direction).rem_euclid(len)) as usize]
    }
}

impl fmt::Display for ColoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full compile-time configuration of one fragment program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderConfig {
    pub formula_id: String,
    pub slots: SlotAssignments,
    pub coloring: ColoringMode,
    pub ssaa: bool,
}

impl ShaderConfig {
    pub fn new(formula_id: impl Into<String>) -> Self {
        Self {
            formula_id: formula_id.into(),
            slots: SlotAssignments::default(),
            coloring: ColoringMode::default(),
            ssaa: false,
        }
    }

    /// Deterministic cache key over every compile-time axis.
    ///
    /// Intensity is a runtime uniform and excluded; condition ids are baked
    /// into the generated source as defines and therefore participate.
    pub fn fingerprint(&self) -> String {
        let slot = |config: &ModifierConfig| {
            format!("{}~{}", config.modifier.as_str(), config.condition.as_str())
        };
        format!(
            "{}_{}_{}_{}_COL_{}_SSAA_{}",
            self.formula_id,
            slot(&self.slots.z_prev),
            slot(&self.slots.z),
            slot(&self.slots.c),
            self.coloring.as_str(),
            self.ssaa
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_changes_with_each_axis() {
        let base = ShaderConfig::new("mandelbrot");
        let baseline = base.fingerprint();

        let mut formula = base.clone();
        formula.formula_id = "tricorn".into();
        assert_ne!(formula.fingerprint(), baseline);

        for role in SlotRole::ALL {
            let mut changed = base.clone();
            changed.slots.get_mut(role).modifier = ModifierId::Sin;
            assert_ne!(changed.fingerprint(), baseline, "slot {role:?}");
        }

        let mut coloring = base.clone();
        coloring.coloring = ColoringMode::Stripes;
        assert_ne!(coloring.fingerprint(), baseline);

        let mut ssaa = base.clone();
        ssaa.ssaa = true;
        assert_ne!(ssaa.fingerprint(), baseline);
    }

    #[test]
    fn fingerprint_ignores_intensity_but_not_condition() {
        let base = ShaderConfig::new("mandelbrot");
        let mut louder = base.clone();
        louder.slots.z.intensity = 0.25;
        assert_eq!(louder.fingerprint(), base.fingerprint());

        let mut gated = base.clone();
        gated.slots.z.condition = ConditionId::ZMagGt1;
        assert_ne!(gated.fingerprint(), base.fingerprint());
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let config = ShaderConfig::new("nova-std");
        assert_eq!(config.fingerprint(), config.fingerprint());
    }

    #[test]
    fn modifier_stepping_wraps() {
        assert_eq!(ModifierId::None.stepped(-1), ModifierId::Glitch);
        assert_eq!(ModifierId::Glitch.stepped(1), ModifierId::None);
    }

    #[test]
    fn power_like_units_are_exactly_the_powers() {
        let powers: Vec<_> = ParameterUnit::ALL
            .iter()
            .filter(|unit| unit.is_power_like())
            .collect();
        assert_eq!(powers.len(), 4);
    }
}
