//! Immutable catalog of supported fractal formulas.
//!
//! Each formula contributes exactly one GLSL iteration-step fragment; the
//! surrounding loop comes from its family's core fragment. Definitions are
//! build-time constants and are only ever selected by id.

use crate::config::ParameterUnit;

/// Shared iteration structure a formula plugs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FractalFamily {
    Escape,
    Newton,
    Nova,
    Kleinian,
}

impl FractalFamily {
    /// Library name of the family's iteration-core fragment.
    pub fn core_fragment(self) -> &'static str {
        match self {
            FractalFamily::Escape => "escape_core",
            FractalFamily::Newton => "newton_core",
            FractalFamily::Nova => "nova_core",
            FractalFamily::Kleinian => "kleinian_core",
        }
    }
}

/// One supported fractal: identity, family, step shader, and the camera and
/// parameter defaults applied when it becomes active.
#[derive(Debug, Clone, Copy)]
pub struct FormulaDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Math notation shown in UI readouts.
    pub notation: &'static str,
    pub family: FractalFamily,
    /// GLSL fragment implementing exactly one iteration step (`fractal_step`).
    pub step_source: &'static str,
    pub camera_zoom: f32,
    pub camera_offset: (f32, f32),
    /// Slider overrides layered over the built-in unit defaults.
    pub parameter_defaults: &'static [(ParameterUnit, f32)],
    /// Iteration budget override; `None` keeps the session setting.
    pub max_iterations: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    /// The caller supplied an id absent from the known formula set. Treated
    /// as fatal rather than silently defaulting, since a fallback would
    /// render the wrong fractal with no visible indication.
    #[error("unknown formula id '{0}'")]
    Unknown(String),
}

/// Looks up a formula by id.
pub fn formula_by_id(id: &str) -> Result<&'static FormulaDefinition, FormulaError> {
    FORMULAS
        .iter()
        .find(|formula| formula.id == id)
        .ok_or_else(|| FormulaError::Unknown(id.to_string()))
}

/// Neighbouring formula in catalog order, wrapping at both ends.
pub fn adjacent_formula(id: &str, direction: i32) -> &'static FormulaDefinition {
    let len = FORMULAS.len() as i32;
    let index = FORMULAS.iter().position(|f| f.id == id).unwrap_or(0) as i32;
    &FORMULAS[((index + direction).rem_euclid(len)) as usize]
}

macro_rules! step {
    ($path:literal) => {
        include_str!(concat!("../shaders/formulas/", $path))
    };
}

pub static FORMULAS: &[FormulaDefinition] = &[
    FormulaDefinition {
        id: "mandelbrot",
        name: "Mandelbrot",
        notation: "z\u{b2} + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/mandelbrot.frag"),
        camera_zoom: 2.5,
        camera_offset: (-1.0, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "burning-ship",
        name: "Burning Ship",
        notation: "(|Re(z)| + i|Im(z)|)\u{b2} + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/burning_ship.frag"),
        camera_zoom: 2.4,
        camera_offset: (0.4, 0.6),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "tricorn",
        name: "Tricorn",
        notation: "conj(z)\u{b2} + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/tricorn.frag"),
        camera_zoom: 3.5,
        camera_offset: (0.4, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "buffalo",
        name: "Buffalo",
        notation: "|Re(z)\u{b2} - Im(z)\u{b2}| + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/buffalo.frag"),
        camera_zoom: 2.6,
        camera_offset: (-0.1, 0.6),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "celtic",
        name: "Celtic",
        notation: "|Re(z\u{b2})| + iIm(z\u{b2}) + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/celtic.frag"),
        camera_zoom: 4.0,
        camera_offset: (-0.2, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "heart",
        name: "Heart",
        notation: "(|Re(z)| + iIm(z))\u{b2} + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/heart.frag"),
        camera_zoom: 2.5,
        camera_offset: (0.0, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "magnet",
        name: "Magnet M1",
        notation: "((z\u{b2}+c-1)/(2z+c-2))\u{b2}",
        family: FractalFamily::Escape,
        step_source: step!("escape/magnet.frag"),
        camera_zoom: 5.0,
        camera_offset: (0.5, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "lambda",
        name: "Lambda",
        notation: "c \u{b7} z\u{2099}(1 - z\u{2099})",
        family: FractalFamily::Escape,
        step_source: step!("escape/lambda.frag"),
        camera_zoom: 4.2,
        camera_offset: (0.5, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 1.0),
            (ParameterUnit::SeedR, 0.5),
            (ParameterUnit::SeedI, 0.0),
        ],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "spider",
        name: "Spider",
        notation: "z\u{2099}\u{b2} + c\u{2099}, c\u{2099}\u{208a}\u{2081} = c\u{2099}/2 + z\u{2099}",
        family: FractalFamily::Escape,
        step_source: step!("escape/spider.frag"),
        camera_zoom: 2.5,
        camera_offset: (-1.0, 0.0),
        parameter_defaults: &[(ParameterUnit::MemoryR, 0.5)],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "inv-mandel",
        name: "Inverted Mandelbrot",
        notation: "z\u{b2} + 1/c",
        family: FractalFamily::Escape,
        step_source: step!("escape/inv_mandel.frag"),
        camera_zoom: 4.5,
        camera_offset: (0.8, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "inv-exp",
        name: "Inverted Exponent",
        notation: "1/z\u{b2} + c",
        family: FractalFamily::Escape,
        step_source: step!("escape/inv_exp.frag"),
        camera_zoom: 4.0,
        camera_offset: (0.5, 0.0),
        parameter_defaults: &[(ParameterUnit::MemoryR, -1.0)],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "newton-std",
        name: "Newton Standard",
        notation: "z\u{1d3e} - 1 = 0",
        family: FractalFamily::Newton,
        step_source: step!("newton/newton_std.frag"),
        camera_zoom: 3.0,
        camera_offset: (-0.3, 0.0),
        parameter_defaults: &[(ParameterUnit::Power, 3.0)],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "newton-sin",
        name: "Newton Sine",
        notation: "z - a\u{b7}tan(z)",
        family: FractalFamily::Newton,
        step_source: step!("newton/newton_sin.frag"),
        camera_zoom: 5.0,
        camera_offset: (0.0, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 1.0),
            (ParameterUnit::Subtrahend, 0.0),
            (ParameterUnit::Relaxation, 0.9),
        ],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "newton-exp",
        name: "Newton Exponential",
        notation: "e\u{1d3e}\u{1dbb} - c = 0",
        family: FractalFamily::Newton,
        step_source: step!("newton/newton_exp.frag"),
        camera_zoom: 5.0,
        camera_offset: (0.0, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 1.0),
            (ParameterUnit::Relaxation, 0.9),
        ],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "newton-hybrid",
        name: "Newton Hybrid",
        notation: "z\u{1d3e} \u{b7} sin(z) - c = 0",
        family: FractalFamily::Newton,
        step_source: step!("newton/newton_hybrid.frag"),
        camera_zoom: 5.0,
        camera_offset: (0.0, 0.0),
        parameter_defaults: &[],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "nova-std",
        name: "Nova Standard",
        notation: "z\u{2099} - a(z\u{1d3e}-s)/Pz\u{1d3e}\u{207b}\u{b9} + c",
        family: FractalFamily::Nova,
        step_source: step!("nova/nova_std.frag"),
        camera_zoom: 2.0,
        camera_offset: (-0.5, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 3.0),
            (ParameterUnit::SeedR, 1.0),
        ],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "nova-sin",
        name: "Nova Sine",
        notation: "z\u{2099} - \u{3b1}(sin(P\u{b7}z\u{2099}) - S) / (P\u{b7}cos(P\u{b7}z\u{2099})) + c",
        family: FractalFamily::Nova,
        step_source: step!("nova/nova_sin.frag"),
        camera_zoom: 1.0,
        camera_offset: (-0.1, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 3.0),
            (ParameterUnit::Subtrahend, 0.75),
        ],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "nova-hybrid",
        name: "Nova Hybrid",
        notation: "z\u{2099} - a(z\u{1d3e} sin z - s)/f' + c",
        family: FractalFamily::Nova,
        step_source: step!("nova/nova_hybrid.frag"),
        camera_zoom: 2.0,
        camera_offset: (-0.2, 0.0),
        parameter_defaults: &[(ParameterUnit::Power, 2.0)],
        max_iterations: None,
    },
    FormulaDefinition {
        id: "kleinian-basic",
        name: "Kleinian Limit Set",
        notation: "z = mobius(fold(z))",
        family: FractalFamily::Kleinian,
        step_source: step!("kleinian/kleinian_basic.frag"),
        camera_zoom: 2.0,
        camera_offset: (-0.3, 0.0),
        parameter_defaults: &[
            (ParameterUnit::Power, 1.0),
            (ParameterUnit::PowerI, 0.0),
            (ParameterUnit::SeedR, 1.8),
            (ParameterUnit::SeedI, 0.1),
            (ParameterUnit::Subtrahend, 1.5),
            (ParameterUnit::SubtrahendI, 0.0),
            (ParameterUnit::Relaxation, 2.0),
            (ParameterUnit::RelaxationI, 0.0),
            (ParameterUnit::JuliaMorph, 1.0),
            (ParameterUnit::MemoryR, 0.0),
            (ParameterUnit::MemoryI, 0.0),
        ],
        max_iterations: Some(100),
    },
];
