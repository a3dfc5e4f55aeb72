//! GLSL program construction for the fractal renderer.
//!
//! This crate is pure string and table work, no GPU types: it owns the
//! formula catalog, the embedded fragment library, the uniform block
//! layout, and the assembler that combines them into a complete fragment
//! program for a given [`ShaderConfig`].

pub mod assemble;
pub mod config;
pub mod formula;
pub mod library;
pub mod uniforms;

pub use assemble::{assemble, ShaderBuild};
pub use config::{
    ColoringMode, ConditionId, ModifierConfig, ModifierId, ParameterUnit, ShaderConfig,
    SlotAssignments, SlotRole,
};
pub use formula::{
    adjacent_formula, formula_by_id, FormulaDefinition, FormulaError, FractalFamily, FORMULAS,
};
pub use uniforms::{UniformField, UniformLayout, UniformType};
