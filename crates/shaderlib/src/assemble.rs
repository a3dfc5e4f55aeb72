//! Fragment-program assembly.
//!
//! Stitches the library fragments, the selected formula's step, and the
//! family core into one GLSL source, with the configuration's compile-time
//! axes baked in as preprocessor defines. The emission order matters:
//! every fragment may only call functions emitted before it.

use crate::config::{ColoringMode, ConditionId, ShaderConfig, SlotRole};
use crate::formula::{formula_by_id, FormulaError, FractalFamily};
use crate::library;
use crate::uniforms::UniformLayout;

/// A fully assembled fragment program plus the metadata the renderer needs
/// to cache and bind it.
#[derive(Debug, Clone)]
pub struct ShaderBuild {
    /// Complete GLSL fragment source, includes resolved.
    pub source: String,
    /// Cache key; equal fingerprints always produce byte-identical source.
    pub fingerprint: String,
    /// Uniform names the source actually references, in layout order.
    /// Names outside this set may be written by the binder but have no
    /// effect on the image.
    pub uniform_names: Vec<&'static str>,
}

/// Library fragments emitted before the formula step, in dependency order.
const LIBRARY_ORDER: &[&str] = &[
    "common_header",
    "complex_math",
    "modifiers",
    "memory_modes",
    "z_modes",
    "c_modes",
    "coloring_modes",
];

/// Assembles the fragment program for `config`.
pub fn assemble(config: &ShaderConfig) -> Result<ShaderBuild, FormulaError> {
    let formula = formula_by_id(&config.formula_id)?;
    let layout = UniformLayout::shared();

    let mut source = String::from("#version 450\n\n");

    if config.ssaa {
        source.push_str("#define USE_SSAA\n");
    }
    for role in SlotRole::ALL {
        let slot = config.slots.get(role);
        if !slot.is_active() {
            continue;
        }
        source.push_str(&format!(
            "#define {}_{}\n",
            role.define_prefix(),
            slot.modifier.as_str()
        ));
        // Always is the dispatch fallback and needs no define.
        if slot.condition != ConditionId::Always {
            source.push_str(&format!(
                "#define {}_{}\n",
                role.condition_prefix(),
                slot.condition.as_str()
            ));
        }
    }
    if config.coloring != ColoringMode::Default {
        source.push_str(&format!("#define COL_{}\n", config.coloring.as_str()));
    }
    source.push('\n');
    source.push_str(&layout.block_glsl());
    source.push('\n');

    let mut body = String::new();
    for name in LIBRARY_ORDER {
        // The order list only names known fragments; a miss still degrades
        // to a visible marker instead of a silent hole.
        match library::fragment(name) {
            Some(text) => body.push_str(text),
            None => body.push_str(&format!("// include failed: {name}\n")),
        }
        body.push('\n');
    }
    body.push_str(formula.step_source);
    body.push('\n');
    body.push_str(family_core(formula.family));
    body.push('\n');
    body.push_str(&library::resolve_includes(library::MAIN_TEMPLATE));

    let uniform_names = layout
        .fields()
        .iter()
        .map(|field| field.name)
        .filter(|name| references_identifier(&body, name))
        .collect();

    source.push_str(&body);

    tracing::debug!(
        fingerprint = %config.fingerprint(),
        bytes = source.len(),
        "assembled fragment program"
    );

    Ok(ShaderBuild {
        source,
        fingerprint: config.fingerprint(),
        uniform_names,
    })
}

fn family_core(family: FractalFamily) -> &'static str {
    match family {
        FractalFamily::Escape => library::ESCAPE_CORE,
        FractalFamily::Newton => library::NEWTON_CORE,
        FractalFamily::Nova => library::NOVA_CORE,
        FractalFamily::Kleinian => library::KLEINIAN_CORE,
    }
}

/// Whole-identifier search; `power` must not match inside `powerSecondary`.
fn references_identifier(source: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut from = 0;
    while let Some(found) = source[from..].find(name) {
        let start = from + found;
        let end = start + name.len();
        let before_ok = start == 0
            || !source[..start]
                .chars()
                .next_back()
                .is_some_and(is_ident);
        let after_ok = !source[end..].chars().next().is_some_and(is_ident);
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColoringMode, ConditionId, ModifierId};
    use crate::formula::FORMULAS;

    #[test]
    fn default_mandelbrot_assembles_completely() {
        let build = assemble(&ShaderConfig::new("mandelbrot")).unwrap();
        assert!(build.source.starts_with("#version 450"));
        assert!(build.source.contains("uniform FractalParams"));
        assert!(build.source.contains("vec2 fractal_step"));
        assert!(build.source.contains("vec3 core_logic"));
        assert!(build.source.contains("void main()"));
        assert!(!build.source.contains("#include"));
        assert!(!build.source.contains("include failed"));
    }

    #[test]
    fn every_formula_assembles_without_failure_markers() {
        for formula in FORMULAS {
            let build = assemble(&ShaderConfig::new(formula.id)).unwrap();
            assert!(
                !build.source.contains("include failed"),
                "{} left a failure marker",
                formula.id
            );
            assert!(build.source.contains("vec3 core_logic"));
        }
    }

    #[test]
    fn unknown_formula_is_an_error() {
        assert!(assemble(&ShaderConfig::new("nope")).is_err());
    }

    #[test]
    fn ssaa_toggles_its_define() {
        let mut config = ShaderConfig::new("mandelbrot");
        let plain = assemble(&config).unwrap();
        assert!(!plain.source.contains("#define USE_SSAA"));
        config.ssaa = true;
        let sampled = assemble(&config).unwrap();
        assert!(sampled.source.contains("#define USE_SSAA"));
    }

    #[test]
    fn active_slot_bakes_modifier_and_condition_defines() {
        let mut config = ShaderConfig::new("mandelbrot");
        config.slots.z.modifier = ModifierId::Sin;
        config.slots.c.modifier = ModifierId::AbsBoth;
        config.slots.c.condition = ConditionId::ZMagGt1;
        let build = assemble(&config).unwrap();
        assert!(build.source.contains("#define ZMOD_SIN"));
        assert!(build.source.contains("#define CMOD_ABS_BOTH"));
        assert!(build.source.contains("#define CCOND_Z_MAG_GT_1"));
        // Always on the z slot emits no condition define.
        assert!(!build.source.contains("#define ZCOND_"));
    }

    #[test]
    fn inactive_slot_emits_no_defines() {
        let build = assemble(&ShaderConfig::new("mandelbrot")).unwrap();
        assert!(!build.source.contains("#define ZMOD_"));
        assert!(!build.source.contains("#define CMOD_"));
        assert!(!build.source.contains("#define MEM_"));
    }

    #[test]
    fn non_default_coloring_emits_its_define() {
        let mut config = ShaderConfig::new("mandelbrot");
        config.coloring = ColoringMode::OrbitTrap;
        let build = assemble(&config).unwrap();
        assert!(build.source.contains("#define COL_ORBIT_TRAP"));
    }

    #[test]
    fn fingerprint_matches_configuration() {
        let config = ShaderConfig::new("tricorn");
        let build = assemble(&config).unwrap();
        assert_eq!(build.fingerprint, config.fingerprint());
    }

    #[test]
    fn equal_fingerprints_yield_identical_source() {
        let config = ShaderConfig::new("burning-ship");
        let a = assemble(&config).unwrap();
        let b = assemble(&config.clone()).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn used_uniforms_cover_the_camera_and_elide_condition_indices() {
        let build = assemble(&ShaderConfig::new("mandelbrot")).unwrap();
        for name in ["resolution", "zoom", "offsetShiftX", "offsetShiftY", "time"] {
            assert!(build.uniform_names.contains(&name), "{name} not marked used");
        }
        // Condition selection is baked as defines, so the index uniforms
        // never appear in the source.
        assert!(!build.uniform_names.contains(&"zModCondition"));
    }

    #[test]
    fn identifier_search_respects_word_boundaries() {
        assert!(references_identifier("float x = power;", "power"));
        assert!(!references_identifier("float x = powerSecondary;", "power"));
        assert!(!references_identifier("float superpower;", "power"));
    }
}
