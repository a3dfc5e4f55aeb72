//! Embedded GLSL fragment library and the textual include resolver.
//!
//! Every fragment ships inside the binary via `include_str!`; nothing is
//! loaded from disk at runtime. Fragments may pull in others with
//! `#include "name"` lines, which [`resolve_includes`] expands before the
//! source reaches the GPU compiler.

/// Shared declarations and constants every generated program starts with.
pub const COMMON_HEADER: &str = include_str!("../shaders/shared/common_header.glsl");
/// Complex arithmetic helpers on `vec2`.
pub const COMPLEX_MATH: &str = include_str!("../shaders/shared/complex_math.glsl");
/// Modifier transform bodies and condition predicates.
pub const MODIFIERS: &str = include_str!("../shaders/shared/modifiers.glsl");
/// Per-slot compile-time dispatch wrappers.
pub const MEMORY_MODES: &str = include_str!("../shaders/shared/memory_modes.glsl");
pub const Z_MODES: &str = include_str!("../shaders/shared/z_modes.glsl");
pub const C_MODES: &str = include_str!("../shaders/shared/c_modes.glsl");
/// Cosine palette and the coloring-mode dispatch.
pub const COLORING_MODES: &str = include_str!("../shaders/shared/coloring_modes.glsl");
/// Pixel-to-plane coordinate mapping.
pub const COORDS: &str = include_str!("../shaders/shared/coords.glsl");

/// Family iteration cores, each defining `core_logic`.
pub const ESCAPE_CORE: &str = include_str!("../shaders/cores/escape_core.glsl");
pub const NEWTON_CORE: &str = include_str!("../shaders/cores/newton_core.glsl");
pub const NOVA_CORE: &str = include_str!("../shaders/cores/nova_core.glsl");
pub const KLEINIAN_CORE: &str = include_str!("../shaders/cores/kleinian_core.glsl");

/// Entry-point template that stitches the pieces into `main`.
pub const MAIN_TEMPLATE: &str = include_str!("../shaders/main_template.frag");

const VERTEX_SHADER: &str = include_str!("../shaders/base.vert");

/// The fixed full-screen-triangle vertex stage shared by every program.
pub fn vertex_shader() -> &'static str {
    VERTEX_SHADER
}

/// Looks up a library fragment by include name.
pub fn fragment(name: &str) -> Option<&'static str> {
    match name {
        "common_header" => Some(COMMON_HEADER),
        "complex_math" => Some(COMPLEX_MATH),
        "modifiers" => Some(MODIFIERS),
        "memory_modes" => Some(MEMORY_MODES),
        "z_modes" => Some(Z_MODES),
        "c_modes" => Some(C_MODES),
        "coloring_modes" => Some(COLORING_MODES),
        "coords" => Some(COORDS),
        "escape_core" => Some(ESCAPE_CORE),
        "newton_core" => Some(NEWTON_CORE),
        "nova_core" => Some(NOVA_CORE),
        "kleinian_core" => Some(KLEINIAN_CORE),
        "main_template" => Some(MAIN_TEMPLATE),
        _ => None,
    }
}

/// Expands `#include "name"` lines recursively against the fragment library.
///
/// An unknown name or an include cycle is replaced with a
/// `// include failed: <name>` marker so the surrounding source still
/// compiles as far as it can and the failure is visible in shader dumps.
pub fn resolve_includes(source: &str) -> String {
    let mut stack = Vec::new();
    resolve_inner(source, &mut stack)
}

fn resolve_inner(source: &str, stack: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim();
        let directive = trimmed
            .strip_prefix("#include \"")
            .and_then(|rest| rest.strip_suffix('"'));
        let Some(name) = directive else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        if stack.iter().any(|seen| *seen == name) {
            tracing::warn!(fragment = name, "include cycle, emitting failure marker");
            out.push_str(&format!("// include failed: {name}\n"));
            continue;
        }
        match fragment(name) {
            Some(body) => {
                stack.push(name.to_string());
                out.push_str(&resolve_inner(body, stack));
                stack.pop();
            }
            None => {
                tracing::warn!(fragment = name, "unknown include, emitting failure marker");
                out.push_str(&format!("// include failed: {name}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_library_fragment_resolves_by_name() {
        for name in [
            "common_header",
            "complex_math",
            "modifiers",
            "memory_modes",
            "z_modes",
            "c_modes",
            "coloring_modes",
            "coords",
            "escape_core",
            "newton_core",
            "nova_core",
            "kleinian_core",
            "main_template",
        ] {
            assert!(fragment(name).is_some(), "{name} missing from library");
        }
    }

    #[test]
    fn include_is_replaced_with_fragment_body() {
        let source = "#include \"complex_math\"\nvoid main() {}\n";
        let resolved = resolve_includes(source);
        assert!(resolved.contains("vec2 c_mul"));
        assert!(!resolved.contains("#include"));
        assert!(resolved.contains("void main() {}"));
    }

    #[test]
    fn unknown_include_leaves_failure_marker() {
        let resolved = resolve_includes("#include \"no_such_fragment\"\n");
        assert_eq!(resolved, "// include failed: no_such_fragment\n");
    }

    #[test]
    fn main_template_resolves_cleanly() {
        let resolved = resolve_includes(MAIN_TEMPLATE);
        assert!(resolved.contains("map_coordinates"));
        assert!(!resolved.contains("#include"));
    }

    #[test]
    fn non_include_lines_pass_through_unchanged() {
        let source = "// a comment\nfloat x = 1.0;\n";
        assert_eq!(resolve_includes(source), source);
    }
}
