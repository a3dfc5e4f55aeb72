//! Uniform block layout shared between the CPU staging buffer and the
//! generated GLSL.
//!
//! A single field table drives both the std140 byte offsets used by the
//! renderer's binder and the uniform-block text injected into every
//! assembled shader, so the two can never drift apart.

use crate::config::{ParameterUnit, SlotRole};

/// GLSL type of one uniform block field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
}

impl UniformType {
    /// std140 base alignment in bytes.
    fn alignment(self) -> usize {
        match self {
            UniformType::Float | UniformType::Int => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 16,
        }
    }

    /// Size of the value itself (padding is handled by alignment).
    fn size(self) -> usize {
        match self {
            UniformType::Float | UniformType::Int => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
        }
    }

    fn glsl(self) -> &'static str {
        match self {
            UniformType::Float => "float",
            UniformType::Int => "int",
            UniformType::Vec2 => "vec2",
            UniformType::Vec3 => "vec3",
        }
    }
}

/// One resolved field of the uniform block.
#[derive(Debug, Clone, Copy)]
pub struct UniformField {
    pub name: &'static str,
    pub ty: UniformType,
    pub offset: usize,
}

/// The complete uniform block layout, identical for every generated program.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: usize,
}

/// Engine-level uniforms that precede the parameter units in the block.
const BASE_FIELDS: &[(&str, UniformType)] = &[
    ("resolution", UniformType::Vec2),
    ("zoom", UniformType::Float),
    ("maxIterations", UniformType::Float),
    ("offsetShiftX", UniformType::Float),
    ("offsetShiftY", UniformType::Float),
    ("time", UniformType::Float),
    ("brightness", UniformType::Vec3),
    ("contrast", UniformType::Vec3),
    ("osc", UniformType::Vec3),
    ("phase", UniformType::Vec3),
];

impl UniformLayout {
    /// Builds the canonical layout: base uniforms, the fifteen parameter
    /// units, then per-slot intensity and condition-index uniforms.
    pub fn shared() -> Self {
        let mut names: Vec<(&'static str, UniformType)> = BASE_FIELDS.to_vec();
        for unit in ParameterUnit::ALL {
            names.push((unit.name(), UniformType::Float));
        }
        for role in SlotRole::ALL {
            names.push((role.intensity_uniform(), UniformType::Float));
        }
        for role in SlotRole::ALL {
            names.push((role.condition_uniform(), UniformType::Int));
        }

        let mut fields = Vec::with_capacity(names.len());
        let mut cursor = 0usize;
        for (name, ty) in names {
            let align = ty.alignment();
            cursor = cursor.div_ceil(align) * align;
            fields.push(UniformField {
                name,
                ty,
                offset: cursor,
            });
            cursor += ty.size();
        }
        // Block size rounds up to a 16-byte boundary.
        let size = cursor.div_ceil(16) * 16;
        Self { fields, size }
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Total block size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Emits the std140 uniform block plus name aliases so fragments can
    /// refer to plain uniform names.
    pub fn block_glsl(&self) -> String {
        let mut out = String::from("layout(std140, set = 0, binding = 0) uniform FractalParams {\n");
        for field in &self.fields {
            out.push_str(&format!("    {} u_{};\n", field.ty.glsl(), field.name));
        }
        out.push_str("} ubo;\n");
        for field in &self.fields {
            out.push_str(&format!("#define {name} ubo.u_{name}\n", name = field.name));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std140_offsets_respect_alignment_rules() {
        let layout = UniformLayout::shared();
        for field in layout.fields() {
            assert_eq!(
                field.offset % field.ty.alignment(),
                0,
                "{} misaligned at {}",
                field.name,
                field.offset
            );
        }
    }

    #[test]
    fn known_offsets_match_hand_computation() {
        let layout = UniformLayout::shared();
        assert_eq!(layout.field("resolution").unwrap().offset, 0);
        assert_eq!(layout.field("zoom").unwrap().offset, 8);
        assert_eq!(layout.field("time").unwrap().offset, 24);
        // vec3 jumps to the next 16-byte boundary.
        assert_eq!(layout.field("brightness").unwrap().offset, 32);
        assert_eq!(layout.field("phase").unwrap().offset, 80);
        // Floats pack straight after the final vec3's 12 bytes.
        assert_eq!(layout.field("power").unwrap().offset, 92);
        assert_eq!(layout.field("kleinianSphere").unwrap().offset, 148);
        assert_eq!(layout.field("zModIntensity").unwrap().offset, 152);
        assert_eq!(layout.field("memModCondition").unwrap().offset, 172);
        assert_eq!(layout.size(), 176);
    }

    #[test]
    fn block_size_is_16_byte_multiple() {
        assert_eq!(UniformLayout::shared().size() % 16, 0);
    }

    #[test]
    fn block_text_declares_every_field_once() {
        let layout = UniformLayout::shared();
        let glsl = layout.block_glsl();
        for field in layout.fields() {
            assert!(
                glsl.contains(&format!("u_{};", field.name)),
                "missing declaration for {}",
                field.name
            );
            assert!(glsl.contains(&format!("#define {name} ubo.u_{name}", name = field.name)));
        }
    }

    #[test]
    fn every_parameter_unit_has_a_field() {
        let layout = UniformLayout::shared();
        for unit in ParameterUnit::ALL {
            assert!(layout.field(unit.name()).is_some(), "{unit} missing");
        }
    }
}
