//! CPU-side uniform staging keyed by name.
//!
//! Every program shares one std140 block layout, but a given program only
//! references a subset of its names (the GPU compiler dead-code-eliminates
//! the rest). The binder re-resolves the name set on every program swap;
//! writes to names the active program does not use are silent no-ops.

use shaderlib::uniforms::{UniformLayout, UniformType};

pub struct UniformBinder {
    layout: UniformLayout,
    staging: Vec<u8>,
    active_names: Vec<&'static str>,
}

impl Default for UniformBinder {
    fn default() -> Self {
        let layout = UniformLayout::shared();
        let staging = vec![0u8; layout.size()];
        Self {
            layout,
            staging,
            active_names: Vec::new(),
        }
    }
}

impl UniformBinder {
    /// Adopts the used-name set of a freshly activated program.
    pub fn rebind(&mut self, used_names: &[&'static str]) {
        self.active_names = used_names.to_vec();
        tracing::trace!(count = self.active_names.len(), "uniform names rebound");
    }

    fn offset_of(&self, name: &str, expected: UniformType) -> Option<usize> {
        if !self.active_names.iter().any(|active| *active == name) {
            return None;
        }
        let field = self.layout.field(name)?;
        if field.ty != expected {
            tracing::warn!(name, "uniform written with mismatched type, ignoring");
            return None;
        }
        Some(field.offset)
    }

    pub fn set_f32(&mut self, name: &str, value: f32) {
        if let Some(offset) = self.offset_of(name, UniformType::Float) {
            self.staging[offset..offset + 4].copy_from_slice(bytemuck::bytes_of(&value));
        }
    }

    pub fn set_i32(&mut self, name: &str, value: i32) {
        if let Some(offset) = self.offset_of(name, UniformType::Int) {
            self.staging[offset..offset + 4].copy_from_slice(bytemuck::bytes_of(&value));
        }
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2]) {
        if let Some(offset) = self.offset_of(name, UniformType::Vec2) {
            self.staging[offset..offset + 8].copy_from_slice(bytemuck::cast_slice(&value));
        }
    }

    pub fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        if let Some(offset) = self.offset_of(name, UniformType::Vec3) {
            self.staging[offset..offset + 12].copy_from_slice(bytemuck::cast_slice(&value));
        }
    }

    /// The full staging block, uploaded once per frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.staging
    }

    pub fn block_size(&self) -> usize {
        self.layout.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_binder() -> UniformBinder {
        let mut binder = UniformBinder::default();
        binder.rebind(&["zoom", "resolution", "brightness", "zModCondition"]);
        binder
    }

    #[test]
    fn write_lands_at_the_layout_offset() {
        let mut binder = bound_binder();
        binder.set_f32("zoom", 2.5);
        let offset = UniformLayout::shared().field("zoom").unwrap().offset;
        let stored = f32::from_le_bytes(binder.as_bytes()[offset..offset + 4].try_into().unwrap());
        assert_eq!(stored, 2.5);
    }

    #[test]
    fn absent_name_is_a_silent_noop() {
        let mut binder = bound_binder();
        let before = binder.as_bytes().to_vec();
        binder.set_f32("power", 8.0);
        assert_eq!(binder.as_bytes(), &before[..]);
    }

    #[test]
    fn unknown_name_is_a_silent_noop() {
        let mut binder = UniformBinder::default();
        binder.rebind(&["zoom"]);
        let before = binder.as_bytes().to_vec();
        binder.set_f32("notAUniform", 1.0);
        assert_eq!(binder.as_bytes(), &before[..]);
    }

    #[test]
    fn type_mismatch_is_ignored() {
        let mut binder = bound_binder();
        let before = binder.as_bytes().to_vec();
        binder.set_f32("zModCondition", 3.0);
        binder.set_i32("zoom", 3);
        assert_eq!(binder.as_bytes(), &before[..]);
    }

    #[test]
    fn rebinding_changes_the_active_set() {
        let mut binder = bound_binder();
        binder.set_f32("zoom", 1.0);
        binder.rebind(&["power"]);
        let before = binder.as_bytes().to_vec();
        binder.set_f32("zoom", 9.0);
        assert_eq!(binder.as_bytes(), &before[..]);
        binder.set_f32("power", 3.0);
        assert_ne!(binder.as_bytes(), &before[..]);
    }

    #[test]
    fn staging_block_matches_the_layout_size() {
        let binder = UniformBinder::default();
        assert_eq!(binder.as_bytes().len(), UniformLayout::shared().size());
    }

    #[test]
    fn vec3_write_covers_twelve_bytes() {
        let mut binder = bound_binder();
        binder.set_vec3("brightness", [0.1, 0.2, 0.3]);
        let offset = UniformLayout::shared().field("brightness").unwrap().offset;
        let bytes = binder.as_bytes();
        let g = f32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().unwrap());
        assert_eq!(g, 0.2);
    }
}
