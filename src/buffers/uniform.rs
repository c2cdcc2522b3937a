//! Multi-buffered uniform ring
//!
//! Rotates writes across N independent 256-byte-aligned regions so the GPU
//! can still be reading region K while the CPU packs region K+1. The 256
//! boundary doubles as wgpu's minimum uniform buffer offset alignment, so
//! a region maps directly onto a dynamic-offset uniform binding.

use crate::parameters::ParameterGroup;

/// Default number of in-flight regions (triple buffering).
pub const MAX_BUFFERS_IN_FLIGHT: usize = 3;

/// Byte boundary each region is padded to.
pub const UNIFORM_ALIGNMENT: usize = 256;

pub struct UniformBuffer {
    parameters: ParameterGroup,
    data: Vec<u8>,
    aligned_size: usize,
    buffer_count: usize,
    index: Option<usize>,
}

impl UniformBuffer {
    /// Ring with the default triple-buffer count.
    pub fn new(parameters: ParameterGroup) -> Self {
        Self::with_count(parameters, MAX_BUFFERS_IN_FLIGHT)
    }

    /// Ring with an explicit region count. The constructor performs one
    /// initial `update`, so the first region is packed and the index sits
    /// at slot 0.
    ///
    /// # Panics
    ///
    /// Panics on a zero-sized group or a zero region count; both are
    /// non-recoverable configuration errors.
    pub fn with_count(parameters: ParameterGroup, buffer_count: usize) -> Self {
        let size = parameters.size();
        assert!(size > 0, "cannot create a uniform buffer for an empty parameter group");
        assert!(buffer_count > 0, "uniform buffer needs at least one region");
        let aligned_size = size.div_ceil(UNIFORM_ALIGNMENT) * UNIFORM_ALIGNMENT;
        let mut buffer = Self {
            data: vec![0u8; aligned_size * buffer_count],
            aligned_size,
            buffer_count,
            index: None,
            parameters,
        };
        buffer.update();
        buffer
    }

    /// Advance the rotating index (wrapping) and rewrite the entire new
    /// region from the parameter values.
    ///
    /// Call at most once per frame: the rotation must stay aligned with
    /// the number of frames the GPU may have in flight.
    pub fn update(&mut self) {
        let index = match self.index {
            Some(index) => (index + 1) % self.buffer_count,
            None => 0,
        };
        self.index = Some(index);
        let offset = self.aligned_size * index;
        let size = self.parameters.size();
        self.parameters.write_packed(&mut self.data[offset..offset + size]);
    }

    /// Rewind to the uninitialized state so the next `update` targets
    /// slot 0 regardless of prior frame count.
    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Current slot, if an `update` has happened since construction/reset.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Byte offset of the current region.
    pub fn offset(&self) -> usize {
        self.aligned_size * self.index.unwrap_or(0)
    }

    /// Group size padded up to [`UNIFORM_ALIGNMENT`].
    pub fn aligned_size(&self) -> usize {
        self.aligned_size
    }

    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    pub fn parameters(&self) -> &ParameterGroup {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterGroup {
        &mut self.parameters
    }

    /// The whole ring.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The packed bytes of the current region.
    pub fn region(&self) -> &[u8] {
        let offset = self.offset();
        &self.data[offset..offset + self.parameters.size()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Parameter;

    fn small_group() -> ParameterGroup {
        ParameterGroup::with_params(
            "frame",
            vec![
                Parameter::float("time", 1.5),
                Parameter::uint32("frame", 7u32),
            ],
        )
    }

    #[test]
    fn test_aligned_size_rounds_to_256() {
        let uniforms = UniformBuffer::new(small_group());
        assert_eq!(uniforms.aligned_size(), 256);
        assert_eq!(uniforms.as_bytes().len(), 256 * MAX_BUFFERS_IN_FLIGHT);

        let mut params = Vec::new();
        for i in 0..5 {
            params.push(Parameter::float4x4(format!("m{i}"), glam::Mat4::IDENTITY));
        }
        let big = UniformBuffer::new(ParameterGroup::with_params("big", params));
        // 5 * 64 = 320 -> 512
        assert_eq!(big.aligned_size(), 512);
    }

    #[test]
    fn test_rotation_cycle() {
        let mut uniforms = UniformBuffer::with_count(small_group(), 3);
        // Constructor performed the first update
        assert_eq!(uniforms.index(), Some(0));
        let s = uniforms.aligned_size();

        let mut offsets = Vec::new();
        for _ in 0..4 {
            uniforms.update();
            offsets.push(uniforms.offset());
        }
        assert_eq!(offsets, vec![s, 2 * s, 0, s]);
    }

    #[test]
    fn test_reset_rewinds_to_slot_zero() {
        let mut uniforms = UniformBuffer::with_count(small_group(), 2);
        uniforms.update();
        assert_eq!(uniforms.index(), Some(1));
        uniforms.reset();
        assert_eq!(uniforms.index(), None);
        uniforms.update();
        assert_eq!(uniforms.index(), Some(0));
        assert_eq!(uniforms.offset(), 0);
    }

    #[test]
    fn test_update_writes_current_region() {
        let mut uniforms = UniformBuffer::with_count(small_group(), 2);
        uniforms.parameters().set("time", 9.0f32);
        uniforms.update();
        assert_eq!(uniforms.index(), Some(1));
        assert_eq!(uniforms.region()[0..4], 9.0f32.to_ne_bytes());
        // Slot 0 still holds the constructor-time value
        assert_eq!(uniforms.as_bytes()[0..4], 1.5f32.to_ne_bytes());
    }

    #[test]
    fn test_regions_are_independent() {
        let mut uniforms = UniformBuffer::with_count(small_group(), 3);
        for frame in 1..=2u32 {
            uniforms.parameters().set("frame", 7 + frame);
            uniforms.update();
        }
        let s = uniforms.aligned_size();
        let frame_at = |region: usize| {
            let base = region * s + 4;
            u32::from_ne_bytes(uniforms.as_bytes()[base..base + 4].try_into().unwrap())
        };
        assert_eq!(frame_at(0), 7);
        assert_eq!(frame_at(1), 8);
        assert_eq!(frame_at(2), 9);
    }

    #[test]
    #[should_panic(expected = "at least one region")]
    fn test_zero_count_panics() {
        let _ = UniformBuffer::with_count(small_group(), 0);
    }
}
