//! Single-copy packed parameter buffer
//!
//! Binds a parameter group to one packed memory region. `update` rewrites
//! the whole region from the parameters; `sync` is the inverse and reads
//! the region back into the parameter values, for when the GPU or another
//! producer wrote the bytes.

use crate::parameters::ParameterGroup;

pub struct Buffer {
    parameters: ParameterGroup,
    data: Vec<u8>,
}

impl Buffer {
    /// Allocate a region of exactly the group's packed size.
    ///
    /// # Panics
    ///
    /// Panics on a zero-sized group: the buffer cannot operate without
    /// backing memory, and that is a configuration error, not a retryable
    /// condition.
    pub fn new(parameters: ParameterGroup) -> Self {
        let size = parameters.size();
        assert!(size > 0, "cannot create a buffer for an empty parameter group");
        Self { data: vec![0u8; size], parameters }
    }

    /// Rewrite the entire region from the parameter values, in order.
    /// There is no partial update; the region is fully consistent after
    /// every call.
    pub fn update(&mut self) {
        self.parameters.write_packed(&mut self.data);
    }

    /// Read the region back into the parameter values using the identical
    /// per-parameter alignment walk.
    pub fn sync(&mut self) {
        self.parameters.read_packed(&self.data);
    }

    pub fn parameters(&self) -> &ParameterGroup {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterGroup {
        &mut self.parameters
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access for external producers (e.g. GPU readback) before a
    /// `sync`.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{Parameter, ParameterValue};
    use glam::{IVec3, Mat4, Vec3, Vec4};

    fn mixed_group() -> ParameterGroup {
        ParameterGroup::with_params(
            "mixed",
            vec![
                Parameter::bool("flag", true),
                Parameter::float("amount", 0.5),
                Parameter::int3("cells", IVec3::new(1, -2, 3)),
                Parameter::float4("color", Vec4::new(0.1, 0.2, 0.3, 1.0)),
                Parameter::packed_float3("offset", Vec3::new(4.0, 5.0, 6.0)),
                Parameter::float4x4("transform", Mat4::from_translation(Vec3::Y)),
                Parameter::double("precision", 0.0625),
            ],
        )
    }

    #[test]
    fn test_packing_round_trip() {
        let mut buffer = Buffer::new(mixed_group());
        buffer.update();

        // Clobber the values, then restore them from the packed bytes
        {
            let parameters = buffer.parameters();
            parameters.set("flag", false);
            parameters.set("amount", 0.0f32);
            parameters.set("cells", IVec3::ZERO);
            parameters.set("color", Vec4::ZERO);
            parameters.set("offset", ParameterValue::PackedFloat3(Vec3::ZERO));
            parameters.set("transform", Mat4::IDENTITY);
            parameters.set("precision", 0.0f64);
        }
        buffer.sync();

        let parameters = buffer.parameters();
        assert_eq!(
            parameters.get("flag").unwrap().borrow().value(),
            &ParameterValue::Bool(true)
        );
        assert_eq!(
            parameters.get("amount").unwrap().borrow().value(),
            &ParameterValue::Float(0.5)
        );
        assert_eq!(
            parameters.get("cells").unwrap().borrow().value(),
            &ParameterValue::Int3(IVec3::new(1, -2, 3))
        );
        assert_eq!(
            parameters.get("color").unwrap().borrow().value(),
            &ParameterValue::Float4(Vec4::new(0.1, 0.2, 0.3, 1.0))
        );
        assert_eq!(
            parameters.get("offset").unwrap().borrow().value(),
            &ParameterValue::PackedFloat3(Vec3::new(4.0, 5.0, 6.0))
        );
        assert_eq!(
            parameters.get("transform").unwrap().borrow().value(),
            &ParameterValue::Float4x4(Mat4::from_translation(Vec3::Y))
        );
        assert_eq!(
            parameters.get("precision").unwrap().borrow().value(),
            &ParameterValue::Double(0.0625)
        );
    }

    #[test]
    fn test_sync_reads_external_bytes() {
        let group = ParameterGroup::with_params("g", vec![Parameter::float("amount", 0.0)]);
        let mut buffer = Buffer::new(group);
        buffer.bytes_mut()[0..4].copy_from_slice(&2.5f32.to_ne_bytes());
        buffer.sync();
        assert_eq!(
            buffer.parameters().get("amount").unwrap().borrow().value(),
            &ParameterValue::Float(2.5)
        );
    }

    #[test]
    fn test_region_size_matches_group() {
        let group = mixed_group();
        let expected = group.size();
        let buffer = Buffer::new(group);
        assert_eq!(buffer.as_bytes().len(), expected);
    }

    #[test]
    #[should_panic(expected = "empty parameter group")]
    fn test_zero_sized_group_panics() {
        let _ = Buffer::new(ParameterGroup::new("empty"));
    }
}
