//! Persisted parameter document format
//!
//! Each parameter entry carries an explicit `type` discriminator next to a
//! `base` payload so a generic decoder can dispatch to the concrete kind
//! before touching the payload (serde adjacent tagging). An unknown tag or
//! a payload mismatch fails the whole decode.

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::parameters::parameter::{ControlType, Parameter};
use crate::parameters::value::ParameterValue;

#[derive(Serialize, Deserialize)]
pub(crate) struct GroupRepr {
    #[serde(default)]
    pub label: String,
    pub params: Vec<ParamRepr>,
}

/// Base payload for kinds without bounds.
#[derive(Serialize, Deserialize)]
pub(crate) struct ValueRepr<T> {
    pub label: String,
    #[serde(rename = "controlType", default)]
    pub control_type: ControlType,
    pub value: T,
}

/// Base payload for bounded numeric kinds.
#[derive(Serialize, Deserialize)]
pub(crate) struct BoundedRepr<T> {
    pub label: String,
    #[serde(rename = "controlType", default)]
    pub control_type: ControlType,
    pub value: T,
    pub min: T,
    pub max: T,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct StringRepr {
    pub label: String,
    #[serde(rename = "controlType", default)]
    pub control_type: ControlType,
    pub value: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct FileRepr {
    pub label: String,
    #[serde(rename = "controlType", default)]
    pub control_type: ControlType,
    pub value: String,
    #[serde(default)]
    pub recents: Vec<String>,
    #[serde(rename = "allowedTypes", default)]
    pub allowed_types: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "base", rename_all = "lowercase")]
pub(crate) enum ParamRepr {
    Bool(ValueRepr<bool>),
    Int(BoundedRepr<i32>),
    Int2(BoundedRepr<IVec2>),
    Int3(BoundedRepr<IVec3>),
    Int4(BoundedRepr<IVec4>),
    UInt32(BoundedRepr<u32>),
    Float(BoundedRepr<f32>),
    Float2(BoundedRepr<Vec2>),
    Float3(BoundedRepr<Vec3>),
    Float4(BoundedRepr<Vec4>),
    Double(BoundedRepr<f64>),
    PackedFloat3(BoundedRepr<Vec3>),
    Float2x2(ValueRepr<Mat2>),
    Float3x3(ValueRepr<Mat3>),
    Float4x4(ValueRepr<Mat4>),
    String(StringRepr),
    File(FileRepr),
}

/// Encode bounds for a bounded kind, substituting the conventional 0..1
/// defaults when the parameter carries none.
fn bounds<T: Copy>(
    param: &Parameter,
    extract: impl Fn(&ParameterValue) -> Option<T>,
    default_min: T,
    default_max: T,
) -> (T, T) {
    let min = param.min().and_then(&extract).unwrap_or(default_min);
    let max = param.max().and_then(&extract).unwrap_or(default_max);
    (min, max)
}

impl From<&Parameter> for ParamRepr {
    fn from(param: &Parameter) -> Self {
        let label = param.label().to_string();
        let control_type = param.control();
        match param.value() {
            ParameterValue::Bool(v) => ParamRepr::Bool(ValueRepr { label, control_type, value: *v }),
            ParameterValue::Int(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Int(v) => Some(*v),
                        _ => None,
                    },
                    0,
                    1,
                );
                ParamRepr::Int(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Int2(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Int2(v) => Some(*v),
                        _ => None,
                    },
                    IVec2::ZERO,
                    IVec2::ONE,
                );
                ParamRepr::Int2(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Int3(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Int3(v) => Some(*v),
                        _ => None,
                    },
                    IVec3::ZERO,
                    IVec3::ONE,
                );
                ParamRepr::Int3(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Int4(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Int4(v) => Some(*v),
                        _ => None,
                    },
                    IVec4::ZERO,
                    IVec4::ONE,
                );
                ParamRepr::Int4(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::UInt32(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::UInt32(v) => Some(*v),
                        _ => None,
                    },
                    0,
                    1,
                );
                ParamRepr::UInt32(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Float(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Float(v) => Some(*v),
                        _ => None,
                    },
                    0.0,
                    1.0,
                );
                ParamRepr::Float(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Float2(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Float2(v) => Some(*v),
                        _ => None,
                    },
                    Vec2::ZERO,
                    Vec2::ONE,
                );
                ParamRepr::Float2(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Float3(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Float3(v) => Some(*v),
                        _ => None,
                    },
                    Vec3::ZERO,
                    Vec3::ONE,
                );
                ParamRepr::Float3(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Float4(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Float4(v) => Some(*v),
                        _ => None,
                    },
                    Vec4::ZERO,
                    Vec4::ONE,
                );
                ParamRepr::Float4(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Double(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::Double(v) => Some(*v),
                        _ => None,
                    },
                    0.0,
                    1.0,
                );
                ParamRepr::Double(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::PackedFloat3(v) => {
                let (min, max) = bounds(
                    param,
                    |p| match p {
                        ParameterValue::PackedFloat3(v) => Some(*v),
                        _ => None,
                    },
                    Vec3::ZERO,
                    Vec3::ONE,
                );
                ParamRepr::PackedFloat3(BoundedRepr { label, control_type, value: *v, min, max })
            }
            ParameterValue::Float2x2(v) => {
                ParamRepr::Float2x2(ValueRepr { label, control_type, value: *v })
            }
            ParameterValue::Float3x3(v) => {
                ParamRepr::Float3x3(ValueRepr { label, control_type, value: *v })
            }
            ParameterValue::Float4x4(v) => {
                ParamRepr::Float4x4(ValueRepr { label, control_type, value: *v })
            }
            ParameterValue::String(v) => ParamRepr::String(StringRepr {
                label,
                control_type,
                value: v.clone(),
                options: param.options().to_vec(),
            }),
            ParameterValue::File(v) => ParamRepr::File(FileRepr {
                label,
                control_type,
                value: v.clone(),
                recents: param.recents().to_vec(),
                allowed_types: param.allowed_types().to_vec(),
            }),
        }
    }
}

impl From<ParamRepr> for Parameter {
    fn from(repr: ParamRepr) -> Self {
        match repr {
            ParamRepr::Bool(r) => Parameter::bool(r.label, r.value).with_control(r.control_type),
            ParamRepr::Int(r) => Parameter::int(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Int2(r) => Parameter::int2(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Int3(r) => Parameter::int3(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Int4(r) => Parameter::int4(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::UInt32(r) => Parameter::uint32(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Float(r) => Parameter::float(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Float2(r) => Parameter::float2(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Float3(r) => Parameter::float3(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Float4(r) => Parameter::float4(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::Double(r) => Parameter::double(r.label, r.value)
                .with_range(r.min, r.max)
                .with_control(r.control_type),
            ParamRepr::PackedFloat3(r) => Parameter::packed_float3(r.label, r.value)
                .with_range(
                    ParameterValue::PackedFloat3(r.min),
                    ParameterValue::PackedFloat3(r.max),
                )
                .with_control(r.control_type),
            ParamRepr::Float2x2(r) => {
                Parameter::float2x2(r.label, r.value).with_control(r.control_type)
            }
            ParamRepr::Float3x3(r) => {
                Parameter::float3x3(r.label, r.value).with_control(r.control_type)
            }
            ParamRepr::Float4x4(r) => {
                Parameter::float4x4(r.label, r.value).with_control(r.control_type)
            }
            ParamRepr::String(r) => Parameter::string(r.label, r.value)
                .with_options(r.options)
                .with_control(r.control_type),
            ParamRepr::File(r) => {
                let mut param = Parameter::file(r.label, r.value)
                    .with_allowed_types(r.allowed_types)
                    .with_control(r.control_type);
                for recent in r.recents {
                    param.add_recent(recent);
                }
                param
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::group::ParameterGroup;

    fn scalar_group() -> ParameterGroup {
        ParameterGroup::with_params(
            "scalars",
            vec![
                Parameter::bool("flag", true).with_control(ControlType::Toggle),
                Parameter::int("steps", 7).with_range(0, 10),
                Parameter::uint32("seed", 42).with_range(0u32, 100u32),
                Parameter::float("amount", 0.5)
                    .with_range(0.0f32, 1.0f32)
                    .with_control(ControlType::Slider),
                Parameter::double("precision", 0.125),
                Parameter::dropdown(
                    "mode",
                    "additive",
                    vec!["additive".into(), "subtractive".into()],
                ),
            ],
        )
    }

    #[test]
    fn test_document_shape() {
        let group = scalar_group();
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["label"], "scalars");
        assert_eq!(json["params"][0]["type"], "bool");
        assert_eq!(json["params"][0]["base"]["label"], "flag");
        assert_eq!(json["params"][0]["base"]["controlType"], "toggle");
        assert_eq!(json["params"][3]["type"], "float");
        assert_eq!(json["params"][3]["base"]["min"], 0.0);
        assert_eq!(json["params"][3]["base"]["max"], 1.0);
        assert_eq!(json["params"][5]["type"], "string");
    }

    #[test]
    fn test_scalar_round_trip() {
        let group = scalar_group();
        let json = serde_json::to_string(&group).unwrap();
        let decoded: ParameterGroup = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.label(), group.label());
        assert_eq!(decoded.len(), group.len());
        for (a, b) in group.params().iter().zip(decoded.params()) {
            let a = a.borrow();
            let b = b.borrow();
            assert_eq!(a.label(), b.label());
            assert_eq!(a.value(), b.value());
            assert_eq!(a.control(), b.control());
            assert_eq!(a.options(), b.options());
        }
        // Bounds survive
        let steps = decoded.get("steps").unwrap();
        assert_eq!(steps.borrow().min(), Some(&ParameterValue::Int(0)));
        assert_eq!(steps.borrow().max(), Some(&ParameterValue::Int(10)));
    }

    #[test]
    fn test_vector_and_matrix_round_trip() {
        let group = ParameterGroup::with_params(
            "vectors",
            vec![
                Parameter::float3("tint", Vec3::new(0.25, 0.5, 0.75))
                    .with_range(Vec3::ZERO, Vec3::ONE),
                Parameter::packed_float3("offset", Vec3::new(1.0, 2.0, 3.0)),
                Parameter::int3("cells", IVec3::new(4, 5, 6)),
                Parameter::float4x4("transform", Mat4::from_translation(Vec3::X)),
            ],
        );
        let json = serde_json::to_string(&group).unwrap();
        let decoded: ParameterGroup = serde_json::from_str(&json).unwrap();

        assert_eq!(json.matches("packedfloat3").count(), 1);
        for (a, b) in group.params().iter().zip(decoded.params()) {
            assert_eq!(a.borrow().value(), b.borrow().value());
        }
    }

    #[test]
    fn test_unknown_type_tag_fails() {
        let doc = r#"{"label": "g", "params": [{"type": "quaternion", "base": {"label": "q", "value": 0}}]}"#;
        assert!(serde_json::from_str::<ParameterGroup>(doc).is_err());
    }

    #[test]
    fn test_payload_mismatch_fails() {
        // float tag with a boolean payload
        let doc = r#"{"label": "g", "params": [{"type": "float", "base": {"label": "x", "value": true, "min": 0.0, "max": 1.0}}]}"#;
        assert!(serde_json::from_str::<ParameterGroup>(doc).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let group = ParameterGroup::with_params(
            "io",
            vec![Parameter::file("source", "/tmp/mesh.obj")
                .with_allowed_types(vec!["obj".into(), "gltf".into()])],
        );
        let json = serde_json::to_string(&group).unwrap();
        let decoded: ParameterGroup = serde_json::from_str(&json).unwrap();
        let file = decoded.get("source").unwrap();
        assert_eq!(
            file.borrow().value(),
            &ParameterValue::File("/tmp/mesh.obj".into())
        );
        assert_eq!(file.borrow().allowed_types(), ["obj", "gltf"]);
        assert_eq!(file.borrow().control(), ControlType::FilePicker);
    }
}
