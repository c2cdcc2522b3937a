//! Parameter value variants and their GPU layout metadata
//!
//! Every parameter kind carries a fixed size/alignment/stride matching the
//! uniform struct layout the shader side declares. `vec3`-shaped kinds have
//! size 12 but alignment 16, so the trailing pad is produced by whatever is
//! written next; `packed_float3` keeps the tight 4-byte alignment.

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::parameters::layout::{ByteCursor, ByteReader};

/// Discriminant for every concrete parameter kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Bool,
    Int,
    Int2,
    Int3,
    Int4,
    UInt32,
    Float,
    Float2,
    Float3,
    Float4,
    Double,
    PackedFloat3,
    Float2x2,
    Float3x3,
    Float4x4,
    String,
    File,
}

impl ParameterKind {
    /// Payload byte size. String/File are UI-only and report a nominal
    /// pointer-sized footprint.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int | Self::UInt32 | Self::Float => 4,
            Self::Int2 | Self::Float2 | Self::Double => 8,
            Self::Int3 | Self::Float3 | Self::PackedFloat3 => 12,
            Self::Int4 | Self::Float4 | Self::Float2x2 => 16,
            Self::Float3x3 => 48,
            Self::Float4x4 => 64,
            Self::String | Self::File => std::mem::size_of::<usize>(),
        }
    }

    /// Required byte alignment, matching GPU uniform layout conventions.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int | Self::UInt32 | Self::Float | Self::PackedFloat3 => 4,
            Self::Int2 | Self::Float2 | Self::Double | Self::Float2x2 => 8,
            Self::Int3 | Self::Float3 => 16,
            Self::Int4 | Self::Float4 => 16,
            Self::Float3x3 | Self::Float4x4 => 16,
            Self::String | Self::File => std::mem::align_of::<usize>(),
        }
    }

    /// Size padded up to alignment.
    pub fn stride(&self) -> usize {
        let size = self.size();
        let alignment = self.alignment();
        let rem = size % alignment;
        if rem > 0 { size + alignment - rem } else { size }
    }

    /// Shader-source field type name. Must agree with `size`/`alignment`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int2 => "int2",
            Self::Int3 => "int3",
            Self::Int4 => "int4",
            Self::UInt32 => "uint32_t",
            Self::Float => "float",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Double => "double",
            Self::PackedFloat3 => "packed_float3",
            Self::Float2x2 => "float2x2",
            Self::Float3x3 => "float3x3",
            Self::Float4x4 => "float4x4",
            Self::String => "string",
            Self::File => "file",
        }
    }

    /// Whether min/max bounds apply to this kind.
    pub fn is_bounded(&self) -> bool {
        !matches!(
            self,
            Self::Bool
                | Self::Float2x2
                | Self::Float3x3
                | Self::Float4x4
                | Self::String
                | Self::File
        )
    }
}

/// A single typed parameter payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    Int2(IVec2),
    Int3(IVec3),
    Int4(IVec4),
    UInt32(u32),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Double(f64),
    PackedFloat3(Vec3),
    Float2x2(Mat2),
    Float3x3(Mat3),
    Float4x4(Mat4),
    String(String),
    File(String),
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Bool(_) => ParameterKind::Bool,
            Self::Int(_) => ParameterKind::Int,
            Self::Int2(_) => ParameterKind::Int2,
            Self::Int3(_) => ParameterKind::Int3,
            Self::Int4(_) => ParameterKind::Int4,
            Self::UInt32(_) => ParameterKind::UInt32,
            Self::Float(_) => ParameterKind::Float,
            Self::Float2(_) => ParameterKind::Float2,
            Self::Float3(_) => ParameterKind::Float3,
            Self::Float4(_) => ParameterKind::Float4,
            Self::Double(_) => ParameterKind::Double,
            Self::PackedFloat3(_) => ParameterKind::PackedFloat3,
            Self::Float2x2(_) => ParameterKind::Float2x2,
            Self::Float3x3(_) => ParameterKind::Float3x3,
            Self::Float4x4(_) => ParameterKind::Float4x4,
            Self::String(_) => ParameterKind::String,
            Self::File(_) => ParameterKind::File,
        }
    }

    /// Component count. Strings report their character count.
    pub fn count(&self) -> usize {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::UInt32(_) | Self::Float(_) | Self::Double(_) => 1,
            Self::Int2(_) | Self::Float2(_) => 2,
            Self::Int3(_) | Self::Float3(_) | Self::PackedFloat3(_) => 3,
            Self::Int4(_) | Self::Float4(_) | Self::Float2x2(_) => 4,
            Self::Float3x3(_) => 9,
            Self::Float4x4(_) => 16,
            Self::String(s) => s.chars().count(),
            Self::File(_) => 1,
        }
    }

    /// Align the cursor, then write this value's component bytes.
    ///
    /// Float3/Int3 write 12 payload bytes; the pad up to 16 falls out of the
    /// next write's alignment. Matrix columns carry their column padding
    /// inside `size`, so float3x3 always consumes 48 bytes. String/File
    /// write zeros to keep offset arithmetic consistent with `size`.
    pub fn write(&self, cursor: &mut ByteCursor<'_>) {
        cursor.align_to(self.kind().alignment());
        match self {
            Self::Bool(v) => cursor.write(&[u8::from(*v)]),
            Self::Int(v) => cursor.write(bytemuck::bytes_of(v)),
            Self::Int2(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Int3(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Int4(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::UInt32(v) => cursor.write(bytemuck::bytes_of(v)),
            Self::Float(v) => cursor.write(bytemuck::bytes_of(v)),
            Self::Float2(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Float3(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Float4(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Double(v) => cursor.write(bytemuck::bytes_of(v)),
            Self::PackedFloat3(v) => cursor.write(bytemuck::bytes_of(&v.to_array())),
            Self::Float2x2(m) => cursor.write(bytemuck::bytes_of(&m.to_cols_array())),
            Self::Float3x3(m) => {
                for col in m.to_cols_array_2d() {
                    cursor.write(bytemuck::bytes_of(&col));
                    cursor.write_zeros(4);
                }
            }
            Self::Float4x4(m) => cursor.write(bytemuck::bytes_of(&m.to_cols_array())),
            Self::String(_) | Self::File(_) => cursor.write_zeros(self.kind().size()),
        }
    }

    /// Align the reader, then decode a value of this kind from its bytes.
    /// Exact inverse of [`write`](Self::write). String/File skip their
    /// nominal footprint and keep the current value.
    pub fn read(&self, reader: &mut ByteReader<'_>) -> ParameterValue {
        reader.align_to(self.kind().alignment());
        match self {
            Self::Bool(_) => Self::Bool(reader.read(1)[0] != 0),
            Self::Int(_) => Self::Int(bytemuck::pod_read_unaligned(reader.read(4))),
            Self::Int2(_) => {
                Self::Int2(IVec2::from_array(bytemuck::pod_read_unaligned(reader.read(8))))
            }
            Self::Int3(_) => {
                Self::Int3(IVec3::from_array(bytemuck::pod_read_unaligned(reader.read(12))))
            }
            Self::Int4(_) => {
                Self::Int4(IVec4::from_array(bytemuck::pod_read_unaligned(reader.read(16))))
            }
            Self::UInt32(_) => Self::UInt32(bytemuck::pod_read_unaligned(reader.read(4))),
            Self::Float(_) => Self::Float(bytemuck::pod_read_unaligned(reader.read(4))),
            Self::Float2(_) => {
                Self::Float2(Vec2::from_array(bytemuck::pod_read_unaligned(reader.read(8))))
            }
            Self::Float3(_) => {
                Self::Float3(Vec3::from_array(bytemuck::pod_read_unaligned(reader.read(12))))
            }
            Self::Float4(_) => {
                Self::Float4(Vec4::from_array(bytemuck::pod_read_unaligned(reader.read(16))))
            }
            Self::Double(_) => Self::Double(bytemuck::pod_read_unaligned(reader.read(8))),
            Self::PackedFloat3(_) => {
                Self::PackedFloat3(Vec3::from_array(bytemuck::pod_read_unaligned(reader.read(12))))
            }
            Self::Float2x2(_) => {
                let cols: [f32; 4] = bytemuck::pod_read_unaligned(reader.read(16));
                Self::Float2x2(Mat2::from_cols_array(&cols))
            }
            Self::Float3x3(_) => {
                let mut cols = [0f32; 9];
                for c in 0..3 {
                    let col: [f32; 3] = bytemuck::pod_read_unaligned(reader.read(12));
                    cols[c * 3..c * 3 + 3].copy_from_slice(&col);
                    reader.skip(4);
                }
                Self::Float3x3(Mat3::from_cols_array(&cols))
            }
            Self::Float4x4(_) => {
                let cols: [f32; 16] = bytemuck::pod_read_unaligned(reader.read(64));
                Self::Float4x4(Mat4::from_cols_array(&cols))
            }
            Self::String(s) => {
                reader.skip(self.kind().size());
                Self::String(s.clone())
            }
            Self::File(s) => {
                reader.skip(self.kind().size());
                Self::File(s.clone())
            }
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<IVec2> for ParameterValue {
    fn from(v: IVec2) -> Self {
        Self::Int2(v)
    }
}

impl From<IVec3> for ParameterValue {
    fn from(v: IVec3) -> Self {
        Self::Int3(v)
    }
}

impl From<IVec4> for ParameterValue {
    fn from(v: IVec4) -> Self {
        Self::Int4(v)
    }
}

impl From<u32> for ParameterValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<f32> for ParameterValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for ParameterValue {
    fn from(v: Vec2) -> Self {
        Self::Float2(v)
    }
}

impl From<Vec3> for ParameterValue {
    fn from(v: Vec3) -> Self {
        Self::Float3(v)
    }
}

impl From<Vec4> for ParameterValue {
    fn from(v: Vec4) -> Self {
        Self::Float4(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Mat2> for ParameterValue {
    fn from(v: Mat2) -> Self {
        Self::Float2x2(v)
    }
}

impl From<Mat3> for ParameterValue {
    fn from(v: Mat3) -> Self {
        Self::Float3x3(v)
    }
}

impl From<Mat4> for ParameterValue {
    fn from(v: Mat4) -> Self {
        Self::Float4x4(v)
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
