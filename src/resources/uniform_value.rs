//! Typed uniform values (design §9: replace duck-typed number lists with a
//! closed sum type).
//!
//! [`UniformValue`] is what [`crate::renderer::pipeline::uniform_uploader::UniformUploader`]
//! dispatches on. There is no runtime inspection of slice lengths or element
//! types anywhere in the upload path; every call site constructs the
//! variant that matches the uniform it is writing.

/// A single GPU uniform value, tagged by shape.
///
/// Matrix variants carry their data in a `Box<[f32; N]>` rather than a bare
/// array so that cloning a `UniformValue` (e.g. when diffing state) does not
/// copy 9 or 16 floats onto the stack of every intermediate.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3(Box<[f32; 9]>),
    Mat4(Box<[f32; 16]>),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
}

impl UniformValue {
    /// Byte length of this value as it would be written into a GPU buffer.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            UniformValue::Scalar(_) | UniformValue::Int(_) => 4,
            UniformValue::Vec2(_) | UniformValue::IVec2(_) => 8,
            UniformValue::Vec3(_) | UniformValue::IVec3(_) => 12,
            UniformValue::Vec4(_) | UniformValue::IVec4(_) => 16,
            UniformValue::Mat3(_) => 36,
            UniformValue::Mat4(_) => 64,
        }
    }

    /// Writes this value's bytes into `dst`, which must be at least
    /// [`UniformValue::byte_len`] bytes. Used by the uploader's preallocated
    /// matrix buffers so a `Mat3`/`Mat4` write never allocates.
    pub fn write_into(&self, dst: &mut [u8]) {
        let bytes: &[u8] = match self {
            UniformValue::Scalar(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::cast_slice(v),
            UniformValue::Vec3(v) => bytemuck::cast_slice(v),
            UniformValue::Vec4(v) => bytemuck::cast_slice(v),
            UniformValue::Mat3(v) => bytemuck::cast_slice(v.as_slice()),
            UniformValue::Mat4(v) => bytemuck::cast_slice(v.as_slice()),
            UniformValue::IVec2(v) => bytemuck::cast_slice(v),
            UniformValue::IVec3(v) => bytemuck::cast_slice(v),
            UniformValue::IVec4(v) => bytemuck::cast_slice(v),
        };
        dst[..bytes.len()].copy_from_slice(bytes);
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Scalar(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(v: glam::Vec3) -> Self {
        UniformValue::Vec3(v.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mat3_round_trips_through_write_into() {
        let m = UniformValue::Mat3(Box::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]));
        let mut buf = vec![0u8; m.byte_len()];
        m.write_into(&mut buf);
        let floats: &[f32] = bytemuck::cast_slice(&buf);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn scalar_byte_len_is_four() {
        assert_eq!(UniformValue::Scalar(1.0).byte_len(), 4);
        assert_eq!(UniformValue::Vec4([0.0; 4]).byte_len(), 16);
        assert_eq!(UniformValue::Mat4(Box::new([0.0; 16])).byte_len(), 64);
    }
}
