//! Byte encodings written by the pick shaders and their decoders.
//!
//! The encoders mirror `pick.wgsl` so software renderers and tests can
//! produce the same pixels the GPU does.

use glam::DVec3;

/// Largest identifier that fits the 24-bit index encoding.
pub const MAX_OBJECT_ID: u32 = 0x00FF_FFFF;

/// Identifier of a pickable object. Zero is reserved for "nothing here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// One decoded pick query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickSample {
    /// The index pass found no object.
    Miss,
    /// The index pass found an object.
    Object(ObjectId),
    /// Position from the three position passes.
    Position(DVec3),
    /// Unit surface normal from the normal pass.
    Normal(DVec3),
}

/// Pack an object identifier into RGB, little-endian. Alpha is opaque.
///
/// Bits above [`MAX_OBJECT_ID`] are dropped.
#[must_use]
pub fn encode_index(id: u32) -> [u8; 4] {
    let [r, g, b, _] = id.to_le_bytes();
    [r, g, b, 255]
}

/// Unpack an identifier written by [`encode_index`]. Zero means a miss.
#[must_use]
pub fn decode_index(pixel: &[u8; 4]) -> u32 {
    u32::from(pixel[0]) + u32::from(pixel[1]) * 256 + u32::from(pixel[2]) * 65_536
}

/// Decode an index pixel, mapping zero to `None`.
#[must_use]
pub fn decode_object(pixel: &[u8; 4]) -> Option<ObjectId> {
    match decode_index(pixel) {
        0 => None,
        id => Some(ObjectId(id)),
    }
}

/// Spread a value in `[0, 1]` over four bytes of fixed-point precision.
/// Values outside the range are clamped.
#[must_use]
pub fn encode_unit(value: f64) -> [u8; 4] {
    let x = value.clamp(0.0, 1.0) * 255.0;
    let b0 = x.floor();
    let r1 = (x - b0) * 256.0;
    let b1 = r1.floor();
    let r2 = (r1 - b1) * 256.0;
    let b2 = r2.floor();
    let b3 = ((r2 - b2) * 256.0).floor().min(255.0);
    [b0 as u8, b1 as u8, b2 as u8, b3 as u8]
}

/// Inverse of [`encode_unit`].
#[must_use]
pub fn decode_unit(pixel: &[u8; 4]) -> f64 {
    f64::from(pixel[0]) / 255.0
        + f64::from(pixel[1]) / 255.0 / 256.0
        + f64::from(pixel[2]) / 255.0 / 65_536.0
        + f64::from(pixel[3]) / 255.0 / 16_777_216.0
}

/// Decode one position axis and map it back from `[0, 1]` to
/// `[min, max]`.
#[must_use]
pub fn decode_axis(pixel: &[u8; 4], min: f64, max: f64) -> f64 {
    decode_unit(pixel) * (max - min) + min
}

/// Remap a unit normal from `[-1, 1]` to RGB bytes. Alpha is opaque.
#[must_use]
pub fn encode_normal(normal: DVec3) -> [u8; 4] {
    let unit = (normal * 0.5 + 0.5).clamp(DVec3::ZERO, DVec3::ONE) * 255.0;
    [
        unit.x.round() as u8,
        unit.y.round() as u8,
        unit.z.round() as u8,
        255,
    ]
}

/// Inverse of [`encode_normal`], renormalized. A zero vector stays zero.
#[must_use]
pub fn decode_normal(pixel: &[u8; 4]) -> DVec3 {
    DVec3::new(
        f64::from(pixel[0]) / 255.0 * 2.0 - 1.0,
        f64::from(pixel[1]) / 255.0 * 2.0 - 1.0,
        f64::from(pixel[2]) / 255.0 * 2.0 - 1.0,
    )
    .normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_decodes_little_endian() {
        assert_eq!(decode_index(&[42, 0, 0, 255]), 42);
        assert_eq!(decode_index(&[0, 1, 0, 255]), 256);
        assert_eq!(decode_index(&[1, 2, 3, 0]), 1 + 2 * 256 + 3 * 65_536);
        assert_eq!(decode_index(&encode_index(MAX_OBJECT_ID)), MAX_OBJECT_ID);
    }

    #[test]
    fn zero_index_is_a_miss() {
        assert_eq!(decode_object(&[0, 0, 0, 0]), None);
        assert_eq!(decode_object(&[0, 0, 0, 255]), None);
        assert_eq!(decode_object(&[42, 0, 0, 255]), Some(ObjectId(42)));
    }

    #[test]
    fn position_bytes_span_the_range() {
        assert!((decode_axis(&[255, 255, 255, 255], 0.0, 10.0) - 10.0).abs() < 0.05);
        assert!(decode_axis(&[0, 0, 0, 0], 0.0, 10.0).abs() < 1e-12);
        assert!((decode_axis(&[0, 0, 0, 0], -5.0, 5.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn unit_encoding_keeps_sub_byte_precision() {
        for value in [0.0, 0.123_456_7, 0.5, 0.999_9, 1.0] {
            let decoded = decode_unit(&encode_unit(value));
            assert!((decoded - value).abs() < 1e-8, "{value} -> {decoded}");
        }
        // Out of range input is clamped
        assert_eq!(encode_unit(-3.0), [0, 0, 0, 0]);
        assert_eq!(encode_unit(7.0), [255, 0, 0, 0]);
    }

    #[test]
    fn normal_decode_is_unit_length() {
        let n = DVec3::new(0.3, -0.5, 0.8).normalize();
        let decoded = decode_normal(&encode_normal(n));
        assert!((decoded.length() - 1.0).abs() < 1e-12);
        assert!(decoded.dot(n) > 0.999);

        let up = decode_normal(&encode_normal(DVec3::Y));
        assert!((up - DVec3::Y).length() < 0.01);
    }
}
