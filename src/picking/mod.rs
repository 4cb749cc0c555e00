//! GPU object picking.
//!
//! Renders the scene under one pixel with override materials that encode
//! object ids, world positions or normals into color, then reads the pixel
//! back and decodes it.

mod codec;
mod engine;
pub mod gpu;

pub use codec::{
    decode_axis, decode_index, decode_normal, decode_object, decode_unit,
    encode_index, encode_normal, encode_unit, ObjectId, PickSample,
    MAX_OBJECT_ID,
};
pub use engine::{
    Axis, PickMaterial, PickRenderer, PickResult, PickingEngine,
    PICK_TARGET_SIZE,
};
pub use gpu::{
    GpuPickScene, GpuPickTarget, PickMesh, PickUniform, PickVertex,
    WgpuPickRenderer,
};
