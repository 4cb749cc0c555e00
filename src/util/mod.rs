//! Shared geometry helpers.

pub mod bounds;
