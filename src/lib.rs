// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Camera, viewport and picking building blocks for wgpu 3D viewers.
//!
//! Vantage provides the interaction layer that sits between a host's input
//! events and its renderer: a perspective/orthographic camera model, an
//! orbit manipulator with release inertia, canvas viewports that route
//! events and keep camera aspects in sync, and a GPU picking engine that
//! reads object ids, positions and normals under a pixel.
//!
//! # Key entry points
//!
//! - [`camera::CameraModel`] - projection parameters and camera transform
//! - [`camera::OrbitManipulator`] - pointer/wheel input to orbit pose
//! - [`viewport::Viewport`] and [`viewport::ViewportSet`] - canvas regions
//!   and first-match event routing
//! - [`picking::PickingEngine`] - index, position and normal pick passes
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Frame flow
//!
//! Input events go through [`viewport::ViewportSet::on_pointer`] and
//! [`viewport::ViewportSet::on_trigger`], which hit-test viewports and hand
//! events to their manipulators. Once per frame,
//! [`viewport::Viewport::update_camera`] advances each manipulator into its
//! camera and syncs the aspect ratio. Pick queries render through a
//! [`viewport::PickRect`] and block on the GPU readback.

pub mod camera;
pub mod error;
pub mod input;
pub mod options;
pub mod picking;
pub mod util;
pub mod viewport;

pub use error::VantageError;
