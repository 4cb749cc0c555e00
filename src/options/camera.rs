use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::ProjectionKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Initial projection parameters for built-in viewport cameras.
pub struct CameraOptions {
    /// Projection used when a viewport creates its camera.
    #[schemars(title = "Projection")]
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 10.0, max = 120.0), extend("step" = 1.0))]
    pub fov: f64,
    /// Vertical view-volume extent for orthographic projection.
    #[schemars(title = "Ortho Size", range(min = 0.1, max = 1000.0))]
    pub size: f64,
    /// Zoom factor.
    #[schemars(skip)]
    pub zoom: f64,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub near: f64,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub far: f64,
    /// Film frame size in millimeters along its larger side, for focal
    /// length conversions.
    #[schemars(skip)]
    pub film_gauge: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            fov: 50.0,
            size: 20.0,
            zoom: 1.0,
            near: 0.1,
            far: 2000.0,
            film_gauge: 35.0,
        }
    }
}
