use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::util::bounds::Bounds;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Picking", inline)]
#[serde(default)]
/// GPU picking parameters.
pub struct PickingOptions {
    /// Half extent of the cube used to normalize picked positions when the
    /// caller supplies no range.
    #[schemars(skip)]
    pub position_range: f64,
}

impl Default for PickingOptions {
    fn default() -> Self {
        Self {
            position_range: 100_000.0,
        }
    }
}

impl PickingOptions {
    /// Default bounding range for position picks.
    #[must_use]
    pub fn position_bounds(&self) -> Bounds {
        Bounds::cube(self.position_range)
    }
}
