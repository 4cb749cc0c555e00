//! Centralized camera, manipulator and picking options with TOML preset
//! support.
//!
//! Every sub-struct uses `#[serde(default)]`, so a preset file only needs to
//! list the values it overrides.

mod camera;
mod manipulator;
mod picking;

use std::path::Path;

pub use camera::CameraOptions;
pub use manipulator::{AxisRange, ManipulatorOptions};
pub use picking::PickingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::VantageError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Projection parameters for built-in cameras.
    pub camera: CameraOptions,
    /// Orbit manipulator tuning and limits.
    pub manipulator: ManipulatorOptions,
    /// GPU picking parameters.
    pub picking: PickingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VantageError> {
        let content = std::fs::read_to_string(path)?;
        let options = toml::from_str(&content)
            .map_err(|e| VantageError::OptionsParse(e.to_string()))?;
        log::info!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VantageError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VantageError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        log::info!("Saved options to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ProjectionKind;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[camera]
projection = "orthographic"

[manipulator]
damping = 0.5
yaw = { min = -45.0, max = 45.0 }
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.camera.projection, ProjectionKind::Orthographic);
        assert_eq!(opts.camera.fov, 50.0);
        assert_eq!(opts.manipulator.damping, 0.5);
        assert_eq!(opts.manipulator.yaw, AxisRange::between(-45.0, 45.0));
        // Untouched limits keep their defaults
        assert_eq!(opts.manipulator.pitch, AxisRange::between(-90.0, 90.0));
        assert_eq!(opts.picking.position_range, 100_000.0);
    }

    #[test]
    fn absent_bounds_become_nan_limits() {
        let opts = ManipulatorOptions::default();
        let orientation = opts.orientation_limits();
        assert_eq!(orientation.min.x, -90.0);
        assert_eq!(orientation.max.x, 90.0);
        assert!(orientation.min.y.is_nan());
        assert!(orientation.max.z.is_nan());

        let offset = opts.offset_limits();
        assert!(offset.min.x.is_nan());
        assert_eq!(offset.min.z, 0.1);
        assert_eq!(offset.max.z, 100.0);
    }

    #[test]
    fn save_then_load_preserves_options() {
        let dir = std::env::temp_dir().join("vantage-options-test");
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.manipulator.camera_mode = false;
        opts.camera.size = 42.0;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = std::env::temp_dir().join("vantage-options-bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[camera\nfov = ").unwrap();
        let err = Options::load(&path).unwrap_err();
        assert!(matches!(err, VantageError::OptionsParse(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("manipulator"));
        assert!(props.contains_key("picking"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fov").is_some());
        assert!(camera.get("near").is_none());

        let manip = &props["manipulator"]["properties"];
        assert!(manip.get("damping").is_some());
        assert!(manip.get("pitch").is_none());
    }
}
