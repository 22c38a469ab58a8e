use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{Direction, GamepadButton, MapId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::plugins::EntryDirection;

pub(crate) const PLUGINS_FILE: &str = "plugins.json";
pub(crate) const MAPS_FILE: &str = "maps.json";

#[derive(Debug, Error)]
pub(crate) enum ParamsError {
    #[error("read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse '{file}'{}: {source}", at_path(.path))]
    Parse {
        file: PathBuf,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {path}: expected {expected}, got {actual}")]
    Validation {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("auto-color word list does not compile: {0}")]
    AutoColorPattern(#[from] regex::Error),
}

fn at_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else {
        format!(" at {path}")
    }
}

/// Every configurable value of the plugin set, as read from
/// `data/plugins.json`. Absent fields take the plugins' stock defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PluginParameters {
    pub(crate) system: SystemParams,
    pub(crate) vehicle_interiors: VehicleInteriorParams,
    /// Word lists keyed `C0`..`C31`.
    pub(crate) auto_colors: BTreeMap<String, Vec<String>>,
    pub(crate) custom_font: CustomFontParams,
    pub(crate) virtual_joystick: VirtualJoystickParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SystemParams {
    pub(crate) touch_ui: bool,
    pub(crate) start_map_id: MapId,
    pub(crate) start_x: i32,
    pub(crate) start_y: i32,
    pub(crate) start_direction: Direction,
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            touch_ui: true,
            start_map_id: MapId(1),
            start_x: 8,
            start_y: 6,
            start_direction: Direction::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct InteriorLocationParams {
    pub(crate) map_id: MapId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) direction: EntryDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct VehicleInteriorParams {
    pub(crate) interior_key: String,
    /// Standard-mapping index, 0..=15.
    pub(crate) gamepad_button: usize,
    pub(crate) interior_button_offset: u32,
    pub(crate) interior_button_width: u32,
    /// 0 disables the switch check.
    pub(crate) interior_enable_switch: u32,
    pub(crate) boat: InteriorLocationParams,
    pub(crate) ship: InteriorLocationParams,
    pub(crate) airship: InteriorLocationParams,
}

impl Default for VehicleInteriorParams {
    fn default() -> Self {
        Self {
            interior_key: "a".to_string(),
            gamepad_button: 0,
            interior_button_offset: 11,
            interior_button_width: 1,
            interior_enable_switch: 1,
            boat: InteriorLocationParams::default(),
            ship: InteriorLocationParams::default(),
            airship: InteriorLocationParams::default(),
        }
    }
}

impl VehicleInteriorParams {
    pub(crate) fn gamepad_button(&self) -> Result<GamepadButton, ParamsError> {
        GamepadButton::from_index(self.gamepad_button).ok_or_else(|| ParamsError::Validation {
            path: "vehicle_interiors.gamepad_button".to_string(),
            expected: "a standard gamepad button index in 0..=15".to_string(),
            actual: self.gamepad_button.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CustomFontParams {
    pub(crate) font_face: String,
}

impl Default for CustomFontParams {
    fn default() -> Self {
        Self {
            font_face: "Coneria Pixel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScreenPoint {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct VirtualJoystickParams {
    pub(crate) joystick_x: f32,
    pub(crate) joystick_y: f32,
    pub(crate) joystick_radius: f32,
    pub(crate) button_radius: f32,
    pub(crate) button_a: ScreenPoint,
    pub(crate) button_b: ScreenPoint,
    pub(crate) button_c: ScreenPoint,
    pub(crate) deadzone: f32,
}

impl Default for VirtualJoystickParams {
    fn default() -> Self {
        Self {
            joystick_x: 150.0,
            joystick_y: 500.0,
            joystick_radius: 60.0,
            button_radius: 50.0,
            button_a: ScreenPoint { x: 900.0, y: 450.0 },
            button_b: ScreenPoint { x: 1020.0, y: 450.0 },
            button_c: ScreenPoint { x: 960.0, y: 540.0 },
            deadzone: 0.2,
        }
    }
}

impl PluginParameters {
    pub(crate) fn validate(&self) -> Result<(), ParamsError> {
        self.vehicle_interiors.gamepad_button()?;
        if self.vehicle_interiors.interior_key.is_empty() {
            return Err(ParamsError::Validation {
                path: "vehicle_interiors.interior_key".to_string(),
                expected: "a non-empty key name".to_string(),
                actual: "\"\"".to_string(),
            });
        }
        let joystick = &self.virtual_joystick;
        if !(joystick.joystick_radius.is_finite() && joystick.joystick_radius > 0.0) {
            return Err(ParamsError::Validation {
                path: "virtual_joystick.joystick_radius".to_string(),
                expected: "a finite radius > 0".to_string(),
                actual: joystick.joystick_radius.to_string(),
            });
        }
        if !(0.0..1.0).contains(&joystick.deadzone) {
            return Err(ParamsError::Validation {
                path: "virtual_joystick.deadzone".to_string(),
                expected: "a value in [0, 1)".to_string(),
                actual: joystick.deadzone.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_parameters_json(raw: &str, file: &Path) -> Result<PluginParameters, ParamsError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let params = serde_path_to_error::deserialize::<_, PluginParameters>(&mut deserializer)
        .map_err(|error| ParamsError::Parse {
            file: file.to_path_buf(),
            path: error.path().to_string(),
            source: error.into_inner(),
        })?;
    params.validate()?;
    Ok(params)
}

/// Reads `<data_dir>/plugins.json`; a missing file yields the defaults.
pub(crate) fn load_parameters(data_dir: &Path) -> Result<PluginParameters, ParamsError> {
    let path = data_dir.join(PLUGINS_FILE);
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let params = parse_parameters_json(&raw, &path)?;
            info!(path = %path.display(), "plugin_parameters_loaded");
            Ok(params)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "plugin_parameters_missing_using_defaults");
            Ok(PluginParameters::default())
        }
        Err(source) => Err(ParamsError::Read { path, source }),
    }
}
