use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::{
    Direction, GameState, MapId, Switches, TransferError, TransferRequest, VehicleType, Vehicles,
};
use crate::atomic_io::write_text_atomic;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("read save '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write save '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode save json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("parse save json{}: {source}", at_path(.path))]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {path}: expected {expected}, got {actual}")]
    Validation {
        path: &'static str,
        expected: String,
        actual: String,
    },
    #[error("plugin section '{key}': {source}")]
    PluginSection {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("saved position is not valid: {0}")]
    Position(#[from] TransferError),
}

fn at_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else {
        format!(" at {path}")
    }
}

/// Per-plugin JSON sections stored inside a save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginSaveData {
    sections: BTreeMap<String, serde_json::Value>,
}

impl PluginSaveData {
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SaveError> {
        let Some(value) = self.sections.get(key) else {
            return Ok(None);
        };
        T::deserialize(value)
            .map(Some)
            .map_err(|source| SaveError::PluginSection {
                key: key.to_string(),
                source,
            })
    }

    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), SaveError> {
        let value = serde_json::to_value(value).map_err(|source| SaveError::PluginSection {
            key: key.to_string(),
            source,
        })?;
        self.sections.insert(key.to_string(), value);
        Ok(())
    }

    /// Returns the stored section, or stores and returns `default()` when the
    /// section is absent. An existing section is never overwritten.
    pub fn get_or_insert_with<T, F>(&mut self, key: &str, default: F) -> Result<T, SaveError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.read(key)? {
            return Ok(existing);
        }
        let value = default();
        self.write(key, &value)?;
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub vehicle_type: VehicleType,
    pub move_speed: u8,
    pub through: bool,
    pub transparent: bool,
    /// A boarding or leaving step still in flight.
    #[serde(default)]
    pub getting_on: bool,
    #[serde(default)]
    pub getting_off: bool,
    #[serde(default)]
    pub pending_transfer: Option<TransferRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub save_version: u32,
    pub map_id: MapId,
    pub player: SavedPlayer,
    pub vehicles: Vehicles,
    pub switches: Switches,
    #[serde(default)]
    pub plugins: PluginSaveData,
}

impl SaveFile {
    pub fn capture(state: &GameState, plugins: PluginSaveData) -> Self {
        let (x, y) = state.player.position();
        Self {
            save_version: SAVE_VERSION,
            map_id: state.map.map_id(),
            player: SavedPlayer {
                x,
                y,
                direction: state.player.direction(),
                vehicle_type: state.player.vehicle_type(),
                move_speed: state.player.move_speed(),
                through: state.player.is_through(),
                transparent: state.player.is_transparent(),
                getting_on: state.player.is_getting_on_vehicle(),
                getting_off: state.player.is_getting_off_vehicle(),
                pending_transfer: state.player.pending_transfer().copied(),
            },
            vehicles: state.vehicles.clone(),
            switches: state.switches.clone(),
            plugins,
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.save_version != SAVE_VERSION {
            return Err(SaveError::Validation {
                path: "save_version",
                expected: SAVE_VERSION.to_string(),
                actual: self.save_version.to_string(),
            });
        }
        if self.map_id.is_none() {
            return Err(SaveError::Validation {
                path: "map_id",
                expected: "non-zero map id".to_string(),
                actual: self.map_id.to_string(),
            });
        }
        Ok(())
    }

    /// Restores the state captured by [`SaveFile::capture`] and hands back the
    /// plugin sections for the plugins to pick up.
    pub fn apply(self, state: &mut GameState) -> Result<PluginSaveData, SaveError> {
        self.validate()?;
        let saved = self.player;
        state.setup_start(self.map_id, saved.x, saved.y, saved.direction)?;
        state.player.set_vehicle_type(saved.vehicle_type);
        state.player.set_getting_on_vehicle(saved.getting_on);
        state.player.set_getting_off_vehicle(saved.getting_off);
        state.player.set_move_speed(saved.move_speed);
        state.player.set_through(saved.through);
        state.player.set_transparent(saved.transparent);
        if let Some(request) = saved.pending_transfer {
            state.player.reserve_transfer(request);
        }
        state.vehicles = self.vehicles;
        state.switches = self.switches;
        Ok(self.plugins)
    }
}

pub fn save_file_path(saves_dir: &Path, slot: &str) -> PathBuf {
    saves_dir.join(format!("{slot}.save.json"))
}

pub fn write_save(path: &Path, save: &SaveFile) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(save).map_err(SaveError::Encode)?;
    write_text_atomic(path, &json).map_err(|source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_save(path: &Path) -> Result<SaveFile, SaveError> {
    let raw = fs::read_to_string(path).map_err(|source| SaveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let save = parse_save_json(&raw)?;
    save.validate()?;
    Ok(save)
}

pub fn parse_save_json(raw: &str) -> Result<SaveFile, SaveError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SaveFile>(&mut deserializer).map_err(|error| {
        SaveError::Parse {
            path: error.path().to_string(),
            source: error.into_inner(),
        }
    })
}
