use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MapId(pub u32);

impl MapId {
    pub const NONE: MapId = MapId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for MapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Character facing, stored with the numeric-keypad codes used by map data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    pub const fn code(self) -> u8 {
        match self {
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 6,
            Direction::Up => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(Direction::Down),
            4 => Some(Direction::Left),
            6 => Some(Direction::Right),
            8 => Some(Direction::Up),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeType {
    #[default]
    Black,
    White,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub map_id: MapId,
    pub x: i32,
    pub y: i32,
    /// `None` keeps the player's current facing.
    pub direction: Option<Direction>,
    pub fade: FadeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("transfer target map {map_id} does not exist")]
    UnknownMap { map_id: MapId },
    #[error("transfer target ({x},{y}) is outside map {map_id} ({width}x{height})")]
    OutOfBounds {
        map_id: MapId,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub id: MapId,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("parse map catalog json{}: {source}", at_path(.path))]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("map catalog lists map {0} more than once")]
    DuplicateMap(MapId),
    #[error("map catalog entry uses reserved id 0")]
    ReservedId,
}

fn at_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else {
        format!(" at {path}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapCatalog {
    maps: BTreeMap<MapId, MapInfo>,
}

impl MapCatalog {
    pub fn new(entries: Vec<MapInfo>) -> Result<Self, CatalogError> {
        let mut maps = BTreeMap::new();
        for info in entries {
            if info.id.is_none() {
                return Err(CatalogError::ReservedId);
            }
            let id = info.id;
            if maps.insert(id, info).is_some() {
                return Err(CatalogError::DuplicateMap(id));
            }
        }
        Ok(Self { maps })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let entries = serde_path_to_error::deserialize::<_, Vec<MapInfo>>(&mut deserializer)
            .map_err(|error| CatalogError::Parse {
                path: error.path().to_string(),
                source: error.into_inner(),
            })?;
        Self::new(entries)
    }

    pub fn get(&self, map_id: MapId) -> Option<&MapInfo> {
        self.maps.get(&map_id)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn validate_target(&self, request: &TransferRequest) -> Result<&MapInfo, TransferError> {
        let info = self.get(request.map_id).ok_or(TransferError::UnknownMap {
            map_id: request.map_id,
        })?;
        let inside_x = request.x >= 0 && (request.x as u32) < info.width;
        let inside_y = request.y >= 0 && (request.y as u32) < info.height;
        if !(inside_x && inside_y) {
            return Err(TransferError::OutOfBounds {
                map_id: request.map_id,
                x: request.x,
                y: request.y,
                width: info.width,
                height: info.height,
            });
        }
        Ok(info)
    }
}

/// The currently loaded map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameMap {
    map_id: MapId,
    display_name: String,
    event_running: bool,
}

impl GameMap {
    pub fn setup(&mut self, info: &MapInfo) {
        self.map_id = info.id;
        self.display_name = info.display_name.clone();
        self.event_running = false;
    }

    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_event_running(&self) -> bool {
        self.event_running
    }

    pub fn set_event_running(&mut self, running: bool) {
        self.event_running = running;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Switches {
    values: BTreeMap<u32, bool>,
}

impl Switches {
    pub fn value(&self, switch_id: u32) -> bool {
        self.values.get(&switch_id).copied().unwrap_or(false)
    }

    pub fn set_value(&mut self, switch_id: u32, value: bool) {
        if switch_id == 0 {
            return;
        }
        self.values.insert(switch_id, value);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioState {
    current_bgm: Option<String>,
    memorized_bgm: Option<String>,
}

impl AudioState {
    pub fn play_bgm(&mut self, name: impl Into<String>) {
        self.current_bgm = Some(name.into());
    }

    pub fn memorize_bgm(&mut self) {
        self.memorized_bgm = self.current_bgm.clone();
    }

    pub fn replay_memorized_bgm(&mut self) {
        self.current_bgm = self.memorized_bgm.clone();
    }

    pub fn current_bgm(&self) -> Option<&str> {
        self.current_bgm.as_deref()
    }
}
