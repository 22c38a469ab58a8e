use engine::{Direction, MapId, PluginSaveData, SaveError, VehicleKind};
use serde::{Deserialize, Serialize};

use crate::app::params::{InteriorLocationParams, VehicleInteriorParams};

pub(crate) const TABLE_SAVE_SECTION: &str = "vehicle_interiors";

/// Facing applied on arrival in an interior. Codes follow the numeric
/// keypad layout used by map data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EntryDirection {
    #[default]
    Retain,
    Down,
    Left,
    Right,
    Up,
}

impl EntryDirection {
    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EntryDirection::Retain),
            2 => Some(EntryDirection::Down),
            4 => Some(EntryDirection::Left),
            6 => Some(EntryDirection::Right),
            8 => Some(EntryDirection::Up),
            _ => None,
        }
    }

    /// Accepts `retain|down|left|right|up` or the numeric codes.
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        if let Ok(code) = token.parse::<u8>() {
            return Self::from_code(code);
        }
        match token.to_ascii_lowercase().as_str() {
            "retain" => Some(EntryDirection::Retain),
            "down" => Some(EntryDirection::Down),
            "left" => Some(EntryDirection::Left),
            "right" => Some(EntryDirection::Right),
            "up" => Some(EntryDirection::Up),
            _ => None,
        }
    }

    pub(crate) fn resolve(self, current: Direction) -> Direction {
        match self {
            EntryDirection::Retain => current,
            EntryDirection::Down => Direction::Down,
            EntryDirection::Left => Direction::Left,
            EntryDirection::Right => Direction::Right,
            EntryDirection::Up => Direction::Up,
        }
    }

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            EntryDirection::Retain => "retain",
            EntryDirection::Down => "down",
            EntryDirection::Left => "left",
            EntryDirection::Right => "right",
            EntryDirection::Up => "up",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct VehicleInteriorConfig {
    /// `MapId(0)` means the vehicle has no interior.
    pub(crate) map_id: MapId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) direction: EntryDirection,
}

impl VehicleInteriorConfig {
    pub(crate) fn has_interior(&self) -> bool {
        !self.map_id.is_none()
    }
}

impl From<InteriorLocationParams> for VehicleInteriorConfig {
    fn from(params: InteriorLocationParams) -> Self {
        Self {
            map_id: params.map_id,
            x: params.x,
            y: params.y,
            direction: params.direction,
        }
    }
}

/// One interior record per vehicle kind, stored in the save file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct VehicleInteriorTable {
    boat: VehicleInteriorConfig,
    ship: VehicleInteriorConfig,
    airship: VehicleInteriorConfig,
}

impl VehicleInteriorTable {
    pub(crate) fn from_params(params: &VehicleInteriorParams) -> Self {
        Self {
            boat: params.boat.into(),
            ship: params.ship.into(),
            airship: params.airship.into(),
        }
    }

    pub(crate) fn get(&self, kind: VehicleKind) -> &VehicleInteriorConfig {
        match kind {
            VehicleKind::Boat => &self.boat,
            VehicleKind::Ship => &self.ship,
            VehicleKind::Airship => &self.airship,
        }
    }

    fn get_mut(&mut self, kind: VehicleKind) -> &mut VehicleInteriorConfig {
        match kind {
            VehicleKind::Boat => &mut self.boat,
            VehicleKind::Ship => &mut self.ship,
            VehicleKind::Airship => &mut self.airship,
        }
    }

    /// Overwrites the record named by `vehicle`. Returns false, changing
    /// nothing, when the name is not a vehicle kind.
    pub(crate) fn change(&mut self, vehicle: &str, config: VehicleInteriorConfig) -> bool {
        let Some(kind) = VehicleKind::from_token(vehicle) else {
            return false;
        };
        *self.get_mut(kind) = config;
        true
    }

    /// Returns the table stored in `data`, storing `defaults` first when the
    /// save has none yet. Running it twice never overwrites stored values.
    pub(crate) fn initialize(
        data: &mut PluginSaveData,
        defaults: &VehicleInteriorTable,
    ) -> Result<VehicleInteriorTable, SaveError> {
        data.get_or_insert_with(TABLE_SAVE_SECTION, || *defaults)
    }

    pub(crate) fn store(&self, data: &mut PluginSaveData) -> Result<(), SaveError> {
        data.write(TABLE_SAVE_SECTION, self)
    }
}
