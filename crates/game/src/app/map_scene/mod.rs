use engine::{
    ActionStates, AppError, GameState, HostRuntime, InputSnapshot, MapId, PluginCommand,
    PluginCommandResult, PluginSaveData, PointerEvent, Scene, SceneCommand, VehicleKind,
};
use tracing::{debug, info, warn};

use super::params::{ParamsError, PluginParameters};
use super::plugins::vehicle_interiors::{
    button_frame_from_params, settings_from_params, ButtonEvent, ButtonFrame, EntryDirection,
    InteriorButton, InteriorContext, VehicleInteriorConfig, VehicleInteriorController,
    VehicleInteriorTable, MAP_BUTTON_Y,
};
use super::plugins::{
    printable, AutoColorTable, JoystickLayout, MapNameBanner, VirtualJoystick, WindowText,
};

const ENTER_VEHICLE_COMMAND: &str = "enter_vehicle";
const EXIT_VEHICLE_COMMAND: &str = "exit_vehicle";
const CHANGE_VEHICLE_COMMAND: &str = "change_vehicle";
const CHANGE_VEHICLE_USAGE: &str =
    "usage: change_vehicle <boat|ship|airship> <map_id> <x> <y> <retain|down|left|right|up|0|2|4|6|8>";

/// `(name, help, arg schema)` of every console command the scene handles.
const PLUGIN_COMMANDS: [(&str, &str, &str); 3] = [
    (ENTER_VEHICLE_COMMAND, "Enter the current vehicle's interior", ""),
    (EXIT_VEHICLE_COMMAND, "Leave the interior and re-board the vehicle", ""),
    (
        CHANGE_VEHICLE_COMMAND,
        "Set a vehicle's interior location",
        "<vehicle> <map_id> <x> <y> <direction>",
    ),
];

include!("scene_state.rs");
include!("scene_impl.rs");
include!("commands.rs");

pub(crate) fn register_plugin_commands(runtime: &mut HostRuntime) -> Result<(), AppError> {
    for (name, help, arg_schema) in PLUGIN_COMMANDS {
        runtime.register_plugin_command(name, help, arg_schema)?;
    }
    Ok(())
}
