mod game_state;
mod input;
mod loop_runner;
mod map;
mod player;
mod scene;
mod tools;

pub use game_state::{GameState, TransferOutcome};
pub use input::{ActionStates, GamepadButton, GamepadState, InputAction, GAMEPAD_BUTTON_COUNT};
pub use loop_runner::{run_headless, AppError, HostRuntime, LoopConfig};
pub use map::{
    AudioState, CatalogError, Direction, FadeType, GameMap, MapCatalog, MapId, MapInfo, Switches,
    TransferError, TransferRequest,
};
pub use player::{
    NoVehicleHooks, Player, Vehicle, VehicleHooks, VehicleKind, VehicleType, Vehicles,
    AIRSHIP_MAX_ALTITUDE, DEFAULT_MOVE_SPEED,
};
pub use scene::{
    InputSnapshot, PluginCommand, PluginCommandResult, PointerEvent, Scene, SceneCommand, Vec2,
};
pub use tools::{ConsoleCommandRegistry, ConsoleState, HostCommand};
