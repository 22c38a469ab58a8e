use std::collections::{BTreeSet, VecDeque};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::save::{read_save, save_file_path, write_save, PluginSaveData, SaveError, SaveFile};
use crate::StartupError;

use super::input::ActionStates;
use super::tools::{ConsoleCommandProcessor, ConsoleState, HostCommand};
use super::{
    GameState, GamepadButton, GamepadState, InputAction, InputSnapshot, PluginCommandResult,
    PointerEvent, Scene, SceneCommand, Vec2, VehicleKind,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub target_tps: u32,
    /// Sleep one fixed step per simulated tick instead of running flat out.
    pub realtime: bool,
    pub echo_input: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            screen_width: 816,
            screen_height: 624,
            target_tps: 60,
            realtime: false,
            echo_input: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("failed to register console command: {0}")]
    RegisterCommand(String),
    #[error("failed to read console input: {0}")]
    ReadInput(#[source] std::io::Error),
    #[error("failed to write console output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

/// Inputs queued by console commands, consumed by the next simulated tick.
#[derive(Debug, Default)]
struct InputCollector {
    action_states: ActionStates,
    keys_down: BTreeSet<String>,
    gamepad: Option<GamepadState>,
    pointer_events: VecDeque<PointerEvent>,
    last_pointer_position: Vec2,
}

impl InputCollector {
    fn hold_action(&mut self, action: InputAction) {
        self.action_states.set(action, true);
    }

    fn hold_key(&mut self, key: String) {
        self.keys_down.insert(key);
    }

    fn hold_gamepad_button(&mut self, button: GamepadButton) {
        let gamepad = self.gamepad.unwrap_or_default();
        self.gamepad = Some(gamepad.with_pressed(button, true));
    }

    fn push_pointer(&mut self, event: PointerEvent) {
        self.last_pointer_position = match event {
            PointerEvent::Down(position) | PointerEvent::Move(position) => position,
            PointerEvent::Up(position) => position,
        };
        self.pointer_events.push_back(event);
    }

    fn release_pointer(&mut self) {
        let position = self.last_pointer_position;
        self.push_pointer(PointerEvent::Up(position));
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty()
            .with_actions(self.action_states)
            .with_gamepad(self.gamepad)
            .with_pointer(self.pointer_events.pop_front());
        for key in std::mem::take(&mut self.keys_down) {
            snapshot = snapshot.with_key_down(key);
        }
        self.action_states = ActionStates::default();
        self.gamepad = None;
        snapshot
    }
}

/// Headless host: owns the game state and the active scene, and drives both
/// from console lines.
pub struct HostRuntime {
    config: LoopConfig,
    saves_dir: PathBuf,
    state: GameState,
    scene: Box<dyn Scene>,
    plugin_data: PluginSaveData,
    console: ConsoleState,
    processor: ConsoleCommandProcessor,
    input: InputCollector,
    tick_count: u64,
    quit_requested: bool,
}

impl HostRuntime {
    /// Starts a new game: plugins create their save sections, then the scene
    /// loads.
    pub fn new(
        config: LoopConfig,
        saves_dir: PathBuf,
        mut state: GameState,
        mut scene: Box<dyn Scene>,
    ) -> Self {
        let mut plugin_data = PluginSaveData::default();
        scene.create_plugin_data(&mut plugin_data);
        scene.load(&mut state);
        info!(
            map_id = %state.map.map_id(),
            screen_width = config.screen_width,
            screen_height = config.screen_height,
            target_tps = config.target_tps,
            "scene_loaded"
        );
        Self {
            console: ConsoleState::with_echo(config.echo_input),
            config,
            saves_dir,
            state,
            scene,
            plugin_data,
            processor: ConsoleCommandProcessor::new(),
            input: InputCollector::default(),
            tick_count: 0,
            quit_requested: false,
        }
    }

    pub fn register_plugin_command(
        &mut self,
        name: &str,
        help: &str,
        arg_schema: &str,
    ) -> Result<(), AppError> {
        self.processor
            .registry_mut()
            .register_plugin_command(name, help, arg_schema)
            .map_err(AppError::RegisterCommand)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn plugin_data(&self) -> &PluginSaveData {
        &self.plugin_data
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn drain_output_lines_into(&mut self, out: &mut Vec<String>) {
        self.console.drain_output_lines_into(out);
    }

    /// Parses and executes one console line.
    pub fn submit_line(&mut self, line: &str) {
        self.console.submit_line(line);
        self.processor.process_pending_lines(&mut self.console);

        let mut commands = Vec::new();
        self.processor
            .drain_pending_host_commands_into(&mut commands);
        for command in commands {
            if self.quit_requested {
                break;
            }
            self.execute(command);
        }
    }

    /// Runs one simulated tick with whatever input is queued.
    pub fn step(&mut self) {
        let snapshot = self.input.snapshot_for_tick();
        let command = self.scene.update(&snapshot, &mut self.state);
        self.tick_count += 1;
        if command == SceneCommand::Quit {
            info!(reason = "scene", "shutdown_requested");
            self.quit_requested = true;
        }
    }

    pub fn shutdown(&mut self) {
        self.scene.unload(&mut self.state);
        info!(ticks = self.tick_count, "shutdown");
    }

    fn execute(&mut self, command: HostCommand) {
        match command {
            HostCommand::Tick { count } => self.run_ticks(count),
            HostCommand::PressKey { key } => self.input.hold_key(key),
            HostCommand::PressPad { button } => self.input.hold_gamepad_button(button),
            HostCommand::Act { action } => self.input.hold_action(action),
            HostCommand::Touch { x, y } => self.input.push_pointer(PointerEvent::Down(Vec2 { x, y })),
            HostCommand::Drag { x, y } => self.input.push_pointer(PointerEvent::Move(Vec2 { x, y })),
            HostCommand::Release => self.input.release_pointer(),
            HostCommand::Board { kind } => self.board(kind),
            HostCommand::SetSwitch { switch_id, value } => {
                self.state.switches.set_value(switch_id, value);
                self.console.append_output_line(format!(
                    "switch {switch_id} = {}",
                    if value { "on" } else { "off" }
                ));
            }
            HostCommand::SetEventRunning { running } => {
                self.state.map.set_event_running(running);
            }
            HostCommand::Save { slot } => self.save(&slot),
            HostCommand::Load { slot } => self.load(&slot),
            HostCommand::Status => self.print_status(),
            HostCommand::Say { text } => {
                let formatted = self.scene.format_message(&text);
                self.console.append_output_line(formatted);
            }
            HostCommand::Quit => {
                info!(reason = "console", "shutdown_requested");
                self.quit_requested = true;
            }
            HostCommand::Plugin(command) => {
                match self.scene.execute_plugin_command(&command, &mut self.state) {
                    PluginCommandResult::Success(message) => {
                        if !message.is_empty() {
                            self.console.append_output_line(message);
                        }
                    }
                    PluginCommandResult::Error(message) => {
                        self.console.append_output_line(format!("error: {message}"));
                    }
                    PluginCommandResult::Unsupported => {
                        self.console.append_output_line(format!(
                            "error: command '{}' is not handled by the active scene",
                            command.name
                        ));
                    }
                }
            }
        }
    }

    fn run_ticks(&mut self, count: u32) {
        let fixed_dt = Duration::from_secs_f64(1.0 / self.config.target_tps.max(1) as f64);
        for _ in 0..count {
            self.step();
            if self.quit_requested {
                break;
            }
            if self.config.realtime {
                thread::sleep(fixed_dt);
            }
        }
    }

    /// Parks the vehicle where the player can reach it (same tile for
    /// airships, the tile ahead otherwise) and starts boarding.
    fn board(&mut self, kind: VehicleKind) {
        if self.state.player.is_in_vehicle() {
            self.console
                .append_output_line("error: already riding a vehicle".to_string());
            return;
        }
        let map_id = self.state.map.map_id();
        let (x, y) = match kind {
            VehicleKind::Airship => self.state.player.position(),
            VehicleKind::Boat | VehicleKind::Ship => self.state.player.front_tile(),
        };
        let inside = self
            .state
            .catalog()
            .get(map_id)
            .map(|info| x >= 0 && y >= 0 && (x as u32) < info.width && (y as u32) < info.height)
            .unwrap_or(false);
        if !inside {
            self.console.append_output_line(format!(
                "error: no room to park the {} at ({x}, {y})",
                kind.as_token()
            ));
            return;
        }
        let vehicle = self.state.vehicles.get_mut(kind);
        vehicle.set_location(map_id, x, y);
        vehicle.set_direction(self.state.player.direction());
        if self.state.player.get_on_vehicle(map_id, &self.state.vehicles) {
            self.console
                .append_output_line(format!("boarding {}", kind.as_token()));
        } else {
            self.console
                .append_output_line(format!("error: cannot board the {} now", kind.as_token()));
        }
    }

    fn save(&mut self, slot: &str) {
        self.scene.before_save(&mut self.plugin_data);
        let path = save_file_path(&self.saves_dir, slot);
        let save = SaveFile::capture(&self.state, self.plugin_data.clone());
        match write_save(&path, &save) {
            Ok(()) => {
                info!(slot, path = %path.display(), "save_written");
                self.console.append_output_line(format!("saved {slot}"));
            }
            Err(error) => {
                warn!(slot, error = %error, "save_failed");
                self.console.append_output_line(format!("error: {error}"));
            }
        }
    }

    fn load(&mut self, slot: &str) {
        let path = save_file_path(&self.saves_dir, slot);
        let result = read_save(&path).and_then(|save| {
            let mut restored = GameState::new(self.state.catalog().clone());
            let plugin_data = save.apply(&mut restored)?;
            Ok((restored, plugin_data))
        });
        let (mut restored, mut plugin_data) = match result {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(slot, error = %error, "load_failed");
                self.console.append_output_line(format!("error: {error}"));
                return;
            }
        };

        self.scene.unload(&mut self.state);
        self.scene.after_save_loaded(&mut plugin_data, &mut restored);
        self.state = restored;
        self.plugin_data = plugin_data;
        self.input = InputCollector::default();
        self.scene.load(&mut self.state);
        info!(slot, map_id = %self.state.map.map_id(), "save_loaded");
        self.console.append_output_line(format!("loaded {slot}"));
    }

    fn print_status(&mut self) {
        let player = &self.state.player;
        let (x, y) = player.position();
        let line = format!(
            "tick={} map={} pos=({x}, {y}) dir={} vehicle={} transferring={}",
            self.tick_count,
            self.state.map.map_id(),
            player.direction().as_token(),
            player.vehicle_type().as_token(),
            player.is_transferring(),
        );
        self.console.append_output_line(line);
        for line in self.scene.status_lines(&self.state) {
            self.console.append_output_line(line);
        }
    }
}

/// Feeds every line of `input` to the runtime and writes console output as it
/// is produced. Stops at end of input or when a quit is requested.
pub fn run_headless<R, W>(
    runtime: &mut HostRuntime,
    input: R,
    mut output: W,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
{
    let mut lines = Vec::new();
    for line in input.lines() {
        let line = line.map_err(AppError::ReadInput)?;
        runtime.submit_line(&line);
        runtime.drain_output_lines_into(&mut lines);
        for out in lines.drain(..) {
            writeln!(output, "{out}").map_err(AppError::WriteOutput)?;
        }
        if runtime.is_quit_requested() {
            break;
        }
    }
    output.flush().map_err(AppError::WriteOutput)?;
    runtime.shutdown();
    Ok(())
}
