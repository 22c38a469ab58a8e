use std::collections::BTreeSet;

use super::game_state::GameState;
use super::input::{ActionStates, GamepadButton, GamepadState, InputAction};
use super::map::Direction;
use crate::save::PluginSaveData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn distance_to(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Touch/mouse transitions seen during one tick, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    keys_down: BTreeSet<String>,
    gamepad: Option<GamepadState>,
    pointer: Option<PointerEvent>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn actions(&self) -> ActionStates {
        self.actions
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_actions(mut self, actions: ActionStates) -> Self {
        self.actions = actions;
        self
    }

    /// Keys are matched case-sensitively, as reported by the keyboard layout.
    pub fn with_key_down(mut self, key: impl Into<String>) -> Self {
        self.keys_down.insert(key.into());
        self
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    pub fn with_gamepad(mut self, gamepad: Option<GamepadState>) -> Self {
        self.gamepad = gamepad;
        self
    }

    pub fn is_gamepad_button_down(&self, button: GamepadButton) -> bool {
        self.gamepad
            .map(|gamepad| gamepad.is_pressed(button))
            .unwrap_or(false)
    }

    pub fn with_pointer(mut self, pointer: Option<PointerEvent>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn pointer(&self) -> Option<PointerEvent> {
        self.pointer
    }

    /// First held direction in up, down, left, right priority.
    pub fn direction(&self) -> Option<Direction> {
        if self.is_down(InputAction::MoveUp) {
            Some(Direction::Up)
        } else if self.is_down(InputAction::MoveDown) {
            Some(Direction::Down)
        } else if self.is_down(InputAction::MoveLeft) {
            Some(Direction::Left)
        } else if self.is_down(InputAction::MoveRight) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// A command routed from the console to whichever plugin registered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginCommandResult {
    Unsupported,
    Success(String),
    Error(String),
}

pub trait Scene {
    fn load(&mut self, state: &mut GameState);
    fn update(&mut self, input: &InputSnapshot, state: &mut GameState) -> SceneCommand;
    fn unload(&mut self, state: &mut GameState);
    fn execute_plugin_command(
        &mut self,
        _command: &PluginCommand,
        _state: &mut GameState,
    ) -> PluginCommandResult {
        PluginCommandResult::Unsupported
    }
    /// Called when a new game starts, before the first `load`.
    fn create_plugin_data(&mut self, _data: &mut PluginSaveData) {}
    /// Called after a save file has been applied to the game state.
    fn after_save_loaded(&mut self, _data: &mut PluginSaveData, _state: &mut GameState) {}
    /// Called right before the plugin sections are written to disk.
    fn before_save(&mut self, _data: &mut PluginSaveData) {}
    fn status_lines(&self, _state: &GameState) -> Vec<String> {
        Vec::new()
    }
    fn format_message(&self, text: &str) -> String {
        text.to_string()
    }
}
