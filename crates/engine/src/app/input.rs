#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Ok,
    Cancel,
    Shift,
}

const ACTION_COUNT: usize = 7;

impl InputAction {
    pub const DIRECTIONS: [InputAction; 4] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Ok => 4,
            InputAction::Cancel => 5,
            InputAction::Shift => 6,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "up" => Some(InputAction::MoveUp),
            "down" => Some(InputAction::MoveDown),
            "left" => Some(InputAction::MoveLeft),
            "right" => Some(InputAction::MoveRight),
            "ok" => Some(InputAction::Ok),
            "cancel" => Some(InputAction::Cancel),
            "shift" => Some(InputAction::Shift),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Logical OR of both states; used to layer virtual inputs over the device.
    pub fn merged(self, other: ActionStates) -> ActionStates {
        let mut down = self.down;
        for (slot, other_down) in down.iter_mut().zip(other.down) {
            *slot |= other_down;
        }
        ActionStates { down }
    }
}

/// Standard-mapping gamepad buttons, indexed the way browsers report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamepadButton {
    #[default]
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
    LeftStick,
    RightStick,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

pub const GAMEPAD_BUTTON_COUNT: usize = 16;

impl GamepadButton {
    pub const fn index(self) -> usize {
        match self {
            GamepadButton::A => 0,
            GamepadButton::B => 1,
            GamepadButton::X => 2,
            GamepadButton::Y => 3,
            GamepadButton::LeftBumper => 4,
            GamepadButton::RightBumper => 5,
            GamepadButton::LeftTrigger => 6,
            GamepadButton::RightTrigger => 7,
            GamepadButton::Back => 8,
            GamepadButton::Start => 9,
            GamepadButton::LeftStick => 10,
            GamepadButton::RightStick => 11,
            GamepadButton::DpadUp => 12,
            GamepadButton::DpadDown => 13,
            GamepadButton::DpadLeft => 14,
            GamepadButton::DpadRight => 15,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        const ALL: [GamepadButton; GAMEPAD_BUTTON_COUNT] = [
            GamepadButton::A,
            GamepadButton::B,
            GamepadButton::X,
            GamepadButton::Y,
            GamepadButton::LeftBumper,
            GamepadButton::RightBumper,
            GamepadButton::LeftTrigger,
            GamepadButton::RightTrigger,
            GamepadButton::Back,
            GamepadButton::Start,
            GamepadButton::LeftStick,
            GamepadButton::RightStick,
            GamepadButton::DpadUp,
            GamepadButton::DpadDown,
            GamepadButton::DpadLeft,
            GamepadButton::DpadRight,
        ];
        ALL.get(index).copied()
    }

    pub fn from_token(token: &str) -> Option<Self> {
        if let Ok(index) = token.parse::<usize>() {
            return Self::from_index(index);
        }
        match token.to_ascii_lowercase().as_str() {
            "a" => Some(GamepadButton::A),
            "b" => Some(GamepadButton::B),
            "x" => Some(GamepadButton::X),
            "y" => Some(GamepadButton::Y),
            "lb" => Some(GamepadButton::LeftBumper),
            "rb" => Some(GamepadButton::RightBumper),
            "lt" => Some(GamepadButton::LeftTrigger),
            "rt" => Some(GamepadButton::RightTrigger),
            "back" | "select" => Some(GamepadButton::Back),
            "start" => Some(GamepadButton::Start),
            "ls" => Some(GamepadButton::LeftStick),
            "rs" => Some(GamepadButton::RightStick),
            "dpad_up" => Some(GamepadButton::DpadUp),
            "dpad_down" => Some(GamepadButton::DpadDown),
            "dpad_left" => Some(GamepadButton::DpadLeft),
            "dpad_right" => Some(GamepadButton::DpadRight),
            _ => None,
        }
    }
}

/// Button state of the most recently active gamepad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    pressed: [bool; GAMEPAD_BUTTON_COUNT],
}

impl GamepadState {
    pub fn with_pressed(mut self, button: GamepadButton, pressed: bool) -> Self {
        self.pressed[button.index()] = pressed;
        self
    }

    pub fn is_pressed(&self, button: GamepadButton) -> bool {
        self.pressed[button.index()]
    }
}
