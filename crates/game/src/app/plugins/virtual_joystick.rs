use engine::{ActionStates, InputAction, PointerEvent, Vec2};

use crate::app::params::{ScreenPoint, VirtualJoystickParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct JoystickButton {
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    pub(crate) action: InputAction,
}

impl JoystickButton {
    fn contains(&self, point: Vec2) -> bool {
        self.center.distance_to(point) <= self.radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JoystickLayout {
    pub(crate) base: Vec2,
    pub(crate) radius: f32,
    pub(crate) deadzone: f32,
    pub(crate) buttons: [JoystickButton; 3],
}

fn point(value: ScreenPoint) -> Vec2 {
    Vec2 {
        x: value.x,
        y: value.y,
    }
}

impl JoystickLayout {
    pub(crate) fn from_params(params: &VirtualJoystickParams) -> Self {
        let button = |center: ScreenPoint, action| JoystickButton {
            center: point(center),
            radius: params.button_radius,
            action,
        };
        Self {
            base: Vec2 {
                x: params.joystick_x,
                y: params.joystick_y,
            },
            radius: params.joystick_radius,
            deadzone: params.deadzone,
            buttons: [
                button(params.button_a, InputAction::Ok),
                button(params.button_b, InputAction::Shift),
                button(params.button_c, InputAction::Cancel),
            ],
        }
    }
}

/// On-screen stick plus three action buttons, fed by pointer events.
#[derive(Debug, Clone)]
pub(crate) struct VirtualJoystick {
    layout: JoystickLayout,
    knob: Vec2,
    dragging: bool,
    directions: ActionStates,
    buttons: ActionStates,
}

impl VirtualJoystick {
    pub(crate) fn new(layout: JoystickLayout) -> Self {
        Self {
            knob: layout.base,
            layout,
            dragging: false,
            directions: ActionStates::default(),
            buttons: ActionStates::default(),
        }
    }

    pub(crate) fn layout(&self) -> &JoystickLayout {
        &self.layout
    }

    pub(crate) fn knob(&self) -> Vec2 {
        self.knob
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Directions and buttons currently held by the joystick.
    pub(crate) fn actions(&self) -> ActionStates {
        self.directions.merged(self.buttons)
    }

    pub(crate) fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(at) => {
                if self.layout.base.distance_to(at) <= self.layout.radius {
                    self.dragging = true;
                    self.track(at);
                }
                let pressed = self
                    .layout
                    .buttons
                    .iter()
                    .find(|button| button.contains(at))
                    .map(|button| button.action);
                if let Some(action) = pressed {
                    self.buttons.set(action, true);
                }
            }
            PointerEvent::Move(at) if self.dragging => self.track(at),
            PointerEvent::Move(_) => {}
            PointerEvent::Up(_) => {
                self.dragging = false;
                self.knob = self.layout.base;
                self.directions = ActionStates::default();
                self.buttons = ActionStates::default();
            }
        }
    }

    fn track(&mut self, at: Vec2) {
        let base = self.layout.base;
        let radius = self.layout.radius;
        let mut dx = at.x - base.x;
        let mut dy = at.y - base.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > radius {
            dx = dx / distance * radius;
            dy = dy / distance * radius;
        }
        self.knob = Vec2 {
            x: base.x + dx,
            y: base.y + dy,
        };

        self.directions = ActionStates::default();
        if radius <= 0.0 {
            return;
        }
        let nx = dx / radius;
        let ny = dy / radius;
        let deadzone = self.layout.deadzone;
        if nx.abs() < deadzone && ny.abs() < deadzone {
            return;
        }
        if ny.abs() > deadzone {
            let action = if ny < 0.0 {
                InputAction::MoveUp
            } else {
                InputAction::MoveDown
            };
            self.directions.set(action, true);
        }
        if nx.abs() > deadzone {
            let action = if nx < 0.0 {
                InputAction::MoveLeft
            } else {
                InputAction::MoveRight
            };
            self.directions.set(action, true);
        }
    }
}
