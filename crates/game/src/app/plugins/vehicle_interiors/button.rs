use engine::{PointerEvent, Vec2};

/// Side of one cell on the button sheet, in pixels.
pub(crate) const BUTTON_UNIT_PX: u32 = 48;
const BUTTON_GAP_PX: i32 = 4;
/// `button_y` of the map scene.
pub(crate) const MAP_BUTTON_Y: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonFrame {
    /// Sheet offset in button units.
    pub(crate) offset: u32,
    /// Width in button units.
    pub(crate) width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ButtonEvent {
    None,
    Pressed,
    Clicked,
}

/// Touch button that enters the current vehicle's interior.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InteriorButton {
    x: i32,
    y: i32,
    frame: ButtonFrame,
    visible: bool,
    pressed: bool,
}

impl InteriorButton {
    /// Placed two button widths in from the right edge of the box.
    pub(crate) fn new(frame: ButtonFrame, box_width: u32, button_y: i32) -> Self {
        let width = (frame.width * BUTTON_UNIT_PX) as i32;
        Self {
            x: box_width as i32 - (width + BUTTON_GAP_PX) * 2,
            y: button_y,
            frame,
            visible: false,
            pressed: false,
        }
    }

    pub(crate) fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub(crate) fn width(&self) -> u32 {
        self.frame.width * BUTTON_UNIT_PX
    }

    pub(crate) fn height(&self) -> u32 {
        BUTTON_UNIT_PX
    }

    /// `(x, y, width, height)` of the button's cell on the sheet.
    pub(crate) fn sheet_rect(&self) -> (u32, u32, u32, u32) {
        (
            self.frame.offset * BUTTON_UNIT_PX,
            0,
            self.width(),
            self.height(),
        )
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.pressed = false;
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        let left = self.x as f32;
        let top = self.y as f32;
        point.x >= left
            && point.y >= top
            && point.x < left + self.width() as f32
            && point.y < top + self.height() as f32
    }

    /// Press on pointer down inside the visible button; click on release
    /// inside while pressed.
    pub(crate) fn handle_pointer(&mut self, event: Option<PointerEvent>) -> ButtonEvent {
        if !self.visible {
            return ButtonEvent::None;
        }
        match event {
            Some(PointerEvent::Down(point)) if self.contains(point) => {
                self.pressed = true;
                ButtonEvent::Pressed
            }
            Some(PointerEvent::Up(point)) if self.pressed => {
                self.pressed = false;
                if self.contains(point) {
                    ButtonEvent::Clicked
                } else {
                    ButtonEvent::None
                }
            }
            _ => ButtonEvent::None,
        }
    }
}
