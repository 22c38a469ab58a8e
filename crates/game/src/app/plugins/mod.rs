pub(crate) mod auto_colors;
pub(crate) mod custom_font;
pub(crate) mod map_name;
pub(crate) mod vehicle_interiors;
pub(crate) mod virtual_joystick;

pub(crate) use auto_colors::AutoColorTable;
pub(crate) use custom_font::{printable, WindowText};
pub(crate) use map_name::MapNameBanner;
pub(crate) use vehicle_interiors::EntryDirection;
pub(crate) use virtual_joystick::{JoystickLayout, VirtualJoystick};
