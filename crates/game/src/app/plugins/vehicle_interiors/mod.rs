//! Vehicle interiors: step from a boat, ship or airship into a separate
//! interior map and back onto the vehicle where it was left.

mod button;
mod config;
mod controller;

pub(crate) use button::{ButtonEvent, ButtonFrame, InteriorButton, MAP_BUTTON_Y};
pub(crate) use config::{EntryDirection, VehicleInteriorConfig, VehicleInteriorTable};
pub(crate) use controller::{
    InteriorContext, InteriorPhase, InteriorSettings, VehicleInteriorController,
};

use crate::app::params::{ParamsError, VehicleInteriorParams};

pub(crate) fn settings_from_params(
    params: &VehicleInteriorParams,
) -> Result<InteriorSettings, ParamsError> {
    Ok(InteriorSettings {
        interior_key: params.interior_key.clone(),
        gamepad_button: params.gamepad_button()?,
        enable_switch: params.interior_enable_switch,
    })
}

pub(crate) fn button_frame_from_params(params: &VehicleInteriorParams) -> ButtonFrame {
    ButtonFrame {
        offset: params.interior_button_offset,
        width: params.interior_button_width,
    }
}
