/// The map scene with every plugin of the set attached.
pub(crate) struct MapScene {
    screen_width: u32,
    touch_ui: bool,
    interiors: VehicleInteriorController,
    interior_defaults: VehicleInteriorTable,
    button_frame: ButtonFrame,
    button: Option<InteriorButton>,
    joystick_layout: JoystickLayout,
    joystick: Option<VirtualJoystick>,
    window_text: WindowText,
    banner: MapNameBanner,
}

impl MapScene {
    pub(crate) fn new(params: &PluginParameters, screen_width: u32) -> Result<Self, ParamsError> {
        let interiors = &params.vehicle_interiors;
        let interior_defaults = VehicleInteriorTable::from_params(interiors);
        let auto_colors = AutoColorTable::from_params(&params.auto_colors)?;
        let window_text = WindowText::new(params.custom_font.font_face.clone(), auto_colors);
        info!(
            touch_ui = params.system.touch_ui,
            font_face = %params.custom_font.font_face,
            auto_color_words = window_text.auto_colors().len(),
            interior_key = %interiors.interior_key,
            "map_scene_created"
        );
        Ok(Self {
            screen_width,
            touch_ui: params.system.touch_ui,
            interiors: VehicleInteriorController::new(
                settings_from_params(interiors)?,
                interior_defaults,
            ),
            interior_defaults,
            button_frame: button_frame_from_params(interiors),
            button: None,
            joystick_layout: JoystickLayout::from_params(&params.virtual_joystick),
            joystick: None,
            banner: MapNameBanner::new(screen_width, window_text.clone()),
            window_text,
        })
    }

    pub(crate) fn interiors(&self) -> &VehicleInteriorController {
        &self.interiors
    }

    pub(crate) fn button(&self) -> Option<&InteriorButton> {
        self.button.as_ref()
    }

    pub(crate) fn joystick(&self) -> Option<&VirtualJoystick> {
        self.joystick.as_ref()
    }

    pub(crate) fn banner(&self) -> &MapNameBanner {
        &self.banner
    }

    fn initialize_interiors(&mut self, data: &mut PluginSaveData) {
        if let Err(error) = self
            .interiors
            .initialize_from_save(data, &self.interior_defaults)
        {
            warn!(error = %error, "interior_save_data_invalid_using_defaults");
            self.interiors = VehicleInteriorController::new(
                self.interiors.settings().clone(),
                self.interior_defaults,
            );
        }
    }

    /// The interior button sees the pointer first; a press on it is not
    /// forwarded to the joystick. Releases always reach the joystick.
    fn route_pointer(&mut self, pointer: Option<PointerEvent>, state: &mut GameState) -> ActionStates {
        let mut consumed = false;
        if let Some(button) = self.button.as_mut() {
            match button.handle_pointer(pointer) {
                ButtonEvent::Pressed => consumed = true,
                ButtonEvent::Clicked => {
                    consumed = true;
                    self.interiors
                        .force_enter(InteriorContext::from_state(state));
                }
                ButtonEvent::None => {}
            }
        }

        let Some(joystick) = self.joystick.as_mut() else {
            return ActionStates::default();
        };
        if let Some(event) = pointer {
            if !consumed || matches!(event, PointerEvent::Up(_)) {
                joystick.handle_pointer(event);
            }
        }
        joystick.actions()
    }

    fn sync_button_visibility(&mut self, state: &GameState) {
        let Some(button) = self.button.as_mut() else {
            return;
        };
        let visible = !state.map.is_event_running()
            && self
                .interiors
                .can_enter_vehicle(&state.player, &state.switches);
        button.set_visible(visible);
    }

    fn refresh_banner(&mut self, state: &GameState) {
        self.banner.refresh(state.map.display_name());
        debug!(
            map_id = %state.map.map_id(),
            visible = self.banner.is_visible(),
            "map_name_refreshed"
        );
    }
}
