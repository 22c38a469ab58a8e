impl Scene for MapScene {
    fn load(&mut self, state: &mut GameState) {
        if self.touch_ui {
            self.button = Some(InteriorButton::new(
                self.button_frame,
                self.screen_width,
                MAP_BUTTON_Y,
            ));
        }
        self.joystick = Some(VirtualJoystick::new(self.joystick_layout.clone()));
        self.refresh_banner(state);
        self.sync_button_visibility(state);
    }

    fn update(&mut self, input: &InputSnapshot, state: &mut GameState) -> SceneCommand {
        if let Some(Ok(outcome)) = state.perform_transfer(&mut self.interiors) {
            if outcome.from != outcome.to {
                self.refresh_banner(state);
            }
        }

        let touch_actions = self.route_pointer(input.pointer(), state);
        let merged = input
            .clone()
            .with_actions(input.actions().merged(touch_actions));
        state.update_player(&merged, &mut self.interiors);
        self.interiors
            .update_input(&merged, InteriorContext::from_state(state));

        self.sync_button_visibility(state);
        self.banner.update();
        SceneCommand::None
    }

    fn unload(&mut self, _state: &mut GameState) {
        if let Some(button) = self.button.as_mut() {
            button.set_visible(false);
        }
        self.joystick = None;
    }

    fn execute_plugin_command(
        &mut self,
        command: &PluginCommand,
        state: &mut GameState,
    ) -> PluginCommandResult {
        match command.name.as_str() {
            ENTER_VEHICLE_COMMAND => self.enter_vehicle_command(&command.args, state),
            EXIT_VEHICLE_COMMAND => self.exit_vehicle_command(&command.args, state),
            CHANGE_VEHICLE_COMMAND => self.change_vehicle_command(&command.args),
            _ => PluginCommandResult::Unsupported,
        }
    }

    fn create_plugin_data(&mut self, data: &mut PluginSaveData) {
        self.initialize_interiors(data);
    }

    fn after_save_loaded(&mut self, data: &mut PluginSaveData, _state: &mut GameState) {
        self.initialize_interiors(data);
    }

    fn before_save(&mut self, data: &mut PluginSaveData) {
        if let Err(error) = self.interiors.store(data) {
            warn!(error = %error, "interior_save_data_store_failed");
        }
    }

    fn status_lines(&self, state: &GameState) -> Vec<String> {
        let recall = self.interiors.recall_position();
        let mut lines = vec![format!(
            "interior phase={:?} eligible={} recall=map {} ({}, {}) {} vehicle={}",
            self.interiors.phase(),
            self.interiors
                .can_enter_vehicle(&state.player, &state.switches),
            recall.map_id,
            recall.x,
            recall.y,
            recall.direction.as_token(),
            self.interiors.recall_vehicle().as_token(),
        )];
        let table = self.interiors.table();
        let mut interiors = String::from("interiors");
        for kind in VehicleKind::ALL {
            let config = table.get(kind);
            interiors.push_str(&format!(
                " {}=map {} ({}, {}) {}",
                kind.as_token(),
                config.map_id,
                config.x,
                config.y,
                config.direction.as_token()
            ));
        }
        lines.push(interiors);
        if let Some(button) = &self.button {
            let (x, y) = button.position();
            let (sheet_x, sheet_y, width, height) = button.sheet_rect();
            lines.push(format!(
                "interior_button visible={} pressed={} at=({x}, {y}) size={width}x{height} sheet=({sheet_x}, {sheet_y})",
                button.is_visible(),
                button.is_pressed(),
            ));
        }
        if let Some(joystick) = &self.joystick {
            let base = joystick.layout().base;
            let knob = joystick.knob();
            lines.push(format!(
                "joystick base=({:.0}, {:.0}) knob=({:.0}, {:.0}) dragging={}",
                base.x,
                base.y,
                knob.x,
                knob.y,
                joystick.is_dragging()
            ));
        }
        let rect = self.banner.rect();
        lines.push(format!(
            "map_name visible={} frames={} rect=({}, {}, {}, {}) opacity={} draws={} text={}",
            self.banner.is_visible(),
            self.banner.show_count(),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            self.banner.opacity(),
            self.banner.draw_list().count(),
            printable(self.banner.text()),
        ));
        lines
    }

    fn format_message(&self, text: &str) -> String {
        printable(&self.window_text.convert_escape_characters(text))
    }
}
