impl MapScene {
    fn enter_vehicle_command(&mut self, args: &[String], state: &mut GameState) -> PluginCommandResult {
        if !args.is_empty() {
            return PluginCommandResult::Error(format!("usage: {ENTER_VEHICLE_COMMAND}"));
        }
        let vehicle = state.player.vehicle_type();
        if self.interiors.force_enter(InteriorContext::from_state(state)) {
            PluginCommandResult::Success(format!("entering {} interior", vehicle.as_token()))
        } else {
            PluginCommandResult::Success(String::new())
        }
    }

    fn exit_vehicle_command(&mut self, args: &[String], state: &mut GameState) -> PluginCommandResult {
        if !args.is_empty() {
            return PluginCommandResult::Error(format!("usage: {EXIT_VEHICLE_COMMAND}"));
        }
        if self.interiors.exit(InteriorContext::from_state(state)) {
            PluginCommandResult::Success(format!(
                "leaving interior for {}",
                self.interiors.recall_vehicle().as_token()
            ))
        } else {
            PluginCommandResult::Success(String::new())
        }
    }

    fn change_vehicle_command(&mut self, args: &[String]) -> PluginCommandResult {
        let config = match parse_change_vehicle_args(args) {
            Ok(config) => config,
            Err(message) => return PluginCommandResult::Error(message),
        };
        let vehicle = &args[0];
        if self.interiors.change_vehicle(vehicle, config) {
            PluginCommandResult::Success(format!(
                "{} interior = map {} ({}, {}) {}",
                vehicle,
                config.map_id,
                config.x,
                config.y,
                config.direction.as_token()
            ))
        } else {
            PluginCommandResult::Success(String::new())
        }
    }
}

/// `<vehicle> <map_id> <x> <y> <direction>`; the vehicle name is checked
/// later by the table.
fn parse_change_vehicle_args(args: &[String]) -> Result<VehicleInteriorConfig, String> {
    let [_, map_id, x, y, direction] = args else {
        return Err(CHANGE_VEHICLE_USAGE.to_string());
    };
    let map_id = map_id
        .parse::<u32>()
        .map_err(|_| format!("invalid map id '{map_id}'; {CHANGE_VEHICLE_USAGE}"))?;
    let x = x
        .parse::<i32>()
        .map_err(|_| format!("invalid x '{x}'; {CHANGE_VEHICLE_USAGE}"))?;
    let y = y
        .parse::<i32>()
        .map_err(|_| format!("invalid y '{y}'; {CHANGE_VEHICLE_USAGE}"))?;
    let direction = EntryDirection::from_token(direction)
        .ok_or_else(|| format!("invalid direction '{direction}'; {CHANGE_VEHICLE_USAGE}"))?;
    Ok(VehicleInteriorConfig {
        map_id: MapId(map_id),
        x,
        y,
        direction,
    })
}
