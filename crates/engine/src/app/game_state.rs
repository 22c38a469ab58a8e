use tracing::{debug, warn};

use super::input::InputAction;
use super::map::{
    AudioState, Direction, FadeType, GameMap, MapCatalog, MapId, Switches, TransferError,
    TransferRequest,
};
use super::player::{Player, VehicleHooks, Vehicles};
use super::scene::InputSnapshot;

/// Everything a save file captures about the running game, plus the static
/// map catalog used to validate transfers.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub map: GameMap,
    pub player: Player,
    pub vehicles: Vehicles,
    pub switches: Switches,
    pub audio: AudioState,
    catalog: MapCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub from: MapId,
    pub to: MapId,
}

impl GameState {
    pub fn new(catalog: MapCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &MapCatalog {
        &self.catalog
    }

    /// Places the player directly, bypassing the reserve/perform cycle. Used
    /// for new games and save loading.
    pub fn setup_start(
        &mut self,
        map_id: MapId,
        x: i32,
        y: i32,
        direction: Direction,
    ) -> Result<(), TransferError> {
        let request = TransferRequest {
            map_id,
            x,
            y,
            direction: Some(direction),
            fade: FadeType::None,
        };
        let info = self.catalog.validate_target(&request)?;
        self.map.setup(info);
        self.player.finish_transfer(&request);
        Ok(())
    }

    /// Executes the player's reserved transfer, if any. A rejected transfer is
    /// dropped so the player is not stuck in the transferring state.
    pub fn perform_transfer(
        &mut self,
        hooks: &mut dyn VehicleHooks,
    ) -> Option<Result<TransferOutcome, TransferError>> {
        let request = self.player.take_pending_transfer()?;
        let from = self.map.map_id();
        let info = match self.catalog.validate_target(&request) {
            Ok(info) => info,
            Err(error) => {
                warn!(error = %error, "transfer_rejected");
                return Some(Err(error));
            }
        };
        if info.id != from {
            self.map.setup(info);
        }
        self.player.finish_transfer(&request);
        hooks.after_perform_transfer(&mut self.player);
        debug!(
            from = %from,
            to = %request.map_id,
            x = request.x,
            y = request.y,
            "transfer_performed"
        );
        Some(Ok(TransferOutcome {
            from,
            to: request.map_id,
        }))
    }

    /// One host tick of player and vehicle simulation.
    pub fn update_player(&mut self, input: &InputSnapshot, hooks: &mut dyn VehicleHooks) {
        let map_id = self.map.map_id();
        if !self.map.is_event_running() && !self.player.is_transferring() {
            self.update_player_input(input, &*hooks);
        }
        self.player
            .update_vehicle(map_id, &mut self.vehicles, &mut self.audio, hooks);
        self.vehicles.update(&*hooks);
        self.player.update_motion();
    }

    fn update_player_input(&mut self, input: &InputSnapshot, hooks: &dyn VehicleHooks) {
        if input.is_down(InputAction::Ok) {
            if self.player.is_in_vehicle() {
                self.player
                    .get_off_vehicle(&mut self.vehicles, &mut self.audio, hooks);
            } else {
                self.player.get_on_vehicle(self.map.map_id(), &self.vehicles);
            }
            return;
        }
        let Some(direction) = input.direction() else {
            return;
        };
        let bounds = self
            .catalog
            .get(self.map.map_id())
            .map(|info| (info.width, info.height))
            .unwrap_or((0, 0));
        self.player.try_move(direction, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::map::MapInfo;
    use crate::app::player::NoVehicleHooks;

    fn two_map_state() -> GameState {
        let catalog = MapCatalog::new(vec![
            MapInfo {
                id: MapId(1),
                name: "World".to_string(),
                display_name: "Overworld".to_string(),
                width: 20,
                height: 20,
            },
            MapInfo {
                id: MapId(2),
                name: "Cabin".to_string(),
                display_name: String::new(),
                width: 6,
                height: 6,
            },
        ])
        .expect("catalog");
        let mut state = GameState::new(catalog);
        state
            .setup_start(MapId(1), 5, 5, Direction::Down)
            .expect("start");
        state
    }

    #[test]
    fn reserved_transfer_moves_player_and_map_on_perform() {
        let mut state = two_map_state();
        state.player.reserve_transfer(TransferRequest {
            map_id: MapId(2),
            x: 1,
            y: 2,
            direction: Some(Direction::Up),
            fade: FadeType::Black,
        });
        assert_eq!(state.map.map_id(), MapId(1));

        let outcome = state
            .perform_transfer(&mut NoVehicleHooks)
            .expect("pending")
            .expect("valid");

        assert_eq!(
            outcome,
            TransferOutcome {
                from: MapId(1),
                to: MapId(2)
            }
        );
        assert_eq!(state.map.map_id(), MapId(2));
        assert_eq!(state.player.position(), (1, 2));
        assert_eq!(state.player.direction(), Direction::Up);
        assert!(!state.player.is_transferring());
    }

    #[test]
    fn transfer_without_direction_keeps_facing() {
        let mut state = two_map_state();
        state.player.set_direction(Direction::Left);
        state.player.reserve_transfer(TransferRequest {
            map_id: MapId(2),
            x: 0,
            y: 0,
            direction: None,
            fade: FadeType::Black,
        });
        state.perform_transfer(&mut NoVehicleHooks);
        assert_eq!(state.player.direction(), Direction::Left);
    }

    #[test]
    fn rejected_transfer_is_dropped_and_player_stays() {
        let mut state = two_map_state();
        state.player.reserve_transfer(TransferRequest {
            map_id: MapId(9),
            x: 0,
            y: 0,
            direction: None,
            fade: FadeType::Black,
        });

        let result = state.perform_transfer(&mut NoVehicleHooks).expect("pending");

        assert_eq!(result, Err(TransferError::UnknownMap { map_id: MapId(9) }));
        assert_eq!(state.map.map_id(), MapId(1));
        assert_eq!(state.player.position(), (5, 5));
        assert!(!state.player.is_transferring());
        assert!(state.perform_transfer(&mut NoVehicleHooks).is_none());
    }

    #[test]
    fn direction_input_is_ignored_while_an_event_runs() {
        let mut state = two_map_state();
        state.map.set_event_running(true);
        let input = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        state.update_player(&input, &mut NoVehicleHooks);
        assert_eq!(state.player.position(), (5, 5));

        state.map.set_event_running(false);
        state.update_player(&input, &mut NoVehicleHooks);
        assert_eq!(state.player.position(), (6, 5));
    }
}
