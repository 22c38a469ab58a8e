use engine::{
    AudioState, Direction, FadeType, GameMap, GameState, GamepadButton, InputSnapshot, MapId,
    Player, PluginSaveData, SaveError, Switches, TransferRequest, VehicleHooks, VehicleType,
    Vehicles, DEFAULT_MOVE_SPEED,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{VehicleInteriorConfig, VehicleInteriorTable};

pub(crate) const PLAYER_SAVE_SECTION: &str = "vehicle_interiors_player";

/// Where the player stands relative to vehicle interiors.
///
/// `Walking` covers everything outside an interior, on foot or riding.
/// The other three phases all count as "in interior".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum InteriorPhase {
    #[default]
    Walking,
    /// Transfer to the interior is reserved; the get-off step has not run.
    EnteringInterior,
    InInterior,
    /// Transfer back is reserved; cleared when re-boarding completes.
    ExitingInterior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecallPosition {
    pub(crate) map_id: MapId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PlayerInteriorState {
    phase: InteriorPhase,
    recall_vehicle: VehicleType,
    recall_position: RecallPosition,
    #[serde(skip)]
    transfer_in_progress: bool,
}

/// Input bindings and the feature switch, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InteriorSettings {
    /// Matched case-sensitively against the keys held this tick.
    pub(crate) interior_key: String,
    pub(crate) gamepad_button: GamepadButton,
    pub(crate) enable_switch: u32,
}

/// The slices of game state the controller reads and writes.
pub(crate) struct InteriorContext<'a> {
    pub(crate) player: &'a mut Player,
    pub(crate) vehicles: &'a mut Vehicles,
    pub(crate) audio: &'a mut AudioState,
    pub(crate) map: &'a GameMap,
    pub(crate) switches: &'a Switches,
}

impl<'a> InteriorContext<'a> {
    pub(crate) fn from_state(state: &'a mut GameState) -> Self {
        Self {
            player: &mut state.player,
            vehicles: &mut state.vehicles,
            audio: &mut state.audio,
            map: &state.map,
            switches: &state.switches,
        }
    }
}

pub(crate) struct VehicleInteriorController {
    settings: InteriorSettings,
    table: VehicleInteriorTable,
    state: PlayerInteriorState,
}

impl VehicleInteriorController {
    pub(crate) fn new(settings: InteriorSettings, table: VehicleInteriorTable) -> Self {
        Self {
            settings,
            table,
            state: PlayerInteriorState::default(),
        }
    }

    pub(crate) fn phase(&self) -> InteriorPhase {
        self.state.phase
    }

    pub(crate) fn is_in_interior(&self) -> bool {
        self.state.phase != InteriorPhase::Walking
    }

    pub(crate) fn recall_position(&self) -> RecallPosition {
        self.state.recall_position
    }

    pub(crate) fn recall_vehicle(&self) -> VehicleType {
        self.state.recall_vehicle
    }

    pub(crate) fn table(&self) -> &VehicleInteriorTable {
        &self.table
    }

    pub(crate) fn settings(&self) -> &InteriorSettings {
        &self.settings
    }

    pub(crate) fn can_enter_vehicle(&self, player: &Player, switches: &Switches) -> bool {
        if let Some(kind) = player.vehicle_kind() {
            if !self.table.get(kind).has_interior() {
                return false;
            }
        }
        if self.state.transfer_in_progress {
            return false;
        }
        let switch_id = self.settings.enable_switch;
        if switch_id > 0 && !switches.value(switch_id) {
            return false;
        }
        if self.is_in_interior() {
            return false;
        }
        if !player.is_in_vehicle() {
            return false;
        }
        if player.are_followers_gathering() {
            return false;
        }
        !(player.is_getting_on_vehicle() || player.is_getting_off_vehicle())
    }

    /// Enters the interior when the bound key or gamepad button is held and
    /// the player is eligible.
    pub(crate) fn update_input(&mut self, input: &InputSnapshot, ctx: InteriorContext<'_>) {
        if !self.can_enter_vehicle(ctx.player, ctx.switches) {
            return;
        }
        let key_down = input.is_key_down(&self.settings.interior_key);
        let button_down = input.is_gamepad_button_down(self.settings.gamepad_button);
        if key_down || button_down {
            self.enter_interior(ctx);
        }
    }

    /// Enters regardless of held input. Ineligible requests are ignored.
    pub(crate) fn force_enter(&mut self, ctx: InteriorContext<'_>) -> bool {
        if !self.can_enter_vehicle(ctx.player, ctx.switches) {
            debug!(phase = ?self.state.phase, "interior_enter_ignored");
            return false;
        }
        self.enter_interior(ctx);
        true
    }

    fn enter_interior(&mut self, ctx: InteriorContext<'_>) {
        let Some(kind) = ctx.player.vehicle_kind() else {
            return;
        };
        if self.state.transfer_in_progress {
            return;
        }
        self.state.transfer_in_progress = true;

        let (x, y) = ctx.player.position();
        self.state.recall_position = RecallPosition {
            map_id: ctx.map.map_id(),
            x,
            y,
            direction: ctx.player.direction(),
        };
        self.state.recall_vehicle = ctx.player.vehicle_type();
        let config = *self.table.get(kind);

        self.state.phase = InteriorPhase::EnteringInterior;
        ctx.player.set_getting_off_vehicle(true);
        ctx.vehicles.get_mut(kind).get_off(ctx.audio, &*self);
        ctx.player.set_move_speed(DEFAULT_MOVE_SPEED);
        ctx.player.set_through(false);
        ctx.player.reserve_transfer(TransferRequest {
            map_id: config.map_id,
            x: config.x,
            y: config.y,
            direction: Some(config.direction.resolve(ctx.player.direction())),
            fade: FadeType::Black,
        });

        self.state.transfer_in_progress = false;
        info!(
            vehicle = kind.as_token(),
            from_map = %self.state.recall_position.map_id,
            to_map = %config.map_id,
            x = config.x,
            y = config.y,
            "interior_entered"
        );
    }

    /// Sends the player back to the recalled spot and re-boards the recalled
    /// vehicle there. Ignored outside an interior.
    pub(crate) fn exit(&mut self, ctx: InteriorContext<'_>) -> bool {
        if !self.is_in_interior() {
            debug!("interior_exit_ignored");
            return false;
        }
        let recall = self.state.recall_position;
        ctx.player.gather_followers();
        ctx.player.set_vehicle_type(self.state.recall_vehicle);
        if let Some(kind) = self.state.recall_vehicle.kind() {
            // Boarding adopts the vehicle's facing.
            ctx.vehicles.get_mut(kind).set_direction(recall.direction);
        }
        ctx.player.set_getting_on_vehicle(true);
        if self.state.phase == InteriorPhase::EnteringInterior {
            // The interior transfer has not run yet: re-board in place.
            ctx.player.set_getting_off_vehicle(false);
            ctx.player.cancel_transfer();
            info!(
                vehicle = self.state.recall_vehicle.as_token(),
                "interior_entry_cancelled"
            );
        } else {
            ctx.player.reserve_transfer(TransferRequest {
                map_id: recall.map_id,
                x: recall.x,
                y: recall.y,
                direction: Some(recall.direction),
                fade: FadeType::Black,
            });
        }
        self.state.phase = InteriorPhase::ExitingInterior;
        info!(
            to_map = %recall.map_id,
            x = recall.x,
            y = recall.y,
            vehicle = self.state.recall_vehicle.as_token(),
            "interior_exit_started"
        );
        true
    }

    /// Affects future enters only; a reserved transfer keeps its target.
    pub(crate) fn change_vehicle(&mut self, vehicle: &str, config: VehicleInteriorConfig) -> bool {
        let changed = self.table.change(vehicle, config);
        if changed {
            info!(
                vehicle,
                map_id = %config.map_id,
                x = config.x,
                y = config.y,
                direction = config.direction.as_token(),
                "interior_changed"
            );
        } else {
            debug!(vehicle, "interior_change_ignored");
        }
        changed
    }

    /// Loads the table and player state for a new or loaded game.
    /// Stored sections win over `defaults`.
    pub(crate) fn initialize_from_save(
        &mut self,
        data: &mut PluginSaveData,
        defaults: &VehicleInteriorTable,
    ) -> Result<(), SaveError> {
        self.table = VehicleInteriorTable::initialize(data, defaults)?;
        self.state = data.read(PLAYER_SAVE_SECTION)?.unwrap_or_default();
        Ok(())
    }

    pub(crate) fn store(&self, data: &mut PluginSaveData) -> Result<(), SaveError> {
        self.table.store(data)?;
        data.write(PLAYER_SAVE_SECTION, &self.state)
    }
}

impl VehicleHooks for VehicleInteriorController {
    fn suppress_vehicle_visuals(&self) -> bool {
        self.is_in_interior()
    }

    fn after_vehicle_get_on_step(&mut self, player: &Player) {
        if self.state.phase != InteriorPhase::ExitingInterior {
            return;
        }
        if !player.are_followers_gathering() && !player.is_moving() {
            self.state.phase = InteriorPhase::Walking;
            info!(vehicle = player.vehicle_type().as_token(), "interior_exited");
        }
    }

    fn override_vehicle_get_off_step(&mut self, player: &mut Player) -> bool {
        if !self.is_in_interior() {
            return false;
        }
        player.set_getting_off_vehicle(false);
        player.set_vehicle_type(VehicleType::Walk);
        if self.state.phase == InteriorPhase::EnteringInterior {
            self.state.phase = InteriorPhase::InInterior;
        }
        true
    }

    fn after_perform_transfer(&mut self, player: &mut Player) {
        if self.is_in_interior() {
            player.set_transparent(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::plugins::vehicle_interiors::EntryDirection;
    use engine::{MapCatalog, MapInfo, VehicleKind};

    const WORLD: MapId = MapId(1);
    const CABIN: MapId = MapId(5);
    const ENABLE_SWITCH: u32 = 1;

    fn settings() -> InteriorSettings {
        InteriorSettings {
            interior_key: "a".to_string(),
            gamepad_button: GamepadButton::Y,
            enable_switch: ENABLE_SWITCH,
        }
    }

    fn cabin_table() -> VehicleInteriorTable {
        let mut table = VehicleInteriorTable::default();
        table.change(
            "ship",
            VehicleInteriorConfig {
                map_id: CABIN,
                x: 2,
                y: 3,
                direction: EntryDirection::Up,
            },
        );
        table
    }

    fn state_riding(kind: VehicleKind) -> GameState {
        let catalog = MapCatalog::new(vec![
            MapInfo {
                id: WORLD,
                name: "World".to_string(),
                display_name: "Overworld".to_string(),
                width: 20,
                height: 20,
            },
            MapInfo {
                id: CABIN,
                name: "Cabin".to_string(),
                display_name: "Cabin".to_string(),
                width: 8,
                height: 8,
            },
        ])
        .expect("catalog");
        let mut state = GameState::new(catalog);
        state.setup_start(WORLD, 6, 7, Direction::Right).expect("start");
        state.switches.set_value(ENABLE_SWITCH, true);
        state.vehicles.get_mut(kind).set_location(WORLD, 6, 7);
        state.player.set_vehicle_type(VehicleType::Vehicle(kind));
        state
    }

    #[test]
    fn recall_survives_a_second_enter_in_the_same_tick() {
        let mut state = state_riding(VehicleKind::Ship);
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());

        assert!(controller.force_enter(InteriorContext::from_state(&mut state)));
        state.player.locate(0, 0);
        assert!(!controller.force_enter(InteriorContext::from_state(&mut state)));

        assert_eq!(
            controller.recall_position(),
            RecallPosition {
                map_id: WORLD,
                x: 6,
                y: 7,
                direction: Direction::Right
            }
        );
    }

    #[test]
    fn guard_flag_blocks_entry() {
        let mut state = state_riding(VehicleKind::Ship);
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());
        controller.state.transfer_in_progress = true;

        assert!(!controller.can_enter_vehicle(&state.player, &state.switches));
        assert!(!controller.force_enter(InteriorContext::from_state(&mut state)));
        assert!(!state.player.is_transferring());
    }

    #[test]
    fn enter_reserves_transfer_with_resolved_direction() {
        let mut state = state_riding(VehicleKind::Ship);
        let mut table = cabin_table();
        table.change(
            "ship",
            VehicleInteriorConfig {
                map_id: CABIN,
                x: 2,
                y: 3,
                direction: EntryDirection::Retain,
            },
        );
        let mut controller = VehicleInteriorController::new(settings(), table);

        controller.force_enter(InteriorContext::from_state(&mut state));

        assert_eq!(
            state.player.pending_transfer(),
            Some(&TransferRequest {
                map_id: CABIN,
                x: 2,
                y: 3,
                direction: Some(Direction::Right),
                fade: FadeType::Black,
            })
        );
        assert_eq!(controller.phase(), InteriorPhase::EnteringInterior);
        assert!(state.player.is_getting_off_vehicle());
        assert_eq!(state.player.move_speed(), DEFAULT_MOVE_SPEED);
        assert!(!controller.state.transfer_in_progress);
    }

    #[test]
    fn key_and_gamepad_trigger_entry_but_other_input_does_not() {
        let mut state = state_riding(VehicleKind::Ship);
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());

        let other = InputSnapshot::empty().with_key_down("A");
        controller.update_input(&other, InteriorContext::from_state(&mut state));
        assert!(!controller.is_in_interior());

        let pad = InputSnapshot::empty().with_gamepad(Some(
            engine::GamepadState::default().with_pressed(GamepadButton::Y, true),
        ));
        controller.update_input(&pad, InteriorContext::from_state(&mut state));
        assert!(controller.is_in_interior());
    }

    #[test]
    fn get_off_override_only_applies_inside_interiors() {
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());
        let mut player = Player::default();
        player.set_vehicle_type(VehicleType::Vehicle(VehicleKind::Ship));
        player.set_getting_off_vehicle(true);
        assert!(!controller.override_vehicle_get_off_step(&mut player));

        controller.state.phase = InteriorPhase::EnteringInterior;
        assert!(controller.override_vehicle_get_off_step(&mut player));
        assert!(!player.is_getting_off_vehicle());
        assert_eq!(player.vehicle_type(), VehicleType::Walk);
        assert_eq!(controller.phase(), InteriorPhase::InInterior);
    }

    #[test]
    fn interior_flag_falls_only_when_boarding_completes() {
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());
        controller.state.phase = InteriorPhase::ExitingInterior;
        let mut player = Player::default();
        player.gather_followers();

        controller.after_vehicle_get_on_step(&player);
        assert_eq!(controller.phase(), InteriorPhase::ExitingInterior);

        for _ in 0..64 {
            player.update_motion();
        }
        controller.after_vehicle_get_on_step(&player);
        assert_eq!(controller.phase(), InteriorPhase::Walking);
    }

    #[test]
    fn player_state_round_trips_through_save_sections() {
        let mut state = state_riding(VehicleKind::Ship);
        let mut controller = VehicleInteriorController::new(settings(), cabin_table());
        controller.force_enter(InteriorContext::from_state(&mut state));
        let mut data = PluginSaveData::default();
        controller.store(&mut data).expect("store");

        let mut restored =
            VehicleInteriorController::new(settings(), VehicleInteriorTable::default());
        restored
            .initialize_from_save(&mut data, &VehicleInteriorTable::default())
            .expect("restore");

        assert_eq!(restored.phase(), InteriorPhase::EnteringInterior);
        assert_eq!(restored.recall_position(), controller.recall_position());
        assert_eq!(restored.table(), controller.table());
        assert!(!restored.state.transfer_in_progress);
    }
}
