use serde::{Deserialize, Serialize};

use super::map::{AudioState, Direction, MapId, TransferRequest};

pub const DEFAULT_MOVE_SPEED: u8 = 4;
pub const MOVE_TICKS_PER_TILE: u32 = 16;
pub const FOLLOWER_GATHER_TICKS: u32 = 24;
pub const AIRSHIP_MAX_ALTITUDE: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Boat,
    Ship,
    Airship,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Boat, VehicleKind::Ship, VehicleKind::Airship];

    pub fn as_token(self) -> &'static str {
        match self {
            VehicleKind::Boat => "boat",
            VehicleKind::Ship => "ship",
            VehicleKind::Airship => "airship",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "boat" => Some(VehicleKind::Boat),
            "ship" => Some(VehicleKind::Ship),
            "airship" => Some(VehicleKind::Airship),
            _ => None,
        }
    }

    fn move_speed(self) -> u8 {
        match self {
            VehicleKind::Boat => 4,
            VehicleKind::Ship => 5,
            VehicleKind::Airship => 6,
        }
    }

    fn bgm(self) -> &'static str {
        match self {
            VehicleKind::Boat => "Ship1",
            VehicleKind::Ship => "Ship2",
            VehicleKind::Airship => "Ship3",
        }
    }
}

/// What the player avatar is currently mounted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    #[default]
    Walk,
    Vehicle(VehicleKind),
}

impl VehicleType {
    pub fn kind(self) -> Option<VehicleKind> {
        match self {
            VehicleType::Walk => None,
            VehicleType::Vehicle(kind) => Some(kind),
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            VehicleType::Walk => "walk",
            VehicleType::Vehicle(kind) => kind.as_token(),
        }
    }
}

/// Lifecycle points where plugins can adjust vehicle and player behaviour.
///
/// Every method defaults to the stock host behaviour, so `NoVehicleHooks`
/// runs the engine unmodified.
pub trait VehicleHooks {
    /// While true, vehicles skip BGM memory/replay on boarding, draw no
    /// shadow, and freeze airship altitude.
    fn suppress_vehicle_visuals(&self) -> bool {
        false
    }

    fn after_vehicle_get_on_step(&mut self, _player: &Player) {}

    /// Returns true when the hook fully handled the get-off step.
    fn override_vehicle_get_off_step(&mut self, _player: &mut Player) -> bool {
        false
    }

    fn after_perform_transfer(&mut self, _player: &mut Player) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoVehicleHooks;

impl VehicleHooks for NoVehicleHooks {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    kind: VehicleKind,
    map_id: MapId,
    x: i32,
    y: i32,
    direction: Direction,
    driving: bool,
    altitude: u32,
}

impl Vehicle {
    pub fn new(kind: VehicleKind) -> Self {
        Self {
            kind,
            map_id: MapId::NONE,
            x: 0,
            y: 0,
            direction: Direction::Left,
            driving: false,
            altitude: 0,
        }
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_driving(&self) -> bool {
        self.driving
    }

    pub fn altitude(&self) -> u32 {
        self.altitude
    }

    pub fn set_location(&mut self, map_id: MapId, x: i32, y: i32) {
        self.map_id = map_id;
        self.x = x;
        self.y = y;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn get_on(&mut self, audio: &mut AudioState, hooks: &dyn VehicleHooks) {
        self.driving = true;
        if !hooks.suppress_vehicle_visuals() {
            audio.memorize_bgm();
        }
        audio.play_bgm(self.kind.bgm());
    }

    pub fn get_off(&mut self, audio: &mut AudioState, hooks: &dyn VehicleHooks) {
        self.driving = false;
        self.direction = Direction::Left;
        if !hooks.suppress_vehicle_visuals() {
            audio.replay_memorized_bgm();
        }
    }

    pub fn is_lowest(&self) -> bool {
        self.altitude == 0
    }

    pub fn is_highest(&self) -> bool {
        self.altitude >= AIRSHIP_MAX_ALTITUDE
    }

    pub fn update(&mut self, hooks: &dyn VehicleHooks) {
        if self.kind == VehicleKind::Airship && !hooks.suppress_vehicle_visuals() {
            self.update_airship_altitude();
        }
    }

    fn update_airship_altitude(&mut self) {
        if self.driving && !self.is_highest() {
            self.altitude += 1;
        }
        if !self.driving && !self.is_lowest() {
            self.altitude -= 1;
        }
    }

    /// 0..=255, proportional to altitude.
    pub fn shadow_opacity(&self, hooks: &dyn VehicleHooks) -> u32 {
        if hooks.suppress_vehicle_visuals() {
            return 0;
        }
        255 * self.altitude / AIRSHIP_MAX_ALTITUDE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicles {
    boat: Vehicle,
    ship: Vehicle,
    airship: Vehicle,
}

impl Default for Vehicles {
    fn default() -> Self {
        Self {
            boat: Vehicle::new(VehicleKind::Boat),
            ship: Vehicle::new(VehicleKind::Ship),
            airship: Vehicle::new(VehicleKind::Airship),
        }
    }
}

impl Vehicles {
    pub fn get(&self, kind: VehicleKind) -> &Vehicle {
        match kind {
            VehicleKind::Boat => &self.boat,
            VehicleKind::Ship => &self.ship,
            VehicleKind::Airship => &self.airship,
        }
    }

    pub fn get_mut(&mut self, kind: VehicleKind) -> &mut Vehicle {
        match kind {
            VehicleKind::Boat => &mut self.boat,
            VehicleKind::Ship => &mut self.ship,
            VehicleKind::Airship => &mut self.airship,
        }
    }

    pub fn update(&mut self, hooks: &dyn VehicleHooks) {
        for kind in VehicleKind::ALL {
            self.get_mut(kind).update(hooks);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    x: i32,
    y: i32,
    direction: Direction,
    vehicle_type: VehicleType,
    vehicle_getting_on: bool,
    vehicle_getting_off: bool,
    move_speed: u8,
    through: bool,
    transparent: bool,
    gather_ticks_remaining: u32,
    move_ticks_remaining: u32,
    pending_transfer: Option<TransferRequest>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            direction: Direction::Down,
            vehicle_type: VehicleType::Walk,
            vehicle_getting_on: false,
            vehicle_getting_off: false,
            move_speed: DEFAULT_MOVE_SPEED,
            through: false,
            transparent: false,
            gather_ticks_remaining: 0,
            move_ticks_remaining: 0,
            pending_transfer: None,
        }
    }
}

impl Player {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn locate(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.move_ticks_remaining = 0;
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    pub fn set_vehicle_type(&mut self, vehicle_type: VehicleType) {
        self.vehicle_type = vehicle_type;
    }

    pub fn vehicle_kind(&self) -> Option<VehicleKind> {
        self.vehicle_type.kind()
    }

    pub fn is_in_vehicle(&self) -> bool {
        self.vehicle_type != VehicleType::Walk
    }

    pub fn is_getting_on_vehicle(&self) -> bool {
        self.vehicle_getting_on
    }

    pub fn set_getting_on_vehicle(&mut self, value: bool) {
        self.vehicle_getting_on = value;
    }

    pub fn is_getting_off_vehicle(&self) -> bool {
        self.vehicle_getting_off
    }

    pub fn set_getting_off_vehicle(&mut self, value: bool) {
        self.vehicle_getting_off = value;
    }

    pub fn move_speed(&self) -> u8 {
        self.move_speed
    }

    pub fn set_move_speed(&mut self, move_speed: u8) {
        self.move_speed = move_speed;
    }

    pub fn is_through(&self) -> bool {
        self.through
    }

    pub fn set_through(&mut self, through: bool) {
        self.through = through;
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn gather_followers(&mut self) {
        self.gather_ticks_remaining = FOLLOWER_GATHER_TICKS;
    }

    pub fn are_followers_gathering(&self) -> bool {
        self.gather_ticks_remaining > 0
    }

    pub fn is_moving(&self) -> bool {
        self.move_ticks_remaining > 0
    }

    pub fn reserve_transfer(&mut self, request: TransferRequest) {
        self.pending_transfer = Some(request);
    }

    pub fn cancel_transfer(&mut self) -> Option<TransferRequest> {
        self.pending_transfer.take()
    }

    pub fn is_transferring(&self) -> bool {
        self.pending_transfer.is_some()
    }

    pub fn pending_transfer(&self) -> Option<&TransferRequest> {
        self.pending_transfer.as_ref()
    }

    pub(crate) fn take_pending_transfer(&mut self) -> Option<TransferRequest> {
        self.pending_transfer.take()
    }

    pub fn front_tile(&self) -> (i32, i32) {
        match self.direction {
            Direction::Down => (self.x, self.y + 1),
            Direction::Left => (self.x - 1, self.y),
            Direction::Right => (self.x + 1, self.y),
            Direction::Up => (self.x, self.y - 1),
        }
    }

    /// Starts boarding a vehicle standing on the player's tile or the tile in
    /// front. Returns false when nothing can be boarded.
    pub fn get_on_vehicle(&mut self, map_id: MapId, vehicles: &Vehicles) -> bool {
        if self.is_in_vehicle() || self.is_busy() {
            return false;
        }
        for kind in VehicleKind::ALL {
            let vehicle = vehicles.get(kind);
            if vehicle.map_id() != map_id {
                continue;
            }
            let here = vehicle.position() == self.position();
            let ahead = vehicle.position() == self.front_tile();
            let reachable = match kind {
                VehicleKind::Airship => here,
                VehicleKind::Boat | VehicleKind::Ship => here || ahead,
            };
            if !reachable {
                continue;
            }
            if ahead {
                self.start_step_to(vehicle.position());
            }
            self.vehicle_type = VehicleType::Vehicle(kind);
            self.vehicle_getting_on = true;
            self.gather_followers();
            return true;
        }
        false
    }

    /// Starts leaving the current vehicle. Boats and ships step onto the tile
    /// in front; airships must descend first.
    pub fn get_off_vehicle(
        &mut self,
        vehicles: &mut Vehicles,
        audio: &mut AudioState,
        hooks: &dyn VehicleHooks,
    ) -> bool {
        let Some(kind) = self.vehicle_kind() else {
            return false;
        };
        if self.is_busy() {
            return false;
        }
        let vehicle = vehicles.get_mut(kind);
        vehicle.get_off(audio, hooks);
        if kind != VehicleKind::Airship {
            let target = self.front_tile();
            self.start_step_to(target);
        }
        self.vehicle_getting_off = true;
        self.move_speed = DEFAULT_MOVE_SPEED;
        self.through = false;
        self.gather_followers();
        true
    }

    fn is_busy(&self) -> bool {
        self.vehicle_getting_on
            || self.vehicle_getting_off
            || self.is_moving()
            || self.is_transferring()
    }

    fn start_step_to(&mut self, target: (i32, i32)) {
        self.x = target.0;
        self.y = target.1;
        self.move_ticks_remaining = MOVE_TICKS_PER_TILE;
    }

    /// Steps one tile in `direction` when the player is free to move.
    pub fn try_move(&mut self, direction: Direction, bounds: (u32, u32)) -> bool {
        self.direction = direction;
        if self.is_busy() {
            return false;
        }
        let target = self.front_tile();
        let inside = target.0 >= 0
            && target.1 >= 0
            && (target.0 as u32) < bounds.0
            && (target.1 as u32) < bounds.1;
        if !inside {
            return false;
        }
        self.start_step_to(target);
        true
    }

    pub fn update_vehicle(
        &mut self,
        map_id: MapId,
        vehicles: &mut Vehicles,
        audio: &mut AudioState,
        hooks: &mut dyn VehicleHooks,
    ) {
        if self.is_transferring() {
            return;
        }
        if self.vehicle_getting_on {
            self.update_vehicle_get_on(vehicles, audio, &*hooks);
            hooks.after_vehicle_get_on_step(self);
        } else if self.vehicle_getting_off {
            if !hooks.override_vehicle_get_off_step(self) {
                self.update_vehicle_get_off(vehicles);
            }
        } else if let Some(kind) = self.vehicle_kind() {
            let vehicle = vehicles.get_mut(kind);
            if vehicle.map_id() == map_id {
                vehicle.set_location(map_id, self.x, self.y);
                vehicle.set_direction(self.direction);
            }
        }
    }

    fn update_vehicle_get_on(
        &mut self,
        vehicles: &mut Vehicles,
        audio: &mut AudioState,
        hooks: &dyn VehicleHooks,
    ) {
        if self.are_followers_gathering() || self.is_moving() {
            return;
        }
        let Some(kind) = self.vehicle_kind() else {
            self.vehicle_getting_on = false;
            return;
        };
        let vehicle = vehicles.get_mut(kind);
        self.direction = vehicle.direction();
        self.move_speed = kind.move_speed();
        self.vehicle_getting_on = false;
        self.transparent = true;
        if kind == VehicleKind::Airship {
            self.through = true;
        }
        vehicle.get_on(audio, hooks);
    }

    fn update_vehicle_get_off(&mut self, vehicles: &Vehicles) {
        if self.are_followers_gathering() {
            return;
        }
        let lowest = self
            .vehicle_kind()
            .map(|kind| vehicles.get(kind).is_lowest())
            .unwrap_or(true);
        if lowest {
            self.vehicle_getting_off = false;
            self.vehicle_type = VehicleType::Walk;
            self.transparent = false;
        }
    }

    /// Advances follower gathering and step animation by one tick.
    pub fn update_motion(&mut self) {
        self.gather_ticks_remaining = self.gather_ticks_remaining.saturating_sub(1);
        self.move_ticks_remaining = self.move_ticks_remaining.saturating_sub(1);
    }

    pub(crate) fn finish_transfer(&mut self, request: &TransferRequest) {
        self.locate(request.x, request.y);
        if let Some(direction) = request.direction {
            self.direction = direction;
        }
        self.gather_ticks_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SuppressAll;

    impl VehicleHooks for SuppressAll {
        fn suppress_vehicle_visuals(&self) -> bool {
            true
        }
    }

    fn vehicles_with_boat_at(map_id: MapId, x: i32, y: i32) -> Vehicles {
        let mut vehicles = Vehicles::default();
        vehicles
            .get_mut(VehicleKind::Boat)
            .set_location(map_id, x, y);
        vehicles
    }

    fn settle(player: &mut Player, vehicles: &mut Vehicles, audio: &mut AudioState) {
        for _ in 0..64 {
            player.update_vehicle(MapId(1), vehicles, audio, &mut NoVehicleHooks);
            player.update_motion();
        }
    }

    #[test]
    fn boarding_a_boat_ahead_steps_onto_it_and_plays_vehicle_bgm() {
        let mut player = Player::default();
        player.locate(3, 3);
        player.set_direction(Direction::Right);
        let mut vehicles = vehicles_with_boat_at(MapId(1), 4, 3);
        let mut audio = AudioState::default();
        audio.play_bgm("Field");

        assert!(player.get_on_vehicle(MapId(1), &vehicles));
        assert!(player.is_getting_on_vehicle());
        assert!(player.is_moving());

        settle(&mut player, &mut vehicles, &mut audio);

        assert!(!player.is_getting_on_vehicle());
        assert_eq!(player.vehicle_kind(), Some(VehicleKind::Boat));
        assert_eq!(player.position(), (4, 3));
        assert!(player.is_transparent());
        assert!(vehicles.get(VehicleKind::Boat).is_driving());
        assert_eq!(audio.current_bgm(), Some("Ship1"));
    }

    #[test]
    fn getting_off_replays_memorized_bgm_unless_suppressed() {
        let mut audio = AudioState::default();
        audio.play_bgm("Field");
        let mut boat = Vehicle::new(VehicleKind::Boat);
        boat.get_on(&mut audio, &NoVehicleHooks);
        boat.get_off(&mut audio, &NoVehicleHooks);
        assert_eq!(audio.current_bgm(), Some("Field"));

        let mut quiet_audio = AudioState::default();
        quiet_audio.play_bgm("Field");
        let mut ship = Vehicle::new(VehicleKind::Ship);
        ship.get_on(&mut quiet_audio, &SuppressAll);
        ship.get_off(&mut quiet_audio, &SuppressAll);
        assert_eq!(quiet_audio.current_bgm(), Some("Ship2"));
    }

    #[test]
    fn suppressed_airship_keeps_altitude_and_hides_shadow() {
        let mut audio = AudioState::default();
        let mut airship = Vehicle::new(VehicleKind::Airship);
        airship.get_on(&mut audio, &NoVehicleHooks);
        for _ in 0..10 {
            airship.update(&NoVehicleHooks);
        }
        assert_eq!(airship.altitude(), 10);
        assert!(airship.shadow_opacity(&NoVehicleHooks) > 0);

        for _ in 0..10 {
            airship.update(&SuppressAll);
        }
        assert_eq!(airship.altitude(), 10);
        assert_eq!(airship.shadow_opacity(&SuppressAll), 0);
    }

    #[test]
    fn player_does_not_update_vehicle_while_transfer_is_pending() {
        let mut player = Player::default();
        let mut vehicles = Vehicles::default();
        let mut audio = AudioState::default();
        player.set_vehicle_type(VehicleType::Vehicle(VehicleKind::Ship));
        player.set_getting_on_vehicle(true);
        player.reserve_transfer(TransferRequest {
            map_id: MapId(2),
            x: 0,
            y: 0,
            direction: None,
            fade: super::super::map::FadeType::Black,
        });

        player.update_vehicle(MapId(1), &mut vehicles, &mut audio, &mut NoVehicleHooks);

        assert!(player.is_getting_on_vehicle());
        assert!(!vehicles.get(VehicleKind::Ship).is_driving());
    }

    #[test]
    fn walking_player_cannot_leave_the_map_bounds() {
        let mut player = Player::default();
        player.locate(0, 0);
        assert!(!player.try_move(Direction::Up, (4, 4)));
        assert_eq!(player.direction(), Direction::Up);
        assert!(player.try_move(Direction::Right, (4, 4)));
        assert_eq!(player.position(), (1, 0));
        assert!(!player.try_move(Direction::Right, (4, 4)), "still moving");
    }
}
