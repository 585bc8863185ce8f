//! Game entities
//!
//! Every simulation object is one [`Entity`] record: a transform, a visual, and
//! a [`Behavior`] tag carrying the per-kind state. Entities live in a slotmap
//! arena owned by the scene and are referred to by [`EntityId`] handles, so
//! the collision index never holds a live reference.

use leap_engine::foundation::math::{constants, utils, Transform, Vec3};
use slotmap::new_key_type;

use crate::level::{row_at_depth, tile_position, TILE_SIZE};

new_key_type! {
    /// Stable handle for entities backed by a generational slot map.
    pub struct EntityId;
}

/// Height of the hop arc at its apex
pub const HOP_HEIGHT: f32 = 1.0;

/// Height pickups float above their tile
pub const PICKUP_HEIGHT: f32 = 2.0;

const COIN_SPIN_SPEED: f32 = 3.0;
const COLLECTIBLE_SPIN_SPEED: f32 = 1.5;
const COLLECTIBLE_BOB_SPEED: f32 = 2.0;
const COLLECTIBLE_BOB_HEIGHT: f32 = 0.25;

/// Mesh and texture names an entity or tile is drawn with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Visual {
    /// Mesh name
    pub mesh: String,
    /// Texture name
    pub texture: String,
}

impl Visual {
    /// Create a visual from mesh and texture names
    pub fn new(mesh: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            texture: texture.into(),
        }
    }
}

/// Directional input for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward higher rows
    Up,
    /// Toward row 0
    Down,
    /// Toward column 0
    Left,
    /// Toward the last column
    Right,
}

impl Direction {
    /// Yaw that faces the player along this direction
    fn facing(self) -> f32 {
        match self {
            Self::Up => 0.0,
            Self::Left => constants::PI * 0.5,
            Self::Down => constants::PI,
            Self::Right => constants::PI * 1.5,
        }
    }
}

/// Player life cycle
///
/// `Dead` and `GameOver` are terminal until [`PlayerState::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Accepting input
    Alive,
    /// Hit by a lethal obstacle or drowned
    Dead,
    /// Reached the terminal row
    GameOver,
}

/// Per-player simulation state
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Row the player occupies; authoritative for collision queries
    pub tile_row: usize,
    /// Column the player occupies
    pub tile_column: usize,
    /// Index of the player's night light in the scene lights, if any
    pub light: Option<usize>,
    status: PlayerStatus,
    pending: Option<Direction>,
    hop_timer: f32,
    hop_duration: f32,
    last_row: usize,
    tiles_per_row: usize,
}

impl PlayerState {
    fn new(hop_duration: f32) -> Self {
        Self {
            tile_row: 0,
            tile_column: 0,
            light: None,
            status: PlayerStatus::Alive,
            pending: None,
            hop_timer: 0.0,
            hop_duration,
            last_row: 0,
            tiles_per_row: 1,
        }
    }

    /// Current life-cycle state
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Neither dead nor game-over
    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    /// Killed this run
    pub fn is_dead(&self) -> bool {
        self.status == PlayerStatus::Dead
    }

    /// Reached the terminal row this run
    pub fn is_game_over(&self) -> bool {
        self.status == PlayerStatus::GameOver
    }

    /// Whether a hop animation is still playing
    pub fn is_hopping(&self) -> bool {
        self.hop_timer > 0.0
    }

    /// Queue a hop; ignored unless alive
    pub fn queue(&mut self, direction: Direction) {
        if self.is_alive() {
            self.pending = Some(direction);
        }
    }

    /// Transition `Alive -> Dead`; returns false if already terminal
    pub fn kill(&mut self) -> bool {
        if self.is_alive() {
            self.status = PlayerStatus::Dead;
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Transition `Alive -> GameOver`; returns false if already terminal
    pub fn finish(&mut self) -> bool {
        if self.is_alive() {
            self.status = PlayerStatus::GameOver;
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Return to `Alive` with no queued input
    pub fn reset(&mut self) {
        self.status = PlayerStatus::Alive;
        self.pending = None;
        self.hop_timer = 0.0;
        self.tile_row = 0;
    }

    /// Bounds the player may hop within
    pub fn set_grid(&mut self, last_row: usize, tiles_per_row: usize) {
        self.last_row = last_row;
        self.tiles_per_row = tiles_per_row;
    }

    /// Cell reached by hopping once in `direction`, clamped to the grid
    fn target_cell(&self, direction: Direction) -> (usize, usize) {
        let (row, column) = (self.tile_row, self.tile_column);
        match direction {
            Direction::Up => ((row + 1).min(self.last_row), column),
            Direction::Down => (row.saturating_sub(1), column),
            Direction::Left => (row, column.saturating_sub(1)),
            Direction::Right => (row, (column + 1).min(self.tiles_per_row.saturating_sub(1))),
        }
    }
}

/// What kind of obstacle a moving entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Traffic; lethal on contact
    Vehicle,
    /// Floating platform; carries the player across water
    Platform,
}

/// Moving obstacle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Vehicle or platform
    pub kind: ObstacleKind,
    /// Lateral speed in world units per second
    pub speed: f32,
    /// Left lane bound
    pub lane_min: f32,
    /// Right lane bound
    pub lane_max: f32,
}

impl Obstacle {
    /// Advance `x` and wrap it to the opposite bound when it leaves the lane
    fn advance(&self, x: f32, delta: f32) -> f32 {
        let width = self.lane_max - self.lane_min;
        let moved = x + self.speed * delta;
        if width <= 0.0 {
            return moved;
        }
        if moved > self.lane_max || moved < self.lane_min {
            self.lane_min + (moved - self.lane_min).rem_euclid(width)
        } else {
            moved
        }
    }
}

/// Which pickup an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    /// Regenerated on every third row
    Coin,
    /// The level-ending collectible on the last row
    Collectible,
}

/// Pickup state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    /// Coin or collectible
    pub kind: PickupKind,
    /// Column the pickup was placed on
    pub column: usize,
    /// Height the pickup bobs around
    base_height: f32,
    phase: f32,
}

/// Per-kind behavior and state
#[derive(Debug, Clone)]
pub enum Behavior {
    /// The player
    Player(PlayerState),
    /// Vehicles and platforms
    Obstacle(Obstacle),
    /// Coins and the collectible
    Pickup(Pickup),
}

/// Flat tag of an entity's behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The player
    Player,
    /// Lethal traffic
    Vehicle,
    /// Rideable platform
    Platform,
    /// Coin pickup
    Coin,
    /// Level collectible
    Collectible,
}

/// Something that happened during an entity's own update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    /// The player started a hop
    Hopped,
}

/// A positioned, updatable, renderable simulation object
#[derive(Debug, Clone)]
pub struct Entity {
    /// Position, rotation and scale
    pub transform: Transform,
    /// Mesh and texture
    pub visual: Visual,
    /// Per-kind state
    pub behavior: Behavior,
    /// Row this entity is indexed under; `None` for entities not in the collision index
    pub row: Option<usize>,
    /// Half of the entity's lateral (x) extent
    pub half_width: f32,
    /// Rendering hint; false when outside the view window around the player
    pub in_view: bool,
}

impl Entity {
    fn with_behavior(visual: Visual, position: Vec3, behavior: Behavior, row: Option<usize>, half_width: f32) -> Self {
        Self {
            transform: Transform::from_position(position),
            visual,
            behavior,
            row,
            half_width,
            in_view: true,
        }
    }

    /// Create the player
    pub fn player(visual: Visual, hop_duration: f32) -> Self {
        Self::with_behavior(
            visual,
            Vec3::zeros(),
            Behavior::Player(PlayerState::new(hop_duration)),
            None,
            0.4 * TILE_SIZE,
        )
    }

    /// Create a lethal vehicle at `position`
    pub fn vehicle(visual: Visual, position: Vec3, row: usize, speed: f32, lane_half_extent: f32) -> Self {
        let mut entity = Self::obstacle(ObstacleKind::Vehicle, visual, position, row, speed, lane_half_extent);
        entity.half_width = 0.9 * TILE_SIZE;
        entity
    }

    /// Create a rideable platform at `position`
    pub fn platform(visual: Visual, position: Vec3, row: usize, speed: f32, lane_half_extent: f32) -> Self {
        let mut entity = Self::obstacle(ObstacleKind::Platform, visual, position, row, speed, lane_half_extent);
        entity.half_width = 1.5 * TILE_SIZE;
        entity
    }

    fn obstacle(
        kind: ObstacleKind,
        visual: Visual,
        position: Vec3,
        row: usize,
        speed: f32,
        lane_half_extent: f32,
    ) -> Self {
        let mut entity = Self::with_behavior(
            visual,
            position,
            Behavior::Obstacle(Obstacle {
                kind,
                speed,
                lane_min: -lane_half_extent,
                lane_max: lane_half_extent,
            }),
            Some(row),
            TILE_SIZE,
        );
        // Face the direction of travel
        if speed < 0.0 {
            entity.transform.rotation.y = constants::PI;
        }
        entity
    }

    /// Create a coin floating above cell (`row`, `column`)
    pub fn coin(visual: Visual, row: usize, column: usize, tiles_per_row: usize) -> Self {
        Self::pickup(PickupKind::Coin, visual, row, column, tiles_per_row, 0.4 * TILE_SIZE)
    }

    /// Create the level collectible floating above cell (`row`, `column`)
    pub fn collectible(visual: Visual, row: usize, column: usize, tiles_per_row: usize) -> Self {
        Self::pickup(PickupKind::Collectible, visual, row, column, tiles_per_row, 0.5 * TILE_SIZE)
    }

    fn pickup(
        kind: PickupKind,
        visual: Visual,
        row: usize,
        column: usize,
        tiles_per_row: usize,
        half_width: f32,
    ) -> Self {
        let position = tile_position(row, column, tiles_per_row) + Vec3::new(0.0, PICKUP_HEIGHT, 0.0);
        Self::with_behavior(
            visual,
            position,
            Behavior::Pickup(Pickup {
                kind,
                column,
                base_height: position.y,
                phase: 0.0,
            }),
            Some(row),
            half_width,
        )
    }

    /// Flat tag of this entity's behavior
    pub fn kind(&self) -> EntityKind {
        match &self.behavior {
            Behavior::Player(_) => EntityKind::Player,
            Behavior::Obstacle(o) => match o.kind {
                ObstacleKind::Vehicle => EntityKind::Vehicle,
                ObstacleKind::Platform => EntityKind::Platform,
            },
            Behavior::Pickup(p) => match p.kind {
                PickupKind::Coin => EntityKind::Coin,
                PickupKind::Collectible => EntityKind::Collectible,
            },
        }
    }

    /// Player state, if this is the player
    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.behavior {
            Behavior::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable player state, if this is the player
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.behavior {
            Behavior::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Obstacle state, if this is a vehicle or platform
    pub fn as_obstacle(&self) -> Option<&Obstacle> {
        match &self.behavior {
            Behavior::Obstacle(obstacle) => Some(obstacle),
            _ => None,
        }
    }

    /// Pickup state, if this is a coin or collectible
    pub fn as_pickup(&self) -> Option<&Pickup> {
        match &self.behavior {
            Behavior::Pickup(pickup) => Some(pickup),
            _ => None,
        }
    }

    /// Lateral interval `[min, max]` covered by this entity
    pub fn lateral_extent(&self) -> (f32, f32) {
        let x = self.transform.position.x;
        (x - self.half_width, x + self.half_width)
    }

    /// Place the player on cell (`row`, `column`) immediately
    ///
    /// No-op for other kinds.
    pub fn teleport_to_cell(&mut self, row: usize, column: usize, tiles_per_row: usize) {
        let position = tile_position(row, column, tiles_per_row);
        if let Behavior::Player(state) = &mut self.behavior {
            state.tile_row = row_at_depth(position.z);
            state.tile_column = column;
            state.hop_timer = 0.0;
            self.transform.position = position;
        }
    }

    /// Advance this entity by `delta` seconds
    pub fn update(&mut self, delta: f32) -> Option<EntityEvent> {
        match &mut self.behavior {
            Behavior::Player(state) => update_player(state, &mut self.transform, delta),
            Behavior::Obstacle(obstacle) => {
                self.transform.position.x = obstacle.advance(self.transform.position.x, delta);
                None
            }
            Behavior::Pickup(pickup) => {
                update_pickup(pickup, &mut self.transform, delta);
                None
            }
        }
    }
}

fn update_player(state: &mut PlayerState, transform: &mut Transform, delta: f32) -> Option<EntityEvent> {
    if state.hop_timer > 0.0 {
        state.hop_timer = (state.hop_timer - delta).max(0.0);
        let progress = 1.0 - state.hop_timer / state.hop_duration.max(f32::EPSILON);
        transform.position.y = HOP_HEIGHT * (constants::PI * progress).sin().max(0.0);
        if state.hop_timer > 0.0 {
            return None;
        }
        transform.position.y = 0.0;
    }

    if !state.is_alive() {
        return None;
    }
    let direction = state.pending.take()?;

    let (row, column) = state.target_cell(direction);
    let target = tile_position(row, column, state.tiles_per_row);
    transform.position.x = target.x;
    transform.position.z = target.z;
    transform.rotation.y = direction.facing();
    state.tile_row = row_at_depth(transform.position.z);
    state.tile_column = column;
    state.hop_timer = state.hop_duration;
    Some(EntityEvent::Hopped)
}

fn update_pickup(pickup: &mut Pickup, transform: &mut Transform, delta: f32) {
    match pickup.kind {
        PickupKind::Coin => {
            transform.rotation.y = utils::wrap_angle(transform.rotation.y + COIN_SPIN_SPEED * delta);
        }
        PickupKind::Collectible => {
            transform.rotation.y = utils::wrap_angle(transform.rotation.y + COLLECTIBLE_SPIN_SPEED * delta);
            pickup.phase = utils::wrap_angle(pickup.phase + COLLECTIBLE_BOB_SPEED * delta);
            transform.position.y = pickup.base_height + COLLECTIBLE_BOB_HEIGHT * pickup.phase.sin();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player_on_grid() -> Entity {
        let mut player = Entity::player(Visual::new("frog", "frog.png"), 0.15);
        player.as_player_mut().unwrap().set_grid(39, 14);
        player.teleport_to_cell(0, 7, 14);
        player
    }

    #[test]
    fn test_hop_moves_one_tile_and_updates_row() {
        let mut player = player_on_grid();
        player.as_player_mut().unwrap().queue(Direction::Up);

        assert_eq!(player.update(0.016), Some(EntityEvent::Hopped));

        let state = player.as_player().unwrap();
        assert_eq!(state.tile_row, 1);
        assert_eq!(state.tile_column, 7);
        assert_relative_eq!(player.transform.position.z, -TILE_SIZE);
        assert!(state.is_hopping());
    }

    #[test]
    fn test_input_during_hop_waits_for_landing() {
        let mut player = player_on_grid();
        player.as_player_mut().unwrap().queue(Direction::Up);
        player.update(0.01);
        player.as_player_mut().unwrap().queue(Direction::Right);

        assert_eq!(player.update(0.05), None);
        assert_eq!(player.as_player().unwrap().tile_column, 7);

        assert_eq!(player.update(0.2), Some(EntityEvent::Hopped));
        assert_eq!(player.as_player().unwrap().tile_column, 8);
        assert_relative_eq!(player.transform.position.y, 0.0);
    }

    #[test]
    fn test_hops_are_clamped_to_grid() {
        let mut player = player_on_grid();
        player.as_player_mut().unwrap().queue(Direction::Down);
        player.update(0.016);
        assert_eq!(player.as_player().unwrap().tile_row, 0);

        player.teleport_to_cell(0, 13, 14);
        player.as_player_mut().unwrap().queue(Direction::Right);
        player.update(0.016);
        assert_eq!(player.as_player().unwrap().tile_column, 13);
    }

    #[test]
    fn test_terminal_states_ignore_input_until_reset() {
        let mut player = player_on_grid();
        let state = player.as_player_mut().unwrap();
        assert!(state.kill());
        assert!(!state.finish(), "dead player cannot also finish");
        state.queue(Direction::Up);

        assert_eq!(player.update(0.016), None);
        assert_eq!(player.as_player().unwrap().status(), PlayerStatus::Dead);

        player.as_player_mut().unwrap().reset();
        assert!(player.as_player().unwrap().is_alive());
    }

    #[test]
    fn test_obstacle_wraps_at_lane_bounds() {
        let mut car = Entity::vehicle(Visual::new("car", "car.png"), Vec3::new(27.0, 0.0, -2.0), 1, 4.0, 28.0);
        car.update(0.5);
        assert_relative_eq!(car.transform.position.x, -27.0, epsilon = 1e-4);

        let mut log = Entity::platform(Visual::new("log", "log.png"), Vec3::new(-27.0, 0.0, -4.0), 2, -4.0, 28.0);
        log.update(0.5);
        assert_relative_eq!(log.transform.position.x, 27.0, epsilon = 1e-4);
        assert_relative_eq!(log.transform.rotation.y, constants::PI);
    }

    #[test]
    fn test_pickups_spin_in_place() {
        let mut coin = Entity::coin(Visual::new("coin", "coin.png"), 3, 4, 14);
        let before = coin.transform.position;
        coin.update(0.1);

        assert_relative_eq!(coin.transform.position, before);
        assert!(coin.transform.rotation.y > 0.0);
        assert_eq!(coin.row, Some(3));
        assert_eq!(coin.as_pickup().unwrap().column, 4);
    }

    #[test]
    fn test_kind_tags() {
        let visual = Visual::new("m", "t");
        assert_eq!(Entity::player(visual.clone(), 0.1).kind(), EntityKind::Player);
        assert_eq!(Entity::vehicle(visual.clone(), Vec3::zeros(), 0, 1.0, 28.0).kind(), EntityKind::Vehicle);
        assert_eq!(Entity::platform(visual.clone(), Vec3::zeros(), 0, 1.0, 28.0).kind(), EntityKind::Platform);
        assert_eq!(Entity::coin(visual.clone(), 0, 2, 14).kind(), EntityKind::Coin);
        assert_eq!(Entity::collectible(visual, 0, 7, 14).kind(), EntityKind::Collectible);
    }
}
