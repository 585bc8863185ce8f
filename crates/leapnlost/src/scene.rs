//! Scene orchestration
//!
//! The scene owns the entity arena, the collision index, the tiles, the
//! camera and the active level. The host calls [`Scene::update`] once per
//! tick and then [`Scene::render`].
//!
//! Per-tick order:
//! 1. projection
//! 2. visibility hints and entity updates (skipped while paused)
//! 3. collisions (death is decided here)
//! 4. camera tracking, the player's light and lights riding on obstacles
//! 5. terminal row (game over)
//! 6. elapsed time
//!
//! Every arena mutation that touches a collidable entity goes through
//! [`Scene::spawn`] or [`Scene::despawn`], which update the index in the
//! same call.

use leap_engine::assets::{ModelCache, ModelLoader};
use leap_engine::audio::{AudioService, SoundEffect};
use leap_engine::foundation::math::{Transform, Vec3};
use leap_engine::render::{CameraController, DirectionalLight, PointLight, RenderBackend, SceneLights};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;
use thiserror::Error;

use crate::collision::{lateral_overlap, CollisionIndex};
use crate::config::GameConfig;
use crate::entity::{Direction, Entity, EntityEvent, EntityId, EntityKind, PickupKind, PlayerState, Visual};
use crate::level::{column_at, tile_position, Level, LevelInfo, LevelSource, ParseError, RowType, Tile, TILE_SIZE};
use crate::profile::{self, PersistenceError, ProfileStore};
use crate::theme::Theme;

/// Rows between coins
pub const COIN_ROW_STRIDE: usize = 3;

const PLAYER_LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 0.9];
const PLAYER_LIGHT_HEIGHT: f32 = 2.0;

/// Scene operation errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// The level could not be read, parsed, or has no theme
    #[error("Failed to load level: {0}")]
    LevelLoad(#[from] ParseError),

    /// The profile could not be read or written
    #[error("Profile error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// The running game world
pub struct Scene {
    config: GameConfig,
    levels: Box<dyn LevelSource>,
    profiles: Box<dyn ProfileStore>,
    audio: Box<dyn AudioService>,
    rng: StdRng,

    entities: SlotMap<EntityId, Entity>,
    index: CollisionIndex,
    tiles: Vec<Tile>,
    player: Entity,
    coins: Vec<EntityId>,
    collectible: Option<EntityId>,

    camera: CameraController,
    lights: SceneLights,
    // Owner and offset of each theme light, parallel to the front of the light lists
    point_anchors: Vec<(EntityId, Vec3)>,
    spot_anchors: Vec<(EntityId, Vec3)>,
    level: Option<Level>,
    theme: Option<Box<dyn Theme>>,

    score: i64,
    elapsed: f32,
    paused: bool,
    collectible_collected: bool,
}

impl Scene {
    /// Create an empty scene
    ///
    /// The player model comes from the profile's selected animal. A missing or
    /// corrupt profile is replaced by a saved default.
    pub fn new(
        config: GameConfig,
        levels: Box<dyn LevelSource>,
        mut profiles: Box<dyn ProfileStore>,
        audio: Box<dyn AudioService>,
    ) -> Result<Self, SceneError> {
        let profile = profile::load_or_recover(profiles.as_mut())?;
        let visual = profile
            .animals
            .current()
            .map_or_else(|| Visual::new("frog", "frog.png"), |a| Visual::new(a.mesh.clone(), a.texture.clone()));
        log::info!("Playing as {}/{}", visual.mesh, visual.texture);

        let rng = match config.gameplay.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let camera = CameraController::new(config.camera.offset, config.camera.projection);
        let player = Entity::player(visual, config.gameplay.hop_duration);

        Ok(Self {
            config,
            levels,
            profiles,
            audio,
            rng,
            entities: SlotMap::with_key(),
            index: CollisionIndex::new(),
            tiles: Vec::new(),
            player,
            coins: Vec::new(),
            collectible: None,
            camera,
            lights: SceneLights::default(),
            point_anchors: Vec::new(),
            spot_anchors: Vec::new(),
            level: None,
            theme: None,
            score: 0,
            elapsed: 0.0,
            paused: false,
            collectible_collected: false,
        })
    }

    /// Load `area`-`level`, replacing the current level
    ///
    /// On error the previous level stays in place untouched.
    pub fn load_level(&mut self, area: u32, level: u32) -> Result<(), SceneError> {
        let parsed = Level::load(self.levels.as_ref(), area, level).map_err(|e| {
            log::error!("Cannot load level {}-{}: {}", area, level, e);
            e
        })?;
        let theme = parsed.info().theme.strategy();
        let tiles_per_row = parsed.tiles_per_row();

        let mut entities = SlotMap::with_key();
        let mut index = CollisionIndex::new();
        let mut tiles = Vec::with_capacity(parsed.row_count() * tiles_per_row);
        for (row_index, row) in parsed.rows().iter().enumerate() {
            for object in theme.parse_row_objects(row, row_index, tiles_per_row) {
                let row = object.row;
                let id = entities.insert(object);
                if let Some(row) = row {
                    index.insert(row, id);
                }
            }
            tiles.extend(theme.parse_row_tiles(row, row_index, tiles_per_row));
        }

        self.entities = entities;
        self.index = index;
        self.tiles = tiles;
        self.coins.clear();
        self.collectible = None;
        self.audio.play_music(theme.music_track(), true);
        self.theme = Some(theme);
        self.level = Some(parsed);

        self.spawn_coins();
        self.spawn_collectible();
        self.setup_lights();
        self.reset_player();

        self.score = 0;
        self.elapsed = 0.0;
        self.collectible_collected = false;

        if let Some(info) = self.level_info() {
            log::info!(
                "Loaded level {}-{} ({}, {} rows, {} entities{})",
                info.area,
                info.level,
                info.theme.name(),
                self.level.as_ref().map_or(0, Level::row_count),
                self.entities.len(),
                if info.night { ", night" } else { "" }
            );
        }
        Ok(())
    }

    /// Restart the current level
    ///
    /// Score and time go to zero, the player returns to the start, and pickups
    /// are regenerated. Obstacles and tiles are left as they are.
    pub fn restart_level(&mut self) {
        self.score = 0;
        self.elapsed = 0.0;
        self.collectible_collected = false;
        self.reset_player();
        self.spawn_coins();
        if self.collectible.map_or(true, |id| !self.entities.contains_key(id)) {
            self.spawn_collectible();
        }
        log::info!("Level restarted");
    }

    /// Replace every coin with one coin on each row divisible by three
    ///
    /// The column is drawn uniformly from `[2, tiles_per_row - 2)`.
    pub fn spawn_coins(&mut self) {
        for id in std::mem::take(&mut self.coins) {
            self.despawn(id);
        }

        let (Some(level), Some(theme)) = (&self.level, &self.theme) else {
            return;
        };
        let tiles_per_row = level.tiles_per_row();
        let visual = theme.coin_visual();
        let coins: Vec<Entity> = (0..level.row_count())
            .step_by(COIN_ROW_STRIDE)
            .map(|row| {
                let column = self.rng.gen_range(2..tiles_per_row - 2);
                Entity::coin(visual.clone(), row, column, tiles_per_row)
            })
            .collect();

        log::debug!("Spawning {} coins", coins.len());
        for coin in coins {
            let id = self.spawn(coin);
            self.coins.push(id);
        }
    }

    /// Add an entity to the arena and, if it has a row, to the collision index
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let row = entity.row;
        let id = self.entities.insert(entity);
        if let Some(row) = row {
            self.index.insert(row, id);
        }
        id
    }

    /// Remove an entity from the arena and the collision index
    ///
    /// Returns `None` if the handle is already gone.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        if let Some(row) = entity.row {
            self.index.remove(row, id);
        }
        Some(entity)
    }

    /// Consume a pickup: score it and remove it from the arena and the index
    ///
    /// Returns false, without side effects, if `id` is not a live pickup.
    pub fn consume_pickup(&mut self, id: EntityId) -> bool {
        let Some(kind) = self.entities.get(id).and_then(|e| e.as_pickup()).map(|p| p.kind) else {
            return false;
        };
        self.despawn(id);

        match kind {
            PickupKind::Coin => {
                self.coins.retain(|&coin| coin != id);
                self.score += self.config.gameplay.coin_value;
                self.audio.play(SoundEffect::Coin);
            }
            PickupKind::Collectible => {
                self.score += self.config.gameplay.collectible_value;
                self.collectible_collected = true;
                self.audio.play(SoundEffect::Collectible);
            }
        }
        log::debug!("Picked up {:?}, score {}", kind, self.score);
        true
    }

    /// Queue a hop for the player; ignored while paused
    pub fn handle_input(&mut self, direction: Direction) {
        if self.paused {
            return;
        }
        if let Some(state) = self.player.as_player_mut() {
            state.queue(direction);
        }
    }

    /// Advance the scene by `delta` seconds
    pub fn update(&mut self, delta: f32) {
        let viewport = self.config.camera.viewport;
        self.camera.update_projection(viewport.width, viewport.height);

        let player_z = self.player.transform.position.z;
        let view_distance = self.config.gameplay.view_distance;
        for entity in self.entities.values_mut() {
            entity.in_view = (entity.transform.position.z - player_z).abs() <= view_distance;
            if !self.paused {
                entity.update(delta);
            }
        }
        if !self.paused && self.player.update(delta) == Some(EntityEvent::Hopped) {
            self.audio.play(SoundEffect::Hop);
        }

        if !self.paused {
            self.resolve_collisions(delta);
        }

        let position = self.player.transform.position;
        self.camera.update_position(position);
        self.follow_player_light(position);
        self.follow_obstacle_lights();

        let terminal_row = self.config.gameplay.terminal_row;
        if let Some(state) = self.player.as_player_mut() {
            if state.tile_row >= terminal_row && state.finish() {
                log::info!("Reached row {} with score {}", state.tile_row, self.score);
                self.audio.play(SoundEffect::LevelComplete);
            }
        }

        if !self.paused && self.player.as_player().is_some_and(PlayerState::is_alive) {
            self.elapsed += delta;
        }
    }

    fn resolve_collisions(&mut self, delta: f32) {
        let Some(state) = self.player.as_player() else {
            return;
        };
        if !state.is_alive() {
            return;
        }
        let row = state.tile_row;
        let extent = self.player.lateral_extent();

        let mut lethal = false;
        let mut carried_by = None;
        let mut pickups = Vec::new();
        for &id in self.index.entities_in_row(row) {
            let Some(other) = self.entities.get(id) else {
                continue;
            };
            if !lateral_overlap(extent, other.lateral_extent()) {
                continue;
            }
            match other.kind() {
                EntityKind::Vehicle => lethal = true,
                EntityKind::Platform => carried_by = other.as_obstacle().map(|o| o.speed),
                EntityKind::Coin | EntityKind::Collectible => pickups.push(id),
                EntityKind::Player => {}
            }
        }

        let on_water = self
            .level
            .as_ref()
            .and_then(|l| l.row(row))
            .is_some_and(|r| r.row_type == RowType::Water);
        if !lethal && on_water {
            match carried_by {
                Some(speed) => lethal = !self.carry_player(speed * delta),
                None => lethal = true,
            }
        }

        if lethal {
            self.kill_player();
            return;
        }
        for id in pickups {
            self.consume_pickup(id);
        }
    }

    /// Shift the player along x; returns false if that leaves the playfield
    fn carry_player(&mut self, dx: f32) -> bool {
        let Some(tiles_per_row) = self.level.as_ref().map(Level::tiles_per_row) else {
            return true;
        };
        let min = tile_position(0, 0, tiles_per_row).x - TILE_SIZE * 0.5;
        let max = tile_position(0, tiles_per_row - 1, tiles_per_row).x + TILE_SIZE * 0.5;

        let x = self.player.transform.position.x + dx;
        self.player.transform.position.x = x;
        if let Some(state) = self.player.as_player_mut() {
            state.tile_column = column_at(x, tiles_per_row);
        }
        (min..=max).contains(&x)
    }

    fn kill_player(&mut self) {
        if let Some(state) = self.player.as_player_mut() {
            if state.kill() {
                log::debug!("Player died on row {}", state.tile_row);
                self.audio.play(SoundEffect::Death);
            }
        }
    }

    /// Record the current score in the profile's scoreboard
    ///
    /// Returns whether the score made the board. Does nothing without a level.
    pub fn save_score_to_scoreboard(&mut self) -> Result<bool, SceneError> {
        let Some((area, level)) = self.level_info().map(|i| (i.area, i.level)) else {
            return Ok(false);
        };
        let mut profile = profile::load_or_recover(self.profiles.as_mut())?;
        let kept = profile.record_score(area, level, self.score);
        self.profiles.save(&profile)?;
        log::info!("Saved score {} for {}-{} (kept: {})", self.score, area, level, kept);
        Ok(kept)
    }

    /// Save the score and advance progression after finishing a run
    ///
    /// Only acts when the player has reached the terminal row. Returns whether
    /// anything was recorded.
    pub fn complete_level(&mut self) -> Result<bool, SceneError> {
        if !self.player.as_player().is_some_and(PlayerState::is_game_over) {
            log::warn!("complete_level called before the terminal row was reached");
            return Ok(false);
        }
        let Some((area, level)) = self.level_info().map(|i| (i.area, i.level)) else {
            return Ok(false);
        };

        let mut profile = profile::load_or_recover(self.profiles.as_mut())?;
        profile.record_score(area, level, self.score);
        if profile.record_completion(area, level) {
            log::info!("Unlocked {}-{}", profile.reached_area, profile.reached_level);
        }
        self.profiles.save(&profile)?;
        Ok(true)
    }

    /// Submit the frame: in-view entities, the player, and nearby tiles
    pub fn render<L: ModelLoader>(&self, backend: &mut dyn RenderBackend, models: &mut ModelCache<L>) {
        backend.begin_frame(self.camera.view_matrix(), self.camera.projection_matrix());

        let player_z = self.player.transform.position.z;
        let view_distance = self.config.gameplay.view_distance;
        for tile in self.tiles.iter().filter(|t| (t.position.z - player_z).abs() <= view_distance) {
            let model = models.get_or_load(&tile.visual.mesh, &tile.visual.texture);
            let transform = Transform::from_position(tile.position).to_matrix();
            backend.submit(&model, &transform, &self.lights.for_position(tile.position));
        }

        let visible = self.entities.values().filter(|e| e.in_view);
        for entity in visible.chain(std::iter::once(&self.player)) {
            let model = models.get_or_load(&entity.visual.mesh, &entity.visual.texture);
            let position = entity.transform.position;
            backend.submit(&model, &entity.transform.to_matrix(), &self.lights.for_position(position));
        }
    }

    fn spawn_collectible(&mut self) {
        let (Some(level), Some(theme)) = (&self.level, &self.theme) else {
            return;
        };
        let tiles_per_row = level.tiles_per_row();
        let mut collectible = Entity::collectible(
            theme.collectible_visual(),
            level.last_row(),
            tiles_per_row / 2,
            tiles_per_row,
        );
        if let Some(special) = theme.special_case_collectible(level.info().level) {
            collectible.visual = special.visual;
            collectible.transform.scale = Vec3::repeat(special.scale);
            collectible.transform.rotation = special.rotation;
        }
        self.collectible = Some(self.spawn(collectible));
    }

    fn setup_lights(&mut self) {
        self.lights.reset();
        self.point_anchors.clear();
        self.spot_anchors.clear();
        let (Some(level), Some(theme)) = (&self.level, &self.theme) else {
            return;
        };
        if !level.info().night {
            return;
        }

        self.lights.directional = DirectionalLight::night();
        let entities: Vec<(EntityId, &Entity)> = self.entities.iter().collect();
        for (owner, light) in theme.setup_point_lights(&entities) {
            if let Some(entity) = self.entities.get(owner) {
                self.point_anchors.push((owner, light.position - entity.transform.position));
                self.lights.point_lights.push(light);
            }
        }
        for (owner, light) in theme.setup_spot_lights(&entities) {
            if let Some(entity) = self.entities.get(owner) {
                self.spot_anchors.push((owner, light.position - entity.transform.position));
                self.lights.spot_lights.push(light);
            }
        }

        let light_index = self.lights.point_lights.len();
        self.lights.point_lights.push(PointLight::new(
            Vec3::from(PLAYER_LIGHT_COLOR),
            self.player.transform.position + Vec3::new(0.0, PLAYER_LIGHT_HEIGHT, 0.0),
        ));
        if let Some(state) = self.player.as_player_mut() {
            state.light = Some(light_index);
        }
    }

    fn follow_player_light(&mut self, position: Vec3) {
        let Some(index) = self.player.as_player().and_then(|s| s.light) else {
            return;
        };
        if let Some(light) = self.lights.point_lights.get_mut(index) {
            light.position = position + Vec3::new(0.0, PLAYER_LIGHT_HEIGHT, 0.0);
        }
    }

    /// Move every theme light to its obstacle's current position
    fn follow_obstacle_lights(&mut self) {
        for (light, (owner, offset)) in self.lights.point_lights.iter_mut().zip(&self.point_anchors) {
            if let Some(entity) = self.entities.get(*owner) {
                light.position = entity.transform.position + offset;
            }
        }
        for (light, (owner, offset)) in self.lights.spot_lights.iter_mut().zip(&self.spot_anchors) {
            if let Some(entity) = self.entities.get(*owner) {
                light.position = entity.transform.position + offset;
            }
        }
    }

    /// Put the player back on the starting tile, alive
    fn reset_player(&mut self) {
        let Some(level) = &self.level else {
            return;
        };
        let (last_row, tiles_per_row) = (level.last_row(), level.tiles_per_row());
        let night = level.info().night;
        if let Some(state) = self.player.as_player_mut() {
            state.reset();
            state.set_grid(last_row, tiles_per_row);
            if !night {
                state.light = None;
            }
        }
        self.player.teleport_to_cell(0, tiles_per_row / 2, tiles_per_row);
        self.camera.update_position(self.player.transform.position);
        self.follow_player_light(self.player.transform.position);
    }

    /// Freeze or resume simulation; the camera keeps tracking while paused
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether simulation is frozen
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current score
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Seconds spent alive in this run
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed
    }

    /// Whether the level collectible was picked up this run
    pub fn collectible_collected(&self) -> bool {
        self.collectible_collected
    }

    /// The active level
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// Header of the active level
    pub fn level_info(&self) -> Option<&LevelInfo> {
        self.level.as_ref().map(Level::info)
    }

    /// The player entity
    pub fn player(&self) -> &Entity {
        &self.player
    }

    /// The player's state
    pub fn player_state(&self) -> Option<&PlayerState> {
        self.player.as_player()
    }

    /// Place the player on a cell directly
    pub fn teleport_player(&mut self, row: usize, column: usize) {
        if let Some(tiles_per_row) = self.level.as_ref().map(Level::tiles_per_row) {
            self.player.teleport_to_cell(row, column, tiles_per_row);
            self.camera.update_position(self.player.transform.position);
        }
    }

    /// Entity by handle
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable entity by handle
    ///
    /// Changing `row` through this reference desynchronizes the index; respawn instead.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// All arena entities; the player is not among them
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Number of arena entities of `kind`
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    /// Handles of entities in `row`
    pub fn entities_in_row(&self, row: usize) -> &[EntityId] {
        self.index.entities_in_row(row)
    }

    /// The collision index
    pub fn collision_index(&self) -> &CollisionIndex {
        &self.index
    }

    /// Ground tiles of the active level
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile at (`row`, `column`)
    pub fn tile(&self, row: usize, column: usize) -> Option<&Tile> {
        let level = self.level.as_ref()?;
        let tiles_per_row = level.tiles_per_row();
        if row >= level.row_count() || column >= tiles_per_row {
            return None;
        }
        self.tiles.get(row * tiles_per_row + column)
    }

    /// Follow camera
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Active lights
    pub fn lights(&self) -> &SceneLights {
        &self.lights
    }

    /// Game configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
