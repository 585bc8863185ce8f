//! Player profile persistence
//!
//! The profile carries progression, the animal roster and the per-level
//! scoreboards. Storage is behind [`ProfileStore`] so the scene can be driven
//! against an in-memory store in tests. On disk the profile is RON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scores kept per level
pub const SCOREBOARD_CAPACITY: usize = 5;

/// Levels in every area
pub const LEVELS_PER_AREA: u32 = 5;

/// Number of areas in the game
pub const AREA_COUNT: u32 = 3;

/// Profile storage errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No profile has been saved yet
    #[error("Profile not found")]
    NotFound,

    /// Reading or writing the store failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data is not a valid profile
    #[error("Corrupt profile: {0}")]
    Parse(String),

    /// The profile could not be serialized
    #[error("Failed to serialize profile: {0}")]
    Serialize(String),
}

/// Top scores for one level, sorted descending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelScoreboard {
    scores: Vec<i64>,
}

impl LevelScoreboard {
    /// Insert `score` if it makes the top [`SCOREBOARD_CAPACITY`]
    ///
    /// Returns whether the score was kept. Ties with the current minimum of a
    /// full board are rejected.
    pub fn try_insert_score(&mut self, score: i64) -> bool {
        if self.scores.len() >= SCOREBOARD_CAPACITY && self.scores.last().is_some_and(|&min| score <= min) {
            return false;
        }
        let slot = self.scores.partition_point(|&s| s >= score);
        self.scores.insert(slot, score);
        self.scores.truncate(SCOREBOARD_CAPACITY);
        true
    }

    /// Scores, highest first
    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    /// Best score, if any
    pub fn high_score(&self) -> Option<i64> {
        self.scores.first().copied()
    }
}

/// Scoreboards indexed by 0-based (area, level)
///
/// Buckets are created on first access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    areas: Vec<Vec<LevelScoreboard>>,
}

impl Scoreboard {
    /// Bucket for 0-based `area` and `level`, growing storage as needed
    pub fn level_mut(&mut self, area: usize, level: usize) -> &mut LevelScoreboard {
        if self.areas.len() <= area {
            self.areas.resize_with(area + 1, Vec::new);
        }
        let levels = &mut self.areas[area];
        if levels.len() <= level {
            levels.resize_with(level + 1, LevelScoreboard::default);
        }
        &mut levels[level]
    }

    /// Bucket for 0-based `area` and `level`, if it exists
    pub fn level(&self, area: usize, level: usize) -> Option<&LevelScoreboard> {
        self.areas.get(area)?.get(level)
    }
}

/// A playable character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    /// Display name
    pub name: String,
    /// Mesh name
    pub mesh: String,
    /// Texture name
    pub texture: String,
    /// Whether the player may select it
    pub unlocked: bool,
}

impl Animal {
    fn new(name: &str, mesh: &str, texture: &str, unlocked: bool) -> Self {
        Self {
            name: name.to_string(),
            mesh: mesh.to_string(),
            texture: texture.to_string(),
            unlocked,
        }
    }
}

/// Animal roster with a selection cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalList {
    animals: Vec<Animal>,
    current: usize,
}

impl Default for AnimalList {
    fn default() -> Self {
        Self {
            animals: vec![
                Animal::new("Frog", "frog", "frog.png", true),
                Animal::new("Bunny", "bunny", "bunny.png", false),
                Animal::new("Turtle", "turtle", "turtle.png", false),
            ],
            current: 0,
        }
    }
}

impl AnimalList {
    /// Build a roster; the cursor starts on the first animal
    pub fn new(animals: Vec<Animal>) -> Self {
        Self { animals, current: 0 }
    }

    /// The selected animal
    ///
    /// Falls back to the first animal if the cursor is out of range.
    pub fn current(&self) -> Option<&Animal> {
        self.animals.get(self.current).or_else(|| self.animals.first())
    }

    /// All animals in roster order
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Unlock the animal at `index`; returns false if it does not exist
    pub fn unlock(&mut self, index: usize) -> bool {
        match self.animals.get_mut(index) {
            Some(animal) => {
                animal.unlocked = true;
                true
            }
            None => false,
        }
    }

    /// Move the cursor forward to the next unlocked animal, wrapping
    pub fn next_unlocked(&mut self) -> Option<&Animal> {
        self.step(1)
    }

    /// Move the cursor back to the previous unlocked animal, wrapping
    pub fn prev_unlocked(&mut self) -> Option<&Animal> {
        self.step(self.animals.len().saturating_sub(1))
    }

    fn step(&mut self, stride: usize) -> Option<&Animal> {
        let count = self.animals.len();
        let mut index = self.current;
        for _ in 0..count {
            index = (index + stride) % count;
            if self.animals[index].unlocked {
                self.current = index;
                break;
            }
        }
        self.current()
    }
}

/// Persisted player progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Furthest area unlocked, 1-based
    pub reached_area: u32,
    /// Furthest level unlocked within `reached_area`, 1-based
    pub reached_level: u32,
    /// Animal roster
    pub animals: AnimalList,
    /// Per-level top scores
    pub scoreboard: Scoreboard,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            reached_area: 1,
            reached_level: 1,
            animals: AnimalList::default(),
            scoreboard: Scoreboard::default(),
        }
    }
}

impl Profile {
    /// Whether `area`-`level` may be played
    pub fn is_level_unlocked(&self, area: u32, level: u32) -> bool {
        area < self.reached_area || (area == self.reached_area && level <= self.reached_level)
    }

    /// Record a score for 1-based `area`-`level`; returns whether it was kept
    pub fn record_score(&mut self, area: u32, level: u32, score: i64) -> bool {
        let (Some(area_index), Some(level_index)) = (area.checked_sub(1), level.checked_sub(1)) else {
            return false;
        };
        self.scoreboard
            .level_mut(area_index as usize, level_index as usize)
            .try_insert_score(score)
    }

    /// Advance progression after completing `area`-`level`
    ///
    /// Only the furthest reached level moves progression. Finishing an area's
    /// last level opens the next area and unlocks the next animal. Returns
    /// whether anything changed.
    pub fn record_completion(&mut self, area: u32, level: u32) -> bool {
        if area != self.reached_area || level != self.reached_level {
            return false;
        }
        if level < LEVELS_PER_AREA {
            self.reached_level += 1;
            return true;
        }
        if area < AREA_COUNT {
            self.reached_area += 1;
            self.reached_level = 1;
            self.animals.unlock(area as usize);
            return true;
        }
        false
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, PersistenceError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PersistenceError::Serialize(e.to_string()))
    }

    /// Deserialize from RON
    pub fn from_ron(data: &str) -> Result<Self, PersistenceError> {
        ron::from_str(data).map_err(|e| PersistenceError::Parse(e.to_string()))
    }
}

/// Loads and saves the profile
pub trait ProfileStore {
    /// Read the stored profile
    fn load(&self) -> Result<Profile, PersistenceError>;

    /// Replace the stored profile
    fn save(&mut self, profile: &Profile) -> Result<(), PersistenceError>;
}

/// Load the profile, replacing a missing or corrupt one with a saved default
pub fn load_or_recover(store: &mut dyn ProfileStore) -> Result<Profile, PersistenceError> {
    match store.load() {
        Ok(profile) => Ok(profile),
        Err(e @ (PersistenceError::NotFound | PersistenceError::Parse(_))) => {
            log::warn!("{}; creating a default profile", e);
            let profile = Profile::default();
            store.save(&profile)?;
            Ok(profile)
        }
        Err(e) => Err(e),
    }
}

/// Profile stored as a RON file
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the profile file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Result<Profile, PersistenceError> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PersistenceError::NotFound
            } else {
                PersistenceError::Io(e)
            }
        })?;
        Profile::from_ron(&data)
    }

    fn save(&mut self, profile: &Profile) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, profile.to_ron()?)?;
        log::debug!("Saved profile to {}", self.path.display());
        Ok(())
    }
}

/// Profile held in memory as serialized RON
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    data: Option<String>,
    saves: usize,
}

impl MemoryProfileStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `profile`
    pub fn with_profile(profile: &Profile) -> Result<Self, PersistenceError> {
        Ok(Self {
            data: Some(profile.to_ron()?),
            saves: 0,
        })
    }

    /// Store holding arbitrary, possibly corrupt, data
    pub fn with_raw(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            saves: 0,
        }
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Result<Profile, PersistenceError> {
        match &self.data {
            Some(data) => Profile::from_ron(data),
            None => Err(PersistenceError::NotFound),
        }
    }

    fn save(&mut self, profile: &Profile) -> Result<(), PersistenceError> {
        self.data = Some(profile.to_ron()?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scoreboard_keeps_top_scores_sorted() {
        let mut board = LevelScoreboard::default();
        for score in [30, 10, 50, 20, 40] {
            assert!(board.try_insert_score(score));
        }
        assert_eq!(board.scores(), &[50, 40, 30, 20, 10]);

        assert!(board.try_insert_score(35));
        assert_eq!(board.scores(), &[50, 40, 35, 30, 20]);
        assert_eq!(board.scores().len(), SCOREBOARD_CAPACITY);
    }

    #[test]
    fn test_full_scoreboard_rejects_low_scores() {
        let mut board = LevelScoreboard::default();
        for score in [50, 40, 30, 20, 10] {
            board.try_insert_score(score);
        }
        assert!(!board.try_insert_score(5));
        assert!(!board.try_insert_score(10), "ties with the minimum are rejected");
        assert_eq!(board.scores(), &[50, 40, 30, 20, 10]);
        assert_eq!(board.high_score(), Some(50));
    }

    #[test]
    fn test_scoreboard_grows_lazily() {
        let mut scoreboard = Scoreboard::default();
        assert!(scoreboard.level(2, 4).is_none());

        scoreboard.level_mut(2, 4).try_insert_score(70);
        assert_eq!(scoreboard.level(2, 4).unwrap().scores(), &[70]);
        assert!(scoreboard.level(0, 0).unwrap().scores().is_empty());
    }

    #[test]
    fn test_animal_cursor_skips_locked() {
        let mut animals = AnimalList::default();
        assert_eq!(animals.next_unlocked().unwrap().name, "Frog");

        animals.unlock(2);
        assert_eq!(animals.next_unlocked().unwrap().name, "Turtle");
        assert_eq!(animals.next_unlocked().unwrap().name, "Frog");
        assert_eq!(animals.prev_unlocked().unwrap().name, "Turtle");
        assert!(!animals.unlock(9));
    }

    #[test]
    fn test_progression_advances_from_furthest_level_only() {
        let mut profile = Profile::default();
        assert!(profile.record_completion(1, 1));
        assert_eq!((profile.reached_area, profile.reached_level), (1, 2));

        assert!(!profile.record_completion(1, 1), "replaying an old level changes nothing");

        profile.reached_level = LEVELS_PER_AREA;
        assert!(profile.record_completion(1, LEVELS_PER_AREA));
        assert_eq!((profile.reached_area, profile.reached_level), (2, 1));
        assert!(profile.animals.animals()[1].unlocked);

        assert!(profile.is_level_unlocked(1, 5));
        assert!(profile.is_level_unlocked(2, 1));
        assert!(!profile.is_level_unlocked(2, 2));
    }

    #[test]
    fn test_record_score_uses_zero_based_buckets() {
        let mut profile = Profile::default();
        assert!(profile.record_score(2, 3, 120));
        assert_eq!(profile.scoreboard.level(1, 2).unwrap().scores(), &[120]);
        assert!(!profile.record_score(0, 1, 10));
    }

    #[test]
    fn test_recover_replaces_missing_and_corrupt_profiles() {
        let mut empty = MemoryProfileStore::new();
        assert_eq!(load_or_recover(&mut empty).unwrap(), Profile::default());
        assert_eq!(empty.saves(), 1);

        let mut corrupt = MemoryProfileStore::with_raw("(reached_area: ");
        assert_eq!(load_or_recover(&mut corrupt).unwrap(), Profile::default());
        assert!(corrupt.load().is_ok(), "default was persisted");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileProfileStore::new(dir.path().join("saves").join("profile.ron"));
        assert!(matches!(store.load(), Err(PersistenceError::NotFound)));

        let mut profile = Profile::default();
        profile.record_score(1, 1, 40);
        profile.record_completion(1, 1);
        store.save(&profile).unwrap();

        assert_eq!(store.load().unwrap(), profile);
    }
}
