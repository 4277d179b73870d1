//! Player progress record.
//!
//! This module provides:
//! - `ProgressState`: the full in-memory record the game mutates
//! - `MinimalProgressState`: the subset carried by progress codes
//! - `PartialProgress`: a record with any field missing, and its rehydration
//! - Mutation helpers used by puzzle and scene logic
//!
//! Field names on the wire are the camelCase keys shared by stored records
//! and every code generation, so old saves and codes load unchanged.

use escape_common::{ItemId, PuzzleId, SceneId, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use ahash::AHashSet;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Flag set by the instructor bypass code.
pub const TEACHER_MODE_FLAG: &str = "teacherMode";

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ============================================================================
// Milestones
// ============================================================================

/// One of the story seals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// First chapter seal.
    Seal1,
    /// Second chapter seal.
    Seal2,
    /// Third chapter seal.
    Seal3,
    /// Fourth chapter seal.
    Seal4,
    /// Final seal.
    Final,
}

impl Milestone {
    /// All milestones in story order.
    pub const ALL: [Self; 5] = [Self::Seal1, Self::Seal2, Self::Seal3, Self::Seal4, Self::Final];

    /// Key used in story files and on the wire.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Seal1 => "seal1",
            Self::Seal2 => "seal2",
            Self::Seal3 => "seal3",
            Self::Seal4 => "seal4",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown milestone key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown milestone: {0}")]
pub struct UnknownMilestone(pub String);

impl FromStr for Milestone {
    type Err = UnknownMilestone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| UnknownMilestone(s.to_string()))
    }
}

/// Completion state of every milestone. Missing keys read as incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestones {
    /// First chapter seal.
    pub seal1: bool,
    /// Second chapter seal.
    pub seal2: bool,
    /// Third chapter seal.
    pub seal3: bool,
    /// Fourth chapter seal.
    pub seal4: bool,
    /// Final seal.
    #[serde(rename = "final")]
    pub final_seal: bool,
}

impl Milestones {
    /// Whether `milestone` is complete.
    #[must_use]
    pub const fn is_complete(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Seal1 => self.seal1,
            Milestone::Seal2 => self.seal2,
            Milestone::Seal3 => self.seal3,
            Milestone::Seal4 => self.seal4,
            Milestone::Final => self.final_seal,
        }
    }

    /// Marks `milestone` complete.
    pub fn complete(&mut self, milestone: Milestone) {
        let slot = match milestone {
            Milestone::Seal1 => &mut self.seal1,
            Milestone::Seal2 => &mut self.seal2,
            Milestone::Seal3 => &mut self.seal3,
            Milestone::Seal4 => &mut self.seal4,
            Milestone::Final => &mut self.final_seal,
        };
        *slot = true;
    }

    /// Number of completed milestones.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        Milestone::ALL
            .into_iter()
            .filter(|m| self.is_complete(*m))
            .count()
    }
}

// ============================================================================
// Puzzles
// ============================================================================

/// Progress through a single puzzle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleStatus {
    /// Not yet opened.
    #[default]
    Locked,
    /// Opened but not solved.
    InProgress,
    /// Solved.
    Done,
}

/// Stored state of one puzzle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleState {
    /// Current status.
    pub status: PuzzleStatus,
    /// Score awarded by the puzzle.
    pub score: i64,
}

// ============================================================================
// Full record
// ============================================================================

/// The full progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    /// Record schema; always [`SCHEMA_VERSION`].
    #[serde(rename = "v")]
    pub schema_version: u32,
    /// Scene the player is in.
    pub current_scene_id: SceneId,
    /// Seal completion.
    #[serde(rename = "completed")]
    pub completed_milestones: Milestones,
    /// Per-puzzle state.
    #[serde(rename = "puzzles")]
    pub puzzle_states: BTreeMap<PuzzleId, PuzzleState>,
    /// Items in acquisition order, without duplicates.
    pub inventory: Vec<ItemId>,
    /// Item currently selected in the UI.
    pub selected_item: Option<ItemId>,
    /// Story switches.
    pub flags: BTreeMap<String, bool>,
    /// Failed attempts per puzzle, used for hint tiers.
    #[serde(rename = "attempts")]
    pub attempt_counts: BTreeMap<PuzzleId, u32>,
    /// Creation time in milliseconds since the epoch.
    pub created_at: u64,
    /// Last save time in milliseconds since the epoch.
    pub updated_at: u64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(now_millis())
    }
}

impl ProgressState {
    /// Fresh record at the entry scene, stamped with `now_ms`.
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            current_scene_id: SceneId::entry(),
            completed_milestones: Milestones::default(),
            puzzle_states: BTreeMap::new(),
            inventory: Vec::new(),
            selected_item: None,
            flags: BTreeMap::new(),
            attempt_counts: BTreeMap::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Parses a stored record, filling any missing field.
    pub fn from_json(json: &str, now_ms: u64) -> Result<Self, RecordError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RecordError::Syntax(e.to_string()))?;
        PartialProgress::from_value(value).map(|partial| partial.rehydrate(now_ms))
    }

    /// Serializes the full record.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("progress records have string keys and always serialize")
    }

    /// Moves to `scene`.
    pub fn enter_scene(&mut self, scene: impl Into<SceneId>) {
        self.current_scene_id = scene.into();
    }

    /// Returns the puzzle entry, creating it locked with no score.
    pub fn ensure_puzzle(&mut self, puzzle: &PuzzleId) -> &mut PuzzleState {
        self.puzzle_states.entry(puzzle.clone()).or_default()
    }

    /// Marks a puzzle as opened unless it is already solved.
    pub fn start_puzzle(&mut self, puzzle: &PuzzleId) {
        let state = self.ensure_puzzle(puzzle);
        if state.status != PuzzleStatus::Done {
            state.status = PuzzleStatus::InProgress;
        }
    }

    /// Marks a puzzle as solved.
    pub fn mark_puzzle_done(&mut self, puzzle: &PuzzleId) {
        self.ensure_puzzle(puzzle).status = PuzzleStatus::Done;
    }

    /// Status of a puzzle; unknown puzzles are locked.
    #[must_use]
    pub fn puzzle_status(&self, puzzle: &PuzzleId) -> PuzzleStatus {
        self.puzzle_states
            .get(puzzle)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    /// Adds an item. Returns `false` if it was already held.
    pub fn give_item(&mut self, item: impl Into<ItemId>) -> bool {
        let item = item.into();
        if self.inventory.contains(&item) {
            return false;
        }
        self.inventory.push(item);
        true
    }

    /// Whether the item is held.
    #[must_use]
    pub fn has_item(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    /// Selects an item, or clears the selection.
    pub fn select_item(&mut self, item: Option<ItemId>) {
        self.selected_item = item.filter(|item| self.inventory.contains(item));
    }

    /// Turns a flag on.
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into(), true);
    }

    /// Whether a flag is on.
    #[must_use]
    pub fn flag(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }

    /// Whether instructor mode is active.
    #[must_use]
    pub fn teacher_mode(&self) -> bool {
        self.flag(TEACHER_MODE_FLAG)
    }

    /// Completes a seal.
    pub fn complete_milestone(&mut self, milestone: Milestone) {
        self.completed_milestones.complete(milestone);
    }

    /// Whether a seal is complete.
    #[must_use]
    pub fn is_milestone_complete(&self, milestone: Milestone) -> bool {
        self.completed_milestones.is_complete(milestone)
    }

    /// Counts one more attempt at a puzzle and returns the new total.
    pub fn record_attempt(&mut self, puzzle: &PuzzleId) -> u32 {
        let count = self.attempt_counts.entry(puzzle.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Attempts recorded for a puzzle.
    #[must_use]
    pub fn attempts(&self, puzzle: &PuzzleId) -> u32 {
        self.attempt_counts.get(puzzle).copied().unwrap_or(0)
    }

    /// Stamps the record as saved at `now_ms`.
    pub fn touch(&mut self, now_ms: u64) {
        self.updated_at = now_ms;
    }
}

// ============================================================================
// Minimal record
// ============================================================================

/// The part of the record needed to resume play.
///
/// Attempt counters, the UI selection and timestamps are left out to keep
/// codes short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalProgressState {
    /// Record schema.
    #[serde(rename = "v")]
    pub schema_version: u32,
    /// Scene the player is in.
    pub current_scene_id: SceneId,
    /// Seal completion.
    #[serde(rename = "completed")]
    pub completed_milestones: Milestones,
    /// Per-puzzle state.
    #[serde(rename = "puzzles")]
    pub puzzle_states: BTreeMap<PuzzleId, PuzzleState>,
    /// Items in acquisition order.
    pub inventory: Vec<ItemId>,
    /// Story switches.
    pub flags: BTreeMap<String, bool>,
}

impl From<&ProgressState> for MinimalProgressState {
    fn from(state: &ProgressState) -> Self {
        Self {
            schema_version: state.schema_version,
            current_scene_id: state.current_scene_id.clone(),
            completed_milestones: state.completed_milestones,
            puzzle_states: state.puzzle_states.clone(),
            inventory: state.inventory.clone(),
            flags: state.flags.clone(),
        }
    }
}

impl MinimalProgressState {
    /// Serializes the minimal record.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("progress records have string keys and always serialize")
    }

    /// Rebuilds a full record, regenerating the dropped fields.
    #[must_use]
    pub fn rehydrate(self, now_ms: u64) -> ProgressState {
        PartialProgress::from(self).rehydrate(now_ms)
    }
}

// ============================================================================
// Partial record and rehydration
// ============================================================================

/// Why a JSON document is not a usable progress record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Not valid JSON.
    #[error("Invalid JSON: {0}")]
    Syntax(String),

    /// Valid JSON but not an object.
    #[error("Progress record must be a JSON object")]
    NotAnObject,

    /// Missing or foreign schema marker.
    #[error("Unsupported schema version: {0}")]
    SchemaVersion(String),

    /// A field has the wrong shape.
    #[error("Invalid field: {0}")]
    Field(String),
}

/// A progress record in which any field may be missing.
///
/// Older code generations and hand-edited records produce these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialProgress {
    /// Scene the player is in.
    pub current_scene_id: Option<SceneId>,
    /// Seal completion.
    #[serde(rename = "completed")]
    pub completed_milestones: Option<Milestones>,
    /// Per-puzzle state.
    #[serde(rename = "puzzles")]
    pub puzzle_states: Option<BTreeMap<PuzzleId, PuzzleState>>,
    /// Items in acquisition order.
    pub inventory: Option<Vec<ItemId>>,
    /// Selected item.
    pub selected_item: Option<ItemId>,
    /// Story switches.
    pub flags: Option<BTreeMap<String, bool>>,
    /// Attempt counters.
    #[serde(rename = "attempts")]
    pub attempt_counts: Option<BTreeMap<PuzzleId, u32>>,
    /// Creation time.
    pub created_at: Option<u64>,
    /// Last save time.
    pub updated_at: Option<u64>,
}

impl PartialProgress {
    /// Validates the schema marker and reads whatever fields are present.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        match object.get("v") {
            // `1.0` is the same number as `1` in JSON.
            Some(v) if v.as_f64() == Some(f64::from(SCHEMA_VERSION)) => {},
            Some(v) => return Err(RecordError::SchemaVersion(v.to_string())),
            None => return Err(RecordError::SchemaVersion("missing".to_string())),
        }
        serde_json::from_value(value).map_err(|e| RecordError::Field(e.to_string()))
    }

    /// Fills every missing field with its default.
    #[must_use]
    pub fn rehydrate(self, now_ms: u64) -> ProgressState {
        let mut seen = AHashSet::new();
        let inventory = self
            .inventory
            .unwrap_or_default()
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();

        ProgressState {
            schema_version: SCHEMA_VERSION,
            current_scene_id: self.current_scene_id.unwrap_or_default(),
            completed_milestones: self.completed_milestones.unwrap_or_default(),
            puzzle_states: self.puzzle_states.unwrap_or_default(),
            inventory,
            selected_item: self.selected_item,
            flags: self.flags.unwrap_or_default(),
            attempt_counts: self.attempt_counts.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now_ms),
            updated_at: self.updated_at.unwrap_or(now_ms),
        }
    }
}

impl From<MinimalProgressState> for PartialProgress {
    fn from(minimal: MinimalProgressState) -> Self {
        Self {
            current_scene_id: Some(minimal.current_scene_id),
            completed_milestones: Some(minimal.completed_milestones),
            puzzle_states: Some(minimal.puzzle_states),
            inventory: Some(minimal.inventory),
            flags: Some(minimal.flags),
            ..Self::default()
        }
    }
}
