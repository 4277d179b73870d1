//! The live game session: current progress plus where it is stored.

use escape_common::CodeError;
use thiserror::Error;
use tracing::{info, warn};

use crate::progress::{now_millis, ProgressState, TEACHER_MODE_FLAG};
use crate::progress_code;
use crate::storage::{ProgressStore, StorageError};

/// Default classroom bypass phrase.
pub const DEFAULT_TEACHER_CODE: &str = "DOCENTE";

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The entered text is not a usable progress code.
    #[error(transparent)]
    Code(#[from] CodeError),

    /// The store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// What an accepted import did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Progress was replaced by the code's contents.
    Restored,
    /// The teacher phrase was entered; progress was kept and teacher mode set.
    TeacherMode,
}

/// Owns the live progress record and keeps the store in step with it.
pub struct GameSession<S: ProgressStore> {
    state: ProgressState,
    store: S,
    teacher_code: String,
}

impl<S: ProgressStore> GameSession<S> {
    /// Opens a session, resuming the stored record or starting fresh.
    pub fn open(store: S) -> SessionResult<Self> {
        let state = match store.load()? {
            Some(state) => {
                info!("Resumed progress at scene {}", state.current_scene_id);
                state
            },
            None => {
                info!("Starting new progress");
                ProgressState::new(now_millis())
            },
        };
        Ok(Self {
            state,
            store,
            teacher_code: DEFAULT_TEACHER_CODE.to_string(),
        })
    }

    /// Replaces the teacher bypass phrase.
    #[must_use]
    pub fn with_teacher_code(mut self, code: impl Into<String>) -> Self {
        self.teacher_code = code.into();
        self
    }

    /// Current progress.
    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Mutable access for gameplay; call [`Self::save`] afterwards.
    pub fn state_mut(&mut self) -> &mut ProgressState {
        &mut self.state
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `input` is the teacher bypass phrase.
    #[must_use]
    pub fn is_teacher_code(&self, input: &str) -> bool {
        let phrase = self.teacher_code.trim();
        !phrase.is_empty() && input.trim().eq_ignore_ascii_case(phrase)
    }

    /// Produces a code for the current progress.
    #[must_use]
    pub fn export_code(&self) -> String {
        let code = progress_code::encode(&self.state);
        info!(
            scene = %self.state.current_scene_id,
            len = code.len(),
            "Exported progress code"
        );
        code
    }

    /// Applies a code entered by the player.
    ///
    /// On success the new progress is persisted. On failure the live progress
    /// is left exactly as it was.
    pub fn import_code(&mut self, input: &str) -> SessionResult<ImportOutcome> {
        if self.is_teacher_code(input) {
            self.state.set_flag(TEACHER_MODE_FLAG);
            self.save()?;
            info!("Teacher mode enabled");
            return Ok(ImportOutcome::TeacherMode);
        }

        let imported = progress_code::decode(input).map_err(|e| {
            warn!(kind = ?e.kind(), "Rejected progress code: {e}");
            e
        })?;
        self.state = imported;
        self.save()?;
        info!(
            scene = %self.state.current_scene_id,
            milestones = self.state.completed_milestones.completed_count(),
            "Imported progress code"
        );
        Ok(ImportOutcome::Restored)
    }

    /// Stamps the record and writes it to the store.
    pub fn save(&mut self) -> SessionResult<()> {
        self.state.touch(now_millis());
        self.store.save(&self.state)?;
        Ok(())
    }

    /// Discards all progress, both live and stored.
    pub fn reset(&mut self) -> SessionResult<()> {
        self.store.clear()?;
        self.state = ProgressState::new(now_millis());
        info!("Progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Milestone;
    use crate::storage::{FileStore, MemoryStore};
    use escape_common::{CodeErrorKind, PuzzleId};
    use tempfile::TempDir;

    fn advanced_session() -> GameSession<MemoryStore> {
        let mut session = GameSession::open(MemoryStore::new()).expect("open");
        let state = session.state_mut();
        state.enter_scene("r4_archive");
        state.complete_milestone(Milestone::Seal1);
        state.complete_milestone(Milestone::Seal2);
        state.complete_milestone(Milestone::Seal3);
        state.mark_puzzle_done(&PuzzleId::new("r3_p2"));
        state.give_item("lupa");
        session.save().expect("save");
        session
    }

    #[test]
    fn test_open_starts_fresh() {
        let session = GameSession::open(MemoryStore::new()).expect("open");
        assert_eq!(session.state().current_scene_id.as_str(), "intro");
        assert_eq!(session.state().completed_milestones.completed_count(), 0);
    }

    #[test]
    fn test_open_resumes_stored_record() {
        let session = advanced_session();
        let raw = session.store().raw().expect("stored").to_string();
        let resumed = GameSession::open(MemoryStore::with_raw(raw)).expect("open");
        assert_eq!(resumed.state(), session.state());
    }

    #[test]
    fn test_open_with_damaged_record_starts_fresh() {
        let session = GameSession::open(MemoryStore::with_raw("garbage")).expect("open");
        assert_eq!(session.state().current_scene_id.as_str(), "intro");
    }

    #[test]
    fn test_export_import_between_devices() {
        let source = advanced_session();
        let code = source.export_code();

        let mut target = GameSession::open(MemoryStore::new()).expect("open");
        let outcome = target.import_code(&code).expect("import");
        assert_eq!(outcome, ImportOutcome::Restored);
        assert_eq!(target.state().current_scene_id.as_str(), "r4_archive");
        assert!(target.state().is_milestone_complete(Milestone::Seal3));
        assert!(!target.state().is_milestone_complete(Milestone::Seal4));
        assert!(target.state().has_item(&"lupa".into()));

        // The import was persisted.
        let stored = target.store().load().expect("load").expect("record");
        assert_eq!(stored.current_scene_id.as_str(), "r4_archive");
    }

    #[test]
    fn test_failed_import_leaves_state_untouched() {
        let mut session = advanced_session();
        let before = session.state().clone();
        let stored_before = session.store().raw().map(str::to_string);

        let code = session.export_code();
        let tampered = format!("{}.{}", &code[..code.len() - 8], &code[code.len() - 6..]);
        let err = session.import_code(&tampered).expect_err("tampered code");
        assert!(matches!(err, SessionError::Code(_)));

        let err = session.import_code("GEN3.abc").expect_err("malformed code");
        match err {
            SessionError::Code(e) => assert_eq!(e.kind(), CodeErrorKind::Malformed),
            SessionError::Storage(e) => panic!("unexpected storage error: {e}"),
        }

        assert_eq!(session.state(), &before);
        assert_eq!(session.store().raw().map(str::to_string), stored_before);
    }

    #[test]
    fn test_teacher_code_sets_flag() {
        let mut session = advanced_session();
        let scene = session.state().current_scene_id.clone();

        let outcome = session.import_code("  docente \n").expect("import");
        assert_eq!(outcome, ImportOutcome::TeacherMode);
        assert!(session.state().teacher_mode());
        assert_eq!(session.state().current_scene_id, scene);

        let stored = session.store().load().expect("load").expect("record");
        assert!(stored.teacher_mode());
    }

    #[test]
    fn test_custom_teacher_code() {
        let mut session = GameSession::open(MemoryStore::new())
            .expect("open")
            .with_teacher_code("Profe2024");

        let err = session.import_code("DOCENTE").expect_err("default phrase replaced");
        assert!(matches!(err, SessionError::Code(CodeError::Malformed { segments: 1 })));
        assert_eq!(
            session.import_code("PROFE2024").expect("import"),
            ImportOutcome::TeacherMode
        );
    }

    #[test]
    fn test_empty_teacher_code_never_matches() {
        let session = GameSession::open(MemoryStore::new())
            .expect("open")
            .with_teacher_code("   ");
        assert!(!session.is_teacher_code(""));
        assert!(!session.is_teacher_code("   "));
    }

    #[test]
    fn test_reset() {
        let mut session = advanced_session();
        session.reset().expect("reset");
        assert_eq!(session.state().current_scene_id.as_str(), "intro");
        assert!(session.store().raw().is_none());
    }

    #[test]
    fn test_file_backed_session() {
        let temp = TempDir::new().expect("temp dir");
        let code = advanced_session().export_code();

        {
            let mut session = GameSession::open(FileStore::new(temp.path())).expect("open");
            session.import_code(&code).expect("import");
        }

        let session = GameSession::open(FileStore::new(temp.path())).expect("reopen");
        assert_eq!(session.state().current_scene_id.as_str(), "r4_archive");
        assert_eq!(session.state().completed_milestones.completed_count(), 3);
    }
}
