//! Persistence of the checklist state.
//!
//! The engine itself never touches storage. The host hands a [`PersistencePort`] to the
//! checklist service, which calls `load()` once when the screen mounts and `save()` after every
//! mutation. Saving is fire-and-forget: adapters log failures instead of returning them.
//!
//! Two adapters are provided:
//! - [`MemoryPort`], which keeps the last saved state in memory.
//! - [`FileDraftStore`], which stores one JSON file per report draft under
//!   `<drafts_dir>/<s1>/<s2>/<draft-uuid>/ecc_conditions.json`.

use crate::conditions::{Annotations, CustomStore, OverlayStore, RemovedDefaults};
use crate::config::CoreConfig;
use crate::constants::ECC_CONDITIONS_FILENAME;
use crate::{CoreError, CoreResult};
use cmvr_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Everything the checklist needs to resume a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub overlays: OverlayStore,
    #[serde(default)]
    pub customs: CustomStore,
    #[serde(default)]
    pub removed_ids: RemovedDefaults,
    #[serde(flatten)]
    pub annotations: Annotations,
}

/// Storage port for the checklist state.
pub trait PersistencePort {
    /// Load the saved state. `None` means "start from the bare template set".
    fn load(&self) -> Option<PersistedState>;
    /// Persist the state (best-effort; implementations log errors internally).
    fn save(&self, state: &PersistedState);
}

/// In-memory port; also counts saves.
#[derive(Debug, Default)]
pub struct MemoryPort {
    state: RefCell<Option<PersistedState>>,
    saves: Cell<usize>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            saves: Cell::new(0),
        }
    }

    /// The most recently saved (or seeded) state.
    pub fn stored(&self) -> Option<PersistedState> {
        self.state.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl PersistencePort for MemoryPort {
    fn load(&self) -> Option<PersistedState> {
        self.stored()
    }

    fn save(&self, state: &PersistedState) {
        *self.state.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
    }
}

/// File-backed storage for one report draft.
#[derive(Clone, Debug)]
pub struct FileDraftStore {
    draft_id: ShardableUuid,
    draft_dir: PathBuf,
}

impl FileDraftStore {
    /// Allocate a new, empty draft directory under the configured drafts dir.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageDirCreation` if the drafts dir cannot be created and
    /// `CoreError::DraftDirCreation` if no unique draft directory could be allocated.
    pub fn create(cfg: &CoreConfig) -> CoreResult<Self> {
        fs::create_dir_all(cfg.drafts_dir()).map_err(CoreError::StorageDirCreation)?;
        let (draft_id, draft_dir) =
            create_uuid_and_shard_dir(cfg.drafts_dir(), ShardableUuid::new)?;
        tracing::info!("created draft {}", draft_id);
        Ok(Self {
            draft_id,
            draft_dir,
        })
    }

    /// Open an existing draft by its canonical UUID.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Uuid` for a non-canonical id and `CoreError::DraftNotFound` if the
    /// draft directory does not exist.
    pub fn open(cfg: &CoreConfig, draft_id: &str) -> CoreResult<Self> {
        let draft_id = ShardableUuid::parse(draft_id)?;
        let draft_dir = draft_id.sharded_dir(cfg.drafts_dir());
        if !draft_dir.is_dir() {
            return Err(CoreError::DraftNotFound(draft_id.to_string()));
        }
        Ok(Self {
            draft_id,
            draft_dir,
        })
    }

    pub fn draft_id(&self) -> &ShardableUuid {
        &self.draft_id
    }

    pub fn state_path(&self) -> PathBuf {
        self.draft_dir.join(ECC_CONDITIONS_FILENAME)
    }

    /// Read the saved checklist state; `Ok(None)` if nothing has been saved yet.
    pub fn try_load(&self) -> CoreResult<Option<PersistedState>> {
        let contents = match fs::read_to_string(self.state_path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::FileRead(e)),
        };

        let state = serde_json::from_str(&contents).map_err(CoreError::Deserialization)?;
        Ok(Some(state))
    }

    /// Write the checklist state, replacing the previous file atomically.
    pub fn try_save(&self, state: &PersistedState) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(state).map_err(CoreError::Serialization)?;
        let path = self.state_path();
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json).map_err(CoreError::FileWrite)?;
        fs::rename(&tmp, &path).map_err(CoreError::FileWrite)?;
        Ok(())
    }
}

impl PersistencePort for FileDraftStore {
    fn load(&self) -> Option<PersistedState> {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("failed to load draft {}: {}", self.draft_id, e);
                None
            }
        }
    }

    fn save(&self, state: &PersistedState) {
        if let Err(e) = self.try_save(state) {
            tracing::warn!("failed to save draft {}: {}", self.draft_id, e);
        } else {
            tracing::debug!("saved draft {}", self.draft_id);
        }
    }
}

/// Lists the ids of all drafts under `drafts_dir`.
///
/// Walks the `<s1>/<s2>/<uuid>` shard layout; entries that are not directories or whose leaf
/// name is not a canonical UUID are skipped. A missing drafts dir yields an empty list.
pub fn list_drafts(drafts_dir: &Path) -> Vec<ShardableUuid> {
    fn subdirs(path: &Path) -> Vec<PathBuf> {
        match fs::read_dir(path) {
            Ok(it) => it
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    let mut drafts: Vec<ShardableUuid> = subdirs(drafts_dir)
        .iter()
        .flat_map(|s1| subdirs(s1))
        .flat_map(|s2| subdirs(&s2))
        .filter_map(|leaf| {
            leaf.file_name()
                .and_then(|os| os.to_str())
                .and_then(|name| ShardableUuid::parse(name).ok())
        })
        .collect();

    drafts.sort_by_key(|id| id.to_string());
    drafts
}

/// Creates a unique sharded directory for a new draft.
///
/// Guards against UUID collisions or pre-existing directories by retrying up to 5 times.
fn create_uuid_and_shard_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> ShardableUuid,
) -> CoreResult<(ShardableUuid, PathBuf)> {
    for _attempt in 0..5 {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(CoreError::DraftDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(CoreError::DraftDirCreation(e)),
        }
    }

    Err(CoreError::DraftDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique draft directory after 5 attempts",
    )))
}
