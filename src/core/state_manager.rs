/*
 * Persists the ContextYap state record (items plus window geometry) as a
 * single pretty-printed JSON file. The whole file is rewritten on every save;
 * there is no journaling and a crash mid-write can truncate it.
 *
 * Loading is forgiving: a missing file yields the default record, and a file
 * that exists but cannot be parsed is moved aside to
 * `<name>.corrupt-<unix-seconds>` before the defaults are returned, so the
 * next save does not destroy what was there.
 */
use super::models::PersistedState;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

#[derive(Debug)]
pub enum StateError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for StateError {
    fn from(err: io::Error) -> Self {
        StateError::Io(err)
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serde(err)
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Io(e) => write!(f, "State file I/O error: {e}"),
            StateError::Serde(e) => write!(f, "State file serialization error: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io(e) => Some(e),
            StateError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;

pub trait StateManagerOperations: Send + Sync {
    fn load_state(&self) -> Result<PersistedState>;
    fn save_state(&self, state: &PersistedState) -> Result<()>;
}

pub struct CoreStateManager {
    state_path: PathBuf,
}

impl CoreStateManager {
    pub fn new(state_path: PathBuf) -> Self {
        CoreStateManager { state_path }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn backup_path(&self) -> PathBuf {
        let file_name = self
            .state_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state.json".to_string());
        let stamp = OffsetDateTime::now_utc().unix_timestamp();
        self.state_path
            .with_file_name(format!("{file_name}.corrupt-{stamp}"))
    }

    fn preserve_corrupt_file(&self) {
        let backup = self.backup_path();
        match fs::rename(&self.state_path, &backup) {
            Ok(()) => log::warn!(
                "CoreStateManager: Moved unreadable state file {:?} to {backup:?}.",
                self.state_path
            ),
            Err(e) => log::error!(
                "CoreStateManager: Failed to back up unreadable state file {:?}: {e}",
                self.state_path
            ),
        }
    }
}

impl StateManagerOperations for CoreStateManager {
    fn load_state(&self) -> Result<PersistedState> {
        let path = &self.state_path;
        log::trace!("CoreStateManager: Loading state from {path:?}");
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("CoreStateManager: No state file at {path:?}, starting empty.");
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(StateError::Io(e)),
        };

        match serde_json::from_str::<PersistedState>(&text) {
            Ok(state) => {
                log::debug!(
                    "CoreStateManager: Loaded {} items from {path:?}.",
                    state.items.len()
                );
                Ok(state)
            }
            Err(e) => {
                log::warn!("CoreStateManager: State file {path:?} is not valid: {e}");
                self.preserve_corrupt_file();
                Ok(PersistedState::default())
            }
        }
    }

    fn save_state(&self, state: &PersistedState) -> Result<()> {
        let path = &self.state_path;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, state)?;
        writer.flush()?;
        log::trace!(
            "CoreStateManager: Saved {} items to {path:?}.",
            state.items.len()
        );
        Ok(())
    }
}
