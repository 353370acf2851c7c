use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// UI state restored on the next start.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppState {
    #[serde(default)]
    pub last_route: Option<String>,
    /// Last applied store filter query string.
    #[serde(default)]
    pub store_query: Option<String>,
}

#[derive(Clone)]
pub struct StateStore {
    path: Option<PathBuf>,
}

impl StateStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store that never touches disk.
    #[must_use]
    pub fn disabled() -> Self {
        tracing::warn!("State persistence disabled.");
        Self { path: None }
    }

    /// Loads the persisted state from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be read (unless it doesn't exist,
    /// in which case default state is returned).
    pub async fn load(&self) -> Result<AppState> {
        let Some(path) = &self.path else {
            return Ok(AppState::default());
        };

        if !path.exists() {
            return Ok(AppState::default());
        }

        let content = fs::read_to_string(path)
            .await
            .wrap_err("Failed to read state file")?;

        match toml::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable state file");
                Ok(AppState::default())
            }
        }
    }

    /// Saves the state to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the state file cannot be written.
    pub async fn save(&self, state: &AppState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .wrap_err("Failed to create config directory")?;
        }

        let content = toml::to_string(state).wrap_err("Failed to serialize state")?;

        fs::write(path, content)
            .await
            .wrap_err("Failed to write state file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_load_state() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.toml"));
        let state = AppState {
            last_route: Some("store".to_string()),
            store_query: Some("q=fiber&channel=Online".to_string()),
        };

        store.save(&state).await.unwrap();

        assert_eq!(store.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_file_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let store = StateStore::new(path.clone());

        assert_eq!(store.load().await.unwrap(), AppState::default());

        std::fs::write(&path, "store_query = [").unwrap();
        assert_eq!(store.load().await.unwrap(), AppState::default());
    }

    #[tokio::test]
    async fn test_disabled_store_is_noop() {
        let store = StateStore::disabled();
        store.save(&AppState::default()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), AppState::default());
    }
}
