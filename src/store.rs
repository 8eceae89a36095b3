//! Flat-file JSON store for the loosely structured collections.
//!
//! Every document lives at `<root>/<name>.json`. Mutations take a per-file
//! async lock around the whole read-modify-write cycle and land through a
//! temp file + rename, so two admins saving the same collection in this
//! process never drop each other's changes.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::ApiError;

#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.entry(name.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Reads a collection; a missing file is an empty collection.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, ApiError> {
        Ok(self.read_opt(name).await?.unwrap_or_default())
    }

    /// Reads a single document; a missing file yields `T::default()`.
    pub async fn load_document<T: DeserializeOwned + Default>(
        &self,
        name: &str,
    ) -> Result<T, ApiError> {
        Ok(self.read_opt(name).await?.unwrap_or_default())
    }

    /// Runs `f` against the current contents under the file lock and writes
    /// the result back only when `f` succeeds.
    pub async fn update<T, R, F>(&self, name: &str, f: F) -> Result<R, ApiError>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut Vec<T>) -> Result<R, ApiError>,
    {
        let _guard = self.lock(name).await;
        let mut items: Vec<T> = self.read_opt(name).await?.unwrap_or_default();
        let out = f(&mut items)?;
        self.write(name, &items).await?;
        Ok(out)
    }

    pub async fn update_document<T, R, F>(&self, name: &str, f: F) -> Result<R, ApiError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Result<R, ApiError>,
    {
        let _guard = self.lock(name).await;
        let mut doc: T = self.read_opt(name).await?.unwrap_or_default();
        let out = f(&mut doc)?;
        self.write(name, &doc).await?;
        Ok(out)
    }

    async fn read_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        let path = self.path_of(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                log::error!("Isi {} bukan JSON valid: {}", path.display(), e);
                ApiError::Serialization(e)
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ApiError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_of(name);
        let tmp = self.root.join(format!(".{name}.json.tmp"));

        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
