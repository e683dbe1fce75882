//! Persistence for the client session: named string slots, like browser
//! local storage. The session is handed a store; it never reaches for one.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serialized [`Wallet`](chainritual_common::wallet::Wallet) record.
pub const WALLET_SLOT: &str = "wallet";
/// Serialized activity history list.
pub const HISTORY_SLOT: &str = "history";
/// Last BTC/USD price successfully fetched.
pub const PRICE_SLOT: &str = "btcPrice";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid slot name {0:?}")]
    InvalidSlot(String),
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait WalletStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, slot: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, slot: &str) -> Result<(), StoreError>;
}

/// In-memory slots, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WalletStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots().get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        self.slots().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StoreError> {
        self.slots().remove(slot);
        Ok(())
    }
}

/// One `<slot>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/chainritual`, falling back to `/tmp/chainritual`.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("chainritual")
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StoreError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl WalletStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(slot)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(slot)?;
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_err(&path))?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StoreError> {
        let path = self.slot_path(slot)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}
