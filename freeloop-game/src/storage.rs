//! Save records and the storage backends that hold them.
//!
//! A save is a small JSON envelope `{version, checksum, state}`. The checksum
//! is an `XxHash64` of the canonical state JSON, so a truncated or hand-edited
//! record is detected and treated as "no saved game" instead of loading
//! garbage. Records written before the envelope existed (a bare state object)
//! are still accepted.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::constants::{SAVE_CHECKSUM_SEED, SAVE_FORMAT_VERSION};
use crate::state::PlayerState;

/// Failures while reading or writing a save record.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("save record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save record version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("save record checksum mismatch (stored {stored:#018x}, computed {computed:#018x})")]
    Checksum { stored: u64, computed: u64 },
}

impl StorageError {
    /// Whether the record exists but cannot be trusted.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// On-disk shape of one save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    pub checksum: u64,
    pub state: serde_json::Value,
}

impl SaveRecord {
    /// Wrap a state in a checksummed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Json`] if the state cannot be serialized.
    pub fn seal(state: &PlayerState) -> Result<Self, StorageError> {
        let state = serde_json::to_value(state)?;
        let checksum = canonical_checksum(&state)?;
        Ok(Self {
            version: SAVE_FORMAT_VERSION,
            checksum,
            state,
        })
    }

    /// Verify the envelope and decode the state, clamping out-of-range fields.
    ///
    /// # Errors
    ///
    /// Returns a corrupt-record error on version or checksum mismatch, or when
    /// the state does not decode.
    pub fn open(self) -> Result<PlayerState, StorageError> {
        if self.version != SAVE_FORMAT_VERSION {
            return Err(StorageError::Version {
                found: self.version,
                expected: SAVE_FORMAT_VERSION,
            });
        }
        let computed = canonical_checksum(&self.state)?;
        if computed != self.checksum {
            return Err(StorageError::Checksum {
                stored: self.checksum,
                computed,
            });
        }
        let mut state: PlayerState = serde_json::from_value(self.state)?;
        state.clamp();
        Ok(state)
    }

    /// Encode to the JSON text a backend stores.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode a state as stored record text.
///
/// # Errors
///
/// Returns [`StorageError::Json`] if serialization fails.
pub fn encode_record(state: &PlayerState) -> Result<String, StorageError> {
    SaveRecord::seal(state)?.to_json()
}

/// Decode stored record text, accepting legacy bare-state records.
///
/// # Errors
///
/// Returns a corrupt-record error for anything that is neither a valid
/// envelope nor a bare state object.
pub fn decode_record(text: &str) -> Result<PlayerState, StorageError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let is_envelope = value.get("version").is_some() && value.get("checksum").is_some();
    if is_envelope {
        let record: SaveRecord = serde_json::from_value(value)?;
        return record.open();
    }
    let mut state: PlayerState = serde_json::from_value(value)?;
    state.clamp();
    log::debug!("loaded legacy save without envelope");
    Ok(state)
}

/// Decode a record read from a backend: corrupt means "no saved game".
fn recover(slot: &str, text: Option<String>) -> Option<PlayerState> {
    let text = text?;
    match decode_record(&text) {
        Ok(state) => Some(state),
        Err(err) => {
            log::warn!("discarding corrupt save in slot '{slot}': {err}");
            None
        }
    }
}

fn canonical_checksum(state: &serde_json::Value) -> Result<u64, StorageError> {
    let canonical = serde_json::to_string(state)?;
    let mut hasher = XxHash64::with_seed(SAVE_CHECKSUM_SEED);
    hasher.write(canonical.as_bytes());
    Ok(hasher.finish())
}

/// Save/load contract the session persists through.
///
/// `load_state` returns `Ok(None)` for a missing *or corrupt* record; only
/// backend failures are errors.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the live state under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save_state(&self, slot: &str, state: &PlayerState) -> Result<(), Self::Error>;

    /// Load the state under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load_state(&self, slot: &str) -> Result<Option<PlayerState>, Self::Error>;

    /// Forget the state under `slot`; deleting a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    fn delete_state(&self, slot: &str) -> Result<(), Self::Error>;
}

/// In-process storage; clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw record text in `slot`, if any.
    #[must_use]
    pub fn raw(&self, slot: &str) -> Option<String> {
        self.records.borrow().get(slot).cloned()
    }

    /// Overwrite `slot` with arbitrary text.
    pub fn put_raw(&self, slot: &str, text: impl Into<String>) {
        self.records
            .borrow_mut()
            .insert(slot.to_string(), text.into());
    }
}

impl GameStorage for MemoryStorage {
    type Error = StorageError;

    fn save_state(&self, slot: &str, state: &PlayerState) -> Result<(), Self::Error> {
        let text = encode_record(state)?;
        self.put_raw(slot, text);
        Ok(())
    }

    fn load_state(&self, slot: &str) -> Result<Option<PlayerState>, Self::Error> {
        Ok(recover(slot, self.raw(slot)))
    }

    fn delete_state(&self, slot: &str) -> Result<(), Self::Error> {
        self.records.borrow_mut().remove(slot);
        Ok(())
    }
}

/// One `<slot>.json` file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        let name: String = slot
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl GameStorage for FileStorage {
    type Error = StorageError;

    fn save_state(&self, slot: &str, state: &PlayerState) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encode_record(state)?)?;
        fs::rename(&tmp, &path)?;
        log::debug!("saved slot '{slot}' to {}", path.display());
        Ok(())
    }

    fn load_state(&self, slot: &str) -> Result<Option<PlayerState>, Self::Error> {
        let text = match fs::read_to_string(self.slot_path(slot)) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        Ok(recover(slot, text))
    }

    fn delete_state(&self, slot: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SAVE_SLOT;

    fn sample_state() -> PlayerState {
        PlayerState {
            day: 7,
            design_skill: 4.25,
            dev_skill: 1.1,
            qa_skill: 0.9,
            stress: 3.0,
            money: 412.5,
            pc_level: 2,
            skipped_job_days: 1,
            upkeep_paid_day: 7,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "freeloop-storage-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_storage_roundtrips_and_deletes() {
        let storage = MemoryStorage::new();
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());
        storage.save_state(SAVE_SLOT, &sample_state()).unwrap();
        assert_eq!(storage.load_state(SAVE_SLOT).unwrap(), Some(sample_state()));
        storage.delete_state(SAVE_SLOT).unwrap();
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());
        storage.delete_state(SAVE_SLOT).unwrap();
    }

    #[test]
    fn tampered_record_is_treated_as_absent() {
        let storage = MemoryStorage::new();
        storage.save_state(SAVE_SLOT, &sample_state()).unwrap();
        let tampered = storage
            .raw(SAVE_SLOT)
            .unwrap()
            .replace("412.5", "99999.0");
        storage.put_raw(SAVE_SLOT, tampered);
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());
    }

    #[test]
    fn garbage_and_wrong_version_are_corrupt() {
        assert!(decode_record("{not json").unwrap_err().is_corrupt());

        let mut record = SaveRecord::seal(&sample_state()).unwrap();
        record.version = 99;
        let err = record.open().unwrap_err();
        assert!(matches!(err, StorageError::Version { found: 99, .. }));
        assert!(err.is_corrupt());

        let storage = MemoryStorage::new();
        storage.put_raw(SAVE_SLOT, "null");
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());
    }

    #[test]
    fn legacy_bare_record_loads_with_defaults() {
        let legacy = r#"{"day":3,"designSkill":2.5,"devSkill":1.0,"qaSkill":1.0,"stress":2,"money":80,"pcLevel":1}"#;
        let state = decode_record(legacy).unwrap();
        assert_eq!(state.day, 3);
        assert_eq!(state.skipped_job_days, 0);
        assert_eq!(state.upkeep_paid_day, 0);
    }

    #[test]
    fn out_of_range_fields_are_clamped_on_load() {
        let mut wild = sample_state();
        wild.design_skill = 140.0;
        wild.stress = -2.0;
        wild.pc_level = 0;
        let loaded = decode_record(&encode_record(&wild).unwrap()).unwrap();
        assert!((loaded.design_skill - 100.0).abs() < f64::EPSILON);
        assert!(loaded.stress.abs() < f64::EPSILON);
        assert_eq!(loaded.pc_level, 1);
    }

    #[test]
    fn file_storage_writes_atomically_and_recovers() {
        let dir = scratch_dir("file");
        let storage = FileStorage::new(&dir);
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());
        storage.save_state(SAVE_SLOT, &sample_state()).unwrap();
        let path = storage.slot_path(SAVE_SLOT);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(storage.load_state(SAVE_SLOT).unwrap(), Some(sample_state()));

        fs::write(&path, "{\"version\":1,\"checksum\":0,\"state\":{}}").unwrap();
        assert!(storage.load_state(SAVE_SLOT).unwrap().is_none());

        storage.delete_state(SAVE_SLOT).unwrap();
        storage.delete_state(SAVE_SLOT).unwrap();
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn slot_names_are_sanitised_for_paths() {
        let storage = FileStorage::new("/tmp/freeloop");
        assert_eq!(
            storage.slot_path("../evil slot"),
            PathBuf::from("/tmp/freeloop/___evil_slot.json")
        );
    }
}
