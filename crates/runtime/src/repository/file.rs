//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{RepositoryError, Result};
use super::save::SaveFile;
use super::traits::{SaveRepository, check_slot};

/// Stores each slot as `{slot}.json` under a base directory.
///
/// Writes go to `{slot}.json.tmp` first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
pub struct FileRepository {
    base_dir: PathBuf,
}

impl FileRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", slot))
    }
}

impl SaveRepository for FileRepository {
    fn save(&self, slot: &str, save: &SaveFile) -> Result<()> {
        check_slot(slot)?;
        let path = self.slot_path(slot);
        let temp_path = path.with_extension("json.tmp");

        let json = save.to_json()?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::info!(
            slot,
            actions = save.log.len(),
            checksum = %save.checksum,
            "saved session to {}",
            path.display()
        );
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveFile>> {
        check_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let save = SaveFile::from_json(&json)?;

        tracing::info!(slot, actions = save.log.len(), "loaded session from {}", path.display());
        Ok(Some(save))
    }

    fn exists(&self, slot: &str) -> bool {
        check_slot(slot).is_ok() && self.slot_path(slot).exists()
    }

    fn delete(&self, slot: &str) -> Result<()> {
        check_slot(slot)?;
        let path = self.slot_path(slot);
        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!(slot, "deleted save");
        }
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)? {
            let path = entry.map_err(RepositoryError::Io)?.path();
            let stem = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(".json"));
            if let Some(slot) = stem.filter(|slot| check_slot(slot).is_ok()) {
                slots.push(slot.to_string());
            }
        }
        slots.sort_unstable();
        Ok(slots)
    }
}
