//! Repository contract for saving and loading sessions.

use super::error::{RepositoryError, Result};
use super::save::SaveFile;

/// Named save slots.
///
/// Implementations verify saves on load; a save that fails its checksum is an
/// error, never a silently reset session.
pub trait SaveRepository: Send + Sync {
    fn save(&self, slot: &str, save: &SaveFile) -> Result<()>;

    /// Returns `None` when the slot is empty.
    fn load(&self, slot: &str) -> Result<Option<SaveFile>>;

    fn exists(&self, slot: &str) -> bool;

    fn delete(&self, slot: &str) -> Result<()>;

    /// Slot names in ascending order.
    fn list_slots(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Slot names are plain file stems: ASCII letters, digits, `-` and `_`.
pub(crate) fn check_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidSlot(slot.to_string()))
    }
}
