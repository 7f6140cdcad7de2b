//! In-memory SaveRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::save::SaveFile;
use super::traits::{SaveRepository, check_slot};

#[derive(Default)]
pub struct InMemoryRepository {
    saves: RwLock<BTreeMap<String, SaveFile>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveRepository for InMemoryRepository {
    fn save(&self, slot: &str, save: &SaveFile) -> Result<()> {
        check_slot(slot)?;
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.insert(slot.to_string(), save.clone());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveFile>> {
        check_slot(slot)?;
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(save) = saves.get(slot) else {
            return Ok(None);
        };
        save.verify()?;
        Ok(Some(save.clone()))
    }

    fn exists(&self, slot: &str) -> bool {
        self.saves
            .read()
            .map(|saves| saves.contains_key(slot))
            .unwrap_or(false)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.remove(slot);
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(saves.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::{ActionLog, CombatState};

    use super::*;

    #[test]
    fn slots_round_trip_and_list_in_order() {
        let repo = InMemoryRepository::new();
        let save = SaveFile::new(CombatState::with_seed(1), ActionLog::new()).unwrap();
        repo.save("b", &save).unwrap();
        repo.save("a", &save).unwrap();
        assert_eq!(repo.list_slots().unwrap(), vec!["a", "b"]);
        assert_eq!(repo.load("a").unwrap(), Some(save));

        repo.delete("a").unwrap();
        assert!(!repo.exists("a"));
        assert_eq!(repo.load("a").unwrap(), None);
    }

    #[test]
    fn slot_names_are_checked() {
        let repo = InMemoryRepository::new();
        let save = SaveFile::new(CombatState::with_seed(1), ActionLog::new()).unwrap();
        assert!(matches!(
            repo.save("../escape", &save),
            Err(RepositoryError::InvalidSlot(_))
        ));
        assert!(matches!(repo.load(""), Err(RepositoryError::InvalidSlot(_))));
    }
}
