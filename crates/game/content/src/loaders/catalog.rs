//! Item and skill catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemDefinition, SkillDefinition};
use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
}

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillDefinition>,
}

/// Loader for item and skill catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load_items(path: &Path) -> LoadResult<Vec<ItemDefinition>> {
        let content = read_file(path)?;
        let catalog: ItemCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;
        Ok(catalog.items)
    }

    pub fn load_skills(path: &Path) -> LoadResult<Vec<SkillDefinition>> {
        let content = read_file(path)?;
        let catalog: SkillCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;
        Ok(catalog.skills)
    }

    /// Loads both files and compiles every component.
    pub fn load(items: &Path, skills: &Path) -> LoadResult<Catalog> {
        let catalog = Catalog::from_definitions(Self::load_items(items)?, Self::load_skills(skills)?)?;
        Ok(catalog)
    }
}
