//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use tactics_core::{CombatConfig, CombatEnv, StaticTables};
use tracing::info;

use crate::catalog::Catalog;
use crate::loaders::{
    CatalogLoader, ConfigLoader, LoadResult, Scenario, ScenarioLoader, TablesLoader,
};

/// Everything a combat needs from content, loaded once.
#[derive(Debug)]
pub struct Content {
    pub config: CombatConfig,
    pub tables: StaticTables,
    pub catalog: Catalog,
}

impl Content {
    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv::new(&self.catalog, &self.tables, &self.config)
    }
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tables.ron
/// ├── items.ron
/// ├── skills.ron
/// └── scenarios/
///     ├── duel.ron
///     └── vantage.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load rule tables from `tables.ron`.
    pub fn load_tables(&self) -> LoadResult<StaticTables> {
        TablesLoader::load(&self.data_dir.join("tables.ron"))
    }

    /// Load and compile `items.ron` and `skills.ron`.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        CatalogLoader::load(
            &self.data_dir.join("items.ron"),
            &self.data_dir.join("skills.ron"),
        )
    }

    /// Load `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    pub fn load_content(&self) -> LoadResult<Content> {
        let content = Content {
            config: self.load_config()?,
            tables: self.load_tables()?,
            catalog: self.load_catalog()?,
        };
        info!(
            data_dir = %self.data_dir.display(),
            items = content.catalog.items().count(),
            skills = content.catalog.skills().count(),
            "content loaded"
        );
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
