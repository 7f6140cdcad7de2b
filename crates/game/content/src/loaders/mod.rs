//! Content loaders for reading combat data from files.
//!
//! RON holds authored data (catalogs, rule tables, scenarios); TOML holds the
//! combat tunables.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod scenario;
pub mod tables;

pub use catalog::CatalogLoader;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use scenario::{ItemSpec, Scenario, ScenarioLoader, UnitSpec};
pub use tables::{TablesFile, TablesLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
