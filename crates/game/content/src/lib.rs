//! Data-driven combat content.
//!
//! This crate is the component provider for `tactics-core`:
//! - a standard component vocabulary for items and skills ([`components`])
//! - a compiled item/skill [`Catalog`] implementing `ComponentOracle`
//! - loaders for catalogs, rule tables and scenarios (RON) and combat
//!   configuration (TOML)
//!
//! Content is consumed through oracles and never appears in combat state
//! beyond the `nid` strings that name it.

pub mod catalog;
pub mod components;
mod error;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{Catalog, ItemDefinition, SkillDefinition};
pub use components::{ComponentSpec, StandardComponent};
pub use error::ContentError;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, ConfigLoader, Content, ContentFactory, Scenario, ScenarioLoader, TablesLoader,
};
