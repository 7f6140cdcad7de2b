//! Read-only combat environment.
//!
//! Oracles expose rule tables and the item/skill component registry. The
//! [`CombatEnv`] aggregate bundles them with the combat configuration so the
//! formula engine and the phase solver can access everything they need without
//! hard coupling to concrete implementations.
mod error;
mod rng;
mod tables;

pub use error::OracleError;
pub use rng::{PcgStream, RandomStream, RngSnapshot};
pub use tables::{
    BonusLine, RankBonus, StaticTables, TablesOracle, TriangleEntry, TriangleKind,
};

use crate::aggregate::ComponentOracle;
use crate::config::CombatConfig;

/// Aggregates read-only oracles required by the formula engine and solver.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub components: &'a dyn ComponentOracle,
    pub tables: &'a dyn TablesOracle,
    pub config: &'a CombatConfig,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        components: &'a dyn ComponentOracle,
        tables: &'a dyn TablesOracle,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            components,
            tables,
            config,
        }
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
