//! Rule tables loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tactics_core::env::{BonusLine, RankBonus, StaticTables, TriangleEntry};
use tactics_core::state::SupportRank;

use crate::loaders::{LoadResult, read_file};

/// Rule tables as authored in RON.
///
/// Rank tiers are checked in file order, so list the highest tier first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesFile {
    /// Equation name to expression text, e.g. `"HIT": "SKL * 2 + LCK / 2"`.
    pub equations: BTreeMap<String, String>,
    pub triangle: Vec<TriangleEntry>,
    pub ranks: Vec<RankBonus>,
    pub supports: BTreeMap<SupportRank, BonusLine<f32>>,
}

impl TablesFile {
    /// Parses every equation and builds the in-memory tables.
    pub fn build(self) -> LoadResult<StaticTables> {
        let mut tables = StaticTables::new();
        for (name, text) in &self.equations {
            tables
                .insert_equation(name.as_str(), text)
                .map_err(|e| anyhow::anyhow!("Failed to parse equation {}: {}", name, e))?;
        }
        let tables = self.triangle.into_iter().fold(tables, StaticTables::with_triangle);
        let tables = self.ranks.into_iter().fold(tables, StaticTables::with_rank);
        let tables = self
            .supports
            .into_iter()
            .fold(tables, |tables, (rank, bonus)| tables.with_support(rank, bonus));
        Ok(tables)
    }
}

/// Loader for combat rule tables from RON files.
pub struct TablesLoader;

impl TablesLoader {
    pub fn load(path: &Path) -> LoadResult<StaticTables> {
        let content = read_file(path)?;
        let file: TablesFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tables RON: {}", e))?;
        file.build()
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::env::TablesOracle;

    use super::*;

    #[test]
    fn builds_every_table() {
        let file: TablesFile = ron::from_str(
            r#"(
                equations: { "HIT": "SKL * 2", "AVOID": "ATTACK_SPEED * 2", "ATTACK_SPEED": "SPD" },
                triangle: [
                    (attacker: "sword", defender: "axe", kind: Advantage, bonus: (accuracy: 15, damage: 1)),
                ],
                ranks: [(weapon_type: Some("sword"), requirement: 100, bonus: (accuracy: 10))],
                supports: { C: (accuracy: 2.5, avoid: 2.5) },
            )"#,
        )
        .unwrap();
        let tables = file.build().unwrap();

        assert!(tables.equation("AVOID").is_some());
        assert_eq!(tables.triangle("sword", "axe").len(), 1);
        assert!(tables.triangle("axe", "sword").is_empty());
        assert_eq!(tables.rank_bonus("sword", 120).map(|b| b.accuracy), Some(10));
        assert_eq!(tables.support_bonus(SupportRank::C).map(|b| b.avoid), Some(2.5));
    }

    #[test]
    fn malformed_equation_names_the_culprit() {
        let file = TablesFile {
            equations: [("DAMAGE".to_string(), "STR +".to_string())].into(),
            ..TablesFile::default()
        };
        let err = file.build().unwrap_err();
        assert!(err.to_string().contains("DAMAGE"));
    }
}
