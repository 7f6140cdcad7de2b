/// How hit rolls are drawn from the combat stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RngMode {
    /// One draw in `0..100` per roll.
    #[default]
    Classic,
    /// Truncated mean of two draws, skewing displayed odds toward the extremes.
    TrueHit,
}

/// Combat tunables shared by the formula engine, the phase solver and
/// experience accounting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Floor applied to every computed damage value.
    pub min_damage: i32,
    /// Attack speed advantage required for a second full phase.
    pub speed_to_double: i32,
    /// Damage multiplier applied on critical hits, before the floor.
    pub crit_multiplier: i32,
    /// Manhattan distance within which allied support pairs contribute.
    pub support_range: u32,
    /// Maximum number of allies whose support bonuses apply at once.
    pub support_cap: usize,
    pub rng_mode: RngMode,

    pub exp_per_hit: i32,
    pub exp_per_miss: i32,
    pub exp_kill_bonus: i32,
    /// Experience added (or removed) per level of difference with the target.
    pub exp_level_scale: i32,
    pub max_exp_per_combat: i32,
    pub weapon_exp_per_exchange: u32,
}

impl CombatConfig {
    /// Experience points needed for one level.
    pub const EXP_PER_LEVEL: u32 = 100;
    /// Highest level a unit can reach through combat experience.
    pub const MAX_LEVEL: u32 = 20;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MIN_DAMAGE: i32 = 0;
    pub const DEFAULT_SPEED_TO_DOUBLE: i32 = 4;
    pub const DEFAULT_CRIT_MULTIPLIER: i32 = 3;
    pub const DEFAULT_SUPPORT_RANGE: u32 = 3;
    pub const DEFAULT_SUPPORT_CAP: usize = 2;

    pub fn new() -> Self {
        Self {
            min_damage: Self::DEFAULT_MIN_DAMAGE,
            speed_to_double: Self::DEFAULT_SPEED_TO_DOUBLE,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            support_range: Self::DEFAULT_SUPPORT_RANGE,
            support_cap: Self::DEFAULT_SUPPORT_CAP,
            rng_mode: RngMode::Classic,
            exp_per_hit: 10,
            exp_per_miss: 1,
            exp_kill_bonus: 20,
            exp_level_scale: 3,
            max_exp_per_combat: 100,
            weapon_exp_per_exchange: 1,
        }
    }

    pub fn with_rng_mode(mut self, rng_mode: RngMode) -> Self {
        self.rng_mode = rng_mode;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
