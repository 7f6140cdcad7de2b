use crate::formula::{EquationSlot, FormulaStat};

/// Every capability a component may define.
///
/// Each hook declares exactly one aggregation policy through [`Hook::policy`].
/// Mixing policies up changes numbers silently, so the table below is the
/// single source of truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Hook {
    // ----- exclusive -----
    WeaponType,
    BaseDamage,
    BaseHit,
    BaseCrit,
    BaseHeal,
    /// Equation name override for a formula slot.
    Equation(EquationSlot),
    /// Equation the target uses to resist this item (e.g. resistance vs magic).
    ResistEquation,
    Range,
    /// Splash radius around the target position.
    Blast,
    Usable,
    InflictStatus,

    // ----- summed -----
    Modify(FormulaStat),
    Dynamic(FormulaStat),
    DynamicMultiattacks,
    ModifyExp,

    // ----- multiplied -----
    TriangleModifier,

    // ----- any component -----
    IsBroken,
    NoDouble,
    Vantage,
    CannotCounter,
    Uncounterable,

    // ----- every component -----
    TargetRestrict,
}

/// How the values of several components defining the same hook combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// The first component (item layer before skill layer) wins.
    FirstMatch,
    Sum,
    Product,
    AllTrue,
    AnyTrue,
}

impl Hook {
    pub const fn policy(self) -> Aggregation {
        use Hook::*;
        match self {
            WeaponType | BaseDamage | BaseHit | BaseCrit | BaseHeal | Equation(_)
            | ResistEquation | Range | Blast | Usable | InflictStatus => Aggregation::FirstMatch,
            Modify(_) | Dynamic(_) | DynamicMultiattacks | ModifyExp => Aggregation::Sum,
            TriangleModifier => Aggregation::Product,
            IsBroken | NoDouble | Vantage | CannotCounter | Uncounterable => Aggregation::AnyTrue,
            TargetRestrict => Aggregation::AllTrue,
        }
    }
}

/// Value a component returns for a hook.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HookValue {
    Int(i32),
    Bool(bool),
    Text(String),
    Range { min: u32, max: u32 },
}

impl HookValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            HookValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HookValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HookValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(u32, u32)> {
        match self {
            HookValue::Range { min, max } => Some((*min, *max)),
            _ => None,
        }
    }
}

impl Aggregation {
    /// Folds component values under this policy.
    ///
    /// Returns `None` when no component defined the hook so callers can apply
    /// the hook's documented default. Values of the wrong shape are skipped.
    pub fn fold<I>(self, values: I) -> Option<HookValue>
    where
        I: IntoIterator<Item = HookValue>,
    {
        let mut values = values.into_iter().peekable();
        values.peek()?;

        let folded = match self {
            Aggregation::FirstMatch => return values.next(),
            Aggregation::Sum => HookValue::Int(
                values
                    .filter_map(|v| v.as_int())
                    .fold(0i32, i32::saturating_add),
            ),
            Aggregation::Product => HookValue::Int(
                values
                    .filter_map(|v| v.as_int())
                    .fold(1i32, i32::saturating_mul),
            ),
            Aggregation::AllTrue => {
                HookValue::Bool(values.filter_map(|v| v.as_bool()).all(|b| b))
            }
            Aggregation::AnyTrue => {
                HookValue::Bool(values.filter_map(|v| v.as_bool()).any(|b| b))
            }
        };
        Some(folded)
    }
}
