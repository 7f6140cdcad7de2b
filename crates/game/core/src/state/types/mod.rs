pub mod common;
pub mod item;
pub mod support;
pub mod unit;

pub use common::{ItemId, Position, Team, UnitId};
pub use item::ItemState;
pub use support::{SupportPair, SupportRank};
pub use unit::{Stat, UnitState, UnitStats};
