use super::common::{ItemId, UnitId};

/// Runtime item instance.
///
/// `nid` names the catalog definition that supplies the item's components;
/// everything mutable about the instance lives here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemState {
    pub id: ItemId,
    pub nid: String,
    pub owner: Option<UnitId>,
    /// Remaining uses; `None` means unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uses: Option<u32>,
    /// Component items of a sequence item, resolved in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub subitems: Vec<ItemId>,
}

impl ItemState {
    pub fn new(id: ItemId, nid: impl Into<String>) -> Self {
        Self {
            id,
            nid: nid.into(),
            owner: None,
            uses: None,
            subitems: Vec::new(),
        }
    }

    pub fn owned_by(mut self, owner: UnitId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses = Some(uses);
        self
    }

    pub fn with_subitems(mut self, subitems: Vec<ItemId>) -> Self {
        self.subitems = subitems;
        self
    }

    /// True once a limited item has no uses left.
    pub fn is_depleted(&self) -> bool {
        self.uses == Some(0)
    }

    pub fn is_sequence(&self) -> bool {
        !self.subitems.is_empty()
    }
}
