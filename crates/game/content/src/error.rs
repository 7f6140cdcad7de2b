use tactics_core::error::{ErrorSeverity, GameError};
use tactics_core::expr::ExprError;
use tactics_core::state::{ItemId, UnitId};

/// Problems found while compiling definitions or checking a board against
/// the catalog.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("{owner}: invalid condition '{text}': {source}")]
    Condition {
        owner: String,
        text: String,
        #[source]
        source: ExprError,
    },

    #[error("item '{0}' is defined twice")]
    DuplicateItem(String),

    #[error("skill '{0}' is defined twice")]
    DuplicateSkill(String),

    #[error("{item} refers to unknown item definition '{nid}'")]
    UnknownItem { item: ItemId, nid: String },

    #[error("{unit} carries unknown skill '{skill}'")]
    UnknownSkill { unit: UnitId, skill: String },

    #[error("{0} is declared twice")]
    DuplicateId(String),
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            ContentError::Condition { .. } => "CONTENT_BAD_CONDITION",
            ContentError::DuplicateItem(_) => "CONTENT_DUPLICATE_ITEM",
            ContentError::DuplicateSkill(_) => "CONTENT_DUPLICATE_SKILL",
            ContentError::UnknownItem { .. } => "CONTENT_UNKNOWN_ITEM",
            ContentError::UnknownSkill { .. } => "CONTENT_UNKNOWN_SKILL",
            ContentError::DuplicateId(_) => "CONTENT_DUPLICATE_ID",
        }
    }
}
