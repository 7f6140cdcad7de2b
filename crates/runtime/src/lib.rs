//! Combat driver for `tactics-core`.
//!
//! - [`session`] paces combats step by step (or skips them), finishes them
//!   and travels back and forth over the action log between combats
//! - [`repository`] persists sessions as checksummed JSON save files
//!
//! The `combat-sim` binary runs scenario files end to end.
pub mod error;
pub mod repository;
pub mod session;

pub use error::{Result, SessionError};
pub use repository::{
    FileRepository, InMemoryRepository, RepositoryError, SaveFile, SaveRepository,
};
pub use session::{CombatReport, CombatSession};
