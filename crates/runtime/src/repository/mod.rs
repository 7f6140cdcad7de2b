//! Repository layer for session persistence.
//!
//! Saves hold the data that changes while playing: the board (including the
//! combat stream) and the action log. Content (items, skills, tables) is
//! loaded from data files and never saved.

mod error;
mod file;
mod memory;
mod save;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRepository;
pub use memory::InMemoryRepository;
pub use save::SaveFile;
pub use traits::SaveRepository;
