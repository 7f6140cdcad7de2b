//! Save file layout and integrity checks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tactics_core::{ActionLog, CombatState};

use super::error::{RepositoryError, Result};

/// Board, action history and stream position, sealed with a SHA-256 checksum.
///
/// The random stream lives inside `state`, so a loaded save resumes with the
/// exact draws the original session would have made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub state: CombatState,
    pub log: ActionLog,
    /// Hex-encoded SHA-256 of the JSON encoding of `state` and `log`.
    pub checksum: String,
}

#[derive(Serialize)]
struct Sealed<'a> {
    state: &'a CombatState,
    log: &'a ActionLog,
}

impl SaveFile {
    pub const VERSION: u32 = 1;

    pub fn new(state: CombatState, log: ActionLog) -> Result<Self> {
        let checksum = checksum(&state, &log)?;
        Ok(Self {
            version: Self::VERSION,
            state,
            log,
            checksum,
        })
    }

    /// Rejects saves from another version, with a stale checksum, or whose
    /// action log is internally inconsistent.
    pub fn verify(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(RepositoryError::Version {
                expected: Self::VERSION,
                found: self.version,
            });
        }
        let computed = checksum(&self.state, &self.log)?;
        if computed != self.checksum {
            return Err(RepositoryError::ChecksumMismatch {
                recorded: self.checksum.clone(),
                computed,
            });
        }
        self.log.validate()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RepositoryError::Json(e.to_string()))
    }

    /// Parses and verifies a save.
    pub fn from_json(json: &str) -> Result<Self> {
        let save: SaveFile =
            serde_json::from_str(json).map_err(|e| RepositoryError::Json(e.to_string()))?;
        save.verify()?;
        Ok(save)
    }

    pub fn into_parts(self) -> (CombatState, ActionLog) {
        (self.state, self.log)
    }
}

fn checksum(state: &CombatState, log: &ActionLog) -> Result<String> {
    let bytes = serde_json::to_vec(&Sealed { state, log })
        .map_err(|e| RepositoryError::Json(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
