//! Scripted-outcome directives for authored combats.
//!
//! The token vocabulary is fixed: `--`, `hit1`, `hit2`, `crit1`, `crit2`,
//! `miss1`, `miss2`, `end`. Suffix `1` names the attacker, `2` the defender.
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use super::Side;
use crate::error::{ErrorSeverity, GameError};

/// Resolved outcome of one exchange, rolled or forced by a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Crit,
    Miss,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScriptDirective {
    /// `--`: resolve with the random stream.
    #[default]
    Default,
    Hit(Side),
    Crit(Side),
    Miss(Side),
    End,
}

impl ScriptDirective {
    /// Side the directive hands the next exchange to.
    pub const fn side(self) -> Option<Side> {
        match self {
            ScriptDirective::Hit(side)
            | ScriptDirective::Crit(side)
            | ScriptDirective::Miss(side) => Some(side),
            ScriptDirective::Default | ScriptDirective::End => None,
        }
    }

    /// Forced outcome for an exchange by `side`, if this directive targets it.
    pub fn forced_for(self, side: Side) -> Option<Outcome> {
        match self {
            ScriptDirective::Hit(s) if s == side => Some(Outcome::Hit),
            ScriptDirective::Crit(s) if s == side => Some(Outcome::Crit),
            ScriptDirective::Miss(s) if s == side => Some(Outcome::Miss),
            _ => None,
        }
    }
}

impl FromStr for ScriptDirective {
    type Err = ScriptError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let directive = match token.trim() {
            "--" => ScriptDirective::Default,
            "hit1" => ScriptDirective::Hit(Side::Attacker),
            "hit2" => ScriptDirective::Hit(Side::Defender),
            "crit1" => ScriptDirective::Crit(Side::Attacker),
            "crit2" => ScriptDirective::Crit(Side::Defender),
            "miss1" => ScriptDirective::Miss(Side::Attacker),
            "miss2" => ScriptDirective::Miss(Side::Defender),
            "end" => ScriptDirective::End,
            other => return Err(ScriptError::UnknownToken(other.to_string())),
        };
        Ok(directive)
    }
}

impl fmt::Display for ScriptDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |side: &Side| match side {
            Side::Attacker => '1',
            Side::Defender => '2',
        };
        match self {
            ScriptDirective::Default => f.write_str("--"),
            ScriptDirective::Hit(side) => write!(f, "hit{}", suffix(side)),
            ScriptDirective::Crit(side) => write!(f, "crit{}", suffix(side)),
            ScriptDirective::Miss(side) => write!(f, "miss{}", suffix(side)),
            ScriptDirective::End => f.write_str("end"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown script token '{0}'")]
    UnknownToken(String),
}

impl GameError for ScriptError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "SCRIPT_UNKNOWN_TOKEN"
    }
}

/// FIFO of directives. Popping an empty queue yields `--`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptQueue {
    directives: VecDeque<ScriptDirective>,
}

impl ScriptQueue {
    /// Parses every token up front so a typo fails at combat start.
    pub fn parse<I, S>(tokens: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let directives = tokens
            .into_iter()
            .map(|token| token.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(Self { directives })
    }

    pub fn next_directive(&mut self) -> ScriptDirective {
        self.directives.pop_front().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }
}
