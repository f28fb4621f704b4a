//! Error types.
//!
//! Engine operations never panic on bad input; they return one of the
//! error enums below. An operation that returns `Err` has not written to
//! any record it was given.

use crate::attr_id::AttrId;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[AttrId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised while resolving attributes.
///
/// These only occur when derived attributes are misconfigured, for example
/// a combat-power weight table that makes an attribute depend on itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    /// A dependency cycle was detected between derived attributes.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<AttrId> },

    /// A transform asked for an attribute that was not resolved first.
    #[error("Missing dependency: {0}")]
    MissingDependency(AttrId),
}

/// Broad classes of operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing inventory, unmet requirements, unknown records, bad input.
    Validation,
    /// The player (or sect) is in a state that forbids the operation.
    StateConflict,
    /// Attribute resolution failed.
    Internal,
}

/// Reasons an engine operation was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    /// The player holds none of the named item.
    #[error("{0} is not in the inventory")]
    NotInInventory(String),

    /// No equipment record with that name.
    #[error("no equipment named {0}")]
    EquipmentNotFound(String),

    /// No item record with that name.
    #[error("no item named {0}")]
    ItemNotFound(String),

    /// The item exists but is not consumable.
    #[error("{0} cannot be used")]
    NotUsable(String),

    /// Below the record's level requirement.
    #[error("requires level {required} (current {current})")]
    LevelTooLow { required: u32, current: u32 },

    /// Below the record's world level requirement.
    #[error("requires world level {required} (current {current})")]
    WorldLevelTooLow { required: u32, current: u32 },

    /// The equipment names a slot the config does not define.
    #[error("unknown equipment slot {0}")]
    UnknownSlot(String),

    /// Still recovering from a hunting injury.
    #[error("injured, recovers in {hours}h {minutes}m")]
    Injured { hours: i64, minutes: i64 },

    /// Busy in secluded cultivation.
    #[error("in secluded cultivation until {until}")]
    Retreating { until: NaiveDateTime },

    /// Finishing a retreat that was never started.
    #[error("not in secluded cultivation")]
    NotRetreating,

    /// Finishing a retreat before its end time.
    #[error("secluded cultivation lasts until {until}")]
    RetreatNotFinished { until: NaiveDateTime },

    /// No hunt preset for the difficulty.
    #[error("no hunting grounds configured for difficulty {0}")]
    UnknownDifficulty(String),

    /// The duration is not one of the configured options.
    #[error("unsupported retreat duration: {0}h")]
    InvalidRetreatDuration(u32),

    /// The daily reward was already claimed on this calendar day.
    #[error("already signed in today")]
    AlreadySignedIn,

    /// No world record with that name.
    #[error("no world named {0}")]
    WorldNotFound(String),

    /// The world's tier is above the player's.
    #[error("world {name} requires world level {required}")]
    WorldLocked { name: String, required: u32 },

    /// Empty or too long after trimming.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A player challenged themselves.
    #[error("cannot challenge yourself")]
    SelfChallenge,

    /// The player is injured or in secluded cultivation.
    #[error("player {0} cannot fight right now")]
    Unavailable(i64),

    /// The player already belongs to a sect.
    #[error("already a member of sect {0}")]
    AlreadyInSect(i64),

    /// The player is not a member of this sect.
    #[error("not a member of sect {0}")]
    NotInSect(i64),

    /// No sect record with that id.
    #[error("sect {0} does not exist")]
    SectNotFound(i64),

    /// The sect has reached its member cap.
    #[error("sect is full ({max} members)")]
    SectFull { max: u32 },

    /// Leaders stay in their sect.
    #[error("the sect leader cannot leave the sect")]
    LeaderCannotLeave,

    /// Only equipment in the artifact slot can join the defensive array.
    #[error("{0} is not an artifact")]
    NotAnArtifact(String),

    /// The defensive array is full.
    #[error("the defensive array already holds {max} artifacts")]
    ArtifactLimit { max: usize },

    /// No contribution with that id in this sect.
    #[error("no contribution #{0}")]
    ContributionNotFound(u64),

    /// Only the contributing member may withdraw.
    #[error("contribution #{0} belongs to another member")]
    NotContributor(u64),

    /// Attribute resolution failed.
    #[error(transparent)]
    Stat(#[from] StatError),
}

impl ActionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use ActionError::*;
        match self {
            Injured { .. }
            | Retreating { .. }
            | NotRetreating
            | RetreatNotFinished { .. }
            | AlreadySignedIn
            | Unavailable(_)
            | AlreadyInSect(_)
            | NotInSect(_)
            | SectFull { .. }
            | LeaderCannotLeave
            | ArtifactLimit { .. } => ErrorKind::StateConflict,
            Stat(_) => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }
}

/// Errors raised while loading or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_display() {
        let a = AttrId::from_str("A");
        let b = AttrId::from_str("B");
        let err = StatError::Cycle {
            path: vec![a.clone(), b, a],
        };
        assert_eq!(err.to_string(), "Cycle detected: A -> B -> A");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ActionError::NotInInventory("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ActionError::LevelTooLow {
                required: 10,
                current: 1
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(ActionError::AlreadySignedIn.kind(), ErrorKind::StateConflict);
        assert_eq!(
            ActionError::Injured {
                hours: 1,
                minutes: 5
            }
            .kind(),
            ErrorKind::StateConflict
        );
        let stat: ActionError = StatError::MissingDependency(AttrId::from_str("A")).into();
        assert_eq!(stat.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_injured_message() {
        let err = ActionError::Injured {
            hours: 2,
            minutes: 30,
        };
        assert_eq!(err.to_string(), "injured, recovers in 2h 30m");
    }
}
