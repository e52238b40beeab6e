//=========================================================================
// Gameplay Events
//
// Closed catalog of gameplay event keys shared by producers and triggers.
//
// Each variant keeps the human-readable name used by level scripts and
// config files, so external triggers can still be expressed as strings
// and parsed back into the enum.
//
//=========================================================================

use std::fmt;
use std::str::FromStr;

//=== GameplayEvent =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameplayEvent {
    //--- Enemies ----------------------------------------------------------
    EnemyHit,
    EnemyDestroyed,
    EnemyBeakshot,

    //--- Player -----------------------------------------------------------
    PlayerHit,

    //--- HUD --------------------------------------------------------------
    ScoreUpdate,
    HealthUpdate,

    //--- Spawning ---------------------------------------------------------
    PauseSpawning,
    ResumeSpawning,
}

impl GameplayEvent {
    /// Every catalog entry, in declaration order.
    pub const ALL: [GameplayEvent; 8] = [
        GameplayEvent::EnemyHit,
        GameplayEvent::EnemyDestroyed,
        GameplayEvent::EnemyBeakshot,
        GameplayEvent::PlayerHit,
        GameplayEvent::ScoreUpdate,
        GameplayEvent::HealthUpdate,
        GameplayEvent::PauseSpawning,
        GameplayEvent::ResumeSpawning,
    ];

    /// Stable display name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            GameplayEvent::EnemyHit => "Enemy hit",
            GameplayEvent::EnemyDestroyed => "Enemy destroyed",
            GameplayEvent::EnemyBeakshot => "Enemy beakshot",
            GameplayEvent::PlayerHit => "Player hit",
            GameplayEvent::ScoreUpdate => "Score update",
            GameplayEvent::HealthUpdate => "Health update",
            GameplayEvent::PauseSpawning => "Pause spawning",
            GameplayEvent::ResumeSpawning => "Resume spawning",
        }
    }
}

impl fmt::Display for GameplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=== Parsing =============================================================

/// Returned when a string does not name any [`GameplayEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventError(pub String);

impl fmt::Display for UnknownEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown gameplay event: {:?}", self.0)
    }
}

impl std::error::Error for UnknownEventError {}

impl FromStr for GameplayEvent {
    type Err = UnknownEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        GameplayEvent::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownEventError(s.to_string()))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
