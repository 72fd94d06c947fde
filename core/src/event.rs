//! Game events — everything the core tells the outside world.
//!
//! Every notification is recorded here first, then handed to the
//! registered collaborators. Headless callers read the same stream
//! through `IslandEngine::drain_events`.

use crate::{
    buildings::{BuildingType, VisualHint},
    tide::TideLabel,
    types::{BuildingId, GridPos, Millis},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Buildings ──────────────────────────────────
    BuildingPlaced {
        id: BuildingId,
        building_type: BuildingType,
        level: i32,
        position: GridPos,
    },
    BuildingUpgraded {
        id: BuildingId,
        new_level: i32,
        hint: VisualHint,
    },
    BuildingRemoved {
        id: BuildingId,
    },

    // ── Economy ────────────────────────────────────
    ResourceChanged {
        amount: f64,
    },
    RateChanged {
        rate: f64,
    },
    TideChanged {
        label: TideLabel,
    },

    // ── Raid ───────────────────────────────────────
    RaidStarted {
        ends_at: Millis,
    },
    RaidHit {
        score: u64,
    },
    RaidEnded {
        score: u64,
        reward: u64,
    },

    // ── Session ────────────────────────────────────
    AmbientStarted,
    AmbientStopped,
    GameOpened,
    GameSaved {
        slot: String,
        timestamp: i64,
    },
    GameLoaded {
        slot: String,
        building_count: usize,
    },
    /// A message for the player: rejections and other information.
    Notice {
        message: String,
    },
}

impl GameEvent {
    /// Stable name for logs and the runner's output.
    pub fn type_name(&self) -> &'static str {
        match self {
            GameEvent::BuildingPlaced { .. }   => "building_placed",
            GameEvent::BuildingUpgraded { .. } => "building_upgraded",
            GameEvent::BuildingRemoved { .. }  => "building_removed",
            GameEvent::ResourceChanged { .. }  => "resource_changed",
            GameEvent::RateChanged { .. }      => "rate_changed",
            GameEvent::TideChanged { .. }      => "tide_changed",
            GameEvent::RaidStarted { .. }      => "raid_started",
            GameEvent::RaidHit { .. }          => "raid_hit",
            GameEvent::RaidEnded { .. }        => "raid_ended",
            GameEvent::AmbientStarted          => "ambient_started",
            GameEvent::AmbientStopped          => "ambient_stopped",
            GameEvent::GameOpened              => "game_opened",
            GameEvent::GameSaved { .. }        => "game_saved",
            GameEvent::GameLoaded { .. }       => "game_loaded",
            GameEvent::Notice { .. }           => "notice",
        }
    }
}

/// An event with the simulated time it was emitted at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimedEvent {
    pub at: Millis,
    #[serde(flatten)]
    pub event: GameEvent,
}
