use crate::{
    buildings::BuildingType,
    types::{BuildingId, ScreenPoint},
};
use serde::{Deserialize, Serialize};

/// All player intents the core accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Session ───────────────────────────────────
    /// First user gesture: enables pointer input and starts ambient audio.
    Unlock,
    /// Leave the title screen; starts fractional accrual.
    OpenGame,

    // ── Building ──────────────────────────────────
    SelectBuildType { building_type: BuildingType },
    RequestPlacement { point: ScreenPoint },
    RequestUpgrade { id: BuildingId },
    RequestRemoveLast,

    // ── Raid ──────────────────────────────────────
    RequestRaidStart,
    RequestRaidHit,

    // ── Persistence ───────────────────────────────
    RequestSave,
    RequestLoad,

    /// Raw pointer press. Hits during a raid, otherwise upgrades the
    /// building under the pointer or builds on the ground.
    PointerDown { point: ScreenPoint },
}
