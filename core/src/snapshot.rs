//! Save blob — full game state to/from JSON.
//!
//! Wire field names follow the browser prototype's saves so old slots
//! still load: `resources`, `buildings[{id, pos, type, level}]`,
//! `tideIndex`, `timestamp`. There is no version field. Missing or null
//! top-level fields fall back to defaults (50 timber, no buildings, tide
//! index 0). Anything structurally wrong is `CorruptSave`.

use crate::{
    buildings::{Building, BuildingRegistry, BuildingType},
    error::{SimError, SimResult},
    ledger::ResourceLedger,
    tide::TideCycle,
    types::{round_half_up, BuildingId, GridPos},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Height buildings sit at in the scene. Written into `pos[1]`, ignored
/// on decode.
pub const SAVED_BUILDING_Y: f64 = 4.0;

pub const DEFAULT_TIMBER: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceState {
    #[serde(default = "default_timber", deserialize_with = "null_as_timber")]
    pub timber: f64,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self { timber: DEFAULT_TIMBER }
    }
}

fn default_timber() -> f64 {
    DEFAULT_TIMBER
}

fn null_as_timber<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(DEFAULT_TIMBER))
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedBuilding {
    pub id:    BuildingId,
    /// `[x, y, z]`; y is presentation only.
    pub pos:   [f64; 3],
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveBlob {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources:  ResourceState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buildings:  Vec<SavedBuilding>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tide_index: i64,
    /// Wall-clock epoch milliseconds at save time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp:  i64,
}

impl SaveBlob {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse failures are reported as `CorruptSave`.
    pub fn from_json(raw: &str) -> SimResult<Self> {
        serde_json::from_str(raw).map_err(|e| SimError::corrupt(e.to_string()))
    }
}

/// Everything a decoded blob restores.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    pub ledger:    ResourceLedger,
    pub buildings: BuildingRegistry,
    pub tide:      TideCycle,
}

pub fn encode(
    ledger: &ResourceLedger,
    registry: &BuildingRegistry,
    tide: &TideCycle,
    timestamp: i64,
) -> SaveBlob {
    SaveBlob {
        resources: ResourceState { timber: ledger.current() },
        buildings: registry
            .iter()
            .map(|b| SavedBuilding {
                id:            b.id.clone(),
                pos:           [f64::from(b.position.x), SAVED_BUILDING_Y, f64::from(b.position.z)],
                building_type: b.building_type,
                level:         b.level,
            })
            .collect(),
        tide_index: tide.index() as i64,
        timestamp,
    }
}

/// Build fresh state from a blob. Levels are taken as saved, even if
/// below 1. Returns `CorruptSave` for negative timber, bad positions,
/// duplicate ids, or an out-of-range tide index.
pub fn decode(blob: &SaveBlob) -> SimResult<RestoredState> {
    let timber = blob.resources.timber;
    if !timber.is_finite() || timber < 0.0 {
        return Err(SimError::corrupt(format!("invalid timber amount {timber}")));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut buildings = Vec::with_capacity(blob.buildings.len());
    for saved in &blob.buildings {
        if !seen.insert(saved.id.as_str()) {
            return Err(SimError::corrupt(format!("duplicate building id {}", saved.id)));
        }
        let [x, _, z] = saved.pos;
        if !x.is_finite() || !z.is_finite() {
            return Err(SimError::corrupt(format!("building {} has a non-finite position", saved.id)));
        }
        buildings.push(Building {
            id:            saved.id.clone(),
            building_type: saved.building_type,
            level:         saved.level,
            position:      GridPos::new(round_half_up(x), round_half_up(z)),
        });
    }

    Ok(RestoredState {
        ledger:    ResourceLedger::new(timber),
        buildings: BuildingRegistry::from_buildings(buildings),
        tide:      TideCycle::from_index(blob.tide_index)?,
    })
}
