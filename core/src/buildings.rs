//! Building registry — placement, upgrade, and removal of huts and mills.
//!
//! Buildings are kept in placement order; `remove_most_recent` is LIFO.
//! Ids are UUID v4 strings and are never reused, even after removal.
//! Placement does not check for overlap with existing buildings.

use crate::{
    config::BuildingCostConfig,
    error::{SimError, SimResult},
    ledger::ResourceLedger,
    types::{BuildingId, GridPos, GroundPoint},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    #[default]
    Hut,
    Mill,
}

impl BuildingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hut  => "hut",
            Self::Mill => "mill",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub id:            BuildingId,
    pub building_type: BuildingType,
    pub level:         i32,
    pub position:      GridPos,
}

/// Presentation hint for an upgraded building: vertical scale and an
/// HSL tint. Carries no simulation meaning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VisualHint {
    pub scale_y:    f64,
    pub hue:        f64,
    pub saturation: f64,
    pub lightness:  f64,
}

impl VisualHint {
    pub fn for_level(level: i32) -> Self {
        let level = f64::from(level);
        Self {
            scale_y:    1.0 + level * 0.25,
            hue:        0.07 - level * 0.02,
            saturation: 0.6,
            lightness:  0.3,
        }
    }
}

/// Cost to upgrade from `level` to `level + 1`.
pub fn upgrade_cost(costs: &BuildingCostConfig, building_type: BuildingType, level: i32) -> f64 {
    (costs.upgrade_base(building_type) * costs.upgrade_growth.powi(level)).floor()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingRegistry {
    buildings: Vec<Building>,
}

impl BuildingRegistry {
    pub fn new() -> Self {
        Self { buildings: Vec::new() }
    }

    /// Rebuild from restored buildings, keeping their order and ids.
    pub(crate) fn from_buildings(buildings: Vec<Building>) -> Self {
        Self { buildings }
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn count_of(&self, building_type: BuildingType) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.building_type == building_type)
            .count()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Pay for and place a level-1 building at the snapped cell.
    /// On rejection nothing changes.
    pub fn place(
        &mut self,
        ledger: &mut ResourceLedger,
        costs: &BuildingCostConfig,
        building_type: BuildingType,
        point: GroundPoint,
    ) -> SimResult<Building> {
        ledger.debit(costs.place_cost(building_type))?;

        let building = Building {
            id: uuid::Uuid::new_v4().to_string(),
            building_type,
            level: 1,
            position: GridPos::snap(point),
        };
        self.buildings.push(building.clone());
        Ok(building)
    }

    /// Pay for and apply one level. Returns the new level.
    pub fn upgrade(
        &mut self,
        ledger: &mut ResourceLedger,
        costs: &BuildingCostConfig,
        id: &str,
    ) -> SimResult<i32> {
        let building = self
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| SimError::NotFound { id: id.to_string() })?;

        let next_level = building
            .level
            .checked_add(1)
            .ok_or_else(|| SimError::MaxLevel { id: id.to_string() })?;
        let cost = upgrade_cost(costs, building.building_type, building.level);
        ledger.debit(cost)?;
        building.level = next_level;
        Ok(next_level)
    }

    pub fn remove_most_recent(&mut self) -> Option<Building> {
        self.buildings.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, z: f64) -> GroundPoint {
        GroundPoint { x, z }
    }

    #[test]
    fn upgrade_cost_uses_pre_upgrade_level_as_exponent() {
        let costs = BuildingCostConfig::default();
        assert_eq!(upgrade_cost(&costs, BuildingType::Hut, 1), 13.0);
        assert_eq!(upgrade_cost(&costs, BuildingType::Hut, 2), 23.0);
        assert_eq!(upgrade_cost(&costs, BuildingType::Hut, 3), 39.0);
        assert_eq!(upgrade_cost(&costs, BuildingType::Mill, 1), 42.0);
        assert_eq!(upgrade_cost(&costs, BuildingType::Mill, 2), 72.0);
    }

    #[test]
    fn place_snaps_to_grid_and_debits() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(50.0);
        let mut registry = BuildingRegistry::new();

        let hut = registry
            .place(&mut ledger, &costs, BuildingType::Hut, at(2.5, -2.5))
            .unwrap();
        assert_eq!(hut.position, GridPos::new(3, -2));
        assert_eq!(hut.level, 1);
        assert_eq!(ledger.current(), 40.0);

        let mill = registry
            .place(&mut ledger, &costs, BuildingType::Mill, at(0.4, 7.6))
            .unwrap();
        assert_eq!(mill.position, GridPos::new(0, 8));
        assert_eq!(ledger.current(), 10.0);
    }

    #[test]
    fn place_without_timber_changes_nothing() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(29.0);
        let mut registry = BuildingRegistry::new();

        let err = registry
            .place(&mut ledger, &costs, BuildingType::Mill, at(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, SimError::InsufficientResources { .. }));
        assert_eq!(ledger.current(), 29.0);
        assert!(registry.is_empty());
    }

    #[test]
    fn overlapping_placement_is_allowed() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(50.0);
        let mut registry = BuildingRegistry::new();

        let a = registry.place(&mut ledger, &costs, BuildingType::Hut, at(1.0, 1.0)).unwrap();
        let b = registry.place(&mut ledger, &costs, BuildingType::Hut, at(1.2, 0.9)).unwrap();
        assert_eq!(a.position, b.position);
        assert_ne!(a.id, b.id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn upgrade_unknown_id_is_not_found() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(50.0);
        let mut registry = BuildingRegistry::new();
        let err = registry.upgrade(&mut ledger, &costs, "missing").unwrap_err();
        assert!(matches!(err, SimError::NotFound { .. }));
        assert_eq!(ledger.current(), 50.0);
    }

    #[test]
    fn upgrade_at_highest_level_is_rejected_without_debit() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(50.0);
        let mut registry = BuildingRegistry::from_buildings(vec![Building {
            id:            "top".to_string(),
            building_type: BuildingType::Hut,
            level:         i32::MAX,
            position:      GridPos::new(0, 0),
        }]);

        let err = registry.upgrade(&mut ledger, &costs, "top").unwrap_err();
        assert!(matches!(err, SimError::MaxLevel { .. }));
        assert!(err.is_recoverable());
        assert_eq!(ledger.current(), 50.0);
        assert_eq!(registry.find_by_id("top").unwrap().level, i32::MAX);
    }

    #[test]
    fn upgrade_increments_level_and_rejects_when_short() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(36.0);
        let mut registry = BuildingRegistry::new();
        let hut = registry.place(&mut ledger, &costs, BuildingType::Hut, at(0.0, 0.0)).unwrap();

        // 26 left: level 1 -> 2 costs 13.
        assert_eq!(registry.upgrade(&mut ledger, &costs, &hut.id).unwrap(), 2);
        assert_eq!(ledger.current(), 13.0);

        // level 2 -> 3 costs 23.
        assert!(registry.upgrade(&mut ledger, &costs, &hut.id).is_err());
        assert_eq!(registry.find_by_id(&hut.id).unwrap().level, 2);
        assert_eq!(ledger.current(), 13.0);
    }

    #[test]
    fn remove_most_recent_is_lifo() {
        let costs = BuildingCostConfig::default();
        let mut ledger = ResourceLedger::new(100.0);
        let mut registry = BuildingRegistry::new();
        let first = registry.place(&mut ledger, &costs, BuildingType::Hut, at(0.0, 0.0)).unwrap();
        let second = registry.place(&mut ledger, &costs, BuildingType::Mill, at(1.0, 0.0)).unwrap();

        assert_eq!(registry.remove_most_recent().unwrap().id, second.id);
        assert_eq!(registry.remove_most_recent().unwrap().id, first.id);
        assert!(registry.remove_most_recent().is_none());
    }

    #[test]
    fn visual_hint_scales_with_level() {
        let hint = VisualHint::for_level(2);
        assert!((hint.scale_y - 1.5).abs() < 1e-12);
        assert!((hint.hue - 0.03).abs() < 1e-12);
    }
}
