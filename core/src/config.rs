//! Game tuning loaded from `data/game_config.json`.
//!
//! Every field has a default, so a partial file only overrides what it
//! names. The defaults are the prototype's literal numbers.

use crate::{buildings::BuildingType, tide::TideLabel, types::Millis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildingCostConfig {
    pub hut_place_cost: f64,
    pub mill_place_cost: f64,
    /// Upgrade base costs; the real cost is `floor(base * growth^level)`.
    pub hut_upgrade_base: f64,
    pub mill_upgrade_base: f64,
    pub upgrade_growth: f64,
}

impl Default for BuildingCostConfig {
    fn default() -> Self {
        Self {
            hut_place_cost:    10.0,
            mill_place_cost:   30.0,
            hut_upgrade_base:  8.0,
            mill_upgrade_base: 25.0,
            upgrade_growth:    1.7,
        }
    }
}

impl BuildingCostConfig {
    pub fn place_cost(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Hut  => self.hut_place_cost,
            BuildingType::Mill => self.mill_place_cost,
        }
    }

    pub fn upgrade_base(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Hut  => self.hut_upgrade_base,
            BuildingType::Mill => self.mill_upgrade_base,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateConfig {
    pub hut_base_rate: f64,
    /// Added to the shared hut rate once per hut level above 1.
    pub hut_level_bonus: f64,
    pub mill_rate: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            hut_base_rate:   0.2,
            hut_level_bonus: 0.05,
            mill_rate:       0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TideConfig {
    pub period_ms: Millis,
    pub low_multiplier: f64,
    pub mid_multiplier: f64,
    pub high_multiplier: f64,
}

impl Default for TideConfig {
    fn default() -> Self {
        Self {
            period_ms:       40_000,
            low_multiplier:  1.10,
            mid_multiplier:  1.0,
            high_multiplier: 0.90,
        }
    }
}

impl TideConfig {
    pub fn multiplier(&self, label: TideLabel) -> f64 {
        match label {
            TideLabel::Low  => self.low_multiplier,
            TideLabel::Mid  => self.mid_multiplier,
            TideLabel::High => self.high_multiplier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RaidConfig {
    pub duration_ms: Millis,
    pub poll_ms: Millis,
    pub hit_reward: f64,
    pub min_reward: u64,
    pub score_weight: u64,
    pub building_weight: u64,
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self {
            duration_ms:     20_000,
            poll_ms:         200,
            hit_reward:      2.0,
            min_reward:      5,
            score_weight:    2,
            building_weight: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub starting_timber: f64,
    pub save_slot: String,
    /// Period of both accrual paths.
    pub accrual_period_ms: Millis,
    pub costs: BuildingCostConfig,
    pub rates: RateConfig,
    pub tide: TideConfig,
    pub raid: RaidConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_timber:   50.0,
            save_slot:         "clash_of_isles_save_v1".to_string(),
            accrual_period_ms: 1_000,
            costs:             BuildingCostConfig::default(),
            rates:             RateConfig::default(),
            tide:              TideConfig::default(),
            raid:              RaidConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from the data/ directory.
    /// In tests, use GameConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/game_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content).map_err(|e| anyhow::anyhow!("Invalid {path}: {e}"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: GameConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Zero periods would stall the scheduler.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.accrual_period_ms == 0 || self.tide.period_ms == 0 || self.raid.poll_ms == 0 {
            anyhow::bail!("timer periods must be greater than zero");
        }
        if self.starting_timber < 0.0 {
            anyhow::bail!("starting_timber must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "costs": { "hut_place_cost": 12 } }"#).unwrap();
        assert_eq!(config.costs.hut_place_cost, 12.0);
        assert_eq!(config.costs.mill_place_cost, 30.0);
        assert_eq!(config.tide.period_ms, 40_000);
        assert_eq!(config.save_slot, "clash_of_isles_save_v1");
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(GameConfig::from_json(r#"{ "accrual_period_ms": 0 }"#).is_err());
    }
}
