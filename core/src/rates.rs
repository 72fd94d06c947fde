//! Accrual rate — a pure function of the buildings and the tide.
//!
//! The hut bonus is one shared scalar summed over every hut's levels and
//! then multiplied by the hut count, so rate grows faster than linearly
//! with huts. Kept exactly as the prototype computes it.

use crate::{
    buildings::{BuildingRegistry, BuildingType},
    config::{RateConfig, TideConfig},
    tide::TideLabel,
};

pub fn accrual_rate(
    registry: &BuildingRegistry,
    tide: TideLabel,
    rates: &RateConfig,
    tide_config: &TideConfig,
) -> f64 {
    let huts = registry.count_of(BuildingType::Hut) as f64;
    let mills = registry.count_of(BuildingType::Mill) as f64;

    let hut_rate = registry
        .iter()
        .filter(|b| b.building_type == BuildingType::Hut)
        .fold(rates.hut_base_rate, |acc, b| {
            acc + (f64::from(b.level) - 1.0) * rates.hut_level_bonus
        });

    let rate = huts * hut_rate + mills * rates.mill_rate;
    rate * tide_config.multiplier(tide)
}

/// Two-decimal form for display. The stored rate stays unrounded.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}
