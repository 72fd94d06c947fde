//! Simulation core for Clash of Isles: timber economy, huts and mills,
//! the tide cycle, raids, and save/load.

pub mod buildings;
pub mod clock;
pub mod collaborator;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod raid;
pub mod rates;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod tide;
pub mod types;
