//! Full-session test harness for the Tarn runtime
//!
//! Shared cast for the end-to-end scenarios: a factory producing trees and
//! keepers, a recording component over both queue hooks, and an in-memory
//! map source. Tests assemble these into complete sessions and drive them
//! frame by frame.

pub mod fixtures;

pub use fixtures::{
    keeper_type, tree_type, Captured, InvokeLog, Keeper, RecordingComponent, ScenarioFactory,
    ScenarioMaps, ScenarioWorld, Tree, GREET_REQUEST,
};
