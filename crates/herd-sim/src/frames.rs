//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "telemetry"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Telemetry record emitted by a simulated tracker each tick."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Behavioural state of a simulated animal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BehaviorState {
    Grazing,
    Resting,
}

impl BehaviorState {
    pub fn is_resting(&self) -> bool {
        matches!(self, BehaviorState::Resting)
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorState::Grazing => f.write_str("grazing"),
            BehaviorState::Resting => f.write_str("resting"),
        }
    }
}

/// One tracker sample in the tracking API's wire schema.
///
/// `tag` and `behavior` are carried for local reporting and never serialised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub activity_level: u32,
    pub temperature: f64,
    pub battery_level: u32,
    pub signal_strength: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub tag: String,
    #[serde(skip, default = "default_behavior")]
    pub behavior: BehaviorState,
}

fn default_behavior() -> BehaviorState {
    BehaviorState::Grazing
}

/// Round to a fixed number of decimals, as the tracking API stores them.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
