//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "01-bootstrap"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Simulation module exports and shared types."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Movement simulation for GPS-tracked cattle: containment geometry, the
//! per-entity motion model and the telemetry record it produces.

pub mod entity;
pub mod frames;
pub mod geo;
pub mod herd;
pub mod random;

pub use entity::{EntityProfile, EntitySimulator};
pub use frames::{BehaviorState, TelemetryRecord};
pub use geo::{
    bearing_deg, degree_distance, haversine_m, GeoPoint, GeofenceBounds, EARTH_RADIUS_M,
    METERS_PER_DEGREE,
};
pub use herd::{herd_bounds, layout, spawn_herd};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
