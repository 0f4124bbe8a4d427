//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "motion"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Per-animal random-walk motion model with bounded home range."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Movement is heading based: every tick the heading turns by a sampled
//! offset and the entity steps a sampled number of degrees along it (see
//! [`GeoPoint::offset`]). A candidate position outside the containment circle
//! is discarded; the entity instead covers `return_fraction` of the remaining
//! distance to its center and re-heads toward it, so correction is gradual.
use chrono::Utc;
use herd_common::{MotionConfig, TelemetryConfig, ValueRange};
use tracing::trace;

use crate::frames::{round_to, BehaviorState, TelemetryRecord};
use crate::geo::{bearing_deg, degrees_to_meters, haversine_m, GeoPoint};
use crate::random::{RandomSource, SeededRandom};

const FULL_TURN: ValueRange<f64> = ValueRange::new(0.0, 360.0);

/// Static identity and home range of one simulated animal.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProfile {
    pub device_id: String,
    pub tag: String,
    pub center: GeoPoint,
    pub start: GeoPoint,
    pub containment_radius_deg: f64,
}

/// One simulated GPS-tracked animal. Owns its state and its random source.
#[derive(Debug)]
pub struct EntitySimulator<R = SeededRandom> {
    device_id: String,
    tag: String,
    center: GeoPoint,
    containment_radius_m: f64,
    position: GeoPoint,
    behavior: BehaviorState,
    rest_cycles_remaining: u32,
    heading_deg: f64,
    battery_level: u32,
    motion: MotionConfig,
    telemetry: TelemetryConfig,
    rng: R,
    ticks: u64,
}

impl<R: RandomSource> EntitySimulator<R> {
    pub fn new(
        profile: EntityProfile,
        motion: &MotionConfig,
        telemetry: &TelemetryConfig,
        mut rng: R,
    ) -> Self {
        let heading_deg = rng.uniform(&FULL_TURN) % 360.0;
        let battery_level = rng
            .integer(&telemetry.initial_battery)
            .max(telemetry.battery_floor);
        let rest_cycles_remaining = rng.integer(&motion.rest_cycles);
        Self {
            device_id: profile.device_id,
            tag: profile.tag,
            center: profile.center,
            containment_radius_m: degrees_to_meters(profile.containment_radius_deg),
            position: profile.start,
            behavior: BehaviorState::Grazing,
            rest_cycles_remaining,
            heading_deg,
            battery_level,
            motion: motion.clone(),
            telemetry: telemetry.clone(),
            rng,
            ticks: 0,
        }
    }

    /// Advance one tick and return the resulting telemetry sample.
    pub fn advance(&mut self) -> TelemetryRecord {
        self.ticks += 1;
        self.transition();
        self.step();

        let resting = self.behavior.is_resting();
        let speed = if resting {
            0.0
        } else {
            let range = &self.motion.grazing_speed;
            // Rounding may leave the range when its bounds are finer than 0.1.
            round_to(self.rng.uniform(range), 1).clamp(range.min, range.max)
        };
        let activity_level = if resting {
            self.rng.integer(&self.telemetry.resting_activity)
        } else {
            self.rng.integer(&self.telemetry.grazing_activity)
        };
        let temperature = self.rng.uniform(&self.telemetry.temperature_c);
        let signal_strength = self.rng.integer(&self.telemetry.signal_strength);
        let altitude = self.rng.uniform(&self.telemetry.altitude_m);
        if self.battery_level > self.telemetry.battery_floor
            && self.rng.chance(self.telemetry.battery_drain_probability)
        {
            self.battery_level -= 1;
        }

        TelemetryRecord {
            device_id: self.device_id.clone(),
            latitude: round_to(self.position.latitude, 6),
            longitude: round_to(self.position.longitude, 6),
            altitude: round_to(altitude, 1),
            speed,
            activity_level,
            temperature: round_to(temperature, 1),
            battery_level: self.battery_level,
            signal_strength,
            timestamp: Utc::now(),
            tag: self.tag.clone(),
            behavior: self.behavior,
        }
    }

    fn transition(&mut self) {
        match self.behavior {
            BehaviorState::Resting => {
                self.rest_cycles_remaining = self.rest_cycles_remaining.saturating_sub(1);
                if self.rest_cycles_remaining == 0 {
                    self.behavior = BehaviorState::Grazing;
                    // Duration of the next resting period.
                    self.rest_cycles_remaining = self.rng.integer(&self.motion.rest_cycles);
                    trace!(device_id = %self.device_id, "resting period finished");
                }
            }
            BehaviorState::Grazing => {
                if self.rng.chance(self.motion.rest_probability) {
                    self.behavior = BehaviorState::Resting;
                    if self.rest_cycles_remaining == 0 {
                        self.rest_cycles_remaining = self.rng.integer(&self.motion.rest_cycles);
                    }
                    trace!(
                        device_id = %self.device_id,
                        cycles = self.rest_cycles_remaining,
                        "resting period started"
                    );
                }
            }
        }
    }

    fn step(&mut self) {
        let (step_range, turn_range) = match self.behavior {
            BehaviorState::Resting => (&self.motion.resting_step_deg, &self.motion.resting_turn_deg),
            BehaviorState::Grazing => (&self.motion.grazing_step_deg, &self.motion.grazing_turn_deg),
        };
        let step = self.rng.uniform(step_range);
        let turn = self.rng.uniform(turn_range);
        self.heading_deg = (self.heading_deg + turn).rem_euclid(360.0);

        let candidate = self.position.offset(step, self.heading_deg);
        if self.is_contained(&candidate) {
            self.position = candidate;
            return;
        }

        self.position = self
            .position
            .toward(&self.center, self.motion.return_fraction);
        let jitter = self.rng.uniform(&self.motion.return_turn_deg);
        self.heading_deg = (bearing_deg(&self.position, &self.center) + jitter).rem_euclid(360.0);
        trace!(
            device_id = %self.device_id,
            distance_m = self.distance_from_center_m(),
            "step rejected; pulling back toward center"
        );
    }

    fn is_contained(&self, point: &GeoPoint) -> bool {
        haversine_m(point, &self.center) <= self.containment_radius_m
    }

    /// Override the behavioural state, e.g. to replay a recorded scenario.
    pub fn force_behavior(&mut self, behavior: BehaviorState, rest_cycles_remaining: u32) {
        self.behavior = behavior;
        self.rest_cycles_remaining = rest_cycles_remaining;
    }

    /// Move the entity without going through the motion model.
    pub fn relocate(&mut self, position: GeoPoint) {
        self.position = position;
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn behavior(&self) -> BehaviorState {
        self.behavior
    }

    pub fn rest_cycles_remaining(&self) -> u32 {
        self.rest_cycles_remaining
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn battery_level(&self) -> u32 {
        self.battery_level
    }

    pub fn containment_radius_m(&self) -> f64 {
        self.containment_radius_m
    }

    pub fn distance_from_center_m(&self) -> f64 {
        haversine_m(&self.position, &self.center)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
