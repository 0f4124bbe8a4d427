//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "layout"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Initial placement of the simulated herd around a base point."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use herd_common::{AppConfig, HerdConfig, SpreadPattern};
use tracing::debug;

use crate::entity::{EntityProfile, EntitySimulator};
use crate::geo::{GeoPoint, GeofenceBounds};
use crate::random::{RandomSource, SeededRandom};

/// Lay out `herd.count` entities evenly by angle around the base point.
///
/// Entity `i` sits at bearing `i * 360 / count` and a ring distance drawn from
/// `spread.offset_deg`, so no two entities start co-located.
pub fn layout(herd: &HerdConfig, rng: &mut impl RandomSource) -> Vec<EntityProfile> {
    let base = GeoPoint::from(herd.base);
    let count = herd.count;
    (0..count)
        .map(|index| {
            let angle = index as f64 * 360.0 / count as f64;
            let distance = rng.uniform(&herd.spread.offset_deg);
            let ring_point = base.offset(distance, angle);
            let center = match herd.spread.pattern {
                SpreadPattern::Ring => ring_point,
                SpreadPattern::SharedPasture => base,
            };
            let number = index + 1;
            EntityProfile {
                device_id: format!("{}{:02}", herd.device_id_prefix, number),
                tag: format!("{}{:03}", herd.tag_prefix, number),
                center,
                start: ring_point,
                containment_radius_deg: herd.containment_radius_deg,
            }
        })
        .collect()
}

/// Build every simulator for a validated configuration.
///
/// Each entity receives its own random source forked from `root`, so with a
/// fixed seed the whole herd is reproducible.
pub fn spawn_herd(config: &AppConfig, root: &mut SeededRandom) -> Vec<EntitySimulator> {
    layout(&config.herd, root)
        .into_iter()
        .map(|profile| {
            debug!(
                device_id = %profile.device_id,
                tag = %profile.tag,
                lat = profile.start.latitude,
                lng = profile.start.longitude,
                "entity created"
            );
            EntitySimulator::new(profile, &config.motion, &config.telemetry, root.fork())
        })
        .collect()
}

/// Bounds enclosing every home range of the herd.
///
/// In ring layouts each home range is offset from the base by up to the
/// maximum spread, so the enclosing radius grows by that amount.
pub fn herd_bounds(herd: &HerdConfig) -> GeofenceBounds {
    let radius_deg = match herd.spread.pattern {
        SpreadPattern::Ring => herd.containment_radius_deg + herd.spread.offset_deg.max,
        SpreadPattern::SharedPasture => herd.containment_radius_deg,
    };
    GeofenceBounds::around(GeoPoint::from(herd.base), radius_deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_m;
    use crate::random::ScriptedRandom;
    use herd_common::ValueRange;
    use std::collections::HashSet;

    #[test]
    fn ring_layout_spreads_entities_and_names_them() {
        let herd = HerdConfig::default();
        let profiles = layout(&herd, &mut SeededRandom::from_seed(1));
        assert_eq!(profiles.len(), 10);
        assert_eq!(profiles[0].device_id, "COW_GPS_ER_01");
        assert_eq!(profiles[0].tag, "ER001");
        assert_eq!(profiles[9].device_id, "COW_GPS_ER_10");
        assert_eq!(profiles[9].tag, "ER010");

        let ids: HashSet<_> = profiles.iter().map(|p| p.device_id.clone()).collect();
        assert_eq!(ids.len(), 10);
        for profile in &profiles {
            assert_eq!(profile.center, profile.start);
            assert_ne!(profile.center, GeoPoint::from(herd.base));
        }
    }

    #[test]
    fn first_entity_is_due_north_of_base() {
        let herd = HerdConfig::default();
        let profiles = layout(&herd, &mut ScriptedRandom::constant(0.0));
        let base = GeoPoint::from(herd.base);
        let first = profiles[0].start;
        assert!((first.latitude - (base.latitude + herd.spread.offset_deg.min)).abs() < 1e-12);
        assert!((first.longitude - base.longitude).abs() < 1e-12);
    }

    #[test]
    fn shared_pasture_starts_inside_common_range() {
        let mut herd = HerdConfig::default();
        herd.spread.pattern = SpreadPattern::SharedPasture;
        herd.spread.offset_deg = ValueRange::new(0.001, 0.004);
        let radius_m = crate::geo::degrees_to_meters(herd.containment_radius_deg);
        let base = GeoPoint::from(herd.base);
        for profile in layout(&herd, &mut SeededRandom::from_seed(2)) {
            assert_eq!(profile.center, base);
            assert!(haversine_m(&profile.start, &base) < radius_m);
        }
    }

    #[test]
    fn spawn_is_reproducible_for_fixed_seed() {
        let config = AppConfig::default();
        let mut a = spawn_herd(&config, &mut SeededRandom::from_seed(99));
        let mut b = spawn_herd(&config, &mut SeededRandom::from_seed(99));
        for (left, right) in a.iter_mut().zip(b.iter_mut()) {
            let l = left.advance();
            let r = right.advance();
            assert_eq!(l.latitude, r.latitude);
            assert_eq!(l.longitude, r.longitude);
            assert_eq!(l.battery_level, r.battery_level);
        }
    }

    #[test]
    fn bounds_cover_ring_home_ranges() {
        let mut herd = HerdConfig::default();
        let ring = herd_bounds(&herd);
        assert!((ring.radius_deg - 0.012).abs() < 1e-12);
        for profile in layout(&herd, &mut SeededRandom::from_seed(5)) {
            let reach = GeoPoint::new(
                profile.center.latitude + herd.containment_radius_deg,
                profile.center.longitude,
            );
            assert!(reach.latitude <= ring.north + 1e-12);
        }

        herd.spread.pattern = SpreadPattern::SharedPasture;
        let shared = herd_bounds(&herd);
        assert_eq!(shared.radius_deg, herd.containment_radius_deg);
        assert_eq!(shared.center, GeoPoint::from(herd.base));
    }
}
