//! Shared test fixtures: a mock ephemeris provider, a small literal
//! star catalog, and the lock serializing tests that touch the
//! process-wide stores.

use crate::catalog::CatalogStar;
use crate::error::{Result, SkyError};
use crate::observer::Observer;
use crate::provider::{
    Apparent, Body, HorizonCrossing, MoonPhaseChange, SolarSystemProvider,
};
use crate::transforms::{equatorial_to_horizontal, Horizontal};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

lazy_static! {
    /// Tests that install catalogs/boundaries or exercise the frames
    /// cache serialize on this lock so parallel test threads do not
    /// race on process-wide state.
    pub static ref STORE_LOCK: Mutex<()> = Mutex::new(());
}

/// Bright-star fixture used across the integration tests. Coordinates
/// are real J2000 values; Ursa Minor members line up with the built-in
/// constellation definition.
pub fn bright_catalog() -> Vec<CatalogStar> {
    vec![
        CatalogStar::new("Polaris", 2.5303, 89.2641, 1.98),
        CatalogStar::new("Yildun", 17.5369, 86.5864, 4.36),
        CatalogStar::new("Epsilon UMi", 16.7661, 82.0373, 4.19),
        CatalogStar::new("Zeta UMi", 15.7342, 77.7945, 4.29),
        CatalogStar::new("Pherkad", 15.3455, 71.8340, 3.00),
        CatalogStar::new("Kochab", 14.8451, 74.1555, 2.07),
        CatalogStar::new("Sirius", 6.7525, -16.7161, -1.46),
        CatalogStar::new("Canopus", 6.3992, -52.6957, -0.74),
        CatalogStar::new("Rigel", 5.2423, -8.2016, 0.13),
        CatalogStar::new("Betelgeuse", 5.9195, 7.4071, 0.50),
        CatalogStar::new("Procyon", 7.6550, 5.2250, 0.34),
        CatalogStar::new("Vega", 18.6156, 38.7837, 0.03),
        CatalogStar::new("Capella", 5.2782, 45.9980, 0.08),
        CatalogStar::new("Aldebaran", 4.5987, 16.5093, 0.85),
    ]
}

/// Scripted ephemeris provider. `observe_star` runs the fast-path math
/// with a small constant offset so the two star paths stay
/// distinguishable in assertions.
#[derive(Default)]
pub struct MockProvider {
    pub bodies: HashMap<Body, Apparent>,
    pub crossings: HashMap<Body, Vec<HorizonCrossing>>,
    pub phases: Vec<MoonPhaseChange>,
    pub failing: HashSet<Body>,
}

impl MockProvider {
    pub fn with_body(mut self, body: Body, apparent: Apparent) -> Self {
        self.bodies.insert(body, apparent);
        self
    }

    pub fn with_crossings(mut self, body: Body, crossings: Vec<HorizonCrossing>) -> Self {
        self.crossings.insert(body, crossings);
        self
    }

    pub fn with_phases(mut self, phases: Vec<MoonPhaseChange>) -> Self {
        self.phases = phases;
        self
    }

    pub fn failing(mut self, body: Body) -> Self {
        self.failing.insert(body);
        self
    }
}

/// Offset applied by the mock's accurate star path, in degrees.
pub const MOCK_APPARENT_OFFSET_DEG: f64 = 0.005;

impl SolarSystemProvider for MockProvider {
    fn observe(&self, body: Body, _observer: &Observer, _at: DateTime<Utc>) -> Result<Apparent> {
        if self.failing.contains(&body) {
            return Err(SkyError::Provider {
                operation: "observe",
                reason: format!("mock failure for {}", body.name()),
            });
        }
        self.bodies
            .get(&body)
            .copied()
            .ok_or_else(|| SkyError::Provider {
                operation: "observe",
                reason: format!("no mock observation for {}", body.name()),
            })
    }

    fn observe_star(
        &self,
        ra_hours: f64,
        dec_deg: f64,
        observer: &Observer,
        at: DateTime<Utc>,
    ) -> Result<Horizontal> {
        let lst = observer.lst_hours(at);
        let pos = equatorial_to_horizontal(ra_hours, dec_deg, observer.latitude_deg, lst);
        Ok(Horizontal {
            altitude_deg: (pos.altitude_deg + MOCK_APPARENT_OFFSET_DEG).min(90.0),
            azimuth_deg: pos.azimuth_deg,
        })
    }

    fn risings_and_settings(
        &self,
        body: Body,
        _observer: &Observer,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HorizonCrossing>> {
        if self.failing.contains(&body) {
            return Err(SkyError::Provider {
                operation: "risings_and_settings",
                reason: format!("mock failure for {}", body.name()),
            });
        }
        Ok(self
            .crossings
            .get(&body)
            .map(|c| {
                c.iter()
                    .filter(|x| x.time >= start && x.time <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn moon_phases(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MoonPhaseChange>> {
        Ok(self
            .phases
            .iter()
            .filter(|p| p.time >= start && p.time <= end)
            .copied()
            .collect())
    }
}

/// Apparent fixture for a body comfortably above the horizon.
pub fn apparent(altitude_deg: f64, azimuth_deg: f64, distance_au: f64) -> Apparent {
    Apparent {
        altitude_deg,
        azimuth_deg,
        distance_au,
        sun_distance_au: None,
        phase_angle_deg: None,
        illuminated_fraction: None,
    }
}
