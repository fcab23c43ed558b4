//! Abstraction over the high-precision ephemeris.
//!
//! The real implementation wraps a planetary ephemeris kernel and is
//! expected to lazy-load that kernel once per process (a one-time
//! initializer, never per request). The core only sees this trait, so it
//! stays testable with a mocked provider.

use crate::error::Result;
use crate::observer::Observer;
use crate::transforms::Horizontal;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Solar-system bodies resolved by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    /// All bodies in display order.
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// The seven planets, in order from the Sun.
    pub const PLANETS: [Body; 7] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }

    /// Wire category: `sun`, `moon` or `planet`.
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            _ => "planet",
        }
    }
}

/// Topocentric apparent observation of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Apparent {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    /// Topocentric distance in AU
    pub distance_au: f64,
    /// Heliocentric distance in AU (planets)
    pub sun_distance_au: Option<f64>,
    /// Phase angle in degrees (planets and Moon)
    pub phase_angle_deg: Option<f64>,
    /// Illuminated fraction 0..1 (Moon)
    pub illuminated_fraction: Option<f64>,
}

/// A horizon crossing inside a search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonCrossing {
    pub time: DateTime<Utc>,
    /// true: below -> above (rise); false: above -> below (set)
    pub rising: bool,
}

/// A principal lunar phase reached inside a search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPhaseChange {
    pub time: DateTime<Utc>,
    /// 0 = new moon, 1 = first quarter, 2 = full moon, 3 = last quarter
    pub phase: u8,
}

/// Ephemeris provider interface.
///
/// `observe` and `observe_star` return topocentric apparent positions
/// (light-time and aberration applied). `risings_and_settings` reports
/// the sign changes of the body's above-horizon indicator inside the
/// window, in time order. `moon_phases` reports the instants the Moon
/// reaches each principal phase inside the window, in time order.
pub trait SolarSystemProvider {
    fn observe(&self, body: Body, observer: &Observer, at: DateTime<Utc>) -> Result<Apparent>;

    fn observe_star(
        &self,
        ra_hours: f64,
        dec_deg: f64,
        observer: &Observer,
        at: DateTime<Utc>,
    ) -> Result<Horizontal>;

    fn risings_and_settings(
        &self,
        body: Body,
        observer: &Observer,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HorizonCrossing>>;

    fn moon_phases(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<Vec<MoonPhaseChange>>;
}
