//! Solar-system body resolution: topocentric positions, phases and
//! closed-form visual magnitudes for the Sun, Moon and seven planets.

use crate::error::Result;
use crate::observer::Observer;
use crate::provider::{Apparent, Body, SolarSystemProvider};
use crate::time::format_utc;
use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::Serialize;

/// Kilometers per astronomical unit (IAU 2012).
pub const AU_KM: f64 = 149_597_870.7;

/// Mean Earth-Moon distance in km, reference for the lunar magnitude term.
const MOON_MEAN_DISTANCE_KM: f64 = 384_400.0;

/// One visible body with its topocentric position. Optional fields are
/// omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleBody {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_au: Option<f64>,
}

/// One batch frame of bodies at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodiesFrame {
    pub at: String,
    pub bodies: Vec<VisibleBody>,
}

/// Closed-form visual magnitude for a body.
///
/// `r` is the heliocentric distance in AU, `delta` the geocentric
/// distance in AU and `alpha` the phase angle in degrees. The planetary
/// forms share the distance term `L = 5·log10(r·Δ)`; Saturn carries no
/// ring contribution. The Moon uses its own empirical form against the
/// mean lunar distance.
pub fn visual_magnitude(body: Body, r: f64, delta: f64, alpha: f64) -> f64 {
    let l = 5.0 * (r * delta).log10();
    match body {
        Body::Sun => -26.74,
        Body::Mercury => {
            -0.60 + l + 0.0380 * alpha - 2.73e-4 * alpha.powi(2) + 2e-6 * alpha.powi(3)
        }
        Body::Venus => -4.47 + l + 0.036 * alpha - 4.84e-7 * alpha.powi(3),
        Body::Mars => -1.52 + l + 0.016 * alpha,
        Body::Jupiter => -9.40 + l + 0.005 * alpha,
        Body::Saturn => -8.88 + l + 0.044 * alpha,
        Body::Uranus => -7.19 + l + 0.002 * alpha,
        Body::Neptune => -6.87 + l,
        Body::Moon => {
            let delta_km = delta * AU_KM;
            -12.7 + 0.026 * alpha.abs()
                + 4e-9 * alpha.powi(4)
                + 5.0 * (delta_km / MOON_MEAN_DISTANCE_KM).log10()
        }
    }
}

fn magnitude_from_apparent(body: Body, apparent: &Apparent) -> Option<f64> {
    match body {
        Body::Sun => Some(-26.74),
        Body::Moon => {
            let alpha = apparent.phase_angle_deg?;
            Some(visual_magnitude(body, 1.0, apparent.distance_au, alpha))
        }
        _ => {
            let r = apparent.sun_distance_au?;
            let alpha = apparent.phase_angle_deg?;
            Some(visual_magnitude(body, r, apparent.distance_au, alpha))
        }
    }
}

fn to_visible(body: Body, apparent: &Apparent) -> VisibleBody {
    let (distance_km, distance_au) = match body {
        Body::Moon => (Some(apparent.distance_au * AU_KM), None),
        _ => (None, Some(apparent.distance_au)),
    };
    VisibleBody {
        name: body.name(),
        kind: body.kind(),
        altitude_deg: apparent.altitude_deg,
        azimuth_deg: apparent.azimuth_deg,
        magnitude: magnitude_from_apparent(body, apparent),
        phase: apparent.illuminated_fraction,
        distance_km,
        distance_au,
    }
}

/// Computes the visible bodies for an instant and observer.
///
/// Bodies whose observation fails are dropped individually (provider
/// trouble never fails the whole list). Output is filtered to
/// `altitude >= min_altitude_deg` and sorted by altitude descending,
/// azimuth ascending on ties.
pub fn visible_bodies(
    provider: &dyn SolarSystemProvider,
    observer: &Observer,
    at: DateTime<Utc>,
    min_altitude_deg: f64,
) -> Vec<VisibleBody> {
    let mut out = Vec::with_capacity(Body::ALL.len());
    for body in Body::ALL {
        match provider.observe(body, observer, at) {
            Ok(apparent) => {
                if apparent.altitude_deg >= min_altitude_deg {
                    out.push(to_visible(body, &apparent));
                }
            }
            Err(e) => warn!("dropping {} from visible bodies: {e}", body.name()),
        }
    }
    out.sort_by(|a, b| {
        b.altitude_deg
            .total_cmp(&a.altitude_deg)
            .then_with(|| a.azimuth_deg.total_cmp(&b.azimuth_deg))
    });
    out
}

/// Computes body frames over `[start, end)` stepping `step_hours`.
///
/// `end <= start` yields no frames. Each frame is tagged with its
/// instant in `YYYY-MM-DDTHH:MM:SSZ` form; `limit` caps bodies per
/// frame after the usual sort.
pub fn visible_bodies_batch(
    provider: &dyn SolarSystemProvider,
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_hours: f64,
    limit: Option<usize>,
) -> Result<Vec<BodiesFrame>> {
    let mut frames = Vec::new();
    for at in batch_instants(start, end, step_hours) {
        let mut bodies = visible_bodies(provider, observer, at, -90.0);
        if let Some(n) = limit {
            bodies.truncate(n);
        }
        frames.push(BodiesFrame {
            at: format_utc(at),
            bodies,
        });
    }
    Ok(frames)
}

/// Instants from `start` (inclusive) to `end` (exclusive) every
/// `step_hours`; non-positive steps are clamped to one hour.
pub(crate) fn batch_instants(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_hours: f64,
) -> Vec<DateTime<Utc>> {
    let step_s = if step_hours > 0.0 {
        (step_hours * 3600.0).round().max(1.0) as i64
    } else {
        3600
    };
    let mut out = Vec::new();
    let mut at = start;
    while at < end {
        out.push(at);
        at += Duration::seconds(step_s);
    }
    out
}
