//! Discrete sky events inside a time window: planet rises and sets,
//! plus the four principal Moon phases.

use crate::observer::Observer;
use crate::provider::{Body, SolarSystemProvider};
use crate::time::format_utc;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

/// Cardinal compass points, clockwise from North.
pub const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Event names for the four-valued lunar phase, indexed by phase 0..3.
pub const MOON_PHASE_NAMES: [&str; 4] = [
    "Luna nueva",
    "Cuarto creciente",
    "Luna llena",
    "Cuarto menguante",
];

/// One discrete event inside the requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstronomyEvent {
    /// `planet_rise`, `planet_set` or `moon_phase`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Event instant, `YYYY-MM-DDTHH:MM:SSZ`
    pub time: String,
    pub description: String,
}

/// Cardinal point for an azimuth: `((az + 22.5) / 45) mod 8`.
///
/// # Example
/// ```
/// use sky_math::events::cardinal_for_azimuth;
///
/// assert_eq!(cardinal_for_azimuth(0.0), "N");
/// assert_eq!(cardinal_for_azimuth(89.9), "E");
/// assert_eq!(cardinal_for_azimuth(337.5), "N");
/// assert_eq!(cardinal_for_azimuth(300.0), "NW");
/// ```
pub fn cardinal_for_azimuth(azimuth_deg: f64) -> &'static str {
    let idx = ((azimuth_deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    CARDINALS[idx]
}

/// Finds the astronomy events for an observer inside `[start, end]`.
///
/// Rise/set transitions are searched per planet; each event's cardinal
/// direction comes from observing the body at the transition instant.
/// Moon phase events carry the phase name and the illuminated
/// percentage at that instant. A failing body is dropped alone; a
/// wholly empty result is valid. Events outside the open interval are
/// discarded; output is sorted by time ascending with a total
/// tie-break, so identical inputs always serialize identically.
pub fn astronomy_events(
    provider: &dyn SolarSystemProvider,
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<AstronomyEvent> {
    if end <= start {
        return Vec::new();
    }
    let mut events: Vec<(DateTime<Utc>, AstronomyEvent)> = Vec::new();

    for body in Body::PLANETS {
        let crossings = match provider.risings_and_settings(body, observer, start, end) {
            Ok(c) => c,
            Err(e) => {
                warn!("dropping {} from events: {e}", body.name());
                continue;
            }
        };
        for crossing in crossings {
            if crossing.time <= start || crossing.time >= end {
                continue;
            }
            let cardinal = match provider.observe(body, observer, crossing.time) {
                Ok(apparent) => cardinal_for_azimuth(apparent.azimuth_deg),
                Err(e) => {
                    warn!("dropping {} crossing: {e}", body.name());
                    continue;
                }
            };
            let (kind, description) = if crossing.rising {
                (
                    "planet_rise",
                    format!("{} sale por el {}", body.name(), cardinal),
                )
            } else {
                (
                    "planet_set",
                    format!("{} se pone por el {}", body.name(), cardinal),
                )
            };
            events.push((
                crossing.time,
                AstronomyEvent {
                    kind,
                    time: format_utc(crossing.time),
                    description,
                },
            ));
        }
    }

    match provider.moon_phases(start, end) {
        Ok(phases) => {
            for change in phases {
                if change.time <= start || change.time >= end {
                    continue;
                }
                let name = match MOON_PHASE_NAMES.get(change.phase as usize) {
                    Some(n) => *n,
                    None => continue,
                };
                let description = match provider.observe(Body::Moon, observer, change.time) {
                    Ok(apparent) => match apparent.illuminated_fraction {
                        Some(fraction) => {
                            format!("{name} ({}%)", (fraction * 100.0).round() as i64)
                        }
                        None => name.to_string(),
                    },
                    Err(e) => {
                        warn!("moon illumination unavailable at phase event: {e}");
                        name.to_string()
                    }
                };
                events.push((
                    change.time,
                    AstronomyEvent {
                        kind: "moon_phase",
                        time: format_utc(change.time),
                        description,
                    },
                ));
            }
        }
        Err(e) => warn!("dropping moon phases from events: {e}"),
    }

    events.sort_by(|(ta, ea), (tb, eb)| {
        ta.cmp(tb)
            .then_with(|| ea.kind.cmp(eb.kind))
            .then_with(|| ea.description.cmp(&eb.description))
    });
    events.into_iter().map(|(_, e)| e).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_boundaries() {
        assert_eq!(cardinal_for_azimuth(22.4), "N");
        assert_eq!(cardinal_for_azimuth(22.5), "NE");
        assert_eq!(cardinal_for_azimuth(180.0), "S");
        assert_eq!(cardinal_for_azimuth(292.5), "NW");
        assert_eq!(cardinal_for_azimuth(337.4), "NW");
    }
}
