//! Star resolution: catalog stars to observer-local alt-az.
//!
//! Two paths exist side by side and are both part of the public surface:
//!
//! - the **fast path** ([`visible_stars`]) positions J2000 catalog
//!   coordinates with nothing but sidereal time and spherical trig —
//!   right for bulk and batch queries;
//! - the **accurate path** ([`sky_positions`]) asks the ephemeris
//!   provider for a topocentric apparent observation of each star, which
//!   can differ from the fast path by tens of arcseconds.
//!
//! Callers pick their tradeoff; the two are intentionally not unified.

use crate::catalog::{self, CatalogStar};
use crate::error::Result;
use crate::observer::Observer;
use crate::provider::SolarSystemProvider;
use crate::time::format_utc;
use crate::transforms::equatorial_to_horizontal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A star positioned for an observer and instant. Enrichment fields are
/// carried over from the catalog and omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleStar {
    pub name: String,
    pub magnitude: f64,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_ly: Option<f64>,
    #[serde(rename = "color_temp_K", skip_serializing_if = "Option::is_none")]
    pub color_temp_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<BTreeMap<String, i64>>,
}

impl VisibleStar {
    pub(crate) fn positioned(star: &CatalogStar, altitude_deg: f64, azimuth_deg: f64) -> Self {
        VisibleStar {
            name: star.name.clone(),
            magnitude: star.magnitude,
            altitude_deg,
            azimuth_deg,
            distance_ly: star.distance_ly,
            color_temp_k: star.color_temp_k,
            bv: star.bv,
            rgb_hex: star.rgb_hex.clone(),
            aliases: star.aliases.clone(),
            ids: star.ids.clone(),
        }
    }
}

/// Requested output ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StarSort {
    /// Brighter first; name ascending on ties.
    #[default]
    Magnitude,
    /// Higher first; azimuth ascending on ties.
    Altitude,
}

/// Filter and ordering options shared by both star paths.
#[derive(Debug, Clone, PartialEq)]
pub struct StarQuery {
    /// Keep stars with `altitude >= min_altitude_deg` (equality keeps).
    pub min_altitude_deg: f64,
    /// Keep stars with `magnitude <= max_magnitude` when set.
    pub max_magnitude: Option<f64>,
    /// Cap on result length, applied after filtering and sorting.
    pub limit: Option<usize>,
    pub sort: StarSort,
}

impl Default for StarQuery {
    fn default() -> Self {
        StarQuery {
            min_altitude_deg: -90.0,
            max_magnitude: None,
            limit: None,
            sort: StarSort::Magnitude,
        }
    }
}

fn finish(mut results: Vec<VisibleStar>, query: &StarQuery) -> Vec<VisibleStar> {
    if let Some(max_mag) = query.max_magnitude {
        results.retain(|s| s.magnitude <= max_mag);
    }
    match query.sort {
        StarSort::Magnitude => results.sort_by(|a, b| {
            a.magnitude
                .total_cmp(&b.magnitude)
                .then_with(|| a.name.cmp(&b.name))
        }),
        StarSort::Altitude => results.sort_by(|a, b| {
            b.altitude_deg
                .total_cmp(&a.altitude_deg)
                .then_with(|| a.azimuth_deg.total_cmp(&b.azimuth_deg))
        }),
    }
    if let Some(limit) = query.limit {
        results.truncate(limit);
    }
    results
}

/// Fast path over an explicit star list: J2000 catalog coordinates
/// through sidereal time only, no precession.
pub fn visible_stars_in(
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
    query: &StarQuery,
) -> Vec<VisibleStar> {
    let lst = observer.lst_hours(at);
    let results = stars
        .iter()
        .filter_map(|star| {
            let pos =
                equatorial_to_horizontal(star.ra_hours, star.dec_deg, observer.latitude_deg, lst);
            if pos.altitude_deg >= query.min_altitude_deg {
                Some(VisibleStar::positioned(star, pos.altitude_deg, pos.azimuth_deg))
            } else {
                None
            }
        })
        .collect();
    finish(results, query)
}

/// Fast path over the process catalog (loads it on first use).
pub fn visible_stars(
    observer: &Observer,
    at: DateTime<Utc>,
    query: &StarQuery,
) -> Result<Vec<VisibleStar>> {
    Ok(visible_stars_in(&catalog::stars()?, observer, at, query))
}

/// Accurate path: topocentric apparent star positions via the ephemeris
/// provider, over the process catalog.
pub fn sky_positions(
    provider: &dyn SolarSystemProvider,
    observer: &Observer,
    at: DateTime<Utc>,
    query: &StarQuery,
) -> Result<Vec<VisibleStar>> {
    let stars = catalog::stars()?;
    let mut results = Vec::with_capacity(stars.len());
    for star in stars.iter() {
        let pos = provider.observe_star(star.ra_hours, star.dec_deg, observer, at)?;
        if pos.altitude_deg >= query.min_altitude_deg {
            results.push(VisibleStar::positioned(
                star,
                pos.altitude_deg,
                pos.azimuth_deg,
            ));
        }
    }
    Ok(finish(results, query))
}

/// One batch frame of stars at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarsFrame {
    pub at: String,
    pub stars: Vec<VisibleStar>,
}

/// Fast-path frames over `[start, end)` every `step_hours`.
/// `end <= start` yields no frames.
pub fn visible_stars_batch(
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_hours: f64,
    query: &StarQuery,
) -> Result<Vec<StarsFrame>> {
    let stars = catalog::stars()?;
    Ok(crate::bodies::batch_instants(start, end, step_hours)
        .into_iter()
        .map(|at| StarsFrame {
            at: format_utc(at),
            stars: visible_stars_in(&stars, observer, at, query),
        })
        .collect())
}
