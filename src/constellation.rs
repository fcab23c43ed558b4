//! Constellation frames: member stars positioned in alt-az plus the
//! stick-figure edge list, with below-horizon marking, optional FOV edge
//! clipping and a bounded process-wide cache.

use crate::catalog::{self, CatalogStar, ConstellationDefinition};
use crate::error::Result;
use crate::observer::Observer;
use crate::stars::VisibleStar;
use crate::time::format_utc;
use crate::transforms::{azimuth_delta_deg, clip_segment, equatorial_to_horizontal};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use lru::LruCache;
use serde::Serialize;
use serde_json::json;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Rendering hint attached to dimmed frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStyle {
    pub variant: &'static str,
    pub opacity: f64,
}

/// One constellation positioned for an observer and instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub name: String,
    /// Instant of the frame, `YYYY-MM-DDTHH:MM:SSZ`
    pub at: String,
    pub stars: Vec<VisibleStar>,
    /// Pairs of member star names, echoed from the definition
    pub edges: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub below_horizon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FrameStyle>,
}

/// Alt-az field-of-view rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovRect {
    pub center_az_deg: f64,
    pub center_alt_deg: f64,
    pub width_deg: f64,
    pub height_deg: f64,
}

impl FovRect {
    /// Whether a direction falls inside the rectangle, azimuth wrapped
    /// by shortest arc against the center.
    pub fn contains(&self, altitude_deg: f64, azimuth_deg: f64) -> bool {
        let daz = azimuth_delta_deg(self.center_az_deg, azimuth_deg);
        let dalt = altitude_deg - self.center_alt_deg;
        daz.abs() <= self.width_deg / 2.0 && dalt.abs() <= self.height_deg / 2.0
    }
}

/// Options for [`frames`].
#[derive(Debug, Clone, PartialEq)]
pub struct FramesOptions {
    /// Threshold for the below-horizon flag (equality counts as above).
    pub min_altitude_deg: f64,
    /// Restrict to these constellation names; `None` means all.
    pub names: Option<Vec<String>>,
    pub include_below_horizon: bool,
    pub fov: Option<FovRect>,
    /// With a FOV set, drop edges whose segment misses the rectangle.
    pub clip_edges_to_fov: bool,
    /// Mark below-horizon frames with the dim style.
    pub dim_below_horizon: bool,
    /// Cache bucket width in seconds (clamped to >= 1).
    pub cache_bucket_s: u64,
}

impl Default for FramesOptions {
    fn default() -> Self {
        FramesOptions {
            min_altitude_deg: 0.0,
            names: None,
            include_below_horizon: false,
            fov: None,
            clip_edges_to_fov: false,
            dim_below_horizon: true,
            cache_bucket_s: 1,
        }
    }
}

fn positioned_members(
    def: &ConstellationDefinition,
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
) -> Vec<VisibleStar> {
    let lst = observer.lst_hours(at);
    def.stars
        .iter()
        .filter_map(|name| {
            // Names absent from the catalog are skipped silently.
            let star = stars.iter().find(|s| &s.name == name)?;
            let pos =
                equatorial_to_horizontal(star.ra_hours, star.dec_deg, observer.latitude_deg, lst);
            Some(VisibleStar::positioned(star, pos.altitude_deg, pos.azimuth_deg))
        })
        .collect()
}

fn edges_for(
    def: &ConstellationDefinition,
    positioned: &[VisibleStar],
    fov: Option<&FovRect>,
    clip: bool,
) -> Vec<(String, String)> {
    let fov = match (clip, fov) {
        (true, Some(f)) => f,
        // No clipping requested (or no rectangle): echo the definition.
        _ => {
            return def
                .edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect()
        }
    };

    def.edges
        .iter()
        .filter(|(a, b)| {
            let (pa, pb) = match (
                positioned.iter().find(|s| s.name == *a),
                positioned.iter().find(|s| s.name == *b),
            ) {
                (Some(pa), Some(pb)) => (pa, pb),
                _ => return false,
            };
            // Clip in the wrapped (Δaz, alt) plane around the FOV center.
            clip_segment(
                azimuth_delta_deg(fov.center_az_deg, pa.azimuth_deg),
                pa.altitude_deg,
                azimuth_delta_deg(fov.center_az_deg, pb.azimuth_deg),
                pb.altitude_deg,
                -fov.width_deg / 2.0,
                fov.center_alt_deg - fov.height_deg / 2.0,
                fov.width_deg / 2.0,
                fov.center_alt_deg + fov.height_deg / 2.0,
            )
            .is_some()
        })
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Positions one constellation. Stars below `min_altitude_deg` are
/// filtered out of `stars`; `edges` echoes the definition verbatim.
///
/// Fails with `NotFound` for an unknown name.
pub fn frame_in(
    stars: &[CatalogStar],
    name: &str,
    observer: &Observer,
    at: DateTime<Utc>,
    min_altitude_deg: f64,
) -> Result<Frame> {
    let def = catalog::constellation(name)?;
    let mut positioned = positioned_members(def, stars, observer, at);
    positioned.retain(|s| s.altitude_deg >= min_altitude_deg);
    Ok(Frame {
        name: def.name.to_string(),
        at: format_utc(at),
        stars: positioned,
        edges: edges_for(def, &[], None, false),
        below_horizon: None,
        style: None,
    })
}

/// [`frame_in`] over the process catalog.
pub fn frame(
    name: &str,
    observer: &Observer,
    at: DateTime<Utc>,
    min_altitude_deg: f64,
) -> Result<Frame> {
    frame_in(&catalog::stars()?, name, observer, at, min_altitude_deg)
}

/// Backward-compatible single-frame lookup: failures are softened to a
/// `{name, stars: [], edges: [], error}` document instead of an error.
pub fn frame_or_soft_error(
    name: &str,
    observer: &Observer,
    at: DateTime<Utc>,
    min_altitude_deg: f64,
) -> serde_json::Value {
    match frame(name, observer, at, min_altitude_deg) {
        Ok(frame) => json!(frame),
        Err(e) => json!({
            "name": name,
            "stars": [],
            "edges": [],
            "error": e.to_string(),
        }),
    }
}

/// Uncached frame computation over an explicit star list.
pub fn frames_in(
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
    options: &FramesOptions,
) -> Vec<Frame> {
    let at_str = format_utc(at);
    catalog::CONSTELLATIONS
        .iter()
        .filter(|def| match &options.names {
            Some(wanted) => wanted.iter().any(|n| n == def.name),
            None => true,
        })
        .filter_map(|def| {
            let positioned = positioned_members(def, stars, observer, at);
            let below = !positioned
                .iter()
                .any(|s| s.altitude_deg >= options.min_altitude_deg);
            if below && !options.include_below_horizon {
                return None;
            }
            let edges = edges_for(
                def,
                &positioned,
                options.fov.as_ref(),
                options.clip_edges_to_fov,
            );
            Some(Frame {
                name: def.name.to_string(),
                at: at_str.clone(),
                stars: positioned,
                edges,
                below_horizon: if below { Some(true) } else { None },
                style: if below && options.dim_below_horizon {
                    Some(FrameStyle {
                        variant: "dim",
                        opacity: 0.35,
                    })
                } else {
                    None
                },
            })
        })
        .collect()
}

/// FOV-aware one-line summary of a constellation's placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationSummary {
    pub name: String,
    /// Mean member altitude (arithmetic)
    pub altitude_deg: f64,
    /// Mean member azimuth (circular)
    pub azimuth_deg: f64,
    /// Any member star at or above `min_altitude_deg`
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_fov: Option<bool>,
}

/// Summarizes where each selected constellation sits for the observer:
/// mean direction, visibility, and — when a FOV rectangle is given —
/// whether that mean direction falls inside it. Constellations fully
/// below the horizon are omitted unless `include_below_horizon`.
pub fn visible_constellations_in(
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
    options: &FramesOptions,
) -> Vec<ConstellationSummary> {
    catalog::CONSTELLATIONS
        .iter()
        .filter(|def| match &options.names {
            Some(wanted) => wanted.iter().any(|n| n == def.name),
            None => true,
        })
        .filter_map(|def| {
            let positioned = positioned_members(def, stars, observer, at);
            if positioned.is_empty() {
                return None;
            }
            let visible = positioned
                .iter()
                .any(|s| s.altitude_deg >= options.min_altitude_deg);
            if !visible && !options.include_below_horizon {
                return None;
            }
            let altitude_deg = positioned.iter().map(|s| s.altitude_deg).sum::<f64>()
                / positioned.len() as f64;
            let azimuths: Vec<f64> = positioned.iter().map(|s| s.azimuth_deg).collect();
            let azimuth_deg = crate::transforms::circular_mean_deg(&azimuths);
            Some(ConstellationSummary {
                name: def.name.to_string(),
                altitude_deg,
                azimuth_deg,
                visible,
                in_fov: options.fov.map(|f| f.contains(altitude_deg, azimuth_deg)),
            })
        })
        .collect()
}

/// [`visible_constellations_in`] over the process catalog.
pub fn visible_constellations(
    observer: &Observer,
    at: DateTime<Utc>,
    options: &FramesOptions,
) -> Result<Vec<ConstellationSummary>> {
    Ok(visible_constellations_in(
        &catalog::stars()?,
        observer,
        at,
        options,
    ))
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct FramesCacheKey {
    lat_q: i64,
    lon_q: i64,
    bucket: i64,
    bucket_s: u64,
    min_alt_bits: u64,
    names: Option<Vec<String>>,
    include_below_horizon: bool,
    fov_bits: Option<[u64; 4]>,
    clip_edges_to_fov: bool,
    dim_below_horizon: bool,
}

fn cache_key(observer: &Observer, at: DateTime<Utc>, options: &FramesOptions) -> FramesCacheKey {
    let bucket_s = options.cache_bucket_s.max(1);
    FramesCacheKey {
        lat_q: (observer.latitude_deg * 1e4).round() as i64,
        lon_q: (observer.longitude_deg * 1e4).round() as i64,
        bucket: at.timestamp().div_euclid(bucket_s as i64),
        bucket_s,
        min_alt_bits: options.min_altitude_deg.to_bits(),
        names: options.names.clone(),
        include_below_horizon: options.include_below_horizon,
        fov_bits: options.fov.map(|f| {
            [
                f.center_az_deg.to_bits(),
                f.center_alt_deg.to_bits(),
                f.width_deg.to_bits(),
                f.height_deg.to_bits(),
            ]
        }),
        clip_edges_to_fov: options.clip_edges_to_fov,
        dim_below_horizon: options.dim_below_horizon,
    }
}

lazy_static! {
    static ref FRAMES_CACHE: Mutex<LruCache<FramesCacheKey, Vec<Frame>>> = Mutex::new(
        LruCache::new(NonZeroUsize::new(256).expect("nonzero cache capacity"))
    );
}

/// Empties the frames cache. Test hook only.
#[doc(hidden)]
pub fn clear_frames_cache_for_tests() {
    FRAMES_CACHE
        .lock()
        .expect("frames cache lock poisoned")
        .clear();
}

/// Frames for all (or selected) constellations over the process catalog.
///
/// Results are cached by observer position quantized to 1e-4°, the
/// instant quantized to `cache_bucket_s` buckets, and the option set.
/// The frame is computed outside the cache lock; the lock is only held
/// for the lookup and the insert.
pub fn frames(observer: &Observer, at: DateTime<Utc>, options: &FramesOptions) -> Result<Vec<Frame>> {
    let key = cache_key(observer, at, options);
    if let Some(hit) = FRAMES_CACHE
        .lock()
        .expect("frames cache lock poisoned")
        .get(&key)
    {
        return Ok(hit.clone());
    }

    let computed = frames_in(&catalog::stars()?, observer, at, options);

    FRAMES_CACHE
        .lock()
        .expect("frames cache lock poisoned")
        .put(key, computed.clone());
    Ok(computed)
}
