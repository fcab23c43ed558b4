//! IAU constellation boundaries: which of the 88 official regions a sky
//! direction falls in.
//!
//! Boundary polygons live in RA/Dec. Polygons can straddle the RA
//! 0°/360° seam, so each polygon is re-centered onto the query point
//! before the planar ray cast — there is no global 2-D projection of
//! the celestial sphere that survives the wrap.

use crate::error::{Result, SkyError};
use crate::observer::Observer;
use crate::time::format_utc;
use crate::transforms::{circular_mean_deg, horizontal_to_equatorial, normalize_degrees_360};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Boundary polygons per constellation, ordered by name so enumeration
/// (and therefore first-match resolution) is deterministic.
pub type BoundaryTable = BTreeMap<String, Vec<Vec<(f64, f64)>>>;

/// Approximate centroid (RA, Dec in degrees) per constellation.
pub type CentroidTable = BTreeMap<String, (f64, f64)>;

/// Parses an IAU boundary file: `{name: [[[ra_deg, dec_deg], …], …]}`.
///
/// Per vertex, RA is wrapped mod 360 and Dec clamped to `[-90, 90]`;
/// malformed vertices are skipped. Polygons keep only runs of at least
/// 3 surviving vertices; names keep only non-empty polygon lists.
pub fn parse_boundaries(raw: &str) -> Result<BoundaryTable> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| SkyError::CatalogInvalid {
        reason: format!("límites IAU: JSON inválido: {e}"),
    })?;
    let entries = doc.as_object().ok_or_else(|| SkyError::CatalogInvalid {
        reason: "límites IAU: se requiere un objeto name -> polígonos".to_string(),
    })?;

    let mut table = BoundaryTable::new();
    for (name, polys) in entries {
        let polys = match polys.as_array() {
            Some(p) => p,
            None => continue,
        };
        let mut fixed: Vec<Vec<(f64, f64)>> = Vec::new();
        for poly in polys {
            let vertices = match poly.as_array() {
                Some(v) => v,
                None => continue,
            };
            let mut pts: Vec<(f64, f64)> = Vec::with_capacity(vertices.len());
            for vertex in vertices {
                let pair = vertex.as_array();
                let (ra, dec) = match pair.and_then(|p| {
                    Some((p.first()?.as_f64()?, p.get(1)?.as_f64()?))
                }) {
                    Some(v) => v,
                    None => continue,
                };
                pts.push((normalize_degrees_360(ra), dec.clamp(-90.0, 90.0)));
            }
            if pts.len() >= 3 {
                fixed.push(pts);
            }
        }
        if !fixed.is_empty() {
            table.insert(name.clone(), fixed);
        }
    }
    Ok(table)
}

/// Centroids per constellation: RA by circular mean over all polygon
/// vertices, Dec by arithmetic mean.
pub fn centroids_of(table: &BoundaryTable) -> CentroidTable {
    table
        .iter()
        .filter_map(|(name, polys)| {
            let mut ra_all = Vec::new();
            let mut dec_all = Vec::new();
            for poly in polys {
                for (ra, dec) in poly {
                    ra_all.push(*ra);
                    dec_all.push(*dec);
                }
            }
            if ra_all.is_empty() {
                return None;
            }
            let ra_c = circular_mean_deg(&ra_all);
            let dec_c = dec_all.iter().sum::<f64>() / dec_all.len() as f64;
            Some((name.clone(), (ra_c, dec_c)))
        })
        .collect()
}

/// Ray cast in the plane, half-open rule `(y1 > y) != (y2 > y)`.
/// The polygon must already be wrapped to the query point's RA window.
fn point_in_polygon(x: f64, y: f64, poly: &[(f64, f64)]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    for i in 0..n {
        let (x1, y1) = poly[i];
        let (x2, y2) = poly[(i + 1) % n];
        let intersects =
            ((y1 > y) != (y2 > y)) && (x < (x2 - x1) * (y - y1) / (y2 - y1 + 1e-12) + x1);
        if intersects {
            inside = !inside;
        }
    }
    inside
}

/// Wraps a vertex RA into the window centered at `center_ra`:
/// `((v - ra + 180) mod 360) - 180 + ra`.
#[inline]
fn wrap_to_center(ra: f64, center_ra: f64) -> f64 {
    (ra - center_ra + 180.0).rem_euclid(360.0) - 180.0 + center_ra
}

/// Finds the constellation containing an RA/Dec direction in an
/// explicit table. RA is normalized mod 360 and Dec clamped; the first
/// matching name in enumeration order wins (shared boundary edges
/// resolve to the lexicographically first neighbor).
pub fn find_by_radec_in(table: &BoundaryTable, ra_deg: f64, dec_deg: f64) -> Option<&str> {
    let ra = normalize_degrees_360(ra_deg);
    let dec = dec_deg.clamp(-90.0, 90.0);

    for (name, polys) in table {
        for poly in polys {
            let wrapped: Vec<(f64, f64)> = poly
                .iter()
                .map(|(v_ra, v_dec)| (wrap_to_center(*v_ra, ra), *v_dec))
                .collect();
            if point_in_polygon(ra, dec, &wrapped) {
                return Some(name.as_str());
            }
        }
    }
    None
}

struct BoundaryStore {
    path: PathBuf,
    table: Option<Arc<BoundaryTable>>,
    centroids: Option<Arc<CentroidTable>>,
}

lazy_static! {
    static ref STORE: RwLock<BoundaryStore> = RwLock::new(BoundaryStore {
        path: PathBuf::from("iau_boundaries.json"),
        table: None,
        centroids: None,
    });
}

/// Points the lazy loader at a boundary file. Only effective before the
/// first load.
pub fn set_boundaries_path<P: AsRef<Path>>(path: P) {
    let mut store = STORE.write().expect("boundary store lock poisoned");
    if store.table.is_none() {
        store.path = path.as_ref().to_path_buf();
    } else {
        warn!("IAU boundaries already loaded; ignoring new path");
    }
}

/// Installs an already-built boundary table, bypassing file I/O.
pub fn install_boundaries(table: BoundaryTable) {
    let mut store = STORE.write().expect("boundary store lock poisoned");
    store.centroids = Some(Arc::new(centroids_of(&table)));
    store.table = Some(Arc::new(table));
}

/// Drops loaded boundaries so the next call reloads. Test hook only.
#[doc(hidden)]
pub fn reset_store_for_tests() {
    let mut store = STORE.write().expect("boundary store lock poisoned");
    store.table = None;
    store.centroids = None;
    store.path = PathBuf::from("iau_boundaries.json");
}

/// Returns the boundary table, loading it on first use. A missing file
/// is not an error: it yields an empty table and every lookup misses,
/// matching the original service's behavior.
pub fn boundaries() -> Arc<BoundaryTable> {
    if let Some(table) = STORE
        .read()
        .expect("boundary store lock poisoned")
        .table
        .clone()
    {
        return table;
    }

    let path = STORE
        .read()
        .expect("boundary store lock poisoned")
        .path
        .clone();
    let table = match std::fs::read_to_string(&path) {
        Ok(raw) => match parse_boundaries(&raw) {
            Ok(t) => t,
            Err(e) => {
                warn!("IAU boundaries unusable: {e}");
                BoundaryTable::new()
            }
        },
        Err(e) => {
            warn!("IAU boundaries missing at {}: {e}", path.display());
            BoundaryTable::new()
        }
    };
    debug!("loaded IAU boundaries for {} constellations", table.len());

    let table = Arc::new(table);
    let mut store = STORE.write().expect("boundary store lock poisoned");
    if store.table.is_none() {
        store.centroids = Some(Arc::new(centroids_of(&table)));
        store.table = Some(table.clone());
    }
    store.table.clone().unwrap_or(table)
}

/// Centroid table for the loaded boundaries.
pub fn centroids() -> Arc<CentroidTable> {
    let _ = boundaries();
    STORE
        .read()
        .expect("boundary store lock poisoned")
        .centroids
        .clone()
        .unwrap_or_default()
}

/// Finds the IAU constellation containing an RA/Dec direction, using
/// the process boundary table.
pub fn find_by_radec(ra_deg: f64, dec_deg: f64) -> Option<String> {
    find_by_radec_in(&boundaries(), ra_deg, dec_deg).map(str::to_string)
}

/// Finds the IAU constellation containing an alt-az direction for an
/// observer and instant, by inverting to RA/Dec first.
pub fn find_by_altaz(
    observer: &Observer,
    at: DateTime<Utc>,
    azimuth_deg: f64,
    altitude_deg: f64,
) -> Option<String> {
    let lst = observer.lst_hours(at);
    let (ra_deg, dec_deg) =
        horizontal_to_equatorial(altitude_deg, azimuth_deg, observer.latitude_deg, lst);
    find_by_radec(ra_deg, dec_deg)
}

/// Full direction lookup: the input direction, the derived RA/Dec and
/// the containing constellation, shaped for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionLookup {
    pub at: String,
    /// (altitude_deg, azimuth_deg) as queried
    pub input_alt_az: (f64, f64),
    /// (ra_deg, dec_deg) derived via the inverse transform
    pub radec_deg: (f64, f64),
    pub iau_constellation: Option<String>,
}

/// Resolves a direction to its IAU constellation with the intermediate
/// equatorial coordinates included.
pub fn find_by_direction(
    observer: &Observer,
    at: DateTime<Utc>,
    azimuth_deg: f64,
    altitude_deg: f64,
) -> DirectionLookup {
    let lst = observer.lst_hours(at);
    let (ra_deg, dec_deg) =
        horizontal_to_equatorial(altitude_deg, azimuth_deg, observer.latitude_deg, lst);
    DirectionLookup {
        at: format_utc(at),
        input_alt_az: (altitude_deg, azimuth_deg),
        radec_deg: (ra_deg, dec_deg),
        iau_constellation: find_by_radec_in(&boundaries(), ra_deg, dec_deg).map(str::to_string),
    }
}
