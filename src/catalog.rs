//! Star catalog and constellation definitions.
//!
//! The star catalog is a JSON array loaded once per process and immutable
//! afterwards. Two key schemas are accepted per entry: `{ra, dec, mag}`
//! and `{ra_hours, dec_deg, magnitude}`. One invalid entry rejects the
//! whole load.
//!
//! Constellation line figures are built in: a curated set of circumpolar
//! constellations whose member names must match the star catalog exactly
//! (lookup is case-sensitive).

use crate::error::{Result, SkyError};
use lazy_static::lazy_static;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// One catalog star. Enrichment fields are optional and omitted from
/// JSON output when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStar {
    pub name: String,
    /// Right ascension in hours, `[0, 24)`
    pub ra_hours: f64,
    /// Declination in degrees, `[-90, 90]`
    pub dec_deg: f64,
    /// Visual magnitude (lower is brighter)
    pub magnitude: f64,
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

impl CatalogStar {
    /// Minimal star with no enrichment fields; handy for tests and
    /// embedders that install a catalog directly.
    pub fn new(name: &str, ra_hours: f64, dec_deg: f64, magnitude: f64) -> Self {
        CatalogStar {
            name: name.to_string(),
            ra_hours,
            dec_deg,
            magnitude,
            distance_ly: None,
            color_temp_k: None,
            bv: None,
            rgb_hex: None,
            aliases: None,
            ids: None,
        }
    }
}

/// A constellation line figure: member star names plus the edge list
/// connecting them. Edges only reference names in `stars`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationDefinition {
    pub name: &'static str,
    pub stars: &'static [&'static str],
    pub edges: &'static [(&'static str, &'static str)],
}

/// Built-in circumpolar constellation figures. Star names must match the
/// catalog; edges trace the classical stick figures.
pub const CONSTELLATIONS: &[ConstellationDefinition] = &[
    ConstellationDefinition {
        name: "Ursa Minor",
        stars: &[
            "Polaris",
            "Yildun",
            "Epsilon UMi",
            "Zeta UMi",
            "Pherkad",
            "Kochab",
        ],
        // Little Dipper handle -> bowl, then close the bowl.
        edges: &[
            ("Polaris", "Yildun"),
            ("Yildun", "Epsilon UMi"),
            ("Epsilon UMi", "Zeta UMi"),
            ("Zeta UMi", "Pherkad"),
            ("Pherkad", "Kochab"),
            ("Kochab", "Polaris"),
            ("Kochab", "Pherkad"), // bowl side
        ],
    },
    ConstellationDefinition {
        name: "Ursa Major",
        stars: &[
            "Dubhe", "Merak", "Phecda", "Megrez", "Alioth", "Mizar", "Alkaid",
        ],
        // Classic Big Dipper outline
        edges: &[
            ("Dubhe", "Merak"),
            ("Merak", "Phecda"),
            ("Phecda", "Megrez"),
            ("Megrez", "Dubhe"), // close bowl
            ("Megrez", "Alioth"),
            ("Alioth", "Mizar"),
            ("Mizar", "Alkaid"),
        ],
    },
    ConstellationDefinition {
        name: "Draco",
        stars: &[
            "Eltanin", "Rastaban", "Grumium", "Kuma", "Edasich", "Thuban", "Gianfar", "Aldhibah",
        ],
        // Serpentine chain from the head across the sky
        edges: &[
            ("Eltanin", "Rastaban"),
            ("Rastaban", "Grumium"),
            ("Grumium", "Kuma"),
            ("Kuma", "Edasich"),
            ("Edasich", "Thuban"),
            ("Thuban", "Gianfar"),
            ("Gianfar", "Aldhibah"),
        ],
    },
    ConstellationDefinition {
        name: "Cepheus",
        stars: &[
            "Alderamin",
            "Alfirk",
            "Delta Cephei",
            "Zeta Cephei",
            "Errai",
        ],
        // House/pentagon shape (closed loop)
        edges: &[
            ("Alderamin", "Alfirk"),
            ("Alfirk", "Delta Cephei"),
            ("Delta Cephei", "Zeta Cephei"),
            ("Zeta Cephei", "Errai"),
            ("Errai", "Alderamin"),
        ],
    },
    ConstellationDefinition {
        name: "Cassiopeia",
        stars: &[
            "Schedar",
            "Caph",
            "Gamma Cassiopeiae",
            "Ruchbah",
            "Segin",
        ],
        // Classic W shape
        edges: &[
            ("Schedar", "Caph"),
            ("Caph", "Gamma Cassiopeiae"),
            ("Gamma Cassiopeiae", "Ruchbah"),
            ("Ruchbah", "Segin"),
        ],
    },
];

/// Lists constellation names in declaration order.
pub fn constellations() -> Vec<&'static str> {
    CONSTELLATIONS.iter().map(|c| c.name).collect()
}

/// Looks up a constellation definition by exact name.
pub fn constellation(name: &str) -> Result<&'static ConstellationDefinition> {
    CONSTELLATIONS
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| SkyError::NotFound {
            name: name.to_string(),
        })
}

fn field<'a>(item: &'a Value, primary: &str, fallback: &str) -> Option<&'a Value> {
    match item.get(primary) {
        Some(v) if !v.is_null() => Some(v),
        _ => match item.get(fallback) {
            Some(v) if !v.is_null() => Some(v),
            _ => None,
        },
    }
}

fn optional_f64(item: &Value, key: &str) -> Option<f64> {
    item.get(key).and_then(Value::as_f64)
}

/// Parses a star catalog from JSON text, accepting both the `{ra, dec,
/// mag}` and the `{ra_hours, dec_deg, magnitude}` key schemas.
///
/// # Errors
///
/// [`SkyError::CatalogInvalid`] when the document is not a JSON array or
/// any entry is missing `name` or a convertible ra/dec/mag triple — the
/// whole load is rejected, never a partial catalog.
pub fn parse_star_catalog(raw: &str) -> Result<Vec<CatalogStar>> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| SkyError::CatalogInvalid {
        reason: format!("JSON inválido: {e}"),
    })?;
    let items = doc.as_array().ok_or_else(|| SkyError::CatalogInvalid {
        reason: "se requiere un arreglo de estrellas".to_string(),
    })?;

    let mut stars = Vec::with_capacity(items.len());
    for item in items {
        let name = match item.get("name").and_then(Value::as_str) {
            Some(n) => n.to_string(),
            None => {
                return Err(SkyError::CatalogInvalid {
                    reason: "se requieren name, y ra/ra_hours, dec/dec_deg, mag/magnitude"
                        .to_string(),
                })
            }
        };
        let ra = field(item, "ra", "ra_hours").and_then(Value::as_f64);
        let dec = field(item, "dec", "dec_deg").and_then(Value::as_f64);
        let mag = field(item, "mag", "magnitude").and_then(Value::as_f64);
        let (ra_hours, dec_deg, magnitude) = match (ra, dec, mag) {
            (Some(r), Some(d), Some(m)) => (r, d, m),
            _ => {
                return Err(SkyError::CatalogInvalid {
                    reason: "se requieren name, y ra/ra_hours, dec/dec_deg, mag/magnitude"
                        .to_string(),
                })
            }
        };

        let aliases = item.get("aliases").and_then(Value::as_array).map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        let ids = item.get("ids").and_then(Value::as_object).map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), n)))
                .collect::<BTreeMap<_, _>>()
        });

        stars.push(CatalogStar {
            name,
            ra_hours,
            dec_deg,
            magnitude,
            distance_ly: optional_f64(item, "distance_ly"),
            color_temp_k: optional_f64(item, "color_temp_K"),
            bv: optional_f64(item, "bv"),
            rgb_hex: item
                .get("rgb_hex")
                .and_then(Value::as_str)
                .map(str::to_string),
            aliases,
            ids,
        });
    }
    Ok(stars)
}

struct CatalogStore {
    path: PathBuf,
    stars: Option<Arc<Vec<CatalogStar>>>,
}

lazy_static! {
    static ref STORE: RwLock<CatalogStore> = RwLock::new(CatalogStore {
        path: PathBuf::from("star_catalog.json"),
        stars: None,
    });
}

/// Points the lazy loader at a catalog file. Only effective before the
/// first [`stars`] call; later calls keep serving the loaded catalog.
pub fn set_catalog_path<P: AsRef<Path>>(path: P) {
    let mut store = STORE.write().expect("catalog store lock poisoned");
    if store.stars.is_none() {
        store.path = path.as_ref().to_path_buf();
    } else {
        warn!("catalog already loaded; ignoring new path");
    }
}

/// Installs an already-built catalog, bypassing file I/O. Intended for
/// embedders and tests.
pub fn install_stars(stars: Vec<CatalogStar>) {
    let mut store = STORE.write().expect("catalog store lock poisoned");
    store.stars = Some(Arc::new(stars));
}

/// Drops the loaded catalog so the next call reloads. Test hook only.
#[doc(hidden)]
pub fn reset_store_for_tests() {
    let mut store = STORE.write().expect("catalog store lock poisoned");
    store.stars = None;
    store.path = PathBuf::from("star_catalog.json");
}

/// Returns the star catalog, loading it from the configured path on
/// first use. The returned list is shared and immutable for the process
/// lifetime.
pub fn stars() -> Result<Arc<Vec<CatalogStar>>> {
    if let Some(stars) = STORE
        .read()
        .expect("catalog store lock poisoned")
        .stars
        .clone()
    {
        return Ok(stars);
    }

    // Load outside the lock, then publish; a racing loader just
    // publishes the same parse result.
    let path = STORE.read().expect("catalog store lock poisoned").path.clone();
    let raw = std::fs::read_to_string(&path).map_err(|e| SkyError::CatalogInvalid {
        reason: format!("no se pudo leer {}: {e}", path.display()),
    })?;
    let parsed = Arc::new(parse_star_catalog(&raw)?);
    debug!("loaded {} catalog stars from {}", parsed.len(), path.display());

    let mut store = STORE.write().expect("catalog store lock poisoned");
    if store.stars.is_none() {
        store.stars = Some(parsed.clone());
    }
    Ok(store.stars.clone().unwrap_or(parsed))
}

/// Case-sensitive catalog lookup by exact name.
pub fn by_name(name: &str) -> Result<Option<CatalogStar>> {
    Ok(stars()?.iter().find(|s| s.name == name).cloned())
}
