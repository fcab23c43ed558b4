//! # sky-math
//!
//! `sky-math` is the sky computation and projection pipeline behind a
//! "what is above me right now" service: it turns catalog entities
//! (stars, planets, Sun, Moon, constellation figures, IAU boundaries)
//! into observer-local horizontal coordinates for an arbitrary UTC
//! instant, projects them through a rectangular field of view into
//! screen pixels, derives discrete events (rises, sets, moon phases)
//! over a time window, and resolves which IAU constellation a sky
//! direction falls in.
//!
//! It includes:
//! - ISO-8601 UTC parsing, Julian Date and sidereal time (Meeus)
//! - RA/DEC ↔ Alt/Az transformations with exact inverse
//! - A validated star catalog with typed enrichment fields
//! - Solar-system body resolution behind a [`SolarSystemProvider`] seam
//! - Constellation frames with FOV clipping and a bounded cache
//! - A pixel projector with roll, edge clipping and label de-collision
//! - IAU constellation lookup by point-in-polygon with RA wrap handling
//!
//! The HTTP layer, catalog file locations and the concrete ephemeris
//! are collaborators around this crate, not part of it.
//!
//! ## Quick Example: where is Polaris right now?
//!
//! ```
//! use chrono::{Utc, TimeZone};
//! use sky_math::{Observer, transforms::equatorial_to_horizontal};
//!
//! let observer = Observer::new(19.4326, -99.1332).unwrap();
//! let at = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
//!
//! let lst = observer.lst_hours(at);
//! let pos = equatorial_to_horizontal(2.5303, 89.2641, observer.latitude_deg, lst);
//!
//! // The pole star sits within a degree of the observer's latitude.
//! assert!((pos.altitude_deg - 19.4326).abs() < 1.0);
//! ```

pub mod bodies;
pub mod catalog;
pub mod constellation;
pub mod error;
pub mod events;
pub mod iau;
pub mod observer;
pub mod provider;
pub mod screen;
pub mod stars;
pub mod time;
pub mod transforms;

pub use bodies::{visible_bodies, visible_bodies_batch, VisibleBody};
pub use catalog::{CatalogStar, ConstellationDefinition};
pub use constellation::{frame, frames, Frame, FramesOptions, FovRect};
pub use error::{Result, SkyError};
pub use events::{astronomy_events, AstronomyEvent};
pub use iau::{find_by_altaz, find_by_radec};
pub use observer::Observer;
pub use provider::{Apparent, Body, HorizonCrossing, MoonPhaseChange, SolarSystemProvider};
pub use screen::{
    constellations_to_screen, labels_for_screen, LabelOptions, ScreenOptions, ScreenPoint,
    ScreenQuery,
};
pub use stars::{sky_positions, visible_stars, visible_stars_batch, StarQuery, VisibleStar};
pub use time::{format_utc, julian_date, parse_utc};

#[cfg(test)]
pub mod tests;
