//! Screen projection: alt-az directions through a rectangular FOV and
//! device orientation onto pixels, plus edge clipping and label
//! de-collision for AR overlays.
//!
//! Star positions come from the constellation engine, so the screen and
//! label operations share its bounded frame cache (`cache_bucket_s`
//! buckets the instant exactly as it does for raw frames).
//!
//! Screen origin is top-left, +x right, +y down. The vertical NDC axis
//! is negated so "up in the sky" stays "up on screen" before roll.

use crate::catalog::CatalogStar;
use crate::constellation::{frames, frames_in, Frame, FramesOptions};
use crate::error::{Result, SkyError};
use crate::observer::Observer;
use crate::transforms::{azimuth_delta_deg, clip_segment, normalize_degrees_360};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Projection geometry and orientation.
///
/// The FOV center is either explicit (`fov_center_az_deg` /
/// `fov_center_alt_deg`) or derived from device sensors (`yaw_deg` /
/// `pitch_deg` plus the heading/pitch offsets). Resolution fails with
/// `BadInput` when neither is available for an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenOptions {
    pub fov_center_az_deg: Option<f64>,
    pub fov_center_alt_deg: Option<f64>,
    pub yaw_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
    /// Compass correction added to yaw
    pub heading_offset_deg: f64,
    /// Correction added to pitch
    pub pitch_offset_deg: f64,
    /// Screen rotation, applied as a rotation by `-roll_deg` in NDC
    pub roll_deg: f64,
    pub fov_h_deg: f64,
    pub fov_v_deg: f64,
    pub width_px: f64,
    pub height_px: f64,
    /// Keep stars outside the FOV in the output (marked `in_fov: false`)
    pub include_offscreen: bool,
    /// Clip edge segments to the screen rectangle
    pub clip_edges_to_fov: bool,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        ScreenOptions {
            fov_center_az_deg: None,
            fov_center_alt_deg: None,
            yaw_deg: None,
            pitch_deg: None,
            heading_offset_deg: 0.0,
            pitch_offset_deg: 0.0,
            roll_deg: 0.0,
            fov_h_deg: 60.0,
            fov_v_deg: 40.0,
            width_px: 1080.0,
            height_px: 1920.0,
            include_offscreen: false,
            clip_edges_to_fov: true,
        }
    }
}

impl ScreenOptions {
    /// Resolves the FOV center, favoring sensor yaw/pitch over explicit
    /// center values. Azimuth is wrapped mod 360 and altitude clamped
    /// to ±90.
    pub fn resolve_center(&self) -> Result<(f64, f64)> {
        let az = match (self.yaw_deg, self.fov_center_az_deg) {
            (Some(yaw), _) => normalize_degrees_360(yaw + self.heading_offset_deg),
            (None, Some(az)) => normalize_degrees_360(az),
            (None, None) => {
                return Err(SkyError::BadInput {
                    detail: "Requiere fov_center_az_deg o yaw_deg".to_string(),
                })
            }
        };
        let alt = match (self.pitch_deg, self.fov_center_alt_deg) {
            (Some(pitch), _) => (pitch + self.pitch_offset_deg).clamp(-90.0, 90.0),
            (None, Some(alt)) => alt.clamp(-90.0, 90.0),
            (None, None) => {
                return Err(SkyError::BadInput {
                    detail: "Requiere fov_center_alt_deg o pitch_deg".to_string(),
                })
            }
        };
        Ok((az, alt))
    }
}

/// A projected sky direction in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x_px: f64,
    pub y_px: f64,
    /// Inside the angular FOV rectangle
    pub in_fov: bool,
    /// Inside the pixel rectangle after roll
    pub on_screen: bool,
}

/// Projects one alt-az direction through the FOV onto the screen.
pub fn project(
    altitude_deg: f64,
    azimuth_deg: f64,
    center_az_deg: f64,
    center_alt_deg: f64,
    options: &ScreenOptions,
) -> ScreenPoint {
    let daz = azimuth_delta_deg(center_az_deg, azimuth_deg);
    let dalt = altitude_deg - center_alt_deg;
    let in_fov = daz.abs() <= options.fov_h_deg / 2.0 && dalt.abs() <= options.fov_v_deg / 2.0;

    let u = daz / (options.fov_h_deg / 2.0);
    let v = -dalt / (options.fov_v_deg / 2.0);

    let roll = options.roll_deg.to_radians();
    let (u, v) = (
        u * roll.cos() + v * roll.sin(),
        -u * roll.sin() + v * roll.cos(),
    );

    let x_px = (u * 0.5 + 0.5) * options.width_px;
    let y_px = (v * 0.5 + 0.5) * options.height_px;
    let on_screen =
        x_px >= 0.0 && x_px <= options.width_px && y_px >= 0.0 && y_px <= options.height_px;

    ScreenPoint {
        x_px,
        y_px,
        in_fov,
        on_screen,
    }
}

/// A constellation star placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenStar {
    pub name: String,
    pub magnitude: f64,
    pub x_px: f64,
    pub y_px: f64,
    pub in_fov: bool,
    pub on_screen: bool,
}

/// A constellation edge as a pixel segment (clipped when requested).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenEdge {
    pub from: String,
    pub to: String,
    pub x1_px: f64,
    pub y1_px: f64,
    pub x2_px: f64,
    pub y2_px: f64,
}

/// One constellation projected onto the screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenFrame {
    pub name: String,
    pub stars: Vec<ScreenStar>,
    pub edges: Vec<ScreenEdge>,
}

/// Constellation selection for the screen and label operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenQuery {
    pub names: Option<Vec<String>>,
    /// Threshold for the below-horizon frame test
    pub min_altitude_deg: f64,
    pub include_below_horizon: bool,
    /// Instant quantization for the shared frame cache (clamped >= 1)
    pub cache_bucket_s: u64,
}

impl Default for ScreenQuery {
    fn default() -> Self {
        ScreenQuery {
            names: None,
            min_altitude_deg: 0.0,
            include_below_horizon: false,
            cache_bucket_s: 1,
        }
    }
}

/// Frame selection feeding the projector: plain alt-az frames, no FOV
/// clipping or dim styling (those concerns live in pixel space here).
fn source_options(query: &ScreenQuery) -> FramesOptions {
    FramesOptions {
        min_altitude_deg: query.min_altitude_deg,
        names: query.names.clone(),
        include_below_horizon: query.include_below_horizon,
        fov: None,
        clip_edges_to_fov: false,
        dim_below_horizon: false,
        cache_bucket_s: query.cache_bucket_s,
    }
}

fn project_frame(
    frame: &Frame,
    center_az: f64,
    center_alt: f64,
    options: &ScreenOptions,
) -> ScreenFrame {
    let projected: Vec<(&str, f64, ScreenPoint)> = frame
        .stars
        .iter()
        .map(|s| {
            (
                s.name.as_str(),
                s.magnitude,
                project(s.altitude_deg, s.azimuth_deg, center_az, center_alt, options),
            )
        })
        .collect();

    let stars: Vec<ScreenStar> = projected
        .iter()
        .filter(|(_, _, p)| p.in_fov || options.include_offscreen)
        .map(|(name, magnitude, p)| ScreenStar {
            name: name.to_string(),
            magnitude: *magnitude,
            x_px: p.x_px,
            y_px: p.y_px,
            in_fov: p.in_fov,
            on_screen: p.on_screen,
        })
        .collect();

    // Edge endpoints come from the unfiltered projections; an edge whose
    // star never made it into the catalog has no endpoint and is dropped.
    let edges: Vec<ScreenEdge> = frame
        .edges
        .iter()
        .filter_map(|(a, b)| {
            let pa = projected.iter().find(|(n, _, _)| *n == a.as_str())?.2;
            let pb = projected.iter().find(|(n, _, _)| *n == b.as_str())?.2;
            let (x1, y1, x2, y2) = if options.clip_edges_to_fov && !(pa.on_screen && pb.on_screen)
            {
                clip_segment(
                    pa.x_px,
                    pa.y_px,
                    pb.x_px,
                    pb.y_px,
                    0.0,
                    0.0,
                    options.width_px,
                    options.height_px,
                )?
            } else {
                (pa.x_px, pa.y_px, pb.x_px, pb.y_px)
            };
            Some(ScreenEdge {
                from: a.clone(),
                to: b.clone(),
                x1_px: x1,
                y1_px: y1,
                x2_px: x2,
                y2_px: y2,
            })
        })
        .collect();

    ScreenFrame {
        name: frame.name.clone(),
        stars,
        edges,
    }
}

/// Projects the selected constellations onto the screen, over an
/// explicit star list (uncached).
///
/// Stars outside the FOV are dropped unless `include_offscreen`. With
/// `clip_edges_to_fov` a segment leaving the pixel rectangle is clipped
/// (Liang–Barsky) and dropped entirely when it misses the rectangle.
pub fn constellations_to_screen_in(
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
    query: &ScreenQuery,
    options: &ScreenOptions,
) -> Result<Vec<ScreenFrame>> {
    let (center_az, center_alt) = options.resolve_center()?;
    Ok(frames_in(stars, observer, at, &source_options(query))
        .iter()
        .map(|f| project_frame(f, center_az, center_alt, options))
        .collect())
}

/// [`constellations_to_screen_in`] over the process catalog, served
/// through the shared frame cache.
pub fn constellations_to_screen(
    observer: &Observer,
    at: DateTime<Utc>,
    query: &ScreenQuery,
    options: &ScreenOptions,
) -> Result<Vec<ScreenFrame>> {
    let (center_az, center_alt) = options.resolve_center()?;
    Ok(frames(observer, at, &source_options(query))?
        .iter()
        .map(|f| project_frame(f, center_az, center_alt, options))
        .collect())
}

/// A star label placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenLabel {
    pub name: String,
    pub magnitude: f64,
    pub x_px: f64,
    pub y_px: f64,
}

/// Label-picking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOptions {
    pub max_labels: usize,
    /// Only label stars at least this bright
    pub max_magnitude: f64,
    /// Minimum pixel distance between any two labels
    pub min_separation_px: f64,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            max_labels: 20,
            max_magnitude: 4.0,
            min_separation_px: 24.0,
        }
    }
}

fn pick_labels(
    source: &[Frame],
    center_az: f64,
    center_alt: f64,
    options: &ScreenOptions,
    labels: &LabelOptions,
) -> Vec<ScreenLabel> {
    let mut candidates: Vec<ScreenLabel> = source
        .iter()
        .flat_map(|f| &f.stars)
        .filter_map(|s| {
            if s.magnitude > labels.max_magnitude {
                return None;
            }
            let p = project(s.altitude_deg, s.azimuth_deg, center_az, center_alt, options);
            if !p.on_screen {
                return None;
            }
            Some(ScreenLabel {
                name: s.name.clone(),
                magnitude: s.magnitude,
                x_px: p.x_px,
                y_px: p.y_px,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.magnitude
            .total_cmp(&b.magnitude)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut accepted: Vec<ScreenLabel> = Vec::new();
    for candidate in candidates {
        if accepted.len() >= labels.max_labels {
            break;
        }
        let clear = accepted.iter().all(|kept| {
            let dx = kept.x_px - candidate.x_px;
            let dy = kept.y_px - candidate.y_px;
            (dx * dx + dy * dy).sqrt() >= labels.min_separation_px
        });
        if clear {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Greedy label selection: on-screen stars up to `max_magnitude`,
/// brightest first (name ascending on ties), rejecting any candidate
/// closer than `min_separation_px` to an accepted label, stopping at
/// `max_labels`. Uncached, over an explicit star list.
pub fn labels_for_screen_in(
    stars: &[CatalogStar],
    observer: &Observer,
    at: DateTime<Utc>,
    query: &ScreenQuery,
    options: &ScreenOptions,
    labels: &LabelOptions,
) -> Result<Vec<ScreenLabel>> {
    let (center_az, center_alt) = options.resolve_center()?;
    let source = frames_in(stars, observer, at, &source_options(query));
    Ok(pick_labels(&source, center_az, center_alt, options, labels))
}

/// [`labels_for_screen_in`] over the process catalog, served through
/// the shared frame cache.
pub fn labels_for_screen(
    observer: &Observer,
    at: DateTime<Utc>,
    query: &ScreenQuery,
    options: &ScreenOptions,
    labels: &LabelOptions,
) -> Result<Vec<ScreenLabel>> {
    let (center_az, center_alt) = options.resolve_center()?;
    let source = frames(observer, at, &source_options(query))?;
    Ok(pick_labels(&source, center_az, center_alt, options, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_options() -> ScreenOptions {
        ScreenOptions {
            fov_center_az_deg: Some(180.0),
            fov_center_alt_deg: Some(45.0),
            fov_h_deg: 60.0,
            fov_v_deg: 40.0,
            width_px: 1000.0,
            height_px: 500.0,
            ..ScreenOptions::default()
        }
    }

    #[test]
    fn test_center_maps_to_screen_center() {
        let options = centered_options();
        let p = project(45.0, 180.0, 180.0, 45.0, &options);
        assert!((p.x_px - 500.0).abs() < 1e-9);
        assert!((p.y_px - 250.0).abs() < 1e-9);
        assert!(p.in_fov && p.on_screen);
    }

    #[test]
    fn test_up_on_sky_is_up_on_screen() {
        let options = centered_options();
        let above = project(55.0, 180.0, 180.0, 45.0, &options);
        // +y is down, so higher altitude means smaller y.
        assert!(above.y_px < 250.0);
    }

    #[test]
    fn test_azimuth_wrap_across_north() {
        let options = ScreenOptions {
            fov_center_az_deg: Some(0.1),
            fov_center_alt_deg: Some(45.0),
            fov_h_deg: 1.0,
            fov_v_deg: 1.0,
            ..centered_options()
        };
        let p = project(45.0, 359.9, 0.1, 45.0, &options);
        assert!(p.in_fov);
        assert!(p.x_px < 500.0); // west of center
    }

    #[test]
    fn test_roll_rotates_offsets() {
        let options = ScreenOptions {
            roll_deg: 90.0,
            ..centered_options()
        };
        // A star straight above the center moves onto the horizontal
        // axis after rolling the device by 90 degrees.
        let p = project(55.0, 180.0, 180.0, 45.0, &options);
        assert!((p.y_px - 250.0).abs() < 1e-6);
        assert!((p.x_px - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_center_requires_one_of_each_axis() {
        let mut options = ScreenOptions {
            fov_center_az_deg: None,
            fov_center_alt_deg: None,
            ..ScreenOptions::default()
        };
        assert!(matches!(
            options.resolve_center(),
            Err(SkyError::BadInput { .. })
        ));
        options.yaw_deg = Some(90.0);
        assert!(options.resolve_center().is_err());
        options.pitch_deg = Some(30.0);
        assert_eq!(options.resolve_center().unwrap(), (90.0, 30.0));
    }

    #[test]
    fn test_resolve_center_sensor_offsets() {
        let options = ScreenOptions {
            yaw_deg: Some(350.0),
            pitch_deg: Some(85.0),
            heading_offset_deg: 20.0,
            pitch_offset_deg: 10.0,
            ..ScreenOptions::default()
        };
        let (az, alt) = options.resolve_center().unwrap();
        assert!((az - 10.0).abs() < 1e-9);
        assert!((alt - 90.0).abs() < 1e-9); // clamped
    }
}
