use crate::catalog;
use crate::observer::Observer;
use crate::stars::{sky_positions, visible_stars_in, StarQuery, StarSort};
use crate::tests::support::{bright_catalog, MockProvider, MOCK_APPARENT_OFFSET_DEG, STORE_LOCK};
use chrono::{TimeZone, Utc};

#[test]
fn test_three_brightest_under_max_mag() {
    // Mirrors a production query: lat 19.4326, lon -99.1332, max_mag 1,
    // limit 3 -> exactly three stars, magnitude ascending.
    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let query = StarQuery {
        max_magnitude: Some(1.0),
        limit: Some(3),
        ..StarQuery::default()
    };
    let out = visible_stars_in(&bright_catalog(), &observer, at, &query);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|s| s.magnitude <= 1.0));
    assert!(out.windows(2).all(|w| {
        w[0].magnitude < w[1].magnitude
            || (w[0].magnitude == w[1].magnitude && w[0].name < w[1].name)
    }));
}

#[test]
fn test_altitude_sort_descends_with_azimuth_tiebreak() {
    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let query = StarQuery {
        sort: StarSort::Altitude,
        ..StarQuery::default()
    };
    let out = visible_stars_in(&bright_catalog(), &observer, at, &query);
    assert!(out.windows(2).all(|w| {
        w[0].altitude_deg > w[1].altitude_deg
            || (w[0].altitude_deg == w[1].altitude_deg
                && w[0].azimuth_deg <= w[1].azimuth_deg)
    }));
}

#[test]
fn test_positions_stay_in_range_everywhere() {
    let at = Utc.with_ymd_and_hms(2025, 7, 1, 10, 30, 0).unwrap();
    for (lat, lon) in [(89.9, 0.0), (-89.9, 120.0), (0.0, 180.0), (19.4, -99.1)] {
        let observer = Observer::new(lat, lon).unwrap();
        let out = visible_stars_in(&bright_catalog(), &observer, at, &StarQuery::default());
        assert_eq!(out.len(), bright_catalog().len()); // min_alt -90 keeps all
        for star in out {
            assert!(star.altitude_deg >= -90.0 && star.altitude_deg <= 90.0);
            assert!(star.azimuth_deg >= 0.0 && star.azimuth_deg < 360.0);
        }
    }
}

#[test]
fn test_accurate_path_differs_from_fast_path_slightly() {
    let _guard = STORE_LOCK.lock().unwrap();
    catalog::install_stars(bright_catalog());

    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let provider = MockProvider::default();

    let fast = visible_stars_in(&bright_catalog(), &observer, at, &StarQuery::default());
    let accurate = sky_positions(&provider, &observer, at, &StarQuery::default()).unwrap();

    assert_eq!(fast.len(), accurate.len());
    let fast_sirius = fast.iter().find(|s| s.name == "Sirius").unwrap();
    let accurate_sirius = accurate.iter().find(|s| s.name == "Sirius").unwrap();
    let delta = accurate_sirius.altitude_deg - fast_sirius.altitude_deg;
    assert!((delta - MOCK_APPARENT_OFFSET_DEG).abs() < 1e-9);

    catalog::reset_store_for_tests();
}

#[test]
fn test_batch_empty_when_end_not_after_start() {
    let _guard = STORE_LOCK.lock().unwrap();
    catalog::install_stars(bright_catalog());

    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 1, 10, 6, 0, 0).unwrap();
    let frames =
        crate::stars::visible_stars_batch(&observer, t0, t0, 1.0, &StarQuery::default()).unwrap();
    assert!(frames.is_empty());

    catalog::reset_store_for_tests();
}

#[test]
fn test_batch_frames_tagged_with_instants() {
    let _guard = STORE_LOCK.lock().unwrap();
    catalog::install_stars(bright_catalog());

    let observer = Observer::new(19.4326, -99.1332).unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2025, 1, 10, 4, 0, 0).unwrap();
    let query = StarQuery {
        max_magnitude: Some(2.0),
        limit: Some(5),
        ..StarQuery::default()
    };
    let frames = crate::stars::visible_stars_batch(&observer, t0, t1, 2.0, &query).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].at, "2025-01-10T00:00:00Z");
    assert_eq!(frames[1].at, "2025-01-10T02:00:00Z");
    for frame in &frames {
        assert!(frame.stars.len() <= 5);
        assert!(frame.stars.iter().all(|s| s.magnitude <= 2.0));
    }

    catalog::reset_store_for_tests();
}
