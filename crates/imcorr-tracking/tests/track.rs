use approx::assert_abs_diff_eq;
use imcorr_tracking::{
    CancelToken, FeatureTracker, GridGeometry, Raster, TrackError, TrackInputs, TrackObserver,
    TrackParams,
};
use std::sync::atomic::{AtomicUsize, Ordering};

const WAVES: [(f64, f64, f64, f64); 8] = [
    (20.0, 0.31, 0.12, 0.0),
    (18.0, -0.09, 0.37, 1.1),
    (16.0, 0.22, 0.27, 2.3),
    (15.0, 0.36, -0.17, 0.7),
    (14.0, 0.05, -0.29, 1.9),
    (12.0, 0.27, -0.33, 0.4),
    (11.0, -0.41, 0.08, 2.8),
    (10.0, 0.18, 0.40, 1.5),
];

fn pattern(x: f64, y: f64) -> f64 {
    128.0
        + WAVES
            .iter()
            .map(|&(a, kx, ky, ph)| a * (kx * x + ky * y + ph).sin())
            .sum::<f64>()
}

/// Epoch pair where every feature moves by `(dx, dy)` cells.
fn shifted_pair(size: usize, dx: f64, dy: f64) -> (Raster, Raster) {
    let earlier = Raster::from_fn(size, size, |x, y| pattern(x as f64, y as f64)).unwrap();
    let later =
        Raster::from_fn(size, size, |x, y| pattern(x as f64 - dx, y as f64 - dy)).unwrap();
    (earlier, later)
}

fn params(spacing: f64) -> TrackParams {
    TrackParams {
        grid_spacing: spacing,
        ..TrackParams::default()
    }
}

#[test]
fn uniform_shift_is_tracked_in_world_units() {
    let (earlier, later) = shifted_pair(160, 2.5, -1.0);
    let geometry = GridGeometry::new(500.0, 800.0, 2.0).unwrap();
    let tracker = FeatureTracker::new(params(40.0)).unwrap();
    let inputs = TrackInputs::new(earlier.view(), later.view(), geometry);

    let out = tracker.track(&inputs).unwrap();
    let s = &out.summary;
    assert_eq!(s.lattice_points, 25);
    assert_eq!(s.visited, 25);
    assert!(!s.cancelled);
    assert_eq!(s.accepted + s.rejected.total(), s.visited);
    assert!(s.accepted >= 20, "{s:?}");

    for (i, r) in out.records.iter().enumerate() {
        assert_eq!(r.id, i);
        assert!(r.accepted);
        assert_abs_diff_eq!(r.dx, 5.0, epsilon = 0.4);
        assert_abs_diff_eq!(r.dy, -2.0, epsilon = 0.4);
        assert_abs_diff_eq!(r.x, 500.0 + 2.0 * r.gx as f64);
        assert_abs_diff_eq!(r.x_target, r.x + r.dx);
        assert!(r.aspect > 90.0 && r.aspect < 180.0);
        assert!(r.strength >= 2.0);
        assert!(r.elevation.is_none());
    }
    assert!(out
        .records
        .windows(2)
        .all(|w| (w[0].gx, w[0].gy) < (w[1].gx, w[1].gy)));
}

#[test]
fn elevation_rasters_add_slope() {
    let (earlier, later) = shifted_pair(128, 3.0, 0.0);
    let dem0 = Raster::from_fn(128, 128, |x, _| 1000.0 + 0.5 * x as f64).unwrap();
    let dem1 = dem0.clone();
    let tracker = FeatureTracker::new(params(30.0)).unwrap();
    let inputs = TrackInputs::new(earlier.view(), later.view(), GridGeometry::default())
        .with_elevation(dem0.view(), dem1.view());

    let out = tracker.track(&inputs).unwrap();
    assert!(!out.records.is_empty());
    for r in &out.records {
        let e = r.elevation.expect("elevation");
        assert_abs_diff_eq!(e.z, 1000.0 + 0.5 * r.gx as f64);
        assert_abs_diff_eq!(e.dz, 0.5 * r.dx, epsilon = 1e-9);
        assert_abs_diff_eq!(e.slope, 0.5_f64.atan().to_degrees(), epsilon = 0.5);
        assert!(e.displacement_3d > r.displacement);
    }
}

#[test]
fn no_data_points_are_skipped() {
    let (mut earlier, later) = shifted_pair(128, 1.0, 1.0);
    for y in 0..40 {
        for x in 0..40 {
            earlier.data[y * 128 + x] = -9999.0;
        }
    }
    let earlier = earlier.with_no_data(Some(-9999.0));
    let tracker = FeatureTracker::new(params(16.0)).unwrap();
    let out = tracker
        .track(&TrackInputs::new(earlier.view(), later.view(), GridGeometry::default()))
        .unwrap();
    // reference windows of the four points with gx, gy <= 47 reach into the hole
    assert_eq!(out.summary.rejected.no_data, 4);
    assert!(out.records.iter().all(|r| r.gx > 47 || r.gy > 47));
}

#[test]
fn records_match_a_sequential_walk_of_the_lattice() {
    let (mut earlier, later) = shifted_pair(160, 1.5, -0.5);
    for y in 50..90 {
        for x in 60..100 {
            earlier.data[y * 160 + x] = -9999.0;
        }
    }
    let earlier = earlier.with_no_data(Some(-9999.0));
    let geometry = GridGeometry::default();
    let tracker = FeatureTracker::new(params(12.0)).unwrap();
    let inputs = TrackInputs::new(earlier.view(), later.view(), geometry);
    let out = tracker.track(&inputs).unwrap();

    let lattice = tracker.lattice(160, 160, &geometry).unwrap();
    let expected: Vec<_> = lattice
        .points()
        .filter_map(|(gx, gy)| {
            let m = tracker
                .matcher()
                .match_at(&inputs.earlier, &inputs.later, gx, gy)
                .ok()?;
            Some((gx, gy, m))
        })
        .collect();

    assert!(out.summary.rejected.no_data > 0);
    assert_eq!(out.summary.visited, lattice.len());
    assert_eq!(out.records.len(), expected.len());
    for (i, (r, (gx, gy, m))) in out.records.iter().zip(&expected).enumerate() {
        assert_eq!(r.id, i);
        assert_eq!((r.gx, r.gy), (*gx, *gy));
        assert_eq!((r.dx, r.dy), (m.dx, m.dy));
        assert_eq!(r.strength, m.strength);
    }
}

#[derive(Default)]
struct StopAfter {
    limit: usize,
    seen: AtomicUsize,
}

impl TrackObserver for StopAfter {
    fn on_progress(&self, _done: usize, _total: usize) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    fn should_stop(&self) -> bool {
        self.seen.load(Ordering::Relaxed) >= self.limit
    }
}

#[test]
fn observer_sees_every_point() {
    let (earlier, later) = shifted_pair(96, 0.0, 0.0);
    let tracker = FeatureTracker::new(params(8.0)).unwrap();
    let observer = StopAfter {
        limit: usize::MAX,
        ..StopAfter::default()
    };
    let out = tracker
        .track_with_observer(
            &TrackInputs::new(earlier.view(), later.view(), GridGeometry::default()),
            &observer,
        )
        .unwrap();
    assert_eq!(observer.seen.load(Ordering::Relaxed), out.summary.lattice_points);
    assert_eq!(out.summary.visited, out.summary.lattice_points);
}

#[test]
fn stop_request_ends_the_run_early() {
    let (earlier, later) = shifted_pair(128, 0.0, 0.0);
    let tracker = FeatureTracker::new(params(4.0)).unwrap();
    let inputs = TrackInputs::new(earlier.view(), later.view(), GridGeometry::default());

    let observer = StopAfter {
        limit: 3,
        ..StopAfter::default()
    };
    let out = tracker.track_with_observer(&inputs, &observer).unwrap();
    assert!(out.summary.cancelled);
    assert!(out.summary.visited >= 3);
    assert!(out.summary.visited < out.summary.lattice_points);

    let token = CancelToken::new();
    token.cancel();
    let out = tracker.track_with_observer(&inputs, &token).unwrap();
    assert!(out.summary.cancelled);
    assert_eq!(out.summary.visited, 0);
    assert!(out.records.is_empty());
}

#[test]
fn setup_errors() {
    let a = Raster::from_fn(80, 80, |_, _| 0.0).unwrap();
    let b = Raster::from_fn(80, 81, |_, _| 0.0).unwrap();
    let small = Raster::from_fn(40, 40, |_, _| 0.0).unwrap();
    let g = GridGeometry::default();

    assert_eq!(
        FeatureTracker::new(params(0.0)).err(),
        Some(TrackError::InvalidGridSpacing(0.0))
    );

    let tracker = FeatureTracker::new(params(10.0)).unwrap();
    assert!(matches!(
        tracker.track(&TrackInputs::new(a.view(), b.view(), g)),
        Err(TrackError::GeometryMismatch { .. })
    ));
    assert!(matches!(
        tracker.track(&TrackInputs::new(small.view(), small.view(), g)),
        Err(TrackError::RasterTooSmall { chip: 64, .. })
    ));
    assert!(matches!(
        tracker.track(&TrackInputs::new(a.view(), a.view(), g).with_elevation(a.view(), b.view())),
        Err(TrackError::ElevationMismatch { .. })
    ));
    let bad = GridGeometry {
        cell_size: -1.0,
        ..g
    };
    assert!(matches!(
        tracker.track(&TrackInputs::new(a.view(), a.view(), bad)),
        Err(TrackError::Geometry(_))
    ));
}
