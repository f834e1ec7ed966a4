use std::ops::ControlFlow;
use std::sync::Arc;

use flyback_core::{heading_angle, RotationPhase, ALL_EVENTS};
use flyback_replay::{render_svg, PlaybackConfig, ReplayError, Session, TelemetryStore};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/booster_flight.csv");

fn seeded() -> PlaybackConfig {
    PlaybackConfig {
        seed: Some(42),
        ..PlaybackConfig::default()
    }
}

#[test]
fn test_three_row_table_ends_on_plot_corner() {
    let csv = "\
Time [s],Smoothed altitude [km],Downrange distance [km],Horizontal speed [m/s],Vertical speed [m/s],Smoothed speed [m/s],Mach number,Dynamic pressure [kPa]
0,1,1,10,10,14,0.1,1
1,2,2,10,10,14,0.1,1
2,3,3,10,10,14,0.1,1
";
    let store = Arc::new(TelemetryStore::from_reader(csv.as_bytes()).unwrap());
    let config = seeded();
    let mut session = Session::new(store, config.clone()).unwrap();

    let frames = session.collect_frames();
    assert_eq!(frames.len(), 2);

    let last = frames.last().unwrap();
    assert_eq!(last.index, 2);
    assert!((last.position.x - config.width as f64 * 0.9).abs() < 1e-9);
    assert!((last.position.y - config.height as f64 * 0.1).abs() < 1e-9);

    // Terminal ticks keep reporting the last sample
    for _ in 0..3 {
        assert_eq!(session.tick().sample, last.sample);
    }
}

#[test]
fn test_full_flight_replay() {
    let store = Arc::new(TelemetryStore::from_path(FIXTURE).unwrap());
    assert_eq!(store.len(), 421);

    // Blank dynamic pressure cell coerces to zero
    assert_eq!(store.get(5).unwrap().dynamic_pressure, 0.0);

    let mut session = Session::new(store.clone(), seeded()).unwrap();
    let frames = session.collect_frames();
    assert_eq!(frames.len(), 420);
    assert_eq!(frames.last().unwrap().index, 420);

    // Frames start at sample 1, so frame i shows sample i + 1
    let before = &frames[166];
    assert_eq!(before.sample.time, 167.0);
    assert_eq!(before.rotation, RotationPhase::Idle);
    assert_eq!(before.displayed_angle, 0.0);

    let at_sep = &frames[167];
    assert_eq!(at_sep.sample.time, 168.0);
    assert_eq!(at_sep.rotation, RotationPhase::Easing);
    assert!(!at_sep.inverted);
    assert!(frames[168].inverted);

    let sep = store.get(168).unwrap();
    let target = heading_angle(sep.horizontal_speed, sep.vertical_speed) + 180.0;
    let last = frames.last().unwrap();
    assert_eq!(last.rotation, RotationPhase::Idle);
    assert_eq!(last.displayed_angle, target);

    // Particle count tracks speed
    for frame in &frames {
        assert_eq!(frame.particles.len(), (frame.sample.speed / 10.0).floor() as usize);
    }
}

#[test]
fn test_overlay_marks_every_event() {
    let store = Arc::new(TelemetryStore::from_path(FIXTURE).unwrap());
    let session = Session::new(store, seeded()).unwrap();
    let overlay = session.overlay();

    assert_eq!(overlay.points.len(), 421);
    assert_eq!(overlay.event_markers.len(), ALL_EVENTS.len());
    for (marker, event) in overlay.event_markers.iter().zip(ALL_EVENTS) {
        assert_eq!(marker.label, event.label());
        assert_eq!(marker.sample_index, event.time() as usize);
    }
    // 0, 60, ..., 420
    assert_eq!(overlay.time_markers.len(), 8);
}

#[test]
fn test_renders_svg_frames_until_stopped() {
    let store = Arc::new(TelemetryStore::from_path(FIXTURE).unwrap());
    let mut session = Session::new(store, seeded()).unwrap();
    let config = session.config().clone();

    let mut docs = Vec::new();
    let summary = session
        .run::<(), _>(|overlay, frame| {
            docs.push(render_svg(overlay, frame, &config));
            Ok(if docs.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })
        .unwrap();

    assert!(summary.stopped_early);
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|d| d.starts_with("<svg ") && d.contains("Stage sep")));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = TelemetryStore::from_path("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
}
