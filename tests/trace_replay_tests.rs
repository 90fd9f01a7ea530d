use fusion_compass::{
    Compass, CompassSettings, HeadingEvent, ManualClock, ManualSource, RawSample, SensorKind,
};
use nalgebra::Vector3;
use serde::Deserialize;
use std::error::Error;
use std::sync::{Arc, mpsc};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TraceRow {
    #[serde(rename = "Time (s)")]
    time: f64,
    #[serde(rename = "Sensor")]
    sensor: String,
    #[serde(rename = "X")]
    x: f32,
    #[serde(rename = "Y")]
    y: f32,
    #[serde(rename = "Z")]
    z: f32,
}

/// Device lies flat and is turned to a new heading every two seconds
const SEGMENTS: [(f64, f64); 3] = [(2.0, 0.0), (4.0, 90.0), (6.0, 225.0)];

fn load_trace() -> Result<Vec<RawSample>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path("testdata/compass_trace.csv")?;
    let mut samples = Vec::new();

    for result in reader.deserialize() {
        let row: TraceRow = result?;
        let kind = match row.sensor.as_str() {
            "accelerometer" => SensorKind::Gravity,
            "magnetometer" => SensorKind::MagneticField,
            other => return Err(format!("unknown sensor {}", other).into()),
        };
        samples.push(RawSample::new(
            kind,
            Vector3::new(row.x, row.y, row.z),
            Duration::from_secs_f64(row.time),
        ));
    }

    Ok(samples)
}

/// Replay the trace against a manual clock and collect (time, heading) pairs
fn replay(samples: &[RawSample], settings: CompassSettings) -> Vec<(Duration, f64)> {
    let clock = ManualClock::new();
    let source = ManualSource::new(true);
    let mut compass = Compass::with_clock(source.clone(), settings, Arc::new(clock.clone()));
    let (tx, rx) = mpsc::channel::<HeadingEvent>();
    compass.listen(tx).unwrap();

    let mut headings = Vec::new();
    for sample in samples {
        clock.set_elapsed(sample.timestamp);
        source.push_sample(*sample);
        for event in rx.try_iter() {
            headings.push((sample.timestamp, event.unwrap().heading));
        }
    }

    headings
}

fn angle_error(a: f64, b: f64) -> f64 {
    let difference = (a - b).abs() % 360.0;
    difference.min(360.0 - difference)
}

#[test]
fn test_trace_headings_settle_on_each_segment() -> Result<(), Box<dyn Error>> {
    let samples = load_trace()?;
    assert_eq!(samples.len(), 1200);

    let headings = replay(&samples, CompassSettings::default());

    for (end, expected) in SEGMENTS {
        let window_start = Duration::from_secs_f64(end - 0.25);
        let window_end = Duration::from_secs_f64(end);
        let window: Vec<_> = headings
            .iter()
            .filter(|(at, _)| *at >= window_start && *at < window_end)
            .collect();

        assert!(!window.is_empty(), "no readings before {}s", end);
        for (at, heading) in window {
            let error = angle_error(*heading, expected);
            assert!(
                error < 1.0,
                "heading {:.2}° at {:?}, expected {:.1}° (error {:.2}°)",
                heading,
                at,
                expected,
                error
            );
        }
    }

    Ok(())
}

#[test]
fn test_trace_emission_rate() -> Result<(), Box<dyn Error>> {
    let samples = load_trace()?;
    let headings = replay(&samples, CompassSettings::default());

    // Six seconds of data at one reading per 32 ms at most
    let bound = (6000.0f64 / 32.0).ceil() as usize + 1;
    assert!(headings.len() <= bound, "{} readings exceed {}", headings.len(), bound);
    assert!(headings.len() > bound / 2, "only {} readings", headings.len());

    for pair in headings.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= Duration::from_millis(32));
    }

    Ok(())
}

#[test]
fn test_trace_replay_is_deterministic() -> Result<(), Box<dyn Error>> {
    let samples = load_trace()?;

    let first = replay(&samples, CompassSettings::default());
    let second = replay(&samples, CompassSettings::default());
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_lighter_smoothing_settles_faster() -> Result<(), Box<dyn Error>> {
    let samples = load_trace()?;
    let responsive = CompassSettings {
        smoothing_factor: 0.8,
        ..Default::default()
    };

    let settle_time = |headings: &[(Duration, f64)]| {
        // First reading after the turn to east that is within 2° of it
        headings
            .iter()
            .find(|(at, heading)| {
                *at >= Duration::from_secs(2) && angle_error(*heading, 90.0) < 2.0
            })
            .map(|(at, _)| *at)
    };

    let slow = settle_time(&replay(&samples, CompassSettings::default())).unwrap();
    let fast = settle_time(&replay(&samples, responsive)).unwrap();
    assert!(fast < slow, "fast {:?} should settle before slow {:?}", fast, slow);

    Ok(())
}
