//! Heading replay and visualisation
//!
//! Replays the recorded accelerometer and magnetometer trace through the
//! compass, once with the default smoothing and once with a lighter filter,
//! and plots both heading streams against the raw, unsmoothed heading.
//!
//! Run with: `cargo run --example heading_plot`

use fusion_compass::{
    Compass, CompassSettings, HeadingEvent, ManualClock, ManualSource, RawSample, RotationFrame,
    SensorKind,
};
use nalgebra::Vector3;
use plotters::prelude::*;
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

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut reader = csv::Reader::from_path("testdata/compass_trace.csv")?;
    let mut samples = Vec::new();
    for result in reader.deserialize() {
        let row: TraceRow = result?;
        let kind = match row.sensor.as_str() {
            "accelerometer" => SensorKind::Gravity,
            "magnetometer" => SensorKind::MagneticField,
            _ => continue,
        };
        samples.push(RawSample::new(
            kind,
            Vector3::new(row.x, row.y, row.z),
            Duration::from_secs_f64(row.time),
        ));
    }
    println!("Loaded {} samples", samples.len());

    let smoothed = replay(&samples, CompassSettings::default())?;
    let responsive = replay(
        &samples,
        CompassSettings {
            smoothing_factor: 0.8,
            ..Default::default()
        },
    )?;
    let raw = raw_headings(&samples);

    println!(
        "Readings: {} (default smoothing), {} (light smoothing)",
        smoothed.len(),
        responsive.len()
    );

    create_plot(&raw, &smoothed, &responsive)?;
    println!("Plot saved to heading_plot.png");

    Ok(())
}

/// Replay samples through a compass driven by the sample timestamps
fn replay(
    samples: &[RawSample],
    settings: CompassSettings,
) -> Result<Vec<(f64, f64)>, Box<dyn Error>> {
    let clock = ManualClock::new();
    let source = ManualSource::new(true);
    let mut compass = Compass::with_clock(source.clone(), settings, Arc::new(clock.clone()));
    let (tx, rx) = mpsc::channel::<HeadingEvent>();
    compass.listen(tx)?;

    let mut headings = Vec::new();
    for sample in samples {
        clock.set_elapsed(sample.timestamp);
        source.push_sample(*sample);
        for event in rx.try_iter() {
            headings.push((sample.timestamp.as_secs_f64(), event?.heading));
        }
    }

    Ok(headings)
}

/// Heading from the latest raw pair, without smoothing or throttling
fn raw_headings(samples: &[RawSample]) -> Vec<(f64, f64)> {
    let mut gravity = None;
    let mut magnetic = None;
    let mut headings = Vec::new();

    for sample in samples {
        match sample.kind {
            SensorKind::Gravity => gravity = Some(sample.vector),
            SensorKind::MagneticField => magnetic = Some(sample.vector),
        }
        if let (Some(g), Some(m)) = (gravity, magnetic) {
            if let Some(frame) = RotationFrame::from_gravity_and_magnetic(g, m) {
                headings.push((sample.timestamp.as_secs_f64(), frame.heading_degrees()));
            }
        }
    }

    headings
}

fn create_plot(
    raw: &[(f64, f64)],
    smoothed: &[(f64, f64)],
    responsive: &[(f64, f64)],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("heading_plot.png", (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let end_time = raw.last().map(|(time, _)| *time).unwrap_or(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Compass Heading", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..end_time, 0f64..360f64)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Heading (degrees)")
        .draw()?;

    chart
        .draw_series(raw.iter().map(|&(time, heading)| {
            Circle::new((time, heading), 1, RGBColor(180, 180, 180).filled())
        }))?
        .label("Raw")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, RGBColor(180, 180, 180).filled()));

    chart
        .draw_series(LineSeries::new(smoothed.iter().copied(), &BLUE))?
        .label("Smoothing 0.97")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    chart
        .draw_series(LineSeries::new(responsive.iter().copied(), &RED))?
        .label("Smoothing 0.8")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
