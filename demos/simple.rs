use fusion_compass::{Compass, HeadingEvent, ManualSource, RawSample, SensorAccuracy, SensorKind};
use nalgebra::Vector3;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const SAMPLE_PERIOD: Duration = Duration::from_millis(10); // 10 ms sample period

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let source = ManualSource::new(true);
    let mut compass = Compass::new(source.clone());

    let (tx, rx) = mpsc::channel::<HeadingEvent>();
    if let Err(error) = compass.listen(tx) {
        eprintln!("Compass unavailable ({}): {}", error.code(), error);
        return;
    }

    source.push_accuracy(SensorKind::MagneticField, SensorAccuracy::Medium);

    for step in 0..50u32 {
        // this loop should run each time the platform delivers new sensor data
        let timestamp = SAMPLE_PERIOD * step;
        let gravity = Vector3::new(0.0, 0.0, 9.81); // replace with accelerometer data in m/s²
        let magnetic = Vector3::new(-15.5, 15.5, -40.0); // replace with magnetometer data in µT

        source.push_sample(RawSample::new(SensorKind::Gravity, gravity, timestamp));
        source.push_sample(RawSample::new(SensorKind::MagneticField, magnetic, timestamp));

        for event in rx.try_iter() {
            match event {
                Ok(reading) => println!(
                    "Heading: {:.2}°, Accuracy: ±{:.0}°",
                    reading.heading, reading.accuracy
                ),
                Err(error) => eprintln!("Compass error: {}", error),
            }
        }

        thread::sleep(SAMPLE_PERIOD);
    }

    compass.cancel();
}
