//! Per-subscription pipeline state

use crate::clock::Clock;
use crate::filter::SignalFilter;
use crate::resolver::OrientationResolver;
use crate::sink::HeadingSink;
use crate::types::{CompassSettings, HeadingReading, RawSample, SensorAccuracy, SensorKind};
use std::sync::Arc;

/// Everything one compass subscription owns
///
/// A session is created when a subscriber starts listening and dropped when
/// it stops, so a new subscription always starts from zeroed estimates, an
/// open throttle and unknown accuracy. Samples and accuracy notifications
/// enter through [`on_sample`](Self::on_sample) and
/// [`on_accuracy_changed`](Self::on_accuracy_changed); readings leave through
/// the sink.
pub struct CompassSession {
    filter: SignalFilter,
    resolver: OrientationResolver,
    clock: Arc<dyn Clock>,
    sink: Box<dyn HeadingSink>,
    last_reading: Option<HeadingReading>,
    emitted: u64,
}

impl CompassSession {
    pub fn new(settings: &CompassSettings, clock: Arc<dyn Clock>, sink: Box<dyn HeadingSink>) -> Self {
        Self {
            filter: SignalFilter::new(settings.smoothing_factor),
            resolver: OrientationResolver::with_settings(settings),
            clock,
            sink,
            last_reading: None,
            emitted: 0,
        }
    }

    /// Feed one raw sample through the filter and attempt a fusion
    ///
    /// Returns the reading that was delivered to the sink, if any.
    pub fn on_sample(&mut self, sample: &RawSample) -> Option<HeadingReading> {
        if self.resolver.accuracy() == SensorAccuracy::Unreliable {
            tracing::trace!("Compass sensor is unreliable, device calibration is needed");
        }

        self.filter.update(sample.kind, sample.vector);

        let now = self.clock.now();
        let reading = self.resolver.resolve(&self.filter, now)?;

        tracing::trace!(
            heading = reading.heading,
            accuracy = reading.accuracy,
            "Heading emitted"
        );
        self.sink.success(reading);
        self.last_reading = Some(reading);
        self.emitted += 1;

        Some(reading)
    }

    /// Record a platform accuracy notification
    ///
    /// The most recent notification wins, whichever sensor sent it.
    pub fn on_accuracy_changed(&mut self, kind: SensorKind, accuracy: SensorAccuracy) {
        if !self.resolver.set_accuracy(accuracy) {
            tracing::trace!(?kind, ?accuracy, "Accuracy unchanged");
            return;
        }

        if accuracy == SensorAccuracy::Unreliable {
            tracing::warn!(?kind, "Compass sensor is unreliable, device calibration is needed");
        } else {
            tracing::debug!(?kind, ?accuracy, "Compass accuracy changed");
        }
    }

    pub fn filter(&self) -> &SignalFilter {
        &self.filter
    }

    pub fn resolver(&self) -> &OrientationResolver {
        &self.resolver
    }

    pub fn accuracy(&self) -> SensorAccuracy {
        self.resolver.accuracy()
    }

    /// Most recent reading delivered to the sink
    pub fn last_reading(&self) -> Option<HeadingReading> {
        self.last_reading
    }

    /// Readings delivered so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl core::fmt::Debug for CompassSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompassSession")
            .field("filter", &self.filter)
            .field("resolver", &self.resolver)
            .field("last_reading", &self.last_reading)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}
