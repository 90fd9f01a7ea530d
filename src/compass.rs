//! Subscription lifecycle of the compass heading stream

use crate::clock::{Clock, MonotonicClock};
use crate::error::CompassError;
use crate::session::CompassSession;
use crate::sink::HeadingSink;
use crate::source::{SensorListener, SensorSource};
use crate::types::CompassSettings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session of the current subscription, shared with its sensor listener
#[derive(Debug, Default)]
pub(crate) struct SessionSlot {
    /// Incremented by every successful subscription start
    pub(crate) generation: u64,
    pub(crate) session: Option<CompassSession>,
}

// Slot state is plain data, so a panic in a sink leaves nothing half-updated worth refusing.
pub(crate) fn lock_slot(slot: &Mutex<SessionSlot>) -> MutexGuard<'_, SessionSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Compass heading stream over a platform sensor source
///
/// Supports one subscriber at a time. [`listen`](Self::listen) checks that
/// both sensors exist, creates a fresh session and subscribes to the source;
/// [`cancel`](Self::cancel) unsubscribes and discards the session. Dropping
/// the compass cancels any active subscription.
///
/// # Example
/// ```
/// use std::sync::mpsc;
/// use fusion_compass::{Compass, CompassError, HeadingEvent, ManualSource};
///
/// // A device without a magnetometer
/// let mut compass = Compass::new(ManualSource::new(false));
/// let (tx, rx) = mpsc::channel::<HeadingEvent>();
///
/// assert_eq!(compass.listen(tx), Err(CompassError::SensorUnavailable));
/// assert_eq!(rx.recv().unwrap(), Err(CompassError::SensorUnavailable));
/// ```
pub struct Compass<S: SensorSource> {
    source: S,
    settings: CompassSettings,
    clock: Arc<dyn Clock>,
    slot: Arc<Mutex<SessionSlot>>,
}

impl<S: SensorSource> Compass<S> {
    /// Create a compass with default settings and the system monotonic clock
    pub fn new(source: S) -> Self {
        Self::with_settings(source, CompassSettings::default())
    }

    pub fn with_settings(source: S, settings: CompassSettings) -> Self {
        Self::with_clock(source, settings, Arc::new(MonotonicClock))
    }

    /// Create a compass whose throttle reads time from `clock`
    pub fn with_clock(source: S, settings: CompassSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            settings,
            clock,
            slot: Arc::new(Mutex::new(SessionSlot::default())),
        }
    }

    /// Start streaming headings to `sink`
    ///
    /// On failure the error is delivered to `sink` as its only event and
    /// also returned. An already active subscription is left untouched.
    pub fn listen<K>(&mut self, mut sink: K) -> Result<(), CompassError>
    where
        K: HeadingSink + 'static,
    {
        if self.is_listening() {
            tracing::warn!("Rejecting second compass subscription");
            let error = CompassError::AlreadyListening;
            sink.error(&error);
            return Err(error);
        }

        if !self.source.has_required_sensors() {
            tracing::warn!("Accelerometer or magnetometer missing, compass unavailable");
            let error = CompassError::SensorUnavailable;
            sink.error(&error);
            return Err(error);
        }

        let generation = {
            let mut slot = lock_slot(&self.slot);
            slot.generation += 1;
            slot.session = Some(CompassSession::new(
                &self.settings,
                Arc::clone(&self.clock),
                Box::new(sink),
            ));
            slot.generation
        };

        // The source may deliver samples synchronously, so the slot must be unlocked here
        let listener = SensorListener::new(&self.slot, generation);
        self.source.subscribe(listener, self.settings.sampling_period);

        let sampling_period_ms =
            u64::try_from(self.settings.sampling_period.as_millis()).unwrap_or(u64::MAX);
        let update_interval_ms =
            u64::try_from(self.settings.update_interval.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            generation,
            sampling_period_ms,
            update_interval_ms,
            "Compass subscription started"
        );
        Ok(())
    }

    /// Stop streaming and discard all per-subscription state
    ///
    /// Does nothing when no subscription is active.
    pub fn cancel(&mut self) {
        if !self.is_listening() {
            return;
        }

        self.source.unsubscribe();

        let session = lock_slot(&self.slot).session.take();
        if let Some(session) = session {
            tracing::info!(emitted = session.emitted(), "Compass subscription ended");
        }
    }

    pub fn is_listening(&self) -> bool {
        lock_slot(&self.slot).session.is_some()
    }

    /// Readings delivered by the active subscription, if any
    pub fn emitted(&self) -> Option<u64> {
        lock_slot(&self.slot).session.as_ref().map(CompassSession::emitted)
    }

    pub fn settings(&self) -> &CompassSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SensorSource> Drop for Compass<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::HeadingEvent;
    use crate::source::ManualSource;
    use crate::types::{RawSample, SensorKind};
    use core::time::Duration;
    use nalgebra::Vector3;
    use std::sync::mpsc;

    fn push_pair(source: &ManualSource) {
        source.push_sample(RawSample::new(
            SensorKind::Gravity,
            Vector3::new(0.0, 0.0, 9.81),
            Duration::ZERO,
        ));
        source.push_sample(RawSample::new(
            SensorKind::MagneticField,
            Vector3::new(0.0, 22.0, -40.0),
            Duration::ZERO,
        ));
    }

    #[test]
    fn test_listen_and_cancel() {
        let source = ManualSource::new(true);
        let mut compass = Compass::new(source.clone());
        let (tx, _rx) = mpsc::channel::<HeadingEvent>();

        assert!(compass.listen(tx).is_ok());
        assert!(compass.is_listening());
        assert!(source.is_subscribed());
        assert_eq!(source.sampling_period(), Some(Duration::from_millis(10)));
        assert_eq!(compass.emitted(), Some(0));

        compass.cancel();
        assert!(!compass.is_listening());
        assert!(!source.is_subscribed());
        assert_eq!(compass.emitted(), None);

        // Cancelling twice is harmless
        compass.cancel();
    }

    #[test]
    fn test_unavailable_sensors() {
        let source = ManualSource::new(false);
        let mut compass = Compass::new(source.clone());
        let (tx, rx) = mpsc::channel::<HeadingEvent>();

        assert_eq!(compass.listen(tx), Err(CompassError::SensorUnavailable));
        assert!(!compass.is_listening());
        assert_eq!(source.subscriptions(), 0);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![Err(CompassError::SensorUnavailable)]);
    }

    #[test]
    fn test_second_subscription_rejected() {
        let source = ManualSource::new(true);
        let mut compass = Compass::with_clock(
            source.clone(),
            CompassSettings::default(),
            Arc::new(ManualClock::new()),
        );
        let (first_tx, first_rx) = mpsc::channel::<HeadingEvent>();
        let (second_tx, second_rx) = mpsc::channel::<HeadingEvent>();

        compass.listen(first_tx).unwrap();
        assert_eq!(compass.listen(second_tx), Err(CompassError::AlreadyListening));
        assert_eq!(second_rx.try_recv().unwrap(), Err(CompassError::AlreadyListening));

        // The first subscription keeps working
        for _ in 0..10 {
            push_pair(&source);
        }
        assert!(matches!(first_rx.try_recv(), Ok(Ok(_))));
        assert_eq!(source.subscriptions(), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let source = ManualSource::new(true);
        let (tx, _rx) = mpsc::channel::<HeadingEvent>();
        {
            let mut compass = Compass::new(source.clone());
            compass.listen(tx).unwrap();
            assert!(source.is_subscribed());
        }
        assert!(!source.is_subscribed());
    }
}
