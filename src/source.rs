//! Platform side of the heading stream: where raw samples come from

use crate::compass::{SessionSlot, lock_slot};
use crate::session::CompassSession;
use crate::types::{RawSample, SensorAccuracy, SensorKind};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

/// Provider of raw accelerometer and magnetometer samples
///
/// Implementations wrap the host platform's sensor registration API. After
/// [`subscribe`](Self::subscribe) the source delivers every sample and
/// accuracy notification to the listener, sequentially, until
/// [`unsubscribe`](Self::unsubscribe) is called.
pub trait SensorSource: Send {
    /// Whether both an accelerometer and a magnetometer are present
    fn has_required_sensors(&self) -> bool;

    /// Start delivering samples, ideally once per `sampling_period`
    fn subscribe(&mut self, listener: SensorListener, sampling_period: Duration);

    /// Stop delivering samples
    fn unsubscribe(&mut self);
}

/// Callback handle given to a [`SensorSource`]
///
/// A listener is bound to the subscription that created it. Once that
/// subscription ends, or the compass is dropped, calls on the listener do
/// nothing, so late callbacks from the platform are harmless.
#[derive(Clone)]
pub struct SensorListener {
    slot: Weak<Mutex<SessionSlot>>,
    generation: u64,
}

impl SensorListener {
    pub(crate) fn new(slot: &Arc<Mutex<SessionSlot>>, generation: u64) -> Self {
        Self {
            slot: Arc::downgrade(slot),
            generation,
        }
    }

    /// Deliver one raw sample
    pub fn on_sample(&self, sample: RawSample) {
        self.with_session(|session| {
            session.on_sample(&sample);
        });
    }

    /// Deliver a platform accuracy notification for one sensor
    pub fn on_accuracy_changed(&self, kind: SensorKind, accuracy: SensorAccuracy) {
        self.with_session(|session| session.on_accuracy_changed(kind, accuracy));
    }

    /// Whether the subscription this listener belongs to is still active
    pub fn is_active(&self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let slot = lock_slot(&slot);
        slot.generation == self.generation && slot.session.is_some()
    }

    fn with_session(&self, f: impl FnOnce(&mut CompassSession)) {
        let Some(slot) = self.slot.upgrade() else {
            tracing::trace!("Dropping sensor callback after compass teardown");
            return;
        };

        let mut slot = lock_slot(&slot);
        if slot.generation != self.generation {
            tracing::trace!(
                listener = self.generation,
                current = slot.generation,
                "Dropping sensor callback from a previous subscription"
            );
            return;
        }

        match slot.session.as_mut() {
            Some(session) => f(session),
            None => tracing::trace!("Dropping sensor callback after cancel"),
        }
    }
}

impl core::fmt::Debug for SensorListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorListener")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Sensor source driven by the caller
///
/// For hosts that push samples themselves (an FFI bridge, a recorded trace,
/// a simulator). Clones share state: hand one clone to the compass and keep
/// another to push samples.
///
/// # Example
/// ```
/// use std::sync::mpsc;
/// use std::time::Duration;
/// use nalgebra::Vector3;
/// use fusion_compass::{Compass, HeadingEvent, ManualSource, RawSample, SensorKind};
///
/// let source = ManualSource::new(true);
/// let mut compass = Compass::new(source.clone());
/// let (tx, rx) = mpsc::channel::<HeadingEvent>();
/// compass.listen(tx).unwrap();
///
/// for _ in 0..10 {
///     source.push_sample(RawSample::new(SensorKind::Gravity, Vector3::new(0.0, 0.0, 9.81), Duration::ZERO));
///     source.push_sample(RawSample::new(SensorKind::MagneticField, Vector3::new(0.0, 22.0, -40.0), Duration::ZERO));
/// }
///
/// let reading = rx.try_recv().unwrap().unwrap();
/// assert!((0.0..360.0).contains(&reading.heading));
/// ```
#[derive(Debug, Clone)]
pub struct ManualSource {
    state: Arc<Mutex<ManualSourceState>>,
}

#[derive(Debug)]
struct ManualSourceState {
    available: bool,
    listener: Option<SensorListener>,
    sampling_period: Option<Duration>,
    subscriptions: u32,
}

impl ManualSource {
    /// Create a source; `available` controls whether both sensors are reported present
    pub fn new(available: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualSourceState {
                available,
                listener: None,
                sampling_period: None,
                subscriptions: 0,
            })),
        }
    }

    /// Push a raw sample to the current listener, if subscribed
    ///
    /// Returns whether a listener was subscribed.
    pub fn push_sample(&self, sample: RawSample) -> bool {
        match self.listener() {
            Some(listener) => {
                listener.on_sample(sample);
                true
            }
            None => false,
        }
    }

    /// Push an accuracy notification to the current listener, if subscribed
    pub fn push_accuracy(&self, kind: SensorKind, accuracy: SensorAccuracy) -> bool {
        match self.listener() {
            Some(listener) => {
                listener.on_accuracy_changed(kind, accuracy);
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().listener.is_some()
    }

    /// Sampling period requested by the last subscription
    pub fn sampling_period(&self) -> Option<Duration> {
        self.lock().sampling_period
    }

    /// Number of subscriptions received so far
    pub fn subscriptions(&self) -> u32 {
        self.lock().subscriptions
    }

    // Cloned out so the pipeline never runs under the source lock
    fn listener(&self) -> Option<SensorListener> {
        self.lock().listener.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualSourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SensorSource for ManualSource {
    fn has_required_sensors(&self) -> bool {
        self.lock().available
    }

    fn subscribe(&mut self, listener: SensorListener, sampling_period: Duration) {
        let mut state = self.lock();
        state.listener = Some(listener);
        state.sampling_period = Some(sampling_period);
        state.subscriptions += 1;
    }

    fn unsubscribe(&mut self) {
        self.lock().listener = None;
    }
}
