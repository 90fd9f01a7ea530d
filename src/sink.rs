//! Subscriber side of the heading stream

use crate::error::CompassError;
use crate::types::HeadingReading;
use std::sync::mpsc::Sender;

/// Event delivered to channel-based subscribers
pub type HeadingEvent = Result<HeadingReading, CompassError>;

/// Receiver of heading readings
///
/// Over one subscription a sink receives either zero or more readings, or
/// exactly one error and nothing after it.
pub trait HeadingSink: Send {
    fn success(&mut self, reading: HeadingReading);

    fn error(&mut self, error: &CompassError);
}

// A disconnected receiver means nobody is listening anymore; events are dropped.
impl HeadingSink for Sender<HeadingEvent> {
    fn success(&mut self, reading: HeadingReading) {
        let _ = self.send(Ok(reading));
    }

    fn error(&mut self, error: &CompassError) {
        let _ = self.send(Err(error.clone()));
    }
}
