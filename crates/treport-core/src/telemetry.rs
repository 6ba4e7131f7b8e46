//! # Delta-Encoded Telemetry
//!
//! A telemetry series is an ordered list of `[time, value]` pairs. The time
//! field of the first pair is an absolute Unix-ms timestamp; every later time
//! field is the millisecond delta from the previous sample.
//!
//! [`Telemetry`] stores the pairs exactly as they appear on the wire, so a
//! series that is deserialized and re-serialized is unchanged. Use
//! [`Telemetry::decode`] to read absolute timestamps and [`Telemetry::encode`]
//! to build a series from absolute samples. Values keep their wire number
//! encoding as well, so `40` and `40.0` stay distinct.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::PrimitiveError;
use crate::identity::UnixTimestampMS;

/// A utilization percentage in `[0, 100]`, stored as the number it was
/// written as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(Number);

impl Percent {
    /// A percentage from a float. `None` for NaN or infinity.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self)
    }

    /// The value as a float.
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    /// The number exactly as encoded.
    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl From<u8> for Percent {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

/// One `[time, value]` pair as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample<V>(pub u64, pub V);

/// An ordered, delta-encoded time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Telemetry<V>(pub Vec<TelemetrySample<V>>);

impl<V> Default for Telemetry<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Telemetry<V> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate samples with absolute timestamps.
    ///
    /// Deltas accumulate with saturating addition.
    pub fn decode(&self) -> impl Iterator<Item = (UnixTimestampMS, &V)> + '_ {
        let mut clock: Option<u64> = None;
        self.0.iter().map(move |TelemetrySample(time, value)| {
            let absolute = match clock {
                None => *time,
                Some(prev) => prev.saturating_add(*time),
            };
            clock = Some(absolute);
            (UnixTimestampMS(absolute), value)
        })
    }

    /// Build a delta-encoded series from samples with absolute timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::NonMonotonicTelemetry`] if a timestamp is
    /// earlier than the one before it.
    pub fn encode(
        samples: impl IntoIterator<Item = (UnixTimestampMS, V)>,
    ) -> Result<Self, PrimitiveError> {
        let mut out = Vec::new();
        let mut previous: Option<u64> = None;
        for (UnixTimestampMS(at), value) in samples {
            let time = match previous {
                None => at,
                Some(prev) if at >= prev => at - prev,
                Some(prev) => {
                    return Err(PrimitiveError::NonMonotonicTelemetry {
                        previous: prev,
                        current: at,
                    })
                }
            };
            previous = Some(at);
            out.push(TelemetrySample(time, value));
        }
        Ok(Self(out))
    }
}
