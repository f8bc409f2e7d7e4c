//! Bounded, time-ordered buffer for sensor readings.

use std::collections::VecDeque;

use sensor_types::{Duration, Timestamp};
use serde::{Deserialize, Serialize};

/// A bounded buffer of timestamped sensor readings.
///
/// Readings are kept in arrival order; once the buffer is full the oldest
/// reading is evicted on every push.
///
/// # Example
///
/// ```
/// use sensor_fusion::StreamBuffer;
/// use sensor_types::Timestamp;
///
/// let mut buffer: StreamBuffer<f32> = StreamBuffer::new(2);
/// buffer.push(Timestamp::from_nanos(0), 1.0);
/// buffer.push(Timestamp::from_nanos(10), 2.0);
/// buffer.push(Timestamp::from_nanos(20), 3.0);
///
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.oldest().map(|(_, v)| *v), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct StreamBuffer<T> {
    /// Maximum capacity.
    capacity: usize,

    /// Readings in arrival order (timestamp, value).
    readings: VecDeque<(Timestamp, T)>,
}

impl<T> StreamBuffer<T> {
    /// Creates a new buffer with the given capacity (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            readings: VecDeque::with_capacity(capacity.clamp(1, 1024)),
        }
    }

    /// Returns the capacity of the buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of readings in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Returns true if the buffer is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.readings.len() >= self.capacity
    }

    /// Clears all readings from the buffer.
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Pushes a reading, evicting the oldest one when at capacity.
    pub fn push(&mut self, timestamp: Timestamp, value: T) {
        if self.is_full() {
            self.readings.pop_front();
        }
        self.readings.push_back((timestamp, value));
    }

    /// Returns the oldest reading.
    #[must_use]
    pub fn oldest(&self) -> Option<&(Timestamp, T)> {
        self.readings.front()
    }

    /// Returns the newest reading.
    #[must_use]
    pub fn latest(&self) -> Option<&(Timestamp, T)> {
        self.readings.back()
    }

    /// Gets a reading by index (0 is the oldest).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&(Timestamp, T)> {
        self.readings.get(index)
    }

    /// Returns an iterator over all readings, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &(Timestamp, T)> {
        self.readings.iter()
    }

    /// Returns the time span between the oldest and newest reading.
    ///
    /// Returns `None` with fewer than 2 readings or out-of-order timestamps.
    #[must_use]
    pub fn time_span(&self) -> Option<Duration> {
        if self.readings.len() < 2 {
            return None;
        }
        let oldest = self.readings.front()?;
        let newest = self.readings.back()?;
        newest.0.since(oldest.0)
    }

    /// Estimates the delivery rate from the buffered readings.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate_hz(&self) -> Option<f64> {
        let span = self.time_span()?;
        if span.is_zero() {
            return None;
        }
        Some((self.readings.len() - 1) as f64 / span.as_secs_f64())
    }
}

/// Statistics about a stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    /// Number of readings.
    pub count: usize,

    /// Buffer capacity.
    pub capacity: usize,

    /// Oldest timestamp.
    pub oldest: Option<Timestamp>,

    /// Newest timestamp.
    pub newest: Option<Timestamp>,

    /// Estimated delivery rate.
    pub rate_hz: Option<f64>,
}

impl<T> StreamBuffer<T> {
    /// Computes statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            count: self.len(),
            capacity: self.capacity,
            oldest: self.oldest().map(|(t, _)| *t),
            newest: self.latest().map(|(t, _)| *t),
            rate_hz: self.rate_hz(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Timestamp {
        Timestamp::from_nanos(millis * 1_000_000)
    }

    #[test]
    fn buffer_new() {
        let buffer: StreamBuffer<f32> = StreamBuffer::new(100);
        assert_eq!(buffer.capacity(), 100);
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
    }

    #[test]
    fn buffer_min_capacity() {
        let buffer: StreamBuffer<f32> = StreamBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
    }

    #[test]
    fn buffer_push_overflow() {
        let mut buffer: StreamBuffer<f32> = StreamBuffer::new(3);
        buffer.push(ms(0), 1.0);
        buffer.push(ms(10), 2.0);
        buffer.push(ms(20), 3.0);
        assert!(buffer.is_full());

        buffer.push(ms(30), 4.0);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.oldest().unwrap().1, 2.0);
        assert_eq!(buffer.latest().unwrap().1, 4.0);
    }

    #[test]
    fn buffer_get_and_iter() {
        let mut buffer = StreamBuffer::new(10);
        buffer.push(ms(0), 1.0_f32);
        buffer.push(ms(10), 2.0);

        assert!(buffer.get(1).is_some());
        assert!(buffer.get(2).is_none());

        let values: Vec<f32> = buffer.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn buffer_time_span_and_rate() {
        let mut buffer = StreamBuffer::new(10);
        assert!(buffer.time_span().is_none());

        buffer.push(ms(0), ());
        assert!(buffer.rate_hz().is_none());

        buffer.push(ms(20), ());
        buffer.push(ms(40), ());
        assert_eq!(buffer.time_span(), Some(Duration::from_millis(40)));
        assert!((buffer.rate_hz().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn buffer_out_of_order_has_no_span() {
        let mut buffer = StreamBuffer::new(10);
        buffer.push(ms(40), ());
        buffer.push(ms(20), ());
        assert!(buffer.time_span().is_none());
    }

    #[test]
    fn buffer_clear() {
        let mut buffer = StreamBuffer::new(10);
        buffer.push(ms(0), 1.0_f32);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn buffer_stats() {
        let mut buffer = StreamBuffer::new(100);
        buffer.push(ms(0), 1.0_f32);
        buffer.push(ms(5), 2.0);
        buffer.push(ms(10), 3.0);

        let stats = buffer.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.capacity, 100);
        assert_eq!(stats.oldest, Some(ms(0)));
        assert_eq!(stats.newest, Some(ms(10)));
        assert!((stats.rate_hz.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn buffer_stats_empty() {
        let buffer: StreamBuffer<f32> = StreamBuffer::new(100);
        let stats = buffer.stats();

        assert_eq!(stats.count, 0);
        assert!(stats.oldest.is_none());
        assert!(stats.rate_hz.is_none());
    }
}
