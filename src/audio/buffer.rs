// Sample buffer - bounded queue between the emulator and the host audio device
//
// The core pushes; the host drains. When the host falls behind, the oldest
// samples are discarded so the newest audio is always what plays next.

use std::collections::VecDeque;

use log::warn;

/// Default capacity in samples (~93 ms at 44.1 kHz)
pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
    /// Samples discarded because the buffer was full
    dropped: u64,
    /// True while an overflow burst is in progress
    overflowing: bool,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
            overflowing: false,
        }
    }

    /// Append a sample, discarding the oldest one if full
    pub fn push(&mut self, sample: f32) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
            self.dropped += 1;
            if !self.overflowing {
                self.overflowing = true;
                warn!(
                    "Audio buffer full ({} samples); dropping oldest samples",
                    self.capacity
                );
            }
        }
        self.samples.push_back(sample);
    }

    pub fn pop(&mut self) -> Option<f32> {
        self.samples.pop_front()
    }

    /// Move up to `out.len()` samples into `out`, oldest first
    ///
    /// # Returns
    ///
    /// The number of samples written
    pub fn drain(&mut self, out: &mut [f32]) -> usize {
        let count = out.len().min(self.samples.len());
        for (slot, sample) in out.iter_mut().zip(self.samples.drain(..count)) {
            *slot = sample;
        }
        if count > 0 {
            self.overflowing = false;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total samples lost to overflow since creation
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.overflowing = false;
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut buffer = SampleBuffer::new(4);
        buffer.push(1.0);
        buffer.push(2.0);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.pop(), Some(1.0));
        assert_eq!(buffer.pop(), Some(2.0));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut buffer = SampleBuffer::new(3);
        for i in 0..5 {
            buffer.push(i as f32);
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.dropped(), 2);
        assert_eq!(buffer.pop(), Some(2.0));
    }

    #[test]
    fn test_drain_partial() {
        let mut buffer = SampleBuffer::new(8);
        for i in 0..5 {
            buffer.push(i as f32);
        }
        let mut out = [0.0; 3];
        assert_eq!(buffer.drain(&mut out), 3);
        assert_eq!(out, [0.0, 1.0, 2.0]);
        assert_eq!(buffer.len(), 2);

        let mut out = [9.0; 4];
        assert_eq!(buffer.drain(&mut out), 2);
        assert_eq!(out, [3.0, 4.0, 9.0, 9.0]);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut buffer = SampleBuffer::new(0);
        buffer.push(1.0);
        buffer.push(2.0);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.pop(), Some(2.0));
    }
}
