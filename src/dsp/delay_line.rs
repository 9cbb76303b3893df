//! # Delay Line
//!
//! A fixed-size ring buffer with a moving write head. Each band of the
//! delay owns one of these per channel. The buffer is sized once for the
//! longest delay time (5 s plus headroom) and never reallocated, so
//! moving the Time knob only moves the read position.
//!
//! ## Fractional reads
//!
//! Delay times come from a smoothed millisecond value, so the distance
//! in samples is almost never whole. Reads blend the two neighbouring
//! slots:
//!
//! ```text
//! result = buffer[n] * (1 - frac) + buffer[n + 1] * frac
//! ```
//!
//! Without the blend the read head would jump a whole sample at a time
//! while the Time knob is being dragged, which is audible as zipper noise.

use std::num::NonZeroUsize;

/// A ring buffer used as an audio delay line.
pub struct DelayLine {
    buffer: Vec<f32>,
    /// Slot the next sample is written to.
    write_pos: usize,
    len: usize,
}

impl DelayLine {
    /// Allocate a silent delay line holding `max_length` samples.
    ///
    /// `NonZeroUsize` rules out a zero-length ring, which would make the
    /// modular index arithmetic divide by zero.
    pub fn new(max_length: NonZeroUsize) -> Self {
        let len = max_length.get();
        Self {
            buffer: vec![0.0; len],
            write_pos: 0,
            len,
        }
    }

    /// Number of samples the line can hold.
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Store `sample` at the write head without advancing it.
    ///
    /// Read first, then write, then [`advance()`](Self::advance), so the
    /// feedback path can see the old value before it is overwritten.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Read the sample written `delay_samples` steps ago.
    ///
    /// The distance is clamped to the buffer, so an out-of-range time
    /// reads the oldest sample instead of wrapping into the future.
    pub fn read(&self, delay_samples: f32) -> f32 {
        let delay = delay_samples.clamp(0.0, (self.len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        // Adding `len` before subtracting keeps the usize math positive.
        let newer = (self.write_pos + self.len - whole) % self.len;
        let older = (self.write_pos + self.len - whole - 1) % self.len;

        self.buffer[newer] * (1.0 - frac) + self.buffer[older] * frac
    }

    /// Move the write head one slot forward, wrapping at the end.
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.len;
    }

    /// Silence the whole line and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
