//! # Band-Split Filter
//!
//! A topology-preserving-transform (TPT) state variable filter, used as
//! the three-way crossover in front of the delay bands. One filter run
//! gives three outputs at once:
//!
//! - **low**: everything below the Mid Freq knob,
//! - **mid**: a band centred on it,
//! - **high**: everything above it.
//!
//! ## Why this filter
//!
//! The SVF outputs satisfy `input = low + k * band + high` exactly, where
//! `k = 1 / Q`. Scaling the bandpass output by `k` to form the mid band
//! means the three bands always sum back to the dry signal, so with all
//! gains at 0 dB and all mixes at 0 % the plugin is transparent.
//!
//! ## The equations
//!
//! ```text
//! g  = tan(π · cutoff / sample_rate)
//! a1 = 1 / (1 + g · (g + k))
//! a2 = g · a1
//! a3 = g · a2
//!
//! v3 = x − ic2
//! v1 = a1 · ic1 + a2 · v3        (band)
//! v2 = ic2 + a2 · ic1 + a3 · v3  (low)
//! ic1 = 2 · v1 − ic1
//! ic2 = 2 · v2 − ic2
//! high = x − k · v1 − v2
//! ```
//!
//! The two integrator states `ic1`/`ic2` are the filter's memory.

use std::f32::consts::PI;

/// Butterworth resonance for the crossover.
pub const CROSSOVER_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// The three outputs of one filter step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandSplit {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

#[cfg(test)]
impl BandSplit {
    /// The bands add back up to the input.
    pub fn sum(&self) -> f32 {
        self.low + self.mid + self.high
    }
}

/// A TPT state variable filter used as a three-band splitter.
pub struct StateVariableFilter {
    k: f32,
    a1: f32,
    a2: f32,
    a3: f32,
    ic1: f32,
    ic2: f32,
    /// Last cutoff/sample-rate pair, so an unchanged knob skips the `tan()`.
    cached: (f32, f32),
}

impl StateVariableFilter {
    /// A filter with no coefficients yet. Call
    /// [`set_cutoff()`](Self::set_cutoff) before the first sample.
    pub fn new() -> Self {
        Self {
            k: 1.0 / CROSSOVER_Q,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
            ic1: 0.0,
            ic2: 0.0,
            cached: (0.0, 0.0),
        }
    }

    /// Recompute coefficients for the crossover frequency.
    ///
    /// The cutoff is kept between 20 Hz and 49 % of the sample rate;
    /// `tan()` blows up as the cutoff approaches Nyquist.
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        if self.cached == (cutoff_hz, sample_rate) {
            return;
        }
        self.cached = (cutoff_hz, sample_rate);

        let cutoff = cutoff_hz.clamp(20.0, sample_rate * 0.49);
        let g = (PI * cutoff / sample_rate).tan();
        self.a1 = 1.0 / (1.0 + g * (g + self.k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
    }

    /// Run one sample through the filter and split it into bands.
    pub fn split(&mut self, input: f32) -> BandSplit {
        let v3 = input - self.ic2;
        let v1 = self.a1 * self.ic1 + self.a2 * v3;
        let v2 = self.ic2 + self.a2 * self.ic1 + self.a3 * v3;
        self.ic1 = 2.0 * v1 - self.ic1;
        self.ic2 = 2.0 * v2 - self.ic2;

        let mid = self.k * v1;
        BandSplit {
            low: v2,
            mid,
            high: input - mid - v2,
        }
    }

    /// Forget the integrator state. Coefficients are kept.
    pub fn reset(&mut self) {
        self.ic1 = 0.0;
        self.ic2 = 0.0;
    }
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new()
    }
}
