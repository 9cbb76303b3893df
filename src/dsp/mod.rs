//! # DSP
//!
//! - **`delay_line`**: the ring buffer behind every echo.
//! - **`filter`**: the state variable crossover that splits the input
//!   into low, mid and high bands around the Mid Freq knob.
//! - **`band`**: the per-band stereo delay with cross-feedback, and the
//!   engine that runs all three bands and sums them.

pub mod band;
pub mod delay_line;
pub mod filter;
