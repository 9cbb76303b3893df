//! # Delay Bands
//!
//! The engine splits the stereo input into low, mid and high bands and
//! runs each band through its own stereo delay. Every band has the same
//! five controls: gain, time, feedback, cross and mix.
//!
//! ## One band, one sample
//!
//! ```text
//!            ┌─────────────── × (1 - mix) ──────────────────────┐
//! in_L ──┬──►(+)──► [delay L] ──┬── delayed_L ── × mix ──►(+)──► × gain ──► out_L
//!        │    ▲                 │
//!        │    └── × feedback ◄─(+)◄── (1 - cross) · delayed_L
//!        │                      ▲
//!        │                      └──── cross · delayed_R
//! ```
//!
//! The right channel is the mirror image. Cross sends part of each
//! channel's echo into the other channel's feedback path, so at 100 %
//! cross the repeats ping-pong between left and right. Because the two
//! weights sum to one, the loop gain is just `feedback` and the band
//! stays stable for any cross setting.

use std::num::NonZeroUsize;

use super::delay_line::DelayLine;
use crate::params::{
    DEFAULT_CROSS, DEFAULT_FEEDBACK, DEFAULT_MID_FREQ_HZ, DEFAULT_MIX, DEFAULT_TIME_MS,
};
use super::filter::{BandSplit, StateVariableFilter};

/// Number of delay bands.
pub const NUM_BANDS: usize = 3;

/// Stereo frame: `[left, right]`.
pub type Frame = [f32; 2];

/// Per-sample settings for one band, in engine units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    /// Linear output gain (not dB).
    pub gain: f32,
    pub time_ms: f32,
    /// 0.0 ..= 1.0
    pub feedback: f32,
    /// 0.0 ..= 1.0
    pub cross: f32,
    /// 0.0 ..= 1.0
    pub mix: f32,
}

/// The knob defaults, with 0 dB as unity gain.
impl Default for BandSettings {
    fn default() -> Self {
        Self {
            gain: 1.0,
            time_ms: DEFAULT_TIME_MS,
            feedback: DEFAULT_FEEDBACK,
            cross: DEFAULT_CROSS,
            mix: DEFAULT_MIX,
        }
    }
}

/// Settings for the whole engine for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub crossover_hz: f32,
    /// Ordered low, mid, high.
    pub bands: [BandSettings; NUM_BANDS],
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            crossover_hz: DEFAULT_MID_FREQ_HZ,
            bands: [BandSettings::default(); NUM_BANDS],
        }
    }
}

/// A stereo delay with cross-feedback.
pub struct DelayBand {
    lines: [DelayLine; 2],
}

impl DelayBand {
    pub fn new(max_delay: NonZeroUsize) -> Self {
        Self {
            lines: [DelayLine::new(max_delay), DelayLine::new(max_delay)],
        }
    }

    /// Run one stereo frame through the band.
    ///
    /// `delay_samples` may be fractional; the delay lines interpolate.
    pub fn process(&mut self, input: Frame, delay_samples: f32, settings: &BandSettings) -> Frame {
        let [left, right] = &mut self.lines;

        // Read before writing. With a delay of N samples, the read head
        // sits N slots behind the write head, so this is the input from
        // N samples ago plus whatever feedback went in with it.
        let delayed = [left.read(delay_samples), right.read(delay_samples)];

        // ─── Cross-feedback ───
        //
        // Each channel's echo is split in two before it goes back in:
        //
        //   (1 - cross) of it returns to its own channel,
        //   cross       of it goes to the other channel.
        //
        // At cross = 0 the channels are two independent delays. At
        // cross = 1 every repeat swaps sides, which is a ping-pong delay.
        // In between, the echo drifts across the stereo field as it
        // decays. The two shares add up to one, so the total energy fed
        // back is still `feedback` times the echo and the loop decays at
        // the same rate whatever the cross setting.
        let straight = 1.0 - settings.cross;
        let feedback_l = settings.feedback * (straight * delayed[0] + settings.cross * delayed[1]);
        let feedback_r = settings.feedback * (straight * delayed[1] + settings.cross * delayed[0]);

        left.write(input[0] + feedback_l);
        right.write(input[1] + feedback_r);
        left.advance();
        right.advance();

        // ─── Dry/wet mix, then band gain ───
        //
        // Gain comes last so it scales the dry band as well: with mix at
        // 0 % the three gain knobs act as a three-band EQ.
        let dry = 1.0 - settings.mix;
        [
            (input[0] * dry + delayed[0] * settings.mix) * settings.gain,
            (input[1] * dry + delayed[1] * settings.mix) * settings.gain,
        ]
    }

    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }
}

/// The full three-band delay: crossover, three [`DelayBand`]s, summing.
pub struct MultiBandDelay {
    sample_rate: f32,
    splitters: [StateVariableFilter; 2],
    /// Ordered low, mid, high.
    bands: [DelayBand; NUM_BANDS],
}

impl MultiBandDelay {
    /// Longest supported delay time.
    pub const MAX_DELAY_MS: f32 = 5000.0;
    /// Extra buffer on top of the longest delay, so smoothing overshoot
    /// never reads past the end of the ring.
    const HEADROOM_MS: f32 = 100.0;

    /// Allocate an engine for `sample_rate`.
    ///
    /// Returns `None` when the sample rate is too low to hold even one
    /// sample of delay.
    pub fn new(sample_rate: f32) -> Option<Self> {
        let max_samples =
            calculate_delay_samples(Self::MAX_DELAY_MS + Self::HEADROOM_MS, sample_rate);
        let max_delay = NonZeroUsize::new(max_samples as usize)?;

        Some(Self {
            sample_rate,
            splitters: [StateVariableFilter::new(), StateVariableFilter::new()],
            bands: [
                DelayBand::new(max_delay),
                DelayBand::new(max_delay),
                DelayBand::new(max_delay),
            ],
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Process one stereo frame.
    pub fn process(&mut self, input: Frame, settings: &EngineSettings) -> Frame {
        let mut split = [BandSplit::default(); 2];
        for (channel, splitter) in self.splitters.iter_mut().enumerate() {
            splitter.set_cutoff(settings.crossover_hz, self.sample_rate);
            split[channel] = splitter.split(input[channel]);
        }

        let band_inputs: [Frame; NUM_BANDS] = [
            [split[0].low, split[1].low],
            [split[0].mid, split[1].mid],
            [split[0].high, split[1].high],
        ];

        let mut output = [0.0; 2];
        for ((band, band_input), band_settings) in self
            .bands
            .iter_mut()
            .zip(band_inputs)
            .zip(&settings.bands)
        {
            let delay = calculate_delay_samples(band_settings.time_ms, self.sample_rate);
            let out = band.process(band_input, delay, band_settings);
            output[0] += out[0];
            output[1] += out[1];
        }

        output
    }

    /// How long the echoes keep sounding after the input stops.
    ///
    /// Returns `None` when some band's feedback is so close to 100 % that
    /// the tail never decays; the plugin must then keep itself alive.
    pub fn tail_samples(&self, settings: &EngineSettings) -> Option<u32> {
        let mut longest = 0_u32;
        for band in &settings.bands {
            let delay = calculate_delay_samples(band.time_ms, self.sample_rate);
            longest = longest.max(tail_for(delay, band.feedback)?);
        }
        Some(longest)
    }

    pub fn reset(&mut self) {
        for splitter in &mut self.splitters {
            splitter.reset();
        }
        for band in &mut self.bands {
            band.clear();
        }
    }
}

pub fn calculate_delay_samples(delay_ms: f32, sample_rate: f32) -> f32 {
    delay_ms * sample_rate / 1000.0
}

/// Samples until a feedback loop decays by 60 dB.
///
/// After N repeats the level is `feedback^N`; solving `feedback^N = 0.001`
/// gives `N = -3 / log10(feedback)`.
fn tail_for(delay_samples: f32, feedback: f32) -> Option<u32> {
    if feedback >= 0.999 {
        None
    } else if feedback > 0.001 {
        let repeats = -3.0 / feedback.log10();
        Some((repeats * delay_samples) as u32)
    } else {
        Some(delay_samples as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1000.0;

    fn band(len: usize) -> DelayBand {
        DelayBand::new(NonZeroUsize::new(len).unwrap())
    }

    fn settings(feedback: f32, cross: f32, mix: f32) -> BandSettings {
        BandSettings {
            gain: 1.0,
            time_ms: 0.0,
            feedback,
            cross,
            mix,
        }
    }

    /// Push an impulse into the left channel and collect `n` wet frames.
    fn impulse_response(band: &mut DelayBand, delay: f32, s: &BandSettings, n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| {
                let input = if i == 0 { [1.0, 0.0] } else { [0.0, 0.0] };
                band.process(input, delay, s)
            })
            .collect()
    }

    #[test]
    fn test_default_settings_match_the_knob_defaults() {
        let engine = EngineSettings::default();
        let knobs = crate::params::Dl3yParams::default().current_engine_settings();

        assert!((engine.crossover_hz - knobs.crossover_hz).abs() < 1e-3);
        for (ours, theirs) in engine.bands.iter().zip(&knobs.bands) {
            assert!((ours.gain - theirs.gain).abs() < 1e-6);
            assert!((ours.time_ms - theirs.time_ms).abs() < 1e-3);
            assert!((ours.feedback - theirs.feedback).abs() < 1e-6);
            assert!((ours.cross - theirs.cross).abs() < 1e-6);
            assert!((ours.mix - theirs.mix).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_mix_is_dry_times_gain() {
        let mut b = band(64);
        let mut s = settings(0.5, 0.5, 0.0);
        s.gain = 2.0;

        let out = b.process([0.25, -0.5], 4.0, &s);
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_echo_arrives_after_delay() {
        let mut b = band(64);
        let s = settings(0.0, 0.0, 1.0);

        let out = impulse_response(&mut b, 4.0, &s, 10);
        for (i, frame) in out.iter().enumerate() {
            let expected = if i == 4 { 1.0 } else { 0.0 };
            assert!(
                (frame[0] - expected).abs() < 1e-6,
                "frame {i}: expected {expected}, got {}",
                frame[0]
            );
            assert!(frame[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_feedback_repeats_decay_geometrically() {
        let mut b = band(64);
        let s = settings(0.5, 0.0, 1.0);

        let out = impulse_response(&mut b, 4.0, &s, 13);
        assert!((out[4][0] - 1.0).abs() < 1e-6);
        assert!((out[8][0] - 0.5).abs() < 1e-6);
        assert!((out[12][0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_full_cross_ping_pongs() {
        let mut b = band(64);
        let s = settings(1.0, 1.0, 1.0);

        let out = impulse_response(&mut b, 4.0, &s, 13);
        // First echo stays on the left, then every repeat swaps sides.
        assert!((out[4][0] - 1.0).abs() < 1e-6 && out[4][1].abs() < 1e-6);
        assert!(out[8][0].abs() < 1e-6 && (out[8][1] - 1.0).abs() < 1e-6);
        assert!((out[12][0] - 1.0).abs() < 1e-6 && out[12][1].abs() < 1e-6);
    }

    #[test]
    fn test_partial_cross_keeps_loop_gain() {
        let mut b = band(64);
        let s = settings(0.5, 0.2, 1.0);

        let out = impulse_response(&mut b, 4.0, &s, 9);
        // Second repeat: 0.5 feedback split 80/20 between the channels.
        assert!((out[8][0] - 0.4).abs() < 1e-6);
        assert!((out[8][1] - 0.1).abs() < 1e-6);
        assert!((out[8][0] + out[8][1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_engine_is_transparent_when_dry() {
        let mut engine = MultiBandDelay::new(44100.0).unwrap();
        let mut s = EngineSettings::default();
        for band in &mut s.bands {
            band.mix = 0.0;
        }

        for i in 0..500 {
            let input = [(i as f32 * 0.1).sin(), (i as f32 * 0.23).cos()];
            let out = engine.process(input, &s);
            assert!((out[0] - input[0]).abs() < 1e-5, "left diverged at {i}");
            assert!((out[1] - input[1]).abs() < 1e-5, "right diverged at {i}");
        }
    }

    #[test]
    fn test_engine_band_gain_scales_output() {
        let mut engine = MultiBandDelay::new(44100.0).unwrap();
        let mut s = EngineSettings::default();
        for band in &mut s.bands {
            band.mix = 0.0;
            band.gain = 0.5;
        }

        let out = engine.process([0.8, -0.8], &s);
        assert!((out[0] - 0.4).abs() < 1e-5);
        assert!((out[1] + 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_reset_silences_pending_echoes() {
        let mut engine = MultiBandDelay::new(SR).unwrap();
        let mut s = EngineSettings::default();
        for band in &mut s.bands {
            band.mix = 1.0;
            band.time_ms = 10.0;
        }

        engine.process([1.0, 1.0], &s);
        engine.reset();
        for _ in 0..50 {
            let out = engine.process([0.0, 0.0], &s);
            assert!(out[0].abs() < 1e-6 && out[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_tail_uses_longest_band() {
        let engine = MultiBandDelay::new(SR).unwrap();
        let mut s = EngineSettings::default();
        s.bands[0] = BandSettings { time_ms: 100.0, feedback: 0.0, ..s.bands[0] };
        s.bands[1] = BandSettings { time_ms: 200.0, feedback: 0.1, ..s.bands[1] };
        s.bands[2] = BandSettings { time_ms: 50.0, feedback: 0.0, ..s.bands[2] };

        // 0.1 feedback takes 3 repeats to reach -60 dB: 3 * 200 samples.
        let tail = engine.tail_samples(&s).unwrap();
        assert!((599..=600).contains(&tail), "tail = {tail}");
    }

    #[test]
    fn test_tail_is_infinite_at_full_feedback() {
        let engine = MultiBandDelay::new(SR).unwrap();
        let mut s = EngineSettings::default();
        s.bands[1].feedback = 1.0;

        assert_eq!(engine.tail_samples(&s), None);
    }

    #[test]
    fn test_unusable_sample_rate_is_rejected() {
        assert!(MultiBandDelay::new(0.0).is_none());
    }
}
