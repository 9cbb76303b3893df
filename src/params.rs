//! # Plugin Parameters
//!
//! Sixteen automatable parameters, one bypass switch and the persisted
//! editor window state.
//!
//! Each of the three bands (High, Mid, Low) has the same five knobs,
//! collected in [`DelayBandParams`] and nested under a group named after
//! the band. The host sees flat IDs such as `high_time` or `low_mix`;
//! never rename them, or saved sessions lose their settings.
//!
//! | Knob | Range | Default |
//! | --- | --- | --- |
//! | Gain | -15 dB .. +15 dB | 0 dB |
//! | Time | 50 ms .. 5000 ms | 500 ms |
//! | Feedback | 0 % .. 100 % | 25 % |
//! | Cross | 0 % .. 100 % | 20 % |
//! | Mix | 0 % .. 100 % | 50 % |
//!
//! Mid Freq (313.3 Hz .. 5705.6 Hz, default 1337 Hz) sets where the
//! crossover splits the bands.

use std::sync::Arc;

use nih_plug::prelude::*;
use nih_plug_egui::EguiState;

use crate::dsp::band::{BandSettings, EngineSettings};

pub const GAIN_RANGE_DB: (f32, f32) = (-15.0, 15.0);
pub const TIME_RANGE_MS: (f32, f32) = (50.0, 5000.0);
pub const MID_FREQ_RANGE_HZ: (f32, f32) = (313.3, 5705.6);

pub const DEFAULT_TIME_MS: f32 = 500.0;
pub const DEFAULT_FEEDBACK: f32 = 0.25;
pub const DEFAULT_CROSS: f32 = 0.20;
pub const DEFAULT_MIX: f32 = 0.50;
pub const DEFAULT_MID_FREQ_HZ: f32 = 1337.0;

/// Editor window size in logical pixels.
pub const EDITOR_SIZE: (u32, u32) = (660, 460);

/// All parameters of the plugin.
#[derive(Params)]
pub struct Dl3yParams {
    /// Editor window size, saved with the session.
    #[persist = "editor-state"]
    pub editor_state: Arc<EguiState>,

    #[nested(id_prefix = "high", group = "High")]
    pub high: DelayBandParams,

    #[nested(id_prefix = "mid", group = "Mid")]
    pub mid: DelayBandParams,

    /// **Mid Freq**: the centre of the mid band. Lows are split off
    /// below it and highs above it.
    ///
    /// The skewed range spends half the knob travel below 1337 Hz, the
    /// way the ear hears frequency.
    #[id = "mid_freq"]
    pub mid_freq: FloatParam,

    #[nested(id_prefix = "low", group = "Low")]
    pub low: DelayBandParams,

    /// Host bypass. The editor shows it as a toggle in the title bar.
    #[id = "bypass"]
    pub bypass: BoolParam,
}

/// The five knobs every band has.
#[derive(Params)]
pub struct DelayBandParams {
    /// **Gain**: level of this band in the output, dry and wet together.
    /// Doubles as a three-band EQ when the mixes are at zero.
    #[id = "gain"]
    pub gain: FloatParam,

    /// **Time**: distance between the input and the first echo.
    #[id = "time"]
    pub time: FloatParam,

    /// **Feedback**: how much of each echo goes back into the delay.
    /// At 100 % the echoes never die out.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Cross**: how much of the feedback crosses to the other channel.
    /// 0 % keeps left and right separate, 100 % is full ping-pong.
    #[id = "cross"]
    pub cross: FloatParam,

    /// **Mix**: dry/wet balance of this band.
    #[id = "mix"]
    pub mix: FloatParam,
}

impl DelayBandParams {
    /// Build a band whose parameter names start with `band`, e.g.
    /// "High Time".
    ///
    /// All three bands share the same ranges and defaults. Only the names
    /// differ; the host tells them apart by the `id_prefix` on the nested
    /// field in [`Dl3yParams`].
    pub fn new(band: &str) -> Self {
        Self {
            // Gain is stored in dB because that is what the knob shows
            // and what feels even to turn: each step of 0.1 dB is the
            // same audible change anywhere on the range. The engine
            // wants a linear factor; `next_smoothed()` converts with
            // `db_to_gain`, so 0 dB is 1.0, -6 dB about 0.5.
            //
            // The smoother runs on the dB value, so a fade from -15 to
            // +15 dB sounds like a steady sweep rather than a jump at
            // the end.
            gain: FloatParam::new(
                format!("{band} Gain"),
                0.0,
                FloatRange::Linear {
                    min: GAIN_RANGE_DB.0,
                    max: GAIN_RANGE_DB.1,
                },
            )
            .with_unit(" dB")
            .with_smoother(SmoothingStyle::Linear(20.0))
            .with_step_size(0.1)
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            time: FloatParam::new(
                format!("{band} Time"),
                DEFAULT_TIME_MS,
                FloatRange::Skewed {
                    min: TIME_RANGE_MS.0,
                    max: TIME_RANGE_MS.1,
                    // Two decades of range, so the knob has to be
                    // logarithmic: 50 ms to 500 ms takes the first half
                    // of the travel and 500 ms to 5 s the second half.
                    factor: centred_skew(TIME_RANGE_MS.0, TIME_RANGE_MS.1, DEFAULT_TIME_MS),
                },
            )
            .with_unit(" ms")
            // The read head moves with the smoother, which gives the
            // tape-like pitch bend on time changes instead of a click.
            .with_smoother(SmoothingStyle::Linear(50.0))
            .with_step_size(1.0),

            // Feedback, Cross and Mix are plain fractions (0.0 ..= 1.0)
            // shown as percentages. Typing "40" or "40%" into the host's
            // value box both land on 0.4.
            feedback: percent_param(format!("{band} Feedback"), DEFAULT_FEEDBACK),
            cross: percent_param(format!("{band} Cross"), DEFAULT_CROSS),
            mix: percent_param(format!("{band} Mix"), DEFAULT_MIX),
        }
    }

    /// Advance every smoother by one sample and return the band's
    /// settings in engine units.
    pub fn next_smoothed(&self) -> BandSettings {
        BandSettings {
            gain: util::db_to_gain(self.gain.smoothed.next()),
            time_ms: self.time.smoothed.next(),
            feedback: self.feedback.smoothed.next(),
            cross: self.cross.smoothed.next(),
            mix: self.mix.smoothed.next(),
        }
    }

    /// Current settings without touching the smoothers.
    pub fn current(&self) -> BandSettings {
        BandSettings {
            gain: util::db_to_gain(self.gain.value()),
            time_ms: self.time.value(),
            feedback: self.feedback.value(),
            cross: self.cross.value(),
            mix: self.mix.value(),
        }
    }
}

/// Skew factor that puts `centre` halfway along the knob.
///
/// `FloatRange::Skewed` maps a knob position `n` (0..1) to
///
/// ```text
/// plain = min + (max - min) * n^(1 / factor)
/// ```
///
/// Solving for `plain(0.5) == centre` gives the factor below. When
/// `centre` is the geometric mean `sqrt(min * max)`, both halves of the
/// knob cover the same ratio, which is how a logarithmic knob feels.
/// The curve is still a power law, so only the ends and the middle sit
/// exactly on the log scale.
fn centred_skew(min: f32, max: f32, centre: f32) -> f32 {
    0.5_f32.ln() / ((centre - min) / (max - min)).ln()
}

fn percent_param(name: String, default: f32) -> FloatParam {
    FloatParam::new(name, default, FloatRange::Linear { min: 0.0, max: 1.0 })
        .with_unit("%")
        .with_smoother(SmoothingStyle::Linear(20.0))
        .with_value_to_string(formatters::v2s_f32_percentage(0))
        .with_string_to_value(formatters::s2v_f32_percentage())
}

impl Dl3yParams {
    /// Advance all smoothers by one sample.
    ///
    /// The engine orders its bands low, mid, high.
    pub fn next_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            crossover_hz: self.mid_freq.smoothed.next(),
            bands: [
                self.low.next_smoothed(),
                self.mid.next_smoothed(),
                self.high.next_smoothed(),
            ],
        }
    }

    /// Current target values, for tail length estimates.
    pub fn current_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            crossover_hz: self.mid_freq.value(),
            bands: [self.low.current(), self.mid.current(), self.high.current()],
        }
    }
}

impl Default for Dl3yParams {
    fn default() -> Self {
        Self {
            editor_state: EguiState::from_size(EDITOR_SIZE.0, EDITOR_SIZE.1),

            high: DelayBandParams::new("High"),
            mid: DelayBandParams::new("Mid"),
            low: DelayBandParams::new("Low"),

            mid_freq: FloatParam::new(
                "Mid Freq",
                DEFAULT_MID_FREQ_HZ,
                FloatRange::Skewed {
                    min: MID_FREQ_RANGE_HZ.0,
                    max: MID_FREQ_RANGE_HZ.1,
                    // 1337 Hz is the geometric mean of the range, so the
                    // default points straight up, the same spot the knob
                    // colors treat as the centre of the mid band.
                    factor: centred_skew(
                        MID_FREQ_RANGE_HZ.0,
                        MID_FREQ_RANGE_HZ.1,
                        DEFAULT_MID_FREQ_HZ,
                    ),
                },
            )
            .with_unit(" Hz")
            .with_smoother(SmoothingStyle::Logarithmic(50.0))
            .with_step_size(0.1)
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            bypass: BoolParam::new("Bypass", false).make_bypass(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_defaults() {
        let params = Dl3yParams::default();

        for band in [&params.high, &params.mid, &params.low] {
            assert_eq!(band.gain.default_plain_value(), 0.0);
            assert_eq!(band.time.default_plain_value(), DEFAULT_TIME_MS);
            assert_eq!(band.feedback.default_plain_value(), DEFAULT_FEEDBACK);
            assert_eq!(band.cross.default_plain_value(), DEFAULT_CROSS);
            assert_eq!(band.mix.default_plain_value(), DEFAULT_MIX);
        }
        assert_eq!(params.mid_freq.default_plain_value(), DEFAULT_MID_FREQ_HZ);
        assert!(!params.bypass.value());
    }

    #[test]
    fn test_names_carry_band_prefix() {
        let params = Dl3yParams::default();

        assert_eq!(params.high.time.name(), "High Time");
        assert_eq!(params.mid.cross.name(), "Mid Cross");
        assert_eq!(params.low.mix.name(), "Low Mix");
    }

    #[test]
    fn test_ranges_reach_their_ends() {
        let params = Dl3yParams::default();

        assert!((params.high.gain.preview_plain(0.0) - GAIN_RANGE_DB.0).abs() < 1e-4);
        assert!((params.high.gain.preview_plain(1.0) - GAIN_RANGE_DB.1).abs() < 1e-4);
        assert!((params.low.time.preview_plain(0.0) - TIME_RANGE_MS.0).abs() < 1e-3);
        assert!((params.low.time.preview_plain(1.0) - TIME_RANGE_MS.1).abs() < 1e-1);
        assert!((params.mid_freq.preview_plain(0.0) - MID_FREQ_RANGE_HZ.0).abs() < 1e-1);
        assert!((params.mid_freq.preview_plain(1.0) - MID_FREQ_RANGE_HZ.1).abs() < 1e-1);
    }

    /// The time knob spends more of its travel on short delays.
    #[test]
    fn test_time_knob_is_skewed_toward_short_delays() {
        let params = Dl3yParams::default();

        let halfway = params.mid.time.preview_plain(0.5);
        let linear_halfway = (TIME_RANGE_MS.0 + TIME_RANGE_MS.1) / 2.0;
        assert!(halfway < linear_halfway, "halfway = {halfway}");
    }

    #[test]
    fn test_time_knob_centre_is_the_default() {
        let params = Dl3yParams::default();

        let centre = params.high.time.preview_plain(0.5);
        assert!((centre - DEFAULT_TIME_MS).abs() < 0.5, "centre = {centre}");
        let default = params.high.time.default_normalized_value();
        assert!((default - 0.5).abs() < 1e-3, "default at {default}");
    }

    #[test]
    fn test_mid_freq_knob_centre_is_the_default() {
        let params = Dl3yParams::default();

        let centre = params.mid_freq.preview_plain(0.5);
        assert!((centre - DEFAULT_MID_FREQ_HZ).abs() < 0.5, "centre = {centre}");
        let default = params.mid_freq.default_normalized_value();
        assert!((default - 0.5).abs() < 1e-3, "default at {default}");
    }

    /// The knob position and the mid band color agree at the ends and in
    /// the middle of the Mid Freq range.
    #[test]
    fn test_mid_freq_knob_matches_color_scale() {
        let params = Dl3yParams::default();

        for position in [0.0, 0.5, 1.0] {
            let freq = params.mid_freq.preview_plain(position);
            let color_position = crate::editor::theme::freq_position(freq);
            assert!(
                (color_position - position).abs() < 1e-3,
                "knob {position} -> {freq} Hz -> color {color_position}"
            );
        }
    }

    #[test]
    fn test_centred_skew_is_a_plain_power_law_for_linear_centre() {
        // A centre halfway between min and max needs no skew at all.
        assert!((centred_skew(0.0, 10.0, 5.0) - 1.0).abs() < 1e-6);
        // Time: ln 0.5 / ln(450 / 4950).
        assert!((centred_skew(50.0, 5000.0, 500.0) - 0.289).abs() < 1e-3);
    }

    #[test]
    fn test_percent_display() {
        let params = Dl3yParams::default();

        let text = params
            .high
            .feedback
            .normalized_value_to_string(params.high.feedback.default_normalized_value(), true);
        assert_eq!(text, "25%");
    }

    #[test]
    fn test_current_settings_are_in_engine_units() {
        let params = Dl3yParams::default();
        let settings = params.current_engine_settings();

        assert!((settings.crossover_hz - DEFAULT_MID_FREQ_HZ).abs() < 1e-3);
        for band in settings.bands {
            // 0 dB is unity gain.
            assert!((band.gain - 1.0).abs() < 1e-6);
            assert!((band.time_ms - DEFAULT_TIME_MS).abs() < 1e-3);
            assert!((band.feedback - DEFAULT_FEEDBACK).abs() < 1e-6);
        }
    }
}
