//! # WSTD DL3Y: A Three-Band Stereo Delay
//!
//! A delay that splits the input into low, mid and high bands and gives
//! each band its own echo: time, feedback, cross-feedback between the
//! channels, dry/wet mix and gain. Built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug) for AUv2, VST3 and
//! CLAP, with an egui control surface whose knob colors follow the sound.
//!
//! ## Signal Flow
//!
//! ```text
//!               ┌──► low  ──► [Low band delay]  ──► × low gain  ──┐
//!               │                                                 │
//! Input ──► [SVF crossover @ Mid Freq] ──► mid ──► [Mid band delay] ──► (+) ──► Output
//!               │                                                 │
//!               └──► high ──► [High band delay] ──► × high gain ──┘
//! ```
//!
//! Each band delay mixes its own dry and wet signal before the bands are
//! summed, so the crossover stays transparent when every mix is at 0 %.
//! See [`dsp::band`] for what happens inside one band.

mod dsp;
mod editor;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::band::{Frame, MultiBandDelay};
use nih_plug::prelude::*;
use params::Dl3yParams;

/// The plugin: shared parameters plus the audio-thread engine.
///
/// The engine is `None` until the host calls `initialize()` with a
/// sample rate; its delay lines are allocated there, never in `process()`.
struct Dl3y {
    params: Arc<Dl3yParams>,
    engine: Option<MultiBandDelay>,
}

impl Default for Dl3y {
    fn default() -> Self {
        Self {
            params: Arc::new(Dl3yParams::default()),
            engine: None,
        }
    }
}

impl Plugin for Dl3y {
    const NAME: &'static str = "WSTD DL3Y";
    const VENDOR: &'static str = "Wasted Audio";
    const URL: &'static str = "https://wasted.audio";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first; the cross-feedback needs two channels to do anything.
    // Mono tracks run dual-mono and keep the left output.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        editor::create(self.params.clone())
    }

    /// Allocate the engine for the host's sample rate.
    ///
    /// Returning `false` tells the host this configuration can't run;
    /// that only happens when the sample rate leaves no room for a delay
    /// buffer at all.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let channels = audio_io_layout
            .main_input_channels
            .map(NonZeroU32::get)
            .unwrap_or(2);

        let reuse = self
            .engine
            .as_ref()
            .is_some_and(|engine| engine.sample_rate() == buffer_config.sample_rate);
        if !reuse {
            match MultiBandDelay::new(buffer_config.sample_rate) {
                Some(engine) => self.engine = Some(engine),
                None => {
                    nih_log!(
                        "Cannot allocate delay lines at {} Hz",
                        buffer_config.sample_rate
                    );
                    self.engine = None;
                    return false;
                }
            }
        }

        nih_log!(
            "Initialized at {} Hz with {} channel(s), max buffer {} samples",
            buffer_config.sample_rate,
            channels,
            buffer_config.max_buffer_size
        );
        true
    }

    /// Drop any pending echoes so they don't bleed into the next playback.
    fn reset(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.reset();
        }
    }

    /// Run one buffer through the engine.
    ///
    /// For every sample:
    ///
    /// 1. **Advance** every parameter smoother by one step
    /// 2. **Gather** the channels into a stereo frame
    /// 3. **Split** the frame into low, mid and high bands
    /// 4. **Delay** each band with its own time, feedback and cross
    /// 5. **Sum** the bands and write them back over the input
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // A bypassed plugin leaves the buffer exactly as the host gave it
        // to us. The host takes care of the dry signal; the delay lines
        // keep whatever they held until the next reset().
        let bypassed = self.params.bypass.value();
        let Some(engine) = active_engine(self.engine.as_mut(), bypassed) else {
            return ProcessStatus::Normal;
        };

        for mut channel_samples in buffer.iter_samples() {
            // ─── Read smoothed parameter values for this sample ───
            //
            // One call advances all sixteen smoothers, so a Time knob
            // moving from 500 ms to 1000 ms glides there over 50 ms
            // instead of jumping. The gliding read head is what makes the
            // pitch bend you hear while turning Time.
            let settings = self.params.next_engine_settings();

            // ─── Stereo in ───
            //
            // The engine always works on two channels; the cross knob
            // needs a left and a right to trade echoes between. A mono
            // track feeds its single channel to both sides.
            let frame = gather_frame(channel_samples.iter_mut().map(|sample| *sample));

            // ─── Three bands, three delays, one sum ───
            let output = engine.process(frame, &settings);

            // ─── Stereo out ───
            //
            // Mono tracks keep only the left side. With the same signal
            // on both inputs, cross-feedback has nothing to swap, so the
            // left side already holds the whole echo.
            scatter_frame(output, channel_samples.iter_mut());
        }

        // ─── Tail ───
        //
        // After the input stops, the echoes keep ringing. Each repeat is
        // `feedback` times quieter than the last, so the host should
        // keep calling process() until every band has decayed by 60 dB.
        // At 100 % feedback that never happens, and we ask to be kept
        // alive instead.
        match engine.tail_samples(&self.params.current_engine_settings()) {
            Some(samples) => ProcessStatus::Tail(samples),
            None => ProcessStatus::KeepAlive,
        }
    }
}

/// The engine to run this block, or `None` when the block should pass
/// through untouched: the plugin is bypassed, or the host never got
/// `initialize()` to succeed.
fn active_engine(
    engine: Option<&mut MultiBandDelay>,
    bypassed: bool,
) -> Option<&mut MultiBandDelay> {
    if bypassed {
        None
    } else {
        engine
    }
}

/// Collect one time step into a stereo frame. A single channel is
/// duplicated to both sides; channels past the second are ignored.
fn gather_frame(mut samples: impl Iterator<Item = f32>) -> Frame {
    let left = samples.next().unwrap_or(0.0);
    let right = samples.next().unwrap_or(left);
    [left, right]
}

/// Write a stereo frame back over one time step. A mono output gets the
/// left side.
fn scatter_frame<'a>(frame: Frame, samples: impl Iterator<Item = &'a mut f32>) {
    for (sample, value) in samples.zip(frame) {
        *sample = value;
    }
}

impl ClapPlugin for Dl3y {
    const CLAP_ID: &'static str = "audio.wasted.wstd-dl3y";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Three-band stereo delay with cross-feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for Dl3y {
    // 16 ASCII bytes, unique to this plugin.
    const VST3_CLASS_ID: [u8; 16] = *b"WSTD_DL3Y_RsPlug";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(Dl3y);
nih_export_vst3!(Dl3y);

// AUv2 entry point for hosts that only load Audio Units.
clap_wrapper::export_auv2!();
