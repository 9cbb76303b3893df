//! # Color Theme
//!
//! Knob colors follow the sound. Each band has a base hue (blue for
//! High, red for Low, and a hue for Mid that slides from red to green to
//! blue as Mid Freq goes up). Gain brightens or darkens that hue, and Mix
//! pulls the mix knob toward yellow. All of it is linear interpolation
//! in sRGB, recomputed every frame from the current parameter values.

use nih_plug_egui::egui::{ecolor::HsvaGamma, Color32, Rgba};

use crate::params::{GAIN_RANGE_DB, MID_FREQ_RANGE_HZ};

pub const BLUE: Color32 = Color32::from_rgb(62, 120, 196);
pub const BLUE_BR: Color32 = Color32::from_rgb(104, 164, 236);
pub const GREEN: Color32 = Color32::from_rgb(62, 160, 84);
pub const GREEN_BR: Color32 = Color32::from_rgb(104, 206, 126);
pub const GREEN_DR: Color32 = Color32::from_rgb(36, 104, 52);
pub const RED: Color32 = Color32::from_rgb(196, 64, 64);
pub const RED_BR: Color32 = Color32::from_rgb(236, 108, 108);
pub const YELLOW: Color32 = Color32::from_rgb(212, 188, 56);
pub const YELLOW_BR: Color32 = Color32::from_rgb(244, 224, 100);

/// Row and column captions: 85 % gray at 85 % opacity.
pub const LABEL_TEXT: Color32 = Color32::from_rgba_premultiplied(184, 184, 184, 217);
pub const TITLE_TEXT: Color32 = Color32::from_rgb(230, 230, 230);
/// Background of knob tracks.
pub const TRACK: Color32 = Color32::from_rgb(40, 30, 36);

/// Hue shared by the window and the title bar, in turns.
const WINDOW_HUE: f32 = 3.31 / 3.6;

/// How far -15 dB pulls a color toward black.
const MAX_DARKEN: f32 = 0.5;
/// How far +15 dB pulls a color toward white.
const MAX_BRIGHTEN: f32 = 0.4;

pub fn window_bg() -> Color32 {
    hsv(WINDOW_HUE, 0.64, 0.10)
}

pub fn title_bg() -> Color32 {
    hsv(WINDOW_HUE, 0.64, 0.40)
}

/// HSV in gamma (sRGB) space, hue in turns.
fn hsv(h: f32, s: f32, v: f32) -> Color32 {
    Color32::from(Rgba::from(HsvaGamma { h, s, v, a: 1.0 }))
}

/// Per-channel linear interpolation from `a` to `b`.
///
/// `t` is clamped to `0.0 ..= 1.0`.
pub fn lerp(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let a = a.to_srgba_unmultiplied();
    let b = b.to_srgba_unmultiplied();
    let channel = |i: usize| {
        let (from, to) = (f32::from(a[i]), f32::from(b[i]));
        (from + (to - from) * t).round() as u8
    };
    Color32::from_rgba_unmultiplied(channel(0), channel(1), channel(2), channel(3))
}

/// Darken or brighten `base` by a band gain.
///
/// 0 dB leaves the color alone. The full -15 dB pulls it halfway to
/// black and +15 dB 40 % of the way to white; beyond that it saturates.
pub fn color_bright(base: Color32, gain_db: f32) -> Color32 {
    let amount = (gain_db / GAIN_RANGE_DB.1).clamp(-1.0, 1.0);
    let alpha = base.a();
    if amount < 0.0 {
        let black = Color32::from_rgba_unmultiplied(0, 0, 0, alpha);
        lerp(base, black, -amount * MAX_DARKEN)
    } else {
        let white = Color32::from_rgba_unmultiplied(255, 255, 255, alpha);
        lerp(base, white, amount * MAX_BRIGHTEN)
    }
}

/// Where `freq_hz` sits on the Mid Freq knob, on a log scale.
///
/// 313.3 Hz is 0.0, 5705.6 Hz is 1.0 and the 1337 Hz default lands in
/// the middle.
pub fn freq_position(freq_hz: f32) -> f32 {
    let (min, max) = MID_FREQ_RANGE_HZ;
    ((freq_hz / min).ln() / (max / min).ln()).clamp(0.0, 1.0)
}

/// The mid band's color: `low` at the bottom of the Mid Freq range,
/// `centre` at the default, `high` at the top, then brightened by gain.
pub fn color_mid(
    high: Color32,
    centre: Color32,
    low: Color32,
    gain_db: f32,
    freq_hz: f32,
) -> Color32 {
    let position = freq_position(freq_hz);
    let hue = if position < 0.5 {
        lerp(low, centre, position * 2.0)
    } else {
        lerp(centre, high, (position - 0.5) * 2.0)
    };
    color_bright(hue, gain_db)
}

/// Blend a band color toward `tint` by the band's mix (`0.0 ..= 1.0`).
/// The tint follows the band gain too.
pub fn color_mix(base: Color32, tint: Color32, gain_db: f32, mix: f32) -> Color32 {
    lerp(base, color_bright(tint, gain_db), mix)
}

/// Interaction state of a widget in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    Hovered,
    Dragged,
}

/// The two colors a knob is themed with.
///
/// The body shows `active` at rest and `hovered` under the pointer or
/// while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobColors {
    pub active: Color32,
    pub hovered: Color32,
}

impl KnobColors {
    pub fn new(active: Color32, hovered: Color32) -> Self {
        Self { active, hovered }
    }

    /// Indicator, ticks and arcs.
    pub fn primary(&self, state: WidgetState) -> Color32 {
        match state {
            WidgetState::Idle => self.active,
            WidgetState::Hovered | WidgetState::Dragged => self.hovered,
        }
    }

    /// Knob body: the primary color at half opacity.
    pub fn secondary(&self, state: WidgetState) -> Color32 {
        let [r, g, b, a] = self.primary(state).to_srgba_unmultiplied();
        Color32::from_rgba_unmultiplied(r, g, b, a / 2)
    }
}

impl Default for KnobColors {
    fn default() -> Self {
        Self::new(BLUE, BLUE_BR)
    }
}

/// Parameter values the palette depends on, in plain units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeInputs {
    pub high_gain_db: f32,
    pub mid_gain_db: f32,
    pub low_gain_db: f32,
    pub mid_freq_hz: f32,
    /// Mix fractions, `0.0 ..= 1.0`.
    pub high_mix: f32,
    pub mid_mix: f32,
    pub low_mix: f32,
}

/// Every knob color for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePalette {
    pub high: KnobColors,
    pub high_mix: KnobColors,
    pub mid: KnobColors,
    pub mid_mix: KnobColors,
    pub mid_freq: KnobColors,
    pub low: KnobColors,
    pub low_mix: KnobColors,
}

impl FramePalette {
    pub fn compute(inputs: &ThemeInputs) -> Self {
        let high = KnobColors::new(
            color_bright(BLUE, inputs.high_gain_db),
            color_bright(BLUE_BR, inputs.high_gain_db),
        );

        let (mid_db, freq) = (inputs.mid_gain_db, inputs.mid_freq_hz);
        let mid = KnobColors::new(
            color_mid(BLUE, GREEN, RED, mid_db, freq),
            color_mid(BLUE_BR, GREEN_BR, RED_BR, mid_db, freq),
        );
        // The Mid Freq knob swaps the pair so it stands out from Mid Gain.
        let mid_freq = KnobColors::new(
            color_mid(BLUE_BR, GREEN_DR, RED_BR, mid_db, freq),
            color_mid(BLUE, GREEN, RED, mid_db, freq),
        );

        let low = KnobColors::new(
            color_bright(RED, inputs.low_gain_db),
            color_bright(RED_BR, inputs.low_gain_db),
        );

        let mix = |band: KnobColors, gain_db: f32, amount: f32| {
            KnobColors::new(
                color_mix(band.active, YELLOW, gain_db, amount),
                color_mix(band.hovered, YELLOW_BR, gain_db, amount),
            )
        };

        Self {
            high,
            high_mix: mix(high, inputs.high_gain_db, inputs.high_mix),
            mid,
            mid_mix: mix(mid, mid_db, inputs.mid_mix),
            mid_freq,
            low,
            low_mix: mix(low, inputs.low_gain_db, inputs.low_mix),
        }
    }
}
