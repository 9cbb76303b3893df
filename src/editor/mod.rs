//! # Editor
//!
//! The control surface, redrawn by egui every frame:
//!
//! ```text
//! ┌──────────────────────── WSTD DL3Y ──────────── Bypass [o ] ┐
//! │ High      (Gain)    (Time) (Feedback) (Cross) (Mix)        │
//! │ Mid       (Gain)    (Time) (Feedback) (Cross) (Mix)        │
//! │ Mid Freq   (Freq)    Time   Feedback   Cross   Mix         │
//! │ Low       (Gain)    (Time) (Feedback) (Cross) (Mix)        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here caches parameter values. Each frame reads the shared
//! parameters, so host automation and preset loads show up on the next
//! repaint without any notification plumbing.

mod knob;
pub(crate) mod theme;
mod toggle;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use nih_plug::prelude::*;
use nih_plug_egui::egui::{
    self, vec2, Align, Align2, CentralPanel, Context, FontId, Frame, Layout, RichText, TextStyle,
    TopBottomPanel, Ui,
};
use nih_plug_egui::create_egui_editor;

use crate::params::{DelayBandParams, Dl3yParams};
use knob::{KnobStyle, ParamKnob};
use theme::{FramePalette, KnobColors, ThemeInputs};
use toggle::ParamToggle;

const TITLE: &str = "WSTD DL3Y";

const LARGE_KNOB: f32 = 100.0;
const SMALL_KNOB: f32 = 70.0;
const LABEL_COLUMN: f32 = 56.0;
const COLUMN_GAP: f32 = 20.0;
const TITLE_BAR_HEIGHT: f32 = 32.0;

const GAIN_TICKS: usize = 7;
const MID_FREQ_TICKS: usize = 11;
const TIME_TICKS: usize = 21;
const PERCENT_TICKS: usize = 11;

pub fn create(params: Arc<Dl3yParams>) -> Option<Box<dyn Editor>> {
    create_egui_editor(
        params.editor_state.clone(),
        (),
        |egui_ctx, _| apply_style(egui_ctx),
        move |egui_ctx, setter, _state| {
            let palette = FramePalette::compute(&theme_inputs(&params));

            title_bar(egui_ctx, &params, setter);

            CentralPanel::default()
                .frame(Frame::default().fill(theme::window_bg()).inner_margin(12.0))
                .show(egui_ctx, |ui| {
                    ui.horizontal_top(|ui| {
                        ui.vertical(row_labels);
                        ui.vertical(|ui| gain_column(ui, &params, setter, &palette));
                        ui.add_space(COLUMN_GAP);
                        ui.vertical(|ui| band_grid(ui, &params, setter, &palette));
                    });
                });
        },
    )
}

fn apply_style(egui_ctx: &Context) {
    let mut style = (*egui_ctx.style()).clone();
    style.visuals = egui::Visuals::dark();
    style.visuals.panel_fill = theme::window_bg();
    style.spacing.item_spacing = vec2(8.0, 8.0);
    style
        .text_styles
        .insert(TextStyle::Body, FontId::monospace(16.0));
    style
        .text_styles
        .insert(TextStyle::Heading, FontId::monospace(21.0));
    egui_ctx.set_style(style);
}

fn theme_inputs(params: &Dl3yParams) -> ThemeInputs {
    ThemeInputs {
        high_gain_db: params.high.gain.value(),
        mid_gain_db: params.mid.gain.value(),
        low_gain_db: params.low.gain.value(),
        mid_freq_hz: params.mid_freq.value(),
        high_mix: params.high.mix.value(),
        mid_mix: params.mid.mix.value(),
        low_mix: params.low.mix.value(),
    }
}

fn title_bar(egui_ctx: &Context, params: &Dl3yParams, setter: &ParamSetter) {
    TopBottomPanel::top("title_bar")
        .exact_height(TITLE_BAR_HEIGHT)
        .frame(Frame::default().fill(theme::title_bg()).inner_margin(6.0))
        .show(egui_ctx, |ui| {
            let rect = ui.max_rect();
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                TITLE,
                FontId::monospace(21.0),
                theme::TITLE_TEXT,
            );

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.add(
                    ParamToggle::for_param(&params.bypass, setter)
                        .with_colors(KnobColors::new(theme::RED, theme::RED_BR)),
                );
                ui.label(RichText::new("Bypass").color(theme::LABEL_TEXT));
            });
        });
}

/// A caption centred in a fixed-size cell.
fn caption(ui: &mut Ui, text: &str, width: f32, height: f32) {
    ui.allocate_ui_with_layout(
        vec2(width, height),
        Layout::centered_and_justified(egui::Direction::TopDown),
        |ui| ui.label(RichText::new(text).color(theme::LABEL_TEXT)),
    );
}

/// Band names, one cell per row of the gain column.
fn row_labels(ui: &mut Ui) {
    caption(ui, "High", LABEL_COLUMN, LARGE_KNOB);
    caption(ui, "Mid", LABEL_COLUMN, LARGE_KNOB);
    caption(ui, "Mid\nFreq", LABEL_COLUMN, SMALL_KNOB);
    caption(ui, "Low", LABEL_COLUMN, LARGE_KNOB);
}

fn gain_column(ui: &mut Ui, params: &Dl3yParams, setter: &ParamSetter, palette: &FramePalette) {
    let gain_style = KnobStyle::Stepped { ticks: GAIN_TICKS };

    ui.add(
        ParamKnob::for_param(&params.high.gain, setter, LARGE_KNOB)
            .with_style(gain_style)
            .with_colors(palette.high),
    );
    ui.add(
        ParamKnob::for_param(&params.mid.gain, setter, LARGE_KNOB)
            .with_style(gain_style)
            .with_colors(palette.mid),
    );
    ui.horizontal(|ui| {
        // Centre the smaller knob under the large ones.
        ui.add_space((LARGE_KNOB - SMALL_KNOB) / 2.0 - ui.spacing().item_spacing.x);
        ui.add(
            ParamKnob::for_param(&params.mid_freq, setter, SMALL_KNOB)
                .with_style(KnobStyle::Stepped {
                    ticks: MID_FREQ_TICKS,
                })
                .with_colors(palette.mid_freq),
        );
    });
    ui.add(
        ParamKnob::for_param(&params.low.gain, setter, LARGE_KNOB)
            .with_style(gain_style)
            .with_colors(palette.low),
    );
}

/// Time, Feedback, Cross and Mix for each band. The column captions sit
/// in the Mid Freq row so the Low row lines up with the Low gain knob.
fn band_grid(ui: &mut Ui, params: &Dl3yParams, setter: &ParamSetter, palette: &FramePalette) {
    band_row(ui, &params.high, setter, palette.high, palette.high_mix);
    band_row(ui, &params.mid, setter, palette.mid, palette.mid_mix);
    ui.horizontal(|ui| {
        for text in ["Time", "Feedback", "Cross", "Mix"] {
            caption(ui, text, LARGE_KNOB, SMALL_KNOB);
        }
    });
    band_row(ui, &params.low, setter, palette.low, palette.low_mix);
}

fn band_row(
    ui: &mut Ui,
    band: &DelayBandParams,
    setter: &ParamSetter,
    colors: KnobColors,
    mix_colors: KnobColors,
) {
    let percent = KnobStyle::Stepped {
        ticks: PERCENT_TICKS,
    };

    ui.horizontal(|ui| {
        ui.add(
            ParamKnob::for_param(&band.time, setter, LARGE_KNOB)
                .with_style(KnobStyle::Stepped { ticks: TIME_TICKS })
                .with_colors(colors),
        );
        ui.add(
            ParamKnob::for_param(&band.feedback, setter, LARGE_KNOB)
                .with_style(KnobStyle::Space)
                .with_colors(colors),
        );
        ui.add(
            ParamKnob::for_param(&band.cross, setter, LARGE_KNOB)
                .with_style(percent)
                .with_colors(colors),
        );
        ui.add(
            ParamKnob::for_param(&band.mix, setter, LARGE_KNOB)
                .with_style(percent)
                .with_colors(mix_colors),
        );
    });
}
