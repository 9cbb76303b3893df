//! # Parameter Knob
//!
//! A rotary control bound to one nih-plug parameter, drawn with the egui
//! painter. It has no title and no text input; the value shows in a
//! tooltip while hovering.
//!
//! ## Gestures
//!
//! The host must see every edit wrapped in a gesture, or automation
//! recording and undo break:
//!
//! | Mouse | Host calls |
//! | --- | --- |
//! | drag starts | `begin_set_parameter` |
//! | drag moves | `set_parameter_normalized` |
//! | drag stops | `end_set_parameter` |
//! | double-click | `begin`, set to default, `end` |
//!
//! Dragging up or right turns the knob clockwise. Holding Shift slows it
//! down ten times for fine adjustments.
//!
//! ## Geometry
//!
//! The knob sweeps 270°, from 0.75π (bottom left) to 2.25π (bottom
//! right), leaving the gap at the bottom. egui's y axis points down, so
//! angles grow clockwise on screen.

use std::f32::consts::PI;

use nih_plug::prelude::{Param, ParamSetter};
use nih_plug_egui::egui::{
    vec2, Color32, Pos2, Response, Sense, Shape, Stroke, Ui, Vec2, Widget,
};

use super::theme::{KnobColors, WidgetState, TRACK};

pub const ANGLE_MIN: f32 = PI * 0.75;
pub const ANGLE_MAX: f32 = PI * 2.25;

/// Pointer travel, in points, for a full sweep.
const DRAG_RANGE_POINTS: f32 = 200.0;
/// Shift-drag speed multiplier.
const FINE_DRAG: f32 = 0.1;

/// How a knob is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobStyle {
    /// A body with a pointer line and `ticks` marks around the rim.
    Stepped { ticks: usize },
    /// Three offset arcs that grow with the value around a shrinking
    /// centre dot.
    Space,
}

/// A knob widget for any parameter.
pub struct ParamKnob<'a, P: Param> {
    param: &'a P,
    setter: &'a ParamSetter<'a>,
    diameter: f32,
    style: KnobStyle,
    colors: KnobColors,
}

impl<'a, P: Param> ParamKnob<'a, P> {
    pub fn for_param(param: &'a P, setter: &'a ParamSetter<'a>, diameter: f32) -> Self {
        Self {
            param,
            setter,
            diameter,
            style: KnobStyle::Stepped { ticks: 11 },
            colors: KnobColors::default(),
        }
    }

    pub fn with_style(mut self, style: KnobStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_colors(mut self, colors: KnobColors) -> Self {
        self.colors = colors;
        self
    }

    fn normalized_value(&self) -> f32 {
        self.param.unmodulated_normalized_value()
    }

    fn value_text(&self) -> String {
        self.param
            .normalized_value_to_string(self.normalized_value(), true)
    }

    /// Tooltip contents. Nothing while dragging, where the tooltip would
    /// cover the knob as it turns.
    fn hover_text(&self, dragging: bool) -> Option<String> {
        (!dragging).then(|| self.value_text())
    }

    fn reset_to_default(&self) {
        self.setter.begin_set_parameter(self.param);
        self.setter
            .set_parameter(self.param, self.param.default_plain_value());
        self.setter.end_set_parameter(self.param);
    }

    /// Apply this frame's drag. The unquantized value lives in egui's
    /// temp memory so stepped parameters still move on small drags.
    fn handle_drag(&self, ui: &Ui, response: &mut Response) {
        let drag_id = response.id.with("knob_drag_value");

        if response.drag_started() {
            self.setter.begin_set_parameter(self.param);
            let start = self.normalized_value();
            ui.memory_mut(|mem| mem.data.insert_temp(drag_id, start));
        }

        // Frames where the pointer stays put send nothing to the host.
        let delta = response.drag_delta();
        if response.dragged() && delta != Vec2::ZERO {
            let speed = if ui.input(|i| i.modifiers.shift) {
                FINE_DRAG
            } else {
                1.0
            };
            let start = ui
                .memory(|mem| mem.data.get_temp::<f32>(drag_id))
                .unwrap_or_else(|| self.normalized_value());
            let next = drag_to_normalized(start, (delta.x - delta.y) * speed);

            ui.memory_mut(|mem| mem.data.insert_temp(drag_id, next));
            self.setter.set_parameter_normalized(self.param, next);
            response.mark_changed();
        }

        if response.drag_stopped() {
            self.setter.end_set_parameter(self.param);
            ui.memory_mut(|mem| mem.data.remove::<f32>(drag_id));
        }
    }

    fn paint(&self, ui: &Ui, center: Pos2, state: WidgetState) {
        let painter = ui.painter();
        let radius = self.diameter / 2.0;
        let t = self.normalized_value();
        let angle = knob_angle(t);
        let primary = self.colors.primary(state);
        let secondary = self.colors.secondary(state);

        match self.style {
            KnobStyle::Stepped { ticks } => {
                for tick in tick_angles(ticks) {
                    painter.add(tick_shape(center, radius, 0.7, 0.9, 0.04, tick, primary));
                }
                painter.circle_filled(center, radius * 0.6, secondary);
                painter.add(tick_shape(center, radius, 0.1, 0.5, 0.08, angle, primary));
            }
            KnobStyle::Space => {
                painter.circle_filled(center, radius * (0.3 - t * 0.1), secondary);
                painter.add(arc_shape(
                    center,
                    radius * 0.85,
                    ANGLE_MIN,
                    ANGLE_MAX,
                    radius * 0.05,
                    TRACK,
                ));
                if t > 0.01 {
                    for (ring, offset) in [(0.4, -1.0), (0.6, 1.0), (0.8, 3.0)] {
                        painter.add(arc_shape(
                            center,
                            radius * ring,
                            ANGLE_MIN + offset,
                            angle + offset,
                            radius * 0.15,
                            primary,
                        ));
                    }
                }
            }
        }
    }
}

impl<P: Param> Widget for ParamKnob<'_, P> {
    fn ui(self, ui: &mut Ui) -> Response {
        let size = vec2(self.diameter, self.diameter);
        let (rect, mut response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if response.double_clicked() {
            self.reset_to_default();
            response.mark_changed();
        } else {
            self.handle_drag(ui, &mut response);
        }

        let dragging = response.dragged() || response.is_pointer_button_down_on();
        let state = if dragging {
            WidgetState::Dragged
        } else if response.hovered() {
            WidgetState::Hovered
        } else {
            WidgetState::Idle
        };

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect.center(), state);
        }

        match self.hover_text(dragging) {
            Some(text) => response.on_hover_text_at_pointer(text),
            None => response,
        }
    }
}

/// Angle of the pointer for a normalized value.
pub fn knob_angle(normalized: f32) -> f32 {
    ANGLE_MIN + (ANGLE_MAX - ANGLE_MIN) * normalized.clamp(0.0, 1.0)
}

/// New normalized value after `points` of pointer travel from `start`.
pub fn drag_to_normalized(start: f32, points: f32) -> f32 {
    (start + points / DRAG_RANGE_POINTS).clamp(0.0, 1.0)
}

/// Evenly spaced angles for `ticks` rim marks, first at the minimum and
/// last at the maximum.
pub fn tick_angles(ticks: usize) -> impl Iterator<Item = f32> {
    let last = ticks.saturating_sub(1).max(1) as f32;
    (0..ticks).map(move |n| knob_angle(n as f32 / last))
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// A radial line between two fractions of the radius.
fn tick_shape(
    center: Pos2,
    radius: f32,
    start: f32,
    end: f32,
    width: f32,
    angle: f32,
    color: Color32,
) -> Shape {
    Shape::line_segment(
        [
            polar(center, radius * start, angle),
            polar(center, radius * end, angle),
        ],
        Stroke::new(radius * width * 2.0, color),
    )
}

/// An open arc approximated by a polyline.
fn arc_shape(
    center: Pos2,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    thickness: f32,
    color: Color32,
) -> Shape {
    const SEGMENTS: usize = 24;
    let points = (0..=SEGMENTS)
        .map(|i| {
            let angle = start_angle + (end_angle - start_angle) * i as f32 / SEGMENTS as f32;
            polar(center, radius, angle)
        })
        .collect();
    Shape::line(points, Stroke::new(thickness, color))
}
