//! A pill-shaped on/off switch bound to a [`BoolParam`].

use nih_plug::prelude::{BoolParam, Param, ParamSetter};
use nih_plug_egui::egui::{lerp, pos2, vec2, Response, Sense, Ui, Widget};

use super::theme::{self, KnobColors, WidgetState};

pub struct ParamToggle<'a> {
    param: &'a BoolParam,
    setter: &'a ParamSetter<'a>,
    colors: KnobColors,
}

impl<'a> ParamToggle<'a> {
    pub fn for_param(param: &'a BoolParam, setter: &'a ParamSetter<'a>) -> Self {
        Self {
            param,
            setter,
            colors: KnobColors::new(theme::YELLOW, theme::YELLOW_BR),
        }
    }

    pub fn with_colors(mut self, colors: KnobColors) -> Self {
        self.colors = colors;
        self
    }

    /// Flip the value as a single gesture.
    fn toggle(&self) {
        let next = !self.param.value();
        self.setter.begin_set_parameter(self.param);
        self.setter.set_parameter(self.param, next);
        self.setter.end_set_parameter(self.param);
    }
}

impl Widget for ParamToggle<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let size = ui.spacing().interact_size.y * vec2(2.0, 1.0);
        let (rect, mut response) = ui.allocate_exact_size(size, Sense::click());

        if response.clicked() {
            self.toggle();
            response.mark_changed();
        }

        if ui.is_rect_visible(rect) {
            let on = self.param.value();
            let how_on = ui.ctx().animate_bool(response.id, on);
            let state = if response.hovered() {
                WidgetState::Hovered
            } else {
                WidgetState::Idle
            };

            let radius = rect.height() / 2.0;
            let fill = if on {
                self.colors.primary(state)
            } else {
                theme::TRACK
            };
            let painter = ui.painter();
            painter.rect_filled(rect, radius, fill);

            let knob_x = lerp((rect.left() + radius)..=(rect.right() - radius), how_on);
            painter.circle_filled(
                pos2(knob_x, rect.center().y),
                radius * 0.75,
                theme::TITLE_TEXT,
            );
        }

        let text = self.param.normalized_value_to_string(
            self.param.unmodulated_normalized_value(),
            true,
        );
        response.on_hover_text_at_pointer(text)
    }
}
