//! Headless egui frames and a host stand-in that records every parameter
//! gesture, for driving the widgets from tests.

use std::sync::Mutex;

use nih_plug::prelude::{GuiContext, ParamPtr, PluginApi, PluginState};
use nih_plug_egui::egui::{
    pos2, vec2, CentralPanel, Context, Event, Modifiers, PointerButton, Pos2, RawInput, Rect,
    Response, Ui,
};

/// One call the widget made on the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Begin,
    Set(f32),
    End,
}

/// A [`GuiContext`] that only writes down what it is asked to do.
///
/// Parameter values are never changed, so a widget that reads its value
/// back from the parameter sees the same value every frame.
#[derive(Default)]
pub struct RecordingContext {
    gestures: Mutex<Vec<Gesture>>,
}

impl RecordingContext {
    pub fn gestures(&self) -> Vec<Gesture> {
        self.gestures.lock().unwrap().clone()
    }

    fn record(&self, gesture: Gesture) {
        self.gestures.lock().unwrap().push(gesture);
    }
}

impl GuiContext for RecordingContext {
    fn plugin_api(&self) -> PluginApi {
        PluginApi::Clap
    }

    fn request_resize(&self) -> bool {
        false
    }

    unsafe fn raw_begin_set_parameter(&self, _param: ParamPtr) {
        self.record(Gesture::Begin);
    }

    unsafe fn raw_set_parameter_normalized(&self, _param: ParamPtr, normalized: f32) {
        self.record(Gesture::Set(normalized));
    }

    unsafe fn raw_end_set_parameter(&self, _param: ParamPtr) {
        self.record(Gesture::End);
    }

    fn get_state(&self) -> PluginState {
        unimplemented!("widgets never read the plugin state")
    }

    fn set_state(&self, _state: PluginState) {}
}

/// Check that every `Set` sits inside a `Begin`/`End` pair and that
/// gestures neither nest nor stay open.
pub fn assert_gestures_balanced(gestures: &[Gesture]) {
    let mut open = false;
    for (i, gesture) in gestures.iter().enumerate() {
        match gesture {
            Gesture::Begin => {
                assert!(!open, "nested begin at {i}: {gestures:?}");
                open = true;
            }
            Gesture::Set(_) => assert!(open, "set outside a gesture at {i}: {gestures:?}"),
            Gesture::End => {
                assert!(open, "end without begin at {i}: {gestures:?}");
                open = false;
            }
        }
    }
    assert!(!open, "gesture left open: {gestures:?}");
}

/// All `Set` values, in order.
pub fn set_values(gestures: &[Gesture]) -> Vec<f32> {
    gestures
        .iter()
        .filter_map(|gesture| match gesture {
            Gesture::Set(value) => Some(*value),
            _ => None,
        })
        .collect()
}

/// Feeds egui one frame at a time with synthetic pointer input.
pub struct Frames {
    ctx: Context,
    time: f64,
}

impl Frames {
    const FRAME_SECONDS: f64 = 1.0 / 60.0;

    pub fn new() -> Self {
        Self {
            ctx: Context::default(),
            time: 0.0,
        }
    }

    /// Run one frame with `events`, laying out `widget` in a central
    /// panel, and return its response.
    pub fn run(
        &mut self,
        events: Vec<Event>,
        mut widget: impl FnMut(&mut Ui) -> Response,
    ) -> Response {
        self.time += Self::FRAME_SECONDS;
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(400.0, 400.0))),
            time: Some(self.time),
            events,
            ..Default::default()
        };

        let mut response = None;
        let _ = self.ctx.run(input, |ctx| {
            CentralPanel::default().show(ctx, |ui| {
                response = Some(widget(ui));
            });
        });
        response.expect("the widget was laid out")
    }

    /// A couple of idle frames so layout settles, returning the widget's
    /// centre.
    pub fn settle(&mut self, mut widget: impl FnMut(&mut Ui) -> Response) -> Pos2 {
        self.run(Vec::new(), &mut widget);
        self.run(Vec::new(), &mut widget).rect.center()
    }
}

pub fn move_to(pos: Pos2) -> Event {
    Event::PointerMoved(pos)
}

pub fn press(pos: Pos2) -> Event {
    button(pos, true)
}

pub fn release(pos: Pos2) -> Event {
    button(pos, false)
}

fn button(pos: Pos2, pressed: bool) -> Event {
    Event::PointerButton {
        pos,
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::NONE,
    }
}

/// `pos` moved `points` upward on screen.
pub fn above(pos: Pos2, points: f32) -> Pos2 {
    pos2(pos.x, pos.y - points)
}
