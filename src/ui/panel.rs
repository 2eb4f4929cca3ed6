//! Material slider panel

use egui::{Color32, Id, Pos2, Rect};

use crate::control::{MaterialParameterSink, PanelLayout, ParameterControl};
use crate::resources::{MaterialParameter, PbrProperties};

/// Slider length in pixels
pub const SLIDER_LENGTH: f32 = 160.0;

const PANEL_ID: &str = "material_panel";
const PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(48, 48, 48, 191);
const PANEL_MARGIN: f32 = 12.0;

/// Rows drawn without a material parameter behind them, keyed by the
/// parameter slider they precede
const INERT_ROWS: [(&str, MaterialParameter); 2] = [
    ("Subsurface", MaterialParameter::Metallic),
    ("Anisotropic", MaterialParameter::Sheen),
];

/// One labelled slider, bound to a material parameter unless it is inert
#[derive(Debug, Clone, PartialEq)]
pub struct SliderWidget {
    pub label: &'static str,
    /// `None` for rows that move but change nothing
    pub parameter: Option<MaterialParameter>,
    pub value: f32,
    /// Upper end of the range; the lower end is 0
    pub max: f32,
    /// Track length in pixels
    pub length: f32,
    /// Digits shown after the decimal point
    pub decimals: usize,
    track: Option<Rect>,
}

impl SliderWidget {
    pub fn new(parameter: MaterialParameter, value: f32) -> Self {
        Self {
            parameter: Some(parameter),
            value,
            ..Self::inert(parameter.label())
        }
    }

    /// A slider starting at 0 that dispatches nothing
    pub fn inert(label: &'static str) -> Self {
        Self {
            label,
            parameter: None,
            value: 0.0,
            max: 1.0,
            length: SLIDER_LENGTH,
            decimals: 1,
            track: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.parameter.is_none()
    }

    /// Set the value, clamped to the slider range. Returns the stored value.
    pub fn set_value(&mut self, value: f32) -> f32 {
        self.value = value.clamp(0.0, self.max);
        self.value
    }

    /// Value as shown next to the track
    pub fn text(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }

    /// Screen rectangle of the track as of the last drawn frame
    pub fn track_rect(&self) -> Option<Rect> {
        self.track
    }
}

/// Panel of sliders: one per [`MaterialParameter`] plus the inert rows
#[derive(Debug, Clone)]
pub struct MaterialPanel {
    sliders: Vec<SliderWidget>,
}

impl MaterialPanel {
    /// Build the sliders with initial values taken from the current state
    pub fn new(control: &ParameterControl, properties: &PbrProperties) -> Self {
        let mut sliders = Vec::with_capacity(MaterialParameter::ALL.len() + INERT_ROWS.len());
        for parameter in MaterialParameter::ALL {
            if let Some(&(label, _)) = INERT_ROWS.iter().find(|(_, next)| *next == parameter) {
                sliders.push(SliderWidget::inert(label));
            }
            let value = properties
                .get(parameter)
                .or_else(|| control.params().get(parameter))
                .unwrap_or_default();
            sliders.push(SliderWidget::new(parameter, value));
        }
        Self { sliders }
    }

    pub fn sliders(&self) -> &[SliderWidget] {
        &self.sliders
    }

    pub fn slider(&self, parameter: MaterialParameter) -> Option<&SliderWidget> {
        self.sliders.iter().find(|s| s.parameter == Some(parameter))
    }

    /// Change a slider programmatically. The change is dispatched to `sink`
    /// exactly like a drag. Returns `false` if the panel has no such slider.
    pub fn set_slider(
        &mut self,
        parameter: MaterialParameter,
        value: f32,
        sink: &mut dyn MaterialParameterSink,
    ) -> bool {
        let Some(slider) = self.sliders.iter_mut().find(|s| s.parameter == Some(parameter)) else {
            return false;
        };
        let value = slider.set_value(value);
        sink.set(parameter, value);
        true
    }

    /// Draw the panel at `layout` and dispatch every slider moved this frame.
    /// Values are passed on unrounded; only the text shows `decimals` digits.
    /// Returns the number of dispatched changes.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        layout: &PanelLayout,
        sink: &mut dyn MaterialParameterSink,
    ) -> usize {
        let mut changed = Vec::new();

        egui::Area::new(Id::new(PANEL_ID))
            .fixed_pos(Pos2::new(layout.position.x, layout.position.y))
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(PANEL_FILL)
                    .rounding(4.0)
                    .inner_margin(PANEL_MARGIN)
                    .show(ui, |ui| {
                        ui.set_width(layout.size.x - 2.0 * PANEL_MARGIN);
                        ui.set_min_height(layout.size.y - 2.0 * PANEL_MARGIN);

                        egui::Grid::new("material_sliders")
                            .num_columns(3)
                            .spacing([12.0, 18.0])
                            .show(ui, |ui| {
                                for slider in &mut self.sliders {
                                    ui.colored_label(Color32::WHITE, slider.label);
                                    ui.spacing_mut().slider_width = slider.length;
                                    let response = ui.add(
                                        egui::Slider::new(&mut slider.value, 0.0..=slider.max)
                                            .show_value(false),
                                    );
                                    slider.track = Some(response.rect);
                                    ui.colored_label(Color32::WHITE, slider.text());
                                    if let (true, Some(parameter)) = (response.changed(), slider.parameter) {
                                        changed.push((parameter, slider.value));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });

        for &(parameter, value) in &changed {
            sink.set(parameter, value);
        }
        changed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<(MaterialParameter, f32)>,
    }

    impl MaterialParameterSink for RecordingSink {
        fn set(&mut self, parameter: MaterialParameter, value: f32) {
            self.calls.push((parameter, value));
        }
    }

    fn panel() -> MaterialPanel {
        let props = PbrProperties::default().with_opacity(0.5);
        MaterialPanel::new(&ParameterControl::default(), &props)
    }

    #[test]
    fn one_slider_per_parameter_in_order() {
        let panel = panel();
        let labels: Vec<&str> = panel.sliders().iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            [
                "Subsurface",
                "Metallic",
                "Specular",
                "Specular Tint",
                "Roughness",
                "Anisotropic",
                "Sheen",
                "Sheen Tint",
                "Clearcoat",
                "Clearcoat Gloss",
                "Opacity"
            ]
        );
        assert!(panel.sliders().iter().all(|s| s.max == 1.0 && s.length == 160.0));
        let inert: Vec<&str> = panel.sliders().iter().filter(|s| s.is_inert()).map(|s| s.label).collect();
        assert_eq!(inert, ["Subsurface", "Anisotropic"]);
    }

    #[test]
    fn initial_values_come_from_the_state() {
        let panel = panel();
        assert_eq!(panel.slider(MaterialParameter::Opacity).unwrap().value, 0.5);
        assert_eq!(panel.slider(MaterialParameter::Sheen).unwrap().value, 0.0);
        assert_eq!(panel.slider(MaterialParameter::Opacity).unwrap().text(), "0.5");
    }

    #[rstest]
    #[case(0.3, 0.3)]
    #[case(-0.2, 0.0)]
    #[case(1.7, 1.0)]
    fn programmatic_change_is_clamped_and_dispatched(#[case] requested: f32, #[case] expected: f32) {
        let mut panel = panel();
        let mut sink = RecordingSink::default();

        assert!(panel.set_slider(MaterialParameter::ClearcoatGloss, requested, &mut sink));

        assert_eq!(sink.calls, vec![(MaterialParameter::ClearcoatGloss, expected)]);
        assert_eq!(panel.slider(MaterialParameter::ClearcoatGloss).unwrap().value, expected);
    }

    #[test]
    fn idle_frame_dispatches_nothing() {
        let mut panel = panel();
        let mut sink = RecordingSink::default();
        let layout = PanelLayout::default();
        let ctx = egui::Context::default();

        let mut dispatched = 0;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            dispatched = panel.show(ctx, &layout, &mut sink);
        });

        assert_eq!(dispatched, 0);
        assert!(sink.calls.is_empty());
    }

    fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, egui::vec2(1280.0, 720.0))),
            events,
            ..Default::default()
        }
    }

    /// Press and release the mouse at `fraction` of the track of row `row`
    fn click_track(panel: &mut MaterialPanel, row: usize, fraction: f32) -> RecordingSink {
        let ctx = egui::Context::default();
        let layout = PanelLayout::default();
        let mut sink = RecordingSink::default();

        // New areas skip interaction on their first frame
        for _ in 0..2 {
            let _ = ctx.run(raw_input(Vec::new()), |ctx| {
                panel.show(ctx, &layout, &mut sink);
            });
        }
        let track = panel.sliders()[row].track_rect().unwrap();
        let pos = Pos2::new(track.left() + fraction * track.width(), track.center().y);

        for pressed in [true, false] {
            let events = vec![
                egui::Event::PointerMoved(pos),
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    modifiers: egui::Modifiers::default(),
                },
            ];
            let _ = ctx.run(raw_input(events), |ctx| {
                panel.show(ctx, &layout, &mut sink);
            });
        }
        sink
    }

    #[test]
    fn dragged_value_is_not_rounded_to_the_label() {
        let mut panel = panel();
        let row = panel
            .sliders()
            .iter()
            .position(|s| s.parameter == Some(MaterialParameter::Sheen))
            .unwrap();

        let sink = click_track(&mut panel, row, 0.3);

        let &(parameter, value) = sink.calls.last().unwrap();
        assert_eq!(parameter, MaterialParameter::Sheen);
        assert!(value > 0.25 && value < 0.32, "value {value}");
        assert!((value - 0.3).abs() > 0.01, "value {value} snapped to the label");
        let slider = panel.slider(MaterialParameter::Sheen).unwrap();
        assert_eq!(slider.value, value);
        assert_eq!(slider.text(), "0.3");
    }

    #[test]
    fn inert_row_moves_without_dispatching() {
        let mut panel = panel();
        let before = panel.sliders()[0].clone();
        assert_eq!(before.label, "Subsurface");

        let sink = click_track(&mut panel, 0, 0.7);

        assert!(sink.calls.is_empty());
        assert_eq!(before.value, 0.0);
        assert!(panel.sliders()[0].value > 0.5);
        let values = |p: &MaterialPanel| p.sliders()[1..].iter().map(|s| s.value).collect::<Vec<_>>();
        assert_eq!(values(&panel), values(&self::panel()));
    }
}
