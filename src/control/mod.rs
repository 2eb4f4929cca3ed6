//! Live material-parameter control loop
//!
//! Slider changes flow into a [`ParameterControl`] through the
//! [`MaterialParameterSink`] observer interface. Native parameters land on the
//! actor's [`PbrProperties`] right away; extended BRDF parameters are kept in
//! [`MaterialParameters`] and pushed to the shader by
//! [`ParameterControl::on_uniform_upload`] before every draw.
//!
//! Everything here runs on the event-loop thread, so no locking is involved.

mod layout;

pub use layout::*;

use crate::resources::{MaterialParameter, MaterialParameters, PbrProperties};

/// Receives material parameter changes from the UI
pub trait MaterialParameterSink {
    fn set(&mut self, parameter: MaterialParameter, value: f32);
}

/// Per-draw access to the shader uniforms of one actor
pub trait UniformWriter {
    /// Set a scalar float uniform. Unknown names are dropped by the implementor.
    fn set_uniform_f(&mut self, name: &str, value: f32);
}

/// Process-lifetime state of the extended material parameters
#[derive(Debug, Clone, Default)]
pub struct ParameterControl {
    params: MaterialParameters,
}

impl ParameterControl {
    pub fn new(params: MaterialParameters) -> Self {
        Self { params }
    }

    /// Current extended parameters
    pub fn params(&self) -> &MaterialParameters {
        &self.params
    }

    /// Apply a slider change.
    ///
    /// Native parameters are written to `properties` and show up on the next
    /// draw. Extended parameters only update the control state; they reach the
    /// GPU through [`Self::on_uniform_upload`].
    pub fn on_slider_change(
        &mut self,
        properties: &mut PbrProperties,
        parameter: MaterialParameter,
        value: f32,
    ) {
        if parameter.is_native() {
            properties.set(parameter, value);
        } else {
            self.params.set(parameter, value);
        }
        log::debug!("{} -> {value:.3}", parameter.label());
    }

    /// Push every extended parameter to the shader. Called right before each
    /// draw of the shaded actor.
    pub fn on_uniform_upload<W: UniformWriter + ?Sized>(&self, uniforms: &mut W) {
        uniforms.set_uniform_f("sheen", self.params.sheen);
        uniforms.set_uniform_f("sheenTint", self.params.sheen_tint);
        uniforms.set_uniform_f("clearcoat", self.params.clearcoat);
        uniforms.set_uniform_f("clearcoatGloss", self.params.clearcoat_gloss);
    }

    /// Bind this control to the properties of the actor it drives
    pub fn bind<'a>(&'a mut self, properties: &'a mut PbrProperties) -> MaterialBinding<'a> {
        MaterialBinding {
            control: self,
            properties,
        }
    }
}

/// A [`ParameterControl`] paired with the actor properties it writes to
pub struct MaterialBinding<'a> {
    control: &'a mut ParameterControl,
    properties: &'a mut PbrProperties,
}

impl MaterialParameterSink for MaterialBinding<'_> {
    fn set(&mut self, parameter: MaterialParameter, value: f32) {
        self.control
            .on_slider_change(self.properties, parameter, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<(String, f32)>,
    }

    impl UniformWriter for RecordingWriter {
        fn set_uniform_f(&mut self, name: &str, value: f32) {
            self.writes.push((name.to_string(), value));
        }
    }

    impl RecordingWriter {
        fn last(&self, name: &str) -> Option<f32> {
            self.writes
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
        }
    }

    #[rstest]
    #[case(MaterialParameter::Sheen, 0.0)]
    #[case(MaterialParameter::SheenTint, 0.1)]
    #[case(MaterialParameter::Clearcoat, 0.55)]
    #[case(MaterialParameter::ClearcoatGloss, 1.0)]
    fn extended_value_is_uploaded_unchanged(#[case] parameter: MaterialParameter, #[case] value: f32) {
        let mut control = ParameterControl::default();
        let mut props = PbrProperties::default();
        let before = props.clone();

        control.on_slider_change(&mut props, parameter, value);
        assert_eq!(props, before, "extended parameters must not touch native properties");

        let mut writer = RecordingWriter::default();
        control.on_uniform_upload(&mut writer);
        let name = parameter.uniform_name().unwrap();
        assert_eq!(writer.last(name), Some(value));
    }

    #[rstest]
    #[case(MaterialParameter::Metallic, 0.7)]
    #[case(MaterialParameter::Specular, 0.2)]
    #[case(MaterialParameter::SpecularTint, 0.9)]
    #[case(MaterialParameter::Roughness, 0.35)]
    #[case(MaterialParameter::Opacity, 0.5)]
    fn native_value_is_visible_without_upload(#[case] parameter: MaterialParameter, #[case] value: f32) {
        let mut control = ParameterControl::default();
        let mut props = PbrProperties::default();

        control.on_slider_change(&mut props, parameter, value);

        assert_eq!(props.get(parameter), Some(value));
        assert_eq!(control.params(), &MaterialParameters::default());
    }

    #[test]
    fn upload_is_idempotent() {
        let mut control = ParameterControl::default();
        let mut props = PbrProperties::default();
        control.on_slider_change(&mut props, MaterialParameter::Clearcoat, 0.4);

        let mut first = RecordingWriter::default();
        let mut second = RecordingWriter::default();
        control.on_uniform_upload(&mut first);
        control.on_uniform_upload(&mut second);

        assert_eq!(first.writes, second.writes);
        assert_eq!(first.writes.len(), MaterialParameter::EXTENDED.len());
    }

    #[test]
    fn binding_routes_through_the_sink() {
        let mut control = ParameterControl::default();
        let mut props = PbrProperties::default();
        {
            let mut binding = control.bind(&mut props);
            binding.set(MaterialParameter::Roughness, 0.8);
            binding.set(MaterialParameter::Sheen, 0.3);
        }
        assert_eq!(props.roughness, 0.8);
        assert_eq!(control.params().sheen, 0.3);
    }
}
