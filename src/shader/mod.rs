//! Shader composition
//!
//! The built-in PBR shader exposes three injection points. A
//! [`ShaderInjection`] collects code fragments per point, splices them into
//! the template and validates the result with naga. Uniforms declared by the
//! fragments in [`CUSTOM_UNIFORM_GROUP`] are reflected into a [`UniformBlock`].

mod uniforms;

pub use uniforms::*;

use std::path::Path;

use crate::error::{ViewerError, ViewerResult};

/// Built-in PBR shader template
pub const PBR_TEMPLATE: &str = include_str!("pbr.wgsl");

/// Fullscreen skybox shader
pub const SKYBOX_SHADER: &str = include_str!("skybox.wgsl");

/// Bind group reserved for uniforms declared by injected code
pub const CUSTOM_UNIFORM_GROUP: u32 = 3;

/// Named extension point of the PBR template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionBlock {
    /// Module scope, ahead of the vertex and fragment entry points
    Declaration,
    /// Fragment stage, after direct lighting has been accumulated
    Light,
    /// Fragment stage, right before the output color is returned
    Output,
}

impl InjectionBlock {
    pub const ALL: [InjectionBlock; 3] = [
        InjectionBlock::Declaration,
        InjectionBlock::Light,
        InjectionBlock::Output,
    ];

    /// Marker line in the template that this block replaces
    pub fn marker(self) -> &'static str {
        match self {
            InjectionBlock::Declaration => "//#inject:decl",
            InjectionBlock::Light => "//#inject:light",
            InjectionBlock::Output => "//#inject:output",
        }
    }
}

/// Code fragments to splice into a shader template
#[derive(Debug, Clone, Default)]
pub struct ShaderInjection {
    fragments: Vec<(InjectionBlock, String)>,
}

impl ShaderInjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add module-scope declarations
    pub fn with_declaration(self, code: impl Into<String>) -> Self {
        self.with_block(InjectionBlock::Declaration, code)
    }

    /// Add code to an arbitrary block. Repeated additions to the same block
    /// are emitted in insertion order.
    pub fn with_block(mut self, block: InjectionBlock, code: impl Into<String>) -> Self {
        self.fragments.push((block, code.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn code_for(&self, block: InjectionBlock) -> Option<String> {
        let parts: Vec<&str> = self
            .fragments
            .iter()
            .filter(|(b, _)| *b == block)
            .map(|(_, code)| code.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }

    /// Splice the fragments into `template`.
    ///
    /// Markers without fragments are left in place (they are plain comments).
    /// A fragment whose marker is missing from the template is an error.
    pub fn compose(&self, template: &str) -> ViewerResult<String> {
        for block in InjectionBlock::ALL {
            if self.code_for(block).is_some() && !has_marker(template, block) {
                return Err(ViewerError::Shader(format!(
                    "template has no {} marker",
                    block.marker()
                )));
            }
        }

        let mut out = String::with_capacity(template.len() + 1024);
        for line in template.lines() {
            let injected = InjectionBlock::ALL
                .into_iter()
                .find(|block| line.trim() == block.marker())
                .and_then(|block| self.code_for(block));
            match injected {
                Some(code) => out.push_str(&code),
                None => out.push_str(line),
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Compose the PBR template, validate it and reflect its custom uniforms
    pub fn build(&self) -> ViewerResult<ComposedShader> {
        let source = self.compose(PBR_TEMPLATE)?;
        let module = validate_wgsl(&source)?;
        let uniforms = UniformBlock::reflect(&module, CUSTOM_UNIFORM_GROUP);
        if let Some(block) = &uniforms {
            log::info!(
                "Reflected {} custom uniforms ({} bytes)",
                block.len(),
                block.bytes().len()
            );
        }
        Ok(ComposedShader { source, uniforms })
    }
}

fn has_marker(template: &str, block: InjectionBlock) -> bool {
    template.lines().any(|line| line.trim() == block.marker())
}

/// A validated PBR shader plus the CPU mirror of its custom uniforms
#[derive(Debug, Clone)]
pub struct ComposedShader {
    pub source: String,
    pub uniforms: Option<UniformBlock>,
}

/// Read a shader fragment from `dir`
pub fn load_shader_fragment(dir: &Path, name: &str) -> ViewerResult<String> {
    let path = dir.join(name);
    std::fs::read_to_string(&path).map_err(|e| ViewerError::asset(&path, e))
}

/// Parse and validate WGSL source
pub fn validate_wgsl(source: &str) -> ViewerResult<naga::Module> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ViewerError::Shader(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ViewerError::Shader(format!("Validation error: {e}")))?;

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BXDF_DEC: &str = include_str!("../../assets/shaders/bxdf_dec.frag");
    const BXDF_IMPL: &str = include_str!("../../assets/shaders/bxdf_impl.frag");

    #[test]
    fn builtin_shaders_validate() {
        validate_wgsl(PBR_TEMPLATE).unwrap();
        validate_wgsl(SKYBOX_SHADER).unwrap();
    }

    #[test]
    fn template_without_fragments_has_no_custom_uniforms() {
        let shader = ShaderInjection::new().build().unwrap();
        assert!(shader.uniforms.is_none());
    }

    #[test]
    fn bxdf_fragments_compose_into_a_valid_shader() {
        let shader = ShaderInjection::new()
            .with_declaration(BXDF_DEC)
            .with_block(InjectionBlock::Light, BXDF_IMPL)
            .build()
            .unwrap();

        let uniforms = shader.uniforms.expect("bxdf uniforms are reflected");
        for name in ["sheen", "sheenTint", "clearcoat", "clearcoatGloss"] {
            assert!(uniforms.contains(name), "missing uniform {name}");
        }
        let is_marker = |marker: &str| shader.source.lines().any(|line| line.trim() == marker);
        assert!(!is_marker(InjectionBlock::Light.marker()));
        assert!(is_marker(InjectionBlock::Output.marker()));

        let lighting = shader.source.find("var lighting").unwrap();
        let sheen = shader.source.find("bxdf.sheen").unwrap();
        let color = shader.source.find("var color = lighting").unwrap();
        assert!(lighting < sheen && sheen < color);
    }

    #[test]
    fn fragments_in_one_block_keep_their_order() {
        let composed = ShaderInjection::new()
            .with_block(InjectionBlock::Output, "// first")
            .with_block(InjectionBlock::Output, "// second")
            .compose(PBR_TEMPLATE)
            .unwrap();
        let first = composed.find("// first").unwrap();
        let second = composed.find("// second").unwrap();
        assert!(first < second);
    }

    #[rstest]
    #[case(InjectionBlock::Declaration)]
    #[case(InjectionBlock::Light)]
    #[case(InjectionBlock::Output)]
    fn missing_marker_is_rejected(#[case] block: InjectionBlock) {
        let err = ShaderInjection::new()
            .with_block(block, "// code")
            .compose("fn main() {}\n")
            .unwrap_err();
        assert!(matches!(err, ViewerError::Shader(_)));
    }

    #[test]
    fn broken_fragment_fails_validation() {
        let err = ShaderInjection::new()
            .with_block(InjectionBlock::Light, "lighting += undefined_symbol;")
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewerError::Shader(_)));
    }

    #[test]
    fn fragments_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.frag"), "// extra\n").unwrap();

        assert_eq!(load_shader_fragment(dir.path(), "extra.frag").unwrap(), "// extra\n");
        assert!(matches!(
            load_shader_fragment(dir.path(), "absent.frag"),
            Err(ViewerError::Asset { .. })
        ));
    }
}
