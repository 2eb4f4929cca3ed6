use std::collections::HashSet;

use crate::control::UniformWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    F32,
    Other,
}

#[derive(Debug, Clone)]
struct UniformMember {
    name: String,
    offset: usize,
    kind: MemberKind,
}

/// CPU mirror of a uniform struct declared by injected shader code.
///
/// The layout comes from naga reflection, so writes land at the offsets the
/// GPU expects. Names the shader does not declare are dropped with a single
/// warning per name.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    binding: u32,
    members: Vec<UniformMember>,
    data: Vec<u8>,
    dropped: HashSet<String>,
}

impl UniformBlock {
    /// Reflect the first uniform-buffer struct bound in `group`
    pub fn reflect(module: &naga::Module, group: u32) -> Option<Self> {
        module.global_variables.iter().find_map(|(_, var)| {
            if var.space != naga::AddressSpace::Uniform {
                return None;
            }
            let binding = var.binding.as_ref().filter(|b| b.group == group)?;
            let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
                return None;
            };

            let members = members
                .iter()
                .filter_map(|m| {
                    let kind = match module.types[m.ty].inner {
                        naga::TypeInner::Scalar(naga::Scalar {
                            kind: naga::ScalarKind::Float,
                            width: 4,
                        }) => MemberKind::F32,
                        _ => MemberKind::Other,
                    };
                    Some(UniformMember {
                        name: m.name.clone()?,
                        offset: m.offset as usize,
                        kind,
                    })
                })
                .collect();

            // Uniform buffer bindings are sized in 16-byte steps
            let size = (*span as usize).div_ceil(16).max(1) * 16;
            Some(Self {
                binding: binding.binding,
                members,
                data: vec![0; size],
                dropped: HashSet::new(),
            })
        })
    }

    /// Binding index inside the custom uniform group
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Number of named members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Raw bytes ready for upload
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read back a float member
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        let member = self
            .members
            .iter()
            .find(|m| m.name == name && m.kind == MemberKind::F32)?;
        let bytes = self.data.get(member.offset..member.offset + 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Some(f32::from_le_bytes(raw))
    }

    fn drop_write(&mut self, name: &str, reason: &str) {
        if !self.dropped.contains(name) {
            log::warn!("Ignoring uniform write to '{name}': {reason}");
            self.dropped.insert(name.to_string());
        }
    }
}

impl UniformWriter for UniformBlock {
    fn set_uniform_f(&mut self, name: &str, value: f32) {
        let member = self
            .members
            .iter()
            .find(|m| m.name == name)
            .map(|m| (m.offset, m.kind));
        match member {
            Some((start, MemberKind::F32)) => {
                if let Some(slot) = self.data.get_mut(start..start + 4) {
                    slot.copy_from_slice(&value.to_le_bytes());
                }
            }
            Some(_) => self.drop_write(name, "not a scalar float"),
            None => self.drop_write(name, "not declared by the shader"),
        }
    }
}
