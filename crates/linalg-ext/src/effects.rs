use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::{Operand, ValueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Read,
    Write,
}

/// Memory resource an effect applies to. Every buffer lives in the default resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resource {
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryEffect {
    pub kind: EffectKind,
    pub value: ValueId,
    pub resource: Resource,
}

impl MemoryEffect {
    pub fn read(value: ValueId) -> Self {
        Self {
            kind: EffectKind::Read,
            value,
            resource: Resource::Default,
        }
    }

    pub fn write(value: ValueId) -> Self {
        Self {
            kind: EffectKind::Write,
            value,
            resource: Resource::Default,
        }
    }
}

impl fmt::Display for MemoryEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            EffectKind::Read => "read",
            EffectKind::Write => "write",
        };
        write!(f, "{kind} {}", self.value)
    }
}

/// Buffer effects of a destination-passing operation.
///
/// Buffer inputs are read; buffer outputs are read and then written. Tensor and scalar operands
/// have value semantics and report nothing.
pub fn destination_effects(inputs: &[Operand], outputs: &[Operand]) -> Vec<MemoryEffect> {
    let mut effects = Vec::new();
    for operand in inputs.iter().filter(|operand| operand.ty.is_memref()) {
        effects.push(MemoryEffect::read(operand.id));
    }
    for operand in outputs.iter().filter(|operand| operand.ty.is_memref()) {
        effects.push(MemoryEffect::read(operand.id));
        effects.push(MemoryEffect::write(operand.id));
    }
    effects
}
