use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{ElementType, Shape, ShapedType, ValueType};

/// Unique identifier for SSA values referenced by operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Which operand list an operand belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandRole {
    Input,
    Output,
}

/// An SSA value bound to an operation, with a snapshot of its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operand {
    pub id: ValueId,
    pub ty: ValueType,
}

impl Operand {
    pub fn new(id: ValueId, ty: impl Into<ValueType>) -> Self {
        Self { id, ty: ty.into() }
    }

    pub fn tensor(id: u32, shape: Shape, element_type: ElementType) -> Self {
        Self::new(ValueId(id), ShapedType::tensor(shape, element_type))
    }

    pub fn memref(id: u32, shape: Shape, element_type: ElementType) -> Self {
        Self::new(ValueId(id), ShapedType::memref(shape, element_type))
    }

    pub fn scalar(id: u32, element_type: ElementType) -> Self {
        Self::new(ValueId(id), element_type)
    }

    pub fn shaped_type(&self) -> Option<&ShapedType> {
        self.ty.as_shaped()
    }

    pub fn is_scalar(&self) -> bool {
        self.ty.is_scalar()
    }

    pub fn element_type(&self) -> ElementType {
        self.ty.element_type()
    }
}
