//! Minimal shaped-value model the verifiers query: element types, extents, shapes, operands
//! and embedded bodies.

mod operand;
mod region;
mod types;

pub use operand::{Operand, OperandRole, ValueId};
pub use region::Region;
pub use types::{Dim, Dims, ElementType, Shape, ShapedType, StorageKind, ValueType};
