//! Symbolic result extents.
//!
//! Reification describes each result extent either as a compile-time constant or as an
//! expression over runtime values (`dim(%v, axis)`, tile-size SSA values, ceiling divisions).

use std::fmt;

use crate::ir::{Dim, Operand, Shape, ValueId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimExpr {
    Constant(usize),
    /// Runtime extent of `value` along `axis`.
    DimOf { value: ValueId, axis: usize },
    /// An SSA index value, e.g. a dynamic tile size.
    Value(ValueId),
    CeilDiv(Box<DimExpr>, Box<DimExpr>),
}

impl fmt::Display for DimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimExpr::Constant(value) => write!(f, "{value}"),
            DimExpr::DimOf { value, axis } => write!(f, "dim({value}, {axis})"),
            DimExpr::Value(value) => write!(f, "{value}"),
            DimExpr::CeilDiv(lhs, rhs) => write!(f, "ceildiv({lhs}, {rhs})"),
        }
    }
}

/// One reified result extent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimValue {
    Static(usize),
    Dynamic(DimExpr),
}

impl DimValue {
    pub fn is_static(&self) -> bool {
        matches!(self, DimValue::Static(_))
    }

    pub fn static_value(&self) -> Option<usize> {
        match self {
            DimValue::Static(value) => Some(*value),
            DimValue::Dynamic(_) => None,
        }
    }

    /// Collapses the value to a type-level extent.
    pub fn as_dim(&self) -> Dim {
        match self {
            DimValue::Static(value) => Dim::Static(*value),
            DimValue::Dynamic(_) => Dim::Dynamic,
        }
    }

    /// Expression form; static values become constants.
    pub fn into_expr(self) -> DimExpr {
        match self {
            DimValue::Static(value) => DimExpr::Constant(value),
            DimValue::Dynamic(expr) => expr,
        }
    }

    /// Folds when both sides are static and the divisor is non-zero.
    pub fn ceil_div(self, divisor: DimValue) -> DimValue {
        match (&self, &divisor) {
            (DimValue::Static(value), DimValue::Static(divisor)) if *divisor != 0 => {
                DimValue::Static(value.div_ceil(*divisor))
            }
            _ => DimValue::Dynamic(DimExpr::CeilDiv(
                Box::new(self.into_expr()),
                Box::new(divisor.into_expr()),
            )),
        }
    }

    /// Turns a static value into a runtime constant expression; dynamic values pass through.
    pub fn into_dynamic(self) -> DimValue {
        DimValue::Dynamic(self.into_expr())
    }
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimValue::Static(value) => write!(f, "{value}"),
            DimValue::Dynamic(expr) => write!(f, "{expr}"),
        }
    }
}

/// One extent list per tensor-typed output.
pub type ReifiedShapes = Vec<Vec<DimValue>>;

/// Extents of a shaped operand: static axes as constants, dynamic axes as `dim(%v, axis)`.
/// Scalars have no extents.
pub fn mixed_sizes(operand: &Operand) -> Vec<DimValue> {
    let Some(shaped) = operand.shaped_type() else {
        return Vec::new();
    };
    shaped
        .shape
        .dims()
        .iter()
        .enumerate()
        .map(|(axis, dim)| match dim {
            Dim::Static(value) => DimValue::Static(*value),
            Dim::Dynamic => DimValue::Dynamic(DimExpr::DimOf {
                value: operand.id,
                axis,
            }),
        })
        .collect()
}

/// Type-level shape of reified extents: every runtime value becomes a dynamic axis.
pub fn as_shape_with_any_value_as_dynamic(values: &[DimValue]) -> Shape {
    values.iter().map(DimValue::as_dim).collect()
}

/// Identity reification used by every kind whose results mirror their outputs.
pub fn reify_from_outputs(outputs: &[Operand]) -> ReifiedShapes {
    let reified = outputs
        .iter()
        .filter(|operand| {
            operand
                .shaped_type()
                .map_or(false, |shaped| shaped.is_tensor())
        })
        .map(mixed_sizes)
        .collect::<ReifiedShapes>();
    log::trace!("reified {} result shape(s) from outputs", reified.len());
    reified
}
