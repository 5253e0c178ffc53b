use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{Operand, Shape, ShapedType};
use crate::shape_helpers::shapes_compatible;

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Scaled dot-product attention.
///
/// `inputs = [query, key, value, scale]`. The plain form has `outputs = [output]` over
/// `[batch, seq, head]` operands; the tiled (flash) form has `outputs = [output, max, sum]`
/// over rank-2 operands with rank-1 running max and sum.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub transpose_v: bool,
}

impl AttentionOp {
    pub fn new(
        query: Operand,
        key: Operand,
        value: Operand,
        scale: Operand,
        outputs: Vec<Operand>,
    ) -> Self {
        Self {
            inputs: vec![query, key, value, scale],
            outputs,
            transpose_v: false,
        }
    }

    pub fn with_transpose_v(mut self, transpose_v: bool) -> Self {
        self.transpose_v = transpose_v;
        self
    }

    pub fn is_tiled(&self) -> bool {
        self.outputs.len() == 3
    }
}

fn check_rank(
    cx: &VerifyCtx<'_>,
    name: &str,
    location: DiagnosticLocation,
    ty: &ShapedType,
    expected: usize,
) -> VerifyResult<()> {
    if ty.rank() == expected {
        return Ok(());
    }
    Err(cx.error(
        VerifyErrorKind::Rank,
        location,
        format!("expected {name} to have rank {expected} but found {}", ty.rank()),
    ))
}

impl DestinationStyleOp for AttentionOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Attention
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[4], "expected 4 input operands: Query, Key, Value and Scale")?;
        cx.expect_outputs(&[1, 3], "expected 1 or 3 output operands: Output, [Max and Sum]")?;
        let tiled = self.is_tiled();
        let rank = if tiled { 2 } else { 3 };

        if let Some(index) = (0..3).find(|&index| self.inputs[index].shaped_type().is_none()) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(index),
                "expected Query, Key, Value inputs to be of shaped type",
            ));
        }
        let query = cx.input_shaped(0, "query")?;
        let key = cx.input_shaped(1, "key")?;
        let value = cx.input_shaped(2, "value")?;
        let output = cx.output_shaped(0, "output")?;

        let scale = match cx.input(3)?.ty.as_scalar() {
            Some(scale) if scale.is_float() => scale,
            _ => {
                return Err(cx.error(
                    VerifyErrorKind::ElementType,
                    DiagnosticLocation::input(3),
                    "expected scale to be of floating point type",
                ))
            }
        };

        check_rank(&cx, "query", DiagnosticLocation::input(0), query, rank)?;
        check_rank(&cx, "key", DiagnosticLocation::input(1), key, rank)?;
        check_rank(&cx, "value", DiagnosticLocation::input(2), value, rank)?;
        check_rank(&cx, "output", DiagnosticLocation::output(0), output, rank)?;

        let mut value_shape = value.shape.clone().into_dims();
        if self.transpose_v {
            value_shape.swap(rank - 2, rank - 1);
        }
        if !shapes_compatible(&key.shape, &Shape::new(value_shape)) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(2),
                "incompatible value shape",
            ));
        }
        if !shapes_compatible(&query.shape, &output.shape) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(0),
                "incompatible output shape",
            ));
        }
        let element_type = query.element_type;
        if key.element_type != element_type
            || value.element_type != element_type
            || scale != element_type
        {
            return Err(cx.op_error(
                VerifyErrorKind::ElementType,
                "element types of (Q)uery, (K)ey and (V)alue and scale should be same",
            ));
        }

        if !tiled {
            if output.element_type != element_type {
                return Err(cx.error(
                    VerifyErrorKind::ElementType,
                    DiagnosticLocation::output(0),
                    format!(
                        "expected element type for Output {element_type} but found {} instead",
                        output.element_type
                    ),
                ));
            }
            if !key.dim(2).compatible_with(query.dim(2)) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(1),
                    "query and key head dimension mismatch",
                ));
            }
            return Ok(());
        }

        let max = cx.output_shaped(1, "max")?;
        let sum = cx.output_shaped(2, "sum")?;
        check_rank(&cx, "max", DiagnosticLocation::output(1), max, 1)?;
        check_rank(&cx, "sum", DiagnosticLocation::output(2), sum, 1)?;
        if output.element_type != max.element_type || max.element_type != sum.element_type {
            return Err(cx.op_error(
                VerifyErrorKind::ElementType,
                "element types of tiled output, max and sum should be same",
            ));
        }
        if !shapes_compatible(&max.shape, &sum.shape) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(2),
                "incompatible sum shape",
            ));
        }
        if !max.dim(0).compatible_with(query.dim(0)) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(1),
                "Query and max dimension-0 mismatch",
            ));
        }
        Ok(())
    }
}
