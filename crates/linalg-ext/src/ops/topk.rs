use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{ElementType, Operand, Region, ValueType};
use crate::shape_helpers::{axis_index, shapes_compatible};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Selects the top-k values (and their indices) along `dimension`.
///
/// `inputs = [values]` or `[values, indices]`; `outputs = [values, indices]`, where the output
/// extent along `dimension` is `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct TopkOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub dimension: i64,
    pub region: Region,
}

impl TopkOp {
    pub fn new(
        inputs: Vec<Operand>,
        output_values: Operand,
        output_indices: Operand,
        dimension: i64,
        region: Region,
    ) -> Self {
        Self {
            inputs,
            outputs: vec![output_values, output_indices],
            dimension,
            region,
        }
    }
}

impl DestinationStyleOp for TopkOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Topk
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1, 2], "expected one or two input operands")?;
        cx.expect_outputs(&[2], "expected two output operands")?;
        let values = cx.input_shaped(0, "input values")?;
        let indices = if cx.num_inputs() == 2 {
            Some(cx.input_shaped(1, "input indices")?)
        } else {
            None
        };
        let output_values = cx.output_shaped(0, "output values")?;
        let output_indices = cx.output_shaped(1, "output indices")?;

        let Some(dimension) = axis_index(self.dimension, values.rank()) else {
            return Err(cx.op_error(VerifyErrorKind::Attribute, "dimension exceeds rank"));
        };
        if values.element_type != output_values.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(0),
                "expected input/output value types to be identical",
            ));
        }
        let indices_are_i32 = output_indices.element_type == ElementType::I32
            && indices.map_or(true, |indices| indices.element_type == ElementType::I32);
        if !indices_are_i32 {
            return Err(cx.op_error(
                VerifyErrorKind::ElementType,
                "expected input/output indices types to be int32",
            ));
        }

        if values.rank() != output_values.rank() {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected input/output to have the same rank",
            ));
        }
        if let Some(indices) = indices {
            if indices.rank() != output_indices.rank() {
                return Err(cx.error(
                    VerifyErrorKind::Rank,
                    DiagnosticLocation::output(1),
                    "expected input/output to have the same rank",
                ));
            }
            if !shapes_compatible(&values.shape, &indices.shape) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(1),
                    "input indices/values shape must match",
                ));
            }
        }
        if !shapes_compatible(&output_values.shape, &output_indices.shape) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(1),
                "output indices/values shape must match",
            ));
        }
        let compatible_except_dimension = values
            .shape
            .dims()
            .iter()
            .zip(output_values.shape.dims())
            .enumerate()
            .all(|(axis, (lhs, rhs))| axis == dimension || lhs.compatible_with(*rhs));
        if !compatible_except_dimension {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(0),
                "incompatible input/output shapes",
            ));
        }

        if self.region.num_arguments() != 2 {
            return Err(cx.op_error(
                VerifyErrorKind::Region,
                "region block should have 2 arguments",
            ));
        }
        let element_type = ValueType::Scalar(values.element_type);
        if let Some(index) = (0..2).find(|&index| self.region.argument(index) != Some(&element_type))
        {
            return Err(cx.error(
                VerifyErrorKind::Region,
                DiagnosticLocation::RegionArgument(index),
                "region block types must match input",
            ));
        }
        let yields_i1 = matches!(
            self.region.yielded.as_slice(),
            [ValueType::Scalar(ty)] if ty.is_integer_of_width(1)
        );
        if !yields_i1 {
            return Err(cx.error(
                VerifyErrorKind::Region,
                DiagnosticLocation::Terminator,
                "region block must end with a linalg_ext.yield i1!",
            ));
        }
        Ok(())
    }
}
