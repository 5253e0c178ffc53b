use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{Operand, Shape};
use crate::shape_helpers::{axis_index, shapes_compatible};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Prefix reduction along `dimension`. `outputs = [output, accumulator]`, where the
/// accumulator drops the scanned axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub dimension: i64,
    pub inclusive: bool,
}

impl ScanOp {
    pub fn new(
        input: Operand,
        output: Operand,
        accumulator: Operand,
        dimension: i64,
        inclusive: bool,
    ) -> Self {
        Self {
            inputs: vec![input],
            outputs: vec![output, accumulator],
            dimension,
            inclusive,
        }
    }
}

impl DestinationStyleOp for ScanOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Scan
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1], "expected one input operands")?;
        cx.expect_outputs(&[2], "expected two output operands")?;
        let input = cx.input_shaped(0, "first input")?;
        let output = cx.output_shaped(0, "output")?;
        let accumulator = cx.output_shaped(1, "accumulator")?;

        let Some(dimension) = axis_index(self.dimension, input.rank()) else {
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                format!("dimension must be within [0, {})", input.rank()),
            ));
        };
        if accumulator.element_type != input.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(1),
                "expected input/accumulator element types to be identical",
            ));
        }
        if accumulator.rank() + 1 != input.rank() {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(1),
                "expected accumulator rank to be equal to input rank - 1",
            ));
        }
        let expected_accumulator: Shape = input
            .shape
            .dims()
            .iter()
            .enumerate()
            .filter(|(axis, _)| *axis != dimension)
            .map(|(_, &dim)| dim)
            .collect();
        if !shapes_compatible(&expected_accumulator, &accumulator.shape) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(1),
                "incompatible input/accumulator shapes",
            ));
        }
        if input.element_type != output.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(0),
                "expected input/output element types to be identical",
            ));
        }
        if input.rank() != output.rank() {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected input/output to have identical ranks",
            ));
        }
        if !shapes_compatible(&input.shape, &output.shape) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(0),
                "incompatible input/output shapes",
            ));
        }
        Ok(())
    }
}
