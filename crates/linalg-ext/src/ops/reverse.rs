use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::Operand;
use crate::shape_helpers::{axis_index, check_dim_set, shapes_compatible, DimSetViolation};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Reverses the input along each axis in `dimensions`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub dimensions: Vec<i64>,
}

impl ReverseOp {
    pub fn new(input: Operand, output: Operand, dimensions: Vec<i64>) -> Self {
        Self {
            inputs: vec![input],
            outputs: vec![output],
            dimensions,
        }
    }
}

impl DestinationStyleOp for ReverseOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Reverse
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1], "expected exactly one input")?;
        cx.expect_outputs(&[1], "expected exactly one output")?;
        let input = cx.input_shaped(0, "input")?;
        let output = cx.output_shaped(0, "output")?;

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

        let rank = input.rank();
        if let Err(violation) = check_dim_set(&self.dimensions, rank) {
            // Range errors win over repeats, whichever the dim-set check saw first.
            let out_of_bounds = matches!(violation, DimSetViolation::OutOfBounds(_))
                || self
                    .dimensions
                    .iter()
                    .any(|&dim| axis_index(dim, rank).is_none());
            if out_of_bounds {
                return Err(cx.op_error(
                    VerifyErrorKind::Attribute,
                    format!("all the dimensions must be within [0, {rank})"),
                ));
            }
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                "expected dimensions numbers are all unique",
            ));
        }
        Ok(())
    }
}
