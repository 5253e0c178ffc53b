use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{Operand, Region, ValueType};
use crate::shape_helpers::{axis_index, shapes_compatible};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// In-place sort of one or more outputs along `dimension`, ordered by a comparator body that
/// receives a pair of elements per output.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub dimension: i64,
    pub region: Region,
}

impl SortOp {
    pub fn new(outputs: Vec<Operand>, dimension: i64, region: Region) -> Self {
        Self {
            inputs: Vec::new(),
            outputs,
            dimension,
            region,
        }
    }
}

impl DestinationStyleOp for SortOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Sort
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        if cx.num_inputs() != 0 {
            return Err(cx.op_error(VerifyErrorKind::Arity, "does not expect to take any inputs"));
        }
        if cx.num_outputs() == 0 {
            return Err(cx.op_error(
                VerifyErrorKind::Arity,
                "expected at least one `outs` operand",
            ));
        }

        let num_outputs = cx.num_outputs();
        if self.region.num_arguments() != 2 * num_outputs {
            return Err(cx.op_error(
                VerifyErrorKind::Region,
                format!("region block should have {} arguments", 2 * num_outputs),
            ));
        }

        let first = cx.output_shaped(0, "sorted operand")?;
        let rank = first.rank();
        if axis_index(self.dimension, rank).is_none() {
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                format!("dimension must be within [0, {rank})"),
            ));
        }

        for index in 0..num_outputs {
            let operand = cx.output_shaped(index, "sorted operand")?;
            if operand.rank() != rank {
                return Err(cx.error(
                    VerifyErrorKind::Rank,
                    DiagnosticLocation::output(index),
                    format!("expected operand {index} to be rank {rank}, same as other operands"),
                ));
            }
            if !shapes_compatible(&operand.shape, &first.shape) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::output(index),
                    format!("expected operand {index} to have same shape as other operands"),
                ));
            }
            let element_type = ValueType::Scalar(operand.element_type);
            for arg in [2 * index, 2 * index + 1] {
                match self.region.argument(arg) {
                    Some(ty) if *ty == element_type => {}
                    found => {
                        let found = found.map_or_else(|| "nothing".to_string(), |ty| ty.to_string());
                        return Err(cx.error(
                            VerifyErrorKind::Region,
                            DiagnosticLocation::RegionArgument(arg),
                            format!(
                                "region block argument #{arg} should be of type {element_type} \
                                 but got {found}"
                            ),
                        ));
                    }
                }
            }
        }

        let [yielded] = self.region.yielded.as_slice() else {
            return Err(cx.error(
                VerifyErrorKind::Region,
                DiagnosticLocation::Terminator,
                "should yield exactly one operand",
            ));
        };
        if !yielded.as_scalar().map_or(false, |ty| ty.is_integer_of_width(1)) {
            return Err(cx.error(
                VerifyErrorKind::Region,
                DiagnosticLocation::Terminator,
                "should yield i1 type",
            ));
        }
        Ok(())
    }
}
