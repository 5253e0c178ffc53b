use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{Dim, Operand};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// One butterfly stage of a radix-2 FFT over the innermost axis.
///
/// `inputs = [stage]` or `[stage, real_coeff, imag_coeff]`; `outputs = [real, imag]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FftOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
}

impl FftOp {
    pub fn new(inputs: Vec<Operand>, outputs: Vec<Operand>) -> Self {
        Self { inputs, outputs }
    }

    /// Innermost extent of the real output; dynamic when it cannot be read.
    pub fn fft_length(&self) -> Dim {
        self.outputs
            .first()
            .and_then(Operand::shaped_type)
            .and_then(|shaped| shaped.shape.dims().last().copied())
            .unwrap_or(Dim::Dynamic)
    }
}

impl DestinationStyleOp for FftOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Fft
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        let real = cx.output_shaped(0, "real output")?;
        if real.rank() == 0 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected real output to have at least rank 1",
            ));
        }
        // Tiled FFTs may lose the static length.
        let Some(length) = self.fft_length().static_value() else {
            return Ok(());
        };
        if !length.is_power_of_two() {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(0),
                "only powers of 2 are handled currently",
            ));
        }
        if !cx.input(0).map_or(false, Operand::is_scalar) {
            return Err(cx.op_error(VerifyErrorKind::Arity, "expected to carry `stage` input"));
        }
        if cx.num_inputs() != 1 {
            let coeffs_are_shaped = cx.num_inputs() == 3
                && !cx.input(1)?.is_scalar()
                && !cx.input(2)?.is_scalar();
            if !coeffs_are_shaped {
                return Err(cx.op_error(
                    VerifyErrorKind::Arity,
                    "expected to carry real and imag coeff inputs",
                ));
            }
        }
        cx.expect_outputs(&[2], "expected outputs to be real and imag tensor/memref")
    }
}
