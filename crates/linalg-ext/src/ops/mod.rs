//! The operation catalog and the capability trait every kind implements.

mod attention;
mod fft;
mod pack;
mod reverse;
mod scan;
mod scatter;
mod sort;
mod topk;
mod winograd;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::{destination_effects, MemoryEffect};
use crate::error::{DiagnosticLocation, VerifyError, VerifyErrorKind, VerifyResult};
use crate::ir::{Operand, ShapedType};
use crate::reify::{reify_from_outputs, ReifiedShapes};

pub use attention::AttentionOp;
pub use fft::FftOp;
pub use pack::{PackOp, UnPackOp};
pub use reverse::ReverseOp;
pub use scan::ScanOp;
pub use scatter::ScatterOp;
pub use sort::SortOp;
pub use topk::TopkOp;
pub use winograd::{
    WinogradFilterTransformOp, WinogradInputTransformOp, WinogradOutputTransformOp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Scatter,
    Sort,
    Fft,
    Scan,
    Reverse,
    Topk,
    Pack,
    UnPack,
    WinogradInputTransform,
    WinogradFilterTransform,
    WinogradOutputTransform,
    Attention,
}

impl OperationKind {
    pub fn from_op(op: &Operation) -> Self {
        match op {
            Operation::Scatter(_) => OperationKind::Scatter,
            Operation::Sort(_) => OperationKind::Sort,
            Operation::Fft(_) => OperationKind::Fft,
            Operation::Scan(_) => OperationKind::Scan,
            Operation::Reverse(_) => OperationKind::Reverse,
            Operation::Topk(_) => OperationKind::Topk,
            Operation::Pack(_) => OperationKind::Pack,
            Operation::UnPack(_) => OperationKind::UnPack,
            Operation::WinogradInputTransform(_) => OperationKind::WinogradInputTransform,
            Operation::WinogradFilterTransform(_) => OperationKind::WinogradFilterTransform,
            Operation::WinogradOutputTransform(_) => OperationKind::WinogradOutputTransform,
            Operation::Attention(_) => OperationKind::Attention,
        }
    }

    /// Qualified mnemonic used as the diagnostic prefix.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Scatter => "linalg_ext.scatter",
            OperationKind::Sort => "linalg_ext.sort",
            OperationKind::Fft => "linalg_ext.fft",
            OperationKind::Scan => "linalg_ext.scan",
            OperationKind::Reverse => "linalg_ext.reverse",
            OperationKind::Topk => "linalg_ext.topk",
            OperationKind::Pack => "linalg_ext.pack",
            OperationKind::UnPack => "linalg_ext.unpack",
            OperationKind::WinogradInputTransform => "linalg_ext.winograd.input_transform",
            OperationKind::WinogradFilterTransform => "linalg_ext.winograd.filter_transform",
            OperationKind::WinogradOutputTransform => "linalg_ext.winograd.output_transform",
            OperationKind::Attention => "linalg_ext.attention",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities shared by every destination-passing operation.
///
/// Results mirror the tensor-typed outputs one-to-one; buffer outputs are updated in place and
/// produce no result.
pub trait DestinationStyleOp {
    fn kind(&self) -> OperationKind;

    fn inputs(&self) -> &[Operand];

    fn outputs(&self) -> &[Operand];

    /// Checks every structural invariant, returning the first violation.
    fn verify(&self) -> VerifyResult<()>;

    /// Result extents. Assumes the operation verified; never panics on malformed input.
    fn reify_result_shapes(&self) -> ReifiedShapes {
        reify_from_outputs(self.outputs())
    }

    fn effects(&self) -> Vec<MemoryEffect> {
        destination_effects(self.inputs(), self.outputs())
    }

    fn results(&self) -> Vec<ShapedType> {
        self.outputs()
            .iter()
            .filter_map(Operand::shaped_type)
            .filter(|shaped| shaped.is_tensor())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Scatter(ScatterOp),
    Sort(SortOp),
    Fft(FftOp),
    Scan(ScanOp),
    Reverse(ReverseOp),
    Topk(TopkOp),
    Pack(PackOp),
    UnPack(UnPackOp),
    WinogradInputTransform(WinogradInputTransformOp),
    WinogradFilterTransform(WinogradFilterTransformOp),
    WinogradOutputTransform(WinogradOutputTransformOp),
    Attention(AttentionOp),
}

impl Operation {
    fn as_dyn(&self) -> &dyn DestinationStyleOp {
        match self {
            Operation::Scatter(op) => op,
            Operation::Sort(op) => op,
            Operation::Fft(op) => op,
            Operation::Scan(op) => op,
            Operation::Reverse(op) => op,
            Operation::Topk(op) => op,
            Operation::Pack(op) => op,
            Operation::UnPack(op) => op,
            Operation::WinogradInputTransform(op) => op,
            Operation::WinogradFilterTransform(op) => op,
            Operation::WinogradOutputTransform(op) => op,
            Operation::Attention(op) => op,
        }
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::from_op(self)
    }

    pub fn inputs(&self) -> &[Operand] {
        self.as_dyn().inputs()
    }

    pub fn outputs(&self) -> &[Operand] {
        self.as_dyn().outputs()
    }

    pub fn verify(&self) -> VerifyResult<()> {
        let result = self.as_dyn().verify();
        match &result {
            Ok(()) => log::debug!("{} verified", self.kind()),
            Err(err) => log::debug!("{} failed verification: {}", self.kind(), err.message),
        }
        result
    }

    pub fn reify_result_shapes(&self) -> ReifiedShapes {
        self.as_dyn().reify_result_shapes()
    }

    pub fn effects(&self) -> Vec<MemoryEffect> {
        self.as_dyn().effects()
    }

    pub fn results(&self) -> Vec<ShapedType> {
        self.as_dyn().results()
    }
}

macro_rules! impl_from_op {
    ($($variant:ident => $op:ty),* $(,)?) => {
        $(
            impl From<$op> for Operation {
                fn from(op: $op) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

impl_from_op! {
    Scatter => ScatterOp,
    Sort => SortOp,
    Fft => FftOp,
    Scan => ScanOp,
    Reverse => ReverseOp,
    Topk => TopkOp,
    Pack => PackOp,
    UnPack => UnPackOp,
    WinogradInputTransform => WinogradInputTransformOp,
    WinogradFilterTransform => WinogradFilterTransformOp,
    WinogradOutputTransform => WinogradOutputTransformOp,
    Attention => AttentionOp,
}

/// Operand accessors that turn missing or mistyped operands into diagnostics.
pub(crate) struct VerifyCtx<'a> {
    kind: OperationKind,
    inputs: &'a [Operand],
    outputs: &'a [Operand],
}

impl<'a> VerifyCtx<'a> {
    pub(crate) fn new<T: DestinationStyleOp + ?Sized>(op: &'a T) -> Self {
        Self {
            kind: op.kind(),
            inputs: op.inputs(),
            outputs: op.outputs(),
        }
    }

    pub(crate) fn error(
        &self,
        kind: VerifyErrorKind,
        location: DiagnosticLocation,
        message: impl Into<String>,
    ) -> VerifyError {
        VerifyError::new(self.kind, kind, location, message)
    }

    pub(crate) fn op_error(&self, kind: VerifyErrorKind, message: impl Into<String>) -> VerifyError {
        self.error(kind, DiagnosticLocation::Op, message)
    }

    pub(crate) fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub(crate) fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Fails with an arity error unless the input count is one of `allowed`.
    pub(crate) fn expect_inputs(&self, allowed: &[usize], message: &str) -> VerifyResult<()> {
        if allowed.contains(&self.inputs.len()) {
            return Ok(());
        }
        Err(self.op_error(VerifyErrorKind::Arity, message))
    }

    pub(crate) fn expect_outputs(&self, allowed: &[usize], message: &str) -> VerifyResult<()> {
        if allowed.contains(&self.outputs.len()) {
            return Ok(());
        }
        Err(self.op_error(VerifyErrorKind::Arity, message))
    }

    pub(crate) fn input(&self, index: usize) -> VerifyResult<&'a Operand> {
        self.inputs.get(index).ok_or_else(|| {
            self.op_error(VerifyErrorKind::Arity, format!("missing input #{index}"))
        })
    }

    pub(crate) fn output(&self, index: usize) -> VerifyResult<&'a Operand> {
        self.outputs.get(index).ok_or_else(|| {
            self.op_error(VerifyErrorKind::Arity, format!("missing output #{index}"))
        })
    }

    pub(crate) fn input_shaped(&self, index: usize, what: &str) -> VerifyResult<&'a ShapedType> {
        self.input(index)?.shaped_type().ok_or_else(|| {
            self.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(index),
                format!("expected {what} to be a shaped value"),
            )
        })
    }

    pub(crate) fn output_shaped(&self, index: usize, what: &str) -> VerifyResult<&'a ShapedType> {
        self.output(index)?.shaped_type().ok_or_else(|| {
            self.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::output(index),
                format!("expected {what} to be a shaped value"),
            )
        })
    }
}
