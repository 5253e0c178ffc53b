use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::OperandRole;
use crate::ops::OperationKind;

/// Broad category of a verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerifyErrorKind {
    Arity,
    Rank,
    Shape,
    Attribute,
    ElementType,
    Region,
}

impl VerifyErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyErrorKind::Arity => "arity",
            VerifyErrorKind::Rank => "rank",
            VerifyErrorKind::Shape => "shape",
            VerifyErrorKind::Attribute => "attribute",
            VerifyErrorKind::ElementType => "element type",
            VerifyErrorKind::Region => "region",
        }
    }
}

impl fmt::Display for VerifyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticLocation {
    Op,
    Operand { role: OperandRole, index: usize },
    RegionArgument(usize),
    Terminator,
}

impl DiagnosticLocation {
    pub fn input(index: usize) -> Self {
        DiagnosticLocation::Operand {
            role: OperandRole::Input,
            index,
        }
    }

    pub fn output(index: usize) -> Self {
        DiagnosticLocation::Operand {
            role: OperandRole::Output,
            index,
        }
    }
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLocation::Op => f.write_str("op"),
            DiagnosticLocation::Operand {
                role: OperandRole::Input,
                index,
            } => write!(f, "input #{index}"),
            DiagnosticLocation::Operand {
                role: OperandRole::Output,
                index,
            } => write!(f, "output #{index}"),
            DiagnosticLocation::RegionArgument(index) => write!(f, "region argument #{index}"),
            DiagnosticLocation::Terminator => f.write_str("region terminator"),
        }
    }
}

/// First invariant an operation instance violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .op.name(), .message)]
pub struct VerifyError {
    pub op: OperationKind,
    pub kind: VerifyErrorKind,
    pub location: DiagnosticLocation,
    pub message: String,
}

impl VerifyError {
    pub fn new(
        op: OperationKind,
        kind: VerifyErrorKind,
        location: DiagnosticLocation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            op,
            kind,
            location,
            message: message.into(),
        }
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;
