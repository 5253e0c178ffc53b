//! Verification and result-shape reification for destination-passing structured tensor
//! operations: scatter, sort, FFT, scan, reverse, top-k, pack/unpack, the Winograd transforms
//! and attention.

pub mod effects;
pub mod error;
pub mod ir;
pub mod ops;
pub mod reify;
pub mod shape_helpers;
pub mod tiling;
pub mod verifier;
mod env;

pub use effects::{EffectKind, MemoryEffect, Resource};
pub use error::{DiagnosticLocation, VerifyError, VerifyErrorKind, VerifyResult};
pub use ir::{Dim, ElementType, Operand, Region, Shape, ShapedType, ValueId, ValueType};
pub use ops::{DestinationStyleOp, Operation, OperationKind};
pub use reify::{DimExpr, DimValue, ReifiedShapes};
pub use tiling::TileSize;
pub use verifier::{
    verify_operations, verify_operations_with, Diagnostic, VerificationReport, VerifierConfig,
};
