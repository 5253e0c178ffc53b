//! Batch verification over a list of operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{DiagnosticLocation, VerifyError, VerifyErrorKind};
use crate::ops::{Operation, OperationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifierConfig {
    /// Emit a `warn` record for every rejected operation.
    pub log_failures: bool,
    /// Stop at the first rejected operation.
    pub fail_fast: bool,
}

impl VerifierConfig {
    /// Reads `LINALG_EXT_LOG_FAILURES` and `LINALG_EXT_FAIL_FAST`.
    pub fn from_env() -> Self {
        Self {
            log_failures: env::log_failures_enabled(),
            fail_fast: env::fail_fast_enabled(),
        }
    }

    pub fn with_log_failures(mut self, enabled: bool) -> Self {
        self.log_failures = enabled;
        self
    }

    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub op_index: usize,
    pub op: OperationKind,
    pub kind: VerifyErrorKind,
    pub location: DiagnosticLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(op_index: usize, error: VerifyError) -> Self {
        Self {
            op_index,
            op: error.op,
            kind: error.kind,
            location: error.location,
            message: error.message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} error at {}): {}",
            self.op_index, self.op, self.kind, self.location, self.message
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} operation(s) failed verification", self.diagnostics.len())?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationReport {}

/// Verifies every operation with [`VerifierConfig::from_env`].
pub fn verify_operations(ops: &[Operation]) -> Result<(), VerificationReport> {
    verify_operations_with(ops, &VerifierConfig::from_env())
}

pub fn verify_operations_with(
    ops: &[Operation],
    config: &VerifierConfig,
) -> Result<(), VerificationReport> {
    let mut report = VerificationReport::default();
    for (index, op) in ops.iter().enumerate() {
        let Err(error) = op.verify() else {
            continue;
        };
        if config.log_failures {
            log::warn!("operation #{index} rejected: {error}");
        }
        report.diagnostics.push(Diagnostic::from_error(index, error));
        if config.fail_fast {
            break;
        }
    }
    log::debug!(
        "verified {} operation(s), {} rejected",
        ops.len(),
        report.diagnostics.len()
    );
    if report.is_ok() {
        Ok(())
    } else {
        Err(report)
    }
}
