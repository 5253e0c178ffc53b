//! Shared dimension-list and shape-compatibility helpers used across verifiers.

use std::collections::HashSet;

use thiserror::Error;

use crate::ir::{Dim, Shape};

/// First reason a list of dimension indices is rejected for a given rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DimSetViolation {
    #[error("{len} dimensions given for rank {rank}")]
    TooMany { len: usize, rank: usize },
    #[error("dimension {0} appears more than once")]
    Duplicate(i64),
    #[error("dimension {0} is out of bounds")]
    OutOfBounds(i64),
}

/// Checks `dims` for length, duplicates and bounds against `rank`, in that order.
pub fn check_dim_set(dims: &[i64], rank: usize) -> Result<(), DimSetViolation> {
    if dims.len() > rank {
        return Err(DimSetViolation::TooMany {
            len: dims.len(),
            rank,
        });
    }
    let mut seen = HashSet::with_capacity(dims.len());
    for &dim in dims {
        if !seen.insert(dim) {
            return Err(DimSetViolation::Duplicate(dim));
        }
    }
    match dims.iter().find(|&&dim| axis_index(dim, rank).is_none()) {
        Some(&dim) => Err(DimSetViolation::OutOfBounds(dim)),
        None => Ok(()),
    }
}

/// Returns `true` when `dims` has more entries than `rank`, contains a duplicate, or names an
/// axis outside `[0, rank)`.
pub fn is_invalid_dim_set(dims: &[i64], rank: usize) -> bool {
    check_dim_set(dims, rank).is_err()
}

/// Converts a signed axis attribute to an index when it lies in `[0, rank)`.
pub fn axis_index(dim: i64, rank: usize) -> Option<usize> {
    usize::try_from(dim).ok().filter(|&axis| axis < rank)
}

pub fn dims_compatible(lhs: Dim, rhs: Dim) -> bool {
    lhs.compatible_with(rhs)
}

/// Equal rank and every axis either dynamic on one side or equal.
pub fn shapes_compatible(lhs: &Shape, rhs: &Shape) -> bool {
    lhs.rank() == rhs.rank()
        && lhs
            .dims()
            .iter()
            .zip(rhs.dims())
            .all(|(lhs, rhs)| lhs.compatible_with(*rhs))
}

/// Equal rank and every axis of `source` no larger than `limit` (dynamic on either side passes).
pub fn shape_fits(source: &Shape, limit: &Shape) -> bool {
    source.rank() == limit.rank()
        && source
            .dims()
            .iter()
            .zip(limit.dims())
            .all(|(source, limit)| source.fits_within(*limit))
}

/// Reorders the `perm.len()` elements starting at `offset`: `out[i + offset] =
/// elements[perm[i] + offset]`. Positions outside the window are unchanged, as are positions
/// whose source index falls out of range.
pub fn interchange<T: Clone>(elements: &[T], perm: &[i64], offset: usize) -> Vec<T> {
    let mut out = elements.to_vec();
    for (index, &source) in perm.iter().enumerate() {
        let Ok(source) = usize::try_from(source) else {
            continue;
        };
        if let (Some(slot), Some(value)) = (
            out.get_mut(index + offset),
            elements.get(source + offset),
        ) {
            *slot = value.clone();
        }
    }
    out
}

/// Gathers `out[i] = elements[perm[i]]`; out-of-range entries leave the original element.
pub fn apply_permutation<T: Clone>(elements: &[T], perm: &[usize]) -> Vec<T> {
    let mut out = elements.to_vec();
    for (index, &source) in perm.iter().enumerate() {
        if let (Some(slot), Some(value)) = (out.get_mut(index), elements.get(source)) {
            *slot = value.clone();
        }
    }
    out
}
