use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{ElementType, Operand, Region, ValueType};
use crate::shape_helpers::is_invalid_dim_set;

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Scatters `updates` slices into `original` at positions read from `indices`.
///
/// `inputs = [updates, indices]`, `outputs = [original]`. Each row of the rank-2 `indices`
/// tensor holds `index_depth` coordinates into the axes of `original` named by `dimension_map`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub dimension_map: Vec<i64>,
    pub unique_indices: bool,
    pub region: Region,
}

impl ScatterOp {
    pub fn new(
        updates: Operand,
        indices: Operand,
        original: Operand,
        dimension_map: Vec<i64>,
        region: Region,
    ) -> Self {
        Self {
            inputs: vec![updates, indices],
            outputs: vec![original],
            dimension_map,
            unique_indices: true,
            region,
        }
    }

    pub fn with_unique_indices(mut self, unique_indices: bool) -> Self {
        self.unique_indices = unique_indices;
        self
    }
}

impl DestinationStyleOp for ScatterOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Scatter
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[2], "expected two input operands")?;
        cx.expect_outputs(&[1], "expected one output operand")?;

        let update = cx.input_shaped(0, "update value")?;
        let indices = cx.input_shaped(1, "indices")?;
        let original = cx.output_shaped(0, "original value")?;

        if indices.rank() != 2 || indices.element_type != ElementType::I32 {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::input(1),
                "expected indices to be of rank 2 of i32 element type",
            ));
        }
        let Some(index_depth) = indices.dim(1).static_value() else {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(1),
                "expected index depth is static",
            ));
        };
        if self.dimension_map.len() != index_depth {
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                "invalid number of dimension map entries",
            ));
        }
        let original_rank = original.rank();
        if is_invalid_dim_set(&self.dimension_map, original_rank) {
            return Err(cx.op_error(VerifyErrorKind::Attribute, "dimension map is invalid"));
        }

        let update_rank = update.rank();
        if update_rank < 1 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::input(0),
                "expected update value to be at least rank 1",
            ));
        }
        if !indices.dim(0).compatible_with(update.dim(0)) {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(0),
                "mismatch in shape of indices and update value at dim#0",
            ));
        }
        if update_rank - 1 > original_rank {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::input(0),
                "update value rank exceeds the rank of the original value",
            ));
        }
        if original_rank > index_depth + update_rank - 1 {
            return Err(cx.op_error(
                VerifyErrorKind::Rank,
                "index depth and update value does not cover rank of original value",
            ));
        }

        // Trailing update axes form the full slice written at each index.
        let full_slice_dims = original_rank - index_depth;
        let slice_start = update_rank - full_slice_dims;
        for (original_dim, update_dim) in (index_depth..original_rank).zip(slice_start..update_rank)
        {
            if !update.dim(update_dim).fits_within(original.dim(original_dim)) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(0),
                    format!(
                        "shape of update value dim#{update_dim} exceeds original value at \
                         dim#{original_dim}"
                    ),
                ));
            }
        }

        let insert_dims = original_rank + 1 - update_rank;
        for (original_dim, update_dim) in (insert_dims..index_depth).zip(1..slice_start) {
            if !update.dim(update_dim).fits_within(original.dim(original_dim)) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(0),
                    format!(
                        "indexed shape of update value dim#{update_dim} exceeds original value \
                         at dim#{original_dim} {} {}",
                        update.dim(update_dim),
                        original.dim(original_dim)
                    ),
                ));
            }
        }

        self.verify_region(&cx, update.element_type, original.element_type)
    }
}

impl ScatterOp {
    fn verify_region(
        &self,
        cx: &VerifyCtx<'_>,
        update_element: ElementType,
        original_element: ElementType,
    ) -> VerifyResult<()> {
        let region_error = |location, message: String| {
            cx.error(VerifyErrorKind::Region, location, message)
        };
        if self.region.num_arguments() != 2 {
            return Err(region_error(
                DiagnosticLocation::Op,
                "expected region to have two arguments".to_string(),
            ));
        }
        let scalar_arg = |index: usize| match self.region.argument(index) {
            Some(ValueType::Scalar(ty)) if ty.complex_element_or_self().is_int_or_float() => {
                Some(*ty)
            }
            _ => None,
        };
        let (Some(arg0), Some(arg1)) = (scalar_arg(0), scalar_arg(1)) else {
            return Err(region_error(
                DiagnosticLocation::Op,
                "expected region to have scalar argument of integer or float types".to_string(),
            ));
        };
        if arg0 != update_element {
            return Err(region_error(
                DiagnosticLocation::RegionArgument(0),
                format!(
                    "mismatch in argument 0 of region {arg0} and element type of update value \
                     {update_element}"
                ),
            ));
        }
        if arg1 != original_element {
            return Err(region_error(
                DiagnosticLocation::RegionArgument(1),
                format!(
                    "mismatch in argument 1 of region {arg1} and element type of original value \
                     {original_element}"
                ),
            ));
        }
        if arg0 != arg1 {
            return Err(region_error(
                DiagnosticLocation::Op,
                format!("mismatch in region argument types {arg0} and {arg1}"),
            ));
        }
        let [yielded] = self.region.yielded.as_slice() else {
            return Err(region_error(
                DiagnosticLocation::Terminator,
                "expected region to yield a single value".to_string(),
            ));
        };
        if yielded != &ValueType::Scalar(arg0) {
            return Err(region_error(
                DiagnosticLocation::Terminator,
                format!("mismatch in type of yielded value {yielded} and argument of the region {arg0}"),
            ));
        }
        Ok(())
    }
}
