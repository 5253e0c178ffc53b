//! Expected shapes of the Winograd input, filter and output transforms.
//!
//! Transformed tensors carry two leading `input_tile_size` axes followed by the remaining
//! axes of the image or kernel in NHWC/HWCF order. NCHW and FCHW layouts are mapped with the
//! fixed permutations below (`out[i] = in[perm[i]]`).

use crate::ir::{Dim, Shape};
use crate::shape_helpers::apply_permutation;

pub const TTNCHW_TO_TTNHWC: [usize; 6] = [0, 1, 2, 4, 5, 3];
pub const TTNHWC_TO_TTNCHW: [usize; 6] = [0, 1, 2, 5, 3, 4];
pub const TTFC_TO_TTCF: [usize; 4] = [0, 1, 3, 2];

pub const NHWC_IMAGE_DIMS: [i64; 2] = [1, 2];
pub const NCHW_IMAGE_DIMS: [i64; 2] = [2, 3];
pub const HWCF_KERNEL_DIMS: [i64; 2] = [0, 1];
pub const FCHW_KERNEL_DIMS: [i64; 2] = [2, 3];

pub const DEFAULT_OUTPUT_TILE_SIZE: usize = 6;
pub const DEFAULT_KERNEL_SIZE: usize = 3;

/// `output_tile_size + kernel_size - 1`.
pub fn input_tile_size(output_tile_size: usize, kernel_size: usize) -> usize {
    output_tile_size.saturating_add(kernel_size).saturating_sub(1)
}

pub fn is_nhwc(image_dimensions: &[i64]) -> bool {
    image_dimensions == NHWC_IMAGE_DIMS
}

pub fn is_nchw(image_dimensions: &[i64]) -> bool {
    image_dimensions == NCHW_IMAGE_DIMS
}

pub fn is_hwcf(kernel_dimensions: &[i64]) -> bool {
    kernel_dimensions == HWCF_KERNEL_DIMS
}

pub fn is_fchw(kernel_dimensions: &[i64]) -> bool {
    kernel_dimensions == FCHW_KERNEL_DIMS
}

fn contains_axis(dims: &[i64], axis: usize) -> bool {
    dims.iter().any(|&dim| usize::try_from(dim) == Ok(axis))
}

/// Number of output tiles along one image axis: `ceil((x - k + 1) / o)`, saturating at zero for
/// images smaller than the kernel.
fn tiles_along(extent: Dim, output_tile_size: usize, kernel_size: usize) -> Dim {
    match extent {
        Dim::Static(extent) => {
            let valid = extent.saturating_add(1).saturating_sub(kernel_size);
            Dim::Static(valid).ceil_div(Dim::Static(output_tile_size))
        }
        Dim::Dynamic => Dim::Dynamic,
    }
}

/// Expected output of the input transform for a rank-4 image.
///
/// Returns `[T, T] ++ per-axis extents`, where image axes become tile counts and other axes are
/// carried through. NCHW results are reordered to `[T, T, N, H, W, C]`.
pub fn input_transform_shape(
    input: &Shape,
    output_tile_size: usize,
    kernel_size: usize,
    image_dimensions: &[i64],
) -> Shape {
    let tile = Dim::Static(input_tile_size(output_tile_size, kernel_size));
    let mut dims = vec![tile; 2];
    dims.extend(input.dims().iter().enumerate().map(|(axis, &dim)| {
        if contains_axis(image_dimensions, axis) {
            tiles_along(dim, output_tile_size, kernel_size)
        } else {
            dim
        }
    }));
    if is_nchw(image_dimensions) {
        dims = apply_permutation(&dims, &TTNCHW_TO_TTNHWC);
    }
    Shape::new(dims)
}

/// Expected output of the filter transform for a rank-4 kernel: `[T, T] ++ non-kernel axes`,
/// with FCHW results reordered to `[T, T, C, F]`.
pub fn filter_transform_shape(
    input: &Shape,
    output_tile_size: usize,
    kernel_size: usize,
    kernel_dimensions: &[i64],
) -> Shape {
    let tile = Dim::Static(input_tile_size(output_tile_size, kernel_size));
    let mut dims = vec![tile; kernel_dimensions.len()];
    dims.extend(
        input
            .dims()
            .iter()
            .enumerate()
            .filter(|(axis, _)| !contains_axis(kernel_dimensions, *axis))
            .map(|(_, &dim)| dim),
    );
    if is_fchw(kernel_dimensions) {
        dims = apply_permutation(&dims, &TTFC_TO_TTCF);
    }
    Shape::new(dims)
}

/// Expected output of the output transform for a rank-6 tiled input.
///
/// The two leading tile axes are dropped; image axes are scaled by `output_tile_size`. For NCHW
/// the input is first reordered from `[T, T, N, H, W, C]` to `[T, T, N, C, H, W]`.
pub fn output_transform_shape(
    input: &Shape,
    output_tile_size: usize,
    image_dimensions: &[i64],
) -> Shape {
    let mut input_dims = input.dims().to_vec();
    if is_nchw(image_dimensions) {
        input_dims = apply_permutation(&input_dims, &TTNHWC_TO_TTNCHW);
    }
    let leading = image_dimensions.len();
    input_dims
        .iter()
        .enumerate()
        .skip(leading)
        .map(|(axis, &dim)| {
            if contains_axis(image_dimensions, axis - leading) {
                dim * Dim::Static(output_tile_size)
            } else {
                dim
            }
        })
        .collect()
}
