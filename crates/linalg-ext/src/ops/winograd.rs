use crate::error::{DiagnosticLocation, VerifyError, VerifyErrorKind, VerifyResult};
use crate::ir::{Dim, Operand, Shape};
use crate::shape_helpers::shapes_compatible;
use crate::tiling::winograd::{
    filter_transform_shape, input_tile_size, input_transform_shape, is_fchw, is_hwcf, is_nchw,
    is_nhwc, output_transform_shape, DEFAULT_KERNEL_SIZE, DEFAULT_OUTPUT_TILE_SIZE,
    HWCF_KERNEL_DIMS, NHWC_IMAGE_DIMS,
};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

fn square(extent: usize) -> Shape {
    Shape::new([Dim::Static(extent); 2])
}

fn check_image_dimensions(cx: &VerifyCtx<'_>, image_dimensions: &[i64]) -> VerifyResult<()> {
    if image_dimensions.len() != 2 {
        return Err(cx.op_error(
            VerifyErrorKind::Attribute,
            "expected only 2 image dimensions",
        ));
    }
    if !is_nchw(image_dimensions) && !is_nhwc(image_dimensions) {
        return Err(cx.op_error(
            VerifyErrorKind::Attribute,
            "expect image dimensions to be either [1, 2] or [2, 3]",
        ));
    }
    Ok(())
}

fn incompatible_output(cx: &VerifyCtx<'_>, message: &str) -> VerifyError {
    cx.error(VerifyErrorKind::Shape, DiagnosticLocation::output(0), message)
}

/// Tiles an image into overlapping `input_tile_size` patches and applies the Winograd input
/// transform to each.
#[derive(Debug, Clone, PartialEq)]
pub struct WinogradInputTransformOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub output_tile_size: usize,
    pub kernel_size: usize,
    pub image_dimensions: Vec<i64>,
}

impl WinogradInputTransformOp {
    pub fn new(input: Operand, output: Operand) -> Self {
        Self {
            inputs: vec![input],
            outputs: vec![output],
            output_tile_size: DEFAULT_OUTPUT_TILE_SIZE,
            kernel_size: DEFAULT_KERNEL_SIZE,
            image_dimensions: NHWC_IMAGE_DIMS.to_vec(),
        }
    }

    pub fn with_tile_sizes(mut self, output_tile_size: usize, kernel_size: usize) -> Self {
        self.output_tile_size = output_tile_size;
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_image_dimensions(mut self, image_dimensions: Vec<i64>) -> Self {
        self.image_dimensions = image_dimensions;
        self
    }

    pub fn input_tile_size(&self) -> usize {
        input_tile_size(self.output_tile_size, self.kernel_size)
    }

    pub fn is_nhwc(&self) -> bool {
        is_nhwc(&self.image_dimensions)
    }

    pub fn is_nchw(&self) -> bool {
        is_nchw(&self.image_dimensions)
    }
}

impl DestinationStyleOp for WinogradInputTransformOp {
    fn kind(&self) -> OperationKind {
        OperationKind::WinogradInputTransform
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1], "expected one input operand")?;
        cx.expect_outputs(&[1], "expected one output operand")?;
        let input = cx.input_shaped(0, "input")?;
        let output = cx.output_shaped(0, "output")?;
        if input.element_type != output.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(0),
                "expected input/output element types to be identical",
            ));
        }
        if input.rank() != 2 && input.rank() != 4 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::input(0),
                "expected input operand to have rank either 2 or 4",
            ));
        }

        let tile = self.input_tile_size();
        if input.rank() == 2 {
            if output.rank() != 2 {
                return Err(cx.error(
                    VerifyErrorKind::Rank,
                    DiagnosticLocation::output(0),
                    "expected output operand to have rank 2 if input is of rank 2",
                ));
            }
            if !input.shape.dims().iter().all(|dim| dim.fits_within(Dim::Static(tile))) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(0),
                    "expected input dims not greater than input tile size if input is of rank 2",
                ));
            }
            if !shapes_compatible(&square(tile), &output.shape) {
                return Err(incompatible_output(
                    &cx,
                    "expected output dims equal to inputTileSize if input is of rank 2",
                ));
            }
            return Ok(());
        }

        if output.rank() != input.rank() + 2 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected output rank to be equal to input rank + 2",
            ));
        }
        check_image_dimensions(&cx, &self.image_dimensions)?;
        let expected = input_transform_shape(
            &input.shape,
            self.output_tile_size,
            self.kernel_size,
            &self.image_dimensions,
        );
        if !shapes_compatible(&expected, &output.shape) {
            return Err(incompatible_output(&cx, "incompatible output shape"));
        }
        Ok(())
    }
}

/// Applies the Winograd filter transform to each `kernel_size x kernel_size` kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct WinogradFilterTransformOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub output_tile_size: usize,
    pub kernel_size: usize,
    pub kernel_dimensions: Vec<i64>,
}

impl WinogradFilterTransformOp {
    pub fn new(input: Operand, output: Operand) -> Self {
        Self {
            inputs: vec![input],
            outputs: vec![output],
            output_tile_size: DEFAULT_OUTPUT_TILE_SIZE,
            kernel_size: DEFAULT_KERNEL_SIZE,
            kernel_dimensions: HWCF_KERNEL_DIMS.to_vec(),
        }
    }

    pub fn with_tile_sizes(mut self, output_tile_size: usize, kernel_size: usize) -> Self {
        self.output_tile_size = output_tile_size;
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_kernel_dimensions(mut self, kernel_dimensions: Vec<i64>) -> Self {
        self.kernel_dimensions = kernel_dimensions;
        self
    }

    pub fn input_tile_size(&self) -> usize {
        input_tile_size(self.output_tile_size, self.kernel_size)
    }

    pub fn is_hwcf(&self) -> bool {
        is_hwcf(&self.kernel_dimensions)
    }

    pub fn is_fchw(&self) -> bool {
        is_fchw(&self.kernel_dimensions)
    }
}

impl DestinationStyleOp for WinogradFilterTransformOp {
    fn kind(&self) -> OperationKind {
        OperationKind::WinogradFilterTransform
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1], "expected one input operand")?;
        cx.expect_outputs(&[1], "expected one output operand")?;
        let input = cx.input_shaped(0, "input")?;
        let output = cx.output_shaped(0, "output")?;
        if input.element_type != output.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(0),
                "expected input/output element types to be identical",
            ));
        }
        if input.rank() != 2 && input.rank() != 4 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::input(0),
                "expected input operand to have rank either 2 or 4",
            ));
        }

        if input.rank() == 2 {
            if output.rank() != 2 {
                return Err(cx.error(
                    VerifyErrorKind::Rank,
                    DiagnosticLocation::output(0),
                    "expected output operand to have rank 2 if input is of rank 2",
                ));
            }
            if !shapes_compatible(&square(self.kernel_size), &input.shape) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(0),
                    "expected input dims to be equal to kernel size if input is of rank 2",
                ));
            }
            if !shapes_compatible(&square(self.input_tile_size()), &output.shape) {
                return Err(incompatible_output(
                    &cx,
                    "expected output dims equal to input tile size if input is of rank 2",
                ));
            }
            return Ok(());
        }

        if output.rank() != input.rank() {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected output rank to be equal to input rank",
            ));
        }
        if self.kernel_dimensions.len() != 2 {
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                "expected only 2 kernel dimensions",
            ));
        }
        if !self.is_hwcf() && !self.is_fchw() {
            return Err(cx.op_error(
                VerifyErrorKind::Attribute,
                "expect kernel dimensions to be either [0, 1] or [2, 3]",
            ));
        }
        let kernel = Dim::Static(self.kernel_size);
        let kernel_extents_match = self.kernel_dimensions.iter().all(|&axis| {
            usize::try_from(axis).map_or(false, |axis| input.dim(axis).compatible_with(kernel))
        });
        if !kernel_extents_match {
            return Err(cx.error(
                VerifyErrorKind::Shape,
                DiagnosticLocation::input(0),
                "expect all kernel dimensions to have the kernel size",
            ));
        }
        let expected = filter_transform_shape(
            &input.shape,
            self.output_tile_size,
            self.kernel_size,
            &self.kernel_dimensions,
        );
        if !shapes_compatible(&expected, &output.shape) {
            return Err(incompatible_output(&cx, "incompatible output shape"));
        }
        Ok(())
    }
}

/// Applies the Winograd output transform and scatters each tile back into the image.
#[derive(Debug, Clone, PartialEq)]
pub struct WinogradOutputTransformOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub output_tile_size: usize,
    pub kernel_size: usize,
    pub image_dimensions: Vec<i64>,
}

impl WinogradOutputTransformOp {
    pub fn new(input: Operand, output: Operand) -> Self {
        Self {
            inputs: vec![input],
            outputs: vec![output],
            output_tile_size: DEFAULT_OUTPUT_TILE_SIZE,
            kernel_size: DEFAULT_KERNEL_SIZE,
            image_dimensions: NHWC_IMAGE_DIMS.to_vec(),
        }
    }

    pub fn with_tile_sizes(mut self, output_tile_size: usize, kernel_size: usize) -> Self {
        self.output_tile_size = output_tile_size;
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_image_dimensions(mut self, image_dimensions: Vec<i64>) -> Self {
        self.image_dimensions = image_dimensions;
        self
    }

    pub fn input_tile_size(&self) -> usize {
        input_tile_size(self.output_tile_size, self.kernel_size)
    }

    pub fn is_nhwc(&self) -> bool {
        is_nhwc(&self.image_dimensions)
    }

    pub fn is_nchw(&self) -> bool {
        is_nchw(&self.image_dimensions)
    }
}

impl DestinationStyleOp for WinogradOutputTransformOp {
    fn kind(&self) -> OperationKind {
        OperationKind::WinogradOutputTransform
    }

    fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    fn verify(&self) -> VerifyResult<()> {
        let cx = VerifyCtx::new(self);
        cx.expect_inputs(&[1], "expected one input operand")?;
        cx.expect_outputs(&[1], "expected one output operand")?;
        let input = cx.input_shaped(0, "input")?;
        let output = cx.output_shaped(0, "output")?;
        if input.rank() != 2 && input.rank() != 6 {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::input(0),
                "expected input operand to have rank either 2 or 6",
            ));
        }

        if input.rank() == 2 {
            if output.rank() != 2 {
                return Err(cx.error(
                    VerifyErrorKind::Rank,
                    DiagnosticLocation::output(0),
                    "expected output operand to have rank 2 if input is of rank 2",
                ));
            }
            if !shapes_compatible(&square(self.input_tile_size()), &input.shape) {
                return Err(cx.error(
                    VerifyErrorKind::Shape,
                    DiagnosticLocation::input(0),
                    "expected input dims to be equal to input tile size if input is of rank 2",
                ));
            }
            if !shapes_compatible(&square(self.output_tile_size), &output.shape) {
                return Err(incompatible_output(
                    &cx,
                    "expected output dims equal to output tile size if input is of rank 2",
                ));
            }
            return Ok(());
        }

        if input.element_type != output.element_type {
            return Err(cx.error(
                VerifyErrorKind::ElementType,
                DiagnosticLocation::output(0),
                "expected input/output element types to be identical",
            ));
        }
        if output.rank() + 2 != input.rank() {
            return Err(cx.error(
                VerifyErrorKind::Rank,
                DiagnosticLocation::output(0),
                "expected output rank to be equal to input rank - 2",
            ));
        }
        check_image_dimensions(&cx, &self.image_dimensions)?;
        let expected =
            output_transform_shape(&input.shape, self.output_tile_size, &self.image_dimensions);
        if !shapes_compatible(&expected, &output.shape) {
            return Err(incompatible_output(&cx, "incompatible output shape"));
        }
        Ok(())
    }
}
