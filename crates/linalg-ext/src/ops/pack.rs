use anyhow::{ensure, Result};

use crate::error::{DiagnosticLocation, VerifyErrorKind, VerifyResult};
use crate::ir::{Dim, Operand, ShapedType};
use crate::reify::{mixed_sizes, ReifiedShapes};
use crate::shape_helpers::{is_invalid_dim_set, shape_fits};
use crate::tiling::{
    are_not_full_tiles, conform_to_declared, dim_and_tile_mapping, has_zero_tiles,
    pack_result_dims, packed_type, DimensionTileMap, TileSize,
};

use super::{DestinationStyleOp, OperationKind, VerifyCtx};

/// Blocks the axes `inner_dims_pos` of the source by `inner_tiles`, optionally reordering the
/// outer axes by `outer_dims_perm`. Partial trailing tiles are filled with `padding_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub inner_dims_pos: Vec<i64>,
    pub inner_tiles: Vec<TileSize>,
    pub outer_dims_perm: Vec<i64>,
    pub padding_value: Option<Operand>,
}

impl PackOp {
    pub fn build(
        source: Operand,
        output: Operand,
        inner_dims_pos: Vec<i64>,
        inner_tiles: Vec<TileSize>,
        padding_value: Option<Operand>,
        outer_dims_perm: Vec<i64>,
    ) -> Result<Self> {
        ensure!(
            inner_dims_pos.len() == inner_tiles.len(),
            "number of tile sizes specified ({}) must match the specified number of original \
             dimensions to be tiled ({})",
            inner_tiles.len(),
            inner_dims_pos.len()
        );
        ensure!(
            source.shaped_type().is_some() && output.shaped_type().is_some(),
            "pack source and output must be shaped values"
        );
        Ok(Self {
            inputs: vec![source],
            outputs: vec![output],
            inner_dims_pos,
            inner_tiles,
            outer_dims_perm,
            padding_value,
        })
    }

    pub fn mixed_tiles(&self) -> &[TileSize] {
        &self.inner_tiles
    }

    /// Tile sizes with unresolved tiles reported as dynamic.
    pub fn static_tiles(&self) -> Vec<Dim> {
        static_tiles(&self.inner_tiles)
    }

    pub fn dim_and_tile_mapping(&self) -> DimensionTileMap {
        dim_and_tile_mapping(&self.inner_dims_pos, &self.inner_tiles)
    }
}

impl DestinationStyleOp for PackOp {
    fn kind(&self) -> OperationKind {
        OperationKind::Pack
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
        let source = cx.input_shaped(0, "source")?;
        let packed = cx.output_shaped(0, "packed output")?;
        verify_tiled_layout(
            &cx,
            TiledLayout {
                unpacked: source,
                unpacked_location: DiagnosticLocation::input(0),
                packed,
                packed_location: DiagnosticLocation::output(0),
                inner_dims_pos: &self.inner_dims_pos,
                inner_tiles: &self.inner_tiles,
                outer_dims_perm: &self.outer_dims_perm,
            },
        )?;

        match &self.padding_value {
            None => {
                // Partial tiles are undefined without a padding value.
                if are_not_full_tiles(&source.shape, &self.dim_and_tile_mapping()) {
                    return Err(cx.op_error(
                        VerifyErrorKind::Shape,
                        "invalid tile factor provided. Only full tiles are supported when \
                         padding_value is not set",
                    ));
                }
            }
            Some(padding) => {
                let expected = source.element_type;
                if padding.ty.as_scalar() != Some(expected) {
                    return Err(cx.op_error(
                        VerifyErrorKind::ElementType,
                        format!("expected padding_value has {expected} but got: {}", padding.ty),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Packed extents derived from the source sizes and tiles, aligned with the declared output
    /// type. Only tensor outputs produce a result.
    fn reify_result_shapes(&self) -> ReifiedShapes {
        let Some(declared) = self
            .outputs
            .first()
            .and_then(Operand::shaped_type)
            .filter(|shaped| shaped.is_tensor())
        else {
            return ReifiedShapes::new();
        };
        let source_dims = self.inputs.first().map(mixed_sizes).unwrap_or_default();
        let tiles = self
            .inner_tiles
            .iter()
            .map(|tile| tile.as_dim_value())
            .collect::<Vec<_>>();
        let dims = pack_result_dims(
            &source_dims,
            &tiles,
            &self.inner_dims_pos,
            &self.outer_dims_perm,
        );
        let dims = conform_to_declared(dims, &declared.shape);
        log::trace!("{} reified packed result with {} axes", self.kind(), dims.len());
        vec![dims]
    }
}

/// Inverse of [`PackOp`]: scatters the tiles of a packed input back into the unpacked output.
#[derive(Debug, Clone, PartialEq)]
pub struct UnPackOp {
    pub inputs: Vec<Operand>,
    pub outputs: Vec<Operand>,
    pub inner_dims_pos: Vec<i64>,
    pub inner_tiles: Vec<TileSize>,
    pub outer_dims_perm: Vec<i64>,
}

impl UnPackOp {
    pub fn build(
        source: Operand,
        output: Operand,
        inner_dims_pos: Vec<i64>,
        inner_tiles: Vec<TileSize>,
        outer_dims_perm: Vec<i64>,
    ) -> Result<Self> {
        ensure!(
            inner_dims_pos.len() == inner_tiles.len(),
            "number of tile sizes specified ({}) must match the specified number of original \
             dimensions to be tiled ({})",
            inner_tiles.len(),
            inner_dims_pos.len()
        );
        ensure!(
            source.shaped_type().is_some() && output.shaped_type().is_some(),
            "unpack source and output must be shaped values"
        );
        Ok(Self {
            inputs: vec![source],
            outputs: vec![output],
            inner_dims_pos,
            inner_tiles,
            outer_dims_perm,
        })
    }

    pub fn mixed_tiles(&self) -> &[TileSize] {
        &self.inner_tiles
    }

    pub fn static_tiles(&self) -> Vec<Dim> {
        static_tiles(&self.inner_tiles)
    }

    pub fn dim_and_tile_mapping(&self) -> DimensionTileMap {
        dim_and_tile_mapping(&self.inner_dims_pos, &self.inner_tiles)
    }
}

impl DestinationStyleOp for UnPackOp {
    fn kind(&self) -> OperationKind {
        OperationKind::UnPack
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
        let packed = cx.input_shaped(0, "packed input")?;
        let unpacked = cx.output_shaped(0, "unpacked output")?;
        verify_tiled_layout(
            &cx,
            TiledLayout {
                unpacked,
                unpacked_location: DiagnosticLocation::output(0),
                packed,
                packed_location: DiagnosticLocation::input(0),
                inner_dims_pos: &self.inner_dims_pos,
                inner_tiles: &self.inner_tiles,
                outer_dims_perm: &self.outer_dims_perm,
            },
        )
    }
}

fn static_tiles(tiles: &[TileSize]) -> Vec<Dim> {
    tiles.iter().map(|tile| tile.as_dim()).collect()
}

/// Both sides of a pack or unpack, named by role rather than by operand position.
struct TiledLayout<'a> {
    unpacked: &'a ShapedType,
    unpacked_location: DiagnosticLocation,
    packed: &'a ShapedType,
    packed_location: DiagnosticLocation,
    inner_dims_pos: &'a [i64],
    inner_tiles: &'a [TileSize],
    outer_dims_perm: &'a [i64],
}

fn verify_tiled_layout(cx: &VerifyCtx<'_>, layout: TiledLayout<'_>) -> VerifyResult<()> {
    let unpacked_rank = layout.unpacked.rank();
    let num_tiles = layout.inner_tiles.len();

    if has_zero_tiles(layout.inner_tiles) {
        return Err(cx.op_error(VerifyErrorKind::Attribute, "invalid tile factor"));
    }
    if is_invalid_dim_set(layout.inner_dims_pos, unpacked_rank) {
        return Err(cx.op_error(
            VerifyErrorKind::Attribute,
            "invalid inner_dims_pos vector",
        ));
    }
    if is_invalid_dim_set(layout.outer_dims_perm, unpacked_rank) {
        return Err(cx.op_error(
            VerifyErrorKind::Attribute,
            "invalid outer_dims_perm vector",
        ));
    }
    if num_tiles != layout.inner_dims_pos.len() {
        return Err(cx.op_error(
            VerifyErrorKind::Attribute,
            "blocking factors must equal the number of dimensions to block",
        ));
    }
    if num_tiles > unpacked_rank {
        return Err(cx.error(
            VerifyErrorKind::Rank,
            layout.unpacked_location,
            "blocking factors must be less or equal than the input rank",
        ));
    }
    if unpacked_rank + num_tiles != layout.packed.rank() {
        return Err(cx.error(
            VerifyErrorKind::Rank,
            layout.packed_location,
            "packed rank must equal unpacked rank + blocking factors",
        ));
    }

    let expected = packed_type(
        layout.unpacked,
        &static_tiles(layout.inner_tiles),
        layout.inner_dims_pos,
        layout.outer_dims_perm,
    );
    if !shape_fits(&expected.shape, &layout.packed.shape) {
        return Err(cx.error(
            VerifyErrorKind::Shape,
            layout.packed_location,
            format!(
                "the shape of output is not large enough to hold the packed data. Expected at \
                 least {expected}, got {}",
                layout.packed
            ),
        ));
    }

    let tile_axes = &layout.packed.shape.dims()[unpacked_rank..];
    let tiles_match = tile_axes
        .iter()
        .zip(layout.inner_tiles)
        .all(|(dim, tile)| match (tile, dim) {
            (TileSize::Dynamic(_), dim) => dim.is_dynamic(),
            (TileSize::Static(_), Dim::Dynamic) => true,
            (TileSize::Static(tile), Dim::Static(extent)) => tile == extent,
        });
    if !tiles_match {
        return Err(cx.error(
            VerifyErrorKind::Shape,
            layout.packed_location,
            "mismatch in inner tile sizes specified and shaped of tiled dimension in the packed \
             type",
        ));
    }
    Ok(())
}
