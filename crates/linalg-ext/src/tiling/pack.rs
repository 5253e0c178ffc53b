use std::collections::HashMap;
use std::fmt;

use crate::ir::{Dim, Shape, ShapedType, ValueId};
use crate::reify::{as_shape_with_any_value_as_dynamic, DimExpr, DimValue};
use crate::shape_helpers::{axis_index, interchange};

/// Tile factor for one blocked axis: a literal or an SSA index value resolved at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSize {
    Static(usize),
    Dynamic(ValueId),
}

impl TileSize {
    pub fn is_zero(self) -> bool {
        self == TileSize::Static(0)
    }

    pub fn static_value(self) -> Option<usize> {
        match self {
            TileSize::Static(value) => Some(value),
            TileSize::Dynamic(_) => None,
        }
    }

    /// Type-level view: unresolved tiles are dynamic.
    pub fn as_dim(self) -> Dim {
        match self {
            TileSize::Static(value) => Dim::Static(value),
            TileSize::Dynamic(_) => Dim::Dynamic,
        }
    }

    pub fn as_dim_value(self) -> DimValue {
        match self {
            TileSize::Static(value) => DimValue::Static(value),
            TileSize::Dynamic(value) => DimValue::Dynamic(DimExpr::Value(value)),
        }
    }
}

impl From<usize> for TileSize {
    fn from(value: usize) -> Self {
        TileSize::Static(value)
    }
}

impl From<ValueId> for TileSize {
    fn from(value: ValueId) -> Self {
        TileSize::Dynamic(value)
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileSize::Static(value) => write!(f, "{value}"),
            TileSize::Dynamic(value) => write!(f, "{value}"),
        }
    }
}

/// Tiled axis of the unpacked tensor mapped to its tile factor.
pub type DimensionTileMap = HashMap<usize, TileSize>;

/// Binds each entry of `inner_dims_pos` to the tile at the same position. Negative axes and
/// unmatched positions are skipped.
pub fn dim_and_tile_mapping(inner_dims_pos: &[i64], tiles: &[TileSize]) -> DimensionTileMap {
    inner_dims_pos
        .iter()
        .zip(tiles)
        .filter_map(|(&axis, &tile)| usize::try_from(axis).ok().map(|axis| (axis, tile)))
        .collect()
}

pub fn has_zero_tiles(tiles: &[TileSize]) -> bool {
    tiles.iter().any(|tile| tile.is_zero())
}

/// Returns `true` when some static axis is tiled by a static factor that does not divide it.
///
/// Axes or tiles that are not known statically cannot be proven partial and are skipped.
pub fn are_not_full_tiles(shape: &Shape, mapping: &DimensionTileMap) -> bool {
    shape.dims().iter().enumerate().any(|(axis, dim)| {
        let Some(extent) = dim.static_value() else {
            return false;
        };
        match mapping.get(&axis).and_then(|tile| tile.static_value()) {
            Some(0) | None => false,
            Some(tile) => extent % tile != 0,
        }
    })
}

/// Shape of the packed tensor.
///
/// Each tiled axis is ceil-divided by its tile (dynamic when either side is), the outer axes are
/// reordered by `outer_dims_perm`, and the tile sizes are appended.
pub fn packed_shape(
    source: &Shape,
    inner_tiles: &[Dim],
    inner_dims_pos: &[i64],
    outer_dims_perm: &[i64],
) -> Shape {
    let mut dims = source.dims().to_vec();
    for (index, &tiled) in inner_dims_pos.iter().enumerate() {
        let Some(axis) = axis_index(tiled, dims.len()) else {
            continue;
        };
        if dims[axis].is_dynamic() {
            continue;
        }
        let tile = inner_tiles.get(index).copied().unwrap_or(Dim::Dynamic);
        dims[axis] = dims[axis].ceil_div(tile);
    }
    let mut dims = interchange(&dims, outer_dims_perm, 0);
    dims.extend_from_slice(inner_tiles);
    Shape::new(dims)
}

/// Packed type for `source`, keeping its storage kind and element type.
pub fn packed_type(
    source: &ShapedType,
    inner_tiles: &[Dim],
    inner_dims_pos: &[i64],
    outer_dims_perm: &[i64],
) -> ShapedType {
    source.with_shape(packed_shape(
        &source.shape,
        inner_tiles,
        inner_dims_pos,
        outer_dims_perm,
    ))
}

/// Symbolic packed extents for runtime `source_dims` and `inner_tiles`.
///
/// Every axis that [`packed_shape`] reports dynamic comes back as a runtime value, even when the
/// expression would fold to a constant, so the number of runtime extents always matches the
/// dynamic axes of the packed type.
pub fn pack_result_dims(
    source_dims: &[DimValue],
    inner_tiles: &[DimValue],
    inner_dims_pos: &[i64],
    outer_dims_perm: &[i64],
) -> Vec<DimValue> {
    let mut dims = source_dims.to_vec();
    for (index, &tiled) in inner_dims_pos.iter().enumerate() {
        let (Some(axis), Some(tile)) = (axis_index(tiled, dims.len()), inner_tiles.get(index))
        else {
            continue;
        };
        dims[axis] = dims[axis].clone().ceil_div(tile.clone());
    }
    let mut dims = interchange(&dims, outer_dims_perm, 0);
    dims.extend(inner_tiles.iter().cloned());

    let type_shape = packed_shape(
        &as_shape_with_any_value_as_dynamic(source_dims),
        as_shape_with_any_value_as_dynamic(inner_tiles).dims(),
        inner_dims_pos,
        outer_dims_perm,
    );
    dims.into_iter()
        .zip(type_shape.dims())
        .map(|(value, dim)| match (value, dim) {
            (value @ DimValue::Static(_), Dim::Dynamic) => value.into_dynamic(),
            (value, _) => value,
        })
        .collect()
}

/// Aligns reified extents with the declared result shape: declared dynamic axes come back as
/// runtime values and declared static axes take the declared extent.
pub fn conform_to_declared(dims: Vec<DimValue>, declared: &Shape) -> Vec<DimValue> {
    dims.into_iter()
        .enumerate()
        .map(|(axis, value)| match declared.dim(axis) {
            Dim::Static(extent) => DimValue::Static(extent),
            Dim::Dynamic => value.into_dynamic(),
        })
        .collect()
}
