//! Shape algebra shared by the tiled data-layout operations.

pub mod pack;
pub mod winograd;

pub use pack::{
    are_not_full_tiles, conform_to_declared, dim_and_tile_mapping, has_zero_tiles,
    pack_result_dims, packed_shape, packed_type, DimensionTileMap, TileSize,
};
