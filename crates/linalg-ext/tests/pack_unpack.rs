use linalg_ext::ir::{Dim, ElementType, Operand, Shape, ValueId};
use linalg_ext::ops::{DestinationStyleOp, PackOp, UnPackOp};
use linalg_ext::reify::{as_shape_with_any_value_as_dynamic, DimExpr, DimValue};
use linalg_ext::shape_helpers::shape_fits;
use linalg_ext::tiling::{
    are_not_full_tiles, dim_and_tile_mapping, pack_result_dims, packed_shape, packed_type,
    TileSize,
};
use linalg_ext::{shape, DiagnosticLocation, ShapedType, VerifyErrorKind};
use proptest::prelude::*;

fn pack(source: Shape, packed: Shape, inner: Vec<i64>, tiles: Vec<TileSize>) -> PackOp {
    PackOp::build(
        Operand::tensor(0, source, ElementType::F32),
        Operand::tensor(1, packed, ElementType::F32),
        inner,
        tiles,
        None,
        Vec::new(),
    )
    .expect("pack should build")
}

fn tiles(sizes: &[usize]) -> Vec<TileSize> {
    sizes.iter().copied().map(TileSize::Static).collect()
}

#[test]
fn packed_shape_divides_permutes_and_appends_tiles() {
    let tiles = [Dim::Static(8), Dim::Static(4)];
    assert_eq!(
        packed_shape(&shape![32, 8], &tiles, &[0, 1], &[]),
        shape![4, 2, 8, 4]
    );
    assert_eq!(
        packed_shape(&shape![32, 8], &tiles, &[0, 1], &[1, 0]),
        shape![2, 4, 8, 4]
    );
    assert_eq!(
        packed_shape(&shape![13, ?], &tiles, &[0, 1], &[]),
        shape![2, ?, 8, 4]
    );
    assert_eq!(
        packed_shape(&shape![16, 8], &[Dim::Dynamic], &[1], &[]),
        shape![16, ?, ?]
    );
}

#[test]
fn packed_type_keeps_storage_and_element_type() {
    let source = ShapedType::memref(shape![16, 8], ElementType::Bf16);
    let packed = packed_type(&source, &[Dim::Static(4)], &[1], &[]);
    assert!(packed.is_memref());
    assert_eq!(packed.element_type, ElementType::Bf16);
    assert_eq!(packed.to_string(), "memref<16x2x4xbf16>");
}

#[test]
fn full_tile_detection_skips_unknown_extents() {
    let mapping = dim_and_tile_mapping(&[0, 1], &[TileSize::Static(8), TileSize::Static(3)]);
    assert!(are_not_full_tiles(&shape![16, 8], &mapping));
    assert!(!are_not_full_tiles(&shape![16, ?], &mapping));
    let mapping = dim_and_tile_mapping(&[0], &[TileSize::Dynamic(ValueId(4))]);
    assert!(!are_not_full_tiles(&shape![13], &mapping));
}

#[test]
fn pack_full_tiles_verifies() {
    pack(shape![32, 8], shape![4, 2, 8, 4], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect("pack should verify");

    let mut permuted = pack(shape![32, 8], shape![2, 4, 8, 4], vec![0, 1], tiles(&[8, 4]));
    permuted.outer_dims_perm = vec![1, 0];
    permuted.verify().expect("permuted pack should verify");
}

#[test]
fn pack_accepts_larger_output() {
    pack(shape![32, 8], shape![5, 2, 8, 4], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect("extra outer capacity is allowed");
}

#[test]
fn pack_partial_tiles_need_padding() {
    let op = pack(shape![13, 8], shape![2, 8, 8], vec![0], tiles(&[8]));
    let err = op.verify().expect_err("13 is not a multiple of 8");
    assert_eq!(
        err.message,
        "invalid tile factor provided. Only full tiles are supported when padding_value is not \
         set"
    );

    let mut padded = op.clone();
    padded.padding_value = Some(Operand::scalar(5, ElementType::F32));
    padded.verify().expect("padding allows partial tiles");

    padded.padding_value = Some(Operand::scalar(5, ElementType::F16));
    let err = padded.verify().expect_err("padding type must match source");
    assert_eq!(err.kind, VerifyErrorKind::ElementType);
    assert_eq!(err.message, "expected padding_value has f32 but got: f16");
}

#[test]
fn pack_dynamic_tile_requires_dynamic_tile_axis() {
    let dynamic = vec![TileSize::Dynamic(ValueId(7))];
    pack(shape![16, 8], shape![?, 8, ?], vec![0], dynamic.clone())
        .verify()
        .expect("dynamic tile with dynamic axes");

    let err = pack(shape![16, 8], shape![?, 8, 8], vec![0], dynamic)
        .verify()
        .expect_err("dynamic tile needs a dynamic trailing axis");
    assert_eq!(
        err.message,
        "mismatch in inner tile sizes specified and shaped of tiled dimension in the packed type"
    );
}

#[test]
fn pack_rejects_invalid_attributes_in_order() {
    let err = pack(shape![32, 8], shape![4, 2, 8, 4], vec![0, 1], tiles(&[8, 0]))
        .verify()
        .expect_err("zero tile");
    assert_eq!(err.message, "invalid tile factor");

    let err = pack(shape![32, 8], shape![4, 2, 8, 4], vec![0, 2], tiles(&[8, 4]))
        .verify()
        .expect_err("axis 2 on rank 2");
    assert_eq!(err.message, "invalid inner_dims_pos vector");

    let mut op = pack(shape![32, 8], shape![4, 2, 8, 4], vec![0, 1], tiles(&[8, 4]));
    op.outer_dims_perm = vec![0, 0];
    let err = op.verify().expect_err("duplicate perm entry");
    assert_eq!(err.message, "invalid outer_dims_perm vector");

    let mut op = pack(shape![32, 8], shape![4, 2, 8, 4], vec![0, 1], tiles(&[8, 4]));
    op.inner_tiles.pop();
    let err = op.verify().expect_err("one tile for two axes");
    assert_eq!(
        err.message,
        "blocking factors must equal the number of dimensions to block"
    );
}

#[test]
fn pack_checks_packed_rank_and_capacity() {
    let err = pack(shape![32, 8], shape![4, 2, 8], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect_err("packed rank too small");
    assert_eq!(err.kind, VerifyErrorKind::Rank);
    assert_eq!(err.location, DiagnosticLocation::output(0));

    let err = pack(shape![32, 8], shape![3, 2, 8, 4], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect_err("outer axis too small");
    assert_eq!(
        err.message,
        "the shape of output is not large enough to hold the packed data. Expected at least \
         tensor<4x2x8x4xf32>, got tensor<3x2x8x4xf32>"
    );

    let err = pack(shape![32, 8], shape![4, 2, 8, 8], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect_err("trailing axis disagrees with tile");
    assert_eq!(err.kind, VerifyErrorKind::Shape);
}

#[test]
fn pack_build_rejects_tile_count_mismatch() {
    let err = PackOp::build(
        Operand::tensor(0, shape![32, 8], ElementType::F32),
        Operand::tensor(1, shape![4, 2, 8, 4], ElementType::F32),
        vec![0, 1],
        tiles(&[8]),
        None,
        Vec::new(),
    )
    .expect_err("one tile for two axes");
    assert!(err.to_string().contains("must match"));
}

#[test]
fn pack_accessors_expose_tiles() {
    let mut tile_list = tiles(&[8]);
    tile_list.push(TileSize::Dynamic(ValueId(9)));
    let op = pack(shape![32, 8], shape![4, ?, 8, ?], vec![0, 1], tile_list.clone());
    assert_eq!(op.mixed_tiles(), tile_list.as_slice());
    assert_eq!(op.static_tiles(), vec![Dim::Static(8), Dim::Dynamic]);
    let mapping = op.dim_and_tile_mapping();
    assert_eq!(mapping.get(&0), Some(&TileSize::Static(8)));
    assert_eq!(mapping.get(&1), Some(&TileSize::Dynamic(ValueId(9))));
}

#[test]
fn pack_reifies_symbolic_result_dims() {
    let op = pack(
        shape![?, 8],
        shape![?, ?, 8, ?],
        vec![0, 1],
        vec![TileSize::Static(8), TileSize::Dynamic(ValueId(7))],
    );
    op.verify().expect("pack should verify");
    let reified = op.reify_result_shapes();
    assert_eq!(reified.len(), 1);
    let source_dim = DimExpr::DimOf {
        value: ValueId(0),
        axis: 0,
    };
    assert_eq!(
        reified[0],
        vec![
            DimValue::Dynamic(DimExpr::CeilDiv(
                Box::new(source_dim),
                Box::new(DimExpr::Constant(8))
            )),
            DimValue::Dynamic(DimExpr::CeilDiv(
                Box::new(DimExpr::Constant(8)),
                Box::new(DimExpr::Value(ValueId(7)))
            )),
            DimValue::Static(8),
            DimValue::Dynamic(DimExpr::Value(ValueId(7))),
        ]
    );
    assert_eq!(reified[0][0].to_string(), "ceildiv(dim(%0, 0), 8)");
}

#[test]
fn pack_into_buffer_has_no_results() {
    let op = PackOp::build(
        Operand::memref(0, shape![32, 8], ElementType::F32),
        Operand::memref(1, shape![4, 8, 8], ElementType::F32),
        vec![0],
        tiles(&[8]),
        None,
        Vec::new(),
    )
    .expect("pack should build");
    op.verify().expect("buffer pack should verify");
    assert!(op.reify_result_shapes().is_empty());
    assert!(op.results().is_empty());
}

#[test]
fn pack_result_dims_forces_runtime_values_where_type_is_dynamic() {
    let dims = pack_result_dims(
        &[DimValue::Static(16), DimValue::Static(8)],
        &[DimValue::Static(0)],
        &[0],
        &[],
    );
    assert!(!dims[0].is_static());
    assert_eq!(dims[1], DimValue::Static(8));
    assert_eq!(dims[2], DimValue::Static(0));
}

#[test]
fn pack_reify_follows_declared_dynamic_axis() {
    let op = pack(shape![16], shape![?, 4], vec![0], tiles(&[4]));
    op.verify().expect("dynamic outer axis accepts any count");
    let reified = op.reify_result_shapes();
    assert_eq!(
        reified,
        vec![vec![
            DimValue::Dynamic(DimExpr::Constant(4)),
            DimValue::Static(4)
        ]]
    );
    assert_eq!(as_shape_with_any_value_as_dynamic(&reified[0]), shape![?, 4]);
}

#[test]
fn pack_reify_follows_declared_static_axis() {
    let op = pack(shape![?], shape![8, 4], vec![0], tiles(&[4]));
    op.verify().expect("dynamic source fits a static destination");
    assert_eq!(
        op.reify_result_shapes(),
        vec![vec![DimValue::Static(8), DimValue::Static(4)]]
    );
}

#[test]
fn pack_reify_reports_oversized_declared_extent() {
    let op = pack(shape![16], shape![8, 4], vec![0], tiles(&[4]));
    op.verify().expect("destination larger than needed is accepted");
    assert_eq!(
        op.reify_result_shapes(),
        vec![vec![DimValue::Static(8), DimValue::Static(4)]]
    );
}

fn unpack(packed: Shape, unpacked: Shape, inner: Vec<i64>, tiles: Vec<TileSize>) -> UnPackOp {
    UnPackOp::build(
        Operand::tensor(0, packed, ElementType::F32),
        Operand::tensor(1, unpacked, ElementType::F32),
        inner,
        tiles,
        Vec::new(),
    )
    .expect("unpack should build")
}

#[test]
fn unpack_uses_output_as_unpacked_side() {
    let op = unpack(shape![4, 2, 8, 4], shape![32, 8], vec![0, 1], tiles(&[8, 4]));
    op.verify().expect("unpack should verify");
    assert_eq!(
        op.reify_result_shapes(),
        vec![vec![DimValue::Static(32), DimValue::Static(8)]]
    );

    let err = unpack(shape![3, 2, 8, 4], shape![32, 8], vec![0, 1], tiles(&[8, 4]))
        .verify()
        .expect_err("packed input too small");
    assert_eq!(err.location, DiagnosticLocation::input(0));
}

#[test]
fn unpack_allows_partial_tiles() {
    unpack(shape![2, 8, 8], shape![13, 8], vec![0], tiles(&[8]))
        .verify()
        .expect("unpack has no full-tile requirement");
}

fn pack_config() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, Vec<usize>, bool)> {
    prop::collection::vec(1usize..64, 1..=4).prop_flat_map(|dims| {
        let rank = dims.len();
        (
            Just(dims),
            prop::sample::subsequence((0..rank).collect::<Vec<_>>(), 0..=rank).prop_shuffle(),
            prop::collection::vec(1usize..16, rank),
            any::<bool>(),
        )
    })
}

proptest! {
    #[test]
    fn reified_pack_fits_declared_shape(
        (dims, inner, tile_pool, reverse_outer) in pack_config(),
        dynamic_outer in prop::collection::vec(any::<bool>(), 4),
    ) {
        let rank = dims.len();
        let source = Shape::from_static(&dims);
        let tile_sizes = inner.iter().map(|&axis| tile_pool[axis]).collect::<Vec<_>>();
        let static_tiles = tile_sizes.iter().copied().map(Dim::Static).collect::<Vec<_>>();
        let inner = inner.iter().map(|&axis| axis as i64).collect::<Vec<_>>();
        let perm = if reverse_outer {
            (0..rank as i64).rev().collect::<Vec<_>>()
        } else {
            Vec::new()
        };
        let minimal = packed_shape(&source, &static_tiles, &inner, &perm);
        let declared = minimal
            .dims()
            .iter()
            .enumerate()
            .map(|(axis, &dim)| if axis < rank && dynamic_outer[axis] { Dim::Dynamic } else { dim })
            .collect::<Shape>();

        let op = PackOp::build(
            Operand::tensor(0, source, ElementType::F32),
            Operand::tensor(1, declared.clone(), ElementType::F32),
            inner,
            tiles(&tile_sizes),
            Some(Operand::scalar(2, ElementType::F32)),
            perm,
        )
        .expect("pack should build");
        prop_assert!(op.verify().is_ok());

        let reified = op.reify_result_shapes();
        prop_assert_eq!(reified.len(), 1);
        let reified_shape = as_shape_with_any_value_as_dynamic(&reified[0]);
        prop_assert!(shape_fits(&minimal, &reified_shape));
        prop_assert_eq!(&reified_shape, &declared);
        let trailing = &reified[0][rank..];
        prop_assert_eq!(trailing.len(), tile_sizes.len());
        for (value, tile) in trailing.iter().zip(&tile_sizes) {
            prop_assert_eq!(value.static_value(), Some(*tile));
        }
    }

    #[test]
    fn pack_then_unpack_recovers_static_shape(
        counts in prop::collection::vec(1usize..8, 1..=4),
        tile_pool in prop::collection::vec(1usize..8, 4),
        tiled_mask in prop::collection::vec(any::<bool>(), 4),
    ) {
        let inner = (0..counts.len()).filter(|&axis| tiled_mask[axis]).collect::<Vec<_>>();
        let dims = counts
            .iter()
            .enumerate()
            .map(|(axis, &count)| if tiled_mask[axis] { count * tile_pool[axis] } else { count })
            .collect::<Vec<_>>();
        let tile_sizes = inner.iter().map(|&axis| tile_pool[axis]).collect::<Vec<_>>();
        let inner = inner.iter().map(|&axis| axis as i64).collect::<Vec<_>>();
        let source = Shape::from_static(&dims);
        let static_tiles = tile_sizes.iter().copied().map(Dim::Static).collect::<Vec<_>>();
        let packed = packed_shape(&source, &static_tiles, &inner, &[]);

        let pack_op = pack(source.clone(), packed.clone(), inner.clone(), tiles(&tile_sizes));
        prop_assert!(pack_op.verify().is_ok());
        let unpack_op = unpack(packed, source, inner, tiles(&tile_sizes));
        prop_assert!(unpack_op.verify().is_ok());

        let recovered = unpack_op.reify_result_shapes();
        let expected = dims.iter().copied().map(DimValue::Static).collect::<Vec<_>>();
        prop_assert_eq!(recovered, vec![expected]);
    }
}
