use linalg_ext::ir::{ElementType, Operand, Region, ValueType};
use linalg_ext::ops::{DestinationStyleOp, ScatterOp};
use linalg_ext::{shape, DiagnosticLocation, Shape, VerifyErrorKind};

fn scatter(updates: Shape, indices: Shape, original: Shape, dimension_map: Vec<i64>) -> ScatterOp {
    ScatterOp::new(
        Operand::tensor(0, updates, ElementType::F32),
        Operand::tensor(1, indices, ElementType::I32),
        Operand::tensor(2, original, ElementType::F32),
        dimension_map,
        Region::scalar(&[ElementType::F32, ElementType::F32], ElementType::F32),
    )
}

#[test]
fn scatter_rows_into_matrix_verifies() {
    let op = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0]);
    op.verify().expect("row scatter should verify");
    assert!(op.unique_indices);
}

#[test]
fn scatter_with_dynamic_update_count_verifies() {
    let op = scatter(shape![?, 16], shape![?, 1], shape![8, ?], vec![0]);
    op.verify().expect("dynamic extents should be accepted");
}

#[test]
fn scatter_rejects_slice_larger_than_original() {
    let op = scatter(shape![4, 16], shape![4, 1], shape![8, 8], vec![0]);
    let err = op.verify().expect_err("update slice exceeds original");
    assert_eq!(err.kind, VerifyErrorKind::Shape);
    assert_eq!(
        err.message,
        "shape of update value dim#1 exceeds original value at dim#1"
    );
    assert_eq!(
        err.to_string(),
        "linalg_ext.scatter: shape of update value dim#1 exceeds original value at dim#1"
    );
}

#[test]
fn scatter_rejects_indexed_window_larger_than_original() {
    let op = scatter(shape![2, 5, 16], shape![2, 2], shape![8, 4, 16], vec![0, 1]);
    let err = op.verify().expect_err("indexed window exceeds original");
    assert_eq!(err.kind, VerifyErrorKind::Shape);
    assert!(err
        .message
        .starts_with("indexed shape of update value dim#1 exceeds original value at dim#1"));
}

#[test]
fn scatter_requires_i32_rank2_indices() {
    let mut op = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0]);
    op.inputs[1] = Operand::tensor(1, shape![4, 1], ElementType::I64);
    let err = op.verify().expect_err("i64 indices rejected");
    assert_eq!(err.kind, VerifyErrorKind::ElementType);
    assert_eq!(err.location, DiagnosticLocation::input(1));
}

#[test]
fn scatter_requires_static_index_depth() {
    let op = scatter(shape![4, 16], shape![4, ?], shape![8, 16], vec![0]);
    let err = op.verify().expect_err("dynamic index depth");
    assert_eq!(err.message, "expected index depth is static");
}

#[test]
fn scatter_checks_dimension_map() {
    let err = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0, 1])
        .verify()
        .expect_err("map length must equal index depth");
    assert_eq!(err.kind, VerifyErrorKind::Attribute);

    let err = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![2])
        .verify()
        .expect_err("map entry out of range");
    assert_eq!(err.message, "dimension map is invalid");
}

#[test]
fn scatter_checks_update_count_against_indices() {
    let err = scatter(shape![3, 16], shape![4, 1], shape![8, 16], vec![0])
        .verify()
        .expect_err("update count mismatch");
    assert_eq!(
        err.message,
        "mismatch in shape of indices and update value at dim#0"
    );
}

#[test]
fn scatter_requires_update_to_cover_original_rank() {
    let err = scatter(shape![4], shape![4, 1], shape![8, 16], vec![0])
        .verify()
        .expect_err("index depth plus update rank too small");
    assert_eq!(err.kind, VerifyErrorKind::Rank);
}

#[test]
fn scatter_region_must_match_element_types() {
    let mut op = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0]);
    op.region = Region::scalar(&[ElementType::F16, ElementType::F32], ElementType::F32);
    let err = op.verify().expect_err("argument 0 mismatches update element type");
    assert_eq!(err.kind, VerifyErrorKind::Region);
    assert_eq!(err.location, DiagnosticLocation::RegionArgument(0));
}

#[test]
fn scatter_region_must_yield_exactly_one_value() {
    let mut op = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0]);
    op.region = Region::new(
        vec![ValueType::Scalar(ElementType::F32); 2],
        vec![ValueType::Scalar(ElementType::F32); 2],
    );
    let err = op.verify().expect_err("two yielded values");
    assert_eq!(err.location, DiagnosticLocation::Terminator);
    assert_eq!(err.message, "expected region to yield a single value");
}

#[test]
fn scatter_region_accepts_complex_elements() {
    let op = ScatterOp::new(
        Operand::tensor(0, shape![4, 16], ElementType::Complex64),
        Operand::tensor(1, shape![4, 1], ElementType::I32),
        Operand::tensor(2, shape![8, 16], ElementType::Complex64),
        vec![0],
        Region::scalar(
            &[ElementType::Complex64, ElementType::Complex64],
            ElementType::Complex64,
        ),
    );
    op.verify().expect("complex scatter should verify");
}

#[test]
fn scatter_region_rejects_non_scalar_arguments() {
    let mut op = scatter(shape![4, 16], shape![4, 1], shape![8, 16], vec![0]);
    op.region = Region::scalar(&[ElementType::Index, ElementType::Index], ElementType::Index);
    let err = op.verify().expect_err("index is not int or float");
    assert_eq!(
        err.message,
        "expected region to have scalar argument of integer or float types"
    );
}
