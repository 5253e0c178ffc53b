use linalg_ext::ir::{ElementType, Operand, Region};
use linalg_ext::ops::{DestinationStyleOp, SortOp, TopkOp};
use linalg_ext::{shape, DiagnosticLocation, VerifyErrorKind};

fn key_value_outputs() -> Vec<Operand> {
    vec![
        Operand::tensor(0, shape![8, ?], ElementType::F32),
        Operand::tensor(1, shape![8, 16], ElementType::I32),
    ]
}

fn key_value_comparator() -> Region {
    Region::comparator(&[
        ElementType::F32,
        ElementType::F32,
        ElementType::I32,
        ElementType::I32,
    ])
}

#[test]
fn sort_key_value_pairs_verifies() {
    SortOp::new(key_value_outputs(), 1, key_value_comparator())
        .verify()
        .expect("key/value sort should verify");
}

#[test]
fn sort_requires_two_region_arguments_per_output() {
    let element_types = [ElementType::F32, ElementType::I32, ElementType::F16];
    for num_outputs in 1..=3usize {
        let outputs = (0..num_outputs)
            .map(|index| Operand::tensor(index as u32, shape![4, 4], element_types[index]))
            .collect::<Vec<_>>();
        for num_args in 0..=2 * num_outputs + 1 {
            let args = (0..num_args)
                .map(|arg| element_types[(arg / 2) % element_types.len()])
                .collect::<Vec<_>>();
            let result = SortOp::new(outputs.clone(), 0, Region::comparator(&args)).verify();
            if num_args == 2 * num_outputs {
                result.expect("paired comparator should verify");
            } else {
                let err = result.expect_err("argument count mismatch");
                assert_eq!(
                    err.message,
                    format!("region block should have {} arguments", 2 * num_outputs)
                );
            }
        }
    }
}

#[test]
fn sort_rejects_out_of_range_dimension() {
    let err = SortOp::new(key_value_outputs(), 2, key_value_comparator())
        .verify()
        .expect_err("dimension 2 on rank 2");
    assert_eq!(err.kind, VerifyErrorKind::Attribute);
}

#[test]
fn sort_rejects_inputs_and_empty_outputs() {
    let mut op = SortOp::new(key_value_outputs(), 0, key_value_comparator());
    op.inputs.push(Operand::tensor(9, shape![8, 16], ElementType::F32));
    let err = op.verify().expect_err("inputs are not allowed");
    assert_eq!(err.kind, VerifyErrorKind::Arity);

    let err = SortOp::new(Vec::new(), 0, Region::comparator(&[]))
        .verify()
        .expect_err("no outputs");
    assert_eq!(err.message, "expected at least one `outs` operand");
}

#[test]
fn sort_rejects_mismatched_shapes() {
    let outputs = vec![
        Operand::tensor(0, shape![8, 16], ElementType::F32),
        Operand::tensor(1, shape![4, 16], ElementType::I32),
    ];
    let err = SortOp::new(outputs, 1, key_value_comparator())
        .verify()
        .expect_err("shapes differ");
    assert_eq!(err.kind, VerifyErrorKind::Shape);
    assert_eq!(err.location, DiagnosticLocation::output(1));
}

#[test]
fn sort_rejects_mismatched_region_argument() {
    let region = Region::comparator(&[
        ElementType::F32,
        ElementType::F32,
        ElementType::I32,
        ElementType::I64,
    ]);
    let err = SortOp::new(key_value_outputs(), 1, region)
        .verify()
        .expect_err("argument 3 has the wrong type");
    assert_eq!(err.location, DiagnosticLocation::RegionArgument(3));
    assert_eq!(
        err.message,
        "region block argument #3 should be of type i32 but got i64"
    );
}

#[test]
fn sort_requires_i1_yield() {
    let region = Region::scalar(
        &[
            ElementType::F32,
            ElementType::F32,
            ElementType::I32,
            ElementType::I32,
        ],
        ElementType::F32,
    );
    let err = SortOp::new(key_value_outputs(), 1, region)
        .verify()
        .expect_err("comparator must yield i1");
    assert_eq!(err.message, "should yield i1 type");
    assert_eq!(err.location, DiagnosticLocation::Terminator);
}

#[test]
fn sort_rejects_wider_integer_yield() {
    let region = Region::scalar(
        &[
            ElementType::F32,
            ElementType::F32,
            ElementType::I32,
            ElementType::I32,
        ],
        ElementType::I8,
    );
    let err = SortOp::new(key_value_outputs(), 1, region)
        .verify()
        .expect_err("i8 is not a predicate");
    assert_eq!(err.message, "should yield i1 type");
}

fn topk(inputs: Vec<Operand>, dimension: i64) -> TopkOp {
    TopkOp::new(
        inputs,
        Operand::tensor(10, shape![4, 10], ElementType::F32),
        Operand::tensor(11, shape![4, 10], ElementType::I32),
        dimension,
        Region::comparator(&[ElementType::F32, ElementType::F32]),
    )
}

fn values() -> Operand {
    Operand::tensor(0, shape![4, 100], ElementType::F32)
}

#[test]
fn topk_verifies_with_and_without_input_indices() {
    topk(vec![values()], 1)
        .verify()
        .expect("values-only topk should verify");
    let indices = Operand::tensor(1, shape![4, ?], ElementType::I32);
    topk(vec![values(), indices], 1)
        .verify()
        .expect("topk with indices should verify");
}

#[test]
fn topk_rejects_dimension_outside_rank() {
    for dimension in [2, -1] {
        let err = topk(vec![values()], dimension)
            .verify()
            .expect_err("dimension must be within rank");
        assert_eq!(err.message, "dimension exceeds rank");
    }
}

#[test]
fn topk_requires_i32_indices() {
    let mut op = topk(vec![values()], 1);
    op.outputs[1] = Operand::tensor(11, shape![4, 10], ElementType::I64);
    let err = op.verify().expect_err("i64 output indices");
    assert_eq!(err.kind, VerifyErrorKind::ElementType);
    assert_eq!(err.message, "expected input/output indices types to be int32");
}

#[test]
fn topk_allows_mismatch_only_along_dimension() {
    let err = topk(vec![values()], 0)
        .verify()
        .expect_err("axis 1 differs while topk runs along axis 0");
    assert_eq!(err.message, "incompatible input/output shapes");
}

#[test]
fn topk_rejects_mismatched_input_indices_shape() {
    let indices = Operand::tensor(1, shape![4, 99], ElementType::I32);
    let err = topk(vec![values(), indices], 1)
        .verify()
        .expect_err("input indices must match values");
    assert_eq!(err.message, "input indices/values shape must match");
}

#[test]
fn topk_region_must_match_input_and_yield_i1() {
    let mut op = topk(vec![values()], 1);
    op.region = Region::comparator(&[ElementType::F32, ElementType::F16]);
    let err = op.verify().expect_err("argument 1 mismatch");
    assert_eq!(err.location, DiagnosticLocation::RegionArgument(1));

    op.region = Region::scalar(&[ElementType::F32, ElementType::F32], ElementType::I32);
    let err = op.verify().expect_err("must yield i1");
    assert_eq!(
        err.message,
        "region block must end with a linalg_ext.yield i1!"
    );
}
