use std::fmt;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Scalar element types that may appear in operand types and region signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    I1,
    I8,
    I16,
    I32,
    I64,
    Index,
    F16,
    Bf16,
    F32,
    F64,
    /// `complex<f32>`.
    Complex64,
    /// `complex<f64>`.
    Complex128,
}

impl ElementType {
    /// Returns `true` for signless integers of any width, including `i1`.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ElementType::I1 | ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64
        )
    }

    /// Returns `true` when the type is an integer of exactly `width` bits.
    pub fn is_integer_of_width(self, width: usize) -> bool {
        self.is_integer() && self.bitwidth() == Some(width)
    }

    /// Returns `true` when the dtype is a floating-point representation.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            ElementType::F16 | ElementType::Bf16 | ElementType::F32 | ElementType::F64
        )
    }

    pub fn is_complex(self) -> bool {
        matches!(self, ElementType::Complex64 | ElementType::Complex128)
    }

    /// `index` is neither an integer nor a float here.
    pub fn is_int_or_float(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Unwraps complex types to their component float type.
    pub fn complex_element_or_self(self) -> ElementType {
        match self {
            ElementType::Complex64 => ElementType::F32,
            ElementType::Complex128 => ElementType::F64,
            other => other,
        }
    }

    /// Returns the storage bit-width when well-defined for the logical scalar.
    pub fn bitwidth(self) -> Option<usize> {
        match self {
            ElementType::I1 => Some(1),
            ElementType::I8 => Some(8),
            ElementType::I16 | ElementType::F16 | ElementType::Bf16 => Some(16),
            ElementType::I32 | ElementType::F32 => Some(32),
            ElementType::I64 | ElementType::F64 | ElementType::Complex64 => Some(64),
            ElementType::Complex128 => Some(128),
            ElementType::Index => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::I1 => "i1",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::Index => "index",
            ElementType::F16 => "f16",
            ElementType::Bf16 => "bf16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::Complex64 => "complex<f32>",
            ElementType::Complex128 => "complex<f64>",
        };
        f.write_str(name)
    }
}

/// Represents a single axis extent in a shape.
///
/// `Dynamic` is absorbing: any arithmetic with a dynamic operand yields `Dynamic`, and any
/// comparison against a dynamic extent succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Static(usize),
    Dynamic,
}

impl Dim {
    pub fn is_dynamic(self) -> bool {
        matches!(self, Dim::Dynamic)
    }

    pub fn static_value(self) -> Option<usize> {
        match self {
            Dim::Static(value) => Some(value),
            Dim::Dynamic => None,
        }
    }

    /// Either side dynamic, or both static and equal.
    pub fn compatible_with(self, other: Dim) -> bool {
        match (self, other) {
            (Dim::Static(lhs), Dim::Static(rhs)) => lhs == rhs,
            _ => true,
        }
    }

    /// Either side dynamic, or `self <= limit`.
    pub fn fits_within(self, limit: Dim) -> bool {
        match (self, limit) {
            (Dim::Static(value), Dim::Static(limit)) => value <= limit,
            _ => true,
        }
    }

    /// Rounding-up division. A zero divisor yields `Dynamic` rather than panicking.
    pub fn ceil_div(self, divisor: Dim) -> Dim {
        match (self, divisor) {
            (Dim::Static(_), Dim::Static(0)) => Dim::Dynamic,
            (Dim::Static(value), Dim::Static(divisor)) => Dim::Static(value.div_ceil(divisor)),
            _ => Dim::Dynamic,
        }
    }
}

impl Add for Dim {
    type Output = Dim;

    fn add(self, rhs: Dim) -> Dim {
        match (self, rhs) {
            (Dim::Static(lhs), Dim::Static(rhs)) => {
                lhs.checked_add(rhs).map_or(Dim::Dynamic, Dim::Static)
            }
            _ => Dim::Dynamic,
        }
    }
}

impl Mul for Dim {
    type Output = Dim;

    fn mul(self, rhs: Dim) -> Dim {
        match (self, rhs) {
            (Dim::Static(lhs), Dim::Static(rhs)) => {
                lhs.checked_mul(rhs).map_or(Dim::Dynamic, Dim::Static)
            }
            _ => Dim::Dynamic,
        }
    }
}

impl From<usize> for Dim {
    fn from(value: usize) -> Self {
        Dim::Static(value)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(value) => write!(f, "{value}"),
            Dim::Dynamic => f.write_str("?"),
        }
    }
}

pub type Dims = SmallVec<[Dim; 6]>;

/// Ordered list of extents; `rank()` is its length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    dims: Dims,
}

impl Shape {
    pub fn new(dims: impl IntoIterator<Item = Dim>) -> Self {
        Self {
            dims: dims.into_iter().collect(),
        }
    }

    /// Builds a fully static shape.
    pub fn from_static(extents: &[usize]) -> Self {
        Self::new(extents.iter().copied().map(Dim::Static))
    }

    pub fn scalar() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn into_dims(self) -> Dims {
        self.dims
    }

    /// Extent at `axis`; out-of-range axes read as dynamic.
    pub fn dim(&self, axis: usize) -> Dim {
        self.dims.get(axis).copied().unwrap_or(Dim::Dynamic)
    }

    /// Returns static dimensions when all dims are static.
    pub fn static_dims(&self) -> Option<Vec<usize>> {
        self.dims.iter().map(|dim| dim.static_value()).collect()
    }
}

impl FromIterator<Dim> for Shape {
    fn from_iter<I: IntoIterator<Item = Dim>>(iter: I) -> Self {
        Shape::new(iter)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dims.is_empty() {
            return f.write_str("[]");
        }
        let dims = self
            .dims
            .iter()
            .map(|dim| dim.to_string())
            .collect::<Vec<_>>();
        f.write_str(&dims.join("x"))
    }
}

/// Builds a [`Shape`] from extents, with `?` for dynamic axes: `shape![4, ?, 8]`.
#[macro_export]
macro_rules! shape {
    (@dim ?) => {
        $crate::ir::Dim::Dynamic
    };
    (@dim $extent:tt) => {
        $crate::ir::Dim::Static($extent as usize)
    };
    ($($extent:tt),* $(,)?) => {
        $crate::ir::Shape::new([$($crate::shape!(@dim $extent)),*])
    };
}

/// Distinguishes immutable tensor values from mutable buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Tensor,
    MemRef,
}

/// Shaped value metadata coupling storage kind, shape and element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapedType {
    pub storage: StorageKind,
    pub shape: Shape,
    pub element_type: ElementType,
}

impl ShapedType {
    pub fn new(storage: StorageKind, shape: Shape, element_type: ElementType) -> Self {
        Self {
            storage,
            shape,
            element_type,
        }
    }

    pub fn tensor(shape: Shape, element_type: ElementType) -> Self {
        Self::new(StorageKind::Tensor, shape, element_type)
    }

    pub fn memref(shape: Shape, element_type: ElementType) -> Self {
        Self::new(StorageKind::MemRef, shape, element_type)
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn dim(&self, axis: usize) -> Dim {
        self.shape.dim(axis)
    }

    /// Same storage and element type with a different shape.
    pub fn with_shape(&self, shape: Shape) -> Self {
        Self::new(self.storage, shape, self.element_type)
    }

    pub fn is_tensor(&self) -> bool {
        self.storage == StorageKind::Tensor
    }

    pub fn is_memref(&self) -> bool {
        self.storage == StorageKind::MemRef
    }
}

impl fmt::Display for ShapedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.storage {
            StorageKind::Tensor => "tensor",
            StorageKind::MemRef => "memref",
        };
        if self.shape.rank() == 0 {
            write!(f, "{kind}<{}>", self.element_type)
        } else {
            write!(f, "{kind}<{}x{}>", self.shape, self.element_type)
        }
    }
}

/// Typing information for operands and region arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Shaped(ShapedType),
    Scalar(ElementType),
}

impl ValueType {
    pub fn as_shaped(&self) -> Option<&ShapedType> {
        match self {
            ValueType::Shaped(shaped) => Some(shaped),
            ValueType::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<ElementType> {
        match self {
            ValueType::Scalar(element_type) => Some(*element_type),
            ValueType::Shaped(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueType::Scalar(_))
    }

    /// Element type of a shaped value, or the scalar type itself.
    pub fn element_type(&self) -> ElementType {
        match self {
            ValueType::Shaped(shaped) => shaped.element_type,
            ValueType::Scalar(element_type) => *element_type,
        }
    }

    pub fn is_memref(&self) -> bool {
        matches!(self, ValueType::Shaped(shaped) if shaped.is_memref())
    }
}

impl From<ShapedType> for ValueType {
    fn from(value: ShapedType) -> Self {
        ValueType::Shaped(value)
    }
}

impl From<ElementType> for ValueType {
    fn from(value: ElementType) -> Self {
        ValueType::Scalar(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Shaped(shaped) => write!(f, "{shaped}"),
            ValueType::Scalar(element_type) => write!(f, "{element_type}"),
        }
    }
}
