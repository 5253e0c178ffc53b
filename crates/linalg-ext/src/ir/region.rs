use super::types::{ElementType, ValueType};

/// Single-block body embedded in an operation.
///
/// Only the signature is modelled: the formal argument types of the entry block and the types
/// yielded by its terminator. A well-formed body yields exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub arguments: Vec<ValueType>,
    pub yielded: Vec<ValueType>,
}

impl Region {
    pub fn new(arguments: Vec<ValueType>, yielded: Vec<ValueType>) -> Self {
        Self {
            arguments,
            yielded,
        }
    }

    /// Body whose arguments are scalars and which yields a single scalar.
    pub fn scalar(arguments: &[ElementType], yielded: ElementType) -> Self {
        Self::new(
            arguments.iter().copied().map(ValueType::Scalar).collect(),
            vec![ValueType::Scalar(yielded)],
        )
    }

    /// Comparator body: `arguments` scalars yielding `i1`.
    pub fn comparator(arguments: &[ElementType]) -> Self {
        Self::scalar(arguments, ElementType::I1)
    }

    pub fn num_arguments(&self) -> usize {
        self.arguments.len()
    }

    pub fn argument(&self, index: usize) -> Option<&ValueType> {
        self.arguments.get(index)
    }
}
