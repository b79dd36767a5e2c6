//! Right-hand operands accepted by arithmetic and slice assignment

use crate::array::OffloadArray;
use crate::host::HostArray;
use ndarray::{ArrayBase, Data, Dimension};
use num_complex::Complex;
use offload_backends::{DType, Element, Scalar};

/// The three kinds of right-hand side an array operation accepts
///
/// ```rust
/// use offload_core::Operand;
/// use ndarray::array;
///
/// let host = array![1.0f64, 2.0];
/// assert!(matches!(Operand::from(&host), Operand::Host(_)));
/// assert!(matches!(Operand::from(2.0f64), Operand::Scalar(_)));
/// ```
#[derive(Clone, Copy)]
pub enum Operand<'a> {
    /// An array already on a device
    Array(&'a OffloadArray<'a>),
    /// A host array, copied to the device before use
    Host(&'a dyn HostArray),
    /// A single value broadcast to every element
    Scalar(Scalar),
}

impl Operand<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            Operand::Array(array) => array.dtype(),
            Operand::Host(host) => host.dtype(),
            Operand::Scalar(value) => value.dtype(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Array(_) => "array",
            Operand::Host(_) => "host array",
            Operand::Scalar(_) => "scalar",
        }
    }
}

impl std::fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Operand::Host(host) => f
                .debug_struct("Host")
                .field("dtype", &host.dtype())
                .field("dims", &host.dims())
                .finish(),
            Operand::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
        }
    }
}

impl<'a, 'b: 'a> From<&'a OffloadArray<'b>> for Operand<'a> {
    fn from(array: &'a OffloadArray<'b>) -> Self {
        Operand::Array(array)
    }
}

impl<'a, A, S, D> From<&'a ArrayBase<S, D>> for Operand<'a>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn from(array: &'a ArrayBase<S, D>) -> Self {
        Operand::Host(array)
    }
}

impl<'a, T: Element> From<&'a Vec<T>> for Operand<'a> {
    fn from(values: &'a Vec<T>) -> Self {
        Operand::Host(values)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(value: Scalar) -> Self {
        Operand::Scalar(value)
    }
}

macro_rules! impl_operand_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Operand<'_> {
                fn from(value: $ty) -> Self {
                    Operand::Scalar(Scalar::from(value))
                }
            }
        )+
    };
}

impl_operand_from_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Complex<f32>, Complex<f64>);
