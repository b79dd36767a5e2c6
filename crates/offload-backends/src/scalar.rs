//! Tagged scalar values passed to kernels by value

use crate::dtype::{DType, Element};
use num_complex::Complex;
use std::fmt;

/// A single value of exactly one [`DType`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    C64(Complex<f32>),
    C128(Complex<f64>),
}

impl Scalar {
    pub const fn dtype(&self) -> DType {
        match self {
            Scalar::I8(_) => DType::I8,
            Scalar::I16(_) => DType::I16,
            Scalar::I32(_) => DType::I32,
            Scalar::I64(_) => DType::I64,
            Scalar::U8(_) => DType::U8,
            Scalar::U16(_) => DType::U16,
            Scalar::U32(_) => DType::U32,
            Scalar::U64(_) => DType::U64,
            Scalar::F32(_) => DType::F32,
            Scalar::F64(_) => DType::F64,
            Scalar::C64(_) => DType::C64,
            Scalar::C128(_) => DType::C128,
        }
    }

    /// Additive identity of `dtype`
    pub fn zero(dtype: DType) -> Self {
        match dtype {
            DType::I8 => Scalar::I8(0),
            DType::I16 => Scalar::I16(0),
            DType::I32 => Scalar::I32(0),
            DType::I64 => Scalar::I64(0),
            DType::U8 => Scalar::U8(0),
            DType::U16 => Scalar::U16(0),
            DType::U32 => Scalar::U32(0),
            DType::U64 => Scalar::U64(0),
            DType::F32 => Scalar::F32(0.0),
            DType::F64 => Scalar::F64(0.0),
            DType::C64 => Scalar::C64(Complex::new(0.0, 0.0)),
            DType::C128 => Scalar::C128(Complex::new(0.0, 0.0)),
        }
    }

    /// Multiplicative identity of `dtype`
    pub fn one(dtype: DType) -> Self {
        match dtype {
            DType::I8 => Scalar::I8(1),
            DType::I16 => Scalar::I16(1),
            DType::I32 => Scalar::I32(1),
            DType::I64 => Scalar::I64(1),
            DType::U8 => Scalar::U8(1),
            DType::U16 => Scalar::U16(1),
            DType::U32 => Scalar::U32(1),
            DType::U64 => Scalar::U64(1),
            DType::F32 => Scalar::F32(1.0),
            DType::F64 => Scalar::F64(1.0),
            DType::C64 => Scalar::C64(Complex::new(1.0, 0.0)),
            DType::C128 => Scalar::C128(Complex::new(1.0, 0.0)),
        }
    }

    /// Native-endian bytes of the value, `dtype().size_bytes()` long
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Scalar::I8(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::I16(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::I32(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::I64(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::U8(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::U16(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::U32(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::U64(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::F32(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::F64(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::C64(v) => bytemuck::bytes_of(v).to_vec(),
            Scalar::C128(v) => bytemuck::bytes_of(v).to_vec(),
        }
    }

    /// The value as `T`, if `T` is exactly this scalar's element type
    pub fn get<T: Element>(&self) -> Option<T> {
        if T::DTYPE != self.dtype() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&self.to_bytes()))
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )+
    };
}

impl_scalar_from! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Complex<f32> => C64,
    Complex<f64> => C128,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
            Scalar::C64(v) => write!(f, "{v}"),
            Scalar::C128(v) => write!(f, "{v}"),
        }
    }
}
