//! Element types understood by the device kernels
//!
//! The set is closed: every array and scalar carries exactly one [`DType`],
//! and kernels receive it as a numeric [`DType::type_tag`].

use num_complex::Complex;
use std::fmt;

/// Fixed-width numeric element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    // Signed integers
    I8,
    I16,
    I32,
    I64,

    // Unsigned integers
    U8,
    U16,
    U32,
    U64,

    // Floating point
    F32,
    F64,

    // Complex (pairs of f32 / f64)
    C64,
    C128,
}

/// Broad family of a [`DType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeCategory {
    Integer,
    Float,
    Complex,
}

impl DType {
    /// Every element type, in type-tag order
    pub const ALL: [DType; 12] = [
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::U8,
        DType::U16,
        DType::U32,
        DType::U64,
        DType::F32,
        DType::F64,
        DType::C64,
        DType::C128,
    ];

    /// Size of one element in bytes
    pub const fn size_bytes(self) -> usize {
        match self {
            DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 | DType::C64 => 8,
            DType::C128 => 16,
        }
    }

    pub const fn category(self) -> DTypeCategory {
        match self {
            DType::I8 | DType::I16 | DType::I32 | DType::I64 | DType::U8 | DType::U16 | DType::U32 | DType::U64 => {
                DTypeCategory::Integer
            }
            DType::F32 | DType::F64 => DTypeCategory::Float,
            DType::C64 | DType::C128 => DTypeCategory::Complex,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(self.category(), DTypeCategory::Integer)
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, DType::I8 | DType::I16 | DType::I32 | DType::I64)
    }

    pub const fn is_float(self) -> bool {
        matches!(self.category(), DTypeCategory::Float)
    }

    pub const fn is_complex(self) -> bool {
        matches!(self.category(), DTypeCategory::Complex)
    }

    /// Numeric tag passed to kernels as the first dispatch argument
    pub const fn type_tag(self) -> u32 {
        match self {
            DType::I8 => 0,
            DType::I16 => 1,
            DType::I32 => 2,
            DType::I64 => 3,
            DType::U8 => 4,
            DType::U16 => 5,
            DType::U32 => 6,
            DType::U64 => 7,
            DType::F32 => 8,
            DType::F64 => 9,
            DType::C64 => 10,
            DType::C128 => 11,
        }
    }

    /// Inverse of [`DType::type_tag`]
    pub fn from_type_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Element type of `abs` results: complex maps to its component type
    pub const fn real_counterpart(self) -> DType {
        match self {
            DType::C64 => DType::F32,
            DType::C128 => DType::F64,
            other => other,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::U64 => "u64",
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::C64 => "c64",
            DType::C128 => "c128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust type stored in device buffers as a given [`DType`]
pub trait Element: bytemuck::Pod + Send + Sync + fmt::Debug + 'static {
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),+ $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )+
    };
}

impl_element! {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_matches_rust_type() {
        assert_eq!(DType::I8.size_bytes(), std::mem::size_of::<i8>());
        assert_eq!(DType::U16.size_bytes(), std::mem::size_of::<u16>());
        assert_eq!(DType::F64.size_bytes(), std::mem::size_of::<f64>());
        assert_eq!(DType::C64.size_bytes(), std::mem::size_of::<Complex<f32>>());
        assert_eq!(DType::C128.size_bytes(), std::mem::size_of::<Complex<f64>>());
    }

    #[test]
    fn test_type_tags_round_trip() {
        for dtype in DType::ALL {
            assert_eq!(DType::from_type_tag(dtype.type_tag()), Some(dtype));
        }
        assert_eq!(DType::from_type_tag(12), None);
    }

    #[test]
    fn test_categories() {
        assert!(DType::U32.is_integer());
        assert!(!DType::U32.is_signed());
        assert!(DType::I64.is_signed());
        assert!(DType::F32.is_float());
        assert!(DType::C128.is_complex());
        assert_eq!(DType::C64.category(), DTypeCategory::Complex);
    }

    #[test]
    fn test_real_counterpart() {
        assert_eq!(DType::C64.real_counterpart(), DType::F32);
        assert_eq!(DType::C128.real_counterpart(), DType::F64);
        assert_eq!(DType::I16.real_counterpart(), DType::I16);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(DType::C128.to_string(), "c128");
        let json = serde_json::to_string(&DType::F32).unwrap();
        assert_eq!(json, "\"f32\"");
        let back: DType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DType::F32);
    }

    #[test]
    fn test_element_dtypes() {
        assert_eq!(<u8 as Element>::DTYPE, DType::U8);
        assert_eq!(<Complex<f64> as Element>::DTYPE, DType::C128);
    }
}
