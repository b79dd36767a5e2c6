//! Dispatch from a runtime [`DType`](crate::DType) to its Rust element type

/// Run `$body` with `$T` bound to the Rust element type of `$dtype`
///
/// ```rust
/// use offload_backends::{with_element_type, DType};
///
/// let bytes = with_element_type!(DType::C64, T => std::mem::size_of::<T>());
/// assert_eq!(bytes, 8);
/// ```
#[macro_export]
macro_rules! with_element_type {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::DType::C64 => {
                type $T = $crate::num_complex::Complex<f32>;
                $body
            }
            $crate::DType::C128 => {
                type $T = $crate::num_complex::Complex<f64>;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{DType, Element};

    #[test]
    fn test_bound_type_matches_dtype() {
        for dtype in DType::ALL {
            let (bound, bytes) = with_element_type!(dtype, T => (<T as Element>::DTYPE, std::mem::size_of::<T>()));
            assert_eq!(bound, dtype);
            assert_eq!(bytes, dtype.size_bytes());
        }
    }
}
