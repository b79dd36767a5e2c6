//! Per-element arithmetic used by the kernels
//!
//! Integers wrap on overflow. Integer powers with a negative exponent
//! truncate toward zero, so only bases 1 and -1 produce a non-zero result.

use crate::dtype::Element;
use num_complex::Complex;

/// Element arithmetic for one [`DType`](crate::DType)
pub trait Arith: Element {
    /// Element type of `magnitude` (the component type for complex)
    type Magnitude: Element;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn pow(self, exp: Self) -> Self;
    fn magnitude(self) -> Self::Magnitude;
}

macro_rules! wrapping_pow {
    ($ty:ty, $base:expr, $exp:expr) => {{
        let mut base: $ty = $base;
        let mut exp: u64 = $exp;
        let mut acc: $ty = 1;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc.wrapping_mul(base);
            }
            base = base.wrapping_mul(base);
            exp >>= 1;
        }
        acc
    }};
}

macro_rules! impl_arith_signed {
    ($($ty:ty),+) => {
        $(
            impl Arith for $ty {
                type Magnitude = $ty;

                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn pow(self, exp: Self) -> Self {
                    if exp < 0 {
                        return match self {
                            1 => 1,
                            -1 if exp % 2 == 0 => 1,
                            -1 => -1,
                            _ => 0,
                        };
                    }
                    wrapping_pow!($ty, self, exp as u64)
                }

                fn magnitude(self) -> Self {
                    self.wrapping_abs()
                }
            }
        )+
    };
}

macro_rules! impl_arith_unsigned {
    ($($ty:ty),+) => {
        $(
            impl Arith for $ty {
                type Magnitude = $ty;

                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn pow(self, exp: Self) -> Self {
                    wrapping_pow!($ty, self, exp as u64)
                }

                fn magnitude(self) -> Self {
                    self
                }
            }
        )+
    };
}

macro_rules! impl_arith_float {
    ($($ty:ty),+) => {
        $(
            impl Arith for $ty {
                type Magnitude = $ty;

                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn pow(self, exp: Self) -> Self {
                    self.powf(exp)
                }

                fn magnitude(self) -> Self {
                    self.abs()
                }
            }
        )+
    };
}

macro_rules! impl_arith_complex {
    ($($re:ty),+) => {
        $(
            impl Arith for Complex<$re> {
                type Magnitude = $re;

                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn pow(self, exp: Self) -> Self {
                    self.powc(exp)
                }

                fn magnitude(self) -> $re {
                    self.norm()
                }
            }
        )+
    };
}

impl_arith_signed!(i8, i16, i32, i64);
impl_arith_unsigned!(u8, u16, u32, u64);
impl_arith_float!(f32, f64);
impl_arith_complex!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ops_wrap() {
        assert_eq!(Arith::add(i8::MAX, 1), i8::MIN);
        assert_eq!(Arith::sub(0u8, 1), u8::MAX);
        assert_eq!(Arith::mul(200u8, 2), 144);
        assert_eq!(Arith::pow(2u8, 9), 0);
        assert_eq!(Arith::pow(3i32, 4), 81);
    }

    #[test]
    fn test_negative_integer_exponent() {
        assert_eq!(Arith::pow(1i32, -3), 1);
        assert_eq!(Arith::pow(-1i32, -3), -1);
        assert_eq!(Arith::pow(-1i64, -2), 1);
        assert_eq!(Arith::pow(2i16, -1), 0);
        assert_eq!(Arith::pow(0i8, -1), 0);
    }

    #[test]
    fn test_zero_exponent_is_one() {
        assert_eq!(Arith::pow(0u32, 0), 1);
        assert_eq!(Arith::pow(-7i64, 0), 1);
    }

    #[test]
    fn test_magnitudes() {
        assert_eq!(Arith::magnitude(-5i32), 5);
        assert_eq!(Arith::magnitude(i8::MIN), i8::MIN);
        assert_eq!(Arith::magnitude(-2.5f64), 2.5);
        assert_eq!(Arith::magnitude(Complex::new(3.0f32, 4.0)), 5.0);
    }

    #[test]
    fn test_float_pow() {
        assert!((Arith::pow(2.0f64, 0.5) - 2.0f64.sqrt()).abs() < 1e-12);
        let z = Arith::pow(Complex::new(0.0f64, 1.0), Complex::new(2.0, 0.0));
        assert!((z - Complex::new(-1.0, 0.0)).norm() < 1e-12);
    }

    proptest::proptest! {
        #[test]
        fn prop_pow_matches_wrapping_pow(base in proptest::num::i32::ANY, exp in 0u32..64) {
            proptest::prop_assert_eq!(Arith::pow(base, exp as i32), base.wrapping_pow(exp));
        }

        #[test]
        fn prop_add_sub_round_trip(a in proptest::num::u16::ANY, b in proptest::num::u16::ANY) {
            proptest::prop_assert_eq!(Arith::sub(Arith::add(a, b), b), a);
        }
    }
}
