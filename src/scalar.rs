//! Element types storable in the arrays.

use std::fmt::Debug;
use std::ops::Add;

/// A primitive numeric element.
///
/// The storage engine never does arithmetic beyond `add`; everything else
/// (norms for pivot search, `f64` conversion for reductions) goes through the
/// methods below.
pub trait Scalar:
    Copy + Debug + Default + PartialEq + PartialOrd + Add<Output = Self> + Send + Sync + 'static
{
    const ZERO: Self;
    const ONE: Self;

    fn to_f64(self) -> f64;

    /// Lossy conversion, saturating for integer types.
    fn from_f64(value: f64) -> Self;

    /// Magnitude used when searching for the largest element.
    fn norm(self) -> f64 {
        self.to_f64().abs()
    }

    #[inline]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Only floats have an unordered value; sorting places it last.
    #[inline]
    fn is_nan(self) -> bool {
        false
    }

    /// Bytes per element, used to size leaves and thresholds.
    #[inline]
    fn element_size() -> usize {
        std::mem::size_of::<Self>()
    }
}

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }
        }
    )*};
}

macro_rules! impl_int {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                // `as` saturates and maps NaN to 0.
                value as $t
            }
        }
    )*};
}

impl_float!(f64, f32);
impl_int!(i64, i32, i16, i8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(f64::element_size(), 8);
        assert_eq!(f32::element_size(), 4);
        assert_eq!(i16::element_size(), 2);
        assert_eq!(i8::element_size(), 1);
    }

    #[test]
    fn test_norm_and_zero() {
        assert_eq!((-3.5f64).norm(), 3.5);
        assert_eq!((-7i32).norm(), 7.0);
        assert!(0.0f32.is_zero());
        assert!((-0.0f64).is_zero());
        assert!(!1i64.is_zero());
        assert!(f64::NAN.is_nan());
        assert!(!f32::INFINITY.is_nan());
        assert!(!0i8.is_nan());
    }

    #[test]
    fn test_from_f64_saturates() {
        assert_eq!(i8::from_f64(1000.0), i8::MAX);
        assert_eq!(i16::from_f64(f64::NAN), 0);
        assert_eq!(f32::from_f64(2.5), 2.5);
    }
}
