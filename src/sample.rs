// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sample` module defines the [`Sample`] trait and the [`SampleKind`] tag that lets a
//! [`crate::manager::Manager`] dispatch to the right specialization at runtime.
//!
//! The reference implementation expresses every estimator and FFT preparation routine six
//! times, once per primitive C type. Here the algorithm is written once per operation,
//! generic over `S: Sample`, and [`SampleKind`] is the small runtime tag a bound manager
//! carries to remember which specialization its stored samples require.

use core::fmt;

/// A runtime tag identifying one of the six sample representations the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Single precision (32-bit) floating point.
    F32,
    /// Double precision (64-bit) floating point.
    F64,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleKind::I8 => "i8",
            SampleKind::I16 => "i16",
            SampleKind::I32 => "i32",
            SampleKind::I64 => "i64",
            SampleKind::F32 => "f32",
            SampleKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// `Sample` provides the handful of operations the estimators and FFT preparation routines
/// need regardless of the underlying representation.
///
/// Every sample type widens losslessly to `f64`, the common result type every reader,
/// estimator, and FFT bin is expressed in.
pub trait Sample: Copy + Clone + Default + PartialEq + Send + Sync + 'static {
    /// The tag identifying this type at runtime.
    const KIND: SampleKind;

    /// The divisor applied before FFT input to bring this sample type onto a scale
    /// comparable to the others. `1.0` for floating-point types.
    const NORMALIZER: f64;

    /// Widen this sample to the common floating-point result type.
    fn to_f64(self) -> f64;

    /// The absolute difference between two samples of this type, widened to `f64`.
    ///
    /// For integer types this is `|a - b|` computed in the integer domain before widening
    /// (matching the reference implementation's `abs`/`llabs` calls), not
    /// `(a.to_f64() - b.to_f64()).abs()`; the two agree for every value these six
    /// representations can hold, but computing in the native domain is what the source does.
    fn abs_diff_f64(a: Self, b: Self) -> f64;
}

macro_rules! impl_sample_int {
    ($t:ty, $kind:ident, $normalizer:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = SampleKind::$kind;
            const NORMALIZER: f64 = $normalizer;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn abs_diff_f64(a: Self, b: Self) -> f64 {
                (a as i128 - b as i128).unsigned_abs() as f64
            }
        }
    };
}

macro_rules! impl_sample_float {
    ($t:ty, $kind:ident) => {
        impl Sample for $t {
            const KIND: SampleKind = SampleKind::$kind;
            const NORMALIZER: f64 = 1.0;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn abs_diff_f64(a: Self, b: Self) -> f64 {
                (a - b).abs() as f64
            }
        }
    };
}

// Normalizer is half of the maximum value of the *unsigned* representation of equal width,
// i.e. 2^(bits-1) -- one larger than the signed maximum. See DESIGN.md "Normalizer" for why
// this (rather than the signed max, or the literal `UCHAR_MAX/2.` the C source computes) is
// the value this crate standardizes on.
impl_sample_int!(i8, I8, 128.0);
impl_sample_int!(i16, I16, 32_768.0);
impl_sample_int!(i32, I32, 2_147_483_648.0);
impl_sample_int!(i64, I64, 9_223_372_036_854_775_808.0);

impl_sample_float!(f32, F32);
impl_sample_float!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizers_match_spec_table() {
        assert_eq!(i8::NORMALIZER, 128.0);
        assert_eq!(i16::NORMALIZER, 32_768.0);
        assert_eq!(i32::NORMALIZER, 2_147_483_648.0);
        assert_eq!(i64::NORMALIZER, 9_223_372_036_854_775_808.0);
        assert_eq!(f32::NORMALIZER, 1.0);
        assert_eq!(f64::NORMALIZER, 1.0);
    }

    #[test]
    fn abs_diff_matches_native_abs_for_int_extremes() {
        assert_eq!(i8::abs_diff_f64(i8::MIN, i8::MAX), 255.0);
        assert_eq!(i16::abs_diff_f64(i16::MIN, 0), 32_768.0);
        assert_eq!(i64::abs_diff_f64(i64::MIN, i64::MAX), u64::MAX as f64);
    }

    #[test]
    fn abs_diff_matches_float_abs() {
        assert_eq!(f64::abs_diff_f64(-1.5, 2.5), 4.0);
        assert_eq!(f32::abs_diff_f64(-1.5, 2.5), 4.0);
    }
}
