// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fft` module implements the FFT scratch buffer: sizing policy, the in-place transform,
//! and magnitude readback.
//!
//! The transform itself is the iterative radix-2 Cooley-Tukey butterfly from Numerical
//! Recipes' `four1`, carried over index-for-index from the reference implementation rather
//! than rewritten against `symphonia-core`'s own (recursive, f32) FFT: callers depend on this
//! exact sequence of floating-point operations to reproduce the source's spectra bit-for-bit,
//! which a structurally different algorithm could not guarantee even with equivalent math.

use std::f64::consts::PI;

use log::debug;

use crate::error::{PulseError, Result};

/// Largest power of two less than or equal to `requested`. `requested` of `0` yields `1`
/// (an FFT buffer always holds at least one complex cell).
fn floor_pow2(requested: u64) -> u64 {
    if requested <= 1 {
        return 1;
    }

    if requested.is_power_of_two() {
        return requested;
    }

    let mut n = requested;
    n |= n >> 1;
    n |= n >> 2;
    n |= n >> 4;
    n |= n >> 8;
    n |= n >> 16;
    n |= n >> 32;
    (n + 1) >> 1
}

/// A power-of-two-sized complex scratch buffer: `size` cells, `2 * size` interleaved
/// real/imaginary `f64` entries.
#[derive(Debug)]
pub struct FftBuffer {
    data: Vec<f64>,
    size: usize,
}

impl FftBuffer {
    /// Allocates a buffer of the largest power of two less than or equal to `requested`.
    pub fn new(requested: u64) -> Result<Self> {
        if requested == 0 {
            return Err(PulseError::InvalidSize);
        }

        let size = floor_pow2(requested) as usize;
        Ok(FftBuffer { data: vec![0.0; size * 2], size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Runs the in-place radix-2 decimation-in-time transform over the buffer's current
    /// contents.
    pub(crate) fn transform(&mut self) {
        four1(&mut self.data, self.size);
    }

    /// The L1 magnitude at `index`: `(|re| + |im|) / size`.
    pub fn value(&self, index: usize) -> Result<f64> {
        if index >= self.size {
            return Err(PulseError::IndexOutOfBounds { index, size: self.size });
        }

        Ok(magnitude(&self.data, index, self.size))
    }

    /// Every magnitude in the buffer, index order.
    pub fn values(&self) -> Vec<f64> {
        (0..self.size).map(|i| magnitude(&self.data, i, self.size)).collect()
    }

    /// Magnitudes over `[offset, offset + length)`; `length == 0` means "to the end".
    pub fn values_range(&self, offset: usize, length: usize) -> Result<Vec<f64>> {
        let length = if length == 0 { self.size.saturating_sub(offset) } else { length };

        if offset + length > self.size {
            return Err(PulseError::IndexOutOfBounds { index: offset + length, size: self.size });
        }

        Ok((offset..offset + length).map(|i| magnitude(&self.data, i, self.size)).collect())
    }

    /// The magnitude at the bin nearest frequency `freq_hz`, given `sample_rate`.
    pub fn value_from_frequency(&self, freq_hz: f64, sample_rate: u32) -> Result<f64> {
        let nyquist = sample_rate as f64 / 2.0;

        if freq_hz >= nyquist {
            return Err(PulseError::FrequencyOutOfBounds { frequency: freq_hz, nyquist });
        }

        let index = ((freq_hz * self.size as f64) / sample_rate as f64) as usize;
        self.value(index)
    }
}

fn magnitude(data: &[f64], index: usize, size: usize) -> f64 {
    (data[2 * index].abs() + data[2 * index + 1].abs()) / size as f64
}

/// The Numerical Recipes `four1` butterfly, ported to a zero-indexed `f64` slice of
/// `2 * n` interleaved real/imaginary cells. `n` must be a power of two.
fn four1(fft: &mut [f64], n: usize) {
    let total = n << 1;

    // Bit-reversal permutation.
    let mut j = 0usize;
    let mut i = 0usize;
    let mmax_br = total / 2;
    while i < mmax_br {
        if j > i {
            fft.swap(j, i);
            fft.swap(j + 1, i + 1);
            if (j / 2) < (total / 4) {
                fft.swap(total - (i + 2), total - (j + 2));
                fft.swap(total - (i + 2) + 1, total - (j + 2) + 1);
            }
        }

        let mut mm = total >> 1;
        while mm >= 2 && j >= mm {
            j -= mm;
            mm >>= 1;
        }
        j += mm;

        i += 2;
    }

    // Danielson-Lanczos butterfly stages.
    let mut mmax = 2usize;
    while total > mmax {
        let step = mmax << 1;
        let theta = 2.0 * PI / mmax as f64;
        let wtemp_init = (theta / 2.0).sin();
        let wpr = -2.0 * wtemp_init * wtemp_init;
        let wpi = theta.sin();
        let mut wr = 1.0;
        let mut wi = 0.0;

        let mut mm = 1usize;
        while mm < mmax {
            let mut i = mm;
            while i <= total {
                let j = i + mmax;

                let tempr = wr * fft[j - 1] - wi * fft[j];
                let tempi = wr * fft[j] + wi * fft[j - 1];

                fft[j - 1] = fft[i - 1] - tempr;
                fft[j] = fft[i] - tempi;
                fft[i - 1] += tempr;
                fft[i] += tempi;

                i += step;
            }

            let wtemp = wr;
            wr = wtemp * wpr - wi * wpi + wr;
            wi = wi * wpr + wtemp * wpi + wi;

            mm += 2;
        }

        mmax = step;
    }

    debug!("fft transform complete, n={n}");
}

/// The owner of a manager's FFT scratch: absent, lazily allocated and manager-owned, or
/// caller-supplied and borrowed for `'f` -- dropping this variant only ends the borrow, it
/// never frees the caller's buffer.
pub(crate) enum FftSlot<'f> {
    Unbound,
    Internal(FftBuffer),
    External(&'f mut FftBuffer),
}

impl<'f> FftSlot<'f> {
    pub(crate) fn size(&self) -> Option<usize> {
        self.buffer().map(FftBuffer::size)
    }

    pub(crate) fn buffer(&self) -> Option<&FftBuffer> {
        match self {
            FftSlot::Unbound => None,
            FftSlot::Internal(buf) => Some(buf),
            FftSlot::External(buf) => Some(buf),
        }
    }

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut FftBuffer> {
        match self {
            FftSlot::Unbound => None,
            FftSlot::Internal(buf) => Some(buf),
            FftSlot::External(buf) => Some(buf),
        }
    }
}
