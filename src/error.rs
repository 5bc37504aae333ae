// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the common error type returned by every fallible operation on a
//! [`crate::manager::Manager`] or [`crate::fft::FftBuffer`].

use core::fmt;
use std::error::Error as StdError;

/// `PulseError` enumerates every way an analysis operation can fail.
///
/// This mirrors the flat `fada_Error` taxonomy of the reference implementation, minus the
/// variants (`InvalidManager`, `InvalidParameter`, `InvalidType`, `ManagerNotReady`,
/// `WindowNotCreated`) that only
/// existed to guard a C ABI's null handles, null out-pointers, and not-yet-initialized struct
/// fields; a `Manager<S>` is generic over its sample type and always owns an allocated window
/// buffer for its whole lifetime, so Rust's type system and ownership model make all of those
/// states unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseError {
    /// A size argument was zero where a positive value is required.
    InvalidSize,
    /// The sample rate was zero.
    InvalidSampleRate,
    /// The channel count was zero, or a channel index was out of range.
    InvalidChannel { channel: usize, channels: usize },
    /// No FFT buffer is attached where one is required.
    InvalidFftBuffer,
    /// A sample count was not a multiple of the channel count.
    NotMultipleOfChannels { count: usize, channels: usize },
    /// An index read past the end of the FFT buffer.
    IndexOutOfBounds { index: usize, size: usize },
    /// A requested frame position was at or past the end of the audio.
    PositionOutOfBounds { requested_frame: u64, frame_count: u64 },
    /// A requested frequency was at or past the Nyquist frequency.
    FrequencyOutOfBounds { frequency: f64, nyquist: f64 },
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PulseError::InvalidSize => write!(f, "size must be positive"),
            PulseError::InvalidSampleRate => write!(f, "sample rate must be non-zero"),
            PulseError::InvalidChannel { channel, channels } => {
                write!(f, "channel {channel} is out of range for {channels} channel(s)")
            }
            PulseError::InvalidFftBuffer => write!(f, "no fft buffer is attached"),
            PulseError::NotMultipleOfChannels { count, channels } => {
                write!(f, "sample count {count} is not a multiple of {channels} channel(s)")
            }
            PulseError::IndexOutOfBounds { index, size } => {
                write!(f, "index {index} is out of bounds for fft buffer of size {size}")
            }
            PulseError::PositionOutOfBounds { requested_frame, frame_count } => {
                write!(
                    f,
                    "frame {requested_frame} is out of bounds for {frame_count} total frame(s)"
                )
            }
            PulseError::FrequencyOutOfBounds { frequency, nyquist } => {
                write!(f, "frequency {frequency} hz is at or past the nyquist frequency {nyquist} hz")
            }
        }
    }
}

impl StdError for PulseError {}

/// A specialized `Result` type for fallible pulsecore operations.
pub type Result<T> = core::result::Result<T, PulseError>;
