// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Pulsecore
//!
//! Pulsecore is a streaming PCM audio analysis engine: a chunked sample store, a sliding
//! analysis window, and beat, bass, and FFT spectrum estimators over six sample
//! representations (`i8`/`i16`/`i32`/`i64`/`f32`/`f64`).
//!
//! The entry point is [`manager::Manager`], generic over any type implementing
//! [`sample::Sample`]. Bind it to a sample rate and channel count with
//! [`manager::Manager::bind_samples`] or [`manager::Manager::bind_stream`], push audio with
//! [`manager::Manager::push_samples`], move the analysis window with
//! [`manager::Manager::advance`]/[`manager::Manager::set_position`], and read back estimators
//! or an FFT spectrum.

mod chunk;
pub mod error;
mod estimators;
pub mod fft;
pub mod manager;
pub mod sample;
mod window;

pub use error::{PulseError, Result};
pub use manager::Manager;
pub use sample::{Sample, SampleKind};
