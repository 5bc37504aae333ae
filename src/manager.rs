// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `manager` module wires the chunk store, window buffer, estimators, and FFT engine
//! behind the public [`Manager`] handle.
//!
//! The reference implementation dispatches at runtime on a `fada_TSample` tag because its
//! public surface is a C ABI built around `void*`. A Rust library's callers choose their
//! sample representation at compile time, so `Manager<S>` is generic over [`Sample`] instead
//! of carrying a runtime tag; [`Manager::sample_type`] still exposes [`SampleKind`] for
//! callers that need to report or branch on it dynamically. See `DESIGN.md`.

use std::borrow::Cow;

use log::debug;

use crate::chunk::ChunkStore;
use crate::error::{PulseError, Result};
use crate::estimators;
use crate::fft::{FftBuffer, FftSlot};
use crate::sample::{Sample, SampleKind};
use crate::window::WindowBuffer;

/// The default window size new managers are bound with, in frames.
pub const DEFAULT_WINDOW_FRAMES: u64 = 1024;

/// Advancing by one whole window backward (see [`Manager::advance`]).
pub const NEXT_WINDOW: i64 = -1;

/// The top-level handle binding a sample format, rate, and channel count to a chunk store,
/// window buffer, and optional FFT scratch.
pub struct Manager<'a, 'f, S: Sample> {
    sample_rate: u32,
    channels: usize,
    chunks: ChunkStore<'a, S>,
    window: WindowBuffer<S>,
    fft_slot: FftSlot<'f>,
}

impl<'a, 'f, S: Sample> Manager<'a, 'f, S> {
    /// Binds a manager to `sample_rate` and `channels` with no initial audio.
    pub fn bind_stream(sample_rate: u32, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(PulseError::InvalidChannel { channel: 0, channels: 0 });
        }
        if sample_rate == 0 {
            return Err(PulseError::InvalidSampleRate);
        }

        debug!("bound stream: {} channel(s) at {sample_rate} hz", channels);

        Ok(Manager {
            sample_rate,
            channels,
            chunks: ChunkStore::new(channels),
            window: WindowBuffer::new(channels, DEFAULT_WINDOW_FRAMES),
            fft_slot: FftSlot::Unbound,
        })
    }

    /// Binds a manager and immediately pushes `data` as its first chunk.
    pub fn bind_samples(
        data: Cow<'a, [S]>,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(PulseError::InvalidChannel { channel: 0, channels: 0 });
        }
        if data.is_empty() {
            return Err(PulseError::InvalidSize);
        }
        if data.len() % channels != 0 {
            return Err(PulseError::NotMultipleOfChannels { count: data.len(), channels });
        }
        if sample_rate == 0 {
            return Err(PulseError::InvalidSampleRate);
        }

        let mut manager = Manager {
            sample_rate,
            channels,
            chunks: ChunkStore::new(channels),
            window: WindowBuffer::new(channels, DEFAULT_WINDOW_FRAMES),
            fft_slot: FftSlot::Unbound,
        };
        manager.chunks.push(data);

        debug!("bound {} sample(s): {} channel(s) at {sample_rate} hz", manager.chunks.sample_count(), channels);

        Ok(manager)
    }

    pub fn sample_type(&self) -> SampleKind {
        S::KIND
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_count(&self) -> u64 {
        self.chunks.sample_count()
    }

    pub fn frame_count(&self) -> u64 {
        self.chunks.frame_count()
    }

    pub fn position(&self) -> u64 {
        self.chunks.position_frames()
    }

    pub fn end_of_audio(&self) -> bool {
        self.chunks.end_of_audio()
    }

    pub fn normalizer(&self) -> f64 {
        S::NORMALIZER
    }

    pub fn window_frames(&self) -> u64 {
        self.window.window_frames()
    }

    pub fn window_size(&self) -> u64 {
        self.window.window_samples()
    }

    /// `None` if no FFT buffer is attached.
    pub fn fft_size(&self) -> Option<usize> {
        self.fft_slot.size()
    }

    /// Appends `data` as a new chunk. `data.len()` must be non-zero and a multiple of
    /// `channels`.
    pub fn push_samples(&mut self, data: Cow<'a, [S]>) -> Result<()> {
        if data.is_empty() {
            return Err(PulseError::InvalidSize);
        }
        if data.len() % self.channels != 0 {
            return Err(PulseError::NotMultipleOfChannels { count: data.len(), channels: self.channels });
        }

        self.chunks.push(data);
        Ok(())
    }

    /// Frees every chunk strictly before the cursor chunk.
    pub fn trim_chunks(&mut self) {
        self.chunks.trim();
    }

    /// Releases every chunk and resets the cursor and counters to zero.
    pub fn free_chunks(&mut self) {
        self.chunks.free_all();
        self.window.invalidate();
    }

    /// Reallocates the window buffer to `frames` frames. A no-op if unchanged.
    pub fn set_window_frames(&mut self, frames: u64) -> Result<()> {
        if frames == 0 {
            return Err(PulseError::InvalidSize);
        }

        self.window.set_window_frames(frames);
        Ok(())
    }

    /// Moves the cursor to `frame`. Fails with `PositionOutOfBounds` if `frame` is at or past
    /// `frame_count`.
    pub fn set_position(&mut self, frame: u64) -> Result<()> {
        let frame_count = self.chunks.frame_count();

        if !self.chunks.set_position(frame) {
            return Err(PulseError::PositionOutOfBounds { requested_frame: frame, frame_count });
        }

        self.window.invalidate();
        Ok(())
    }

    /// Advances the cursor. Negative `offset_frames` advances whole windows (see
    /// [`NEXT_WINDOW`]); positive advances by frames; zero is a no-op query of end-of-audio.
    /// Returns `true` iff the new position is not end-of-audio.
    pub fn advance(&mut self, offset_frames: i64) -> bool {
        let result = self.chunks.advance(offset_frames, self.window.window_samples());
        self.window.invalidate();
        result
    }

    /// Positions the cursor so the window ends exactly at the last sample.
    pub fn seek_to_last(&mut self) {
        self.chunks.seek_to_last(self.window.window_samples());
        self.window.invalidate();
    }

    fn ensure_window_filled(&mut self) {
        self.window.ensure_filled(&self.chunks);
    }

    /// One sample at `(frame, channel)` within the current window.
    pub fn sample(&mut self, frame: u64, channel: usize) -> Result<f64> {
        if channel >= self.channels {
            return Err(PulseError::InvalidChannel { channel, channels: self.channels });
        }

        self.ensure_window_filled();
        Ok(self.window.declared()[frame as usize * self.channels + channel].to_f64())
    }

    /// Every sample of one channel across the window, in frame order.
    pub fn samples(&mut self, channel: usize) -> Result<Vec<f64>> {
        if channel >= self.channels {
            return Err(PulseError::InvalidChannel { channel, channels: self.channels });
        }

        self.ensure_window_filled();
        let channels = self.channels;
        Ok(self
            .window
            .declared()
            .iter()
            .skip(channel)
            .step_by(channels)
            .map(|s| s.to_f64())
            .collect())
    }

    /// The channel-averaged mixed sample at `frame`.
    pub fn frame(&mut self, frame: u64) -> f64 {
        self.ensure_window_filled();
        let channels = self.channels;
        let base = frame as usize * channels;
        let sum: f64 = self.window.declared()[base..base + channels].iter().map(|s| s.to_f64()).sum();
        sum / channels as f64
    }

    /// Every channel-averaged mixed frame across the window, in frame order.
    pub fn frames(&mut self) -> Vec<f64> {
        self.ensure_window_filled();
        let channels = self.channels;
        self.window.declared().chunks_exact(channels).map(|f| f.iter().map(|s| s.to_f64()).sum::<f64>() / channels as f64).collect()
    }

    pub fn calc_beat(&mut self) -> f64 {
        self.ensure_window_filled();
        estimators::beat::<S>(self.window.with_lookahead(), self.channels, self.window.window_frames() as usize)
    }

    pub fn calc_beat_channel(&mut self, channel: usize) -> Result<f64> {
        if channel >= self.channels {
            return Err(PulseError::InvalidChannel { channel, channels: self.channels });
        }

        self.ensure_window_filled();
        Ok(estimators::beat_channel::<S>(
            self.window.with_lookahead(),
            self.channels,
            self.window.window_frames() as usize,
            channel,
        ))
    }

    pub fn calc_bass(&mut self) -> f64 {
        self.ensure_window_filled();
        estimators::bass::<S>(self.window.declared(), self.channels, self.window.window_frames() as usize)
    }

    pub fn calc_bass_channel(&mut self, channel: usize) -> Result<f64> {
        if channel >= self.channels {
            return Err(PulseError::InvalidChannel { channel, channels: self.channels });
        }

        self.ensure_window_filled();
        Ok(estimators::bass_channel::<S>(
            self.window.declared(),
            self.channels,
            self.window.window_frames() as usize,
            channel,
        ))
    }

    /// Lazily allocates an internal FFT buffer sized to the current window, if none is
    /// attached yet. A no-op when a buffer (internal or external) is already attached.
    pub fn preload_fft_buffer(&mut self) -> Result<()> {
        if matches!(self.fft_slot, FftSlot::Unbound) {
            let buf = FftBuffer::new(self.window.window_frames())?;
            self.fft_slot = FftSlot::Internal(buf);
            debug!("preloaded internal fft buffer, size={}", self.fft_size().unwrap_or(0));
        }
        Ok(())
    }

    /// Attaches a caller-supplied FFT buffer, or detaches to unbound with `None`. Either way,
    /// any previously attached *internal* buffer is dropped (freed); an external buffer is
    /// never freed by the manager.
    pub fn use_fft_buffer(&mut self, buffer: Option<&'f mut FftBuffer>) {
        self.fft_slot = match buffer {
            Some(buf) => FftSlot::External(buf),
            None => FftSlot::Unbound,
        };
        debug!("fft buffer slot now {}", if matches!(self.fft_slot, FftSlot::Unbound) { "unbound" } else { "bound" });
    }

    /// Computes the mixed-channel FFT into the attached buffer.
    pub fn calc_fft(&mut self) -> Result<()> {
        self.preload_fft_buffer()?;
        self.ensure_window_filled();

        let channels = self.channels;
        let normalizer = S::NORMALIZER;
        let declared = self.window.declared().to_vec();

        let buf = self.fft_slot.buffer_mut().ok_or(PulseError::InvalidFftBuffer)?;
        fill_fft_input(buf, &declared, channels, normalizer, None);
        buf.transform();
        Ok(())
    }

    /// Computes the single-channel FFT into the attached buffer.
    pub fn calc_fft_channel(&mut self, channel: usize) -> Result<()> {
        if channel >= self.channels {
            return Err(PulseError::InvalidChannel { channel, channels: self.channels });
        }

        self.preload_fft_buffer()?;
        self.ensure_window_filled();

        let channels = self.channels;
        let normalizer = S::NORMALIZER;
        let declared = self.window.declared().to_vec();

        let buf = self.fft_slot.buffer_mut().ok_or(PulseError::InvalidFftBuffer)?;
        fill_fft_input(buf, &declared, channels, normalizer, Some(channel));
        buf.transform();
        Ok(())
    }

    pub fn fft_value(&self, index: usize) -> Result<f64> {
        self.fft_slot.buffer().ok_or(PulseError::InvalidFftBuffer)?.value(index)
    }

    pub fn fft_values(&self) -> Result<Vec<f64>> {
        Ok(self.fft_slot.buffer().ok_or(PulseError::InvalidFftBuffer)?.values())
    }

    pub fn fft_values_range(&self, offset: usize, length: usize) -> Result<Vec<f64>> {
        self.fft_slot.buffer().ok_or(PulseError::InvalidFftBuffer)?.values_range(offset, length)
    }

    pub fn fft_value_from_frequency(&self, freq_hz: f64) -> Result<f64> {
        self.fft_slot
            .buffer()
            .ok_or(PulseError::InvalidFftBuffer)?
            .value_from_frequency(freq_hz, self.sample_rate)
    }
}

fn fill_fft_input<S: Sample>(
    buf: &mut FftBuffer,
    window: &[S],
    channels: usize,
    normalizer: f64,
    only_channel: Option<usize>,
) {
    let size = buf.size();
    let cells = buf.cells_mut();
    cells.iter_mut().for_each(|c| *c = 0.0);

    for i in 0..size {
        let base = i * channels;
        if base >= window.len() {
            continue;
        }

        let value = match only_channel {
            Some(c) => window.get(base + c).map_or(0.0, |s| s.to_f64()),
            None => {
                let mut sum = 0.0;
                for c in 0..channels {
                    sum += window.get(base + c).map_or(0.0, |s| s.to_f64());
                }
                sum / channels as f64
            }
        };

        cells[2 * i] = value / normalizer;
        cells[2 * i + 1] = 0.0;
    }
}
