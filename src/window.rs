// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `window` module implements the lazily-filled analysis window the estimators read from.
//!
//! The beat estimator needs to compare each frame in the window against the frame that
//! *follows* it, including the last frame the window declares. Rather than special-case that
//! boundary read in the estimator, the buffer here is allocated one frame larger than
//! `window_frames` and the extra trailing frame is filled along with the rest; the estimator
//! always has a same-size-or-larger slice to look one frame ahead into.

use crate::chunk::ChunkStore;
use crate::sample::Sample;

pub(crate) struct WindowBuffer<S: Sample> {
    channels: usize,
    window_frames: u64,
    /// `(window_frames + 1) * channels` samples: the declared window plus one trailing frame.
    buf: Vec<S>,
    filled: bool,
}

impl<S: Sample> WindowBuffer<S> {
    pub(crate) fn new(channels: usize, window_frames: u64) -> Self {
        let mut buf = WindowBuffer { channels, window_frames: 0, buf: Vec::new(), filled: false };
        buf.set_window_frames(window_frames);
        buf
    }

    pub(crate) fn window_frames(&self) -> u64 {
        self.window_frames
    }

    pub(crate) fn window_samples(&self) -> u64 {
        self.window_frames * self.channels as u64
    }

    /// A no-op if `window_frames` is unchanged; otherwise reallocates and invalidates the fill.
    pub(crate) fn set_window_frames(&mut self, window_frames: u64) {
        if window_frames == self.window_frames {
            return;
        }

        self.window_frames = window_frames;
        let capacity = (window_frames + 1) * self.channels as u64;
        self.buf = vec![S::default(); capacity as usize];
        self.filled = false;
    }

    /// Marks the current contents stale; the next call to [`WindowBuffer::ensure_filled`] will
    /// re-read from `store`. Call whenever the cursor moves.
    pub(crate) fn invalidate(&mut self) {
        self.filled = false;
    }

    /// Fills the buffer from `store` at its current cursor, unless already filled for that
    /// cursor position. Idempotent: repeated calls without an intervening [`WindowBuffer::invalidate`]
    /// do not re-read the store.
    pub(crate) fn ensure_filled(&mut self, store: &ChunkStore<'_, S>) {
        if self.filled {
            return;
        }

        store.fill_window(&mut self.buf);
        self.filled = true;
    }

    /// The `window_frames` declared frames, one frame's worth of samples per group of
    /// `channels` entries. Does not include the trailing lookahead frame.
    pub(crate) fn declared(&self) -> &[S] {
        let samples = self.window_samples() as usize;
        &self.buf[..samples]
    }

    /// The full buffer, including the trailing lookahead frame, sized
    /// `(window_frames + 1) * channels`.
    pub(crate) fn with_lookahead(&self) -> &[S] {
        &self.buf
    }
}
