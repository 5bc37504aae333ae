// Pulsecore
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `estimators` module implements the beat and bass reductions over the current analysis
//! window.
//!
//! Both are written once, generic over [`Sample`], in place of the six numeric copies the
//! reference implementation carries. The window slice passed in always includes the one
//! frame of lookahead [`crate::window::WindowBuffer`] keeps past `window_frames`, so the beat
//! estimator's "compare each frame to its successor" reduction never reads past the slice.

use crate::sample::Sample;

const SUB_PERIOD_FRAMES: usize = 32;

/// Mean, over the window's `window_frames` frames, of the mean-over-channels absolute
/// difference between a frame and its successor.
pub(crate) fn beat<S: Sample>(window: &[S], channels: usize, window_frames: usize) -> f64 {
    if window_frames == 0 {
        return 0.0;
    }

    let mut total = 0.0;

    for f in 0..window_frames {
        let mut frame_avg = 0.0;

        for c in 0..channels {
            let here = window[f * channels + c];
            let next = window[(f + 1) * channels + c];
            frame_avg += S::abs_diff_f64(next, here);
        }

        total += frame_avg / channels as f64;
    }

    total / window_frames as f64
}

/// As [`beat`], but only over channel `channel`.
pub(crate) fn beat_channel<S: Sample>(
    window: &[S],
    channels: usize,
    window_frames: usize,
    channel: usize,
) -> f64 {
    if window_frames == 0 {
        return 0.0;
    }

    let mut total = 0.0;

    for f in 0..window_frames {
        let here = window[f * channels + channel];
        let next = window[(f + 1) * channels + channel];
        total += S::abs_diff_f64(next, here);
    }

    total / window_frames as f64
}

/// Mean, over 32-frame blocks of the window, of the absolute value of the block's
/// channel-averaged mean sample. A trailing partial block is included, divided by its own
/// frame count.
pub(crate) fn bass<S: Sample>(window: &[S], channels: usize, window_frames: usize) -> f64 {
    if window_frames == 0 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut block_count = 0usize;
    let mut f = 0usize;

    while f < window_frames {
        let block_end = (f + SUB_PERIOD_FRAMES).min(window_frames);
        let block_len = block_end - f;
        let mut block_sum = 0.0;

        for frame in f..block_end {
            let mut frame_avg = 0.0;
            for c in 0..channels {
                frame_avg += window[frame * channels + c].to_f64();
            }
            block_sum += frame_avg / channels as f64;
        }

        total += (block_sum / block_len as f64).abs();
        block_count += 1;
        f = block_end;
    }

    total / block_count as f64
}

/// As [`bass`], but only over channel `channel`.
pub(crate) fn bass_channel<S: Sample>(
    window: &[S],
    channels: usize,
    window_frames: usize,
    channel: usize,
) -> f64 {
    if window_frames == 0 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut block_count = 0usize;
    let mut f = 0usize;

    while f < window_frames {
        let block_end = (f + SUB_PERIOD_FRAMES).min(window_frames);
        let block_len = block_end - f;
        let mut block_sum = 0.0;

        for frame in f..block_end {
            block_sum += window[frame * channels + channel].to_f64();
        }

        total += (block_sum / block_len as f64).abs();
        block_count += 1;
        f = block_end;
    }

    total / block_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_of_silence_is_zero() {
        let window = vec![0i16; 6 * 2 + 2]; // 6 frames + 1 lookahead frame, 2 channels
        assert_eq!(beat::<i16>(&window, 2, 6), 0.0);
    }

    #[test]
    fn beat_responds_to_alternating_signal() {
        // 4 frames of mono +1/-1 plus one lookahead frame.
        let window: Vec<i16> = vec![1, -1, 1, -1, 1];
        assert_eq!(beat::<i16>(&window, 1, 4), 2.0);
    }

    #[test]
    fn beat_channel_isolates_one_channel() {
        let window: Vec<i16> = vec![0, 10, 0, 20, 0, 30];
        // window_frames=2, lookahead frame at index 2.
        assert_eq!(beat_channel::<i16>(&window, 2, 2, 1), 10.0);
    }

    #[test]
    fn bass_of_silence_is_zero() {
        let window = vec![0i16; 64];
        assert_eq!(bass::<i16>(&window, 1, 64), 0.0);
    }

    #[test]
    fn bass_takes_absolute_value_after_summing() {
        let window = vec![100i16; 32];
        assert_eq!(bass::<i16>(&window, 1, 32), 100.0);
    }

    #[test]
    fn bass_channel_uses_subi_not_i() {
        // Values vary within the single 32-frame block; a bug that re-reads the block's
        // first sample for every iteration (rather than each frame's own sample) would
        // average to 0 instead of the true mean of 0..31.
        let window: Vec<i16> = (0..32).collect();
        let result = bass_channel::<i16>(&window, 1, 32, 0);
        assert_eq!(result, 15.5);
    }

    #[test]
    fn bass_handles_trailing_partial_block() {
        let window = vec![5i16; 40]; // one full 32-frame block + one 8-frame partial block
        assert_eq!(bass::<i16>(&window, 1, 40), 5.0);
    }
}
