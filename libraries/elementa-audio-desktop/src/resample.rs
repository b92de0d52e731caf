//! Sample rate conversion with rubato

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Interleaved stereo
const CHANNELS: usize = 2;

/// Convert interleaved stereo from `source_rate` to `target_rate`
///
/// The whole clip is processed as one chunk. Equal rates return the input unchanged.
pub fn resample_stereo(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples);
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(AudioError::ResampleError(format!(
            "invalid rates {} -> {}",
            source_rate, target_rate
        )));
    }

    let frames = samples.len() / CHANNELS;

    // Speech narration: balanced filter
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(target_rate) / f64::from(source_rate),
        2.0,
        params,
        frames,
        CHANNELS,
    )
    .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    let mut deinterleaved = vec![Vec::with_capacity(frames); CHANNELS];
    for frame in samples.chunks_exact(CHANNELS) {
        for (channel, &sample) in deinterleaved.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    let resampled = resampler
        .process(&deinterleaved, None)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    let output_frames = resampled.first().map_or(0, Vec::len);
    let mut interleaved = Vec::with_capacity(output_frames * CHANNELS);
    for frame in 0..output_frames {
        for channel in &resampled {
            interleaved.push(channel[frame]);
        }
    }

    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize, rate: u32) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let s = (i as f32 / rate as f32 * 440.0 * std::f32::consts::TAU).sin() * 0.5;
                [s, s]
            })
            .collect()
    }

    #[test]
    fn same_rate_is_passthrough() {
        let input = tone(100, 48_000);
        let output = resample_stereo(input.clone(), 48_000, 48_000).expect("resample");
        assert_eq!(output, input);
    }

    #[test]
    fn upsampling_scales_length() {
        let output = resample_stereo(tone(44_100, 44_100), 44_100, 48_000).expect("resample");

        let frames = output.len() / 2;
        assert_eq!(output.len() % 2, 0);
        assert!((47_000..=48_100).contains(&frames), "got {} frames", frames);
    }

    #[test]
    fn output_stays_in_range() {
        let output = resample_stereo(tone(4800, 48_000), 48_000, 44_100).expect("resample");
        assert!(output.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn empty_input_is_empty() {
        let output = resample_stereo(Vec::new(), 44_100, 48_000).expect("resample");
        assert!(output.is_empty());
    }

    #[test]
    fn zero_rate_is_an_error() {
        assert!(resample_stereo(vec![0.0, 0.0], 0, 48_000).is_err());
    }
}
