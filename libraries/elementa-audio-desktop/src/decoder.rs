//! Whole-file decoding with symphonia
//!
//! Narration clips are short, so they are decoded completely up front into interleaved
//! stereo `f32` and played from memory.

use crate::error::{AudioError, Result};
use std::io::{Cursor, ErrorKind};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// ITU-R BS.775-1 coefficient for center and surround channels (-3 dB)
const CENTER_MIX: f32 = 0.707;

/// Fully decoded audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved stereo samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        frames_to_millis(self.frames(), self.sample_rate)
    }
}

/// Convert a frame count to milliseconds at `sample_rate`
pub(crate) fn frames_to_millis(frames: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    (frames as u64).saturating_mul(1000) / u64::from(sample_rate)
}

/// Decode an in-memory file
///
/// `extension` is only a probing hint; the container is detected from the data.
pub fn decode(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("no audio track".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut scratch: Option<(SampleBuffer<f32>, usize)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                debug!(reason, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let frames = decoded.capacity();
        sample_rate.get_or_insert(spec.rate);

        if !matches!(&scratch, Some((_, capacity)) if *capacity >= frames) {
            scratch = Some((SampleBuffer::new(frames as u64, spec), frames));
        }
        let Some((buffer, _)) = scratch.as_mut() else {
            continue;
        };
        buffer.copy_interleaved_ref(decoded);
        push_stereo(&mut samples, buffer.samples(), spec.channels.count());
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("unknown sample rate".to_string()))?;
    if samples.is_empty() {
        return Err(AudioError::DecodeError("no audio decoded".to_string()));
    }

    debug!(sample_rate, frames = samples.len() / 2, "Decoded audio");

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Append interleaved `channels`-channel audio to `out` as interleaved stereo
///
/// Mono is duplicated. A third channel is treated as center and mixed into both sides;
/// further channels go to the left (even index) or right (odd index) at -3 dB.
pub(crate) fn push_stereo(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            out.reserve(interleaved.len() * 2);
            for &sample in interleaved {
                out.push(sample);
                out.push(sample);
            }
        }
        2 => out.extend_from_slice(interleaved),
        _ => {
            out.reserve(interleaved.len() / channels * 2);
            for frame in interleaved.chunks_exact(channels) {
                let mut left = frame[0];
                let mut right = frame[1];
                for (index, &sample) in frame.iter().enumerate().skip(2) {
                    let sample = sample * CENTER_MIX;
                    if channels == 3 {
                        left += sample;
                        right += sample;
                    } else if index % 2 == 0 {
                        left += sample;
                    } else {
                        right += sample;
                    }
                }
                out.push(left.clamp(-1.0, 1.0));
                out.push(right.clamp(-1.0, 1.0));
            }
        }
    }
}
