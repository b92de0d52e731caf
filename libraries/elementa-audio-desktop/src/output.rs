//! cpal output and the desktop engine
//!
//! The cpal `Stream` is not `Send` on every platform, so it lives on a dedicated audio
//! thread for its whole life. The engine talks to that thread over a crossbeam channel and
//! reads the play position from an atomic counter the output callback advances.

use crate::decoder::{self, frames_to_millis};
use crate::error::{AudioError, Result};
use crate::resample::resample_stereo;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, StreamConfig, SupportedStreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use elementa_playback::{AudioEngine, EngineError, EngineStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Decoded audio is always interleaved stereo
const CHANNELS: usize = 2;

/// How long `play` waits for the audio thread to start the stream
const PLAY_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Commands sent to the audio thread
enum AudioCommand {
    /// Start the stream and report the outcome
    Play(Sender<Result<()>>),
    /// Pause the stream
    Pause,
    /// Drop the stream and exit
    Shutdown,
}

/// State shared with the output callback
struct OutputState {
    /// Interleaved stereo samples at the device rate
    samples: Vec<f32>,
    /// Next sample index (always a frame boundary)
    position: AtomicUsize,
    /// Callback produces audio only while set
    playing: AtomicBool,
    /// Latched once the last frame was written
    finished: AtomicBool,
}

impl OutputState {
    fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    fn total_frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }
}

/// Default output device and its preferred configuration
pub fn default_output() -> Result<(Device, SupportedStreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::DeviceNotFound)?;
    let config = device.default_output_config()?;
    Ok((device, config))
}

/// One clip playing through cpal
pub struct CpalOutput {
    /// Channel to the audio thread
    command_tx: Sender<AudioCommand>,
    /// Shared playback state
    state: Arc<OutputState>,
    /// Device sample rate the samples were prepared for
    sample_rate: u32,
    /// Joined on drop
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open a paused output stream for `samples` (interleaved stereo at `sample_rate`)
    ///
    /// Blocks until the audio thread has built the stream, so device errors surface here.
    pub fn open(
        device: Device,
        config: StreamConfig,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Result<Self> {
        let state = Arc::new(OutputState::new(samples));
        let (command_tx, command_rx) = bounded::<AudioCommand>(32);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let thread_state = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("elementa-audio".to_string())
            .spawn(move || audio_thread_run(device, config, thread_state, command_rx, ready_tx))
            .map_err(|e| AudioError::ThreadStopped(e.to_string()))?;

        let startup = ready_rx.recv().unwrap_or_else(|_| {
            Err(AudioError::ThreadStopped(
                "audio thread exited during startup".to_string(),
            ))
        });
        if let Err(e) = startup {
            let _ = audio_thread.join();
            return Err(e);
        }

        Ok(Self {
            command_tx,
            state,
            sample_rate,
            audio_thread: Some(audio_thread),
        })
    }

    /// Start or resume; no effect once finished
    pub fn play(&self) -> Result<()> {
        if self.state.finished.load(Ordering::Acquire) {
            return Ok(());
        }

        self.state.playing.store(true, Ordering::Release);
        let (reply_tx, reply_rx) = bounded(1);
        let result = self
            .send(AudioCommand::Play(reply_tx))
            .and_then(|()| {
                reply_rx.recv_timeout(PLAY_REPLY_TIMEOUT).unwrap_or_else(|_| {
                    Err(AudioError::ThreadStopped("no reply to play".to_string()))
                })
            });

        if result.is_err() {
            self.state.playing.store(false, Ordering::Release);
        }
        result
    }

    /// Pause, keeping the position
    pub fn pause(&self) -> Result<()> {
        self.state.playing.store(false, Ordering::Release);
        self.send(AudioCommand::Pause)
    }

    /// Move to `position_ms`, clamped to the clip; returns the applied position
    ///
    /// Ignored once finished.
    pub fn seek(&self, position_ms: u64) -> u64 {
        let total = self.state.total_frames();
        if self.state.finished.load(Ordering::Acquire) {
            return frames_to_millis(total, self.sample_rate);
        }

        let frame = millis_to_frame(position_ms, self.sample_rate, total);
        self.state.position.store(frame * CHANNELS, Ordering::Release);
        frames_to_millis(frame, self.sample_rate)
    }

    /// Position, duration and flags
    pub fn status(&self) -> EngineStatus {
        let frame = self.state.position.load(Ordering::Acquire) / CHANNELS;
        EngineStatus {
            position_ms: frames_to_millis(frame, self.sample_rate),
            duration_ms: frames_to_millis(self.state.total_frames(), self.sample_rate),
            is_playing: self.state.playing.load(Ordering::Acquire),
            finished: self.state.finished.load(Ordering::Acquire),
        }
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn send(&self, command: AudioCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| AudioError::ThreadStopped("command channel closed".to_string()))
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.state.playing.store(false, Ordering::Release);
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            if handle.join().is_err() {
                warn!("Audio thread panicked");
            }
        }
    }
}

/// Audio thread main loop; owns the stream
fn audio_thread_run(
    device: Device,
    config: StreamConfig,
    state: Arc<OutputState>,
    command_rx: Receiver<AudioCommand>,
    ready_tx: Sender<Result<()>>,
) {
    let device_channels = usize::from(config.channels);
    let callback_state = Arc::clone(&state);

    let stream = match device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            fill_output(data, device_channels, &callback_state);
        },
        |err| warn!(error = %err, "Audio stream error"),
        None,
    ) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e.into()));
            return;
        }
    };

    // Some hosts start streams on creation; the callback is silent until played anyway.
    if let Err(e) = stream.pause() {
        debug!(error = %e, "Stream could not be paused after build");
    }
    let _ = ready_tx.send(Ok(()));

    while let Ok(command) = command_rx.recv() {
        match command {
            AudioCommand::Play(reply) => {
                let _ = reply.send(stream.play().map_err(AudioError::from));
            }
            AudioCommand::Pause => {
                if let Err(e) = stream.pause() {
                    debug!(error = %e, "Stream pause failed");
                }
            }
            AudioCommand::Shutdown => break,
        }
    }

    drop(stream);
    debug!("Audio thread stopped");
}

/// Output callback (runs on the real-time thread)
///
/// Writes stereo frames into a device buffer with `device_channels` channels. A mono device
/// gets the average of both sides; channels past the second are left silent.
fn fill_output(output: &mut [f32], device_channels: usize, state: &OutputState) {
    if device_channels == 0 || !state.playing.load(Ordering::Acquire) {
        output.fill(0.0);
        return;
    }

    let samples = &state.samples;
    let start = state.position.load(Ordering::Acquire);
    let mut pos = start;

    for frame in output.chunks_mut(device_channels) {
        if pos + 1 >= samples.len() {
            frame.fill(0.0);
            continue;
        }

        let (left, right) = (samples[pos], samples[pos + 1]);
        if let [mono] = frame {
            *mono = (left + right) * 0.5;
        } else {
            frame[0] = left;
            frame[1] = right;
            frame[2..].fill(0.0);
        }
        pos += CHANNELS;
    }

    let end = samples.len() - samples.len() % CHANNELS;
    if pos >= end {
        state.playing.store(false, Ordering::Release);
        state.finished.store(true, Ordering::Release);
        state.position.store(end, Ordering::Release);
    } else {
        // A concurrent seek wins over the advance.
        let _ = state
            .position
            .compare_exchange(start, pos, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// Frame nearest to `position_ms`, clamped to `total_frames`
fn millis_to_frame(position_ms: u64, sample_rate: u32, total_frames: usize) -> usize {
    let frame = position_ms.saturating_mul(u64::from(sample_rate)) / 1000;
    usize::try_from(frame).unwrap_or(usize::MAX).min(total_frames)
}

/// A converted clip whose output has not been opened yet
struct PendingOutput {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
    samples: Vec<f32>,
    start_frame: usize,
}

impl PendingOutput {
    fn total_frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    fn open(self) -> Result<CpalOutput> {
        let start_frame = self.start_frame;
        let output = CpalOutput::open(self.device, self.config, self.sample_rate, self.samples)?;
        output.state.position.store(start_frame * CHANNELS, Ordering::Release);
        Ok(output)
    }
}

enum Stage {
    Pending(PendingOutput),
    Open(CpalOutput),
    Released,
}

/// Real engine for one clip
///
/// Created paused at position 0 by [`DesktopBackend`](crate::DesktopBackend). The output
/// stream and its audio thread are only opened by the first `play`, so an engine that is
/// never installed never touches the device.
pub struct DesktopEngine {
    stage: Stage,
}

impl DesktopEngine {
    /// Decode and convert to the device rate
    ///
    /// Blocking; run it off the async runtime. Gives up with [`AudioError::Cancelled`]
    /// between stages once `cancelled` is set.
    pub fn prepare(
        bytes: Vec<u8>,
        extension: Option<&str>,
        cancelled: &AtomicBool,
    ) -> Result<Self> {
        let decoded = decoder::decode(bytes, extension)?;
        if cancelled.load(Ordering::Acquire) {
            return Err(AudioError::Cancelled);
        }

        let (device, supported) = default_output()?;
        let device_rate = supported.sample_rate();
        let samples = resample_stereo(decoded.samples, decoded.sample_rate, device_rate)?;
        if cancelled.load(Ordering::Acquire) {
            return Err(AudioError::Cancelled);
        }

        debug!(
            source_rate = decoded.sample_rate,
            device_rate,
            frames = samples.len() / CHANNELS,
            "Audio prepared"
        );

        Ok(Self {
            stage: Stage::Pending(PendingOutput {
                device,
                config: supported.config(),
                sample_rate: device_rate,
                samples,
                start_frame: 0,
            }),
        })
    }

    /// Whether the output stream is open
    pub fn is_open(&self) -> bool {
        matches!(self.stage, Stage::Open(_))
    }
}

impl AudioEngine for DesktopEngine {
    fn play(&mut self) -> elementa_playback::Result<()> {
        if matches!(self.stage, Stage::Pending(_)) {
            if let Stage::Pending(pending) = std::mem::replace(&mut self.stage, Stage::Released) {
                self.stage = Stage::Open(pending.open()?);
                debug!("Output opened");
            }
        }

        match &self.stage {
            Stage::Open(output) => Ok(output.play()?),
            Stage::Pending(_) | Stage::Released => Err(EngineError::Released),
        }
    }

    fn pause(&mut self) -> elementa_playback::Result<()> {
        match &self.stage {
            Stage::Pending(_) => Ok(()),
            Stage::Open(output) => Ok(output.pause()?),
            Stage::Released => Err(EngineError::Released),
        }
    }

    fn seek(&mut self, position_ms: u64) -> elementa_playback::Result<u64> {
        match &mut self.stage {
            Stage::Pending(pending) => {
                let frame =
                    millis_to_frame(position_ms, pending.sample_rate, pending.total_frames());
                pending.start_frame = frame;
                Ok(frames_to_millis(frame, pending.sample_rate))
            }
            Stage::Open(output) => Ok(output.seek(position_ms)),
            Stage::Released => Err(EngineError::Released),
        }
    }

    fn status(&mut self) -> EngineStatus {
        match &self.stage {
            Stage::Pending(pending) => EngineStatus {
                position_ms: frames_to_millis(pending.start_frame, pending.sample_rate),
                duration_ms: frames_to_millis(pending.total_frames(), pending.sample_rate),
                is_playing: false,
                finished: false,
            },
            Stage::Open(output) => output.status(),
            Stage::Released => EngineStatus::default(),
        }
    }

    fn release(&mut self) {
        if !matches!(self.stage, Stage::Released) {
            // Dropping an open output joins its audio thread
            self.stage = Stage::Released;
            debug!("Desktop engine released");
        }
    }
}

impl std::fmt::Debug for DesktopEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self.stage {
            Stage::Pending(_) => "pending",
            Stage::Open(_) => "open",
            Stage::Released => "released",
        };
        f.debug_struct("DesktopEngine").field("stage", &stage).finish()
    }
}
