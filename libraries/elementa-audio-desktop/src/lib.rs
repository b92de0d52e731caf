//! Desktop audio engine for Elementa
//!
//! Provides [`DesktopBackend`], the real [`AudioBackend`](elementa_playback::AudioBackend)
//! used on desktop: narration is read from the bundled assets directory or downloaded,
//! decoded completely with symphonia, resampled with rubato to the device rate and played
//! through cpal.
//!
//! # Example
//!
//! ```no_run
//! use elementa_audio_desktop::DesktopBackend;
//! use elementa_playback::{PlaybackConfig, SessionCoordinator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = DesktopBackend::new("assets/audio")?;
//! let coordinator = SessionCoordinator::new(Arc::new(backend), PlaybackConfig::default());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod backend;
mod decoder;
mod error;
mod output;
mod resample;

pub use backend::DesktopBackend;
pub use decoder::{decode, DecodedAudio};
pub use error::{AudioError, Result};
pub use output::{default_output, CpalOutput, DesktopEngine};
pub use resample::resample_stereo;
