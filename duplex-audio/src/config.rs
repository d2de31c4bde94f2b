//! Session configuration.
//!
//! A [`StreamConfig`] captures the constants both the codec and the transfer
//! engines must agree on. It is supplied once by the integrator and checked
//! with [`StreamConfig::validate()`] before anything is started; nothing here
//! is renegotiated while streaming.

use crate::constants::{CHANNELS, FRAME_SAMPLES, SAMPLE_BITS, SAMPLE_RATE};
use crate::error::ConfigError;

/// Serial audio framing used on the data lines between MCU and codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelFormat {
    /// Data right-aligned to the word-clock edge.
    RightJustified,
    /// Data starts on the word-clock edge.
    LeftJustified,
    /// Philips I2S: data delayed one bit clock after the word-clock edge.
    I2s,
}

/// What the codec must be told before streaming starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecFormat {
    /// Sample width in bits.
    pub bit_depth: u8,
    /// Data-line framing.
    pub format: ChannelFormat,
}

/// Streaming session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// Samples per frame (one buffer half), counting every channel.
    pub frame_samples: usize,
    /// Nominal sample rate in Hz.
    pub sample_rate: u32,
    /// Sample width in bits. Must be 16.
    pub bit_depth: u8,
    /// Interleaved channels per sample frame.
    pub channels: u8,
    /// Data-line framing.
    pub format: ChannelFormat,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            frame_samples: FRAME_SAMPLES,
            sample_rate: SAMPLE_RATE,
            bit_depth: SAMPLE_BITS,
            channels: CHANNELS,
            format: ChannelFormat::I2s,
        }
    }
}

impl StreamConfig {
    /// Reject configurations that would garble the stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_samples == 0 {
            return Err(ConfigError::ZeroFrame);
        }
        if self.bit_depth != SAMPLE_BITS {
            return Err(ConfigError::UnsupportedBitDepth(self.bit_depth));
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.frame_samples % self.channels as usize != 0 {
            return Err(ConfigError::PartialChannelFrame {
                frame_samples: self.frame_samples,
                channels: self.channels,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }

    /// Samples in the full circular buffer (both halves).
    pub fn buffer_samples(&self) -> usize {
        self.frame_samples * 2
    }

    /// Time between two signals of one direction, in microseconds.
    ///
    /// This is the deadline a consumer has to finish its work on a half.
    /// Returns 0 for a configuration that fails [`validate()`](Self::validate).
    pub fn frame_period_us(&self) -> u32 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0;
        }
        let sample_frames = (self.frame_samples / self.channels as usize) as u64;
        (sample_frames * 1_000_000 / self.sample_rate as u64) as u32
    }

    /// The part of the configuration the codec has to match.
    pub fn codec_format(&self) -> CodecFormat {
        CodecFormat {
            bit_depth: self.bit_depth,
            format: self.format,
        }
    }
}
