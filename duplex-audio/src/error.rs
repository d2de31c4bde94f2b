//! Setup-time error types.
//!
//! Only configuration and collaborator failures are errors. Runtime hazards
//! (a repeated signal, a consumer that missed its deadline) are reported as
//! data by [`crate::io::handoff`] and [`crate::io::cursor`] so the signal
//! handler never takes an error path.

use thiserror::Error;

/// A configuration that cannot stream correctly. Raised before any engine
/// is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Frame size of zero samples.
    #[error("frame size must be non-zero")]
    ZeroFrame,
    /// Only 16-bit samples are carried by the buffers.
    #[error("unsupported bit depth {0} (expected 16)")]
    UnsupportedBitDepth(u8),
    /// Channel count of zero.
    #[error("channel count must be non-zero")]
    ZeroChannels,
    /// A frame would end in the middle of an interleaved channel group.
    #[error("frame of {frame_samples} samples is not a whole number of {channels}-channel frames")]
    PartialChannelFrame { frame_samples: usize, channels: u8 },
    /// Sample rate of zero.
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    /// The buffer handed to the session does not match the configured frame.
    #[error("configured frame of {configured} samples does not match buffer frame of {buffer}")]
    FrameSizeMismatch { configured: usize, buffer: usize },
    /// A transfer region of zero length.
    #[error("transfer region is empty")]
    EmptyRegion,
    /// A circular region must split into two equal halves.
    #[error("transfer region length {0} is not even")]
    OddRegionLength(usize),
    /// Transfer engine and codec disagree on the sample width.
    #[error("engine word of {engine_bits} bits does not match codec word of {codec_bits} bits")]
    WordSizeMismatch { engine_bits: u8, codec_bits: u8 },
}

/// Failure while bringing a streaming session up.
#[derive(Debug, Error)]
pub enum SessionError<C, E> {
    /// The configuration was rejected before touching any collaborator.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The codec command channel failed.
    #[error("codec configuration failed: {0:?}")]
    Codec(C),
    /// A transfer engine refused its binding or failed to start.
    #[error("transfer engine failed: {0:?}")]
    Engine(E),
}
