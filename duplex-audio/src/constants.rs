/// Number of 16-bit samples in one frame (one half of a DMA buffer).
pub const FRAME_SAMPLES: usize = 128;

/// Number of samples in a full circular DMA buffer (two frames).
pub const BUFFER_SAMPLES: usize = FRAME_SAMPLES * 2;

/// Nominal audio sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Width of one sample on the bus, in bits.
pub const SAMPLE_BITS: u8 = 16;

/// Interleaved channels per sample frame (stereo).
pub const CHANNELS: u8 = 2;

/// One channel-interleaved audio sample.
pub type Sample = i16;
