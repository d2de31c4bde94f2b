//! # duplex-audio
//!
//! A `no_std`, zero-allocation full-duplex audio streaming core for
//! microcontrollers that move I2S samples with circular DMA. Each direction
//! owns a buffer of two frames; while the DMA engine fills or drains one
//! half, the application works on the other, and the half-transfer and
//! transfer-complete interrupts tell it which half is safe.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`buffer`] | Statically placed double buffers and the regions handed to DMA |
//! | Handoff | [`io::handoff`] | Interrupt-published active half per direction |
//! | Transfer | [`io::engine`] | `TransferEngine` trait the DMA driver implements |
//! | Consumer | [`io::cursor`] | Frame-at-a-time polling with missed-frame counting |
//! | Startup | [`io::session`] | Codec, engines and controller brought up in order |
//! | Codec | [`codec`] | WM8778 control-port driver (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use duplex_audio::{FrameBufferPair, HandoffController, StreamConfig, Direction};
//! use duplex_audio::io::{start_session, FrameCursor};
//!
//! static BUFFERS: FrameBufferPair<128> = FrameBufferPair::new();
//! static HANDOFF: HandoffController = HandoffController::new();
//!
//! start_session(&StreamConfig::default(), &mut codec, &BUFFERS, &HANDOFF, &mut rx, &mut tx)?;
//!
//! // DMA interrupt handlers:
//! HANDOFF.service(Direction::Input, &mut rx);
//! HANDOFF.service(Direction::Output, &mut tx);
//!
//! // Application loop: copy each input frame to the output.
//! let mut rx_cursor = FrameCursor::new(Direction::Input);
//! let mut tx_cursor = FrameCursor::new(Direction::Output);
//! loop {
//!     if let (Some(rx), Some(tx)) = (rx_cursor.poll(&HANDOFF), tx_cursor.poll(&HANDOFF)) {
//!         let frame = BUFFERS.read_frame(&rx, |samples| *samples);
//!         if let Some(frame) = frame {
//!             BUFFERS.write_frame(&tx, |out| *out = frame);
//!         }
//!         // ... all within one frame period ...
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `wm8778` | yes | WM8778 codec driver (requires `embedded-hal`) |
//! | `sim` | no | Software [`io::SimEngine`] for host-side testing |
//! | `defmt` | no | `defmt::Format` derives and log output |
//!
//! ## Audio parameters
//!
//! - **Frame size:** 128 samples ([`constants::FRAME_SAMPLES`])
//! - **Sample rate:** 44 100 Hz ([`constants::SAMPLE_RATE`])
//! - **Sample format:** `i16`, two channels interleaved
//! - **Frame period:** about 1.45 ms at the defaults

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod config;
pub mod error;
pub mod buffer;
pub mod control;
pub mod io;

#[cfg(feature = "wm8778")]
pub mod codec;

pub use buffer::{DmaRegion, FrameBuffer, FrameBufferPair, Half, HalfClaim};
pub use config::{ChannelFormat, CodecFormat, StreamConfig};
pub use control::AudioCodec;
pub use error::{ConfigError, SessionError};
pub use io::{Direction, HandoffController, TransferEngine, TransferEvent};
