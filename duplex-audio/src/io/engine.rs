//! The transfer engine seam.
//!
//! A transfer engine is the DMA stream that moves samples between the serial
//! audio peripheral and a [`FrameBuffer`](crate::buffer::FrameBuffer). It is
//! configured once, started once, and then runs without software
//! intervention, latching a flag at the midpoint and at the wrap of its
//! circular region. The interrupt handler drains those flags with
//! [`TransferEngine::take_event()`] and forwards them to the
//! [`HandoffController`](super::handoff::HandoffController).
//!
//! ```text
//!  position:  0 ─────────── FRAME ─────────── 2×FRAME ─┐
//!                              │                  │     │
//!                       HalfComplete        FullComplete│
//!             ▲──────────────────────────────────────────┘ (wrap)
//! ```

use crate::buffer::DmaRegion;
use crate::constants::SAMPLE_BITS;
use crate::error::ConfigError;

use super::Direction;

/// The two events a circular transfer raises per buffer traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// The engine finished Half A and entered Half B.
    HalfComplete,
    /// The engine finished Half B and wrapped into Half A.
    FullComplete,
}

/// How the engine walks its region. Only circular transfers are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    /// Wrap from the end of the region back to its start, forever.
    Circular,
}

/// Everything an engine needs to bind itself to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    region: DmaRegion,
    direction: Direction,
    mode: TransferMode,
    word_bits: u8,
}

impl TransferConfig {
    /// Describe a circular 16-bit transfer over `region`.
    ///
    /// The region must be non-empty and split into two equal halves.
    pub fn circular(region: DmaRegion, direction: Direction) -> Result<Self, ConfigError> {
        if region.is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        if region.len() % 2 != 0 {
            return Err(ConfigError::OddRegionLength(region.len()));
        }
        Ok(TransferConfig {
            region,
            direction,
            mode: TransferMode::Circular,
            word_bits: SAMPLE_BITS,
        })
    }

    /// Bound buffer.
    pub fn region(&self) -> DmaRegion {
        self.region
    }

    /// Peripheral-to-memory for [`Direction::Input`], memory-to-peripheral
    /// for [`Direction::Output`].
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Width of one transfer on both the memory and the peripheral side.
    pub fn word_bits(&self) -> u8 {
        self.word_bits
    }

    /// Samples in the whole region.
    pub fn total_len(&self) -> usize {
        self.region.len()
    }
}

/// A DMA stream driving one direction of the audio bus.
///
/// Implementations wrap a concrete DMA channel. There is no
/// `stop()`: once started, an engine runs for the life of the session.
///
/// An engine that moves samples from software must hold
/// [`DmaRegion::try_claim`] for the half it touches; a hardware engine
/// relies on the consumer finishing each half within one frame period.
pub trait TransferEngine {
    /// Error type for configuration and start.
    type Error;

    /// Bind the engine to a buffer. Called once, before [`start()`](Self::start).
    fn configure(&mut self, config: &TransferConfig) -> Result<(), Self::Error>;

    /// Begin the endless circular transfer.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Read and clear one latched event, or `None` if no flag is pending.
    ///
    /// When both flags are latched, the older event is returned first, so
    /// the last event handled matches the engine's current half. Called from
    /// the interrupt handler only.
    fn take_event(&mut self) -> Option<TransferEvent>;
}
