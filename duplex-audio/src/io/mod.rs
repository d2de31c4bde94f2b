//! Streaming I/O: transfer engines, buffer handoff, and session startup.
//!
//! ## Components
//!
//! | Item | Context | Description |
//! |------|---------|-------------|
//! | [`TransferEngine`] | setup + ISR | Circular DMA stream, raises half/full events |
//! | [`HandoffController`] | ISR (writer) | Publishes the active half per direction |
//! | [`FrameCursor`] | consumer | Polls for new frames, counts missed ones |
//! | [`start_session`] | setup | Validates config, binds and starts engines |
//! | `SimEngine` | tests / host | Software engine that reports its position (`sim` feature) |
//!
//! ## Contexts
//!
//! ```text
//!  DMA hardware                 ISR (high priority)            consumer (low priority)
//! ┌─────────────┐  half/full  ┌────────────────────┐  atomic  ┌──────────────────────┐
//! │ RX engine   ├────────────►│ HandoffController  ├─────────►│ FrameCursor::poll()  │
//! │ TX engine   ├────────────►│   ::service()      │  publish │ read/write the half  │
//! └──────┬──────┘             └────────────────────┘          └──────────┬───────────┘
//!        │              FrameBufferPair (fixed address)                  │
//!        └────────────────── other half ◄──────┴──────► active half ─────┘
//! ```
//!
//! The interrupt context never blocks and never waits for the consumer. The
//! consumer must finish each frame before the next event of that direction;
//! there is no backpressure.

pub mod cursor;
pub mod engine;
pub mod handoff;
pub mod session;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use cursor::{FrameCursor, FrameTicket};
pub use engine::{TransferConfig, TransferEngine, TransferEvent, TransferMode};
pub use handoff::{ActiveHalfCell, HandoffController, HandoffState, SignalOutcome};
pub use session::start_session;

#[cfg(any(test, feature = "sim"))]
pub use sim::{SimEngine, SimError};


/// Which way samples flow. The two directions share no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Codec ADC → memory.
    Input,
    /// Memory → codec DAC.
    Output,
}
