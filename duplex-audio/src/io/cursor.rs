//! Consumer-side frame polling.
//!
//! The consumer never blocks and is never notified; it polls. A
//! [`FrameCursor`] remembers the last frame it handed out and turns the
//! published sequence number into one [`FrameTicket`] per new frame, counting
//! any frames that came and went while the consumer was busy.
//!
//! ```ignore
//! let mut cursor = FrameCursor::new(Direction::Input);
//! loop {
//!     if let Some(ticket) = cursor.poll(&HANDOFF) {
//!         BUFFERS.read_frame(&ticket, |samples| {
//!             // ... must finish before the next event for this direction ...
//!         });
//!         debug_assert!(ticket.is_current(&HANDOFF));
//!     }
//! }
//! ```

use core::sync::atomic::{compiler_fence, Ordering};

use crate::buffer::Half;

use super::handoff::{HandoffController, SEQUENCE_MASK};
use super::Direction;

/// Permission to touch one half for one frame period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTicket {
    direction: Direction,
    half: Half,
    sequence: u32,
    missed: u32,
}

impl FrameTicket {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The half that was active when the ticket was issued.
    pub fn half(&self) -> Half {
        self.half
    }

    /// Sequence number of the event that published this frame.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Frames published and superseded since the previous ticket, i.e.
    /// frames the consumer never saw. Always 0 on the first ticket.
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// `true` while no newer event has arrived for this direction. A consumer
    /// that finds this `false` after its work has raced the engine.
    pub fn is_current(&self, controller: &HandoffController) -> bool {
        controller.state(self.direction).sequence == self.sequence
    }
}

/// Tracks which frames of one direction the consumer has already handled.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    direction: Direction,
    last: Option<u32>,
}

impl FrameCursor {
    pub const fn new(direction: Direction) -> Self {
        FrameCursor {
            direction,
            last: None,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Return a ticket if a new frame was published since the last call.
    ///
    /// Returns `None` before the direction is synchronized and when nothing
    /// new has arrived.
    pub fn poll(&mut self, controller: &HandoffController) -> Option<FrameTicket> {
        // The previous frame's writes must be emitted before the engine can reach them.
        compiler_fence(Ordering::SeqCst);

        let state = controller.state(self.direction);
        if !state.synchronized {
            return None;
        }
        let missed = match self.last {
            Some(last) if last == state.sequence => return None,
            Some(last) => state.sequence.wrapping_sub(last).wrapping_sub(1) & SEQUENCE_MASK,
            None => 0,
        };
        self.last = Some(state.sequence);

        Some(FrameTicket {
            direction: self.direction,
            half: state.half,
            sequence: state.sequence,
            missed,
        })
    }

    /// Forget all history. Pair with [`HandoffController::reset()`].
    pub fn reset(&mut self) {
        self.last = None;
    }
}
