//! Circular double buffers shared with the transfer engines.
//!
//! Each direction owns one [`FrameBuffer`] of `2 × FRAME` samples. The
//! transfer engine is bound to its base address for the whole session and
//! walks it circularly; software touches only the half the
//! [handoff controller](crate::io::handoff) publishes as active, and only
//! while holding that half's [`HalfClaim`].
//!
//! ```text
//!  index 0                FRAME               2×FRAME
//!  ┌────────────────────┬────────────────────┐
//!  │       Half A       │       Half B       │ ◄── engine wraps here
//!  └────────────────────┴────────────────────┘
//! ```

mod claim;
mod frame;

pub use claim::HalfClaim;
pub use frame::{DmaRegion, FrameBuffer, FrameBufferPair};

/// One half of a circular double buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Indices `[0, FRAME)`.
    A,
    /// Indices `[FRAME, 2×FRAME)`.
    B,
}

impl Half {
    /// The half that is not `self`.
    pub const fn other(self) -> Half {
        match self {
            Half::A => Half::B,
            Half::B => Half::A,
        }
    }

    /// 0 for A, 1 for B.
    pub const fn index(self) -> usize {
        match self {
            Half::A => 0,
            Half::B => 1,
        }
    }

    /// The half containing sample `position` of a buffer with `frame`-sample halves.
    pub const fn containing(position: usize, frame: usize) -> Half {
        if position < frame {
            Half::A
        } else {
            Half::B
        }
    }
}
