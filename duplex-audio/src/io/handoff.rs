//! Buffer handoff between the transfer engines and software.
//!
//! The [`HandoffController`] reacts to the two transfer events and publishes,
//! per direction, which half of the buffer software may touch. It is the only
//! state shared between the interrupt context (single writer) and the
//! consumer (any number of readers).
//!
//! ## Transition table
//!
//! | Event | Engine just finished | Engine now in | Published active half |
//! |-------|----------------------|---------------|-----------------------|
//! | `HalfComplete` | Half A | Half B | **A** |
//! | `FullComplete` | Half B | Half A | **B** |
//!
//! The active half is always the one the engine just finished, never the one
//! it is about to enter.
//!
//! ## Publication
//!
//! Half, synchronization flag and a wrapping frame sequence number are packed
//! into one `AtomicU32` and replaced with a single store, so a reader can never
//! observe a half-updated state:
//!
//! ```text
//!  31                                  2   1      0
//! ┌──────────────────────────────────────┬──────┬──────┐
//! │            sequence (30 bits)        │ sync │ half │
//! └──────────────────────────────────────┴──────┴──────┘
//! ```
//!
//! ## Synchronization
//!
//! Before its first event a direction reads as Half A but is not
//! *synchronized*: the engine's starting phase is unknown, so
//! [`FrameCursor`](super::cursor::FrameCursor) hands out no frame yet. The
//! first event synchronizes the direction and is never reported as a repeat.
//! From then on every event must flip the half; one that does not means an
//! event was lost and is reported as [`SignalOutcome::Repeated`].

use core::sync::atomic::{AtomicU32, Ordering};

use crate::buffer::Half;

use super::engine::{TransferEngine, TransferEvent};
use super::Direction;

const HALF_BIT: u32 = 0b01;
const SYNC_BIT: u32 = 0b10;
const SEQUENCE_SHIFT: u32 = 2;

/// Frame sequence numbers wrap at this mask (30 bits).
pub const SEQUENCE_MASK: u32 = u32::MAX >> SEQUENCE_SHIFT;

/// The half published after `event`.
pub const fn half_after(event: TransferEvent) -> Half {
    match event {
        TransferEvent::HalfComplete => Half::A,
        TransferEvent::FullComplete => Half::B,
    }
}

/// A consistent snapshot of one direction's published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandoffState {
    /// The half software may touch.
    pub half: Half,
    /// Whether at least one event has arrived since the last reset.
    pub synchronized: bool,
    /// Number of events handled since the last reset, modulo 2^30.
    pub sequence: u32,
}

impl HandoffState {
    /// State before the first event.
    pub const INITIAL: HandoffState = HandoffState {
        half: Half::A,
        synchronized: false,
        sequence: 0,
    };

    const fn encode(self) -> u32 {
        let half = match self.half {
            Half::A => 0,
            Half::B => HALF_BIT,
        };
        let sync = if self.synchronized { SYNC_BIT } else { 0 };
        ((self.sequence & SEQUENCE_MASK) << SEQUENCE_SHIFT) | sync | half
    }

    const fn decode(word: u32) -> Self {
        HandoffState {
            half: if word & HALF_BIT == 0 { Half::A } else { Half::B },
            synchronized: word & SYNC_BIT != 0,
            sequence: word >> SEQUENCE_SHIFT,
        }
    }
}

/// What handling one event did to a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalOutcome {
    /// First event after a reset; the half is now trustworthy.
    Synchronized(Half),
    /// Normal alternation: the half flipped.
    Flipped(Half),
    /// The same event arrived twice in a row. An event was lost, so the
    /// consumer may already be racing the engine.
    Repeated(Half),
}

impl SignalOutcome {
    /// The half published by this event.
    pub fn half(self) -> Half {
        match self {
            SignalOutcome::Synchronized(h)
            | SignalOutcome::Flipped(h)
            | SignalOutcome::Repeated(h) => h,
        }
    }

    /// Whether the event broke strict alternation.
    pub fn is_fault(self) -> bool {
        matches!(self, SignalOutcome::Repeated(_))
    }
}

/// Single-writer, multi-reader published state for one direction.
pub struct ActiveHalfCell {
    state: AtomicU32,
    /// Repeated events seen since the last reset.
    faults: AtomicU32,
}

impl ActiveHalfCell {
    pub const fn new() -> Self {
        ActiveHalfCell {
            state: AtomicU32::new(HandoffState::INITIAL.encode()),
            faults: AtomicU32::new(0),
        }
    }

    /// Snapshot the published state.
    pub fn load(&self) -> HandoffState {
        HandoffState::decode(self.state.load(Ordering::Acquire))
    }

    /// The half software may touch right now.
    pub fn active(&self) -> Half {
        self.load().half
    }

    pub fn is_synchronized(&self) -> bool {
        self.load().synchronized
    }

    /// Number of repeated events since the last reset.
    pub fn faults(&self) -> u32 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Apply one event and publish the result.
    ///
    /// Must only be called from the one context that owns this direction's
    /// engine interrupt. Never blocks.
    pub fn publish(&self, event: TransferEvent) -> SignalOutcome {
        // Single writer: a plain load/store pair cannot lose an update.
        let prev = HandoffState::decode(self.state.load(Ordering::Relaxed));
        let half = half_after(event);
        let next = HandoffState {
            half,
            synchronized: true,
            sequence: prev.sequence.wrapping_add(1) & SEQUENCE_MASK,
        };
        self.state.store(next.encode(), Ordering::Release);

        if !prev.synchronized {
            SignalOutcome::Synchronized(half)
        } else if prev.half == half {
            let faults = self.faults.load(Ordering::Relaxed);
            self.faults.store(faults.wrapping_add(1), Ordering::Relaxed);
            SignalOutcome::Repeated(half)
        } else {
            SignalOutcome::Flipped(half)
        }
    }

    /// Return to the initial, unsynchronized state. Only valid while the
    /// direction's engine is not running.
    pub fn reset(&self) {
        self.state.store(HandoffState::INITIAL.encode(), Ordering::Release);
        self.faults.store(0, Ordering::Relaxed);
    }
}

impl Default for ActiveHalfCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes the active half of each direction in response to transfer
/// events.
///
/// `const`-constructible so it can be a `static` shared by the interrupt
/// handlers and the consumer:
///
/// ```ignore
/// static HANDOFF: HandoffController = HandoffController::new();
///
/// // RX DMA interrupt:
/// HANDOFF.service(Direction::Input, &mut rx_engine);
///
/// // Consumer loop:
/// let half = HANDOFF.active_half(Direction::Input);
/// ```
pub struct HandoffController {
    input: ActiveHalfCell,
    output: ActiveHalfCell,
}

impl HandoffController {
    /// Both directions start unsynchronized on Half A.
    pub const fn new() -> Self {
        HandoffController {
            input: ActiveHalfCell::new(),
            output: ActiveHalfCell::new(),
        }
    }

    /// The published cell for `direction`.
    pub fn cell(&self, direction: Direction) -> &ActiveHalfCell {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// The half of `direction`'s buffer software may touch.
    pub fn active_half(&self, direction: Direction) -> Half {
        self.cell(direction).active()
    }

    /// Full published state of `direction`.
    pub fn state(&self, direction: Direction) -> HandoffState {
        self.cell(direction).load()
    }

    /// Handle the midpoint event: the engine finished Half A.
    pub fn on_half_complete(&self, direction: Direction) -> SignalOutcome {
        self.signal(direction, TransferEvent::HalfComplete)
    }

    /// Handle the wrap event: the engine finished Half B.
    pub fn on_full_complete(&self, direction: Direction) -> SignalOutcome {
        self.signal(direction, TransferEvent::FullComplete)
    }

    /// Handle one event for `direction`.
    pub fn signal(&self, direction: Direction, event: TransferEvent) -> SignalOutcome {
        let outcome = self.cell(direction).publish(event);
        #[cfg(feature = "defmt")]
        if outcome.is_fault() {
            defmt::warn!("{} {} repeated, half {}", direction, event, outcome.half());
        }
        outcome
    }

    /// Drain every event latched by `engine` and apply it, in the order the
    /// engine reports them. Call this from the engine's interrupt handler.
    ///
    /// Returns the outcome of the last event handled, or `None` for a
    /// spurious interrupt.
    pub fn service<E: TransferEngine>(
        &self,
        direction: Direction,
        engine: &mut E,
    ) -> Option<SignalOutcome> {
        let mut last = None;
        while let Some(event) = engine.take_event() {
            last = Some(self.signal(direction, event));
        }
        last
    }

    /// Return both directions to their initial state. Only valid before the
    /// engines are started.
    pub fn reset(&self) {
        self.input.reset();
        self.output.reset();
    }
}

impl Default for HandoffController {
    fn default() -> Self {
        Self::new()
    }
}
