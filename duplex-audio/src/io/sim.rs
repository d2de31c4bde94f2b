//! Software transfer engine.
//!
//! [`SimEngine`] behaves like a circular DMA stream with half/full interrupts
//! enabled, except that it only moves when told to. Tests drive it one sample
//! period at a time and compare its [`current_half()`](SimEngine::current_half)
//! against what the handoff controller publishes.
//!
//! An input engine stores whatever the sample callback leaves in the slot
//! (the "ADC" side); an output engine only reads memory and hands each
//! sample to the callback (the "DAC" side).
//!
//! Each sample is moved under the claim of the half it belongs to. If
//! software still holds that half, the sample is skipped and counted as a
//! [collision](SimEngine::collisions): the simulated form of buffer tearing.

use thiserror::Error;

use crate::buffer::Half;
use crate::constants::Sample;

use super::engine::{TransferConfig, TransferEngine, TransferEvent};
use super::Direction;

/// Misuse of a [`SimEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    #[error("engine has no buffer bound")]
    NotConfigured,
    #[error("engine is already running")]
    AlreadyRunning,
}

/// A transfer engine advanced explicitly, one sample period at a time.
#[derive(Debug)]
pub struct SimEngine {
    config: Option<TransferConfig>,
    running: bool,
    /// Index of the next sample to transfer.
    position: usize,
    half_flag: bool,
    full_flag: bool,
    /// Flags that were set again before the handler cleared them.
    lost_events: u32,
    /// Samples skipped because software held their half.
    collisions: u32,
    transferred: u64,
}

impl SimEngine {
    pub const fn new() -> Self {
        SimEngine {
            config: None,
            running: false,
            position: 0,
            half_flag: false,
            full_flag: false,
            lost_events: 0,
            collisions: 0,
            transferred: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Index of the next sample the engine will transfer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The half the engine is currently transferring, or `None` if unbound.
    pub fn current_half(&self) -> Option<Half> {
        self.config
            .map(|c| Half::containing(self.position, c.region().half_len()))
    }

    /// Events overwritten before [`take_event()`](TransferEngine::take_event)
    /// collected them: the interrupt handler was too late.
    pub fn lost_events(&self) -> u32 {
        self.lost_events
    }

    /// Samples the engine reached while software still held their half.
    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    /// Samples moved since the engine was started.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Whether an event is latched and waiting for the handler.
    pub fn is_pending(&self) -> bool {
        self.half_flag || self.full_flag
    }

    /// Advance `samples` sample periods without observing the data.
    ///
    /// Returns the number of events latched.
    pub fn advance(&mut self, samples: usize) -> usize {
        self.advance_with(samples, |_, _| {})
    }

    /// Advance `samples` sample periods, calling `on_sample(index, slot)` for
    /// each transferred sample.
    ///
    /// For an input engine the value left in `slot` is written to the buffer;
    /// an output engine discards changes. Does nothing unless running.
    /// Returns the number of events latched.
    pub fn advance_with<F>(&mut self, samples: usize, mut on_sample: F) -> usize
    where
        F: FnMut(usize, &mut Sample),
    {
        let mut events = 0;
        for _ in 0..samples {
            if self.step(&mut on_sample).is_some() {
                events += 1;
            }
        }
        events
    }

    /// Advance until the next event latches and return it, or `None` if the
    /// engine is not running.
    pub fn run_to_event<F>(&mut self, mut on_sample: F) -> Option<TransferEvent>
    where
        F: FnMut(usize, &mut Sample),
    {
        if !self.running {
            return None;
        }
        loop {
            if let Some(event) = self.step(&mut on_sample) {
                return Some(event);
            }
        }
    }

    fn step<F>(&mut self, on_sample: &mut F) -> Option<TransferEvent>
    where
        F: FnMut(usize, &mut Sample),
    {
        let config = self.config.filter(|_| self.running)?;
        let region = config.region();
        let index = self.position;
        let half = Half::containing(index, region.half_len());

        match region.try_claim(half) {
            Some(_claim) => {
                // SAFETY: `index < region.len()`, the region outlives the
                // binding, and the claim keeps software off this half.
                // Volatile access mirrors a bus master the compiler cannot see.
                unsafe {
                    let slot = region.as_ptr().add(index);
                    let mut sample = slot.read_volatile();
                    on_sample(index, &mut sample);
                    if config.direction() == Direction::Input {
                        slot.write_volatile(sample);
                    }
                }
                self.transferred += 1;
            }
            None => self.collisions += 1,
        }

        self.position += 1;

        if self.position == region.half_len() {
            self.lost_events += u32::from(self.half_flag);
            self.half_flag = true;
            Some(TransferEvent::HalfComplete)
        } else if self.position == region.len() {
            self.position = 0;
            self.lost_events += u32::from(self.full_flag);
            self.full_flag = true;
            Some(TransferEvent::FullComplete)
        } else {
            None
        }
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferEngine for SimEngine {
    type Error = SimError;

    fn configure(&mut self, config: &TransferConfig) -> Result<(), SimError> {
        if self.running {
            return Err(SimError::AlreadyRunning);
        }
        self.config = Some(*config);
        self.position = 0;
        self.half_flag = false;
        self.full_flag = false;
        Ok(())
    }

    fn start(&mut self) -> Result<(), SimError> {
        if self.config.is_none() {
            return Err(SimError::NotConfigured);
        }
        if self.running {
            return Err(SimError::AlreadyRunning);
        }
        self.running = true;
        self.transferred = 0;
        self.collisions = 0;
        Ok(())
    }

    fn take_event(&mut self) -> Option<TransferEvent> {
        // Both latched: hand out the older one first. In Half B the wrap
        // happened before the midpoint.
        let full_is_older = self.current_half() == Some(Half::B);
        match (self.half_flag, self.full_flag) {
            (true, true) if full_is_older => {
                self.full_flag = false;
                Some(TransferEvent::FullComplete)
            }
            (true, true) => {
                self.half_flag = false;
                Some(TransferEvent::HalfComplete)
            }
            (true, false) => {
                self.half_flag = false;
                Some(TransferEvent::HalfComplete)
            }
            (false, true) => {
                self.full_flag = false;
                Some(TransferEvent::FullComplete)
            }
            (false, false) => None,
        }
    }
}
