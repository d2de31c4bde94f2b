//! Buffer storage and the region an engine is bound to.
//!
//! A [`FrameBuffer`] only hands out its [`DmaRegion`] from a `&'static`
//! borrow, so the address an engine transfers to can never dangle. Software
//! reaches the samples through short closures that hold a [`HalfClaim`] on
//! one half; the same claim is what a software engine takes per sample.

use core::cell::UnsafeCell;
use core::sync::atomic::AtomicBool;

use crate::constants::Sample;
use crate::io::cursor::FrameTicket;
use crate::io::handoff::HandoffController;
use crate::io::Direction;

use super::claim::HalfClaim;
use super::Half;

/// Base address and length of a buffer as seen by a transfer engine.
///
/// Regions from [`FrameBuffer::region()`] point at a `'static` buffer and
/// carry its claim flags. [`from_raw_parts`](Self::from_raw_parts) is the
/// escape hatch for memory the crate does not own.
#[derive(Debug, Clone, Copy)]
pub struct DmaRegion {
    base: *mut Sample,
    len: usize,
    claims: Option<&'static [AtomicBool; 2]>,
}

// SAFETY: A region is an address range handed to hardware. Moving the
// descriptor between contexts does not create an access by itself; every
// dereference is an `unsafe` engine-side operation.
unsafe impl Send for DmaRegion {}

impl PartialEq for DmaRegion {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.len == other.len
    }
}

impl Eq for DmaRegion {}

impl DmaRegion {
    /// Describe an arbitrary sample region.
    ///
    /// # Safety
    /// `base` must be valid for reads and writes of `len` samples for as long
    /// as any engine is bound to the region, and nothing else may access a
    /// half while an engine transfers it.
    pub const unsafe fn from_raw_parts(base: *mut Sample, len: usize) -> Self {
        DmaRegion {
            base,
            len,
            claims: None,
        }
    }

    /// Start of the region.
    pub fn as_ptr(&self) -> *mut Sample {
        self.base
    }

    /// Start of the region as a bus address.
    pub fn address(&self) -> usize {
        self.base as usize
    }

    /// Number of samples in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples per half.
    pub fn half_len(&self) -> usize {
        self.len / 2
    }

    /// Take `half` for one engine-side access, or `None` while software
    /// holds it. Raw regions carry no flags and always succeed.
    pub fn try_claim(&self, half: Half) -> Option<HalfClaim<'static>> {
        match self.claims {
            Some(flags) => HalfClaim::acquire(&flags[half.index()]),
            None => Some(HalfClaim::unguarded()),
        }
    }
}

/// One direction's circular double buffer: two contiguous halves of `FRAME`
/// samples.
///
/// The buffer is never resized or reallocated; an engine bound through
/// [`region()`](Self::region) keeps transferring into it for the whole
/// session. Which half software *should* touch is the handoff controller's
/// business; the claims only stop two parties touching one half at once.
#[repr(C, align(4))]
pub struct FrameBuffer<const FRAME: usize> {
    halves: UnsafeCell<[[Sample; FRAME]; 2]>,
    claims: [AtomicBool; 2],
}

// SAFETY: Shared access to the samples only happens while holding the
// half's claim. `&mut self` access cannot coexist with a bound region,
// which needs a `'static` shared borrow.
unsafe impl<const FRAME: usize> Sync for FrameBuffer<FRAME> {}

impl<const FRAME: usize> FrameBuffer<FRAME> {
    /// A zeroed (silent) buffer.
    pub const fn new() -> Self {
        FrameBuffer {
            halves: UnsafeCell::new([[0; FRAME]; 2]),
            claims: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    /// Samples per half.
    pub const fn frame_len(&self) -> usize {
        FRAME
    }

    /// Samples in both halves.
    pub const fn len(&self) -> usize {
        FRAME * 2
    }

    pub const fn is_empty(&self) -> bool {
        FRAME == 0
    }

    /// The address range to bind a transfer engine to.
    ///
    /// Only a buffer that lives for the rest of the program can be bound:
    ///
    /// ```compile_fail
    /// use duplex_audio::FrameBuffer;
    ///
    /// let buf: FrameBuffer<4> = FrameBuffer::new();
    /// let region = buf.region();
    /// ```
    pub fn region(&'static self) -> DmaRegion {
        DmaRegion {
            base: self.halves.get().cast::<Sample>(),
            len: FRAME * 2,
            claims: Some(&self.claims),
        }
    }

    /// Run `f` over one half. `None` if the half is held elsewhere.
    pub fn read_with<R>(&self, half: Half, f: impl FnOnce(&[Sample; FRAME]) -> R) -> Option<R> {
        let _claim = HalfClaim::acquire(&self.claims[half.index()])?;
        // SAFETY: The claim excludes every other software access and every
        // claim-respecting engine for as long as `f` runs.
        let samples = unsafe { &*self.half_ptr(half) };
        Some(f(samples))
    }

    /// Run `f` over one half, mutably. `None` if the half is held elsewhere.
    pub fn write_with<R>(
        &self,
        half: Half,
        f: impl FnOnce(&mut [Sample; FRAME]) -> R,
    ) -> Option<R> {
        let _claim = HalfClaim::acquire(&self.claims[half.index()])?;
        // SAFETY: As in `read_with`; the claim is exclusive, readers included.
        let samples = unsafe { &mut *self.half_ptr(half) };
        Some(f(samples))
    }

    /// Direct access to one half of an unshared buffer, e.g. to prefill
    /// output before it is bound.
    pub fn half_mut(&mut self, half: Half) -> &mut [Sample; FRAME] {
        &mut self.halves.get_mut()[half.index()]
    }

    /// Overwrite both halves.
    pub fn fill(&mut self, value: Sample) {
        for half in self.halves.get_mut().iter_mut() {
            half.fill(value);
        }
    }

    fn half_ptr(&self, half: Half) -> *mut [Sample; FRAME] {
        // SAFETY: `index()` is 0 or 1, inside the two-half array.
        unsafe { self.halves.get().cast::<[Sample; FRAME]>().add(half.index()) }
    }
}

impl<const FRAME: usize> Default for FrameBuffer<FRAME> {
    fn default() -> Self {
        Self::new()
    }
}

/// Input and output buffers for one full-duplex session.
///
/// The two directions share nothing; each is bound to its own engine and
/// handed off by its own cell of the [`HandoffController`]. Meant to live in
/// a `static`:
///
/// ```ignore
/// static BUFFERS: FrameBufferPair<128> = FrameBufferPair::new();
///
/// if let Some(ticket) = output_cursor.poll(&HANDOFF) {
///     BUFFERS.write_frame(&ticket, |out| out.fill(0));
/// }
/// ```
pub struct FrameBufferPair<const FRAME: usize> {
    /// Filled by the receive engine, read by software.
    pub input: FrameBuffer<FRAME>,
    /// Filled by software, drained by the transmit engine.
    pub output: FrameBuffer<FRAME>,
}

impl<const FRAME: usize> FrameBufferPair<FRAME> {
    pub const fn new() -> Self {
        FrameBufferPair {
            input: FrameBuffer::new(),
            output: FrameBuffer::new(),
        }
    }

    /// The buffer for `direction`.
    pub fn buffer(&self, direction: Direction) -> &FrameBuffer<FRAME> {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// Read the half `ticket` was issued for.
    pub fn read_frame<R>(
        &self,
        ticket: &FrameTicket,
        f: impl FnOnce(&[Sample; FRAME]) -> R,
    ) -> Option<R> {
        self.buffer(ticket.direction()).read_with(ticket.half(), f)
    }

    /// Write the half `ticket` was issued for.
    pub fn write_frame<R>(
        &self,
        ticket: &FrameTicket,
        f: impl FnOnce(&mut [Sample; FRAME]) -> R,
    ) -> Option<R> {
        self.buffer(ticket.direction()).write_with(ticket.half(), f)
    }

    /// Read whichever half of `direction` is published as active right now.
    pub fn read_half<R>(
        &self,
        direction: Direction,
        controller: &HandoffController,
        f: impl FnOnce(&[Sample; FRAME]) -> R,
    ) -> Option<R> {
        self.buffer(direction)
            .read_with(controller.active_half(direction), f)
    }

    /// Write whichever half of `direction` is published as active right now.
    pub fn write_half<R>(
        &self,
        direction: Direction,
        controller: &HandoffController,
        f: impl FnOnce(&mut [Sample; FRAME]) -> R,
    ) -> Option<R> {
        self.buffer(direction)
            .write_with(controller.active_half(direction), f)
    }
}

impl<const FRAME: usize> Default for FrameBufferPair<FRAME> {
    fn default() -> Self {
        Self::new()
    }
}
