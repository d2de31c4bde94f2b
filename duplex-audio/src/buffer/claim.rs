//! Exclusive access to one buffer half.
//!
//! Every [`FrameBuffer`](super::FrameBuffer) carries one flag per half.
//! Software takes the flag for the duration of a
//! [`read_with`](super::FrameBuffer::read_with) or
//! [`write_with`](super::FrameBuffer::write_with) closure, and a software
//! transfer engine takes it for every sample it moves. Whoever finds the flag
//! already set backs off, so the two sides never alias the same half.

use core::sync::atomic::{AtomicBool, Ordering};

/// A held half. Released on drop.
#[derive(Debug)]
#[must_use = "the half is released as soon as the claim is dropped"]
pub struct HalfClaim<'a> {
    /// `None` for regions built without claim flags.
    flag: Option<&'a AtomicBool>,
}

impl<'a> HalfClaim<'a> {
    /// Take `flag`, or `None` if someone else holds it.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| HalfClaim { flag: Some(flag) })
    }

    /// A claim over memory that has no flag to take.
    pub(crate) const fn unguarded() -> Self {
        HalfClaim { flag: None }
    }
}

impl Drop for HalfClaim<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag {
            flag.store(false, Ordering::Release);
        }
    }
}
