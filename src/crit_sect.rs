//! Critical sections excluding the radio interrupt handler
//!
//! Task code and the radio interrupt handler share driver state. The
//! interrupt handler cannot block on a lock, so mutual exclusion is a true
//! interrupt mask: code inside [`locked`] runs with interrupts disabled and
//! receives a [`CriticalSection`] token proving it.

// TODO: Implement own mutex abstraction instead of relying on cortex_m blocking IRQs
//       It should block only IRQs which can enter this function

/// Proof of an entered critical section
///
/// Handed out by [`locked`]. APIs guarding data shared with the interrupt
/// handler (like [`Mutex`](crate::mutex::Mutex)) require a reference to this
/// token.
pub struct CriticalSection<'a> {
    _internal_cs: &'a cortex_m::interrupt::CriticalSection,
}

impl<'a> CriticalSection<'a> {
    fn new(internal_cs: &'a cortex_m::interrupt::CriticalSection) -> Self {
        Self {
            _internal_cs: internal_cs,
        }
    }
}

/// Runs `f` inside a critical section
///
/// Interrupts are masked for the duration of `f`. Keep the closure short:
/// everything the interrupt handler must react to is delayed until it
/// returns. Nesting is allowed.
pub fn locked<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    // TODO: instead of disabling all interrupts, disable only relevant
    cortex_m::interrupt::free(|cs| f(&CriticalSection::new(cs)))
}
