//! Mutex ensuring that access to variables shared with the radio IRQ is
//! mutually exclusive.
//!
//! This mutex requires proof of disabled radio IRQs provided by the
//! [`CriticalSection`] token handed out by
//! [`crit_sect::locked`](crate::crit_sect::locked).

use crate::crit_sect::CriticalSection;
use core::cell::{Ref, RefCell, RefMut};

// TODO create Mutexes for specific IRQs instead of requiring all of them masked
/// Wraps a variable which is accessible from an IRQ
pub struct Mutex<T>(RefCell<T>);

impl<T> Mutex<T> {
    /// Creates new wrapper for a variable accessible from an IRQ
    ///
    /// # Example
    ///
    /// ```
    /// use rf2xx_radio::mutex::Mutex;
    ///
    /// static RX_PENDING: Mutex<bool> = Mutex::new(false);
    /// ```
    pub const fn new(value: T) -> Mutex<T> {
        Self(RefCell::new(value))
    }

    /// Borrows Mutex's internal variable with mutually exclusive access
    ///
    /// # Example
    ///
    /// ```no_run
    /// # #[macro_use] extern crate rf2xx_radio;
    /// # missing_test_fns!();
    /// # fn main() {
    /// use rf2xx_radio::crit_sect;
    /// use rf2xx_radio::mutex::Mutex;
    ///
    /// static IRQ_READ_ONLY_DATA: Mutex<u32> = Mutex::new(15);
    ///
    /// crit_sect::locked(|cs_token| {
    ///   assert_eq!(*IRQ_READ_ONLY_DATA.borrow(cs_token), 15);
    /// });
    /// # }
    /// ```
    pub fn borrow<'cs>(&'cs self, _cs: &'cs CriticalSection) -> Ref<'cs, T> {
        self.0.borrow()
    }

    /// Mutably borrows Mutex's internal variable with mutually exclusive access
    ///
    /// # Example
    ///
    /// ```no_run
    /// # #[macro_use] extern crate rf2xx_radio;
    /// # missing_test_fns!();
    /// # fn main() {
    /// use rf2xx_radio::crit_sect;
    /// use rf2xx_radio::mutex::Mutex;
    ///
    /// static RX_PENDING: Mutex<bool> = Mutex::new(false);
    ///
    /// crit_sect::locked(|cs_token| {
    ///   *RX_PENDING.borrow_mut(cs_token) = true;
    /// });
    /// # }
    /// ```
    pub fn borrow_mut<'cs>(&'cs self, _cs: &'cs CriticalSection) -> RefMut<'cs, T> {
        self.0.borrow_mut()
    }
}

// Safety: Mutex is Sync assuming the contained type is Send and the
// crit_sect module prevents concurrent access to Mutex from multiple
// contexts. This assumption is verified run-time by the RefCell inside the
// mutex.
unsafe impl<T> Sync for Mutex<T> where T: Send {}
