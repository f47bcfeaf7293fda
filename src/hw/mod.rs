//! Contracts this driver consumes from the platform
//!
//! The driver core never touches hardware directly. Register and FIFO
//! access goes through the [`bus::RadioBus`] trait implemented by the
//! platform's hardware access layer, and every bounded wait reads an
//! injected [`timer::Timer`]. Unit tests substitute mocks for both.

pub mod bus;
pub mod regs;
pub mod timer;
