#![cfg_attr(not(any(test, doctest)), no_std)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! Link-level driver core for RF2XX (AT86RF231-class) IEEE 802.15.4
//! transceivers.
//!
//! The chip is half duplex and changes state asynchronously through its
//! interrupt line, while its registers and frame FIFO are reached over a
//! bus that is not reentrant. This crate owns the software state machine
//! coordinating both sides: the synchronous operations a network stack
//! calls ([`driver::RadioDriver`]), the interrupt handler advancing the
//! state machine, and the cooperative worker draining received frames
//! ([`worker::RxWorker`]).
//!
//! The register and FIFO access primitives are not implemented here. They
//! are consumed through the [`hw::bus::RadioBus`] trait, so the core runs
//! against any hardware access layer, including mocks in host unit tests.

// This module must go first so the other modules see its macros.
mod fmt;

pub mod crit_sect; // Temporary pub, to support sharing the critical section with platform glue
pub mod mutex;

/// Defines errors reported by this crate
pub mod error;

/// Contracts consumed from the platform: bus access, registers, time source
pub mod hw;

/// Operation set the upper network layer calls on any radio driver
pub mod driver;

/// RF2XX driver core: state machine, transmit path, receive hand-off
///
/// To use this module create an instance of [`Rf2xx`](radio::Rf2xx) and use
/// methods of the created instance.
pub mod radio;

/// Receive worker scheduled cooperatively and woken from the interrupt handler
pub mod worker;
