//! Hardware access layer contract consumed by the driver core
//!
//! The platform provides register, FIFO and pin access to the transceiver;
//! the driver core never opens the bus itself. Each port of the driver
//! implements [`RadioBus`] on top of its SPI (or memory-mapped) transport.
//! Unit tests use the generated `MockRadioBus` instead of hardware.
//!
//! Implementations do not need to be reentrant. The driver guarantees that
//! task-level access which could race the interrupt handler happens inside
//! a critical section, and that the interrupt handler leaves the bus alone
//! whenever a task might be in the middle of a transition.

use crate::radio::Context;

#[cfg(test)]
use mockall::*;

/// Completion callback of an asynchronous FIFO transfer
///
/// Called from the bus implementation's transfer-done context with the
/// reference that was registered together with it.
pub type TransferDone = fn(Context);

/// Radio interrupt entry point registered with [`RadioBus::irq_configure`]
///
/// Called once per unmasked transceiver interrupt, in interrupt context,
/// with the reference that was registered together with it.
pub type IrqHandler = fn(Context);

/// Access to an RF2XX-class transceiver chip
///
/// Register access is synchronous and byte-addressed. Frame FIFO access is
/// split into the leading length byte and the remaining bytes, matching the
/// chip's frame-buffer protocol.
#[cfg_attr(test, automock)]
pub trait RadioBus: Send + Sync {
    /// Reads a configuration or status register
    fn reg_read(&self, reg: u8) -> u8;

    /// Writes a configuration register
    fn reg_write(&self, reg: u8, value: u8);

    /// Reads the frame length byte, starting a FIFO read access
    fn fifo_read_first(&self) -> u8;

    /// Reads frame bytes following [`fifo_read_first`](RadioBus::fifo_read_first)
    /// and ends the FIFO access
    ///
    /// Passing an empty buffer ends the access without transferring payload
    /// bytes, leaving the FIFO consistent for the next frame.
    fn fifo_read_remaining(&self, buf: &mut [u8]);

    /// Writes the frame length byte, starting a FIFO write access
    fn fifo_write_first(&self, len: u8);

    /// Writes frame bytes following [`fifo_write_first`](RadioBus::fifo_write_first)
    /// and ends the FIFO access
    fn fifo_write_remaining(&self, data: &[u8]);

    /// Like [`fifo_write_remaining`](RadioBus::fifo_write_remaining), but
    /// returns while the transfer may still be in flight
    ///
    /// `on_done` is invoked when the transfer completes. Implementations
    /// that cannot keep `data` borrowed past the call must copy it before
    /// returning.
    fn fifo_write_remaining_async(&self, data: &[u8], on_done: Option<(TransferDone, Context)>);

    /// Aborts any FIFO access in flight
    fn fifo_access_cancel(&self);

    /// Reads the transceiver status field of `TRX_STATUS`, already masked
    fn get_status(&self) -> u8;

    /// Hardware-resets the transceiver chip
    fn reset(&self);

    /// Unmasks the transceiver interrupt line
    fn irq_enable(&self);

    /// Masks the transceiver interrupt line
    fn irq_disable(&self);

    /// Registers the handler called on every unmasked transceiver interrupt
    fn irq_configure(&self, handler: IrqHandler, context: Context);

    /// Raises the SLP_TR pin, strobing the start of a transmission
    fn slp_tr_set(&self);

    /// Clears the SLP_TR pin
    fn slp_tr_clear(&self);

    /// Whether this board routes an external power amplifier
    fn has_pa(&self) -> bool;

    /// Powers the external amplifier up
    fn pa_enable(&self);

    /// Powers the external amplifier down
    fn pa_disable(&self);

    /// Whether this board uses the DIG2 timestamping pin
    fn has_dig2(&self) -> bool;

    /// Disables the DIG2 pin output
    fn dig2_disable(&self);
}
