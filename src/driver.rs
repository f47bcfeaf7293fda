//! Operation set exposed to the upper network layer
//!
//! A network stack drives the radio only through [`RadioDriver`], keeping
//! it independent of the transceiver behind it. The driver owns the radio
//! exclusively for the whole lifetime of each operation; none of the
//! methods yield to a scheduler.

use crate::error::Error;

/// Link-level radio driver contract
///
/// Implemented by [`Rf2xx`](crate::radio::Rf2xx) and consumed
/// polymorphically by the layer above. Results are plain values: errors the
/// caller can act on are variants of [`Error`], receive-path anomalies
/// (bad CRC, oversized frame) are indistinguishable from "no packet
/// available" on purpose.
pub trait RadioDriver {
    /// Initializes the driver and the transceiver
    ///
    /// Leaves the radio reset, configured and idle, with the interrupt
    /// handler registered. Must be called once before any other operation.
    fn init(&'static self);

    /// Turns the radio on
    ///
    /// Idempotent. Records the power intent and, when the radio is idle,
    /// starts listening. After any transmit or read completes the driver
    /// returns to listening as long as the radio is on.
    ///
    /// Always succeeds and returns `true`.
    fn on(&self) -> bool;

    /// Turns the radio off
    ///
    /// Idempotent. Clears the power intent and, when the radio is
    /// listening, drives it back to idle. Always succeeds and returns
    /// `true`.
    fn off(&self) -> bool;

    /// Stages `payload` for a subsequent [`transmit`](RadioDriver::transmit)
    ///
    /// The staged payload stays valid until the next `prepare`. Fails with
    /// [`Error::PayloadTooLarge`] when `payload` exceeds the maximum frame
    /// payload, in which case any previously staged payload is invalidated
    /// as well.
    fn prepare(&self, payload: &[u8]) -> Result<(), Error>;

    /// Transmits the payload staged by the latest [`prepare`](RadioDriver::prepare)
    ///
    /// `len` must equal the staged payload length, otherwise
    /// [`Error::LengthMismatch`] is returned without touching the hardware.
    /// Fails with [`Error::Collision`] when a reception is in progress;
    /// the caller should retry later. Fails with [`Error::TxFailure`] when
    /// the transceiver does not reach its ready state within the transmit
    /// deadline or the transmission does not complete; the driver restarts
    /// itself first.
    ///
    /// Blocks, without yielding, until the hardware reports the end of the
    /// transmission.
    fn transmit(&self, len: usize) -> Result<(), Error>;

    /// Stages and transmits `payload` in one call
    ///
    /// Equivalent to `prepare` followed by `transmit`; a failed prepare
    /// short-circuits to [`Error::TxFailure`] without touching hardware.
    fn send(&self, payload: &[u8]) -> Result<(), Error>;

    /// Copies a pending received frame into `buf`
    ///
    /// Returns the payload length, or 0 when no frame is pending, its CRC
    /// is invalid, or it does not fit in `buf`. A dropped frame is removed
    /// from the hardware FIFO either way. Exactly one caller can claim each
    /// pending frame; concurrent calls and the receive worker race safely.
    fn read(&self, buf: &mut [u8]) -> usize;

    /// Performs a clear-channel assessment
    ///
    /// Only meaningful while listening. Returns `false` when the hardware
    /// reports activity, a reception is in progress, or the assessment is
    /// aborted by a reception starting mid-way; `true` when the channel is
    /// idle. Busy-waits for the hardware verdict.
    fn channel_clear(&self) -> bool;

    /// Whether a frame reception is in progress
    fn receiving_packet(&self) -> bool;

    /// Whether a received frame is waiting to be read
    fn pending_packet(&self) -> bool;
}
