/// Errors reported by radio software
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// The payload does not fit in the transmit staging buffer
    PayloadTooLarge,
    /// The length passed to transmit differs from the most recent prepare
    LengthMismatch,
    /// The radio is busy with a reception; the caller may retry later
    Collision,
    /// The hardware did not become ready in time, or the transmission did
    /// not complete
    TxFailure,
    /// The channel number is out of range for IEEE 802.15.4
    InvalidChannel,
    /// The module is busy with an ongoing operation
    WouldBlock,
}
