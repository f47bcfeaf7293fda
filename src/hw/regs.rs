//! Register map subset of AT86RF231-class transceivers
//!
//! Only the registers and bits the driver core actually touches are listed.
//! Addresses and bit positions follow the AT86RF231 datasheet; RF2XX
//! variants with an external power amplifier share the same layout.

/// Transceiver status register (read-only)
pub const TRX_STATUS: u8 = 0x01;
/// Transceiver state-transition command register
pub const TRX_STATE: u8 = 0x02;
/// Pad drive strength and CLKM control
pub const TRX_CTRL_0: u8 = 0x03;
/// Front-end control, including the external PA enable bit
pub const TRX_CTRL_1: u8 = 0x04;
/// Transmit power and PA ramping
pub const PHY_TX_PWR: u8 = 0x05;
/// RSSI, plus the CRC validity flag of the frame last received
pub const PHY_RSSI: u8 = 0x06;
/// Channel selection, CCA mode and CCA request
pub const PHY_CC_CCA: u8 = 0x08;
/// Data-rate selection and frame-buffer protection
pub const TRX_CTRL_2: u8 = 0x0C;
/// Interrupt enable mask
pub const IRQ_MASK: u8 = 0x0E;
/// Latched interrupt causes; reading clears the latch
pub const IRQ_STATUS: u8 = 0x0F;
/// Crystal oscillator setup
pub const XOSC_CTRL: u8 = 0x12;

/// Bits of [`TRX_STATUS`]
pub mod trx_status {
    /// A requested clear-channel assessment has finished
    pub const CCA_DONE: u8 = 0x80;
    /// Result of the last assessment; set means the channel is idle
    pub const CCA_STATUS: u8 = 0x40;
    /// Status value: PLL locked, transceiver idle and ready to transmit
    pub const PLL_ON: u8 = 0x09;
    /// Status value: a reception is in progress
    pub const BUSY_RX: u8 = 0x01;
    /// Status value: a state transition has not settled yet
    pub const STATE_TRANSITION_IN_PROGRESS: u8 = 0x1F;
}

/// Commands written to [`TRX_STATE`]
pub mod trx_cmd {
    /// Leave any receive or transmit activity immediately
    pub const FORCE_PLL_ON: u8 = 0x04;
    /// Enter receive mode
    pub const RX_ON: u8 = 0x06;
    /// Enter the idle PLL-locked mode
    pub const PLL_ON: u8 = 0x09;
}

/// Bits of [`IRQ_STATUS`] and [`IRQ_MASK`]
pub mod irq_status {
    /// A frame preamble was detected; reception started
    pub const RX_START: u8 = 0x04;
    /// A frame transmission or reception completed
    pub const TRX_END: u8 = 0x08;
}

/// Bits of [`TRX_CTRL_0`]
pub mod trx_ctrl_0 {
    /// 2 mA drive on the digital output pads
    pub const PAD_IO_2MA: u8 = 0x00;
    /// 2 mA drive on the CLKM pad
    pub const PAD_IO_CLKM_2MA: u8 = 0x10;
    /// Switch CLKM state only on a zero crossing
    pub const CLKM_SHA_SEL: u8 = 0x08;
    /// Disable the CLKM output
    pub const CLKM_CTRL_OFF: u8 = 0x00;
}

/// Bits of [`TRX_CTRL_1`]
pub mod trx_ctrl_1 {
    /// Drive the DIG3/DIG4 pins to steer an external power amplifier
    pub const PA_EXT_EN: u8 = 0x80;
}

/// Bits of [`TRX_CTRL_2`]
pub mod trx_ctrl_2 {
    /// Dynamic frame-buffer protection: keep the received frame until read
    pub const RX_SAFE_MODE: u8 = 0x80;
}

/// Bits of [`PHY_TX_PWR`]
pub mod phy_tx_pwr {
    /// PA buffer lead time, datasheet default
    pub const PA_BUF_LT: u8 = 0xC0;
    /// PA lead time, datasheet default
    pub const PA_LT: u8 = 0x00;
    /// Output power +3 dBm
    pub const TX_PWR_3DBM: u8 = 0x00;
}

/// Bits of [`PHY_RSSI`]
pub mod phy_rssi {
    /// The CRC of the frame sitting in the frame buffer is valid
    pub const RX_CRC_VALID: u8 = 0x80;
}

/// Bits of [`PHY_CC_CCA`]
pub mod phy_cc_cca {
    /// Start a clear-channel assessment
    pub const CCA_REQUEST: u8 = 0x80;
    /// CCA mode 1: energy above threshold
    pub const CCA_MODE_ED: u8 = 0x20;
    /// Channel number field
    pub const CHANNEL_MASK: u8 = 0x1F;
}

/// Bits of [`XOSC_CTRL`]
pub mod xosc_ctrl {
    /// Internal oscillator with external crystal
    pub const XTAL_MODE_CRYSTAL: u8 = 0xF0;
}
