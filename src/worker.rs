//! Cooperative receive hand-off
//!
//! The interrupt handler must not drain the frame FIFO itself: the transfer
//! is long and shares the bus with task code. Instead it raises a
//! [`WorkSignal`] and returns. The platform's main loop polls an
//! [`RxWorker`] from task context; when the signal is raised the worker
//! claims the pending frame, drains it and hands the payload to the upper
//! layer through a data-input callback.

use crate::driver::RadioDriver;
use crate::hw::bus::RadioBus;
use crate::hw::timer::Timer;
use crate::radio::{Context, Rf2xx, MAX_PAYLOAD};
use core::sync::atomic::{AtomicBool, Ordering};

/// One-slot wake flag connecting an interrupt handler to a task
///
/// Raising an already-raised signal coalesces; the worker drains every
/// pending frame it can claim on the next poll either way.
///
/// # Example
///
/// ```
/// use rf2xx_radio::worker::WorkSignal;
///
/// let signal = WorkSignal::new();
/// assert!(!signal.take());
///
/// signal.raise();
/// assert!(signal.take());
/// assert!(!signal.take());
/// ```
pub struct WorkSignal {
    pending: AtomicBool,
}

impl WorkSignal {
    /// Creates a lowered signal
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Raises the signal; safe to call from interrupt context
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Lowers the signal, reporting whether it was raised
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }
}

impl Default for WorkSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Called with the payload of every frame the worker delivers upward
pub type InputCallback = fn(payload: &[u8], context: Context);

/// Receive task scheduled cooperatively by the platform's main loop
///
/// A single worker serves a single driver instance. It never runs
/// concurrently with other task code, only interleaved with the interrupt
/// handler, and it shares the claim protocol with
/// [`read`](crate::driver::RadioDriver::read): whichever claims the pending
/// frame first drains it, the other sees nothing.
pub struct RxWorker<'d, B: RadioBus, T: Timer> {
    driver: &'d Rf2xx<B, T>,
    input: InputCallback,
    context: Context,
}

impl<'d, B, T> RxWorker<'d, B, T>
where
    B: RadioBus + 'static,
    T: Timer + 'static,
{
    /// Creates a worker delivering `driver`'s received frames to `input`
    ///
    /// The `context` reference is passed back verbatim on every delivery.
    pub fn new(driver: &'d Rf2xx<B, T>, input: InputCallback, context: Context) -> Self {
        Self {
            driver,
            input,
            context,
        }
    }

    /// Runs the worker once
    ///
    /// Returns immediately when the driver's signal is not raised. When it
    /// is, claims and drains the pending frame and, if a valid payload came
    /// out, invokes the input callback with it. Call from task context
    /// only.
    pub fn poll(&self) {
        if !self.driver.rx_signal().take() {
            return;
        }

        let mut buf = [0u8; MAX_PAYLOAD];
        let len = self.driver.read(&mut buf);

        if len > 0 {
            (self.input)(&buf[..len], self.context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::bus::MockRadioBus;
    use crate::hw::regs;
    use crate::hw::timer::MockTimer;
    use std::sync::atomic::AtomicUsize;

    fn rx_ready_bus() -> MockRadioBus {
        let mut bus = MockRadioBus::new();
        bus.expect_has_pa().return_const(false);
        bus.expect_irq_enable().return_const(());
        bus.expect_irq_disable().return_const(());
        bus.expect_fifo_access_cancel().return_const(());
        bus.expect_slp_tr_clear().return_const(());
        bus.expect_reg_write().return_const(());
        bus
    }

    #[test]
    fn test_poll_without_signal_does_nothing() {
        static mut INPUT_CALLED: bool = false;

        fn input(_payload: &[u8], _context: Context) {
            unsafe { INPUT_CALLED = true };
        }

        let driver = Rf2xx::new(MockRadioBus::new(), MockTimer::new());
        let worker = RxWorker::new(&driver, input, &None::<u8>);

        worker.poll();

        assert!(!unsafe { INPUT_CALLED });
    }

    #[test]
    fn test_poll_delivers_pending_frame_upward() {
        static mut RECEIVED: Option<Vec<u8>> = None;

        fn input(payload: &[u8], context: Context) {
            assert_eq!(context.downcast_ref::<Option<u8>>(), Some(&None::<u8>));
            unsafe { RECEIVED = Some(payload.to_vec()) };
        }

        let mut bus = rx_ready_bus();

        static IRQ_READS: AtomicUsize = AtomicUsize::new(0);
        bus.expect_reg_read().returning(|reg| match reg {
            regs::IRQ_STATUS => match IRQ_READS.fetch_add(1, Ordering::SeqCst) {
                0 => 0,
                1 => regs::irq_status::RX_START,
                _ => regs::irq_status::TRX_END,
            },
            regs::PHY_RSSI => regs::phy_rssi::RX_CRC_VALID,
            _ => 0,
        });
        bus.expect_fifo_read_first().returning(|| 5 + 2);
        bus.expect_fifo_read_remaining().returning(|buf| {
            buf.copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x42]);
        });

        let mut timer = MockTimer::new();
        timer.expect_now().return_const(0u32);
        let driver = Rf2xx::new(bus, timer);

        driver.on();
        driver.irq_handler(); // RX_START
        driver.irq_handler(); // TRX_END, raises the signal

        let worker = RxWorker::new(&driver, input, &None::<u8>);
        worker.poll();

        assert_eq!(
            unsafe { RECEIVED.take() },
            Some(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x42])
        );

        // The signal was consumed; polling again delivers nothing.
        worker.poll();
        assert!(unsafe { RECEIVED.take() }.is_none());
    }

    #[test]
    fn test_dropped_frame_is_not_delivered() {
        static mut INPUT_CALLED: bool = false;

        fn input(_payload: &[u8], _context: Context) {
            unsafe { INPUT_CALLED = true };
        }

        let mut bus = rx_ready_bus();

        static IRQ_READS: AtomicUsize = AtomicUsize::new(0);
        bus.expect_reg_read().returning(|reg| match reg {
            regs::IRQ_STATUS => match IRQ_READS.fetch_add(1, Ordering::SeqCst) {
                0 => 0,
                1 => regs::irq_status::RX_START,
                _ => regs::irq_status::TRX_END,
            },
            regs::PHY_RSSI => 0, // crc invalid, frame dropped
            _ => 0,
        });

        let mut timer = MockTimer::new();
        timer.expect_now().return_const(0u32);
        let driver = Rf2xx::new(bus, timer);

        driver.on();
        driver.irq_handler();
        driver.irq_handler();

        let worker = RxWorker::new(&driver, input, &None::<u8>);
        worker.poll();

        assert!(!unsafe { INPUT_CALLED });
    }

    #[test]
    fn test_direct_read_wins_the_claim_over_the_worker() {
        static mut INPUT_CALLED: bool = false;

        fn input(_payload: &[u8], _context: Context) {
            unsafe { INPUT_CALLED = true };
        }

        let mut bus = rx_ready_bus();

        static IRQ_READS: AtomicUsize = AtomicUsize::new(0);
        bus.expect_reg_read().returning(|reg| match reg {
            regs::IRQ_STATUS => match IRQ_READS.fetch_add(1, Ordering::SeqCst) {
                0 => 0,
                1 => regs::irq_status::RX_START,
                _ => regs::irq_status::TRX_END,
            },
            regs::PHY_RSSI => regs::phy_rssi::RX_CRC_VALID,
            _ => 0,
        });
        bus.expect_fifo_read_first().returning(|| 3 + 2);
        bus.expect_fifo_read_remaining().returning(|buf| {
            buf.copy_from_slice(&[1, 2, 3]);
        });

        let mut timer = MockTimer::new();
        timer.expect_now().return_const(0u32);
        let driver = Rf2xx::new(bus, timer);

        driver.on();
        driver.irq_handler();
        driver.irq_handler();

        // The upper layer reads the frame before the worker gets polled.
        let mut buf = [0u8; MAX_PAYLOAD];
        assert_eq!(driver.read(&mut buf), 3);

        // The worker wakes up but the frame is gone.
        let worker = RxWorker::new(&driver, input, &None::<u8>);
        worker.poll();

        assert!(!unsafe { INPUT_CALLED });
    }
}
