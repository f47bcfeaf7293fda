//! Portable time source abstraction
//!
//! The driver busy-waits with a real-time deadline while the transceiver
//! ramps up to its ready state. The time source backing that deadline is
//! injected through the [`Timer`] trait, so hardware ports can use any
//! free-running timer and unit tests can simulate time without delay.

#[cfg(test)]
use mockall::*;

/// Time expressed in microseconds, wrapping around at the type boundary
pub type Timestamp = u32;

/// Defines functions required from any module providing current time
///
/// Implementations are expected to read a free-running hardware timer, or a
/// lower level feature like an operating system clock.
#[cfg_attr(test, automock)]
pub trait Timer: Send + Sync {
    /// Gets current time
    fn now(&self) -> Timestamp;

    /// Checks if the passed `timestamp` is in the past
    fn was_timestamp_in_past(&self, timestamp: Timestamp) -> bool {
        let one_tick_ago = self.now().wrapping_sub(1);
        one_tick_ago.wrapping_sub(timestamp) < Timestamp::MAX / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTimer(Timestamp);

    impl Timer for FixedTimer {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn test_current_time_is_not_in_past() {
        let timer = FixedTimer(1000);
        assert!(!timer.was_timestamp_in_past(1000));
    }

    #[test]
    fn test_earlier_timestamp_is_in_past() {
        let timer = FixedTimer(1000);
        assert!(timer.was_timestamp_in_past(999));
        assert!(timer.was_timestamp_in_past(1));
    }

    #[test]
    fn test_future_timestamp_is_not_in_past() {
        let timer = FixedTimer(1000);
        assert!(!timer.was_timestamp_in_past(1001));
        assert!(!timer.was_timestamp_in_past(1000 + 500_000));
    }

    #[test]
    fn test_wrapping_deadline_is_handled() {
        let timer = FixedTimer(5);
        let before_wrap = Timestamp::MAX - 10;
        assert!(timer.was_timestamp_in_past(before_wrap));

        let timer = FixedTimer(Timestamp::MAX - 10);
        assert!(!timer.was_timestamp_in_past(5));
    }
}
