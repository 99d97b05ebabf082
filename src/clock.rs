//! Waiting between the steps of a ramp.

use fugit::MillisDurationU32;

/// Source of the delays used while a module settles.
pub trait Clock {
    /// Block for `duration`.
    fn sleep(&mut self, duration: MillisDurationU32);
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: MillisDurationU32) {
        std::thread::sleep(std::time::Duration::from_millis(duration.to_millis() as u64));
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sleep(&mut self, duration: MillisDurationU32) {
        (**self).sleep(duration)
    }
}
