//! # Blocking Delays
//!
//! The DELAY instruction and the panel reset sequence are the only places
//! that wait. They block the calling thread and cannot be interrupted.

use std::thread;
use std::time::Duration;

/// Millisecond delay provider
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
