use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::frame::VsyncSignal;

/// Background thread standing in for the vertical blank interrupt.
///
/// Notifies a [`VsyncSignal`] at a fixed rate until dropped.
pub(crate) struct VblankTicker {
    hz: u32,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VblankTicker {
    pub(crate) fn spawn(signal: VsyncSignal, hz: u32) -> std::io::Result<Self> {
        let hz = hz.max(1);
        let period = Duration::from_secs_f64(1.0 / f64::from(hz));
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("nabu-vblank".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while !flag.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    signal.notify();

                    next += period;
                    // Fell behind (suspended, debugger): resync instead of bursting.
                    let now = Instant::now();
                    if next < now {
                        next = now + period;
                    }
                }
            })?;

        log::debug!("vblank ticker at {hz} Hz");
        Ok(Self { hz, stop, handle: Some(handle) })
    }

    pub(crate) fn hz(&self) -> u32 {
        self.hz
    }
}

impl Drop for VblankTicker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                log::warn!("vblank ticker panicked");
            }
        }
    }
}
