//! Render callback slot and the vsync thread that fires it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::producer::StopToken;

type RenderCallback = Box<dyn FnMut() + Send>;

/// The single per-refresh callback slot a platform exposes.
///
/// `fire` holds the slot lock while the callback runs, so `uninstall`
/// returns only once no invocation is in flight.
#[derive(Default)]
pub struct RenderCallbackSlot {
    callback: Mutex<Option<RenderCallback>>,
    fired: AtomicU64,
}

impl RenderCallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any previous one.
    ///
    /// Returns true if a callback was replaced.
    pub fn install<F>(&self, callback: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        let replaced = self.lock().replace(Box::new(callback)).is_some();
        if replaced {
            warn!("Render callback replaced while installed");
        }
        replaced
    }

    /// Remove the callback. Returns whether one was installed.
    pub fn uninstall(&self) -> bool {
        // Drop the callback outside the lock
        let previous = self.lock().take();
        previous.is_some()
    }

    pub fn is_installed(&self) -> bool {
        self.lock().is_some()
    }

    /// Invoke the callback if one is installed.
    pub fn fire(&self) -> bool {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(callback) => {
                callback();
                self.fired.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Total successful invocations.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Option<RenderCallback>> {
        self.callback.lock().unwrap_or_else(|e| {
            warn!("Render callback mutex poisoned, recovering");
            e.into_inner()
        })
    }
}

/// Fires a [`RenderCallbackSlot`] at a fixed refresh rate from its own thread.
pub struct VsyncDriver {
    stop: StopToken,
    handle: Option<JoinHandle<u64>>,
}

impl VsyncDriver {
    /// Start a thread named `vsync` firing `slot` `refresh_rate` times a second.
    pub fn start(slot: Arc<RenderCallbackSlot>, refresh_rate: u32) -> Result<Self, PipelineError> {
        let period = Duration::from_secs(1) / refresh_rate.max(1);
        let stop = StopToken::new();
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("vsync".into())
            .spawn(move || {
                debug!("Vsync thread started ({:?} period)", period);
                let mut refreshes = 0u64;
                let mut deadline = Instant::now();
                while !thread_stop.is_stopped() {
                    if slot.fire() {
                        refreshes += 1;
                    }
                    deadline += period;
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    } else {
                        // Missed one or more refreshes; don't try to catch up
                        deadline = now;
                    }
                }
                refreshes
            })
            .map_err(|source| PipelineError::Spawn {
                name: "vsync",
                source,
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the thread and return how many refreshes it delivered.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.stop.stop();
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                warn!("Vsync thread panicked");
                0
            }),
            None => 0,
        }
    }
}

impl Drop for VsyncDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
