//! Emulation thread handle
//!
//! Owns the producer thread and its stop flag. Stopping is cooperative and
//! observed at frame boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::{EmulationCore, EmulationProducer, ProducerExit};
use crate::error::PipelineError;

/// Shared cooperative stop flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear a previous stop request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What the producer thread hands back when it finishes.
#[derive(Debug)]
pub struct ProducerReport<C> {
    pub exit: ProducerExit,
    pub frames: u64,
    /// The core, unless the thread panicked.
    pub core: Option<C>,
}

/// Handle to the emulation thread
///
/// Dropping the handle requests a stop and waits for the thread.
pub struct ProducerHandle<C: EmulationCore> {
    stop: StopToken,
    handle: Option<JoinHandle<ProducerReport<C>>>,
}

impl<C: EmulationCore + 'static> ProducerHandle<C> {
    /// Start `producer` on a thread named `emulation`.
    pub fn spawn(
        mut producer: EmulationProducer<C>,
        stop: StopToken,
    ) -> Result<Self, PipelineError> {
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("emulation".into())
            .spawn(move || {
                let exit = producer.run(&thread_stop);
                debug!("Emulation thread exiting: {:?}", exit);
                let frames = producer.frames();
                ProducerReport {
                    exit,
                    frames,
                    core: Some(producer.into_core()),
                }
            })
            .map_err(|source| PipelineError::Spawn {
                name: "emulation",
                source,
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl<C: EmulationCore> ProducerHandle<C> {
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Ask the loop to end at the next frame boundary.
    pub fn request_stop(&self) {
        self.stop.stop();
    }

    /// Check if the emulation thread is still running
    pub fn is_alive(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the thread to finish on its own.
    pub fn join(mut self) -> ProducerReport<C> {
        match self.handle.take() {
            Some(handle) => join_report(handle),
            None => ProducerReport {
                exit: ProducerExit::Stopped,
                frames: 0,
                core: None,
            },
        }
    }

    /// Request a stop, then wait.
    pub fn stop(self) -> ProducerReport<C> {
        self.request_stop();
        self.join()
    }
}

fn join_report<C>(handle: JoinHandle<ProducerReport<C>>) -> ProducerReport<C> {
    handle.join().unwrap_or_else(|_| {
        warn!("Emulation thread panicked");
        ProducerReport {
            exit: ProducerExit::Panicked,
            frames: 0,
            core: None,
        }
    })
}

impl<C: EmulationCore> Drop for ProducerHandle<C> {
    fn drop(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
