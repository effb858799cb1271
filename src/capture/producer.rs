//! Background frame producer.
//!
//! Frames are delivered on a dedicated thread at a fixed cadence, never on
//! the caller's context. The loop body decides whether to keep going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Returned by a producer tick to control the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Handle to a running producer thread.
pub struct FrameProducer {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl FrameProducer {
    /// Starts a producer that calls `tick` once per `interval`.
    pub fn start<F>(name: &str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Tick + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_signal);
        let thread_name = name.to_string();

        info!(name = %name, interval_ms = interval.as_millis() as u64, "Starting frame producer");

        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut next = Instant::now();
                loop {
                    if thread_stop.load(Ordering::SeqCst) {
                        debug!(name = %thread_name, "Stop signal received");
                        break;
                    }

                    if tick() == Tick::Stop {
                        debug!(name = %thread_name, "Producer requested stop");
                        break;
                    }

                    next += interval;
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    } else {
                        // Running behind: skip ahead instead of bursting.
                        next = now;
                    }
                }
                info!(name = %thread_name, "Frame producer exiting");
            });

        let thread_handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to spawn frame producer");
                None
            }
        };

        Self {
            thread_handle,
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Returns true while the producer thread is alive.
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signals the loop to stop without waiting.
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting producer stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stops the loop and waits for the thread to finish.
    pub fn stop(mut self) {
        self.request_stop();
        if let Some(handle) = self.thread_handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!(name = %self.name, "Frame producer thread panicked");
            }
        }
    }
}

impl Drop for FrameProducer {
    fn drop(&mut self) {
        // Never join here: the last owner may be the producer thread itself.
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_producer_ticks_until_stopped() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);

        let producer = FrameProducer::start("test-producer", Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Tick::Continue
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while ticks.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        producer.stop();

        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 3);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn test_tick_can_stop_loop() {
        let producer = FrameProducer::start("one-shot", Duration::from_millis(1), || Tick::Stop);

        let deadline = Instant::now() + Duration::from_secs(5);
        while producer.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!producer.is_running());
    }
}
