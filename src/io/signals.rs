//! Unix signal handling.
//!
//! SIGINT, SIGTERM and SIGHUP all request shutdown: the handler thread records the signal and
//! cancels the scheduler's token, which wakes any wait in progress.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};
use std::{
    sync::{Arc, Mutex, PoisonError},
    thread,
};

use crate::time::CancellationToken;

/// Signal handling state shared with the handler thread
pub struct SignalState {
    /// Signal that stopped the application, if any
    received: Arc<Mutex<Option<i32>>>,
    handle: Handle,
    thread: Option<thread::JoinHandle<()>>,
}

impl SignalState {
    /// Signal number that requested shutdown.
    pub fn received_signal(&self) -> Option<i32> {
        *self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SignalState {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "signal",
    }
}

/// Install handlers that cancel `cancel` on the first shutdown signal.
pub fn setup_signal_handler(cancel: CancellationToken, debug_enabled: bool) -> Result<SignalState> {
    let received = Arc::new(Mutex::new(None));

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;
    let handle = signals.handle();

    let received_clone = received.clone();

    let thread = thread::Builder::new()
        .name("daybreak-signals".into())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                if debug_enabled {
                    log_pipe!();
                    log_debug!("Received {}, shutting down", signal_name(sig));
                }
                *received_clone.lock().unwrap_or_else(PoisonError::into_inner) = Some(sig);
                cancel.cancel();
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState {
        received,
        handle,
        thread: Some(thread),
    })
}
