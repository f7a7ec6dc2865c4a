//! Structured console logging with box-drawing decoration.
//!
//! Every line goes through [`write_output`], which prints to stdout or, while a
//! [`LoggerGuard`] from [`Log::start_file_logging`] is alive, hands the line to a background
//! writer thread with ANSI colour codes stripped.
//!
//! ## Conventions
//!
//! - `log_version!` opens the output with `┏ daybreak vX.Y.Z ━━╸`.
//! - `log_block_start!` begins a new block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues the current block with `┣ message`.
//! - `log_indented!` prints nested details as `┃   message`.
//! - `log_pipe!` inserts a bare `┃` spacer, usually before a levelled message.
//! - `log_info!`, `log_warning!`, `log_error!` and `log_debug!` print `┣[LEVEL] message`.
//! - `log_error_exit!` closes the output with `┗[ERROR] message`; `log_end!` closes it with `╹`.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Sender for the file writer thread while --log is active.
static LOG_CHANNEL: Mutex<Option<Sender<LogMessage>>> = Mutex::new(None);

enum LogMessage {
    Line(String),
    Shutdown,
}

/// Runtime switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all logging output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Run `f` with logging disabled, then restore the previous setting.
    ///
    /// Used by machine-readable output such as `status --json`, where stray log lines would
    /// corrupt stdout.
    pub fn quiet<T>(f: impl FnOnce() -> T) -> T {
        let was_enabled = LOGGING_ENABLED.swap(false, Ordering::SeqCst);
        let result = f();
        Self::set_enabled(was_enabled);
        result
    }

    /// Route all log output to `file_path` until the returned guard is dropped.
    pub fn start_file_logging(file_path: &str) -> anyhow::Result<LoggerGuard> {
        let mut file = std::fs::File::create(file_path)
            .map_err(|e| anyhow::anyhow!("Failed to create log file {file_path}: {e}"))?;

        let mut slot = LOG_CHANNEL.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            anyhow::bail!("File logging is already active");
        }

        let (tx, rx) = channel();
        let handle = std::thread::Builder::new()
            .name("daybreak-log".into())
            .spawn(move || {
                while let Ok(LogMessage::Line(text)) = rx.recv() {
                    file.write_all(text.as_bytes())?;
                }
                file.flush()?;
                Ok::<(), std::io::Error>(())
            })?;
        *slot = Some(tx.clone());

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }
}

/// Keeps file logging active. Dropping it flushes and closes the file.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<std::io::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        LOG_CHANNEL
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` colour sequences.
pub(crate) fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write one formatted chunk to the active sink. Used by the macros.
pub fn write_output(text: &str) {
    let slot = LOG_CHANNEL.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(tx) = slot.as_ref() {
        let _ = tx.send(LogMessage::Line(strip_ansi_codes(text)));
    } else {
        drop(slot);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($template:literal, $($arg:tt)+) => {{
        if $crate::common::logger::Log::is_enabled() {
            let message = format!($($arg)+);
            $crate::common::logger::write_output(&format!($template, message = message));
        }
    }};
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => { $crate::__log_line!("┣ {message}\n", $($arg)+) };
}

/// Nested detail line: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_line!("┃   {message}\n", $($arg)+) };
}

/// Empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => { $crate::__log_line!("┃{message}\n", "") };
}

/// Start a new block of related lines.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_line!("┃\n┣ {message}\n", $($arg)+) };
}

/// Application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!("┏ daybreak v{message} ━━╸\n", "{}", env!("CARGO_PKG_VERSION"))
    };
}

/// Final marker.
#[macro_export]
macro_rules! log_end {
    () => { $crate::__log_line!("╹{message}\n", "") };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_line!("┣[\x1b[32mINFO\x1b[0m] {message}\n", $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_line!("┣[\x1b[32mDEBUG\x1b[0m] {message}\n", $($arg)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log_line!("┣[\x1b[33mWARNING\x1b[0m] {message}\n", $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_line!("┣[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)+) };
}

/// Terminating error: a spacer, then `┗[ERROR] message`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => { $crate::__log_line!("┃\n┗[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)+) };
}

/// Warning outside the box-drawing flow, for output before the header is printed.
#[macro_export]
macro_rules! log_warning_standalone {
    ($($arg:tt)+) => { $crate::__log_line!("[\x1b[33mWARNING\x1b[0m] {message}\n", $($arg)+) };
}
