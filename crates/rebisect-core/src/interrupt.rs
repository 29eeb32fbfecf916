//! Process-wide user interrupt flag.
//!
//! A probe shells out to git, and the terminal delivers SIGINT to git and
//! to us alike. Instead of dying with a rebase half applied, the handler
//! only records the interrupt; the probe notices it, aborts the rebase and
//! returns [`crate::Error::Interrupted`].

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Whether an interrupt has arrived since startup (or the last [`reset`]).
#[must_use]
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Record an interrupt as if SIGINT had been received.
pub fn trigger() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Clear the interrupt flag.
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn on_interrupt(_sig: libc::c_int) {
    // Atomic stores are async-signal-safe.
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler. Call once at startup.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn install_handler() {
    let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: `on_interrupt` only touches an atomic.
    unsafe {
        libc::signal(libc::SIGINT, handler);
    }
    tracing::debug!("installed SIGINT handler");
}

/// Install the SIGINT handler. No-op on this platform.
#[cfg(not(unix))]
pub fn install_handler() {}
