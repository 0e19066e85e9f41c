//! # Job Cancellation
//!
//! CUPS cancels a filter by sending it `SIGTERM`. The filter must then stop
//! sending graphics, clear the printer's RAM and exit, so the signal only
//! raises a flag that the page loop checks between scanlines.
//!
//! ```text
//!   SIGTERM ──► on_sigterm() ──► SIGNALED.store(true)
//!                                     │
//!   job loop ─► token.is_canceled() ◄─┘   (before every line)
//! ```

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the `SIGTERM` handler. A handler can only reach statics.
static SIGNALED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
enum Flag {
    Owned(Arc<AtomicBool>),
    Signal,
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. [`cancel`](Self::cancel) may be called from
/// any thread.
///
/// ## Example
///
/// ```
/// use tecraster::session::CancelToken;
///
/// let token = CancelToken::new();
/// let remote = token.clone();
/// assert!(!token.is_canceled());
///
/// remote.cancel();
/// assert!(token.is_canceled());
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Flag,
}

impl CancelToken {
    /// A token that is only set by [`cancel`](Self::cancel).
    pub fn new() -> Self {
        Self {
            flag: Flag::Owned(Arc::new(AtomicBool::new(false))),
        }
    }

    /// A token that is also set when the process receives `SIGTERM`.
    ///
    /// Installs the signal handler for the rest of the process lifetime.
    #[cfg(unix)]
    pub fn from_sigterm() -> io::Result<Self> {
        let handler = on_sigterm as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic store.
        let previous = unsafe { libc::signal(libc::SIGTERM, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
        log::debug!("SIGTERM handler installed");
        Ok(Self { flag: Flag::Signal })
    }

    /// Signals are not delivered on this platform; the token behaves like
    /// [`CancelToken::new`].
    #[cfg(not(unix))]
    pub fn from_sigterm() -> io::Result<Self> {
        Ok(Self::new())
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        match &self.flag {
            Flag::Owned(flag) => flag.store(true, Ordering::SeqCst),
            Flag::Signal => SIGNALED.store(true, Ordering::SeqCst),
        }
    }

    /// Whether cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        match &self.flag {
            Flag::Owned(flag) => flag.load(Ordering::SeqCst),
            Flag::Signal => SIGNALED.load(Ordering::SeqCst),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
extern "C" fn on_sigterm(_signal: libc::c_int) {
    SIGNALED.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tokens_are_independent() {
        let a = CancelToken::new();
        let b = CancelToken::new();
        a.cancel();
        assert!(a.is_canceled());
        assert!(!b.is_canceled());
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_canceled());
    }

    #[cfg(unix)]
    #[test]
    fn test_sigterm_sets_token() {
        let token = CancelToken::from_sigterm().unwrap();
        // SAFETY: the handler installed above replaces the default action.
        assert_eq!(unsafe { libc::raise(libc::SIGTERM) }, 0);
        assert!(token.is_canceled());
    }
}
