//! Cooperative cancellation.
//!
//! Every long-running operation takes a [`CancelToken`]. The token is checked
//! before dispatching work and at each subprocess boundary; a fired token
//! surfaces as an [`ErrorKind::Cancelled`](crate::error::ErrorKind) error and
//! never populates caches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Clonable cancellation handle shared between the driver and workers.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` if the token has fired.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::cancelled())
        } else {
            Ok(())
        }
    }

    /// Trip this token on SIGINT/SIGTERM.
    ///
    /// Registered once from the composition root; the signal also terminates
    /// in-flight blocking reads the usual way, the flag just makes workers
    /// stop picking up new candidates.
    #[cfg(unix)]
    pub fn register_signals(&self) -> std::io::Result<()> {
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&self.flag))?;
        signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&self.flag))?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn register_signals(&self) -> std::io::Result<()> {
        Ok(())
    }
}
