//! SIGINT deferral around file mutations.
//!
//! While at least one patch is running, an interrupt only sets a pending
//! flag. When the last running patch finishes the signal is raised again,
//! so the default action (terminate) happens at the operation boundary
//! instead of halfway through a rewrite.
//!
//! The handlers are installed on first use and stay installed. Outside a
//! patch they fall through to the default action.

use crate::error::Result;

/// Run `op` with interrupt delivery deferred until it returns.
///
/// A deferred interrupt is re-raised after `op` completes, whether it
/// succeeded or not.
pub fn defer_interrupts<T>(op: impl FnOnce() -> T) -> Result<T> {
    let _guard = imp::Deferral::enter()?;
    Ok(op())
}

#[cfg(unix)]
mod imp {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use signal_hook::consts::SIGINT;
    use signal_hook::{flag, low_level};

    use crate::error::{PatchError, Result};

    /// Number of patches currently running in this process.
    static ACTIVE: AtomicUsize = AtomicUsize::new(0);

    static HANDLERS: Mutex<Option<Arc<Handlers>>> = Mutex::new(None);

    struct Handlers {
        /// Set by the handler whenever SIGINT arrives.
        pending: Arc<AtomicBool>,
        /// True while no patch is running; enables the default action.
        idle: Arc<AtomicBool>,
    }

    fn handlers() -> Result<Arc<Handlers>> {
        let mut slot = HANDLERS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handlers) = slot.as_ref() {
            return Ok(Arc::clone(handlers));
        }

        let handlers = Arc::new(Handlers {
            pending: Arc::new(AtomicBool::new(false)),
            idle: Arc::new(AtomicBool::new(true)),
        });
        flag::register(SIGINT, Arc::clone(&handlers.pending)).map_err(PatchError::SignalSetup)?;
        flag::register_conditional_default(SIGINT, Arc::clone(&handlers.idle))
            .map_err(PatchError::SignalSetup)?;
        tracing::debug!("Installed SIGINT deferral handlers");

        *slot = Some(Arc::clone(&handlers));
        Ok(handlers)
    }

    pub(super) struct Deferral {
        handlers: Arc<Handlers>,
    }

    impl Deferral {
        pub(super) fn enter() -> Result<Self> {
            let handlers = handlers()?;
            if ACTIVE.fetch_add(1, Ordering::SeqCst) == 0 {
                handlers.pending.store(false, Ordering::SeqCst);
                handlers.idle.store(false, Ordering::SeqCst);
            }
            Ok(Self { handlers })
        }
    }

    impl Drop for Deferral {
        fn drop(&mut self) {
            if ACTIVE.fetch_sub(1, Ordering::SeqCst) != 1 {
                return;
            }
            self.handlers.idle.store(true, Ordering::SeqCst);
            if self.handlers.pending.swap(false, Ordering::SeqCst) {
                tracing::info!("Re-raising interrupt deferred during file patch");
                if let Err(e) = low_level::raise(SIGINT) {
                    tracing::error!(error = %e, "Failed to re-raise SIGINT");
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::error::Result;

    pub(super) struct Deferral;

    impl Deferral {
        pub(super) fn enter() -> Result<Self> {
            Ok(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defer_returns_closure_value() {
        let value = defer_interrupts(|| 40 + 2).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_nested_deferral() {
        let value = defer_interrupts(|| defer_interrupts(|| "inner").unwrap()).unwrap();
        assert_eq!(value, "inner");
    }
}
