//! Lazily initialized, shared model instances.
//!
//! A slot loads its model at most once, on first use, no matter how many
//! threads race for it. A failed load is remembered and never retried. Calls
//! into a loaded model are serialized by a per-slot mutex that is separate from
//! the one-time initialization, so two slots never block each other.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use anyhow::Result;
use tracing::{info, warn};

/// Lifecycle of a model slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No request has needed the model yet.
    Uninitialized,
    /// The model loaded and accepts calls.
    Ready,
    /// Loading failed; the slot stays unavailable for the process lifetime.
    FailedPermanently,
}

enum Loaded<T> {
    Ready(Mutex<T>),
    Failed(String),
}

type Loader<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// A shared model instance with lazy, idempotent initialization.
pub struct ModelSlot<T> {
    name: &'static str,
    loader: Loader<T>,
    loaded: OnceLock<Loaded<T>>,
}

impl<T: Send> ModelSlot<T> {
    /// Creates a slot that runs `loader` the first time the model is needed.
    pub fn new(name: &'static str, loader: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            name,
            loader: Box::new(loader),
            loaded: OnceLock::new(),
        }
    }

    /// Creates a slot holding an already constructed model.
    pub fn ready(name: &'static str, model: T) -> Self {
        Self {
            name,
            loader: Box::new(move || anyhow::bail!("model {name} was supplied pre-loaded")),
            loaded: OnceLock::from(Loaded::Ready(Mutex::new(model))),
        }
    }

    /// Creates a slot whose model is known to be unavailable.
    pub fn unavailable(name: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            name,
            loader: Box::new(move || anyhow::bail!("model {name} is unavailable")),
            loaded: OnceLock::from(Loaded::Failed(reason)),
        }
    }

    /// Name of the model held by this slot.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current lifecycle state. Never triggers a load.
    #[must_use]
    pub fn state(&self) -> ModelState {
        match self.loaded.get() {
            None => ModelState::Uninitialized,
            Some(Loaded::Ready(_)) => ModelState::Ready,
            Some(Loaded::Failed(_)) => ModelState::FailedPermanently,
        }
    }

    /// Loads the model if needed and reports whether it is usable.
    pub fn is_available(&self) -> bool {
        matches!(self.load(), Loaded::Ready(_))
    }

    /// The load error, if initialization failed.
    pub fn failure(&self) -> Option<&str> {
        match self.loaded.get() {
            Some(Loaded::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    /// Runs `f` with exclusive access to the model.
    ///
    /// Returns `None` without calling `f` if the model failed to initialize.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        match self.load() {
            Loaded::Ready(model) => {
                let mut guard = model.lock().unwrap_or_else(PoisonError::into_inner);
                Some(f(&mut guard))
            }
            Loaded::Failed(_) => None,
        }
    }

    fn load(&self) -> &Loaded<T> {
        self.loaded.get_or_init(|| match (self.loader)() {
            Ok(model) => {
                info!("Loaded {} model", self.name);
                Loaded::Ready(Mutex::new(model))
            }
            Err(e) => {
                warn!("Failed to load {} model: {e:#}", self.name);
                Loaded::Failed(format!("{e:#}"))
            }
        })
    }
}

impl<T> fmt::Debug for ModelSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.loaded.get() {
            None => "uninitialized",
            Some(Loaded::Ready(_)) => "ready",
            Some(Loaded::Failed(_)) => "failed",
        };
        f.debug_struct("ModelSlot")
            .field("name", &self.name)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_lazy_until_first_use() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let slot = ModelSlot::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(7u32)
        });

        assert_eq!(slot.state(), ModelState::Uninitialized);
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        assert_eq!(slot.with(|m| *m), Some(7));
        assert_eq!(slot.state(), ModelState::Ready);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let slot = ModelSlot::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Ok(String::from("model"))
        });

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert!(slot.is_available()));
            }
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_permanent() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let slot: ModelSlot<u32> = ModelSlot::new("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("weights missing")
        });

        for _ in 0..3 {
            assert_eq!(slot.with(|m| *m), None);
        }

        assert_eq!(slot.state(), ModelState::FailedPermanently);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(slot.failure().is_some_and(|r| r.contains("weights missing")));
    }

    #[test]
    fn test_calls_are_serialized() {
        let in_flight = AtomicUsize::new(0);
        let max_in_flight = AtomicUsize::new(0);
        let slot = ModelSlot::ready("test", 0u32);

        std::thread::scope(|s| {
            for _ in 0..6 {
                s.spawn(|| {
                    slot.with(|calls| {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_in_flight.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(5));
                        *calls += 1;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(slot.with(|calls| *calls), Some(6));
    }

    #[test]
    fn test_unavailable_slot() {
        let slot: ModelSlot<u32> = ModelSlot::unavailable("face", "not configured");
        assert_eq!(slot.state(), ModelState::FailedPermanently);
        assert!(!slot.is_available());
        assert_eq!(slot.failure(), Some("not configured"));
    }
}
