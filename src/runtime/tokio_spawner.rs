//! Tokio runtime spawner implementation.

use std::future::Future;
#[cfg(feature = "tokio-runtime")]
use std::sync::Arc;

use crate::core::Spawn;

#[derive(Clone, Debug)]
enum Target {
    /// Whatever runtime is current when `spawn` is called.
    Ambient,
    /// A runtime owned elsewhere.
    Handle(tokio::runtime::Handle),
    /// A runtime owned by this spawner; kept alive by the `Arc`.
    #[cfg(feature = "tokio-runtime")]
    Owned(Arc<OwnedRuntime>),
}

/// Runtime owned by a spawner.
///
/// Dropping a `Runtime` inside an async context panics, and the last spawner
/// clone may well be dropped from a task, so shutdown goes through
/// `shutdown_background` instead.
#[cfg(feature = "tokio-runtime")]
#[derive(Debug)]
struct OwnedRuntime {
    handle: tokio::runtime::Handle,
    runtime: Option<tokio::runtime::Runtime>,
}

#[cfg(feature = "tokio-runtime")]
impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Tokio-based spawner that executes task drivers on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    target: Target,
}

impl Default for TokioSpawner {
    fn default() -> Self {
        Self::ambient()
    }
}

impl TokioSpawner {
    /// Spawn onto the runtime current at each `spawn` call.
    ///
    /// A driver spawned while no tokio runtime is current is dropped instead,
    /// and its handle's `join` resolves to [`SchedulerError::Abandoned`].
    ///
    /// [`SchedulerError::Abandoned`]: crate::core::SchedulerError::Abandoned
    pub const fn ambient() -> Self {
        Self {
            target: Target::Ambient,
        }
    }

    /// Create a `TokioSpawner` from a tokio runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            target: Target::Handle(handle),
        }
    }

    /// Create a `TokioSpawner` that owns a multi-threaded runtime with `worker_threads` threads.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from building the runtime.
    #[cfg(feature = "tokio-runtime")]
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("rate-gate-worker")
            .enable_time()
            .build()?;
        Ok(Self {
            target: Target::Owned(Arc::new(OwnedRuntime {
                handle: runtime.handle().clone(),
                runtime: Some(runtime),
            })),
        })
    }

    /// Owned runtime with one worker per CPU.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from building the runtime.
    #[cfg(feature = "tokio-runtime")]
    pub fn dedicated() -> Result<Self, std::io::Error> {
        Self::with_worker_threads(num_cpus::get())
    }

    /// Handle of the runtime this spawner targets, if it is fixed.
    pub fn handle(&self) -> Option<tokio::runtime::Handle> {
        match &self.target {
            Target::Ambient => None,
            Target::Handle(handle) => Some(handle.clone()),
            #[cfg(feature = "tokio-runtime")]
            Target::Owned(owned) => Some(owned.handle.clone()),
        }
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.target {
            Target::Ambient => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(fut);
                }
                Err(err) => {
                    tracing::warn!("no tokio runtime to drive task, abandoning it: {}", err);
                    drop(fut);
                }
            },
            Target::Handle(handle) => {
                handle.spawn(fut);
            }
            #[cfg(feature = "tokio-runtime")]
            Target::Owned(owned) => {
                owned.handle.spawn(fut);
            }
        }
    }
}
