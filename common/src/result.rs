//! Lazy and pending result containers.
//!
//! Synchronous operations return plain [`Result`](crate::error::Result)
//! values. [`Lazy`] defers a computation until first read and memoizes
//! whichever way it went; [`PendingResult`] is the asynchronous handle
//! every `async_*` balance and account operation returns.

use std::fmt;
use std::future::Future;
use std::sync::mpsc;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{Result, SystemError};

type Producer<T> = Box<dyn FnOnce() -> Result<T> + Send>;
type Callback<T> = Box<dyn FnOnce(&Result<T>) + Send>;

/// A result computed at most once, on first read.
///
/// Both success and failure are cached; concurrent first readers are
/// serialized so the producer never runs twice.
pub struct Lazy<T> {
    producer: Mutex<Option<Producer<T>>>,
    cell: OnceLock<Result<T>>,
}

impl<T> Lazy<T> {
    /// Wrap a producer for deferred, memoized evaluation.
    pub fn new<F>(producer: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            producer: Mutex::new(Some(Box::new(producer))),
            cell: OnceLock::new(),
        }
    }

    /// Compute the result if this is the first read, then return it.
    pub fn get(&self) -> &Result<T> {
        self.cell.get_or_init(|| match self.producer.lock().take() {
            Some(produce) => produce(),
            None => Err(SystemError::Internal(
                "lazy producer re-entered during initialization".into(),
            )),
        })
    }

    /// Check whether the result has been computed.
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("result", &self.cell.get()).finish()
    }
}

enum State<T> {
    Pending(Vec<Callback<T>>),
    Complete(Arc<Result<T>>),
}

struct Inner<T> {
    state: Mutex<State<T>>,
}

impl<T> Inner<T> {
    fn complete(&self, result: Result<T>) {
        let shared = Arc::new(result);
        let callbacks = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *state = State::Complete(Arc::clone(&shared));
                    callbacks
                }
                // resolve is consume-once, so a second completion can only
                // come from the resolver's drop guard
                State::Complete(_) => return,
            }
        };
        for callback in callbacks {
            callback(&shared);
        }
    }
}

/// The pending result of an economy action.
///
/// Resolves eventually to a [`Result`]; consumers register callbacks that
/// fire exactly once per resolution, in registration order. Callbacks
/// registered after resolution fire immediately.
pub struct PendingResult<T> {
    inner: Arc<Inner<T>>,
}

/// Completes a [`PendingResult`], exactly once.
///
/// Dropping an unresolved resolver completes the handle with an internal
/// error, so consumers never wait forever.
pub struct Resolver<T> {
    inner: Option<Arc<Inner<T>>>,
}

impl<T: Send + Sync + 'static> PendingResult<T> {
    /// Create an already-resolved pending result.
    ///
    /// This is the default asynchronous behavior of every synchronous
    /// operation: run eagerly, wrap the outcome.
    pub fn completed(result: Result<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Complete(Arc::new(result))),
            }),
        }
    }

    /// Create an unresolved pending result and its resolver.
    pub fn channel() -> (Self, Resolver<T>) {
        let inner = Arc::new(Inner {
            state: Mutex::new(State::Pending(Vec::new())),
        });
        let pending = Self {
            inner: Arc::clone(&inner),
        };
        (pending, Resolver { inner: Some(inner) })
    }

    /// Run a computation on the async runtime and resolve on completion.
    ///
    /// Stores backed by external storage use this to move work off the
    /// calling task.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (pending, resolver) = Self::channel();
        tokio::spawn(async move {
            resolver.resolve(future.await);
        });
        pending
    }

    /// Run the given function with the result once complete.
    pub fn once_complete<F>(&self, callback: F)
    where
        F: FnOnce(&Result<T>) + Send + 'static,
    {
        let boxed: Callback<T> = Box::new(callback);
        let fire = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                State::Pending(callbacks) => {
                    callbacks.push(boxed);
                    None
                }
                State::Complete(result) => Some((boxed, Arc::clone(result))),
            }
        };
        if let Some((callback, result)) = fire {
            callback(&result);
        }
    }

    /// Run the given function with the value once complete.
    ///
    /// Not run if the action failed.
    pub fn if_successful<F>(&self, callback: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.once_complete(move |result| {
            if let Ok(value) = result {
                callback(value);
            }
        });
    }

    /// Run the given function with the error once complete.
    ///
    /// Not run if the action succeeded.
    pub fn if_failed<F>(&self, callback: F)
    where
        F: FnOnce(&SystemError) + Send + 'static,
    {
        self.once_complete(move |result| {
            if let Err(error) = result {
                callback(error);
            }
        });
    }

    /// Check whether the result has resolved.
    pub fn is_complete(&self) -> bool {
        matches!(&*self.inner.state.lock(), State::Complete(_))
    }
}

impl<T: Clone + Send + Sync + 'static> PendingResult<T> {
    /// Block the calling thread until resolution.
    pub fn wait(&self) -> Result<T> {
        let (tx, rx) = mpsc::channel();
        self.once_complete(move |result| {
            let _ = tx.send(result.clone());
        });
        match rx.recv() {
            Ok(result) => result,
            Err(_) => Err(SystemError::Internal(
                "pending result abandoned before resolution".into(),
            )),
        }
    }

    /// Await resolution on the async runtime.
    pub async fn resolved(&self) -> Result<T> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.once_complete(move |result| {
            let _ = tx.send(result.clone());
        });
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(SystemError::Internal(
                "pending result abandoned before resolution".into(),
            )),
        }
    }
}

impl<T> fmt::Debug for PendingResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let complete = matches!(&*self.inner.state.lock(), State::Complete(_));
        f.debug_struct("PendingResult")
            .field("complete", &complete)
            .finish()
    }
}

impl<T> Resolver<T> {
    /// Resolve the pending result, consuming this resolver.
    pub fn resolve(mut self, result: Result<T>) {
        if let Some(inner) = self.inner.take() {
            inner.complete(result);
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.complete(Err(SystemError::Internal(
                "resolver dropped before resolution".into(),
            )));
        }
    }
}
