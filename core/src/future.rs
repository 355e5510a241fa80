//! Single-resolution deferred results.
//!
//! # Design
//! `Deferred<T, E>` is the one synchronization point of the pipeline: the
//! dispatch thread writes the outcome exactly once, and observers read it
//! through callbacks or a blocking [`Deferred::wait`]. The resolution slot
//! is a Mutex-guarded state machine with a Condvar for waiters; callbacks
//! registered before resolution run in attachment order at resolution time,
//! callbacks registered after run immediately. Callbacks always run outside
//! the lock, so an observer may attach further observers without
//! deadlocking.
//!
//! There is no cancellation and no timeout at this layer: once dispatched,
//! a request runs to completion or transport failure.

use std::mem;
use std::sync::{Arc, Condvar, Mutex};

use crate::error::ClientError;
use crate::http::ClientResponse;

/// Outcome of one in-flight request.
pub type ResponseFuture = Deferred<ClientResponse, ClientError>;

type Callback<T, E> = Box<dyn FnOnce(&Result<T, E>) + Send>;

enum State<T, E> {
    Pending(Vec<Callback<T, E>>),
    Done(Result<T, E>),
}

struct Inner<T, E> {
    state: Mutex<State<T, E>>,
    ready: Condvar,
}

/// Single-producer, single-resolution asynchronous handle.
///
/// Cloning shares the same resolution slot; any clone may attach observers,
/// and exactly one resolution (`resolve` or `reject`) may ever happen.
pub struct Deferred<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Default for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::pending()
    }
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Pending(Vec::new())),
                ready: Condvar::new(),
            }),
        }
    }

    /// A deferred that is already resolved.
    pub fn resolved(value: T) -> Self {
        let deferred = Self::pending();
        deferred.resolve(value);
        deferred
    }

    /// A deferred that is already rejected.
    pub fn rejected(error: E) -> Self {
        let deferred = Self::pending();
        deferred.reject(error);
        deferred
    }

    /// Complete with a success value.
    ///
    /// # Panics
    /// Panics if the deferred was already resolved or rejected.
    pub fn resolve(&self, value: T) {
        self.complete(Ok(value));
    }

    /// Complete with a failure value.
    ///
    /// # Panics
    /// Panics if the deferred was already resolved or rejected.
    pub fn reject(&self, error: E) {
        self.complete(Err(error));
    }

    fn complete(&self, result: Result<T, E>) {
        let callbacks = {
            let mut state = self.inner.state.lock().unwrap();
            if matches!(*state, State::Done(_)) {
                panic!("deferred result completed twice");
            }
            match mem::replace(&mut *state, State::Done(result.clone())) {
                State::Pending(callbacks) => callbacks,
                State::Done(_) => unreachable!(),
            }
        };
        self.inner.ready.notify_all();
        for callback in callbacks {
            callback(&result);
        }
    }

    /// Attach an observer for the terminal outcome, success or failure.
    ///
    /// Runs immediately if the deferred is already complete, otherwise
    /// exactly once upon completion, after all previously attached
    /// observers.
    pub fn on_complete<F>(&self, observer: F)
    where
        F: FnOnce(&Result<T, E>) + Send + 'static,
    {
        let mut state = self.inner.state.lock().unwrap();
        match &mut *state {
            State::Pending(callbacks) => callbacks.push(Box::new(observer)),
            State::Done(result) => {
                let result = result.clone();
                drop(state);
                observer(&result);
            }
        }
    }

    /// Attach an observer that runs only on success.
    pub fn on_success<F>(&self, observer: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_complete(|result| {
            if let Ok(value) = result {
                observer(value);
            }
        });
    }

    /// Attach an observer that runs only on failure.
    pub fn on_failure<F>(&self, observer: F)
    where
        F: FnOnce(&E) + Send + 'static,
    {
        self.on_complete(|result| {
            if let Err(error) = result {
                observer(error);
            }
        });
    }

    /// Block the calling thread until the deferred completes.
    pub fn wait(&self) -> Result<T, E> {
        let mut state = self.inner.state.lock().unwrap();
        loop {
            match &*state {
                State::Done(result) => return result.clone(),
                State::Pending(_) => state = self.inner.ready.wait(state).unwrap(),
            }
        }
    }

    /// The outcome, if the deferred has completed.
    pub fn peek(&self) -> Option<Result<T, E>> {
        match &*self.inner.state.lock().unwrap() {
            State::Done(result) => Some(result.clone()),
            State::Pending(_) => None,
        }
    }
}
