//! Session store.
//!
//! One [`SessionStore`] exists per browsing context: the route guard builds a
//! fresh one for every incoming request and drops it with the response. It
//! is never shared between requests.
//!
//! The store is a `tokio::sync::watch` cell, so readers get the current value
//! synchronously and observers can await changes instead of polling.
//! Every write goes through `send_modify`/`send_if_modified`, which makes
//! each update a single read-modify-write step.
//!
//! A generation counter guards against stale identity fetches: `reset`
//! bumps it, and a fetch that started under an older generation cannot
//! write its result back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use talent_hub_core::User;

use super::SessionToken;

/// Snapshot of the authentication state of one browsing context.
///
/// `is_authenticated()` implies both `token()` and `user()` are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    token: Option<SessionToken>,
    user: Option<User>,
    is_authenticated: bool,
    in_flight: u32,
}

impl SessionState {
    /// The empty, unauthenticated state.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// True while an identity fetch is outstanding.
    #[must_use]
    pub const fn is_authenticating(&self) -> bool {
        self.in_flight > 0
    }

    /// True when no credential or identity is held and nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record a mutually validated token and user.
    pub fn authenticate(&mut self, token: SessionToken, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.is_authenticated = true;
    }

    /// Re-establish the invariant after an arbitrary update.
    fn normalize(&mut self) {
        if self.token.is_none() || self.user.is_none() {
            self.is_authenticated = false;
        }
    }
}

/// Reactive per-context session cell.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store holding the empty state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::empty());
        Self {
            inner: Arc::new(Inner {
                tx,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current value.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.tx.borrow().clone()
    }

    /// Whether the current value is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.tx.borrow().is_authenticated()
    }

    /// The resolved user, if authenticated.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let state = self.inner.tx.borrow();
        state.is_authenticated().then(|| state.user().cloned()).flatten()
    }

    /// Apply `f` as one atomic step. The invariant is restored afterwards.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut SessionState),
    {
        self.inner.tx.send_modify(|state| {
            f(state);
            state.normalize();
        });
    }

    /// Replace the value wholesale, returning the previous one.
    ///
    /// Starts a new generation, so in-flight fetches can no longer apply.
    pub fn replace(&self, mut state: SessionState) -> SessionState {
        state.normalize();
        state.in_flight = 0;
        let mut previous = None;
        self.inner.tx.send_modify(|current| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            previous = Some(std::mem::replace(current, state));
        });
        previous.unwrap_or_default()
    }

    /// Return to the empty state and start a new generation.
    pub fn reset(&self) {
        self.replace(SessionState::empty());
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.tx.subscribe()
    }

    /// Wait until no identity fetch is outstanding, then return the value.
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.subscribe();
        let result = rx.wait_for(|state| !state.is_authenticating()).await;
        result.map_or_else(|_| self.snapshot(), |state| state.clone())
    }

    /// Mark an identity fetch as started and return its generation.
    pub(crate) fn begin_fetch(&self) -> u64 {
        let mut generation = 0;
        self.inner.tx.send_modify(|state| {
            generation = self.inner.generation.load(Ordering::SeqCst);
            state.in_flight += 1;
        });
        generation
    }

    /// Apply a successful fetch if its generation is still current.
    ///
    /// Returns `false` when the session was reset while the fetch ran; the
    /// result is then discarded.
    pub(crate) fn complete_fetch(&self, generation: u64, token: SessionToken, user: User) -> bool {
        self.inner.tx.send_if_modified(|state| {
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.in_flight = state.in_flight.saturating_sub(1);
            state.authenticate(token, user);
            true
        })
    }

    /// Mark a failed fetch as finished if its generation is still current.
    pub(crate) fn abort_fetch(&self, generation: u64) {
        self.inner.tx.send_if_modified(|state| {
            if self.inner.generation.load(Ordering::SeqCst) != generation || state.in_flight == 0 {
                return false;
            }
            state.in_flight -= 1;
            true
        });
    }
}
