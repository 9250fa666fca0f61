//! Database session layer.
//!
//! [`SessionFactory`] opens request-scoped [`Session`]s; the default
//! implementation is [`mysql::Engine`], a lazily-connected MySQL pool.
//! Request code never holds a raw session: it goes through
//! [`SessionProvider::acquire`] (a drop guard) or [`SessionProvider::scoped`]
//! (a combinator), and the session is released exactly once when the scope
//! ends, whether it finished normally, returned early, or unwound.

pub mod mysql;

use std::ops::{Deref, DerefMut};

use thiserror::Error;
use tracing::trace;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("missing database environment variables: {}. Check your .env file", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("invalid database configuration: {0}")]
    Driver(#[from] sqlx::Error),
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// A unit of work bound to one logical request.
pub trait Session: Send {
    /// Return the session's resources to the engine. Uncommitted work is
    /// discarded. The session must not be used afterwards.
    fn release(&mut self);

    /// `true` once [`release`](Self::release) has run.
    fn is_released(&self) -> bool;
}

/// Opens sessions. Opening never touches the network; connection errors
/// surface on first use of the session.
pub trait SessionFactory: Send + Sync + 'static {
    type Session: Session;

    fn open(&self) -> Self::Session;
}

// ── Guard ─────────────────────────────────────────────────────────────────────

/// Owns one session for the length of a scope and releases it on drop,
/// unless the caller already released it by hand.
pub struct ScopedSession<S: Session> {
    session: S,
}

impl<S: Session> Deref for ScopedSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> DerefMut for ScopedSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: Session> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        if self.session.is_released() {
            return;
        }
        trace!("releasing scoped session");
        self.session.release();
    }
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// Hands out scoped sessions over a shared factory.
///
/// Cheap to clone when the factory is; [`mysql::Engine`] is an `Arc`ed pool.
#[derive(Debug, Clone)]
pub struct SessionProvider<F> {
    factory: F,
}

impl<F: SessionFactory> SessionProvider<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Open a session guarded for the caller's scope.
    pub fn acquire(&self) -> ScopedSession<F::Session> {
        trace!("opening scoped session");
        ScopedSession { session: self.factory.open() }
    }

    /// Run `f` with a fresh session and release it before returning.
    ///
    /// Whatever `f` returns is passed through untouched, errors included.
    /// The returned future is not `Send` in general; handlers that must be
    /// `Send` use [`acquire`](Self::acquire) instead.
    pub async fn scoped<T>(&self, f: impl AsyncFnOnce(&mut F::Session) -> T) -> T {
        let mut session = self.acquire();
        f(&mut *session).await
    }
}
