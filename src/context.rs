//! Identity-scoped execution context.
//!
//! Each inbound request runs as one logical execution unit; the binder
//! attaches the caller's identity to that unit with [`bind`] and the
//! trusted tool executor reads it back with [`current`]. The slot is a
//! tokio task-local, so isolation is structural: a unit only ever sees
//! its own binding, no matter how requests interleave or which worker
//! thread resumes a suspended future. No locks are involved.
//!
//! The scope is released on every exit path (return, error, panic,
//! cancellation) because the task-local scope restores on drop. A unit
//! that reuses a worker after a previous request always starts absent.

use std::fmt;
use std::future::Future;

/// Opaque caller identity (a bearer value).
///
/// Never interpreted by the runtime, only compared and forwarded.
/// The `Debug` impl is redacted so the raw value cannot leak through
/// logs or error chains.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw bearer value, for the trusted executor to stamp on
    /// outbound calls.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Identity(<redacted>)")
    }
}

tokio::task_local! {
    /// The binding slot for the current execution unit.
    ///
    /// `None` inside a scope means "explicitly unauthenticated";
    /// outside any scope the slot simply does not exist. Both read
    /// back as absent through [`current`].
    static CURRENT_IDENTITY: Option<Identity>;
}

/// Runs `fut` with `identity` bound as the active identity.
///
/// The binding is visible to everything awaited inside `fut` on the
/// same task, and to nothing else. A nested `bind` shadows the outer
/// binding for its own scope and restores it afterwards; bindings are
/// never merged.
pub async fn bind<F: Future>(identity: Identity, fut: F) -> F::Output {
    CURRENT_IDENTITY.scope(Some(identity), fut).await
}

/// Runs `fut` with an explicitly absent binding.
///
/// Used by the binder for requests without a parsable credential, so
/// that downstream reads are deterministic regardless of what the
/// worker executed before.
pub async fn unauthenticated<F: Future>(fut: F) -> F::Output {
    CURRENT_IDENTITY.scope(None, fut).await
}

/// Returns the identity bound to the calling execution unit, if any.
///
/// Total: reading outside any scope yields `None`, not an error.
/// Crate-private — only trusted runtime code (the tool executor, the
/// chat handler's auth gate) may read the binding; the decision engine
/// never sees this module.
pub(crate) fn current() -> Option<Identity> {
    CURRENT_IDENTITY.try_with(Clone::clone).unwrap_or(None)
}
