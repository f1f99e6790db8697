//! Cooperative cancellation handle shared between a [`super::Pool`] and its
//! tasks — this crate's stand-in for the spec's "context".
//!
//! Realized directly as [`tokio_util::sync::CancellationToken`] rather than
//! hand-rolled on a `Notify` + `AtomicBool`: the corpus already reaches for
//! this exact type for exactly this concern (see `DESIGN.md`), and its
//! `child_token()` is precisely the spec's `context.WithCancel(parent)`
//! parent/child derivation — cancelling a parent cancels every child, but
//! not the reverse.

pub use tokio_util::sync::CancellationToken as PoolHandle;
