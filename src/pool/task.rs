// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use futures::future::BoxFuture;

/// A unit of work submitted to a [`super::Pool`]: an owned, boxed future
/// that resolves to `Ok(())` or the pool's error type `E`.
///
/// Corresponds to the reference `func() error` task signature; boxing it
/// lets [`super::Pool::go`] accept any `Future`-returning closure while
/// keeping the pool's internal channel monomorphic over `E` alone.
pub(crate) type Task<E> = BoxFuture<'static, Result<(), E>>;
