// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

/// Construction-time errors for [`super::Balancer`].
///
/// The balancer's steady-state operation has no error conditions of its
/// own — jobs are assumed total and dispatch/complete never fail — so this
/// enum only covers misconfiguration caught before the event loop starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalancerError {
    /// `worker_count` was zero; a balancer with no workers could never
    /// dispatch a request.
    #[error("balancer requires at least one worker, got 0")]
    ZeroWorkers,
}
