// Layer 1: Standard library
// (none)

// Layer 2: Third-party
// (none)

// Layer 3: Internal
use super::error::BalancerError;

/// Default worker channel capacity.
///
/// `tokio::sync::mpsc` has no true zero-capacity (rendezvous) channel, so a
/// capacity of 1 is the closest stand-in for `SPEC_FULL.md` §4.1's
/// "unbuffered (or minimally buffered, implementation choice)" worker
/// input channel: dispatch still blocks until the worker is actively
/// draining, it just tolerates one request queued ahead of that.
pub const DEFAULT_WORKER_CHANNEL_CAPACITY: usize = 1;

/// Construction parameters for a [`super::Balancer`].
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    /// Number of long-lived worker agents to start. Typically the CPU
    /// count — see `SPEC_FULL.md` §4.1.
    pub worker_count: usize,
    /// Capacity of each worker's private request channel.
    pub worker_channel_capacity: usize,
}

impl Default for BalancerConfig {
    /// Defaults to one worker per logical CPU, matching the reference
    /// `runtime.NumCPU()` sizing.
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            worker_channel_capacity: DEFAULT_WORKER_CHANNEL_CAPACITY,
        }
    }
}

impl BalancerConfig {
    /// Build a config for a specific worker count, keeping other defaults.
    pub fn with_worker_count(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), BalancerError> {
        if self.worker_count == 0 {
            return Err(BalancerError::ZeroWorkers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_rejected() {
        let config = BalancerConfig::with_worker_count(0);
        assert_eq!(config.validate(), Err(BalancerError::ZeroWorkers));
    }

    #[test]
    fn default_uses_cpu_count() {
        let config = BalancerConfig::default();
        assert_eq!(config.worker_count, num_cpus::get());
        assert!(config.worker_count >= 1);
    }
}
