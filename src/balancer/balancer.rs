// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use tokio::sync::mpsc;

// Layer 3: Internal
use super::config::BalancerConfig;
use super::heap::{WorkerEntry, WorkerHeap};
use super::request::Request;
use super::worker::{self, WorkerId};

/// Routes each incoming [`Request`] to whichever of a fixed set of worker
/// agents currently has the fewest pending requests.
///
/// Construction spawns `worker_count` long-lived worker tasks up front (see
/// `SPEC_FULL.md` §4.1); [`Balancer::run`] then drives the single-threaded
/// dispatch/complete event loop described there. The heap backing worker
/// selection is owned exclusively by that loop and needs no locking.
pub struct Balancer<T> {
    heap: WorkerHeap<T>,
    completions: mpsc::Receiver<WorkerId>,
}

impl<T: Send + 'static> Balancer<T> {
    /// Start `config.worker_count` worker agents and return a balancer
    /// ready to [`run`](Balancer::run).
    ///
    /// # Panics
    ///
    /// Panics if `config.worker_count == 0` (see [`BalancerError::
    /// ZeroWorkers`](super::BalancerError::ZeroWorkers)) — a worker count
    /// fixed at construction and known ahead of time is a programmer error
    /// to get wrong, not a runtime condition callers should have to
    /// handle. Validate the count yourself first if it comes from
    /// untrusted input.
    #[allow(clippy::expect_used)] // documented programmer-error panic, see above
    pub fn new(config: BalancerConfig) -> Self {
        config
            .validate()
            .expect("invalid BalancerConfig passed to Balancer::new");

        let (done_tx, done_rx) = mpsc::channel(config.worker_count);
        let mut entries = Vec::with_capacity(config.worker_count);
        for i in 0..config.worker_count {
            let id = WorkerId(i);
            let (requests_tx, requests_rx) = mpsc::channel(config.worker_channel_capacity);
            tokio::spawn(worker::run(id, requests_rx, done_tx.clone()));
            entries.push(WorkerEntry {
                id,
                sender: requests_tx,
                pending: 0,
                index: i,
            });
        }

        Self {
            heap: WorkerHeap::init(entries),
            completions: done_rx,
        }
    }

    /// Run the dispatch/complete event loop until `requests` closes or
    /// every worker has exited.
    ///
    /// Two sources are multiplexed: a new [`Request`] triggers
    /// [`dispatch`](Balancer::dispatch), a worker completion notification
    /// triggers [`complete`](Balancer::complete). Neither branch spins —
    /// both may suspend the loop (see `SPEC_FULL.md` §5).
    pub async fn run(mut self, mut requests: mpsc::Receiver<Request<T>>) {
        loop {
            tokio::select! {
                request = requests.recv() => {
                    match request {
                        Some(request) => self.dispatch(request).await,
                        None => {
                            tracing::debug!("request stream closed, balancer exiting");
                            return;
                        }
                    }
                }
                completion = self.completions.recv() => {
                    match completion {
                        Some(id) => self.complete(id),
                        None => {
                            tracing::warn!("all balancer workers exited, balancer exiting");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Pop the least-loaded worker, hand it the request, and push it back.
    ///
    /// Because the popped worker had the minimum `pending` of the whole
    /// heap, incrementing it by one cannot violate the min-heap property at
    /// the root; the push restores full ordering in `O(log n)`.
    async fn dispatch(&mut self, request: Request<T>) {
        let mut worker = self.heap.pop_min();
        tracing::trace!(worker = %worker.id, pending = worker.pending, "dispatching request");
        match worker.sender.send(request).await {
            Ok(()) => worker.pending += 1,
            Err(_) => tracing::warn!(worker = %worker.id, "worker channel closed, request dropped"),
        }
        self.heap.push(worker);
    }

    /// Decrement the completing worker's pending count and re-sift it from
    /// its current position. A decrement can only move a worker toward the
    /// root, so this restores heap order in `O(log n)`.
    fn complete(&mut self, id: WorkerId) {
        self.heap.complete(id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests are allowed to use unwrap for simplicity
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatches_to_least_loaded_worker() {
        let balancer = Balancer::<i64>::new(BalancerConfig::with_worker_count(4));
        let (requests_tx, requests_rx) = mpsc::channel(1);
        let handle = tokio::spawn(balancer.run(requests_rx));

        let mut results = Vec::new();
        for i in 0..8 {
            let (request, result) = Request::new(move || i);
            requests_tx.send(request).await.unwrap();
            results.push(result);
        }
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.await.unwrap(), i as i64);
        }

        drop(requests_tx);
        handle.await.unwrap();
    }
}
