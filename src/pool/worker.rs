//! The pool's per-worker task loop.

// Layer 1: Standard library
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party
use tokio::sync::Notify;

// Layer 3: Internal
use super::handle::PoolHandle;
use super::latch::ErrorLatch;
use super::task::Task;

/// Drive one worker's share of the shared `tasks` channel until it closes
/// or the pool is cancelled.
///
/// Each iteration races a task arrival against cancellation (`SPEC_FULL.md`
/// §4.3, §9). A task that is already in this worker's hands always runs to
/// completion: only the *next* receive races cancellation, matching the
/// reference implementation's `select` placement.
///
/// On exit this always decrements `workers` and notifies `workers_notify`
/// on the transition to zero, regardless of which arm caused the exit.
/// `outstanding` is only ever decremented for a task this worker actually
/// received and ran; a worker that exits via its cancellation arm without
/// having claimed a task leaves `outstanding` untouched; see `SPEC_FULL.md`
/// §9 for why that diverges from the reference `taskWg.Done()` call in the
/// same arm. A task already received always decrements `outstanding`
/// whether it succeeds or fails, so the pending count stays exact
/// regardless of cancellation.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run<E: Clone + Send + 'static>(
    tasks: flume::Receiver<Task<E>>,
    handle: PoolHandle,
    outstanding: Arc<AtomicUsize>,
    idle_notify: Arc<Notify>,
    error_latch: Arc<ErrorLatch<E>>,
    workers: Arc<AtomicUsize>,
    workers_notify: Arc<Notify>,
) {
    loop {
        tokio::select! {
            task = tasks.recv_async() => {
                match task {
                    Ok(task) => {
                        let outcome = task.await;
                        if let Err(err) = outcome {
                            tracing::debug!("task failed, capturing first error and cancelling pool");
                            error_latch.capture(err);
                            handle.cancel();
                        }
                        if outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
                            idle_notify.notify_one();
                        }
                    }
                    Err(_) => {
                        tracing::trace!("task channel closed, worker exiting");
                        break;
                    }
                }
            }
            _ = handle.cancelled() => {
                tracing::trace!("worker observed cancellation, exiting without claiming a task");
                break;
            }
        }
    }

    if workers.fetch_sub(1, Ordering::SeqCst) == 1 {
        workers_notify.notify_one();
    }
}
