// Layer 1: Standard library
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party
use tokio::sync::Notify;

// Layer 3: Internal
use super::config::PoolConfig;
use super::error::PoolError;
use super::handle::PoolHandle;
use super::latch::ErrorLatch;
use super::task::Task;
use super::worker;

/// A lazily-scaling, capacity-bounded pool of task workers with
/// first-error-wins semantics and cooperative cancellation.
///
/// Workers are not pre-spawned: the first [`Pool::go`] call starts the
/// first worker, and further workers are only started as the shared
/// `tasks` channel is found full, up to `cap`. This is the opposite
/// strategy from [`super::super::Balancer`], which spawns its full worker
/// set up front — see `SPEC_FULL.md` §4.3 for why the pool's workload is
/// assumed bursty enough that up-front spawning would usually be wasted.
pub struct Pool<E: Clone + Send + 'static> {
    tasks_tx: flume::Sender<Task<E>>,
    tasks_rx: flume::Receiver<Task<E>>,
    cap: usize,
    workers: Arc<AtomicUsize>,
    workers_notify: Arc<Notify>,
    outstanding: Arc<AtomicUsize>,
    idle_notify: Arc<Notify>,
    error_latch: Arc<ErrorLatch<E>>,
    handle: PoolHandle,
}

impl<E: Clone + Send + std::fmt::Display + std::fmt::Debug + 'static> Pool<E> {
    /// Create a pool bounded at `cap` concurrent workers.
    ///
    /// `parent`, if given, derives the pool's cancellation from an existing
    /// [`PoolHandle`]: cancelling the parent cancels this pool too. Returns
    /// the pool together with its own handle, which the caller can cancel
    /// directly, hand to further child pools, or capture into task
    /// closures passed to [`go`](Pool::go).
    ///
    /// # Panics
    ///
    /// Panics if `cap == 0` — see `SPEC_FULL.md` §9. A pool that can never
    /// run a single worker is a construction-time mistake, not a condition
    /// callers should have to handle via `Result`.
    pub fn new(parent: Option<PoolHandle>, cap: usize) -> (Self, PoolHandle) {
        let config = PoolConfig::with_cap(cap);
        assert!(config.validate(), "Pool::new requires cap > 0, got 0");

        let handle = match parent {
            Some(parent) => parent.child_token(),
            None => PoolHandle::new(),
        };
        let (tasks_tx, tasks_rx) = flume::bounded(0);

        let pool = Self {
            tasks_tx,
            tasks_rx,
            cap,
            workers: Arc::new(AtomicUsize::new(0)),
            workers_notify: Arc::new(Notify::new()),
            outstanding: Arc::new(AtomicUsize::new(0)),
            idle_notify: Arc::new(Notify::new()),
            error_latch: Arc::new(ErrorLatch::new()),
            handle: handle.clone(),
        };
        (pool, handle)
    }

    /// Submit a task to run on the pool.
    ///
    /// `task` is called lazily, only once the pool actually hands it to a
    /// worker; it never runs at all if the pool is already cancelled when
    /// `go` is called, or becomes cancelled while `go` is waiting for a
    /// worker to accept it. Per `SPEC_FULL.md` §4.3 this is "at most once",
    /// never "exactly once": callers needing a submission guarantee should
    /// check the returned [`PoolHandle`] (or the eventual [`Pool::wait`]
    /// result) rather than assume every `go` ran its task.
    pub async fn go<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        if self.handle.is_cancelled() {
            tracing::debug!("pool already cancelled, dropping task before submission");
            return;
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let boxed: Task<E> = Box::pin(async move { task().await });

        match self.tasks_tx.try_send(boxed) {
            Ok(()) => {}
            Err(flume::TrySendError::Disconnected(_)) => self.undo_outstanding(),
            Err(flume::TrySendError::Full(boxed)) => {
                if self.workers.load(Ordering::SeqCst) < self.cap {
                    self.spawn_worker();
                }
                tokio::select! {
                    result = self.tasks_tx.send_async(boxed) => {
                        if result.is_err() {
                            self.undo_outstanding();
                        }
                    }
                    () = self.handle.cancelled() => {
                        tracing::debug!("pool cancelled while waiting for a free worker");
                        self.undo_outstanding();
                    }
                }
            }
        }
    }

    /// Wait for every task already handed to the pool to finish, then
    /// consume the pool and report the outcome.
    ///
    /// No further [`go`](Pool::go) calls are possible once this is called,
    /// since it takes `self` by value. Returns the first task error seen,
    /// if any (even if the pool was also cancelled); otherwise
    /// [`PoolError::Cancelled`] if cancellation happened with no task
    /// error; otherwise `Ok(())`.
    pub async fn wait(self) -> Result<(), PoolError<E>> {
        // flume has no explicit "close" call; a channel becomes disconnected
        // once every `Sender` is dropped, and `Pool` never hands out a clone
        // of `tasks_tx` (only `tasks_rx` is cloned, once per worker), so
        // dropping this one sender here is equivalent to `close()`.
        drop(self.tasks_tx);

        loop {
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                break;
            }
            let notified = self.idle_notify.notified();
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                break;
            }
            notified.await;
        }

        let outcome = match self.error_latch.get() {
            Some(err) => Err(PoolError::Task(err)),
            None if self.handle.is_cancelled() => Err(PoolError::Cancelled),
            None => Ok(()),
        };

        // Matches the reference errorPool.wait(), which always invokes its
        // stored cancel func on the way out: once every task has settled,
        // there is no further reason for this pool's handle (or anything
        // still watching it, e.g. a child pool) to remain live.
        self.handle.cancel();

        outcome
    }

    /// Current number of live workers. Monotonically grows up to `cap`
    /// over the pool's lifetime; workers are never torn down early to make
    /// room for others, only at `tasks_tx` closing or cancellation.
    pub fn size(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    fn spawn_worker(&self) {
        self.workers.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(worker::run(
            self.tasks_rx.clone(),
            self.handle.clone(),
            Arc::clone(&self.outstanding),
            Arc::clone(&self.idle_notify),
            Arc::clone(&self.error_latch),
            Arc::clone(&self.workers),
            Arc::clone(&self.workers_notify),
        ));
    }

    fn undo_outstanding(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle_notify.notify_one();
        }
    }
}
