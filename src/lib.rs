//! A least-loaded request balancer and a lazy, bounded, cancellable task pool.
//!
//! This crate ships two related concurrency primitives:
//!
//! - [`balancer`] — routes each incoming [`balancer::Request`] to whichever
//!   of a fixed set of worker agents currently has the fewest outstanding
//!   requests, using an indexed min-heap so dispatch and completion are both
//!   `O(log n)`.
//! - [`pool`] — an elastic [`pool::Pool`] that starts worker agents lazily
//!   (up to a configured cap), executes fallible async tasks, captures the
//!   first task error, and cancels the remaining work cooperatively.
//!
//! # Quick Start — Balancer
//!
//! ```no_run
//! use loadpool::balancer::{Balancer, BalancerConfig, Request};
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (requests_tx, requests_rx) = mpsc::channel(1);
//! let balancer = Balancer::<i64>::new(BalancerConfig::default());
//! tokio::spawn(balancer.run(requests_rx));
//!
//! let (request, result) = Request::new(|| 1 + 1);
//! requests_tx.send(request).await.unwrap();
//! assert_eq!(result.await.unwrap(), 2);
//! # }
//! ```
//!
//! # Quick Start — TaskPool
//!
//! ```no_run
//! use loadpool::pool::Pool;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (pool, _handle) = Pool::<String>::new(None, 5);
//! for i in 0..5 {
//!     pool.go(move || async move {
//!         println!("task {i} running");
//!         Ok(())
//!     }).await;
//! }
//! assert!(pool.wait().await.is_ok());
//! # }
//! ```
//!
//! # Module Organization
//!
//! This `lib.rs` file contains only the crate-level documentation and module
//! declarations; implementation lives in each submodule.
//!
//! - [`balancer`] — `Balancer`, `Request`, `BalancerConfig`, the indexed
//!   min-heap of workers.
//! - [`pool`] — `Pool`, `PoolHandle`, `PoolConfig`, `PoolError`.

pub mod balancer;
pub mod pool;

pub use balancer::{Balancer, BalancerConfig, BalancerError, Request};
pub use pool::{Pool, PoolConfig, PoolError, PoolHandle};
