//! Least-Loaded Balancer — Request Generator
//!
//! Spins up a balancer with one worker per CPU, then feeds it a stream of
//! requests with randomized inter-arrival delays, mirroring the reference
//! generator's "sometimes the request lands, sometimes the prior result
//! arrives first" race between submission and collection.
//!
//! Run with: cargo run --example balancer

use loadpool::{Balancer, BalancerConfig, Request};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Simulated unit of work: block the worker for a random short interval,
/// then return a fixed value. Each balancer worker has exactly one job in
/// flight at a time, so a blocking sleep here behaves exactly like the
/// reference `job()`'s synchronous `time.Sleep` — it occupies one worker,
/// not the whole runtime.
fn job() -> i64 {
    let mut rng = SmallRng::from_entropy();
    let delay = Duration::from_millis(rng.gen_range(0..4_000));
    thread::sleep(delay);
    1
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Least-Loaded Balancer Demo ===\n");
    println!("1. Starting balancer with {} workers...", num_cpus::get());

    let (requests_tx, requests_rx) = mpsc::channel(1);
    let balancer = Balancer::<i64>::new(BalancerConfig::default());
    tokio::spawn(balancer.run(requests_rx));

    println!("2. Generating requests...\n");
    let mut rng = SmallRng::from_entropy();
    let mut completed = 0;
    while completed < 20 {
        let delay = Duration::from_millis(250 + rng.gen_range(0..1_000));
        sleep(delay).await;

        let (request, result) = Request::new(job);

        if requests_tx.send(request).await.is_err() {
            println!("balancer gone, stopping");
            break;
        }

        match result.await {
            Ok(value) => {
                completed += 1;
                println!("   request {completed} completed with value {value}");
            }
            Err(_) => println!("   a request's result was dropped"),
        }
    }

    println!("\n=== Demo Complete: {completed} requests served ===");
}
