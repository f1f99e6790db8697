//! MD5-of-Directory-Tree — Pool-Backed Pipeline
//!
//! Walks a directory tree and computes the MD5 digest of every regular
//! file under it, bounding concurrency with a [`Pool`] instead of the
//! reference implementation's fixed `numDigesters` goroutine fan-out. This
//! exercises the pool's lazy growth (workers only spin up as files are
//! actually found) and its cancel-on-first-error behavior (a single
//! unreadable file stops the walk for everyone else).
//!
//! Run with: cargo run --example md5_tree -- <directory>

#![expect(
    clippy::expect_used,
    reason = "expect is acceptable in example code for demonstration purposes"
)]
#![expect(
    clippy::unwrap_used,
    reason = "unwrap is acceptable in example code for demonstration purposes"
)]

use loadpool::Pool;
use md5::{Digest, Md5};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc;

type Sums = Arc<std::sync::Mutex<BTreeMap<String, [u8; 16]>>>;

#[derive(Debug, Clone)]
struct WalkError(String);

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let root = env::args().nth(1).unwrap_or_else(|| ".".to_string());
    println!("=== MD5 Tree Demo ===\n");
    println!("1. Walking {root}...");

    let (paths_tx, mut paths_rx) = mpsc::channel::<String>(32);
    let walk_root = root.clone();
    let walker = tokio::task::spawn_blocking(move || {
        for entry in walkdir::WalkDir::new(&walk_root)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file() {
                let path = entry.path().display().to_string();
                if paths_tx.blocking_send(path).is_err() {
                    break;
                }
            }
        }
    });

    println!("2. Digesting files through a bounded pool (cap = {})...", num_cpus::get() * 2);
    let (pool, _handle) = Pool::<WalkError>::new(None, num_cpus::get() * 2);
    let sums: Sums = Arc::new(std::sync::Mutex::new(BTreeMap::new()));

    while let Some(path) = paths_rx.recv().await {
        let sums = Arc::clone(&sums);
        pool.go(move || async move {
            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| WalkError(format!("{path}: {e}")))?;
            let digest = Md5::digest(&data);
            sums.lock().unwrap().insert(path, digest.into());
            Ok(())
        })
        .await;
    }

    walker.await.expect("walker task panicked");

    match pool.wait().await {
        Ok(()) => {
            let sums = sums.lock().unwrap();
            println!("\n3. Digested {} files:", sums.len());
            for (path, sum) in sums.iter() {
                println!("   {} = {:x}", path, Bytes(sum));
            }
        }
        Err(err) => println!("\n3. Failed: {err}"),
    }

    println!("\n=== Demo Complete ===");
}

struct Bytes<'a>(&'a [u8; 16]);

impl std::fmt::LowerHex for Bytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
