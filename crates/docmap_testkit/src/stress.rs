//! Stress helpers for concurrent mapping.
//!
//! One mapper is shared by many threads; every thread runs independent
//! document round trips against it.

use crate::fixtures::{sample_gadget, Gadget, Widget};
use docmap_core::{doc, ObjectMapper};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total round trips attempted.
    pub total_ops: usize,
    /// Round trips that reproduced their input.
    pub successful_ops: usize,
    /// Round trips that failed or diverged.
    pub failed_ops: usize,
    /// Wall clock duration.
    pub duration: Duration,
    /// Round trips per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total round trips: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Round trips per thread.
    pub operations: usize,
    /// Number of threads sharing the mapper.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 8,
        }
    }
}

fn widget_round_trip(mapper: &ObjectMapper, thread: usize, i: usize) -> bool {
    let document = doc! {
        "_id" => format!("{thread}-{i}"),
        "name" => format!("widget {i}"),
        "tags" => vec![format!("t{thread}"), format!("n{i}")],
    };
    let Ok(widget) = mapper.from_document::<Widget>(&document) else {
        return false;
    };
    mapper
        .to_document(&widget)
        .map(|back| back == document)
        .unwrap_or(false)
}

fn gadget_round_trip(mapper: &ObjectMapper, gadget: &Gadget) -> bool {
    mapper
        .to_cbor(gadget)
        .and_then(|bytes| mapper.from_cbor::<Gadget>(&bytes))
        .map(|back| &back == gadget)
        .unwrap_or(false)
}

/// Runs widget and gadget round trips on `config.threads` threads at once.
pub fn stress_concurrent_mapping(mapper: Arc<ObjectMapper>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let mapper = Arc::clone(&mapper);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;

            thread::spawn(move || {
                let gadget = sample_gadget();
                for i in 0..operations {
                    let ok = if i % 2 == 0 {
                        widget_round_trip(&mapper, t, i)
                    } else {
                        gadget_round_trip(&mapper, &gadget)
                    };
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Stress thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::fixture_mapper;

    #[test]
    fn small_concurrent_run() {
        let mapper = Arc::new(fixture_mapper());
        let config = StressConfig {
            operations: 20,
            threads: 4,
        };
        let result = stress_concurrent_mapping(mapper, &config);
        assert_eq!(result.total_ops, 80);
        assert_eq!(result.failed_ops, 0);
    }
}
