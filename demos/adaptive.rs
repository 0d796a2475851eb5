//! # Example: adaptive
//!
//! Publishes bursts of slow events through an [`AdaptivePoolRunner`] and
//! prints the worker count as the pool scales up under pressure and back
//! down once the queue drains.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example adaptive
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventcast::{AdaptiveConfig, AdaptivePoolRunner, Broker, Runner};

#[derive(Debug)]
struct ImageUploaded {
    name: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AdaptiveConfig {
        check_interval: Duration::from_millis(50),
        queue_depth_threshold: 2,
        cycles_before_grow: 2,
        cycles_before_shrink: 4,
        max_workers: 4,
    };
    let runner = Arc::new(AdaptivePoolRunner::new(config)?);
    let broker = Broker::new(Arc::clone(&runner) as Arc<dyn Runner>);

    // A deliberately slow handler so the queue backs up.
    broker.subscribe_fn(|image: &ImageUploaded| {
        std::thread::sleep(Duration::from_millis(5));
        log::info!("processed {}", image.name);
    });

    // Burst: far more events than one worker can keep up with.
    for i in 0..200 {
        broker
            .publish(ImageUploaded {
                name: format!("img-{i:03}.png"),
            })
            .await;
    }

    // Watch the pool react.
    for _ in 0..30 {
        println!(
            "workers={} queued={}",
            runner.worker_count(),
            runner.queue_depth()
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        if runner.queue_depth() == 0 && runner.worker_count() == 1 {
            break;
        }
    }

    broker.shutdown().await;
    Ok(())
}
