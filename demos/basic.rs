//! # Example: basic
//!
//! Minimal publish/subscribe round trip on a fixed two-worker pool.
//!
//! Demonstrates how to:
//! - Subscribe a closure with [`Broker::subscribe_fn`].
//! - Subscribe a fallible [`FnHandler`] with a filter and error callback.
//! - Publish typed events and shut the broker down cleanly.
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventcast::{Broker, FixedPoolRunner, FnHandler, HandlerError};

#[derive(Debug)]
struct OrderPlaced {
    id: u64,
    amount_cents: u64,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // 1. Pick an execution strategy: two pool workers over a shared queue.
    let broker = Broker::new(Arc::new(FixedPoolRunner::new(2)?));

    // 2. A plain closure subscriber.
    broker.subscribe_fn(|order: &OrderPlaced| {
        println!("[ship] scheduling order {}", order.id);
    });

    // 3. A fallible handler that only cares about large orders.
    let audit = FnHandler::fallible(|order: &OrderPlaced| {
        if order.amount_cents == 0 {
            return Err(HandlerError::fail("zero-amount order"));
        }
        println!("[audit] order {} for {} cents", order.id, order.amount_cents);
        Ok(())
    })
    .with_filter(|order| order.amount_cents >= 10_000)
    .with_on_error(|error, order| eprintln!("[audit] order {} rejected: {error}", order.id));
    broker.subscribe(Arc::new(audit));

    // 4. Publish a few events; handlers run on the pool workers.
    broker.publish(OrderPlaced { id: 1, amount_cents: 500 }).await;
    broker.publish(OrderPlaced { id: 2, amount_cents: 25_000 }).await;
    broker.publish(OrderPlaced { id: 3, amount_cents: 0 }).await;

    // 5. Let the pool drain, then stop it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    broker.shutdown().await;
    Ok(())
}
