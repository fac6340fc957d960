//! # errstack-await: collect errors from concurrent producers
//!
//! Fan out `count` tasks that each send one `Result` into a shared channel,
//! then drain the channel into a single [`errstack::Error`]:
//!
//! ```rust
//! use std::sync::mpsc;
//! use std::thread;
//!
//! let (tx, rx) = mpsc::channel();
//! for shard in 0..4 {
//!     let tx = tx.clone();
//!     thread::spawn(move || {
//!         let res = if shard % 2 == 1 {
//!             Err(errstack::Error::new(format!("shard {} failed", shard)))
//!         } else {
//!             Ok(())
//!         };
//!         tx.send(res).ok();
//!     });
//! }
//!
//! let err = errstack_await::await_errors(rx, 4).unwrap_err();
//! assert!(err.to_string().contains("shard 1 failed"));
//! assert!(err.to_string().contains("shard 3 failed"));
//! ```
//!
//! ## Ordering
//!
//! Failures are folded in **arrival order** on the channel, not in the
//! order producers were started. When producers race, the combined message
//! differs between runs.
//!
//! ## Blocking
//!
//! The drain receives exactly `count` results and never returns early on
//! a failure, so every producer's send completes. There is no timeout:
//! if fewer than `count` producers ever send while a sender is still
//! alive, the call blocks forever. Wrap the receive side in your own
//! deadline if you need one. A channel whose senders are all dropped
//! counts each missing result as a success.
//!
//! ## Feature Flags
//!
//! | Flag    | Effect |
//! |---------|--------|
//! | `tokio` | [`ResultSource`] for tokio mpsc receivers, plus [`await_errors_async`] (default) |
//!
//! The combined error's stack, when one is captured while folding, starts
//! at the caller of [`await_errors`], not inside this crate.

mod collector;
mod source;

pub use collector::Collector;
pub use source::ResultSource;

use errstack::{Error, Origin};
use tracing::warn;

/// Receive exactly `count` results from `source` and fold the failures.
///
/// Returns `Ok(())` when every result was `Ok`.
pub fn await_errors<S, T, E>(mut source: S, count: usize) -> Result<(), Error>
where
    S: ResultSource<Item = Result<T, E>>,
    E: Into<Origin>,
{
    let mut collector = Collector::new();
    while collector.received() < count {
        match source.next_result() {
            Some(result) => collector.push(result),
            None => {
                warn_closed(collector.received(), count);
                break;
            }
        }
    }
    collector.finish()
}

/// [`await_errors`] for a tokio receiver, awaiting instead of blocking.
#[cfg(feature = "tokio")]
pub async fn await_errors_async<T, E>(
    rx: &mut tokio::sync::mpsc::Receiver<Result<T, E>>,
    count: usize,
) -> Result<(), Error>
where
    E: Into<Origin>,
{
    let mut collector = Collector::new();
    while collector.received() < count {
        match rx.recv().await {
            Some(result) => collector.push(result),
            None => {
                warn_closed(collector.received(), count);
                break;
            }
        }
    }
    collector.finish()
}

fn warn_closed(received: usize, expected: usize) {
    warn!(
        received,
        expected,
        "result channel closed early, treating missing results as success"
    );
}
