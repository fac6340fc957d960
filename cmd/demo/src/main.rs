//! errstack walkthrough
//!
//! Builds an error three calls deep, wraps it on the way out, prints it
//! as text and JSON, then fans out a few producers and folds their
//! results into one error.
//!
//! # Environment Variables
//!
//! - `ERRSTACK_LOG=debug` - Log filter (default `info`); `trace` also shows
//!   stack captures

use std::thread;

use anyhow::{anyhow, Context};
use errstack::{err, Error, ResultExt};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ERRSTACK_LOG=debug cargo run -p errstack-demo

fn baz() -> Option<Error> {
    errstack::new(Some("foobar"))
}

fn bar() -> Option<Error> {
    errstack::wrap(baz(), "EOF")
}

fn foo() -> Option<Error> {
    errstack::wrap(bar(), "water buffalo")
}

fn read_settings(path: &str) -> errstack::Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path))
}

fn shard(id: usize) -> errstack::Result<()> {
    if id % 2 == 1 {
        return Err(err!("shard {} unavailable", id).with_meta([("shard", id)]));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ERRSTACK_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== errstack demo ===\n");

    // Wrapped three times; the stack still points at baz.
    let err = foo()
        .ok_or_else(|| anyhow!("foo returned no error"))?
        .with_meta([("request", 42)]);
    println!("message: {}", err);
    println!("stack:");
    for frame in err.stack() {
        println!("  {}", frame);
    }
    println!("json:\n{}\n", err.to_json_pretty()?);
    info!(matches_root = err.is(&Error::plain("foobar")), "checked cause chain");

    // Foreign cause, annotated after the fact.
    let path = "/nonexistent/errstack.toml";
    match read_settings(path) {
        Ok(text) => info!(bytes = text.len(), "settings loaded"),
        Err(err) => {
            let err = err.with_meta([("config", json!({ "path": path, "optional": true }))]);
            println!("settings: {}", err.to_json()?);
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                warn!(kind = ?io.kind(), "settings unavailable, using defaults");
            }
        }
    }

    // Fan out, then fold every failure into one error.
    let (tx, rx) = tokio::sync::mpsc::channel(1);
    let producers: Vec<_> = (0..4)
        .map(|id| {
            let tx = tx.clone();
            thread::spawn(move || tx.blocking_send(shard(id)))
        })
        .collect();
    drop(tx);

    let combined = errstack_await::await_errors(rx, producers.len());
    for producer in producers {
        producer
            .join()
            .map_err(|_| anyhow!("producer panicked"))?
            .context("sending shard result")?;
    }
    match combined {
        Ok(()) => println!("\nshards: all healthy"),
        Err(err) => println!("\nshards: {}", err),
    }

    Ok(())
}
