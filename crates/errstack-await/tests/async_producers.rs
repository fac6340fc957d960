//! Draining tokio channels, blocking and async.

use std::thread;

use errstack::Error;
use errstack_await::{await_errors, await_errors_async};

fn run_shard(shard: usize) -> Result<usize, Error> {
    if shard % 3 == 0 {
        Err(Error::new(format!("shard{}", shard)))
    } else {
        Ok(shard)
    }
}

#[test]
fn blocking_drain_of_tokio_channel() {
    let (tx, rx) = tokio::sync::mpsc::channel(1);
    let producer = thread::spawn(move || {
        for shard in 0..4 {
            tx.blocking_send(run_shard(shard)).unwrap();
        }
    });
    let err = await_errors(rx, 4).unwrap_err();
    producer.join().unwrap();
    assert_eq!(err.to_string(), "shard0:shard3");
}

#[test]
fn blocking_drain_of_unbounded_channel() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tx.send(Err::<(), _>("left")).unwrap();
    tx.send(Ok(())).unwrap();
    tx.send(Err("right")).unwrap();
    drop(tx);
    assert_eq!(await_errors(rx, 3).unwrap_err().to_string(), "left:right");
}

#[tokio::test]
async fn async_drain_in_send_order() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    tx.send(Ok(())).await.unwrap();
    tx.send(Err(Error::plain("a"))).await.unwrap();
    tx.send(Ok(())).await.unwrap();
    tx.send(Err(Error::plain("b"))).await.unwrap();

    let err = await_errors_async(&mut rx, 4).await.unwrap_err();
    assert_eq!(err.to_string(), "a:b");
}

#[tokio::test]
async fn async_all_success() {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<(), Error>>(4);
    for _ in 0..4 {
        tx.send(Ok(())).await.unwrap();
    }
    drop(tx);
    assert!(await_errors_async(&mut rx, 4).await.is_ok());
}

#[tokio::test]
async fn async_closed_channel_counts_as_success() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(2);
    tx.send(Err::<(), _>(Error::plain("lone"))).await.unwrap();
    drop(tx);
    let err = await_errors_async(&mut rx, 3).await.unwrap_err();
    assert_eq!(err.to_string(), "lone");
}
