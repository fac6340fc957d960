//! Blocking result sources.

use std::sync::mpsc;

/// A channel-like source the aggregator pulls results from.
///
/// `next_result` blocks until a value arrives and returns `None` once every
/// sender is gone and the buffer is drained.
pub trait ResultSource {
    type Item;

    fn next_result(&mut self) -> Option<Self::Item>;
}

impl<S: ResultSource + ?Sized> ResultSource for &mut S {
    type Item = S::Item;

    fn next_result(&mut self) -> Option<Self::Item> {
        (**self).next_result()
    }
}

impl<T> ResultSource for mpsc::Receiver<T> {
    type Item = T;

    fn next_result(&mut self) -> Option<T> {
        self.recv().ok()
    }
}

/// Panics if called from within an async runtime, like
/// [`tokio::sync::mpsc::Receiver::blocking_recv`].
#[cfg(feature = "tokio")]
impl<T> ResultSource for tokio::sync::mpsc::Receiver<T> {
    type Item = T;

    fn next_result(&mut self) -> Option<T> {
        self.blocking_recv()
    }
}

#[cfg(feature = "tokio")]
impl<T> ResultSource for tokio::sync::mpsc::UnboundedReceiver<T> {
    type Item = T;

    fn next_result(&mut self) -> Option<T> {
        self.blocking_recv()
    }
}
