use errstack::{Error, Origin};
use tracing::debug;

/// Incremental fold of producer results into one error.
///
/// `Ok` results are counted and otherwise ignored. The first failure
/// becomes the base; every later failure wraps the accumulated error with
/// its own text, so the combined message lists failures in the order they
/// were pushed.
///
/// ```
/// use errstack_await::Collector;
///
/// let mut collector = Collector::new();
/// collector.push(Ok::<(), &str>(()));
/// collector.push(Err::<(), _>("a"));
/// collector.push(Err::<(), _>("b"));
/// let err = collector.finish().unwrap_err();
/// assert_eq!(err.to_string(), "a:b");
/// ```
#[derive(Debug, Default)]
pub struct Collector {
    acc: Option<Origin>,
    received: usize,
    failed: usize,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one producer result.
    pub fn push<T, E>(&mut self, result: Result<T, E>)
    where
        E: Into<Origin>,
    {
        self.received += 1;
        if let Err(err) = result {
            self.push_error(err);
        }
    }

    /// Record one failure.
    pub fn push_error(&mut self, err: impl Into<Origin>) {
        let err = err.into();
        self.failed += 1;
        debug!(failed = self.failed, error = %err, "folding producer error");

        // The base stays in its original form until a second failure
        // arrives, so a foreign first error is kept as the cause.
        self.acc = Some(match self.acc.take() {
            None => err,
            Some(acc) => Origin::Error(Error::caused_by(acc, err.to_string())),
        });
    }

    /// Results pushed so far, successes included.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Failures pushed so far.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The combined error, or `Ok(())` if nothing failed.
    pub fn finish(self) -> Result<(), Error> {
        match self.acc {
            None => Ok(()),
            Some(acc) => Err(Error::plain(acc)),
        }
    }
}
