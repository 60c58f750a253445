//! Utilities for waiting on long-running server-side operations.

use std::future::Future;
use std::result;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::errors::*;

/// Options controlling how long we wait and how often we check. This uses a
/// "builder" pattern, so you can write:
///
/// ```
/// use std::time::Duration;
/// use fuel_rest::wait::WaitOptions;
///
/// let options = WaitOptions::new("deploy cluster")
///     .timeout(Duration::from_secs(30 * 60))
///     .retry_interval(Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct WaitOptions {
    /// What we're waiting for, for use in timeout errors.
    description: String,

    /// How long to keep trying.
    timeout: Duration,

    /// How long between the start of one attempt and the start of the next.
    retry_interval: Duration,
}

impl WaitOptions {
    /// Wait for the thing named by `description`, checking once a second, for
    /// up to ten minutes.
    pub fn new<S: Into<String>>(description: S) -> Self {
        Self {
            description: description.into(),
            timeout: Duration::from_secs(10 * 60),
            retry_interval: Duration::from_secs(1),
        }
    }

    /// Give up after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often should we check? Defaults to once a second, which is dense
    /// compared to deployments that take minutes.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// What are we waiting for?
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Return this value from a `wait` callback.
#[derive(Debug)]
pub enum WaitStatus<T, E> {
    /// The task has finished.
    Finished(T),

    /// The task hasn't finished yet, so wait a while and try again.
    Waiting,

    /// The task has failed, and we should stop waiting right away.
    Failed(E),
}

/// Try `e`, and if it fails, stop our `wait` immediately.
#[macro_export]
macro_rules! try_wait {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => return $crate::wait::WaitStatus::Failed(e.into()),
        }
    };
}

/// Call `f` repeatedly until it returns `WaitStatus::Finished` or
/// `WaitStatus::Failed`, or until `options.timeout` elapses. Honors
/// `WaitOptions`.
///
/// `f` is called right away. After a `Waiting` result we sleep until one
/// `retry_interval` after the *start* of that attempt, so slow attempts do not
/// push the schedule back.
pub async fn wait<T, E, F, Fut>(options: &WaitOptions, mut f: F) -> result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WaitStatus<T, E>>,
    Error: Into<E>,
{
    let deadline = Instant::now() + options.timeout;
    trace!(
        "waiting for {} with timeout {:?}, interval {:?}",
        options.description,
        options.timeout,
        options.retry_interval,
    );
    let mut attempt_started = Instant::now();
    loop {
        match f().await {
            WaitStatus::Finished(value) => {
                trace!("wait for {} finished successfully", options.description);
                return Ok(value);
            }
            WaitStatus::Waiting => trace!("waiting some more"),
            WaitStatus::Failed(err) => {
                trace!("failure, giving up on wait for {}", options.description);
                return Err(err);
            }
        }

        // A deadline which has already passed ends the wait without another
        // sleep.
        if Instant::now() < deadline {
            sleep_until(attempt_started + options.retry_interval).await;
        }
        attempt_started = Instant::now();
        if attempt_started >= deadline {
            trace!("reached deadline {:?}, ending wait", deadline);
            return Err(Error::timeout(options.description.clone()).into());
        }
    }
}

/// Call `predicate` once a second until it returns `Ok(true)`, failing with
/// `Error::Timeout` if `timeout` elapses first. An `Err` from `predicate` ends
/// the poll immediately.
pub async fn poll<F, Fut>(description: &str, timeout: Duration, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let options = WaitOptions::new(description).timeout(timeout);
    wait(&options, || {
        let attempt = predicate();
        async move {
            if try_wait!(attempt.await) {
                WaitStatus::Finished(())
            } else {
                WaitStatus::Waiting
            }
        }
    })
    .await
}

#[tokio::test(start_paused = true)]
async fn poll_succeeds_on_nth_attempt() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let start = Instant::now();
    poll("third time lucky", Duration::from_secs(60), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move { Ok(n == 3) }
    })
    .await
    .unwrap();
    assert_eq!(calls.get(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn poll_times_out_within_one_interval_of_deadline() {
    let start = Instant::now();
    let err = poll("never", Duration::from_secs(5), || async { Ok(false) })
        .await
        .unwrap_err();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
    match err {
        Error::Timeout { description } => assert_eq!(description, "never"),
        other => panic!("unexpected error {}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_fails_after_one_attempt_without_sleeping() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let start = Instant::now();
    let err = poll("zero", Duration::from_secs(0), || {
        calls.set(calls.get() + 1);
        async { Ok(false) }
    })
    .await
    .unwrap_err();
    assert_eq!(calls.get(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(0));
    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn attempts_which_overrun_the_deadline_end_the_wait_at_once() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let start = Instant::now();
    let err = poll("slow", Duration::from_millis(2500), || {
        calls.set(calls.get() + 1);
        async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(false)
        }
    })
    .await
    .unwrap_err();
    assert_eq!(calls.get(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn poll_propagates_predicate_errors_without_sleeping() {
    let start = Instant::now();
    let err = poll("failing", Duration::from_secs(60), || async {
        Err(Error::missing_env_var("SOMETHING"))
    })
    .await
    .unwrap_err();
    assert_eq!(start.elapsed(), Duration::from_secs(0));
    assert!(matches!(err, Error::MissingEnvVar { .. }));
}

#[tokio::test(start_paused = true)]
async fn slow_attempts_do_not_drift_the_schedule() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let start = Instant::now();
    let options = WaitOptions::new("slow").timeout(Duration::from_secs(60));
    let value = wait::<_, Error, _, _>(&options, || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            if n == 4 {
                WaitStatus::Finished(n)
            } else {
                WaitStatus::Waiting
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(value, 4);
    assert_eq!(start.elapsed(), Duration::from_millis(3300));
}
