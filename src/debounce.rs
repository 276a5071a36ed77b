//! Trailing-edge debouncing of a handler onto the tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period used by the search input.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Delays a handler until calls have been quiet for `delay`.
///
/// Each `call` replaces the pending invocation, so a burst of calls runs the
/// handler once with the last arguments. Dropping the debouncer cancels the
/// pending invocation. Must be used from within a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    handler: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, handler: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            handler: Arc::new(handler),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `handler(args)`, discarding any call still waiting.
    pub fn call(&mut self, args: T) {
        self.cancel();

        let handler = Arc::clone(&self.handler);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handler(args);
        }));
    }

    /// Cancels the pending invocation. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn recording() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |q: String| sink.lock().unwrap().push(q))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_value() {
        let (calls, handler) = recording();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY, handler);

        for q in ["o", "oc", "oct", "octo"] {
            debouncer.call(q.to_string());
            sleep(Duration::from_millis(100)).await;
        }
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(250)).await;
        assert_eq!(*calls.lock().unwrap(), ["octo"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_full_delay() {
        let (calls, handler) = recording();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY, handler);

        debouncer.call("a".to_string());
        sleep(Duration::from_millis(299)).await;
        assert!(calls.lock().unwrap().is_empty());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(*calls.lock().unwrap(), ["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_calls_fire_separately() {
        let (calls, handler) = recording();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY, handler);

        debouncer.call("first".to_string());
        sleep(Duration::from_millis(400)).await;
        debouncer.call(String::new());
        sleep(Duration::from_millis(400)).await;

        assert_eq!(*calls.lock().unwrap(), ["first", ""]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_prevent_invocation() {
        let (calls, handler) = recording();
        let mut debouncer = Debouncer::new(DEFAULT_DELAY, handler);

        debouncer.call("cancelled".to_string());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        debouncer.call("dropped".to_string());
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
