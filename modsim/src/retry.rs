use std::time::Duration;

/// Controls how long the server waits before re-opening a serial port
pub trait RetryStrategy: Send {
    /// Reset internal state. Called when the port is opened
    fn reset(&mut self);
    /// Return the next delay before making another open attempt
    fn after_failed_connect(&mut self) -> Duration;
    /// Return the delay to wait after an open port fails before re-opening it
    fn after_disconnect(&mut self) -> Duration;
}

/// Return the default [`RetryStrategy`]: 1 second doubling up to 1 minute
pub fn default_retry_strategy() -> Box<dyn RetryStrategy> {
    doubling_retry_strategy(Duration::from_secs(1), Duration::from_secs(60))
}

/// Return a [`RetryStrategy`] that doubles on failure up to a maximum value
pub fn doubling_retry_strategy(min: Duration, max: Duration) -> Box<dyn RetryStrategy> {
    Box::new(Doubling::new(min, max))
}

/// Return a [`RetryStrategy`] that always waits the same amount of time
pub fn fixed_retry_strategy(delay: Duration) -> Box<dyn RetryStrategy> {
    Box::new(Doubling::new(delay, delay))
}

struct Doubling {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Doubling {
    fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Doubling {
            min,
            max,
            current: min,
        }
    }
}

impl RetryStrategy for Doubling {
    fn reset(&mut self) {
        self.current = self.min;
    }

    fn after_failed_connect(&mut self) -> Duration {
        let ret = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        ret
    }

    fn after_disconnect(&mut self) -> Duration {
        self.min
    }
}
