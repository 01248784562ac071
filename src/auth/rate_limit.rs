use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Failed-login tracker keyed by an arbitrary string (peer IP plus normalized email).
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    /// Check if the given key is rate-limited. Returns true if blocked.
    /// Also lazily cleans up stale entries for the checked key.
    pub fn is_blocked(&self, key: &str) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return map.get(key).is_some_and(|t| t.len() >= self.max_attempts);
        };

        match map.get_mut(key) {
            Some(timestamps) => {
                timestamps.retain(|t| *t > cutoff);
                if timestamps.is_empty() {
                    map.remove(key);
                    false
                } else {
                    timestamps.len() >= self.max_attempts
                }
            }
            None => false,
        }
    }

    pub fn record_failure(&self, key: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(key.to_string()).or_default().push(Instant::now());
    }

    /// Forget a key's failures (on successful login).
    pub fn clear(&self, key: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }
}
