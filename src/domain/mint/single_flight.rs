//! Per-identity single-flight guard.

use dashmap::DashSet;
use std::sync::Arc;

/// Tracks which identities currently have a mint running.
#[derive(Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<DashSet<String>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or returns `None` if it is already claimed.
    ///
    /// The claim lasts until the returned guard is dropped.
    pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
        if self.in_flight.insert(key.to_string()) {
            Some(FlightGuard {
                in_flight: self.in_flight.clone(),
                key: key.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }
}

/// Releases its key on drop.
pub struct FlightGuard {
    in_flight: Arc<DashSet<String>>,
    key: String,
}

impl FlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_key_is_rejected() {
        let flights = SingleFlight::new();
        let guard = flights.try_acquire("a@x.com").unwrap();
        assert_eq!(guard.key(), "a@x.com");
        assert!(flights.try_acquire("a@x.com").is_none());
        assert!(flights.is_in_flight("a@x.com"));
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let flights = SingleFlight::new();
        let _a = flights.try_acquire("a@x.com").unwrap();
        assert!(flights.try_acquire("b@x.com").is_some());
    }

    #[test]
    fn dropping_the_guard_releases_the_key() {
        let flights = SingleFlight::new();
        drop(flights.try_acquire("a@x.com").unwrap());
        assert!(!flights.is_in_flight("a@x.com"));
        assert!(flights.try_acquire("a@x.com").is_some());
    }
}
