//! Session-lifetime cache of every resource across all subscriptions
//!
//! States move `Empty -> Loading -> Loaded` exactly once and never return to
//! `Empty` within a session.

use std::sync::{Arc, Condvar, Mutex};

use log::debug;

use crate::models::Resource;

enum CacheState {
    Empty,
    Loading,
    Loaded(Arc<Vec<Resource>>),
}

/// Observable cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Loading,
    Loaded { resources: usize },
}

/// Lazily-filled cache of the cross-subscription aggregate
pub struct AggregationCache {
    state: Mutex<CacheState>,
    ready: Condvar,
}

impl AggregationCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::Empty),
            ready: Condvar::new(),
        }
    }

    pub fn status(&self) -> CacheStatus {
        match &*self.state.lock().unwrap() {
            CacheState::Empty => CacheStatus::Empty,
            CacheState::Loading => CacheStatus::Loading,
            CacheState::Loaded(data) => CacheStatus::Loaded {
                resources: data.len(),
            },
        }
    }

    /// The loaded aggregate, if loading has completed
    pub fn get(&self) -> Option<Arc<Vec<Resource>>> {
        match &*self.state.lock().unwrap() {
            CacheState::Loaded(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    /// Return the aggregate, running `load` only if nothing was loaded yet
    ///
    /// Callers arriving while another caller is loading block until that
    /// load completes and share its result.
    pub fn get_or_load<F>(&self, load: F) -> Arc<Vec<Resource>>
    where
        F: FnOnce() -> Vec<Resource>,
    {
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                CacheState::Loaded(data) => return Arc::clone(data),
                CacheState::Loading => {
                    debug!("Waiting for in-flight aggregation");
                    state = self.ready.wait(state).unwrap();
                }
                CacheState::Empty => break,
            }
        }

        *state = CacheState::Loading;
        drop(state);

        let data = Arc::new(load());

        let mut state = self.state.lock().unwrap();
        *state = CacheState::Loaded(Arc::clone(&data));
        self.ready.notify_all();
        data
    }
}

impl Default for AggregationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;

    fn make_resource(n: usize) -> Resource {
        Resource::new(format!("/r{}", n), format!("r{}", n), "t", "rg", "eastus", "s1")
    }

    #[test]
    fn test_loads_once() {
        let cache = AggregationCache::new();
        assert_eq!(cache.status(), CacheStatus::Empty);
        assert!(cache.get().is_none());

        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let data = cache.get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![make_resource(1), make_resource(2)]
            });
            assert_eq!(data.len(), 2);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.status(), CacheStatus::Loaded { resources: 2 });
    }

    #[test]
    fn test_empty_result_stays_loaded() {
        let cache = AggregationCache::new();
        cache.get_or_load(Vec::new);
        assert_eq!(cache.status(), CacheStatus::Loaded { resources: 0 });
        let data = cache.get_or_load(|| panic!("must not reload"));
        assert!(data.is_empty());
    }

    #[test]
    fn test_loading_is_observable_and_shared() {
        let cache = Arc::new(AggregationCache::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let loader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load(|| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    vec![make_resource(1)]
                })
            })
        };

        started_rx.recv().unwrap();
        assert_eq!(cache.status(), CacheStatus::Loading);

        let waiter = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get_or_load(|| panic!("second load")))
        };

        release_tx.send(()).unwrap();
        assert_eq!(loader.join().unwrap().len(), 1);
        assert_eq!(waiter.join().unwrap().len(), 1);
        assert_eq!(cache.status(), CacheStatus::Loaded { resources: 1 });
    }
}
