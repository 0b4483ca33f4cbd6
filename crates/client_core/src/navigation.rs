use std::sync::Mutex;

use url::Url;

pub trait PageNavigator: Send + Sync {
    fn current_url(&self) -> Url;
    fn navigate(&self, url: Url);
    fn reload(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Navigated(Url),
    Reloaded(Url),
}

/// Keeps the current address and a log of what was requested.
#[derive(Debug)]
pub struct InMemoryNavigator {
    inner: Mutex<InMemoryNavigatorState>,
}

#[derive(Debug)]
struct InMemoryNavigatorState {
    current: Url,
    history: Vec<NavigationEvent>,
}

impl InMemoryNavigator {
    pub fn new(start: Url) -> Self {
        Self {
            inner: Mutex::new(InMemoryNavigatorState {
                current: start,
                history: Vec::new(),
            }),
        }
    }

    pub fn history(&self) -> Vec<NavigationEvent> {
        self.lock().history.clone()
    }

    pub fn reload_count(&self) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|event| matches!(event, NavigationEvent::Reloaded(_)))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryNavigatorState> {
        // State is plain data; a panic elsewhere cannot leave it half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PageNavigator for InMemoryNavigator {
    fn current_url(&self) -> Url {
        self.lock().current.clone()
    }

    fn navigate(&self, url: Url) {
        let mut state = self.lock();
        state.current = url.clone();
        state.history.push(NavigationEvent::Navigated(url));
    }

    fn reload(&self) {
        let mut state = self.lock();
        let current = state.current.clone();
        state.history.push(NavigationEvent::Reloaded(current));
    }
}
