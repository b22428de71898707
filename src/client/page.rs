// src/client/page.rs
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PageState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

/// Identifies one load request; only the newest ticket may update the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

struct Inner<T> {
    generation: u64,
    state: PageState<T>,
}

/// Loading state for one page. A response that arrives after a newer request
/// was started (navigation, reload) is dropped instead of overwriting the page.
pub struct PageLoader<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for PageLoader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for PageLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageLoader<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                state: PageState::Loading,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Start a request: the page goes back to `Loading` and older tickets go stale.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = PageState::Loading;
        Ticket(inner.generation)
    }

    /// Apply a result. Returns `false` (and changes nothing) for a stale ticket.
    pub fn finish<E: Display>(&self, ticket: Ticket, result: Result<T, E>) -> bool {
        let mut inner = self.lock();
        if ticket.0 != inner.generation {
            tracing::debug!(ticket = ticket.0, current = inner.generation, "dropping stale page result");
            return false;
        }
        inner.state = match result {
            Ok(v) => PageState::Ready(v),
            Err(e) => PageState::Failed(e.to_string()),
        };
        true
    }

    /// `begin`, await `fut`, `finish`.
    pub async fn load<F, E>(&self, fut: F) -> bool
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.begin();
        let result = fut.await;
        self.finish(ticket, result)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&PageState<T>) -> R) -> R {
        f(&self.lock().state)
    }
}

impl<T: Clone> PageLoader<T> {
    pub fn state(&self) -> PageState<T> {
        self.lock().state.clone()
    }
}
