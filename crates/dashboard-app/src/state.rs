//! Load state shared by every view
//!
//! A view slot moves `Idle -> Loading -> Ready | Failed` and goes back to
//! `Loading` whenever the thing it shows changes. [`Loadable`] owns the
//! in-flight task for the slot so a superseded request is aborted, and the
//! request id makes sure a completion that still slips through is ignored.

use std::fmt;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Identifies one fetch; unique for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a view slot is in its load cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// The message shown in place of the content
    Failed(String),
}

/// What [`Loadable::resolve`] did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug)]
struct Pending {
    id: RequestId,
    task: Option<AbortHandle>,
}

/// A view slot plus the fetch that fills it
#[derive(Debug)]
pub struct Loadable<T> {
    label: &'static str,
    state: LoadState<T>,
    pending: Option<Pending>,
}

impl<T> Loadable<T> {
    /// `label` names the slot in logs
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            state: LoadState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Id of the fetch whose result the slot is waiting for
    pub fn pending_id(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Enter `Loading` for request `id`, aborting whatever was in flight
    pub fn begin(&mut self, id: RequestId) {
        self.cancel();
        debug!(slot = self.label, request = %id, "load started");
        self.state = LoadState::Loading;
        self.pending = Some(Pending { id, task: None });
    }

    /// Hand the slot the task serving request `id`.
    ///
    /// A task for a request the slot no longer waits for is aborted at once.
    pub fn track(&mut self, id: RequestId, task: AbortHandle) {
        match &mut self.pending {
            Some(pending) if pending.id == id => pending.task = Some(task),
            _ => task.abort(),
        }
    }

    /// Apply the outcome of request `id`
    pub fn resolve<E: fmt::Display>(
        &mut self,
        id: RequestId,
        result: std::result::Result<T, E>,
    ) -> Resolution {
        if self.pending_id() != Some(id) {
            debug!(slot = self.label, request = %id, "discarding stale response");
            return Resolution::Stale;
        }
        self.pending = None;

        self.state = match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => {
                warn!(slot = self.label, request = %id, error = %e, "load failed");
                LoadState::Failed(e.to_string())
            }
        };
        Resolution::Applied
    }

    /// Abort the in-flight fetch, keeping whatever is shown
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(slot = self.label, request = %pending.id, "load cancelled");
            if let Some(task) = pending.task {
                task.abort();
            }
        }
    }

    /// Back to `Idle`
    pub fn reset(&mut self) {
        self.cancel();
        self.state = LoadState::Idle;
    }
}

impl<T> Drop for Loadable<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_cycle() {
        let mut slot: Loadable<u32> = Loadable::new("numbers");
        assert_eq!(slot.state(), &LoadState::Idle);

        slot.begin(RequestId::new(1));
        assert!(slot.is_loading());

        assert_eq!(
            slot.resolve::<String>(RequestId::new(1), Ok(7)),
            Resolution::Applied
        );
        assert_eq!(slot.value(), Some(&7));
        assert!(!slot.is_loading());
    }

    #[test]
    fn test_failure_keeps_message() {
        let mut slot: Loadable<u32> = Loadable::new("numbers");
        slot.begin(RequestId::new(1));
        slot.resolve(RequestId::new(1), Err("HTTP 500 from /stocks"));
        assert_eq!(slot.error(), Some("HTTP 500 from /stocks"));
        assert_eq!(slot.value(), None);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut slot: Loadable<&str> = Loadable::new("history");
        slot.begin(RequestId::new(1));
        slot.begin(RequestId::new(2));

        assert_eq!(
            slot.resolve::<String>(RequestId::new(1), Ok("AAPL")),
            Resolution::Stale
        );
        assert!(slot.is_loading());

        assert_eq!(
            slot.resolve::<String>(RequestId::new(2), Ok("MSFT")),
            Resolution::Applied
        );
        assert_eq!(slot.value(), Some(&"MSFT"));

        // Already resolved, a duplicate completion changes nothing
        assert_eq!(
            slot.resolve::<String>(RequestId::new(2), Ok("AAPL")),
            Resolution::Stale
        );
        assert_eq!(slot.value(), Some(&"MSFT"));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut slot: Loadable<u32> = Loadable::new("numbers");
        slot.begin(RequestId::new(3));
        slot.reset();
        assert_eq!(slot.state(), &LoadState::Idle);
        assert_eq!(
            slot.resolve::<String>(RequestId::new(3), Ok(1)),
            Resolution::Stale
        );
    }

    #[tokio::test]
    async fn test_begin_aborts_previous_task() {
        let mut slot: Loadable<u32> = Loadable::new("numbers");
        slot.begin(RequestId::new(1));
        let first = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        slot.track(RequestId::new(1), first.abort_handle());

        slot.begin(RequestId::new(2));
        let err = first.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let handle = {
            let mut slot: Loadable<u32> = Loadable::new("numbers");
            slot.begin(RequestId::new(1));
            let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
            slot.track(RequestId::new(1), task.abort_handle());
            task
        };
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_track_for_old_request_aborts() {
        let mut slot: Loadable<u32> = Loadable::new("numbers");
        slot.begin(RequestId::new(2));
        let late = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        slot.track(RequestId::new(1), late.abort_handle());
        assert!(late.await.unwrap_err().is_cancelled());
    }
}
