//! RAII guard for the searching/comparing flags.
//!
//! The store raises the flag when a request begins. The guard lowers it
//! when dropped, whether the request completed, failed, panicked or was
//! cancelled, so the flag can never stay stuck at true.

use tracing::{debug, warn};

use crate::error::QueryKind;
use crate::store::StateStore;

/// Guard owning the in-flight flag of one request ticket.
///
/// A guard whose ticket has been superseded leaves the flag alone on drop,
/// since the newer request now owns it.
///
/// # Example
///
/// ```ignore
/// let ticket = store.begin_search(job, location);
/// let guard = InFlightGuard::new(store.clone(), QueryKind::Search, ticket);
/// // ... call the completion service and publish ...
/// guard.release(); // or just let it drop
/// ```
pub struct InFlightGuard {
    store: StateStore,
    kind: QueryKind,
    ticket: u64,
    released: bool,
}

impl InFlightGuard {
    pub fn new(store: StateStore, kind: QueryKind, ticket: u64) -> Self {
        debug!(kind = %kind, ticket, "In-flight guard created");

        Self {
            store,
            kind,
            ticket,
            released: false,
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// True while no newer request of the same kind has started
    pub fn is_current(&self) -> bool {
        self.store.current_ticket(self.kind) == self.ticket
    }

    /// Lower the flag now instead of at scope end.
    pub fn release(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.released {
            self.store.finish(self.kind, self.ticket);
            self.released = true;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(
                kind = %self.kind,
                ticket = self.ticket,
                "In-flight guard dropped during panic - clearing flag"
            );
        } else if !self.released {
            debug!(kind = %self.kind, ticket = self.ticket, "In-flight guard dropped");
        }

        self.finish();
    }
}

impl std::fmt::Debug for InFlightGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightGuard")
            .field("kind", &self.kind)
            .field("ticket", &self.ticket)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use events::EventBus;

    use super::*;

    fn store() -> StateStore {
        StateStore::new(EventBus::new())
    }

    #[test]
    fn test_drop_lowers_flag() {
        let store = store();
        let ticket = store.begin_search("nurse", "Boston");
        assert!(store.is_searching());

        {
            let guard = InFlightGuard::new(store.clone(), QueryKind::Search, ticket);
            assert!(guard.is_current());
            assert_eq!(guard.kind(), QueryKind::Search);
            assert_eq!(guard.ticket(), ticket);
        }

        assert!(!store.is_searching());
    }

    #[test]
    fn test_release_lowers_flag_once() {
        let store = store();
        let ticket = store.begin_compare(&[]);
        let guard = InFlightGuard::new(store.clone(), QueryKind::Compare, ticket);

        guard.release();
        assert!(!store.is_comparing());
    }

    #[test]
    fn test_error_path_lowers_flag() {
        fn failing(store: &StateStore) -> Result<(), &'static str> {
            let ticket = store.begin_search("nurse", "Boston");
            let _guard = InFlightGuard::new(store.clone(), QueryKind::Search, ticket);
            if ticket > 0 {
                return Err("boom");
            }
            Ok(())
        }

        let store = store();
        assert!(failing(&store).is_err());
        assert!(!store.is_searching());
    }

    #[test]
    fn test_superseded_guard_leaves_flag() {
        let store = store();
        let old = store.begin_search("nurse", "Boston");
        let old_guard = InFlightGuard::new(store.clone(), QueryKind::Search, old);
        let _new = store.begin_search("nurse", "Denver");

        assert!(!old_guard.is_current());
        drop(old_guard);
        assert!(store.is_searching());
    }

    #[tokio::test]
    async fn test_panic_lowers_flag() {
        let store = store();
        let ticket = store.begin_compare(&[]);
        let guard = InFlightGuard::new(store.clone(), QueryKind::Compare, ticket);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("completion task panicked");
        });

        assert!(handle.await.is_err());
        assert!(!store.is_comparing());
    }

    #[tokio::test]
    async fn test_cancellation_lowers_flag() {
        let store = store();
        let ticket = store.begin_search("nurse", "Boston");
        let guard = InFlightGuard::new(store.clone(), QueryKind::Search, ticket);

        let never = async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        };
        let timed_out = tokio::time::timeout(Duration::from_millis(10), never).await;

        assert!(timed_out.is_err());
        assert!(!store.is_searching());
    }
}
